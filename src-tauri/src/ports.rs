//! Message channels between the UI and the tournament session.
//!
//! Requests travel over a bounded queue and are handled one at a time in
//! arrival order; every successful mutation pushes a fresh match view onto
//! the outbound stream.

use crate::error::BridgeError;
use crate::session::{MatchupsPort, TournamentSession};
use crate::types::{EngineMatch, ScoreSubmission, TournamentSeed, ViewMatch, MATCHUPS_UPDATED_EVENT};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Messages the UI sends in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload", rename_all = "camelCase")]
pub enum Inbound {
    Create(TournamentSeed),
    Score(ScoreSubmission),
}

/// Messages the UI receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload")]
pub enum Outbound {
    #[serde(rename = "onMatchupsUpdated")]
    MatchupsUpdated(Vec<ViewMatch>),
}

impl Outbound {
    pub fn event_name(&self) -> &'static str {
        match self {
            Outbound::MatchupsUpdated(_) => MATCHUPS_UPDATED_EVENT,
        }
    }
}

impl MatchupsPort for mpsc::UnboundedSender<Outbound> {
    fn matchups_updated(&self, matchups: Vec<ViewMatch>) {
        if self.send(Outbound::MatchupsUpdated(matchups)).is_err() {
            warn!("Dropped matchups update: UI receiver is closed");
        }
    }
}

pub enum Request {
    Port {
        message: Inbound,
        reply: oneshot::Sender<Result<(), BridgeError>>,
    },
    EngineMatches {
        reply: oneshot::Sender<Vec<EngineMatch>>,
    },
}

/// Cloneable UI-side handle onto the request queue.
#[derive(Clone)]
pub struct PortsHandle {
    requests: mpsc::Sender<Request>,
}

impl PortsHandle {
    pub async fn send(&self, message: Inbound) -> Result<(), BridgeError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Port { message, reply })
            .await
            .map_err(|_| BridgeError::PortsClosed)?;
        response.await.map_err(|_| BridgeError::PortsClosed)?
    }

    pub async fn create(&self, seed: TournamentSeed) -> Result<(), BridgeError> {
        self.send(Inbound::Create(seed)).await
    }

    pub async fn score(&self, submission: ScoreSubmission) -> Result<(), BridgeError> {
        self.send(Inbound::Score(submission)).await
    }

    pub async fn engine_matches(&self) -> Result<Vec<EngineMatch>, BridgeError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::EngineMatches { reply })
            .await
            .map_err(|_| BridgeError::PortsClosed)?;
        response.await.map_err(|_| BridgeError::PortsClosed)
    }
}

pub struct PortsWorker {
    requests: mpsc::Receiver<Request>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl PortsWorker {
    /// Runs until every `PortsHandle` has been dropped.
    pub async fn run(mut self, mut session: TournamentSession) {
        info!("Tournament ports worker started");
        while let Some(request) = self.requests.recv().await {
            match request {
                Request::Port { message, reply } => {
                    let result = handle_inbound(&mut session, message, &self.outbound);
                    if let Err(e) = &result {
                        warn!("Inbound message failed: {e}");
                    }
                    let _ = reply.send(result);
                }
                Request::EngineMatches { reply } => {
                    let _ = reply.send(session.engine_matches());
                }
            }
        }
        info!("Tournament ports worker stopped");
    }
}

pub fn handle_inbound<P: MatchupsPort + ?Sized>(
    session: &mut TournamentSession,
    message: Inbound,
    port: &P,
) -> Result<(), BridgeError> {
    match message {
        Inbound::Create(seed) => session.create(seed, port),
        Inbound::Score(submission) => session.score(submission, port),
    }
}

pub fn open(buffer: usize) -> (PortsHandle, PortsWorker, mpsc::UnboundedReceiver<Outbound>) {
    let (requests_tx, requests_rx) = mpsc::channel(buffer.max(1));
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    (
        PortsHandle { requests: requests_tx },
        PortsWorker { requests: requests_rx, outbound: outbound_tx },
        outbound_rx,
    )
}
