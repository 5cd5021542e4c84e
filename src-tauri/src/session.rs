use crate::duel::Duel;
use crate::error::BridgeError;
use crate::translate::{result_for_winner, view_matches, MatchTags, ViewOptions};
use crate::types::{EngineMatch, ScoreSubmission, TournamentSeed, ViewMatch};
use tracing::{debug, info, warn};

/// Outbound side of the UI boundary. Receives the full match view after every mutation.
pub trait MatchupsPort {
    fn matchups_updated(&self, matchups: Vec<ViewMatch>);
}

struct Tournament {
    duel: Duel,
    tags: MatchTags,
}

/// The single current tournament. Creating a new one replaces it wholesale.
pub struct TournamentSession {
    current: Option<Tournament>,
    view: ViewOptions,
}

impl TournamentSession {
    pub fn new(view: ViewOptions) -> Self {
        TournamentSession { current: None, view }
    }

    pub fn create<P: MatchupsPort + ?Sized>(&mut self, seed: TournamentSeed, port: &P) -> Result<(), BridgeError> {
        let duel = Duel::new(seed).map_err(|e| {
            warn!("Rejected tournament seed {seed:?}: {e}");
            BridgeError::Construction(e)
        })?;
        let tags = MatchTags::assign(&duel);
        info!(
            "Created tournament with {} players ({} matches)",
            seed.players,
            tags.len()
        );
        self.current = Some(Tournament { duel, tags });
        self.publish(port);
        Ok(())
    }

    pub fn score<P: MatchupsPort + ?Sized>(&mut self, submission: ScoreSubmission, port: &P) -> Result<(), BridgeError> {
        let tournament = self.current.as_mut().ok_or(BridgeError::NoTournament)?;
        let ScoreSubmission { match_id, winner_id } = submission;
        let engine_match = tournament
            .tags
            .match_id(match_id)
            .and_then(|id| tournament.duel.get(id))
            .ok_or(BridgeError::UnknownMatch(match_id))?;
        let result = result_for_winner(&engine_match, match_id, winner_id)?;
        tournament
            .duel
            .score(engine_match.id, result)
            .map_err(BridgeError::Scoring)?;
        debug!("Scored {} as {:?} (winner {winner_id})", engine_match.id, result);
        if tournament.duel.is_done() {
            info!("Tournament complete");
        }
        self.publish(port);
        Ok(())
    }

    pub fn matchups(&self) -> Vec<ViewMatch> {
        self.current
            .as_ref()
            .map(|tournament| view_matches(&tournament.duel, &tournament.tags, &self.view))
            .unwrap_or_default()
    }

    pub fn engine_matches(&self) -> Vec<EngineMatch> {
        self.current
            .as_ref()
            .map(|tournament| tournament.duel.matches())
            .unwrap_or_default()
    }

    fn publish<P: MatchupsPort + ?Sized>(&self, port: &P) {
        let matchups = self.matchups();
        debug!("Publishing {} matchups", matchups.len());
        port.matchups_updated(matchups);
    }
}
