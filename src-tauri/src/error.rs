use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("could not create tournament: {0}")]
    Construction(String),
    #[error("no tournament has been created yet")]
    NoTournament,
    #[error("no match with id {0} in the current tournament")]
    UnknownMatch(Uuid),
    #[error("player {winner_id} is not seated in match {match_id}")]
    InvalidWinner { match_id: Uuid, winner_id: u32 },
    #[error("could not record score: {0}")]
    Scoring(String),
    #[error("tournament worker is not running")]
    PortsClosed,
}
