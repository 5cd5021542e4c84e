use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ── Constants ──────────────────────────────────────────────────────────

pub const MAX_PLAYERS: u32 = 1024;
pub const SEAT_EMPTY: i64 = 0;
pub const SEAT_WALKOVER: i64 = -1;
pub const MATCHUPS_UPDATED_EVENT: &str = "onMatchupsUpdated";
pub const DEFAULT_COMMAND_BUFFER: usize = 32;

// ── Engine coordinates ─────────────────────────────────────────────────

/// Which tree of the tournament a match belongs to. Serialized as the
/// numeric tag the UI glue has always used (1 = winners, 2 = losers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bracket {
    #[default]
    Winners,
    Losers,
}

impl From<Bracket> for u8 {
    fn from(value: Bracket) -> Self {
        match value {
            Bracket::Winners => 1,
            Bracket::Losers => 2,
        }
    }
}

impl TryFrom<u8> for Bracket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Bracket::Winners),
            2 => Ok(Bracket::Losers),
            other => Err(format!("unknown bracket tag {other}")),
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bracket::Winners => f.write_str("WB"),
            Bracket::Losers => f.write_str("LB"),
        }
    }
}

/// Engine-native match coordinate: bracket, round, match number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId {
    pub s: Bracket,
    pub r: u32,
    pub m: u32,
}

impl MatchId {
    pub fn new(s: Bracket, r: u32, m: u32) -> Self {
        MatchId { s, r, m }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} R{} M{}", self.s, self.r, self.m)
    }
}

/// A participant slot. On the wire `0` is an unresolved slot and `-1` a bye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Seat {
    #[default]
    Empty,
    Walkover,
    Player(u32),
}

impl Seat {
    pub fn player(self) -> Option<u32> {
        match self {
            Seat::Player(id) => Some(id),
            Seat::Empty | Seat::Walkover => None,
        }
    }

    pub fn is_player(self) -> bool {
        matches!(self, Seat::Player(_))
    }

    pub fn is_walkover(self) -> bool {
        matches!(self, Seat::Walkover)
    }
}

impl From<Seat> for i64 {
    fn from(value: Seat) -> Self {
        match value {
            Seat::Empty => SEAT_EMPTY,
            Seat::Walkover => SEAT_WALKOVER,
            Seat::Player(id) => i64::from(id),
        }
    }
}

impl TryFrom<i64> for Seat {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            SEAT_EMPTY => Ok(Seat::Empty),
            SEAT_WALKOVER => Ok(Seat::Walkover),
            id if id > 0 => u32::try_from(id)
                .map(Seat::Player)
                .map_err(|_| format!("player id {id} out of range")),
            other => Err(format!("invalid seat value {other}")),
        }
    }
}

/// Snapshot of one match as the engine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMatch {
    pub id: MatchId,
    pub p: [Seat; 2],
    pub m: Option<[u32; 2]>,
}

// ── Inbound payloads ───────────────────────────────────────────────────

/// Construction data for a new tournament. Accepts either a bare player
/// count or the full options object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SeedRepr")]
pub struct TournamentSeed {
    pub players: u32,
    pub last: Bracket,
    pub short: bool,
}

impl TournamentSeed {
    pub fn double_elimination(players: u32) -> Self {
        TournamentSeed { players, last: Bracket::Losers, short: false }
    }

    pub fn single_elimination(players: u32) -> Self {
        TournamentSeed { players, last: Bracket::Winners, short: false }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedRepr {
    Count(u32),
    Options {
        players: u32,
        #[serde(default)]
        last: Bracket,
        #[serde(default)]
        short: bool,
    },
}

impl From<SeedRepr> for TournamentSeed {
    fn from(value: SeedRepr) -> Self {
        match value {
            SeedRepr::Count(players) => TournamentSeed::single_elimination(players),
            SeedRepr::Options { players, last, short } => TournamentSeed { players, last, short },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub match_id: Uuid,
    pub winner_id: u32,
}

// ── Outbound payloads ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMatch {
    pub id: Uuid,
    pub player_one: Option<u32>,
    pub player_two: Option<u32>,
    pub round: u32,
    pub winner: Option<u32>,
}
