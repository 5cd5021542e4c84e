use crate::types::{Bracket, EngineMatch, MatchId, Seat, TournamentSeed, MAX_PLAYERS};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
enum SlotSource {
  Seed(u32),
  Winner(usize),
  Loser(usize),
}

#[derive(Clone, Copy, Debug)]
enum MatchCondition {
  /// Grand final reset: only played when the losers-side player takes the first final.
  GrandFinalReset { gf1_index: usize },
}

#[derive(Clone, Copy, Debug)]
struct Outcome {
  winner_slot: usize,
  score: Option<[u32; 2]>,
}

#[derive(Clone, Debug)]
struct DuelMatch {
  id: MatchId,
  sources: [SlotSource; 2],
  condition: Option<MatchCondition>,
  seats: [Seat; 2],
  outcome: Option<Outcome>,
}

impl DuelMatch {
  fn snapshot(&self) -> EngineMatch {
    EngineMatch {
      id: self.id,
      p: self.seats,
      m: self.outcome.and_then(|outcome| outcome.score),
    }
  }
}

/// Elimination bracket engine. Matches are stored in dependency order so a
/// single forward pass resolves every slot.
#[derive(Clone, Debug)]
pub struct Duel {
  seed: TournamentSeed,
  matches: Vec<DuelMatch>,
  index: HashMap<MatchId, usize>,
}

impl Duel {
  pub fn new(seed: TournamentSeed) -> Result<Self, String> {
    let min_players = match seed.last {
      Bracket::Winners => 2,
      Bracket::Losers => 4,
    };
    if seed.players < min_players {
      return Err(format!(
        "{} elimination needs at least {min_players} players, got {}.",
        elimination_label(seed.last),
        seed.players
      ));
    }
    if seed.players > MAX_PLAYERS {
      return Err(format!(
        "At most {MAX_PLAYERS} players are supported, got {}.",
        seed.players
      ));
    }

    let matches = match seed.last {
      Bracket::Winners => build_single_elim(seed.players, seed.short),
      Bracket::Losers => build_double_elim(seed.players, seed.short)?,
    };
    let index = matches
      .iter()
      .enumerate()
      .map(|(idx, duel_match)| (duel_match.id, idx))
      .collect::<HashMap<_, _>>();

    let mut duel = Duel { seed, matches, index };
    duel.resolve();
    Ok(duel)
  }

  pub fn matches(&self) -> Vec<EngineMatch> {
    self.matches.iter().map(DuelMatch::snapshot).collect()
  }

  pub fn get(&self, id: MatchId) -> Option<EngineMatch> {
    self.index.get(&id).map(|idx| self.matches[*idx].snapshot())
  }

  /// Records a result and advances both participants. Validation happens
  /// before any mutation, so a rejected score leaves the bracket untouched.
  pub fn score(&mut self, id: MatchId, score: [u32; 2]) -> Result<(), String> {
    let idx = self
      .index
      .get(&id)
      .copied()
      .ok_or_else(|| format!("Match {id} not found."))?;
    let duel_match = &mut self.matches[idx];
    if !duel_match.seats.iter().all(|seat| seat.is_player()) {
      return Err(format!("Match {id} is missing players."));
    }
    if duel_match.outcome.is_some() {
      return Err(format!("Match {id} has already been scored."));
    }
    if score[0] == score[1] {
      return Err(format!("Match {id} cannot end in a tie."));
    }
    let winner_slot = if score[0] > score[1] { 0 } else { 1 };
    duel_match.outcome = Some(Outcome { winner_slot, score: Some(score) });
    self.resolve();
    Ok(())
  }

  /// True once the final deciding match has been played.
  pub fn is_done(&self) -> bool {
    match (self.seed.last, self.seed.short) {
      (Bracket::Winners, _) => self.matches.iter().all(|duel_match| duel_match.outcome.is_some()),
      (Bracket::Losers, true) => self.matches.last().is_some_and(|gf| gf.outcome.is_some()),
      (Bracket::Losers, false) => {
        let len = self.matches.len();
        let gf1 = &self.matches[len - 2];
        let gf2 = &self.matches[len - 1];
        match gf1.outcome {
          Some(outcome) if outcome.winner_slot == 0 => true,
          Some(_) => gf2.outcome.is_some(),
          None => false,
        }
      }
    }
  }

  fn resolve(&mut self) {
    for idx in 0..self.matches.len() {
      if self.matches[idx].outcome.is_some() {
        continue;
      }
      let seats = if self.condition_blocks(idx) {
        [Seat::Empty, Seat::Empty]
      } else {
        let sources = self.matches[idx].sources;
        [self.resolve_slot(sources[0]), self.resolve_slot(sources[1])]
      };
      let duel_match = &mut self.matches[idx];
      duel_match.seats = seats;
      duel_match.outcome = match seats {
        [Seat::Player(_), Seat::Walkover] | [Seat::Walkover, Seat::Walkover] => {
          Some(Outcome { winner_slot: 0, score: None })
        }
        [Seat::Walkover, Seat::Player(_)] => Some(Outcome { winner_slot: 1, score: None }),
        _ => None,
      };
    }
  }

  fn condition_blocks(&self, idx: usize) -> bool {
    match self.matches[idx].condition {
      Some(MatchCondition::GrandFinalReset { gf1_index }) => {
        match self.matches[gf1_index].outcome {
          Some(outcome) => outcome.winner_slot == 0,
          None => true,
        }
      }
      None => false,
    }
  }

  fn resolve_slot(&self, source: SlotSource) -> Seat {
    match source {
      SlotSource::Seed(seed) if seed <= self.seed.players => Seat::Player(seed),
      SlotSource::Seed(_) => Seat::Walkover,
      SlotSource::Winner(idx) => {
        let duel_match = &self.matches[idx];
        duel_match
          .outcome
          .map(|outcome| duel_match.seats[outcome.winner_slot])
          .unwrap_or(Seat::Empty)
      }
      SlotSource::Loser(idx) => {
        let duel_match = &self.matches[idx];
        duel_match
          .outcome
          .map(|outcome| duel_match.seats[1 - outcome.winner_slot])
          .unwrap_or(Seat::Empty)
      }
    }
  }
}

fn elimination_label(last: Bracket) -> &'static str {
  match last {
    Bracket::Winners => "Single",
    Bracket::Losers => "Double",
  }
}

struct MatchBuilder {
  matches: Vec<DuelMatch>,
}

impl MatchBuilder {
  fn new() -> Self {
    MatchBuilder { matches: Vec::new() }
  }

  fn push(&mut self, id: MatchId, slot_a: SlotSource, slot_b: SlotSource) -> usize {
    self.matches.push(DuelMatch {
      id,
      sources: [slot_a, slot_b],
      condition: None,
      seats: [Seat::Empty, Seat::Empty],
      outcome: None,
    });
    self.matches.len() - 1
  }

  fn winners_rounds(&mut self, players: u32) -> Vec<Vec<usize>> {
    let bracket_size = players.max(2).next_power_of_two();
    let rounds = bracket_size.trailing_zeros();
    let seeds = seed_positions(bracket_size);

    let mut winners_rounds: Vec<Vec<usize>> = Vec::new();
    let mut first = Vec::new();
    for (i, pair) in seeds.chunks(2).enumerate() {
      let id = MatchId::new(Bracket::Winners, 1, i as u32 + 1);
      first.push(self.push(id, SlotSource::Seed(pair[0]), SlotSource::Seed(pair[1])));
    }
    winners_rounds.push(first);

    for round in 2..=rounds {
      let prev = &winners_rounds[round as usize - 2];
      let mut ids = Vec::with_capacity(prev.len() / 2);
      for (i, pair) in prev.chunks(2).enumerate() {
        let id = MatchId::new(Bracket::Winners, round, i as u32 + 1);
        ids.push(self.push(id, SlotSource::Winner(pair[0]), SlotSource::Winner(pair[1])));
      }
      winners_rounds.push(ids);
    }
    winners_rounds
  }
}

fn build_single_elim(players: u32, short: bool) -> Vec<DuelMatch> {
  let mut builder = MatchBuilder::new();
  let winners_rounds = builder.winners_rounds(players);
  if !short && winners_rounds.len() >= 2 {
    let semis = &winners_rounds[winners_rounds.len() - 2];
    let (semi_a, semi_b) = (semis[0], semis[1]);
    builder.push(
      MatchId::new(Bracket::Losers, 1, 1),
      SlotSource::Loser(semi_a),
      SlotSource::Loser(semi_b),
    );
  }
  builder.matches
}

fn build_double_elim(players: u32, short: bool) -> Result<Vec<DuelMatch>, String> {
  let mut builder = MatchBuilder::new();
  let winners_rounds = builder.winners_rounds(players);
  let rounds = winners_rounds.len();

  let mut losers_rounds: Vec<Vec<usize>> = Vec::new();
  for i in 1..rounds {
    let count = winners_rounds[i].len();
    let odd_round = (i * 2 - 1) as u32;
    let mut odd_ids = Vec::with_capacity(count);
    for j in 0..count {
      let (slot_a, slot_b) = if i == 1 {
        let w1 = &winners_rounds[0];
        (SlotSource::Loser(w1[j * 2]), SlotSource::Loser(w1[j * 2 + 1]))
      } else {
        let prev_even = losers_rounds.last().ok_or_else(|| "Missing losers round".to_string())?;
        (SlotSource::Winner(prev_even[j * 2]), SlotSource::Winner(prev_even[j * 2 + 1]))
      };
      let id = MatchId::new(Bracket::Losers, odd_round, j as u32 + 1);
      odd_ids.push(builder.push(id, slot_a, slot_b));
    }
    losers_rounds.push(odd_ids);

    let even_round = (i * 2) as u32;
    let mut even_ids = Vec::with_capacity(count);
    let l_odd = losers_rounds.last().ok_or_else(|| "Missing losers round".to_string())?;
    for j in 0..count {
      let id = MatchId::new(Bracket::Losers, even_round, j as u32 + 1);
      even_ids.push(builder.push(
        id,
        SlotSource::Winner(l_odd[j]),
        SlotSource::Loser(winners_rounds[i][j]),
      ));
    }
    losers_rounds.push(even_ids);
  }

  let winners_final = *winners_rounds
    .last()
    .and_then(|round| round.first())
    .ok_or_else(|| "Missing winners final".to_string())?;
  let losers_final = *losers_rounds
    .last()
    .and_then(|round| round.first())
    .ok_or_else(|| "Missing losers final".to_string())?;

  let gf_round = losers_rounds.len() as u32 + 1;
  let gf1_index = builder.push(
    MatchId::new(Bracket::Losers, gf_round, 1),
    SlotSource::Winner(winners_final),
    SlotSource::Winner(losers_final),
  );

  if !short {
    let gf2_index = builder.push(
      MatchId::new(Bracket::Losers, gf_round + 1, 1),
      SlotSource::Winner(gf1_index),
      SlotSource::Loser(gf1_index),
    );
    builder.matches[gf2_index].condition = Some(MatchCondition::GrandFinalReset { gf1_index });
  }

  Ok(builder.matches)
}

fn seed_positions(size: u32) -> Vec<u32> {
  let mut seeds = vec![1u32];
  while seeds.len() < size as usize {
    let n = seeds.len() as u32;
    let mut next = Vec::with_capacity(seeds.len() * 2);
    for seed in seeds.iter().copied() {
      next.push(seed);
      next.push((n * 2 + 1).saturating_sub(seed));
    }
    seeds = next;
  }
  seeds
}

#[cfg(test)]
mod tests {
  use super::*;

  fn wb(r: u32, m: u32) -> MatchId {
    MatchId::new(Bracket::Winners, r, m)
  }

  fn lb(r: u32, m: u32) -> MatchId {
    MatchId::new(Bracket::Losers, r, m)
  }

  fn seats(duel: &Duel, id: MatchId) -> [Seat; 2] {
    duel.get(id).unwrap().p
  }

  #[test]
  fn test_seed_positions() {
    assert_eq!(seed_positions(4), vec![1, 4, 2, 3]);
    assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
  }

  #[test]
  fn test_double_elim_four_players_layout() {
    let duel = Duel::new(TournamentSeed::double_elimination(4)).unwrap();
    let ids = duel.matches().iter().map(|m| m.id).collect::<Vec<_>>();
    assert_eq!(
      ids,
      vec![wb(1, 1), wb(1, 2), wb(2, 1), lb(1, 1), lb(2, 1), lb(3, 1), lb(4, 1)]
    );
    assert_eq!(seats(&duel, wb(1, 1)), [Seat::Player(1), Seat::Player(4)]);
    assert_eq!(seats(&duel, wb(1, 2)), [Seat::Player(2), Seat::Player(3)]);
    assert_eq!(seats(&duel, wb(2, 1)), [Seat::Empty, Seat::Empty]);
    assert!(duel.matches().iter().all(|m| m.m.is_none()));
  }

  #[test]
  fn test_double_elim_eight_players_match_count() {
    let duel = Duel::new(TournamentSeed::double_elimination(8)).unwrap();
    let matches = duel.matches();
    let winners = matches.iter().filter(|m| m.id.s == Bracket::Winners).count();
    let losers = matches.iter().filter(|m| m.id.s == Bracket::Losers).count();
    assert_eq!(winners, 7);
    // 2 + 2 + 1 + 1 losers matches plus both grand finals
    assert_eq!(losers, 8);
  }

  #[test]
  fn test_rejects_too_few_or_too_many_players() {
    assert!(Duel::new(TournamentSeed::double_elimination(3)).is_err());
    assert!(Duel::new(TournamentSeed::single_elimination(1)).is_err());
    assert!(Duel::new(TournamentSeed::single_elimination(MAX_PLAYERS + 1)).is_err());
    assert!(Duel::new(TournamentSeed::single_elimination(2)).is_ok());
  }

  #[test]
  fn test_score_advances_winner_and_drops_loser() {
    let mut duel = Duel::new(TournamentSeed::double_elimination(4)).unwrap();
    duel.score(wb(1, 1), [1, 0]).unwrap();
    assert_eq!(duel.get(wb(1, 1)).unwrap().m, Some([1, 0]));
    assert_eq!(seats(&duel, wb(2, 1)), [Seat::Player(1), Seat::Empty]);
    assert_eq!(seats(&duel, lb(1, 1)), [Seat::Player(4), Seat::Empty]);

    duel.score(wb(1, 2), [0, 1]).unwrap();
    assert_eq!(seats(&duel, wb(2, 1)), [Seat::Player(1), Seat::Player(3)]);
    assert_eq!(seats(&duel, lb(1, 1)), [Seat::Player(4), Seat::Player(2)]);
  }

  #[test]
  fn test_score_rejections_leave_bracket_untouched() {
    let mut duel = Duel::new(TournamentSeed::double_elimination(4)).unwrap();
    let before = duel.matches();
    assert!(duel.score(wb(2, 1), [1, 0]).is_err());
    assert!(duel.score(wb(1, 1), [2, 2]).is_err());
    assert!(duel.score(wb(9, 1), [1, 0]).is_err());
    assert_eq!(duel.matches(), before);

    duel.score(wb(1, 1), [1, 0]).unwrap();
    let err = duel.score(wb(1, 1), [0, 1]).unwrap_err();
    assert!(err.contains("already been scored"));
  }

  #[test]
  fn test_walkover_advances_player_without_score() {
    let duel = Duel::new(TournamentSeed::double_elimination(5)).unwrap();
    assert_eq!(seats(&duel, wb(1, 1)), [Seat::Player(1), Seat::Walkover]);
    assert_eq!(duel.get(wb(1, 1)).unwrap().m, None);
    assert_eq!(seats(&duel, wb(2, 1)), [Seat::Player(1), Seat::Empty]);
    // seeds 2 and 3 both have byes, so their losers-bracket match is a double walkover
    assert_eq!(seats(&duel, lb(1, 2)), [Seat::Walkover, Seat::Walkover]);
    assert_eq!(seats(&duel, lb(2, 2)), [Seat::Walkover, Seat::Empty]);
  }

  #[test]
  fn test_grand_final_reset_only_when_losers_side_wins() {
    let mut duel = Duel::new(TournamentSeed::double_elimination(4)).unwrap();
    duel.score(wb(1, 1), [1, 0]).unwrap();
    duel.score(wb(1, 2), [1, 0]).unwrap();
    duel.score(wb(2, 1), [1, 0]).unwrap();
    duel.score(lb(1, 1), [1, 0]).unwrap();
    duel.score(lb(2, 1), [1, 0]).unwrap();
    assert_eq!(seats(&duel, lb(3, 1)), [Seat::Player(1), Seat::Player(4)]);
    assert!(!duel.is_done());

    let mut reset = duel.clone();
    duel.score(lb(3, 1), [1, 0]).unwrap();
    assert_eq!(seats(&duel, lb(4, 1)), [Seat::Empty, Seat::Empty]);
    assert!(duel.is_done());

    reset.score(lb(3, 1), [0, 1]).unwrap();
    assert_eq!(seats(&reset, lb(4, 1)), [Seat::Player(4), Seat::Player(1)]);
    assert!(!reset.is_done());
    reset.score(lb(4, 1), [3, 1]).unwrap();
    assert!(reset.is_done());
  }

  #[test]
  fn test_short_double_elim_has_single_grand_final() {
    let seed = TournamentSeed { players: 4, last: Bracket::Losers, short: true };
    let duel = Duel::new(seed).unwrap();
    assert_eq!(duel.matches().last().map(|m| m.id), Some(lb(3, 1)));
  }

  #[test]
  fn test_single_elim_bronze_match() {
    let mut duel = Duel::new(TournamentSeed::single_elimination(4)).unwrap();
    assert_eq!(duel.matches().len(), 4);
    duel.score(wb(1, 1), [1, 0]).unwrap();
    duel.score(wb(1, 2), [0, 1]).unwrap();
    assert_eq!(seats(&duel, lb(1, 1)), [Seat::Player(4), Seat::Player(2)]);

    let short = TournamentSeed { players: 4, last: Bracket::Winners, short: true };
    assert_eq!(Duel::new(short).unwrap().matches().len(), 3);
  }
}
