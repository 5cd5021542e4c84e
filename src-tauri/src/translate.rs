//! Mapping between the bracket engine's match model and the UI view model.

use crate::duel::Duel;
use crate::error::BridgeError;
use crate::types::{Bracket, EngineMatch, MatchId, Seat, ViewMatch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewOptions {
    /// Publish winners-bracket matches that still wait on a feeder match,
    /// with the open slot as `null`. Walkover matches are never published.
    pub show_pending_matches: bool,
}

/// UI identifiers for every match of one tournament, assigned once at creation.
#[derive(Debug, Clone, Default)]
pub struct MatchTags {
    by_match: HashMap<MatchId, Uuid>,
}

impl MatchTags {
    pub fn assign(duel: &Duel) -> Self {
        let by_match = duel
            .matches()
            .into_iter()
            .map(|engine_match| (engine_match.id, Uuid::new_v4()))
            .collect();
        MatchTags { by_match }
    }

    pub fn ui_id(&self, id: MatchId) -> Option<Uuid> {
        self.by_match.get(&id).copied()
    }

    pub fn match_id(&self, ui_id: Uuid) -> Option<MatchId> {
        self.by_match
            .iter()
            .find(|(_, tag)| **tag == ui_id)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.by_match.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_match.is_empty()
    }
}

/// Scores are recorded as a plain win or loss: 1-0 when slot one wins, 0-1 when slot two does.
pub fn result_for_winner(engine_match: &EngineMatch, ui_id: Uuid, winner_id: u32) -> Result<[u32; 2], BridgeError> {
    match engine_match.p {
        [Seat::Player(first), _] if first == winner_id => Ok([1, 0]),
        [_, Seat::Player(second)] if second == winner_id => Ok([0, 1]),
        _ => Err(BridgeError::InvalidWinner { match_id: ui_id, winner_id }),
    }
}

fn publishable(engine_match: &EngineMatch, options: &ViewOptions) -> bool {
    if engine_match.id.s != Bracket::Winners {
        return false;
    }
    engine_match.p.iter().all(|seat| match seat {
        Seat::Player(_) => true,
        Seat::Empty => options.show_pending_matches,
        Seat::Walkover => false,
    })
}

pub fn to_view_match(engine_match: &EngineMatch, ui_id: Uuid) -> ViewMatch {
    let [first, second] = engine_match.p;
    let winner = engine_match.m.and_then(|[a, b]| if a > b { first.player() } else { second.player() });
    ViewMatch {
        id: ui_id,
        player_one: first.player(),
        player_two: second.player(),
        round: engine_match.id.r,
        winner,
    }
}

/// Winners-bracket matches with both seats filled, in engine order.
pub fn view_matches(duel: &Duel, tags: &MatchTags, options: &ViewOptions) -> Vec<ViewMatch> {
    duel.matches()
        .iter()
        .filter(|engine_match| publishable(engine_match, options))
        .filter_map(|engine_match| {
            tags.ui_id(engine_match.id)
                .map(|ui_id| to_view_match(engine_match, ui_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TournamentSeed;
    use std::collections::HashSet;

    fn engine_match(s: Bracket, p: [Seat; 2], m: Option<[u32; 2]>) -> EngineMatch {
        EngineMatch { id: MatchId::new(s, 2, 1), p, m }
    }

    #[test]
    fn test_tags_are_unique_per_match() {
        let duel = Duel::new(TournamentSeed::double_elimination(64)).unwrap();
        let tags = MatchTags::assign(&duel);
        assert_eq!(tags.len(), duel.matches().len());
        assert!(!tags.is_empty());
        assert!(MatchTags::default().is_empty());

        let unique = duel
            .matches()
            .iter()
            .filter_map(|m| tags.ui_id(m.id))
            .collect::<HashSet<_>>();
        assert_eq!(unique.len(), duel.matches().len());

        let first = duel.matches()[0].id;
        let ui_id = tags.ui_id(first).unwrap();
        assert_eq!(tags.match_id(ui_id), Some(first));
        assert_eq!(tags.match_id(Uuid::new_v4()), None);
    }

    #[test]
    fn test_result_for_winner() {
        let m = engine_match(Bracket::Winners, [Seat::Player(3), Seat::Player(9)], None);
        assert_eq!(result_for_winner(&m, Uuid::nil(), 3), Ok([1, 0]));
        assert_eq!(result_for_winner(&m, Uuid::nil(), 9), Ok([0, 1]));
        assert_eq!(
            result_for_winner(&m, Uuid::nil(), 5),
            Err(BridgeError::InvalidWinner { match_id: Uuid::nil(), winner_id: 5 })
        );
    }

    #[test]
    fn test_publishable_filters_brackets_and_seats() {
        let strict = ViewOptions::default();
        let pending = ViewOptions { show_pending_matches: true };

        let ready = engine_match(Bracket::Winners, [Seat::Player(1), Seat::Player(2)], None);
        assert!(publishable(&ready, &strict));

        let losers = engine_match(Bracket::Losers, [Seat::Player(1), Seat::Player(2)], None);
        assert!(!publishable(&losers, &strict));
        assert!(!publishable(&losers, &pending));

        let waiting = engine_match(Bracket::Winners, [Seat::Player(1), Seat::Empty], None);
        assert!(!publishable(&waiting, &strict));
        assert!(publishable(&waiting, &pending));

        let bye = engine_match(Bracket::Winners, [Seat::Player(1), Seat::Walkover], None);
        assert!(!publishable(&bye, &strict));
        assert!(!publishable(&bye, &pending));
    }

    #[test]
    fn test_to_view_match_winner() {
        let id = Uuid::new_v4();
        let open = engine_match(Bracket::Winners, [Seat::Player(1), Seat::Player(2)], None);
        let view = to_view_match(&open, id);
        assert_eq!(view.winner, None);
        assert_eq!(view.round, 2);
        assert_eq!((view.player_one, view.player_two), (Some(1), Some(2)));

        let first_won = engine_match(Bracket::Winners, [Seat::Player(1), Seat::Player(2)], Some([2, 1]));
        assert_eq!(to_view_match(&first_won, id).winner, Some(1));

        let second_won = engine_match(Bracket::Winners, [Seat::Player(1), Seat::Player(2)], Some([0, 1]));
        assert_eq!(to_view_match(&second_won, id).winner, Some(2));

        let pending = engine_match(Bracket::Winners, [Seat::Empty, Seat::Player(4)], None);
        assert_eq!(to_view_match(&pending, id).player_one, None);
    }

    #[test]
    fn test_view_matches_properties() {
        let mut duel = Duel::new(TournamentSeed::double_elimination(11)).unwrap();
        let tags = MatchTags::assign(&duel);
        let ready = duel
            .matches()
            .into_iter()
            .filter(|m| m.p.iter().all(|seat| seat.is_player()))
            .collect::<Vec<_>>();
        for m in &ready {
            duel.score(m.id, [1, 0]).unwrap();
        }

        for options in [ViewOptions::default(), ViewOptions { show_pending_matches: true }] {
            let views = view_matches(&duel, &tags, &options);
            assert!(!views.is_empty());
            for view in &views {
                let source = duel.matches().into_iter().find(|m| tags.ui_id(m.id) == Some(view.id)).unwrap();
                assert_eq!(source.id.s, Bracket::Winners);
                assert!(source.p.iter().all(|seat| !seat.is_walkover()));
                if !options.show_pending_matches {
                    assert!(source.p.iter().all(|seat| seat.is_player()));
                }
                match source.m {
                    None => assert_eq!(view.winner, None),
                    Some([a, b]) => {
                        let expected = if a > b { source.p[0].player() } else { source.p[1].player() };
                        assert_eq!(view.winner, expected);
                    }
                }
            }
        }
    }
}
