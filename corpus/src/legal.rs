use catan::{Action, ActionKind, Board, Engine, SimState};
use engine::{GameEngine, ValidActions};
use features::simulated_view::simulated_view;
use features::{
    deck_simulated, roll_gain_simulated, substitute, ActionEncoder, ActionVector, LayoutError,
    Outcome, StateEncoder,
};
use itertools::Itertools;

/// A legal action and the change it makes, chance slots replaced by their expectation.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub action: Action,
    pub vector: ActionVector,
}

/// Enumerates the actions legal in `state` and encodes each of them from the acting player's
/// point of view. The decision step and player are pinned to the before-state so the only
/// differences are the ones the action itself made.
pub fn legal_action_vectors(
    board: &Board,
    state: &SimState,
    states: &StateEncoder,
    actions: &ActionEncoder,
) -> Result<Vec<Candidate>, LayoutError> {
    let engine = Engine::new(board);
    let layout = actions.layout();
    let before = states.encode_simulated(state, board);
    let before_view = simulated_view(state, board);

    let level = state.fsm_level;
    let player = engine.player_to_move(state);
    let step = state.fsm_step[level];

    engine
        .valid_actions(state)
        .into_iter()
        .map(|action| {
            if action == Action::EndTurn {
                return Ok(Candidate {
                    action,
                    vector: actions.end_turn(),
                });
            }

            let mut after = engine.take_action(state, &action);
            after.fsm_level = level;
            after.fsm_player[level] = player;
            after.fsm_step[level] = step;

            let mut vector = actions.encode(&before, &states.encode_simulated(&after, board))?;
            if let Some(outcome) = chance_outcome(&action, &after, board) {
                substitute(layout, &before_view, &outcome, &mut vector);
            }

            Ok(Candidate { action, vector })
        })
        .collect()
}

/// Distinct kinds of the actions legal in `state`.
pub fn legal_action_kinds(board: &Board, state: &SimState) -> Vec<ActionKind> {
    Engine::new(board)
        .valid_actions(state)
        .iter()
        .map(Action::kind)
        .sorted()
        .dedup()
        .collect()
}

fn chance_outcome(action: &Action, after: &SimState, board: &Board) -> Option<Outcome> {
    match action {
        Action::RollDice => Some(Outcome::Roll {
            gain: roll_gain_simulated(after, board),
        }),
        Action::BuyCard => Some(Outcome::Draw {
            deck: deck_simulated(after),
        }),
        Action::PlaceRobber { .. } | Action::PlayKnight { .. } => Some(Outcome::Steal {
            victim_hand: action.victim().map(|v| after.players[v].resources),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catan::fixtures::RowBuilder;
    use catan::{Bridge, LoggedState, Step};
    use features::{Field, Layout, LayoutVersion};

    struct Setup {
        bridge: Bridge,
        state: SimState,
    }

    fn setup(row: RowBuilder) -> Setup {
        let snapshot = row.snapshot().unwrap();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let state = bridge.translate(&snapshot.observed, &snapshot.extended).unwrap();
        Setup { bridge, state }
    }

    fn encoders(version: LayoutVersion) -> (StateEncoder, ActionEncoder) {
        let layout = Layout::new(version).unwrap();
        (StateEncoder::new(layout.clone()), ActionEncoder::new(layout))
    }

    #[test]
    fn test_one_vector_per_action() {
        let setup = setup(
            RowBuilder::new()
                .settlement(0x67, 0)
                .road(0x66, 0)
                .hand(0, [1, 0, 1, 1, 2]),
        );
        let (states, actions) = encoders(LayoutVersion::NUMERIC);
        let candidates =
            legal_action_vectors(setup.bridge.board(), &setup.state, &states, &actions).unwrap();

        let engine = Engine::new(setup.bridge.board());
        assert_eq!(candidates.len(), engine.valid_actions(&setup.state).len());
        assert!(candidates
            .iter()
            .all(|c| c.vector.len() == actions.layout().action_len()));

        let end = candidates.iter().find(|c| c.action == Action::EndTurn).unwrap();
        assert_eq!(end.vector, actions.end_turn());
    }

    #[test]
    fn test_roll_candidate_carries_expectation() {
        let setup = setup(
            RowBuilder::new()
                .state(LoggedState::Play)
                .settlement(0x67, 0),
        );
        assert_eq!(setup.state.step(), Step::BeforeDice);

        let (states, actions) = encoders(LayoutVersion::NUMERIC);
        let layout = actions.layout();
        let candidates =
            legal_action_vectors(setup.bridge.board(), &setup.state, &states, &actions).unwrap();
        let roll = candidates.iter().find(|c| c.action == Action::RollDice).unwrap();

        let gain = roll_gain_simulated(&setup.state, setup.bridge.board());
        let hand = layout.action_offset_of(Field::ResourceInHand).unwrap();
        for (r, g) in gain.iter().enumerate() {
            assert!((roll.vector.values()[hand + r] - g).abs() < 1e-12);
        }
        assert!(gain.iter().sum::<f64>() > 0.0);
    }

    #[test]
    fn test_discard_candidates_stay_with_the_discarding_player() {
        let setup = setup(
            RowBuilder::new()
                .state(LoggedState::WaitingForDiscards)
                .current_player(2)
                .hand(2, [2, 2, 2, 2, 0]),
        );
        let engine = Engine::new(setup.bridge.board());
        assert_eq!(engine.player_to_move(&setup.state), 2);

        let (states, actions) = encoders(LayoutVersion::NUMERIC);
        let hand = actions.layout().action_offset_of(Field::ResourceInHand).unwrap();
        let candidates =
            legal_action_vectors(setup.bridge.board(), &setup.state, &states, &actions).unwrap();

        assert!(!candidates.is_empty());
        for candidate in &candidates {
            let discarded: f64 = candidate.vector.values()[hand..hand + 5].iter().sum();
            assert_eq!(discarded, -4.0, "{:?}", candidate.action);
        }
    }

    #[test]
    fn test_kinds_are_distinct() {
        let setup = setup(RowBuilder::new().settlement(0x67, 0).hand(0, [1, 0, 1, 1, 2]));
        let kinds = legal_action_kinds(setup.bridge.board(), &setup.state);

        assert!(kinds.contains(&ActionKind::EndTurn));
        assert!(kinds.contains(&ActionKind::BuildRoad));
        assert!(kinds.windows(2).all(|w| w[0] < w[1]));
    }
}
