use anyhow::Result;
use catan::{ActionKind, ActionType, Bridge, LoggedState, NUM_PLAYERS};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::game::{is_normal_play, LoggedGame};
use super::legal::legal_action_kinds;
use super::storage::GameLog;
use super::task::Task;

/// How often each action type was chosen, grouped by the set of types that were legal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionTypeStats {
    choices: BTreeMap<Vec<ActionKind>, Vec<ActionKind>>,
}

impl ActionTypeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, legal: Vec<ActionKind>, chosen: ActionKind) {
        self.choices.entry(legal).or_default().push(chosen);
    }

    pub fn merge(&mut self, other: ActionTypeStats) {
        for (legal, chosen) in other.choices {
            self.choices.entry(legal).or_default().extend(chosen);
        }
    }

    pub fn chosen(&self, legal: &[ActionKind]) -> Option<&[ActionKind]> {
        self.choices.get(legal).map(Vec::as_slice)
    }

    pub fn num_decisions(&self) -> usize {
        self.choices.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// One line per legal set: the legal types, then the count of each chosen type.
impl Display for ActionTypeStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (legal, chosen) in &self.choices {
            let counts = chosen
                .iter()
                .counts()
                .into_iter()
                .sorted()
                .map(|(kind, n)| format!("{}:{}", kind, n))
                .join(", ");
            writeln!(f, "[{}] -> {}", legal.iter().join(", "), counts)?;
        }

        Ok(())
    }
}

/// The simulator type of a logged normal-play action. Trades that touched an opponent's hand
/// have no simulator counterpart.
pub fn chosen_kind(action_type: ActionType, opponent_hand_changed: bool) -> Option<ActionKind> {
    let kind = match action_type {
        ActionType::Trade if opponent_hand_changed => return None,
        ActionType::Trade => ActionKind::PortTrade,
        ActionType::BuildRoad => ActionKind::BuildRoad,
        ActionType::BuildSettlement => ActionKind::BuildSettlement,
        ActionType::BuildCity => ActionKind::BuildCity,
        ActionType::PlayKnight => ActionKind::PlayKnight,
        ActionType::PlayDiscovery => ActionKind::PlayDiscovery,
        ActionType::PlayMonopoly => ActionKind::PlayMonopoly,
        ActionType::PlayRoadBuilding => ActionKind::PlayRoadBuilding,
        ActionType::BuyDevCard => ActionKind::BuyCard,
        _ => ActionKind::EndTurn,
    };

    Some(kind)
}

/// Tallies the legal and chosen action types at every normal-play decision of one game.
pub fn action_type_stats<L: GameLog + ?Sized>(
    log: &L,
    game_id: u64,
    diagnostics: &mut Diagnostics,
) -> Result<ActionTypeStats> {
    let game = LoggedGame::new(log, game_id);
    let mut stats = ActionTypeStats::new();
    let start = game.first_roll()?.unwrap_or(1);

    for i in start..game.table_size()? {
        let (Some(action), Some(mut before)) = (game.find_action(i + 1)?, game.find_row(i)?) else {
            continue;
        };
        if !is_normal_play(action.action_type, before.observed.dice) {
            continue;
        }

        before.observed.state = LoggedState::Play1;
        let translated = Bridge::for_row(&before.observed).and_then(|bridge| {
            let state = bridge.translate(&before.observed, &before.extended)?;
            Ok(legal_action_kinds(bridge.board(), &state))
        });
        let legal = match translated {
            Ok(legal) => legal,
            Err(err) => {
                diagnostics.record(game_id, i, Task::NormalPlay, err.into());
                continue;
            }
        };

        let opponent_hand_changed = action.action_type == ActionType::Trade
            && match game.find_row(i + 1)? {
                Some(after) => {
                    let current = before.observed.current_player;
                    (0..NUM_PLAYERS).filter(|p| *p != current).any(|p| {
                        before.observed.players[p].resources != after.observed.players[p].resources
                    })
                }
                None => false,
            };

        let Some(chosen) = chosen_kind(action.action_type, opponent_hand_changed) else {
            diagnostics.record(
                game_id,
                i,
                Task::NormalPlay,
                DiagnosticKind::UnmodelledType(action.action_type),
            );
            continue;
        };

        if !legal.contains(&chosen) {
            diagnostics.record(
                game_id,
                i,
                Task::NormalPlay,
                DiagnosticKind::IllegalType { chosen, legal },
            );
            continue;
        }

        stats.add(legal, chosen);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GameRecord;
    use catan::fixtures::RowBuilder;
    use catan::ActionRow;

    fn action(id: usize, action_type: ActionType) -> ActionRow {
        ActionRow {
            id,
            action_type,
            before: id - 1,
            after: id,
        }
    }

    #[test]
    fn test_chosen_kind() {
        assert_eq!(chosen_kind(ActionType::Trade, false), Some(ActionKind::PortTrade));
        assert_eq!(chosen_kind(ActionType::Trade, true), None);
        assert_eq!(chosen_kind(ActionType::BuyDevCard, false), Some(ActionKind::BuyCard));
        assert_eq!(chosen_kind(ActionType::EndTurn, false), Some(ActionKind::EndTurn));
    }

    #[test]
    fn test_merge_and_display() {
        let legal = vec![ActionKind::EndTurn, ActionKind::BuildRoad];
        let mut stats = ActionTypeStats::new();
        stats.add(legal.clone(), ActionKind::EndTurn);

        let mut other = ActionTypeStats::new();
        other.add(legal.clone(), ActionKind::BuildRoad);
        other.add(legal.clone(), ActionKind::EndTurn);
        stats.merge(other);

        assert_eq!(stats.num_decisions(), 3);
        assert_eq!(stats.chosen(&legal).map(<[_]>::len), Some(3));
        assert_eq!(
            stats.to_string(),
            "[end turn, build road] -> end turn:2, build road:1\n"
        );
    }

    #[test]
    fn test_collects_normal_play_decisions() {
        let row = |id| {
            RowBuilder::new()
                .id(id)
                .dice(6)
                .settlement(0x67, 0)
                .hand(0, [1, 0, 0, 0, 0])
                .snapshot()
                .unwrap()
        };
        let rows = (1..=4).map(row).collect();
        let actions = vec![
            action(1, ActionType::Roll),
            action(2, ActionType::EndTurn),
            action(3, ActionType::BuildCity),
            action(4, ActionType::EndTurn),
        ];
        let record = GameRecord::new(9, rows, actions);

        let mut diagnostics = Diagnostics::new();
        let stats = action_type_stats(&record, 9, &mut diagnostics).unwrap();

        // The city is unaffordable; both turn ends are recorded.
        assert_eq!(stats.num_decisions(), 2);
        assert_eq!(
            diagnostics.count(|k| matches!(k, DiagnosticKind::IllegalType { .. })),
            1
        );
    }
}
