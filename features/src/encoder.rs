use catan::{Board, Bridge, ExtendedRow, ObservedRow, SimState, TranslationError};

use super::layout::Layout;
use super::logged_view::logged_view;
use super::simulated_view::simulated_view;
use super::vector::StateVector;
use super::view::StateView;

/// Writes positions into the vectors of one layout.
#[derive(Clone, Debug)]
pub struct StateEncoder {
    layout: Layout,
}

impl StateEncoder {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn encode(&self, view: &StateView) -> StateVector {
        let mut values = vec![0; self.layout.len()];
        for slot in self.layout.slots() {
            let raws = view.channels(slot.field);
            for (channel, raw) in raws.into_iter().enumerate().take(slot.channels) {
                slot.rule.write(raw, &mut values[slot.channel_range(channel)]);
            }
        }

        StateVector::new(self.layout.version(), values)
    }

    pub fn encode_logged(
        &self,
        observed: &ObservedRow,
        extended: &ExtendedRow,
        bridge: &Bridge,
    ) -> Result<StateVector, TranslationError> {
        Ok(self.encode(&logged_view(observed, extended, bridge)?))
    }

    pub fn encode_simulated(&self, state: &SimState, board: &Board) -> StateVector {
        self.encode(&simulated_view(state, board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Field, LayoutVersion, OpponentField};
    use catan::coords::LOGGED_HEX_IDS;
    use catan::fixtures::{RowBuilder, BEGINNER_HEX_LAYOUT, BEGINNER_NUMBER_LAYOUT};
    use catan::{LoggedSnapshot, LoggedState};

    fn encoders() -> [StateEncoder; 2] {
        [LayoutVersion::BINARY, LayoutVersion::NUMERIC]
            .map(|v| StateEncoder::new(Layout::new(v).unwrap()))
    }

    /// A mid-game position with the robber on one of player 1's hexes.
    fn mid_game() -> LoggedSnapshot {
        let bridge = Bridge::new(&BEGINNER_HEX_LAYOUT, &BEGINNER_NUMBER_LAYOUT).unwrap();
        let home = bridge.vertex(0x67).unwrap();
        let robber = LOGGED_HEX_IDS
            .iter()
            .copied()
            .find(|id| {
                bridge
                    .robber(*id)
                    .map_or(false, |h| bridge.board().hex_vertices(h).any(|v| v == home))
            })
            .unwrap();

        RowBuilder::new()
            .state(LoggedState::Play1)
            .current_player(1)
            .dice(8)
            .dev_cards_left(20)
            .played_dev_card()
            .robber(robber)
            .settlement(0x67, 1)
            .city(0x89, 1)
            .road(0x78, 1)
            .settlement(0x87, 2)
            .hand(1, [2, 3, 1, 2, 0])
            .hand(2, [1, 1, 0, 0, 0])
            .largest_army(3)
            .with_player(1, |p| {
                p.old_dev_cards = [1, 0, 1, 0];
                p.new_dev_cards = [0, 1, 0, 0];
                p.played_knights = 2;
                p.vp_cards = 1;
            })
            .with_player(3, |p| p.played_knights = 3)
            .snapshot()
            .unwrap()
    }

    #[test]
    fn test_logged_and_simulated_agree() {
        let snapshot = mid_game();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let state = bridge.translate(&snapshot.observed, &snapshot.extended).unwrap();

        for encoder in encoders() {
            let logged = encoder
                .encode_logged(&snapshot.observed, &snapshot.extended, &bridge)
                .unwrap();
            let simulated = encoder.encode_simulated(&state, bridge.board());
            assert_eq!(logged, simulated, "layout {}", encoder.layout().version());
        }
    }

    #[test]
    fn test_views_agree_with_empty_seat() {
        let snapshot = RowBuilder::new()
            .empty_seat(2)
            .current_player(3)
            .settlement(0x67, 3)
            .hand(3, [0, 0, 5, 0, 4])
            .snapshot()
            .unwrap();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let state = bridge.translate(&snapshot.observed, &snapshot.extended).unwrap();

        let logged = logged_view(&snapshot.observed, &snapshot.extended, &bridge).unwrap();
        assert_eq!(logged, simulated_view(&state, bridge.board()));
        assert!(logged.opponents[2].is_none());
        assert_eq!(logged.me.board_position, 3);
    }

    #[test]
    fn test_vector_lengths() {
        let snapshot = mid_game();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        for encoder in encoders() {
            let vector = encoder
                .encode_logged(&snapshot.observed, &snapshot.extended, &bridge)
                .unwrap();
            assert_eq!(vector.len(), encoder.layout().len());
            assert_eq!(vector.version(), encoder.layout().version());
        }
    }

    #[test]
    fn test_binary_vector_is_indicators() {
        let snapshot = mid_game();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let encoder = StateEncoder::new(Layout::new(LayoutVersion::BINARY).unwrap());
        let vector = encoder
            .encode_logged(&snapshot.observed, &snapshot.extended, &bridge)
            .unwrap();
        assert!(vector.values().iter().all(|v| *v == 0 || *v == 1));
    }

    #[test]
    fn test_numeric_fields() {
        let snapshot = mid_game();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let encoder = StateEncoder::new(Layout::new(LayoutVersion::NUMERIC).unwrap());
        let layout = encoder.layout();
        let vector = encoder
            .encode_logged(&snapshot.observed, &snapshot.extended, &bridge)
            .unwrap();
        let at = |field| vector.values()[layout.offset_of(field).unwrap()];

        assert_eq!(at(Field::Bias), 1);
        assert_eq!(at(Field::CurrentTurn), 1);
        assert_eq!(at(Field::DiceResult), 6);
        assert_eq!(at(Field::BoardPosition), 2);
        // One settlement, one city, one VP card.
        assert_eq!(at(Field::Score), 4);
        assert_eq!(at(Field::Cities), 1);
        assert_eq!(at(Field::AffectedByRobber), 1);
        assert_eq!(at(Field::PlayersAffected), 1);
        assert_eq!(at(Field::CanBuildCity), 1);
        assert_eq!(at(Field::Over7Cards), 1);
        // The one road on the board can still be extended by two.
        assert_eq!(at(Field::ExpansionPossibility), 10);
        assert_eq!(at(Field::Opponent(1, OpponentField::LargestArmy)), 1);
        assert_eq!(at(Field::Opponent(0, OpponentField::TotalResources)), 2);
    }

    #[test]
    fn test_binary_dice_bucket() {
        let snapshot = RowBuilder::new().dice(7).snapshot().unwrap();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let encoder = StateEncoder::new(Layout::new(LayoutVersion::BINARY).unwrap());
        let layout = encoder.layout();
        let vector = encoder
            .encode_logged(&snapshot.observed, &snapshot.extended, &bridge)
            .unwrap();

        let dice = layout.offset_of(Field::DiceResult).unwrap();
        assert_eq!(&vector.values()[dice..dice + 6], &[1, 0, 0, 0, 0, 0]);
    }
}
