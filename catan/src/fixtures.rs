//! A fixed reference board and a builder for logged rows on it. Used to produce synthetic
//! logs and as a starting point in tests.

use super::board::Board;
use super::bridge::Bridge;
use super::coords::NUM_HEXES;
use super::error::TranslationError;
use super::logged::{
    ExtendedRow, LoggedSnapshot, LoggedState, ObservedRow, Piece, PieceKind, PlayerRow,
};
use super::resource::NUM_RESOURCES;
use super::state::NUM_PLAYERS;

/// Hex types in logged hex order; the desert is the centre hex `0x77`.
pub const BEGINNER_HEX_LAYOUT: [i32; NUM_HEXES] = [
    7, 6, 9, 6, //
    6, 2, 3, 5, 7, //
    10, 4, 1, 3, 1, 6, //
    6, 4, 5, 0, 5, 2, 11, //
    8, 5, 2, 4, 3, 6, //
    6, 1, 4, 3, 7, //
    12, 6, 7, 6,
];

/// Dice numbers in logged hex order, `0` for sea and desert.
pub const BEGINNER_NUMBER_LAYOUT: [i32; NUM_HEXES] = [
    0, 0, 0, 0, //
    0, 10, 2, 9, 0, //
    0, 12, 6, 4, 10, 0, //
    0, 9, 11, 0, 3, 8, 0, //
    0, 8, 3, 4, 5, 0, //
    0, 5, 6, 11, 0, //
    0, 0, 0, 0,
];

pub const DESERT_HEX: i32 = 0x77;

pub fn beginner_board() -> Board {
    match Board::from_logged_layout(&BEGINNER_HEX_LAYOUT, &BEGINNER_NUMBER_LAYOUT) {
        Ok(board) => board,
        Err(err) => unreachable!("reference layout is valid: {}", err),
    }
}

/// Builds an [`ObservedRow`] on the beginner board. All four seats are taken, player 0
/// starts, and the row is in normal play unless changed.
#[derive(Clone, Debug)]
pub struct RowBuilder {
    row: ObservedRow,
}

impl Default for RowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RowBuilder {
    pub fn new() -> Self {
        let players = std::array::from_fn(|p| PlayerRow {
            seat_id: p as i32,
            ..Default::default()
        });

        Self {
            row: ObservedRow {
                id: 0,
                hex_layout: BEGINNER_HEX_LAYOUT.to_vec(),
                number_layout: BEGINNER_NUMBER_LAYOUT.to_vec(),
                robber_hex: DESERT_HEX,
                state: LoggedState::Play1,
                dev_cards_left: 25,
                dice: 0,
                starting_player: 0,
                current_player: 0,
                played_dev_card: false,
                pieces: vec![],
                players,
            },
        }
    }

    pub fn id(mut self, id: usize) -> Self {
        self.row.id = id;
        self
    }

    pub fn state(mut self, state: LoggedState) -> Self {
        self.row.state = state;
        self
    }

    pub fn current_player(mut self, player: usize) -> Self {
        self.row.current_player = player;
        self
    }

    pub fn starting_player(mut self, player: usize) -> Self {
        self.row.starting_player = player;
        self
    }

    pub fn dice(mut self, dice: i32) -> Self {
        self.row.dice = dice;
        self
    }

    pub fn robber(mut self, hex_id: i32) -> Self {
        self.row.robber_hex = hex_id;
        self
    }

    pub fn dev_cards_left(mut self, left: i32) -> Self {
        self.row.dev_cards_left = left;
        self
    }

    pub fn played_dev_card(mut self) -> Self {
        self.row.played_dev_card = true;
        self
    }

    pub fn empty_seat(mut self, player: usize) -> Self {
        self.row.players[player] = PlayerRow {
            seat_id: -1,
            ..Default::default()
        };
        self
    }

    pub fn settlement(self, coord: i32, owner: usize) -> Self {
        self.piece(PieceKind::Settlement, coord, owner)
    }

    pub fn city(self, coord: i32, owner: usize) -> Self {
        self.piece(PieceKind::City, coord, owner)
    }

    pub fn road(self, coord: i32, owner: usize) -> Self {
        self.piece(PieceKind::Road, coord, owner)
    }

    pub fn hand(mut self, player: usize, hand: [i32; NUM_RESOURCES]) -> Self {
        self.row.players[player].resources[..NUM_RESOURCES].copy_from_slice(&hand);
        self
    }

    pub fn longest_road(mut self, player: usize) -> Self {
        self.row.players[player].longest_road = true;
        self
    }

    pub fn largest_army(mut self, player: usize) -> Self {
        self.row.players[player].largest_army = true;
        self
    }

    pub fn with_player(mut self, player: usize, f: impl FnOnce(&mut PlayerRow)) -> Self {
        f(&mut self.row.players[player]);
        self
    }

    fn piece(mut self, kind: PieceKind, coord: i32, owner: usize) -> Self {
        self.row.pieces.push(Piece { kind, coord, owner });
        self
    }

    /// The row with VP totals computed from pieces, cards and awards.
    pub fn build(self) -> ObservedRow {
        let mut row = self.row;
        for p in 0..NUM_PLAYERS {
            let settlements = row.count_of(PieceKind::Settlement, p);
            let cities = row.count_of(PieceKind::City, p);
            let player = &mut row.players[p];
            let awards = 2 * (player.longest_road as i32 + player.largest_army as i32);
            player.public_vp = settlements + 2 * cities + awards;
            player.total_vp = player.public_vp + player.vp_cards;
        }

        row
    }

    /// The row with its touching ports and numbers refreshed, plus the derived extended row.
    pub fn snapshot(self) -> Result<LoggedSnapshot, TranslationError> {
        let mut observed = self.build();
        let bridge = Bridge::for_row(&observed)?;
        observed.refresh_touching(&bridge)?;
        let extended = ExtendedRow::derive(&observed, &bridge)?;

        Ok(LoggedSnapshot { observed, extended })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_counts_vp() {
        let row = RowBuilder::new()
            .settlement(0x67, 2)
            .city(0x89, 2)
            .largest_army(2)
            .with_player(2, |p| p.vp_cards = 1)
            .build();
        assert_eq!(row.players[2].public_vp, 5);
        assert_eq!(row.players[2].total_vp, 6);
    }

    #[test]
    fn test_snapshot_refreshes_touching_numbers() {
        let snapshot = RowBuilder::new().city(0x67, 0).snapshot().unwrap();
        let numbers: usize = snapshot.observed.players[0]
            .touching_numbers
            .iter()
            .map(|n| n.len())
            .sum();
        let bridge = Bridge::for_row(&snapshot.observed).unwrap();
        let vertex = bridge.vertex(0x67).unwrap();
        assert_eq!(numbers, 2 * bridge.board().producing_hexes(vertex).count());
    }
}
