use std::collections::HashMap;

use log::debug;

use super::board::Board;
use super::coords::{EDGE_OFFSETS, LOGGED_HEX_IDS, VERTEX_OFFSETS};
use super::error::TranslationError;
use super::logged::{ExtendedRow, LoggedState, ObservedRow, PieceKind, NUM_LOGGED_CARDS};
use super::resource::{DevCard, DEV_DECK_SIZE};
use super::state::{SimState, Step, VertexState, NUM_PLAYERS};

/// Maps logged coordinates onto simulator indices for one board. The tables are built once
/// when the bridge is created.
#[derive(Clone, Debug)]
pub struct Bridge {
    board: Board,
    hex_layout: Vec<i32>,
    number_layout: Vec<i32>,
    vertex_to_sim: HashMap<i32, usize>,
    edge_to_sim: HashMap<i32, usize>,
    vertex_to_logged: Vec<i32>,
    edge_to_logged: Vec<i32>,
}

impl Bridge {
    pub fn new(hex_layout: &[i32], number_layout: &[i32]) -> Result<Self, TranslationError> {
        let board = Board::from_logged_layout(hex_layout, number_layout)?;

        let mut vertex_to_sim = HashMap::new();
        let mut edge_to_sim = HashMap::new();
        let mut vertex_to_logged = vec![0; board.num_vertices()];
        let mut edge_to_logged = vec![0; board.num_edges()];

        for hex_id in LOGGED_HEX_IDS {
            let hex = board
                .hex_index_of_logged(hex_id)
                .ok_or(TranslationError::UnknownHex(hex_id))?;

            for k in 0..6 {
                if let Some(v) = board.hex_corner(hex, k) {
                    let coord = hex_id + VERTEX_OFFSETS[k];
                    vertex_to_sim.insert(coord, v);
                    vertex_to_logged[v] = coord;
                }
                if let Some(e) = board.hex_side(hex, k) {
                    let coord = hex_id + EDGE_OFFSETS[k];
                    edge_to_sim.insert(coord, e);
                    edge_to_logged[e] = coord;
                }
            }
        }

        debug!(
            "Bridged board with {} vertices and {} edges",
            vertex_to_sim.len(),
            edge_to_sim.len()
        );

        Ok(Self {
            board,
            hex_layout: hex_layout.to_vec(),
            number_layout: number_layout.to_vec(),
            vertex_to_sim,
            edge_to_sim,
            vertex_to_logged,
            edge_to_logged,
        })
    }

    pub fn for_row(row: &ObservedRow) -> Result<Self, TranslationError> {
        Self::new(&row.hex_layout, &row.number_layout)
    }

    /// Whether `row` was logged on the board this bridge was built for.
    pub fn serves(&self, row: &ObservedRow) -> bool {
        self.hex_layout == row.hex_layout && self.number_layout == row.number_layout
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn vertex(&self, coord: i32) -> Result<usize, TranslationError> {
        self.vertex_to_sim
            .get(&coord)
            .copied()
            .ok_or(TranslationError::UnknownVertex(coord))
    }

    pub fn edge(&self, coord: i32) -> Result<usize, TranslationError> {
        self.edge_to_sim
            .get(&coord)
            .copied()
            .ok_or(TranslationError::UnknownEdge(coord))
    }

    pub fn hex(&self, hex_id: i32) -> Result<usize, TranslationError> {
        self.board
            .hex_index_of_logged(hex_id)
            .ok_or(TranslationError::UnknownHex(hex_id))
    }

    /// The robber may only stand on land, desert included.
    pub fn robber(&self, hex_id: i32) -> Result<usize, TranslationError> {
        self.hex(hex_id)
            .ok()
            .filter(|h| self.board.is_land(*h))
            .ok_or(TranslationError::RobberOffBoard(hex_id))
    }

    pub fn logged_vertex(&self, vertex: usize) -> i32 {
        self.vertex_to_logged[vertex]
    }

    pub fn logged_edge(&self, edge: usize) -> i32 {
        self.edge_to_logged[edge]
    }

    /// Copies the row's roads, settlements and cities onto `state` and marks vertices too
    /// close to build on.
    pub fn place_pieces(&self, row: &ObservedRow, state: &mut SimState) -> Result<(), TranslationError> {
        for piece in &row.pieces {
            if piece.owner >= NUM_PLAYERS {
                return Err(TranslationError::UnknownPlayer(piece.owner));
            }

            let player = &mut state.players[piece.owner];
            match piece.kind {
                PieceKind::Road => {
                    state.edges[self.edge(piece.coord)?] = Some(piece.owner);
                    player.roads += 1;
                }
                PieceKind::Settlement => {
                    state.vertices[self.vertex(piece.coord)?] = VertexState::Settlement(piece.owner);
                    player.settlements += 1;
                }
                PieceKind::City => {
                    state.vertices[self.vertex(piece.coord)?] = VertexState::City(piece.owner);
                    player.cities += 1;
                }
            }
        }

        state.mark_too_close(&self.board);

        Ok(())
    }

    /// Builds the simulator state for a logged row. The decision step comes from the row's
    /// game state tag.
    pub fn translate(&self, row: &ObservedRow, extended: &ExtendedRow) -> Result<SimState, TranslationError> {
        let step = step_for(row.state)?;
        let current = row.current_player;
        if current >= NUM_PLAYERS {
            return Err(TranslationError::UnknownPlayer(current));
        }

        let mut state = SimState::new(&self.board);
        state.starting_player = row.starting_player;
        state.seated = std::array::from_fn(|p| row.players[p].is_seated());
        state.set_decision(step, current);
        state.robber = self.robber(row.robber_hex)?;
        state.dice = row.dice.max(0);
        self.place_pieces(row, &mut state)?;

        state.largest_army = (0..NUM_PLAYERS).find(|p| row.players[*p].largest_army);
        state.longest_road = (0..NUM_PLAYERS).find(|p| row.players[*p].longest_road);
        state.cards_gone = DEV_DECK_SIZE - row.dev_cards_left;

        for p in 0..NUM_PLAYERS {
            let logged = &row.players[p];
            let sim = &mut state.players[p];

            sim.longest_road = extended.players[p].longest_road;
            sim.played_card = p == current && row.played_dev_card;
            sim.resources = logged.hand();
            for (has, count) in sim.ports.iter_mut().zip(logged.touching_ports) {
                *has = count > 0;
            }

            sim.used_cards = [
                logged.played_knights,
                logged.played_road_building,
                logged.played_discovery,
                logged.played_monopoly,
                0,
            ];
            sim.old_cards[..NUM_LOGGED_CARDS].copy_from_slice(&logged.old_dev_cards);
            sim.new_cards[..NUM_LOGGED_CARDS].copy_from_slice(&logged.new_dev_cards);
            sim.old_cards[DevCard::VictoryPoint.index()] = logged.vp_cards;
        }

        if matches!(step, Step::Road1 | Step::Road2) {
            state.last_vertex = self.unconnected_settlement(&state, current);
        }

        state.recalc_scores();

        Ok(state)
    }

    /// The settlement an initial road is about to be attached to.
    fn unconnected_settlement(&self, state: &SimState, player: usize) -> Option<usize> {
        (0..self.board.num_vertices())
            .filter(|v| state.vertices[*v] == VertexState::Settlement(player))
            .filter(|v| {
                !self
                    .board
                    .vertex_edges(*v)
                    .iter()
                    .any(|e| state.edges[*e] == Some(player))
            })
            .last()
    }
}

/// Simulator step for a logged game state tag.
pub fn step_for(state: LoggedState) -> Result<Step, TranslationError> {
    let step = match state {
        LoggedState::Start1A => Step::Settlement1,
        LoggedState::Start1B => Step::Road1,
        LoggedState::Start2A => Step::Settlement2,
        LoggedState::Start2B => Step::Road2,
        LoggedState::Play => Step::BeforeDice,
        LoggedState::Play1 => Step::Normal,
        LoggedState::WaitingForDiscards => Step::PayTax,
        LoggedState::PlacingFreeRoad1 => Step::FreeRoad1,
        LoggedState::PlacingFreeRoad2 => Step::FreeRoad2,
        LoggedState::PlacingRobber => Step::RobberAt7,
        other => return Err(TranslationError::UnknownState(other.to_string())),
    };

    Ok(step)
}
