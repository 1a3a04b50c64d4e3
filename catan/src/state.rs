use engine::GameState;

use super::board::{Board, NUM_EDGES, NUM_VERTICES};
use super::longest_road::longest_road;
use super::resource::{DevCard, PortKind, NUM_DEV_CARD_KINDS, NUM_PORT_KINDS, NUM_RESOURCES};

pub const NUM_PLAYERS: usize = 4;

/// Decision step of the simulator's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Settlement1,
    Road1,
    Settlement2,
    Road2,
    BeforeDice,
    Normal,
    PayTax,
    FreeRoad1,
    FreeRoad2,
    RobberAt7,
}

impl Step {
    /// Interrupt steps are resolved one level above the turn they interrupt.
    pub fn is_interrupt(self) -> bool {
        matches!(self, Step::PayTax | Step::RobberAt7)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexState {
    #[default]
    Empty,
    TooClose,
    Settlement(usize),
    City(usize),
}

impl VertexState {
    pub fn owner(self) -> Option<usize> {
        match self {
            VertexState::Settlement(p) | VertexState::City(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_occupied(self) -> bool {
        self.owner().is_some()
    }

    /// Production weight of the building: settlements 1, cities 2.
    pub fn weight(self) -> i32 {
        match self {
            VertexState::Settlement(_) => 1,
            VertexState::City(_) => 2,
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub settlements: i32,
    pub cities: i32,
    pub roads: i32,
    pub longest_road: i32,
    pub played_card: bool,
    pub ports: [bool; NUM_PORT_KINDS],
    pub used_cards: [i32; NUM_DEV_CARD_KINDS],
    pub new_cards: [i32; NUM_DEV_CARD_KINDS],
    pub old_cards: [i32; NUM_DEV_CARD_KINDS],
    pub resources: [i32; NUM_RESOURCES],
    pub score: i32,
}

impl PlayerState {
    pub fn hand_total(&self) -> i32 {
        self.resources.iter().sum()
    }

    pub fn can_afford(&self, cost: &[i32; NUM_RESOURCES]) -> bool {
        self.resources.iter().zip(cost).all(|(have, need)| have >= need)
    }

    pub fn pay(&mut self, cost: &[i32; NUM_RESOURCES]) {
        for (have, need) in self.resources.iter_mut().zip(cost) {
            *have -= need;
        }
    }

    pub fn knights_played(&self) -> i32 {
        self.used_cards[DevCard::Knight.index()]
    }

    pub fn victory_cards(&self) -> i32 {
        let vp = DevCard::VictoryPoint.index();
        self.old_cards[vp] + self.new_cards[vp]
    }

    pub fn has_port(&self, kind: PortKind) -> bool {
        self.ports[kind.index()]
    }
}

/// Compact simulator state. Board tiles and topology live in a shared [`Board`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimState {
    pub vertices: Vec<VertexState>,
    pub edges: Vec<Option<usize>>,
    pub robber: usize,
    pub dice: i32,
    pub fsm_level: usize,
    pub fsm_step: [Step; 2],
    pub fsm_player: [usize; 2],
    pub starting_player: usize,
    pub seated: [bool; NUM_PLAYERS],
    pub last_vertex: Option<usize>,
    pub largest_army: Option<usize>,
    pub longest_road: Option<usize>,
    pub cards_gone: i32,
    pub players: [PlayerState; NUM_PLAYERS],
}

impl GameState for SimState {
    fn initial() -> Self {
        Self {
            vertices: vec![VertexState::Empty; NUM_VERTICES],
            edges: vec![None; NUM_EDGES],
            robber: 0,
            dice: 0,
            fsm_level: 0,
            fsm_step: [Step::Settlement1; 2],
            fsm_player: [0; 2],
            starting_player: 0,
            seated: [true; NUM_PLAYERS],
            last_vertex: None,
            largest_army: None,
            longest_road: None,
            cards_gone: 0,
            players: Default::default(),
        }
    }
}

impl SimState {
    /// Fresh game on `board` with the robber on the desert.
    pub fn new(board: &Board) -> Self {
        let mut state = Self::initial();
        if let Some(desert) = board
            .land_hexes()
            .find(|h| board.tile(*h).resource().is_none())
        {
            state.robber = desert;
        }

        state
    }

    pub fn step(&self) -> Step {
        self.fsm_step[self.fsm_level]
    }

    pub fn current_player(&self) -> usize {
        self.fsm_player[self.fsm_level]
    }

    /// Puts `player` in charge of `step`, using the interrupt level when the step requires it.
    pub fn set_decision(&mut self, step: Step, player: usize) {
        if step.is_interrupt() {
            if self.fsm_level == 0 {
                self.fsm_player[0] = player;
                self.fsm_step[0] = Step::Normal;
            }
            self.fsm_level = 1;
        } else {
            self.fsm_level = 0;
        }

        self.fsm_step[self.fsm_level] = step;
        self.fsm_player[self.fsm_level] = player;
    }

    /// Next seated player after `player` in play order.
    pub fn next_seated(&self, player: usize) -> usize {
        (1..=NUM_PLAYERS)
            .map(|i| (player + i) % NUM_PLAYERS)
            .find(|p| self.seated[*p])
            .unwrap_or(player)
    }

    /// Previous seated player before `player` in play order.
    pub fn previous_seated(&self, player: usize) -> usize {
        (1..=NUM_PLAYERS)
            .map(|i| (player + NUM_PLAYERS * 2 - i) % NUM_PLAYERS)
            .find(|p| self.seated[*p])
            .unwrap_or(player)
    }

    pub fn player(&self, player: usize) -> &PlayerState {
        &self.players[player]
    }

    /// Marks every empty vertex next to a building as too close to build on.
    pub fn mark_too_close(&mut self, board: &Board) {
        for v in 0..self.vertices.len() {
            if self.vertices[v].is_occupied() {
                continue;
            }

            let blocked = board
                .vertex_neighbors(v)
                .iter()
                .any(|n| self.vertices[*n].is_occupied());
            self.vertices[v] = if blocked {
                VertexState::TooClose
            } else {
                VertexState::Empty
            };
        }
    }

    /// Buildings of `player` around `hex`, cities counting twice.
    pub fn pieces_on_hex(&self, board: &Board, hex: usize, player: usize) -> i32 {
        board
            .hex_vertices(hex)
            .map(|v| self.vertices[v])
            .filter(|b| b.owner() == Some(player))
            .map(|b| b.weight())
            .sum()
    }

    pub fn is_on_hex(&self, board: &Board, hex: usize, player: usize) -> bool {
        board
            .hex_vertices(hex)
            .any(|v| self.vertices[v].owner() == Some(player))
    }

    pub fn recalc_scores(&mut self) {
        for p in 0..NUM_PLAYERS {
            let mut score = {
                let player = &self.players[p];
                player.settlements + 2 * player.cities + player.victory_cards()
            };
            if self.longest_road == Some(p) {
                score += 2;
            }
            if self.largest_army == Some(p) {
                score += 2;
            }
            self.players[p].score = score;
        }
    }

    /// Longest road needs at least five segments and must beat the current holder outright.
    pub fn recalc_longest_road(&mut self, board: &Board) {
        for p in 0..NUM_PLAYERS {
            self.players[p].longest_road = longest_road(board, self, p);
        }

        if let Some(holder) = self.longest_road {
            if self.players[holder].longest_road < 5 {
                self.longest_road = None;
            }
        }

        for p in 0..NUM_PLAYERS {
            let length = self.players[p].longest_road;
            let to_beat = self
                .longest_road
                .map_or(4, |h| self.players[h].longest_road);
            if length >= 5 && length > to_beat {
                self.longest_road = Some(p);
            }
        }
    }

    /// Largest army needs at least three knights and must beat the current holder outright.
    pub fn recalc_largest_army(&mut self) {
        for p in 0..NUM_PLAYERS {
            let knights = self.players[p].knights_played();
            let to_beat = self
                .largest_army
                .map_or(2, |h| self.players[h].knights_played());
            if knights >= 3 && knights > to_beat {
                self.largest_army = Some(p);
            }
        }
    }
}
