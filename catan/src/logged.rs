use serde::{Deserialize, Serialize};
use std::fmt;

use super::board::Board;
use super::bridge::Bridge;
use super::error::TranslationError;
use super::longest_road::longest_road;
use super::resource::{NUM_PORT_KINDS, NUM_RESOURCES};
use super::state::{SimState, VertexState, NUM_PLAYERS};

/// Number of unplayed or new development card kinds tracked per player:
/// `[knight, road building, discovery, monopoly]`.
pub const NUM_LOGGED_CARDS: usize = 4;

/// Game state tags recorded by the game server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoggedState {
    Start1A,
    Start1B,
    Start2A,
    Start2B,
    Play,
    Play1,
    PlacingRoad,
    PlacingSettlement,
    PlacingCity,
    PlacingRobber,
    PlacingFreeRoad1,
    PlacingFreeRoad2,
    WaitingForDiscards,
    WaitingForChoice,
    WaitingForDiscovery,
    WaitingForMonopoly,
    Over,
}

impl fmt::Display for LoggedState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    Road,
    Settlement,
    City,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub coord: i32,
    pub owner: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    /// `-1` marks an empty seat.
    pub seat_id: i32,
    pub public_vp: i32,
    pub total_vp: i32,
    pub largest_army: bool,
    pub longest_road: bool,
    pub vp_cards: i32,
    pub old_dev_cards: [i32; NUM_LOGGED_CARDS],
    pub new_dev_cards: [i32; NUM_LOGGED_CARDS],
    pub played_knights: i32,
    pub played_road_building: i32,
    pub played_discovery: i32,
    pub played_monopoly: i32,
    /// `[clay, ore, sheep, wheat, wood, unknown]`
    pub resources: [i32; NUM_RESOURCES + 1],
    /// `[misc, clay, ore, sheep, wheat, wood]`
    pub touching_ports: [i32; NUM_PORT_KINDS],
    /// Dice numbers each resource is collected on; a city lists its numbers twice.
    pub touching_numbers: [Vec<i32>; NUM_RESOURCES],
}

impl Default for PlayerRow {
    fn default() -> Self {
        Self {
            seat_id: 0,
            public_vp: 0,
            total_vp: 0,
            largest_army: false,
            longest_road: false,
            vp_cards: 0,
            old_dev_cards: [0; NUM_LOGGED_CARDS],
            new_dev_cards: [0; NUM_LOGGED_CARDS],
            played_knights: 0,
            played_road_building: 0,
            played_discovery: 0,
            played_monopoly: 0,
            resources: [0; NUM_RESOURCES + 1],
            touching_ports: [0; NUM_PORT_KINDS],
            touching_numbers: Default::default(),
        }
    }
}

impl PlayerRow {
    pub fn is_seated(&self) -> bool {
        self.seat_id != -1
    }

    /// Known resources only, unknown cards excluded.
    pub fn hand(&self) -> [i32; NUM_RESOURCES] {
        std::array::from_fn(|i| self.resources[i])
    }

    pub fn hand_total(&self) -> i32 {
        self.hand().iter().sum()
    }

    pub fn has_dev_cards(&self) -> bool {
        self.old_dev_cards.iter().chain(&self.new_dev_cards).any(|c| *c > 0) || self.vp_cards > 0
    }
}

/// Observable snapshot of one row of a logged game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedRow {
    pub id: usize,
    pub hex_layout: Vec<i32>,
    pub number_layout: Vec<i32>,
    pub robber_hex: i32,
    pub state: LoggedState,
    pub dev_cards_left: i32,
    /// `-1` or `0` when no dice have been rolled this turn.
    pub dice: i32,
    pub starting_player: usize,
    pub current_player: usize,
    pub played_dev_card: bool,
    pub pieces: Vec<Piece>,
    pub players: [PlayerRow; NUM_PLAYERS],
}

impl ObservedRow {
    pub fn pieces_of(&self, kind: PieceKind, player: usize) -> impl Iterator<Item = i32> + '_ {
        self.pieces
            .iter()
            .filter(move |p| p.kind == kind && p.owner == player)
            .map(|p| p.coord)
    }

    pub fn count_of(&self, kind: PieceKind, player: usize) -> i32 {
        self.pieces_of(kind, player).count() as i32
    }

    pub fn player(&self, player: usize) -> &PlayerRow {
        &self.players[player]
    }

    pub fn hand(&self, player: usize) -> [i32; NUM_RESOURCES] {
        self.players[player].hand()
    }

    /// Sets each player's total VP to their settlement count. Early rows of some logs carry
    /// stale VP bookkeeping during initial placement.
    pub fn correct_initial_vp(&mut self) {
        for p in 0..NUM_PLAYERS {
            let settlements = self.count_of(PieceKind::Settlement, p);
            self.players[p].total_vp = settlements;
        }
    }

    /// Recomputes each player's touching ports and numbers from the pieces on the board.
    pub fn refresh_touching(&mut self, bridge: &Bridge) -> Result<(), TranslationError> {
        let board = bridge.board();
        let mut occupancy = SimState::new(board);
        bridge.place_pieces(self, &mut occupancy)?;

        for (p, player) in self.players.iter_mut().enumerate() {
            player.touching_ports = [0; NUM_PORT_KINDS];
            player.touching_numbers = Default::default();

            for (v, building) in occupancy.vertices.iter().enumerate() {
                if building.owner() != Some(p) {
                    continue;
                }
                if let Some(kind) = board.port(v) {
                    player.touching_ports[kind.index()] = 1;
                }
                for (_, resource, number) in board.producing_hexes(v) {
                    for _ in 0..building.weight() {
                        player.touching_numbers[resource.index()].push(number);
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedPlayer {
    pub longest_road: i32,
    /// Buildings touching each resource, cities counting twice.
    pub resource_access: [i32; NUM_RESOURCES],
    /// Road steps to the nearest opponent building, `-1` when unreachable.
    pub distance_to_opponent: i32,
    pub distance_to_port: i32,
    pub distance_to_legal: i32,
}

/// Derived per-player metrics stored alongside an observed row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedRow {
    pub id: usize,
    pub players: [ExtendedPlayer; NUM_PLAYERS],
}

impl ExtendedRow {
    /// Recomputes the derived metrics from the pieces on the board.
    pub fn derive(observed: &ObservedRow, bridge: &Bridge) -> Result<Self, TranslationError> {
        let board = bridge.board();
        let mut occupancy = SimState::new(board);
        bridge.place_pieces(observed, &mut occupancy)?;

        let mut players: [ExtendedPlayer; NUM_PLAYERS] = Default::default();
        for (p, ext) in players.iter_mut().enumerate() {
            ext.longest_road = longest_road(board, &occupancy, p);
            for (v, building) in occupancy.vertices.iter().enumerate() {
                if building.owner() != Some(p) {
                    continue;
                }
                for (_, resource, _) in board.producing_hexes(v) {
                    ext.resource_access[resource.index()] += building.weight();
                }
            }

            let network = network_vertices(board, &occupancy, p);
            ext.distance_to_opponent = distance(board, &network, |v| {
                matches!(occupancy.vertices[v].owner(), Some(o) if o != p)
            });
            ext.distance_to_port = distance(board, &network, |v| board.port(v).is_some());
            ext.distance_to_legal = distance(board, &network, |v| {
                occupancy.vertices[v] == VertexState::Empty
            });
        }

        Ok(Self {
            id: observed.id,
            players,
        })
    }
}

/// Vertices a player's buildings and roads reach.
fn network_vertices(board: &Board, state: &SimState, player: usize) -> Vec<usize> {
    let mut vertices: Vec<usize> = (0..board.num_vertices())
        .filter(|v| state.vertices[*v].owner() == Some(player))
        .collect();

    for e in (0..board.num_edges()).filter(|e| state.edges[*e] == Some(player)) {
        vertices.extend(board.edge_vertices(e));
    }

    vertices.sort_unstable();
    vertices.dedup();
    vertices
}

/// Breadth-first road steps from `sources` to the closest vertex matching `target`.
fn distance(board: &Board, sources: &[usize], target: impl Fn(usize) -> bool) -> i32 {
    let mut dist = vec![-1; board.num_vertices()];
    let mut queue = std::collections::VecDeque::new();
    for s in sources {
        dist[*s] = 0;
        queue.push_back(*s);
    }

    while let Some(v) = queue.pop_front() {
        if target(v) {
            return dist[v];
        }
        for n in board.vertex_neighbors(v) {
            if dist[*n] == -1 {
                dist[*n] = dist[v] + 1;
                queue.push_back(*n);
            }
        }
    }

    -1
}

/// Logged and simulated views of one row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedSnapshot {
    pub observed: ObservedRow,
    pub extended: ExtendedRow,
}

/// Logged action categories. The numeric codes order the categories; `Build` and `PlayDevCard`
/// are parents of the sub-types that follow them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ActionType {
    Trade,
    EndTurn,
    Roll,
    Build,
    BuildRoad,
    BuildSettlement,
    BuildCity,
    MoveRobber,
    ChoosePlayer,
    Discard,
    BuyDevCard,
    PlayDevCard,
    PlayKnight,
    PlayMonopoly,
    PlayDiscovery,
    PlayRoadBuilding,
    Win,
}

impl ActionType {
    pub const ALL: [ActionType; 17] = [
        ActionType::Trade,
        ActionType::EndTurn,
        ActionType::Roll,
        ActionType::Build,
        ActionType::BuildRoad,
        ActionType::BuildSettlement,
        ActionType::BuildCity,
        ActionType::MoveRobber,
        ActionType::ChoosePlayer,
        ActionType::Discard,
        ActionType::BuyDevCard,
        ActionType::PlayDevCard,
        ActionType::PlayKnight,
        ActionType::PlayMonopoly,
        ActionType::PlayDiscovery,
        ActionType::PlayRoadBuilding,
        ActionType::Win,
    ];

    pub fn code(self) -> f64 {
        match self {
            ActionType::Trade => 1.0,
            ActionType::EndTurn => 2.0,
            ActionType::Roll => 3.0,
            ActionType::Build => 4.0,
            ActionType::BuildRoad => 4.1,
            ActionType::BuildSettlement => 4.2,
            ActionType::BuildCity => 4.3,
            ActionType::MoveRobber => 5.0,
            ActionType::ChoosePlayer => 6.0,
            ActionType::Discard => 7.0,
            ActionType::BuyDevCard => 8.0,
            ActionType::PlayDevCard => 9.0,
            ActionType::PlayKnight => 9.1,
            ActionType::PlayMonopoly => 9.2,
            ActionType::PlayDiscovery => 9.3,
            ActionType::PlayRoadBuilding => 9.4,
            ActionType::Win => 10.0,
        }
    }
}

impl TryFrom<f64> for ActionType {
    type Error = String;

    fn try_from(code: f64) -> Result<Self, Self::Error> {
        ActionType::ALL
            .into_iter()
            .find(|t| (t.code() - code).abs() < 1e-9)
            .ok_or_else(|| format!("unknown action type code {}", code))
    }
}

impl From<ActionType> for f64 {
    fn from(action_type: ActionType) -> Self {
        action_type.code()
    }
}

/// The action taken between row `before` and row `after`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRow {
    pub id: usize,
    pub action_type: ActionType,
    pub before: usize,
    pub after: usize,
}
