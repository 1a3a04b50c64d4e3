//! Play-order-relative raw magnitudes of one position. Both encoder entry points build a
//! [`StateView`]; the layout writer turns it into a vector.

use std::collections::VecDeque;

use catan::{
    reduce_number_range, Board, Resource, SimState, VertexState, NUM_PLAYERS, NUM_PORT_KINDS,
    NUM_RESOURCES,
};

use super::layout::{Field, OpponentField, NUM_NEXT_LEGAL, NUM_OPPONENTS};

/// Road steps searched from a player's network for the next building spot.
const NEXT_LEGAL_REACH: usize = 2;

/// Credit for one road that can still be extended by two.
const EXPANSION_VALUE: i32 = 10;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateView {
    /// 0 before the roll, 1 for a seven, otherwise the reduced number.
    pub dice_class: i32,
    pub total_settlements: i32,
    pub total_roads: i32,
    pub total_cities: i32,
    pub dev_cards_left: bool,
    pub blocked_resource: Option<Resource>,
    pub blocked_number: i32,
    pub players_affected: i32,
    pub me: ActingView,
    pub opponents: [Option<OpponentView>; NUM_OPPONENTS],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActingView {
    pub board_position: i32,
    pub played_dev_card: bool,
    pub score: i32,
    pub longest_road_holder: bool,
    pub largest_army_holder: bool,
    pub longest_road: i32,
    pub roads: i32,
    pub settlements: i32,
    pub cities: i32,
    pub hand: [i32; NUM_RESOURCES],
    pub ports: [bool; NUM_PORT_KINDS],
    pub production: [i32; NUM_RESOURCES],
    pub access: [i32; NUM_RESOURCES],
    pub affected: bool,
    pub pieces_affected: i32,
    pub knights: i32,
    /// Road building, discovery, monopoly.
    pub played_dev: [i32; 3],
    pub old_dev: [i32; 4],
    pub new_dev: [i32; 4],
    pub vp_cards: i32,
    pub expansion: i32,
    pub next_legal: [i32; NUM_NEXT_LEGAL],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpponentView {
    pub score: i32,
    pub largest_army: bool,
    pub longest_road_holder: bool,
    pub longest_road: i32,
    pub knights: i32,
    pub has_dev_cards: bool,
    pub affected: bool,
    pub total_resources: i32,
    pub roads: i32,
    pub settlements: i32,
    pub cities: i32,
    pub ports: [bool; NUM_PORT_KINDS],
    pub production: [i32; NUM_RESOURCES],
    pub access: [i32; NUM_RESOURCES],
}

/// What the hand pays for right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Affordability {
    pub buy_card: bool,
    pub road: bool,
    pub settlement: bool,
    pub city: bool,
    pub bank_trade: bool,
    pub over_seven: bool,
}

impl Affordability {
    /// Works on fractional hands so expected hands can be judged with the same thresholds.
    pub fn of(hand: &[f64; NUM_RESOURCES], ports: &[bool; NUM_PORT_KINDS]) -> Self {
        let has = |r: Resource| hand[r.index()] > 0.0;
        let count = |r: Resource| hand[r.index()];

        let bank_trade = Resource::ALL.iter().any(|r| {
            let n = count(*r);
            n >= 4.0 || (ports[0] && n >= 3.0) || (ports[r.index() + 1] && n >= 2.0)
        });

        Self {
            buy_card: has(Resource::Ore) && has(Resource::Sheep) && has(Resource::Wheat),
            road: has(Resource::Clay) && has(Resource::Wood),
            settlement: has(Resource::Clay)
                && has(Resource::Wood)
                && has(Resource::Wheat)
                && has(Resource::Sheep),
            city: count(Resource::Ore) > 2.0 && count(Resource::Wheat) > 1.0,
            bank_trade,
            over_seven: hand.iter().sum::<f64>() > 7.0,
        }
    }

    pub fn of_counts(hand: &[i32; NUM_RESOURCES], ports: &[bool; NUM_PORT_KINDS]) -> Self {
        Self::of(&hand.map(f64::from), ports)
    }

    /// Flag values in layout order, paired with their fields.
    pub fn flags(&self) -> [(Field, bool); 6] {
        [
            (Field::CanBuyCard, self.buy_card),
            (Field::CanBuildRoad, self.road),
            (Field::CanBuildSettlement, self.settlement),
            (Field::CanBuildCity, self.city),
            (Field::CanBankTrade, self.bank_trade),
            (Field::Over7Cards, self.over_seven),
        ]
    }
}

impl ActingView {
    pub fn affordability(&self) -> Affordability {
        Affordability::of_counts(&self.hand, &self.ports)
    }
}

impl StateView {
    /// Raw per-channel magnitudes of `field`. Empty opponent seats read as zeros.
    pub fn channels(&self, field: Field) -> Vec<i32> {
        let me = &self.me;
        let afford = me.affordability();
        let flag = |b: bool| vec![b as i32];

        match field {
            Field::Bias | Field::CurrentTurn => vec![1],
            Field::DiceResult => vec![self.dice_class],
            Field::TotalSettlements => vec![self.total_settlements],
            Field::TotalRoads => vec![self.total_roads],
            Field::TotalCities => vec![self.total_cities],
            Field::AnyDevCardsLeft => flag(self.dev_cards_left),
            Field::ResourceBlocked => Resource::ALL
                .iter()
                .map(|r| (self.blocked_resource == Some(*r)) as i32)
                .collect(),
            Field::NumberBlocked => vec![self.blocked_number],
            Field::PlayersAffected => vec![self.players_affected],
            Field::BoardPosition => vec![me.board_position],
            Field::HasPlayedDevCard => flag(me.played_dev_card),
            Field::Score => vec![me.score],
            Field::LongestRoadHolder => flag(me.longest_road_holder),
            Field::LargestArmyHolder => flag(me.largest_army_holder),
            Field::LongestRoadLength => vec![me.longest_road],
            Field::Roads => vec![me.roads],
            Field::Settlements => vec![me.settlements],
            Field::Cities => vec![me.cities],
            Field::ResourceInHand => me.hand.to_vec(),
            Field::TouchingPorts => me.ports.iter().map(|p| *p as i32).collect(),
            Field::Production => me.production.to_vec(),
            Field::Access => me.access.to_vec(),
            Field::AffectedByRobber => flag(me.affected),
            Field::PiecesAffected => vec![me.pieces_affected],
            Field::PlayedKnights => vec![me.knights],
            Field::PlayedDevCards => me.played_dev.to_vec(),
            Field::OldDevCards => me.old_dev.to_vec(),
            Field::NewDevCards => me.new_dev.to_vec(),
            Field::VpCards => vec![me.vp_cards],
            Field::CanBuyCard => flag(afford.buy_card),
            Field::CanBuildRoad => flag(afford.road),
            Field::CanBuildSettlement => flag(afford.settlement),
            Field::CanBuildCity => flag(afford.city),
            Field::CanBankTrade => flag(afford.bank_trade),
            Field::Over7Cards => flag(afford.over_seven),
            Field::ExpansionPossibility => vec![me.expansion],
            Field::NextLegalProductivity => me.next_legal.to_vec(),
            Field::Opponent(i, field) => match &self.opponents[i] {
                Some(opponent) => opponent.channels(field),
                None => vec![0; OpponentView::default().channels(field).len()],
            },
        }
    }
}

impl OpponentView {
    fn channels(&self, field: OpponentField) -> Vec<i32> {
        match field {
            OpponentField::Score => vec![self.score],
            OpponentField::LargestArmy => vec![self.largest_army as i32],
            OpponentField::LongestRoadHolder => vec![self.longest_road_holder as i32],
            OpponentField::LongestRoadLength => vec![self.longest_road],
            OpponentField::PlayedKnights => vec![self.knights],
            OpponentField::HasDevCards => vec![self.has_dev_cards as i32],
            OpponentField::AffectedByRobber => vec![self.affected as i32],
            OpponentField::TotalResources => vec![self.total_resources],
            OpponentField::Roads => vec![self.roads],
            OpponentField::Settlements => vec![self.settlements],
            OpponentField::Cities => vec![self.cities],
            OpponentField::TouchingPorts => self.ports.iter().map(|p| *p as i32).collect(),
            OpponentField::Production => self.production.to_vec(),
            OpponentField::Access => self.access.to_vec(),
        }
    }
}

/// Players in opponent slots, in play order after `current`.
pub fn opponent_seats(current: usize) -> [usize; NUM_OPPONENTS] {
    std::array::from_fn(|i| (current + 1 + i) % NUM_PLAYERS)
}

/// One-based turn position of `current` counted from the starting player, skipping empty seats.
pub fn board_position(starting: usize, current: usize, seated: &[bool; NUM_PLAYERS]) -> i32 {
    let mut position = 1;
    for i in 0..NUM_PLAYERS {
        let p = (starting + i) % NUM_PLAYERS;
        if p == current {
            break;
        }
        if seated[p] {
            position += 1;
        }
    }

    position
}

/// Summed reduced numbers of the land each resource is produced from, cities counting twice.
pub fn production_of(board: &Board, occupancy: &SimState, player: usize) -> [i32; NUM_RESOURCES] {
    let mut production = [0; NUM_RESOURCES];
    for (v, building) in occupancy.vertices.iter().enumerate() {
        if building.owner() != Some(player) {
            continue;
        }
        for (_, resource, number) in board.producing_hexes(v) {
            production[resource.index()] += building.weight() * reduce_number_range(number);
        }
    }

    production
}

pub fn access_of(board: &Board, occupancy: &SimState, player: usize) -> [i32; NUM_RESOURCES] {
    let mut access = [0; NUM_RESOURCES];
    for (v, building) in occupancy.vertices.iter().enumerate() {
        if building.owner() != Some(player) {
            continue;
        }
        for (_, resource, _) in board.producing_hexes(v) {
            access[resource.index()] += building.weight();
        }
    }

    access
}

/// Robber facts shared by every seat: the blocked resource and reduced number, and per
/// player the building weight on the robber's hex. A desert robber blocks nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobberView {
    pub resource: Option<Resource>,
    pub number: i32,
    pub pieces: [i32; NUM_PLAYERS],
}

impl RobberView {
    pub fn new(board: &Board, occupancy: &SimState, robber: usize) -> Self {
        let Some(resource) = board.tile(robber).resource() else {
            return Self::default();
        };

        Self {
            resource: Some(resource),
            number: reduce_number_range(board.number(robber)),
            pieces: std::array::from_fn(|p| occupancy.pieces_on_hex(board, robber, p)),
        }
    }

    pub fn players_affected(&self) -> i32 {
        self.pieces.iter().filter(|n| **n > 0).count() as i32
    }
}

/// [`EXPANSION_VALUE`] for each of the player's roads from which two free roads lead away
/// without coming back beside it, divided (integer) by the number of roads.
pub fn expansion_possibility(board: &Board, occupancy: &SimState, player: usize) -> i32 {
    let roads: Vec<usize> = (0..board.num_edges())
        .filter(|e| occupancy.edges[*e] == Some(player))
        .collect();
    if roads.is_empty() {
        return 0;
    }

    let open = roads
        .iter()
        .filter(|road| extends_twice(board, occupancy, **road))
        .count() as i32;

    open * EXPANSION_VALUE / roads.len() as i32
}

fn extends_twice(board: &Board, occupancy: &SimState, road: usize) -> bool {
    let free = |e: &usize| occupancy.edges[*e].is_none();

    adjacent_edges(board, road).filter(free).any(|first| {
        adjacent_edges(board, first)
            .filter(free)
            .any(|second| second != road && !adjacent_edges(board, second).any(|e| e == road))
    })
}

/// Edges sharing a vertex with `edge`.
fn adjacent_edges(board: &Board, edge: usize) -> impl Iterator<Item = usize> + '_ {
    board
        .edge_vertices(edge)
        .into_iter()
        .flat_map(move |v| board.vertex_edges(v).iter().copied())
        .filter(move |e| *e != edge)
}

/// Production per resource of the legal building spots within two road steps of the player's
/// network, followed by the number of those spots on each port kind.
pub fn next_legal_productivity(board: &Board, occupancy: &SimState, player: usize) -> [i32; NUM_NEXT_LEGAL] {
    let mut dist: Vec<Option<usize>> = vec![None; board.num_vertices()];
    let mut queue = VecDeque::new();

    let mut sources: Vec<usize> = (0..board.num_vertices())
        .filter(|v| occupancy.vertices[*v].owner() == Some(player))
        .collect();
    for e in (0..board.num_edges()).filter(|e| occupancy.edges[*e] == Some(player)) {
        sources.extend(board.edge_vertices(e));
    }

    for v in sources {
        if dist[v].is_none() {
            dist[v] = Some(0);
            queue.push_back(v);
        }
    }

    while let Some(v) = queue.pop_front() {
        let Some(d) = dist[v] else { continue };
        let blocked = matches!(occupancy.vertices[v].owner(), Some(o) if o != player);
        if d == NEXT_LEGAL_REACH || blocked {
            continue;
        }

        for e in board.vertex_edges(v) {
            if matches!(occupancy.edges[*e], Some(o) if o != player) {
                continue;
            }
            let [a, b] = board.edge_vertices(*e);
            let next = if a == v { b } else { a };
            if dist[next].is_none() {
                dist[next] = Some(d + 1);
                queue.push_back(next);
            }
        }
    }

    let mut counts = [0; NUM_NEXT_LEGAL];
    for v in (0..board.num_vertices()).filter(|v| dist[*v].is_some()) {
        if occupancy.vertices[v] != VertexState::Empty {
            continue;
        }
        for (_, resource, number) in board.producing_hexes(v) {
            counts[resource.index()] += reduce_number_range(number);
        }
        if let Some(port) = board.port(v) {
            counts[NUM_RESOURCES + port.index()] += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use catan::fixtures::beginner_board;

    #[test]
    fn test_affordability() {
        let ports = [false; NUM_PORT_KINDS];
        let a = Affordability::of_counts(&[1, 0, 0, 0, 1], &ports);
        assert!(a.road);
        assert!(!a.settlement);
        assert!(!a.buy_card);

        let a = Affordability::of_counts(&[0, 3, 1, 2, 0], &ports);
        assert!(a.city);
        assert!(a.buy_card);
        assert!(!a.bank_trade);
        assert!(!a.over_seven);

        let a = Affordability::of_counts(&[0, 0, 8, 0, 0], &ports);
        assert!(a.bank_trade);
        assert!(a.over_seven);
    }

    #[test]
    fn test_port_trade_thresholds() {
        let mut ports = [false; NUM_PORT_KINDS];
        let hand = [0, 0, 2, 0, 0];
        assert!(!Affordability::of_counts(&hand, &ports).bank_trade);

        ports[Resource::Sheep.index() + 1] = true;
        assert!(Affordability::of_counts(&hand, &ports).bank_trade);

        let mut misc = [false; NUM_PORT_KINDS];
        misc[0] = true;
        assert!(Affordability::of_counts(&[3, 0, 0, 0, 0], &misc).bank_trade);
        assert!(!Affordability::of_counts(&[2, 0, 0, 0, 0], &misc).bank_trade);
    }

    #[test]
    fn test_fractional_affordability() {
        let ports = [false; NUM_PORT_KINDS];
        let a = Affordability::of(&[0.1, 0.0, 0.0, 0.0, 0.05], &ports);
        assert!(a.road);
        assert!(!Affordability::of(&[0.0, 2.9, 0.0, 2.0, 0.0], &ports).city);
    }

    #[test]
    fn test_board_position_skips_empty_seats() {
        let all = [true; NUM_PLAYERS];
        assert_eq!(board_position(0, 0, &all), 1);
        assert_eq!(board_position(0, 3, &all), 4);
        assert_eq!(board_position(2, 1, &all), 4);

        let seated = [true, false, true, true];
        assert_eq!(board_position(0, 2, &seated), 2);
        assert_eq!(board_position(3, 2, &seated), 3);
    }

    #[test]
    fn test_opponent_seats() {
        assert_eq!(opponent_seats(0), [1, 2, 3]);
        assert_eq!(opponent_seats(2), [3, 0, 1]);
    }

    #[test]
    fn test_desert_robber_blocks_nothing() {
        let board = beginner_board();
        let state = SimState::new(&board);
        let robber = RobberView::new(&board, &state, state.robber);
        assert_eq!(robber, RobberView::default());
    }

    #[test]
    fn test_robber_counts_affected_players() {
        let board = beginner_board();
        let mut state = SimState::new(&board);
        let hex = board.land_hexes().find(|h| board.tile(*h).resource().is_some()).unwrap();
        let corners: Vec<usize> = board.hex_vertices(hex).collect();
        state.vertices[corners[0]] = VertexState::City(1);
        state.vertices[corners[3]] = VertexState::Settlement(2);

        let robber = RobberView::new(&board, &state, hex);
        assert_eq!(robber.pieces, [0, 2, 1, 0]);
        assert_eq!(robber.players_affected(), 2);
        assert_eq!(robber.number, reduce_number_range(board.number(hex)));
    }

    #[test]
    fn test_expansion_possibility() {
        let board = beginner_board();
        let mut state = SimState::new(&board);
        assert_eq!(expansion_possibility(&board, &state, 0), 0);

        // A road touching the most other edges sits inland with room on every side.
        let road = (0..board.num_edges())
            .max_by_key(|e| adjacent_edges(&board, *e).count())
            .unwrap();
        state.edges[road] = Some(0);
        assert_eq!(expansion_possibility(&board, &state, 0), 10);

        // Fencing it in with opponent roads leaves nowhere to go.
        for e in adjacent_edges(&board, road).collect::<Vec<_>>() {
            state.edges[e] = Some(1);
        }
        assert_eq!(expansion_possibility(&board, &state, 0), 0);

        // Player 1 has boxed itself in around player 0's road only partly: the outer
        // edges are still free, so each of its roads can be extended.
        assert_eq!(expansion_possibility(&board, &state, 1), 10);
    }

    #[test]
    fn test_expansion_possibility_averages_over_roads() {
        let board = beginner_board();
        let mut state = SimState::new(&board);
        let road = (0..board.num_edges())
            .max_by_key(|e| adjacent_edges(&board, *e).count())
            .unwrap();
        state.edges[road] = Some(0);

        // A second road of player 0, walled in by player 2 well away from the first.
        let near: Vec<usize> = adjacent_edges(&board, road)
            .flat_map(|e| adjacent_edges(&board, e).chain([e]))
            .collect();
        let boxed = (0..board.num_edges())
            .find(|e| !adjacent_edges(&board, *e).chain([*e]).any(|f| f == road || near.contains(&f)))
            .unwrap();
        state.edges[boxed] = Some(0);
        for e in adjacent_edges(&board, boxed).collect::<Vec<_>>() {
            state.edges[e] = Some(2);
        }

        assert_eq!(expansion_possibility(&board, &state, 0), 5);
    }

    #[test]
    fn test_next_legal_without_pieces_is_empty() {
        let board = beginner_board();
        let state = SimState::new(&board);
        assert_eq!(next_legal_productivity(&board, &state, 0), [0; NUM_NEXT_LEGAL]);
    }

    #[test]
    fn test_next_legal_excludes_too_close_spots() {
        let board = beginner_board();
        let mut state = SimState::new(&board);
        let v = (0..board.num_vertices())
            .find(|v| board.producing_hexes(*v).count() == 3)
            .unwrap();
        state.vertices[v] = VertexState::Settlement(0);
        state.mark_too_close(&board);

        // Neighbours are too close, so only spots two steps away count.
        let counts = next_legal_productivity(&board, &state, 0);
        let mut expected = [0; NUM_NEXT_LEGAL];
        for n in board.vertex_neighbors(v) {
            for m in board.vertex_neighbors(*n) {
                if *m == v || state.vertices[*m] != VertexState::Empty {
                    continue;
                }
                for (_, resource, number) in board.producing_hexes(*m) {
                    expected[resource.index()] += reduce_number_range(number);
                }
                if let Some(port) = board.port(*m) {
                    expected[NUM_RESOURCES + port.index()] += 1;
                }
            }
        }
        assert_eq!(counts, expected);
    }
}
