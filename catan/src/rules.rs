use engine::{GameEngine, ValidActions};
use itertools::Itertools;

use super::action::Action;
use super::board::Board;
use super::resource::{
    DevCard, PortKind, Resource, CITY_COST, DEV_CARD_COST, DEV_DECK_SIZE, NUM_RESOURCES,
    ROAD_COST, SETTLEMENT_COST,
};
use super::state::{SimState, Step, VertexState, NUM_PLAYERS};

pub const MAX_ROADS: i32 = 15;
pub const MAX_SETTLEMENTS: i32 = 5;
pub const MAX_CITIES: i32 = 4;

/// Reference rules engine over a fixed board.
pub struct Engine<'a> {
    board: &'a Board,
}

impl<'a> Engine<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    fn initial_settlements(&self, state: &SimState) -> Vec<Action> {
        (0..self.board.num_vertices())
            .filter(|v| state.vertices[*v] == VertexState::Empty)
            .map(Action::BuildSettlement)
            .collect()
    }

    fn initial_roads(&self, state: &SimState, player: usize) -> Vec<Action> {
        let anchors: Vec<usize> = match state.last_vertex {
            Some(v) => vec![v],
            None => (0..self.board.num_vertices())
                .filter(|v| state.vertices[*v].owner() == Some(player))
                .filter(|v| {
                    !self
                        .board
                        .vertex_edges(*v)
                        .iter()
                        .any(|e| state.edges[*e] == Some(player))
                })
                .collect(),
        };

        anchors
            .iter()
            .flat_map(|v| self.board.vertex_edges(*v).iter().copied())
            .filter(|e| state.edges[*e].is_none())
            .unique()
            .map(Action::BuildRoad)
            .collect()
    }

    fn connected_roads(&self, state: &SimState, player: usize) -> Vec<Action> {
        if state.players[player].roads >= MAX_ROADS {
            return vec![];
        }

        (0..self.board.num_edges())
            .filter(|e| state.edges[*e].is_none())
            .filter(|e| {
                self.board.edge_vertices(*e).iter().any(|v| {
                    match state.vertices[*v].owner() {
                        Some(owner) => owner == player,
                        None => self
                            .board
                            .vertex_edges(*v)
                            .iter()
                            .any(|other| other != e && state.edges[*other] == Some(player)),
                    }
                })
            })
            .map(Action::BuildRoad)
            .collect()
    }

    fn connected_settlements(&self, state: &SimState, player: usize) -> Vec<Action> {
        (0..self.board.num_vertices())
            .filter(|v| state.vertices[*v] == VertexState::Empty)
            .filter(|v| {
                self.board
                    .vertex_edges(*v)
                    .iter()
                    .any(|e| state.edges[*e] == Some(player))
            })
            .map(Action::BuildSettlement)
            .collect()
    }

    fn cities(&self, state: &SimState, player: usize) -> Vec<Action> {
        (0..self.board.num_vertices())
            .filter(|v| state.vertices[*v] == VertexState::Settlement(player))
            .map(Action::BuildCity)
            .collect()
    }

    fn bank_trades(&self, state: &SimState, player: usize) -> Vec<Action> {
        let me = &state.players[player];
        let mut actions = vec![];
        for give in Resource::ALL {
            let amount = if me.has_port(PortKind::Specific(give)) {
                2
            } else if me.has_port(PortKind::Misc) {
                3
            } else {
                4
            };

            if me.resources[give.index()] < amount {
                continue;
            }

            for receive in Resource::ALL.into_iter().filter(|r| *r != give) {
                actions.push(Action::BankTrade {
                    give,
                    amount,
                    receive,
                });
            }
        }

        actions
    }

    /// Every land hex other than the robber's current one, paired with each opponent on it
    /// who holds cards. A hex without such an opponent is a single move with no victim.
    fn robber_moves(&self, state: &SimState, player: usize) -> Vec<(usize, Option<usize>)> {
        let mut moves = vec![];
        for hex in self.board.land_hexes().filter(|h| *h != state.robber) {
            let victims: Vec<usize> = (0..NUM_PLAYERS)
                .filter(|p| *p != player)
                .filter(|p| state.players[*p].hand_total() > 0)
                .filter(|p| state.is_on_hex(self.board, hex, *p))
                .collect();

            if victims.is_empty() {
                moves.push((hex, None));
            } else {
                moves.extend(victims.into_iter().map(|v| (hex, Some(v))));
            }
        }

        moves
    }

    fn card_plays(&self, state: &SimState, player: usize, step: Step) -> Vec<Action> {
        let me = &state.players[player];
        if me.played_card {
            return vec![];
        }

        let mut actions = vec![];
        if me.old_cards[DevCard::Knight.index()] > 0 {
            actions.extend(
                self.robber_moves(state, player)
                    .into_iter()
                    .map(|(hex, victim)| Action::PlayKnight { hex, victim }),
            );
        }

        if step != Step::Normal {
            return actions;
        }

        if me.old_cards[DevCard::RoadBuilding.index()] > 0 && me.roads < MAX_ROADS {
            actions.push(Action::PlayRoadBuilding);
        }

        if me.old_cards[DevCard::Discovery.index()] > 0 {
            actions.extend(
                Resource::ALL
                    .into_iter()
                    .combinations_with_replacement(2)
                    .map(|pair| Action::PlayDiscovery(pair[0], pair[1])),
            );
        }

        if me.old_cards[DevCard::Monopoly.index()] > 0 {
            actions.extend(Resource::ALL.into_iter().map(Action::PlayMonopoly));
        }

        actions
    }

    fn normal_play(&self, state: &SimState, player: usize) -> Vec<Action> {
        let me = &state.players[player];
        let mut actions = vec![Action::EndTurn];

        if me.can_afford(&ROAD_COST) {
            actions.extend(self.connected_roads(state, player));
        }

        if me.can_afford(&SETTLEMENT_COST) && me.settlements < MAX_SETTLEMENTS {
            actions.extend(self.connected_settlements(state, player));
        }

        if me.can_afford(&CITY_COST) && me.cities < MAX_CITIES {
            actions.extend(self.cities(state, player));
        }

        if me.can_afford(&DEV_CARD_COST) && state.cards_gone < DEV_DECK_SIZE {
            actions.push(Action::BuyCard);
        }

        actions.extend(self.bank_trades(state, player));
        actions.extend(self.card_plays(state, player, Step::Normal));

        actions
    }

    fn discards(&self, state: &SimState, player: usize) -> Vec<Action> {
        let hand = state.players[player].resources;
        let total: i32 = hand.iter().sum();
        if total <= 7 {
            return vec![];
        }

        let mut actions = vec![];
        let mut current = [0; NUM_RESOURCES];
        collect_discards(&hand, 0, total / 2, &mut current, &mut actions);
        actions
    }

    fn after_initial_road(&self, state: &mut SimState, player: usize, second_round: bool) {
        if !second_round {
            let next = state.next_seated(player);
            if next == state.starting_player {
                state.set_decision(Step::Settlement2, player);
            } else {
                state.set_decision(Step::Settlement1, next);
            }
        } else if player == state.starting_player {
            state.set_decision(Step::BeforeDice, player);
        } else {
            let previous = state.previous_seated(player);
            state.set_decision(Step::Settlement2, previous);
        }
    }

    fn build_settlement(&self, state: &mut SimState, player: usize, vertex: usize, step: Step) {
        state.vertices[vertex] = VertexState::Settlement(player);
        state.mark_too_close(self.board);
        state.last_vertex = Some(vertex);

        let me = &mut state.players[player];
        me.settlements += 1;
        if let Some(kind) = self.board.port(vertex) {
            me.ports[kind.index()] = true;
        }

        match step {
            Step::Settlement1 => state.set_decision(Step::Road1, player),
            Step::Settlement2 => {
                for (_, resource, _) in self.board.producing_hexes(vertex) {
                    me.resources[resource.index()] += 1;
                }
                state.set_decision(Step::Road2, player);
            }
            _ => me.pay(&SETTLEMENT_COST),
        }
    }

    fn build_road(&self, state: &mut SimState, player: usize, edge: usize, step: Step) {
        state.edges[edge] = Some(player);
        state.players[player].roads += 1;

        match step {
            Step::Road1 => self.after_initial_road(state, player, false),
            Step::Road2 => self.after_initial_road(state, player, true),
            Step::FreeRoad1 => {
                let more = !self.connected_roads(state, player).is_empty();
                let next = if more { Step::FreeRoad2 } else { Step::Normal };
                state.set_decision(next, player);
            }
            Step::FreeRoad2 => state.set_decision(Step::Normal, player),
            _ => state.players[player].pay(&ROAD_COST),
        }
    }

    fn move_robber(&self, state: &mut SimState, player: usize, hex: usize, step: Step) {
        state.robber = hex;
        if step == Step::RobberAt7 {
            state.fsm_level = 0;
            state.set_decision(Step::Normal, player);
        }
    }
}

/// Every way of choosing `remaining` cards from `hand[index..]`.
fn collect_discards(
    hand: &[i32; NUM_RESOURCES],
    index: usize,
    remaining: i32,
    current: &mut [i32; NUM_RESOURCES],
    out: &mut Vec<Action>,
) {
    if index == NUM_RESOURCES {
        if remaining == 0 {
            out.push(Action::Discard(*current));
        }
        return;
    }

    let rest: i32 = hand[index + 1..].iter().sum();
    for n in 0..=hand[index].min(remaining) {
        if remaining - n > rest {
            continue;
        }
        current[index] = n;
        collect_discards(hand, index + 1, remaining - n, current, out);
    }
    current[index] = 0;
}

impl ValidActions for Engine<'_> {
    type Action = Action;
    type State = SimState;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        let player = game_state.current_player();
        match game_state.step() {
            Step::Settlement1 | Step::Settlement2 => self.initial_settlements(game_state),
            Step::Road1 | Step::Road2 => self.initial_roads(game_state, player),
            Step::BeforeDice => {
                let mut actions = vec![Action::RollDice];
                actions.extend(self.card_plays(game_state, player, Step::BeforeDice));
                actions
            }
            Step::Normal => self.normal_play(game_state, player),
            Step::FreeRoad1 | Step::FreeRoad2 => self.connected_roads(game_state, player),
            Step::RobberAt7 => self
                .robber_moves(game_state, player)
                .into_iter()
                .map(|(hex, victim)| Action::PlaceRobber { hex, victim })
                .collect(),
            Step::PayTax => self.discards(game_state, player),
        }
    }
}

impl GameEngine for Engine<'_> {
    type Action = Action;
    type State = SimState;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        let mut state = game_state.clone();
        let player = state.current_player();
        let step = state.step();

        match *action {
            Action::BuildSettlement(vertex) => self.build_settlement(&mut state, player, vertex, step),
            Action::BuildRoad(edge) => self.build_road(&mut state, player, edge, step),
            Action::BuildCity(vertex) => {
                state.vertices[vertex] = VertexState::City(player);
                let me = &mut state.players[player];
                me.settlements -= 1;
                me.cities += 1;
                me.pay(&CITY_COST);
            }
            Action::RollDice => state.set_decision(Step::Normal, player),
            Action::EndTurn => {
                let me = &mut state.players[player];
                for (old, new) in me.old_cards.iter_mut().zip(me.new_cards.iter_mut()) {
                    *old += *new;
                    *new = 0;
                }
                me.played_card = false;
                state.dice = 0;
                let next = state.next_seated(player);
                state.set_decision(Step::BeforeDice, next);
            }
            Action::BankTrade {
                give,
                amount,
                receive,
            } => {
                let me = &mut state.players[player];
                me.resources[give.index()] -= amount;
                me.resources[receive.index()] += 1;
            }
            Action::Discard(cards) => {
                let me = &mut state.players[player];
                for (have, drop) in me.resources.iter_mut().zip(cards) {
                    *have -= drop;
                }
                state.fsm_level = 0;
            }
            Action::PlaceRobber { hex, .. } => self.move_robber(&mut state, player, hex, step),
            Action::BuyCard => {
                state.players[player].pay(&DEV_CARD_COST);
                state.cards_gone += 1;
            }
            Action::PlayKnight { hex, .. } => {
                play_card(&mut state, player, DevCard::Knight);
                self.move_robber(&mut state, player, hex, step);
            }
            Action::PlayRoadBuilding => {
                play_card(&mut state, player, DevCard::RoadBuilding);
                state.set_decision(Step::FreeRoad1, player);
            }
            Action::PlayDiscovery(a, b) => {
                play_card(&mut state, player, DevCard::Discovery);
                let me = &mut state.players[player];
                me.resources[a.index()] += 1;
                me.resources[b.index()] += 1;
            }
            Action::PlayMonopoly(resource) => {
                play_card(&mut state, player, DevCard::Monopoly);
                let taken: i32 = (0..NUM_PLAYERS)
                    .filter(|p| *p != player)
                    .map(|p| std::mem::take(&mut state.players[p].resources[resource.index()]))
                    .sum();
                state.players[player].resources[resource.index()] += taken;
            }
        }

        state.recalc_longest_road(self.board);
        state.recalc_largest_army();
        state.recalc_scores();

        state
    }

    fn player_to_move(&self, game_state: &Self::State) -> usize {
        game_state.current_player()
    }
}

fn play_card(state: &mut SimState, player: usize, card: DevCard) {
    let me = &mut state.players[player];
    me.old_cards[card.index()] -= 1;
    me.used_cards[card.index()] += 1;
    me.played_card = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::beginner_board;

    fn normal_state(board: &Board) -> SimState {
        let mut state = SimState::new(board);
        state.set_decision(Step::Normal, 0);
        state
    }

    #[test]
    fn test_opening_offers_every_vertex() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let state = SimState::new(&board);
        assert_eq!(engine.valid_actions(&state).len(), board.num_vertices());
    }

    #[test]
    fn test_initial_settlement_then_road_at_that_settlement() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let state = SimState::new(&board);

        let state = engine.take_action(&state, &Action::BuildSettlement(10));
        assert_eq!(state.step(), Step::Road1);
        assert_eq!(state.players[0].score, 1);

        let roads = engine.valid_actions(&state);
        assert_eq!(roads.len(), board.vertex_edges(10).len());
        for action in roads {
            let Action::BuildRoad(edge) = action else {
                panic!("expected a road, got {}", action);
            };
            assert!(board.edge_vertices(edge).contains(&10));
        }

        let state = engine.take_action(&state, &Action::BuildRoad(board.vertex_edges(10)[0]));
        assert_eq!(state.step(), Step::Settlement1);
        assert_eq!(state.current_player(), 1);
    }

    #[test]
    fn test_snake_order_for_initial_placement() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = SimState::new(&board);
        let mut order = vec![];

        while matches!(
            state.step(),
            Step::Settlement1 | Step::Road1 | Step::Settlement2 | Step::Road2
        ) {
            if matches!(state.step(), Step::Settlement1 | Step::Settlement2) {
                order.push(state.current_player());
            }
            let action = engine.valid_actions(&state)[0];
            state = engine.take_action(&state, &action);
        }

        assert_eq!(order, vec![0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(state.step(), Step::BeforeDice);
        assert_eq!(state.current_player(), 0);
    }

    #[test]
    fn test_second_settlement_grants_resources() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = SimState::new(&board);
        state.set_decision(Step::Settlement2, 0);

        let vertex = 10;
        let after = engine.take_action(&state, &Action::BuildSettlement(vertex));
        let granted: i32 = after.players[0].resources.iter().sum();
        assert_eq!(granted, board.producing_hexes(vertex).count() as i32);
    }

    #[test]
    fn test_before_dice_without_cards_is_only_roll() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = SimState::new(&board);
        state.set_decision(Step::BeforeDice, 0);
        assert_eq!(engine.valid_actions(&state), vec![Action::RollDice]);

        let after = engine.take_action(&state, &Action::RollDice);
        assert_eq!(after.step(), Step::Normal);
        assert_eq!(after.players[0].resources, state.players[0].resources);
    }

    #[test]
    fn test_normal_play_with_empty_hand_is_end_turn() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let state = normal_state(&board);
        assert_eq!(engine.valid_actions(&state), vec![Action::EndTurn]);
    }

    #[test]
    fn test_bank_trade_ratios() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[0].resources = [4, 0, 3, 0, 0];
        state.players[0].ports[PortKind::Specific(Resource::Sheep).index()] = true;

        let trades: Vec<Action> = engine
            .valid_actions(&state)
            .into_iter()
            .filter(|a| matches!(a, Action::BankTrade { .. }))
            .collect();

        assert_eq!(trades.len(), 8);
        assert!(trades.contains(&Action::BankTrade {
            give: Resource::Clay,
            amount: 4,
            receive: Resource::Ore
        }));
        assert!(trades.contains(&Action::BankTrade {
            give: Resource::Sheep,
            amount: 2,
            receive: Resource::Wood
        }));
    }

    #[test]
    fn test_discovery_offers_fifteen_pairs() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[0].old_cards[DevCard::Discovery.index()] = 1;

        let discoveries = engine
            .valid_actions(&state)
            .into_iter()
            .filter(|a| matches!(a, Action::PlayDiscovery(..)))
            .count();
        assert_eq!(discoveries, 15);
    }

    #[test]
    fn test_played_card_blocks_further_cards() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[0].old_cards[DevCard::Monopoly.index()] = 1;
        state.players[0].played_card = true;
        assert_eq!(engine.valid_actions(&state), vec![Action::EndTurn]);
    }

    #[test]
    fn test_monopoly_takes_from_everyone() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[0].old_cards[DevCard::Monopoly.index()] = 1;
        state.players[1].resources[Resource::Wheat.index()] = 2;
        state.players[3].resources[Resource::Wheat.index()] = 1;

        let after = engine.take_action(&state, &Action::PlayMonopoly(Resource::Wheat));
        assert_eq!(after.players[0].resources[Resource::Wheat.index()], 3);
        assert_eq!(after.players[1].resources[Resource::Wheat.index()], 0);
        assert!(after.players[0].played_card);
    }

    #[test]
    fn test_discards_are_sub_multisets_of_half_the_hand() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[2].resources = [8, 0, 0, 0, 0];
        state.set_decision(Step::PayTax, 2);
        assert_eq!(
            engine.valid_actions(&state),
            vec![Action::Discard([4, 0, 0, 0, 0])]
        );

        state.players[2].resources = [2, 2, 2, 2, 0];
        let discards = engine.valid_actions(&state);
        // Multisets of size 4 from {2,2,2,2}: 19 combinations.
        assert_eq!(discards.len(), 19);
        for action in &discards {
            let Action::Discard(cards) = action else {
                panic!("expected a discard, got {}", action);
            };
            assert_eq!(cards.iter().sum::<i32>(), 4);
            assert!(cards.iter().all(|c| *c <= 2));
        }
    }

    #[test]
    fn test_robber_moves_skip_current_hex() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.set_decision(Step::RobberAt7, 0);

        let moves = engine.valid_actions(&state);
        assert_eq!(moves.len(), 18);
        assert!(moves.iter().all(|a| matches!(a, Action::PlaceRobber { victim: None, hex } if *hex != state.robber)));
    }

    #[test]
    fn test_robber_offers_each_victim_with_cards() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        let target = board
            .land_hexes()
            .find(|h| *h != state.robber)
            .unwrap();
        let corners: Vec<usize> = board.hex_vertices(target).collect();
        state.vertices[corners[0]] = VertexState::Settlement(1);
        state.vertices[corners[3]] = VertexState::City(2);
        state.players[1].resources = [1, 0, 0, 0, 0];
        state.set_decision(Step::RobberAt7, 0);

        let on_target: Vec<Action> = engine
            .valid_actions(&state)
            .into_iter()
            .filter(|a| matches!(a, Action::PlaceRobber { hex, .. } if *hex == target))
            .collect();
        assert_eq!(
            on_target,
            vec![Action::PlaceRobber {
                hex: target,
                victim: Some(1)
            }]
        );

        let after = engine.take_action(&state, &on_target[0]);
        assert_eq!(after.robber, target);
        assert_eq!(after.step(), Step::Normal);
        assert_eq!(after.players[1].resources, state.players[1].resources);
    }

    #[test]
    fn test_end_turn_ages_new_cards() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[0].new_cards[DevCard::Knight.index()] = 1;
        state.dice = 8;

        let after = engine.take_action(&state, &Action::EndTurn);
        assert_eq!(after.players[0].old_cards[DevCard::Knight.index()], 1);
        assert_eq!(after.players[0].new_cards[DevCard::Knight.index()], 0);
        assert_eq!(after.current_player(), 1);
        assert_eq!(after.step(), Step::BeforeDice);
        assert_eq!(after.dice, 0);
    }

    #[test]
    fn test_buy_card_draws_nothing() {
        let board = beginner_board();
        let engine = Engine::new(&board);
        let mut state = normal_state(&board);
        state.players[0].resources = [0, 1, 1, 1, 0];

        assert!(engine.valid_actions(&state).contains(&Action::BuyCard));
        let after = engine.take_action(&state, &Action::BuyCard);
        assert_eq!(after.players[0].resources, [0; 5]);
        assert_eq!(after.players[0].new_cards, [0; 5]);
        assert_eq!(after.cards_gone, 1);
    }
}
