use catan::{Board, DevCard, PlayerState, SimState, DEV_DECK_SIZE};

use super::quantizer::dice_class;
use super::view::{
    access_of, board_position, expansion_possibility, next_legal_productivity, opponent_seats,
    production_of, ActingView, OpponentView, RobberView, StateView,
};

/// Builds the view of a simulator state from the seat of the player to decide.
pub fn simulated_view(state: &SimState, board: &Board) -> StateView {
    let current = state.current_player();
    let robber = RobberView::new(board, state, state.robber);
    let total = |count: fn(&PlayerState) -> i32| state.players.iter().map(count).sum();

    let player = &state.players[current];
    let me = ActingView {
        board_position: board_position(state.starting_player, current, &state.seated),
        played_dev_card: player.played_card,
        score: player.score,
        longest_road_holder: state.longest_road == Some(current),
        largest_army_holder: state.largest_army == Some(current),
        longest_road: player.longest_road,
        roads: player.roads,
        settlements: player.settlements,
        cities: player.cities,
        hand: player.resources,
        ports: player.ports,
        production: production_of(board, state, current),
        access: access_of(board, state, current),
        affected: robber.pieces[current] > 0,
        pieces_affected: robber.pieces[current],
        knights: player.knights_played(),
        played_dev: [
            player.used_cards[DevCard::RoadBuilding.index()],
            player.used_cards[DevCard::Discovery.index()],
            player.used_cards[DevCard::Monopoly.index()],
        ],
        old_dev: std::array::from_fn(|i| player.old_cards[i]),
        new_dev: std::array::from_fn(|i| player.new_cards[i]),
        vp_cards: player.victory_cards(),
        expansion: expansion_possibility(board, state, current),
        next_legal: next_legal_productivity(board, state, current),
    };

    let opponents = opponent_seats(current).map(|p| {
        let player = &state.players[p];
        state.seated[p].then(|| OpponentView {
            score: player.score,
            largest_army: state.largest_army == Some(p),
            longest_road_holder: state.longest_road == Some(p),
            longest_road: player.longest_road,
            knights: player.knights_played(),
            has_dev_cards: player.old_cards.iter().chain(&player.new_cards).any(|c| *c > 0),
            affected: robber.pieces[p] > 0,
            total_resources: player.hand_total(),
            roads: player.roads,
            settlements: player.settlements,
            cities: player.cities,
            ports: player.ports,
            production: production_of(board, state, p),
            access: access_of(board, state, p),
        })
    });

    StateView {
        dice_class: dice_class(state.dice),
        total_settlements: total(|p| p.settlements),
        total_roads: total(|p| p.roads),
        total_cities: total(|p| p.cities),
        dev_cards_left: state.cards_gone < DEV_DECK_SIZE,
        blocked_resource: robber.resource,
        blocked_number: robber.number,
        players_affected: robber.players_affected(),
        me,
        opponents,
    }
}
