use catan::{
    reduce_number_range, Bridge, ExtendedRow, ObservedRow, PieceKind, SimState, TranslationError,
    NUM_PLAYERS, NUM_RESOURCES,
};

use super::quantizer::dice_class;
use super::view::{
    board_position, expansion_possibility, next_legal_productivity, opponent_seats, ActingView,
    OpponentView, RobberView, StateView,
};

/// Builds the view of a logged row from the current player's seat.
pub fn logged_view(
    observed: &ObservedRow,
    extended: &ExtendedRow,
    bridge: &Bridge,
) -> Result<StateView, TranslationError> {
    let current = observed.current_player;
    if current >= NUM_PLAYERS {
        return Err(TranslationError::UnknownPlayer(current));
    }

    let board = bridge.board();
    let mut occupancy = SimState::new(board);
    bridge.place_pieces(observed, &mut occupancy)?;
    let robber = RobberView::new(board, &occupancy, bridge.robber(observed.robber_hex)?);

    let total = |kind| (0..NUM_PLAYERS).map(|p| observed.count_of(kind, p)).sum();
    let seated = std::array::from_fn(|p| observed.players[p].is_seated());

    let player = &observed.players[current];
    let me = ActingView {
        board_position: board_position(observed.starting_player, current, &seated),
        played_dev_card: observed.played_dev_card,
        score: player.total_vp,
        longest_road_holder: player.longest_road,
        largest_army_holder: player.largest_army,
        longest_road: extended.players[current].longest_road,
        roads: observed.count_of(PieceKind::Road, current),
        settlements: observed.count_of(PieceKind::Settlement, current),
        cities: observed.count_of(PieceKind::City, current),
        hand: player.hand(),
        ports: player.touching_ports.map(|n| n > 0),
        production: touching_production(observed, current),
        access: extended.players[current].resource_access,
        affected: robber.pieces[current] > 0,
        pieces_affected: robber.pieces[current],
        knights: player.played_knights,
        played_dev: [
            player.played_road_building,
            player.played_discovery,
            player.played_monopoly,
        ],
        old_dev: player.old_dev_cards,
        new_dev: player.new_dev_cards,
        vp_cards: player.vp_cards,
        expansion: expansion_possibility(board, &occupancy, current),
        next_legal: next_legal_productivity(board, &occupancy, current),
    };

    let opponents = opponent_seats(current).map(|p| {
        let player = &observed.players[p];
        player.is_seated().then(|| OpponentView {
            score: player.total_vp,
            largest_army: player.largest_army,
            longest_road_holder: player.longest_road,
            longest_road: extended.players[p].longest_road,
            knights: player.played_knights,
            has_dev_cards: player.has_dev_cards(),
            affected: robber.pieces[p] > 0,
            total_resources: player.hand_total(),
            roads: observed.count_of(PieceKind::Road, p),
            settlements: observed.count_of(PieceKind::Settlement, p),
            cities: observed.count_of(PieceKind::City, p),
            ports: player.touching_ports.map(|n| n > 0),
            production: touching_production(observed, p),
            access: extended.players[p].resource_access,
        })
    });

    Ok(StateView {
        dice_class: dice_class(observed.dice),
        total_settlements: total(PieceKind::Settlement),
        total_roads: total(PieceKind::Road),
        total_cities: total(PieceKind::City),
        dev_cards_left: observed.dev_cards_left > 0,
        blocked_resource: robber.resource,
        blocked_number: robber.number,
        players_affected: robber.players_affected(),
        me,
        opponents,
    })
}

fn touching_production(observed: &ObservedRow, player: usize) -> [i32; NUM_RESOURCES] {
    let numbers = &observed.players[player].touching_numbers;
    std::array::from_fn(|r| numbers[r].iter().map(|n| reduce_number_range(*n)).sum())
}
