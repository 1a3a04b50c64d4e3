use super::board::Board;
use super::dice::roll_probability;
use super::resource::{DevCard, NUM_DEV_CARD_KINDS, NUM_RESOURCES};
use super::state::SimState;

/// Chance per roll that each resource is produced once at `vertex`, ignoring the robber's hex.
pub fn adjacent_production_odds(board: &Board, robber: usize, vertex: usize) -> [f64; NUM_RESOURCES] {
    let mut odds = [0.0; NUM_RESOURCES];
    for (hex, resource, number) in board.producing_hexes(vertex) {
        if hex != robber {
            odds[resource.index()] += roll_probability(number);
        }
    }

    odds
}

/// Expected resources `player` collects from the next roll. Cities collect twice.
pub fn expected_roll_gain(board: &Board, state: &SimState, player: usize) -> [f64; NUM_RESOURCES] {
    let mut gain = [0.0; NUM_RESOURCES];
    for (vertex, building) in state.vertices.iter().enumerate() {
        if building.owner() != Some(player) {
            continue;
        }

        let weight = building.weight() as f64;
        let odds = adjacent_production_odds(board, state.robber, vertex);
        for (g, o) in gain.iter_mut().zip(odds) {
            *g += weight * o;
        }
    }

    gain
}

/// Cards still unseen by `player`: the full deck minus every card anyone has played
/// and the cards `player` holds.
pub fn remaining_deck_composition(
    played: [i32; NUM_DEV_CARD_KINDS],
    held: [i32; NUM_DEV_CARD_KINDS],
) -> [i32; NUM_DEV_CARD_KINDS] {
    let mut deck = [0; NUM_DEV_CARD_KINDS];
    for card in DevCard::ALL {
        let i = card.index();
        deck[i] = (card.initial_count() - played[i] - held[i]).max(0);
    }

    deck
}

/// Convenience over [`remaining_deck_composition`] for a simulated state.
pub fn remaining_deck_for(state: &SimState, player: usize) -> [i32; NUM_DEV_CARD_KINDS] {
    let mut played = [0; NUM_DEV_CARD_KINDS];
    for p in &state.players {
        for (total, used) in played.iter_mut().zip(p.used_cards) {
            *total += used;
        }
    }

    let me = &state.players[player];
    let mut held = [0; NUM_DEV_CARD_KINDS];
    for (i, h) in held.iter_mut().enumerate() {
        *h = me.old_cards[i] + me.new_cards[i];
    }

    remaining_deck_composition(played, held)
}

/// Probability of drawing each card kind. An empty deck yields all zeros.
pub fn draw_probabilities(deck: [i32; NUM_DEV_CARD_KINDS]) -> [f64; NUM_DEV_CARD_KINDS] {
    normalise(deck)
}

/// Probability that a random steal takes each resource. An empty hand yields all zeros.
pub fn steal_probabilities(hand: [i32; NUM_RESOURCES]) -> [f64; NUM_RESOURCES] {
    normalise(hand)
}

fn normalise<const N: usize>(counts: [i32; N]) -> [f64; N] {
    let total: i32 = counts.iter().map(|c| (*c).max(0)).sum();
    if total == 0 {
        return [0.0; N];
    }

    counts.map(|c| c.max(0) as f64 / total as f64)
}
