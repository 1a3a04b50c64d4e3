//! Replaces the parts of an action vector decided by chance with their expected values, so a
//! logged label and an enumerated candidate describe the same decision.

use catan::odds::{
    draw_probabilities, expected_roll_gain, remaining_deck_composition, remaining_deck_for,
    steal_probabilities,
};
use catan::{
    Board, Bridge, DevCard, ObservedRow, SimState, TranslationError, NUM_DEV_CARD_KINDS,
    NUM_PLAYERS, NUM_RESOURCES,
};

use super::layout::{Field, Layout};
use super::vector::ActionVector;
use super::view::{Affordability, StateView};

const AFFORDABILITY: [Field; 5] = [
    Field::CanBuyCard,
    Field::CanBuildRoad,
    Field::CanBuildSettlement,
    Field::CanBuildCity,
    Field::CanBankTrade,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chance {
    Roll,
    Draw,
    Steal,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Expected resources the acting player collects.
    Roll { gain: [f64; NUM_RESOURCES] },
    /// Cards the acting player could draw.
    Draw { deck: [i32; NUM_DEV_CARD_KINDS] },
    /// The robbed player's hand, or `None` when nobody is robbed.
    Steal { victim_hand: Option<[i32; NUM_RESOURCES]> },
}

impl Outcome {
    pub fn chance(&self) -> Chance {
        match self {
            Outcome::Roll { .. } => Chance::Roll,
            Outcome::Draw { .. } => Chance::Draw,
            Outcome::Steal { .. } => Chance::Steal,
        }
    }
}

/// Overwrites the chance-dependent slots of `action` with the expected change from `before`.
pub fn substitute(layout: &Layout, before: &StateView, outcome: &Outcome, action: &mut ActionVector) {
    let me = &before.me;
    let values = action.values_mut();

    match outcome {
        Outcome::Roll { gain } => {
            let hand: [f64; NUM_RESOURCES] = std::array::from_fn(|r| f64::from(me.hand[r]) + gain[r]);
            write_delta(layout, values, Field::ResourceInHand, &me.hand, &hand);

            let was = me.affordability();
            let will = Affordability::of(&hand, &me.ports);
            for ((field, was), (_, will)) in was.flags().into_iter().zip(will.flags()) {
                write_delta(layout, values, field, &[was as i32], &[f64::from(will as u8)]);
            }

            zero(layout, values, Field::DiceResult);
        }
        Outcome::Draw { deck } => {
            let p = draw_probabilities(*deck);
            let vp = p[DevCard::VictoryPoint.index()];
            let new_dev: [f64; 4] = std::array::from_fn(|i| f64::from(me.new_dev[i]) + p[i]);

            write_delta(layout, values, Field::NewDevCards, &me.new_dev, &new_dev);
            write_delta(layout, values, Field::VpCards, &[me.vp_cards], &[f64::from(me.vp_cards) + vp]);
            write_delta(layout, values, Field::Score, &[me.score], &[f64::from(me.score) + vp]);
        }
        Outcome::Steal { victim_hand: None } => {}
        Outcome::Steal {
            victim_hand: Some(victim),
        } => {
            let p = steal_probabilities(*victim);
            let total = me.hand.iter().map(|n| f64::from(*n)).sum::<f64>() + p.iter().sum::<f64>();

            zero(layout, values, Field::ResourceInHand);
            for field in AFFORDABILITY {
                zero(layout, values, field);
            }
            write_delta(
                layout,
                values,
                Field::Over7Cards,
                &[me.affordability().over_seven as i32],
                &[f64::from((total > 7.0) as u8)],
            );
            zero(layout, values, Field::DiceResult);
        }
    }
}

/// Zeroes the chance-dependent slots when the outcome cannot be resolved.
pub fn clear(layout: &Layout, chance: Chance, action: &mut ActionVector) {
    let values = action.values_mut();
    let fields: &[Field] = match chance {
        Chance::Roll | Chance::Steal => &[
            Field::ResourceInHand,
            Field::CanBuyCard,
            Field::CanBuildRoad,
            Field::CanBuildSettlement,
            Field::CanBuildCity,
            Field::CanBankTrade,
            Field::Over7Cards,
            Field::DiceResult,
        ],
        Chance::Draw => &[Field::NewDevCards, Field::VpCards, Field::Score],
    };

    for field in fields {
        zero(layout, values, *field);
    }
}

/// Expected roll gain for the current player of a logged row, the robber's hex excluded.
pub fn roll_gain_logged(observed: &ObservedRow, bridge: &Bridge) -> Result<[f64; NUM_RESOURCES], TranslationError> {
    let current = observed.current_player;
    if current >= NUM_PLAYERS {
        return Err(TranslationError::UnknownPlayer(current));
    }

    let mut occupancy = SimState::new(bridge.board());
    bridge.place_pieces(observed, &mut occupancy)?;
    occupancy.robber = bridge.robber(observed.robber_hex)?;

    Ok(expected_roll_gain(bridge.board(), &occupancy, current))
}

pub fn roll_gain_simulated(state: &SimState, board: &Board) -> [f64; NUM_RESOURCES] {
    expected_roll_gain(board, state, state.current_player())
}

/// Cards the current player of a logged row has not seen.
pub fn deck_logged(observed: &ObservedRow) -> Result<[i32; NUM_DEV_CARD_KINDS], TranslationError> {
    let current = observed.current_player;
    if current >= NUM_PLAYERS {
        return Err(TranslationError::UnknownPlayer(current));
    }

    let mut played = [0; NUM_DEV_CARD_KINDS];
    for player in &observed.players {
        played[DevCard::Knight.index()] += player.played_knights;
        played[DevCard::RoadBuilding.index()] += player.played_road_building;
        played[DevCard::Discovery.index()] += player.played_discovery;
        played[DevCard::Monopoly.index()] += player.played_monopoly;
    }

    let me = &observed.players[current];
    let mut held = [0; NUM_DEV_CARD_KINDS];
    for (i, h) in held.iter_mut().take(4).enumerate() {
        *h = me.old_dev_cards[i] + me.new_dev_cards[i];
    }
    held[DevCard::VictoryPoint.index()] = me.vp_cards;

    Ok(remaining_deck_composition(played, held))
}

pub fn deck_simulated(state: &SimState) -> [i32; NUM_DEV_CARD_KINDS] {
    remaining_deck_for(state, state.current_player())
}

/// Writes `encode(expected) - encode(before)` per channel into the action slots of `field`.
fn write_delta(layout: &Layout, values: &mut [f64], field: Field, before: &[i32], expected: &[f64]) {
    let Ok(slot) = layout.action_slot(field) else {
        return;
    };

    let width = slot.rule.width();
    for (c, (b, e)) in before.iter().zip(expected).enumerate().take(slot.channels) {
        let mut was = vec![0.0; width];
        let mut will = vec![0.0; width];
        slot.rule.write_expected(f64::from(*b), &mut was);
        slot.rule.write_expected(*e, &mut will);

        for (i, range_index) in slot.channel_range(c).enumerate() {
            values[range_index] = will[i] - was[i];
        }
    }
}

fn zero(layout: &Layout, values: &mut [f64], field: Field) {
    if let Ok(slot) = layout.action_slot(field) {
        values[slot.offset..slot.offset + slot.width()].fill(0.0);
    }
}
