//! The label of a logged action: the change it made to the acting player's encoded position,
//! with chance outcomes replaced by their expectation.

use std::borrow::Cow;

use catan::{ActionRow, ActionType, Bridge, LoggedSnapshot, TranslationError, NUM_PLAYERS};
use features::logged_view::logged_view;
use features::{
    clear, deck_logged, roll_gain_logged, substitute, ActionEncoder, ActionVector, Chance, Outcome,
    StateEncoder,
};

use super::game::{Attempt, LoggedGame};
use super::storage::GameLog;

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub vector: ActionVector,
    /// Set when a chance outcome could not be resolved and its slots were zeroed instead.
    pub unresolved: Option<TranslationError>,
}

pub fn logged_label<L: GameLog + ?Sized>(
    game: &LoggedGame<L>,
    before: &LoggedSnapshot,
    action: &ActionRow,
    bridge: &Bridge,
    states: &StateEncoder,
    actions: &ActionEncoder,
) -> Attempt<Label> {
    if action.action_type == ActionType::EndTurn {
        return Ok(Label {
            vector: actions.end_turn(),
            unresolved: None,
        });
    }

    let mut after = game.row(after_row_id(game, action)?)?;
    // Turns change erratically during initial placement; the label is always the mover's.
    after.observed.current_player = before.observed.current_player;

    let after_bridge = if bridge.serves(&after.observed) {
        Cow::Borrowed(bridge)
    } else {
        Cow::Owned(Bridge::for_row(&after.observed)?)
    };

    let before_vector = states.encode_logged(&before.observed, &before.extended, bridge)?;
    let after_vector = states.encode_logged(&after.observed, &after.extended, &after_bridge)?;
    let mut vector = actions.encode(&before_vector, &after_vector)?;
    let mut unresolved = None;

    let layout = actions.layout();
    let view = || logged_view(&before.observed, &before.extended, bridge);
    match action.action_type {
        ActionType::Roll => match roll_gain_logged(&before.observed, bridge) {
            Ok(gain) => substitute(layout, &view()?, &Outcome::Roll { gain }, &mut vector),
            Err(err) => {
                clear(layout, Chance::Roll, &mut vector);
                unresolved = Some(err);
            }
        },
        ActionType::BuyDevCard => {
            let deck = deck_logged(&before.observed)?;
            substitute(layout, &view()?, &Outcome::Draw { deck }, &mut vector);
        }
        ActionType::MoveRobber | ActionType::PlayKnight | ActionType::ChoosePlayer => {
            let victim_hand = victim(before, &after).map(|v| before.observed.hand(v));
            substitute(layout, &view()?, &Outcome::Steal { victim_hand }, &mut vector);
        }
        _ => {}
    }

    Ok(Label { vector, unresolved })
}

/// The row that shows the outcome of `action`. A robber move is completed by the choice of
/// victim when the log records one; a knight is completed by the choice within the next two
/// actions.
pub fn after_row_id<L: GameLog + ?Sized>(game: &LoggedGame<L>, action: &ActionRow) -> Attempt<usize> {
    let id = match action.action_type {
        ActionType::MoveRobber => match game.find_action(action.id + 1)? {
            Some(next) if next.action_type == ActionType::ChoosePlayer => next.after,
            _ => action.after,
        },
        ActionType::PlayKnight => {
            let mut after = action.after + 1;
            for id in action.id + 1..action.id + 3 {
                if let Some(next) = game.find_action(id)? {
                    if next.action_type == ActionType::ChoosePlayer {
                        after = next.after;
                        break;
                    }
                }
            }
            after
        }
        _ => action.after,
    };

    Ok(id)
}

/// The opponent whose hand changed between the two rows, if any.
pub fn victim(before: &LoggedSnapshot, after: &LoggedSnapshot) -> Option<usize> {
    let current = before.observed.current_player;
    (0..NUM_PLAYERS)
        .filter(|p| *p != current)
        .filter(|p| before.observed.players[*p].resources != after.observed.players[*p].resources)
        .last()
}
