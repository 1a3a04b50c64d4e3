use super::layout::{Encoding, Field, Layout, LayoutError};
use super::vector::{ActionVector, StateVector};

/// Turns a before/after pair of state vectors into the change the action made, restricted to
/// the fields an action can change.
#[derive(Clone, Debug)]
pub struct ActionEncoder {
    layout: Layout,
}

impl ActionEncoder {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn encode(&self, before: &StateVector, after: &StateVector) -> Result<ActionVector, LayoutError> {
        self.layout.check(before.version())?;
        self.layout.check(after.version())?;

        let (before, after) = (before.values(), after.values());
        let mut values = vec![0.0; self.layout.action_len()];
        for slot in self.layout.action_slots() {
            let from = self.layout.offset_of(slot.field)?;
            for i in 0..slot.width() {
                values[slot.offset + i] = f64::from(after[from + i] - before[from + i]);
            }
        }

        Ok(ActionVector::new(self.layout.version(), values))
    }

    /// Passing the turn changes nothing about the position of the player who passes; the
    /// numeric layout marks it on the turn slot.
    pub fn end_turn(&self) -> ActionVector {
        let mut action = ActionVector::zeros(self.layout.version(), self.layout.action_len());
        if self.layout.encoding() == Encoding::Numeric {
            if let Ok(turn) = self.layout.action_offset_of(Field::CurrentTurn) {
                action.values_mut()[turn] = -1.0;
            }
        }

        action
    }

    pub fn zero(&self) -> ActionVector {
        ActionVector::zeros(self.layout.version(), self.layout.action_len())
    }
}
