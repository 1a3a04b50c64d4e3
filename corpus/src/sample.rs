use features::{ActionVector, StateVector};
use std::fmt::{self, Display, Formatter};

/// A recorded decision: the position, every legal move from it and the one that was played.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub state: StateVector,
    pub legal_actions: Vec<ActionVector>,
    pub chosen_index: usize,
}

impl Sample {
    pub fn chosen(&self) -> &ActionVector {
        &self.legal_actions[self.chosen_index]
    }

    pub fn num_legal_actions(&self) -> usize {
        self.legal_actions.len()
    }
}

/// `legalCount,state…,chosen…,legal_1…,legal_2…`
impl Display for Sample {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.legal_actions.len(), self.state, self.chosen())?;
        for action in &self.legal_actions {
            write!(f, ",{}", action)?;
        }

        Ok(())
    }
}
