use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use super::layout::{LayoutError, LayoutVersion};

/// An encoded game state, tagged with the layout it was written with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateVector {
    version: LayoutVersion,
    values: Vec<i32>,
}

impl StateVector {
    pub fn new(version: LayoutVersion, values: Vec<i32>) -> Self {
        Self { version, values }
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Display for StateVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.iter().join(","))
    }
}

/// The change an action makes to the action-attributable part of a state vector.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionVector {
    version: LayoutVersion,
    values: Vec<f64>,
}

impl ActionVector {
    pub fn new(version: LayoutVersion, values: Vec<f64>) -> Self {
        Self { version, values }
    }

    pub fn zeros(version: LayoutVersion, len: usize) -> Self {
        Self::new(version, vec![0.0; len])
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Largest absolute component difference, failing when the layouts differ.
    pub fn max_distance(&self, other: &ActionVector) -> Result<f64, LayoutError> {
        if self.version != other.version {
            return Err(LayoutError::Mismatch {
                expected: self.version,
                found: other.version,
            });
        }

        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }
}

impl Display for ActionVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.iter().join(","))
    }
}
