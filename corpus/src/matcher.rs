use features::{ActionVector, LayoutError};

/// Tolerance for labels carrying expected values.
pub const EPSILON: f64 = 0.00001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Matching {
    /// Component-wise equality only.
    Exact,
    /// Equality first, then every component within the tolerance.
    Approximate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Match {
    Exact(usize),
    Approximate(usize),
}

impl Match {
    pub fn index(self) -> usize {
        match self {
            Match::Exact(i) | Match::Approximate(i) => i,
        }
    }
}

pub fn find_exact(label: &ActionVector, candidates: &[ActionVector]) -> Result<Option<usize>, LayoutError> {
    for candidate in candidates {
        check_version(label, candidate)?;
    }

    Ok(candidates.iter().position(|c| c.values() == label.values()))
}

/// First candidate whose largest component difference from `label` is at most `epsilon`.
pub fn find_within(
    label: &ActionVector,
    candidates: &[ActionVector],
    epsilon: f64,
) -> Result<Option<usize>, LayoutError> {
    for (i, candidate) in candidates.iter().enumerate() {
        if label.max_distance(candidate)? <= epsilon {
            return Ok(Some(i));
        }
    }

    Ok(None)
}

pub fn find_match(
    label: &ActionVector,
    candidates: &[ActionVector],
    matching: Matching,
    epsilon: f64,
) -> Result<Option<Match>, LayoutError> {
    if let Some(i) = find_exact(label, candidates)? {
        return Ok(Some(Match::Exact(i)));
    }

    if matching == Matching::Exact {
        return Ok(None);
    }

    Ok(find_within(label, candidates, epsilon)?.map(Match::Approximate))
}

fn check_version(label: &ActionVector, candidate: &ActionVector) -> Result<(), LayoutError> {
    if label.version() != candidate.version() {
        return Err(LayoutError::Mismatch {
            expected: label.version(),
            found: candidate.version(),
        });
    }

    Ok(())
}
