//! Target weights and per-bar decisions.

/// Signed target allocations aligned with the universe.
///
/// Positive entries are long, negative entries short. After [`Weights::normalized`]
/// the absolute values sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights(Vec<f64>);

impl Weights {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn gross(&self) -> f64 {
        self.0.iter().map(|w| w.abs()).sum()
    }

    /// Scale so the absolute values sum to one. All-zero weights stay zero.
    pub fn normalized(self) -> Self {
        let gross = self.gross();
        if gross == 0.0 {
            return self;
        }
        Self(self.0.into_iter().map(|w| w / gross).collect())
    }
}

/// Outcome of one bar of the decision pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Keep the current holdings.
    NoChange,
    Rebalance(Weights),
}

impl Decision {
    pub fn is_no_change(&self) -> bool {
        matches!(self, Decision::NoChange)
    }

    pub fn weights(&self) -> Option<&Weights> {
        match self {
            Decision::NoChange => None,
            Decision::Rebalance(w) => Some(w),
        }
    }
}
