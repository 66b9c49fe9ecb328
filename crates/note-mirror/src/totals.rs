use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// What happened to a single file during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred,
    /// A local copy already satisfied the skip policy.
    Skipped,
    Failed,
}

impl TransferOutcome {
    /// Skips count as successes: they need no action and are not errors.
    pub fn succeeded(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// `(succeeded, total)` counts for a batch of files or a whole walk.
///
/// `succeeded <= total` holds for every value built through the
/// constructors and arithmetic here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncTotals {
    pub succeeded: usize,
    pub total: usize,
}

impl SyncTotals {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = TransferOutcome>,
    {
        outcomes.into_iter().fold(Self::empty(), |mut acc, outcome| {
            acc.record(outcome);
            acc
        })
    }

    pub fn record(&mut self, outcome: TransferOutcome) {
        self.total += 1;
        if outcome.succeeded() {
            self.succeeded += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.succeeded)
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn as_pair(&self) -> (usize, usize) {
        (self.succeeded, self.total)
    }
}

impl Add for SyncTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            succeeded: self.succeeded + rhs.succeeded,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for SyncTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for SyncTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::empty(), Add::add)
    }
}

impl fmt::Display for SyncTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}
