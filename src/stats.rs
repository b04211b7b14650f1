//! Running statistics over a sequence of `f64` samples.

use std::ops::{Add, Mul};

/// Accumulates samples and reports their count, sum, mean and extremes.
///
/// The samples themselves are retained so that two accumulators can be
/// concatenated (`+`) or rescaled (`scale * &stats`).
#[derive(Clone, Debug, Default)]
pub struct Statistician {
    samples: Vec<f64>,
    total: f64,
    smallest: f64,
    largest: f64,
}

impl Statistician {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, value: f64) {
        if self.samples.is_empty() || value < self.smallest {
            self.smallest = value;
        }
        if self.samples.is_empty() || value > self.largest {
            self.largest = value;
        }
        self.total += value;
        self.samples.push(value);
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.total = 0.0;
        self.smallest = 0.0;
        self.largest = 0.0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.total
    }

    /// `None` until at least one sample has been seen.
    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.total / self.samples.len() as f64)
    }

    pub fn minimum(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.smallest)
    }

    pub fn maximum(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.largest)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

/// Equal if both are empty, or if length, sum, minimum and maximum all agree.
impl PartialEq for Statistician {
    fn eq(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() && other.is_empty();
        }
        self.len() == other.len()
            && self.total == other.total
            && self.smallest == other.smallest
            && self.largest == other.largest
    }
}

impl Extend<f64> for Statistician {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.next(value);
        }
    }
}

impl FromIterator<f64> for Statistician {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}

/// Concatenates the two sample sequences.
impl Add for &Statistician {
    type Output = Statistician;

    fn add(self, rhs: &Statistician) -> Statistician {
        let mut out = self.clone();
        out.extend(rhs.samples.iter().copied());
        out
    }
}

impl Add for Statistician {
    type Output = Statistician;

    fn add(mut self, rhs: Statistician) -> Statistician {
        self.extend(rhs.samples);
        self
    }
}

/// Multiplies every sample by the scale factor.
impl Mul<&Statistician> for f64 {
    type Output = Statistician;

    fn mul(self, rhs: &Statistician) -> Statistician {
        rhs.samples.iter().map(|value| value * self).collect()
    }
}
