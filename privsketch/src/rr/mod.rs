// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Categorical randomized response.
//!
//! A mechanism takes the true category of an observation and returns the category to
//! record it against: the true one with a probability set by `epsilon`, otherwise a random
//! one. Because the randomization probabilities are public, the per-category counts
//! observed after randomization can be debiased back into unbiased estimates of the true
//! counts with [`PrivacyMechanism::get_cardinality`].
//!
//! Two variants are provided. They produce the same report distribution and differ only
//! in how it is parameterized:
//!
//! - [`GeneralizedRandomizedResponse`]: report the truth with probability
//!   `p = e^ε / (e^ε + d - 1)`, otherwise one of the `d - 1` other categories uniformly.
//! - [`ForcedRandomizedResponse`]: report the truth with probability
//!   `p₁ = (e^ε - 1) / (e^ε + d - 1)`, otherwise any of the `d` categories uniformly.
//!
//! Either way the ratio between the probabilities of the most and least likely report is
//! `e^ε`, which is the `ε`-differential-privacy guarantee for the reported category.
//!
//! # Randomness
//!
//! Each mechanism owns its random generator. [`PrivacyMechanism::new`] seeds a
//! [`StdRng`](rand::rngs::StdRng) from the operating system. Deterministic generators are
//! only for tests: a predictable generator lets anyone replay the reports and defeats the
//! privacy guarantee.
//!
//! # References
//!
//! - S. L. Warner, "Randomized response: a survey technique for eliminating evasive answer
//!   bias", 1965.
//! - R. F. Boruch, "Assuring confidentiality of responses in social research: a note on
//!   strategies", 1971.

mod forced;
mod grr;

pub use self::forced::ForcedRandomizedResponse;
pub use self::grr::GeneralizedRandomizedResponse;

use crate::error::Error;

/// A randomized-response mechanism over `dimension` categories.
pub trait PrivacyMechanism: Sized {
    /// Builds a mechanism with an operating-system-seeded generator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `epsilon` is not positive or `dimension < 2`.
    fn new(epsilon: f64, dimension: usize) -> Result<Self, Error>;

    /// Returns the privacy budget.
    fn epsilon(&self) -> f64;

    /// Returns the number of categories.
    fn dimension(&self) -> usize;

    /// Returns the two parameters of the mechanism: the probability of taking the truthful
    /// branch and the probability of each individual noise outcome.
    fn probabilities(&self) -> (f64, f64);

    /// Returns the factor by which debiasing scales the noise of a raw count.
    fn noise_amplification(&self) -> f64;

    /// Randomizes the category at `index`, returning the index to report.
    ///
    /// `index` must be below [`dimension`](Self::dimension).
    fn randomize(&mut self, index: usize) -> usize;

    /// Returns an unbiased estimate of the true count of a category from `raw_count`, the
    /// count observed for it after randomization, and `n`, the total number of reports.
    ///
    /// The result is not clamped and may be negative for rare categories.
    fn get_cardinality(&self, raw_count: f64, n: u64) -> f64;

    /// Returns the category to report for `element`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `element` is not in `uniques` or `uniques` does not hold
    /// [`dimension`](Self::dimension) categories.
    fn dp<'a, C>(&mut self, element: &C, uniques: &'a [C]) -> Result<&'a C, Error>
    where
        C: PartialEq + std::fmt::Debug,
    {
        if uniques.len() != self.dimension() {
            return Err(Error::invalid_argument(format!(
                "expected {} categories, got {}",
                self.dimension(),
                uniques.len()
            )));
        }
        let index = uniques
            .iter()
            .position(|category| category == element)
            .ok_or_else(|| Error::unknown_category(element))?;
        Ok(&uniques[self.randomize(index)])
    }
}

/// `e^-ε`, which is 0 for an infinite budget.
///
/// The probabilities below are written in terms of `e^-ε` so that large budgets do not
/// overflow `e^ε`.
fn exp_neg_epsilon(epsilon: f64) -> f64 {
    (-epsilon).exp()
}

fn validate(epsilon: f64, dimension: usize) -> Result<(), Error> {
    if epsilon.is_nan() || epsilon <= 0.0 {
        return Err(Error::config_invalid("epsilon has to be positive")
            .with_context("epsilon", epsilon));
    }
    if dimension < 2 {
        return Err(Error::config_invalid("dimension has to be at least 2")
            .with_context("dimension", dimension));
    }
    Ok(())
}
