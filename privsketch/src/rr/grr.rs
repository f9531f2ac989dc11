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

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::rr::PrivacyMechanism;
use crate::rr::exp_neg_epsilon;
use crate::rr::validate;

/// Generalized randomized response (k-ary randomized response).
///
/// Reports the true category with probability `p = e^ε / (e^ε + d - 1)` and each of the
/// `d - 1` other categories with probability `q = (1 - p) / (d - 1)`. A category with true
/// count `c` among `n` reports is observed `c·p + (n - c)·q` times in expectation, so
/// `(raw - n·q) / (p - q)` is unbiased.
///
/// # Examples
///
/// ```
/// use privsketch::rr::{GeneralizedRandomizedResponse, PrivacyMechanism};
///
/// let mut grr: GeneralizedRandomizedResponse = PrivacyMechanism::new(f64::INFINITY, 3).unwrap();
/// let uniques = ["a", "b", "c"];
/// assert_eq!(grr.dp(&"b", &uniques).unwrap(), &"b");
/// assert_eq!(grr.get_cardinality(42.0, 100), 42.0);
/// ```
#[derive(Debug, Clone)]
pub struct GeneralizedRandomizedResponse<R = StdRng> {
    epsilon: f64,
    dimension: usize,
    /// Probability of reporting the true category.
    p: f64,
    /// Probability of reporting one particular other category.
    q: f64,
    rng: R,
}

impl<R: Rng> GeneralizedRandomizedResponse<R> {
    /// Builds the mechanism on top of the given generator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `epsilon` is not positive or `dimension < 2`.
    pub fn with_rng(epsilon: f64, dimension: usize, rng: R) -> Result<Self, Error> {
        validate(epsilon, dimension)?;

        let others = (dimension - 1) as f64;
        let p = 1.0 / (1.0 + others * exp_neg_epsilon(epsilon));
        let q = (1.0 - p) / others;
        Ok(Self {
            epsilon,
            dimension,
            p,
            q,
            rng,
        })
    }
}

impl<R: Rng + SeedableRng> PrivacyMechanism for GeneralizedRandomizedResponse<R> {
    fn new(epsilon: f64, dimension: usize) -> Result<Self, Error> {
        Self::with_rng(epsilon, dimension, R::from_os_rng())
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn probabilities(&self) -> (f64, f64) {
        (self.p, self.q)
    }

    fn noise_amplification(&self) -> f64 {
        1.0 / (self.p - self.q)
    }

    fn randomize(&mut self, index: usize) -> usize {
        debug_assert!(index < self.dimension);
        if self.rng.random_bool(self.p) {
            return index;
        }
        // uniform over the other categories: draw from d - 1 slots and skip `index`
        let other = self.rng.random_range(0..self.dimension - 1);
        if other >= index { other + 1 } else { other }
    }

    fn get_cardinality(&self, raw_count: f64, n: u64) -> f64 {
        (raw_count - n as f64 * self.q) / (self.p - self.q)
    }
}
