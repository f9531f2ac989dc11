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

/// Forced randomized response.
///
/// With probability `p₁ = (e^ε - 1) / (e^ε + d - 1)` the true category is reported;
/// otherwise the answer is forced to a category drawn uniformly from all `d`, which may
/// happen to be the true one (`p₂ = 1 / d`). A category with true count `c` among `n`
/// reports is observed `c·p₁ + n·p₂·(1 - p₁)` times in expectation.
#[derive(Debug, Clone)]
pub struct ForcedRandomizedResponse<R = StdRng> {
    epsilon: f64,
    dimension: usize,
    /// Probability of the truthful branch.
    p1: f64,
    /// Probability of each forced answer.
    p2: f64,
    rng: R,
}

impl<R: Rng> ForcedRandomizedResponse<R> {
    /// Builds the mechanism on top of the given generator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `epsilon` is not positive or `dimension < 2`.
    pub fn with_rng(epsilon: f64, dimension: usize, rng: R) -> Result<Self, Error> {
        validate(epsilon, dimension)?;

        let e = exp_neg_epsilon(epsilon);
        let p1 = (1.0 - e) / (1.0 + (dimension - 1) as f64 * e);
        let p2 = 1.0 / dimension as f64;
        Ok(Self {
            epsilon,
            dimension,
            p1,
            p2,
            rng,
        })
    }
}

impl<R: Rng + SeedableRng> PrivacyMechanism for ForcedRandomizedResponse<R> {
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
        (self.p1, self.p2)
    }

    fn noise_amplification(&self) -> f64 {
        1.0 / self.p1
    }

    fn randomize(&mut self, index: usize) -> usize {
        debug_assert!(index < self.dimension);
        if self.rng.random_bool(self.p1) {
            index
        } else {
            self.rng.random_range(0..self.dimension)
        }
    }

    fn get_cardinality(&self, raw_count: f64, n: u64) -> f64 {
        (raw_count - n as f64 * self.p2 * (1.0 - self.p1)) / self.p1
    }
}
