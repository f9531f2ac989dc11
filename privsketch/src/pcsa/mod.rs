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

//! Probabilistic Counting with Stochastic Averaging (PCSA).
//!
//! A PCSA sketch keeps `num_maps` small bitmaps. Each inserted entity is hashed once: the
//! hash modulo `num_maps` picks a bitmap, and the number of trailing zero bits of the
//! quotient picks which bit of that bitmap to set. Bit `r` is therefore reached with
//! probability `2^-(r+1)`, and the position of the lowest bit still clear in a bitmap
//! grows like `log2` of the number of distinct entities routed to it.
//!
//! # Estimation
//!
//! The estimate averages that lowest-clear-bit position `A` over all bitmaps and returns
//! `num_maps * 2^A / φ` with `φ ≈ 0.77351`. The relative standard error is about
//! `0.78 / sqrt(num_maps)`. While many bitmaps still have their first bit clear the
//! average is too coarse, so small cardinalities are estimated by hit counting instead:
//! `-2 * num_maps * ln(k / num_maps)` where `k` is the number of bitmaps whose first bit
//! is clear.
//!
//! # Perturbation
//!
//! A sketch may be built with a perturbation probability `r`: every bit starts set with
//! probability `r`, which hides whether any particular bit was set by an insertion. The
//! correction factor `φ` is adjusted for `r` (see [`correction_factor`]).
//!
//! # Union
//!
//! Sketches with the same shape and hash function merge by OR-ing their bitmaps; the
//! merged sketch estimates the cardinality of the union of the inputs.
//!
//! # Usage
//!
//! ```rust
//! # use privsketch::hash::MurmurHash3;
//! # use privsketch::pcsa::{PcsaConfig, PcsaSketch};
//! let config = PcsaConfig::default().with_num_maps(64);
//! let mut left = PcsaSketch::new(&config, MurmurHash3::default()).unwrap();
//! let mut right = PcsaSketch::new(&config, MurmurHash3::default()).unwrap();
//! for i in 0..5_000u32 {
//!     left.add(&i);
//!     right.add(&(i + 5_000));
//! }
//! let union = PcsaSketch::union(&[&left, &right]).unwrap();
//! assert!(union.count() > left.count());
//! ```
//!
//! # References
//!
//! - Philippe Flajolet, G. Nigel Martin, "Probabilistic counting algorithms for data base
//!   applications", 1985.
//! - Florian Tschorsch, Björn Scheuermann, "An algorithm for privacy-preserving
//!   distributed user statistics", 2013.

mod estimator;
mod serialization;
mod sketch;

pub use self::estimator::correction_factor;
pub use self::sketch::PcsaSketch;

use crate::error::Error;

/// Default number of bitmaps.
pub const DEFAULT_NUM_MAPS: u32 = 256;
/// Default number of bits per bitmap.
pub const DEFAULT_LENGTH: u8 = 32;
/// A bitmap is stored in one `u64`.
pub const MAX_LENGTH: u8 = 64;
/// Upper bound on the number of bitmaps (8 MiB of bitmap words).
pub const MAX_NUM_MAPS: u32 = 1 << 20;

/// Shape of a [`PcsaSketch`].
///
/// # Examples
///
/// ```
/// use privsketch::pcsa::PcsaConfig;
///
/// let config = PcsaConfig::default().with_num_maps(1024).with_perturbation(0.1);
/// assert_eq!(config.num_maps(), 1024);
/// assert_eq!(config.length(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcsaConfig {
    num_maps: u32,
    length: u8,
    perturbation: f64,
}

impl Default for PcsaConfig {
    fn default() -> Self {
        Self {
            num_maps: DEFAULT_NUM_MAPS,
            length: DEFAULT_LENGTH,
            perturbation: 0.0,
        }
    }
}

impl PcsaConfig {
    /// Sets the number of bitmaps. More bitmaps lower the estimator variance.
    pub fn with_num_maps(mut self, num_maps: u32) -> Self {
        self.num_maps = num_maps;
        self
    }

    /// Sets the number of bits per bitmap, in `[1, 64]`.
    pub fn with_length(mut self, length: u8) -> Self {
        self.length = length;
        self
    }

    /// Sets the probability with which every bit is set when the sketch is created.
    pub fn with_perturbation(mut self, perturbation: f64) -> Self {
        self.perturbation = perturbation;
        self
    }

    pub fn num_maps(&self) -> u32 {
        self.num_maps
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn perturbation(&self) -> f64 {
        self.perturbation
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_NUM_MAPS).contains(&self.num_maps) {
            return Err(Error::config_invalid(format!(
                "num_maps must be in [1, {MAX_NUM_MAPS}], got {}",
                self.num_maps
            )));
        }
        if !(1..=MAX_LENGTH).contains(&self.length) {
            return Err(Error::config_invalid(format!(
                "length must be in [1, {MAX_LENGTH}], got {}",
                self.length
            )));
        }
        if !(0.0..=1.0).contains(&self.perturbation) {
            return Err(Error::config_invalid(format!(
                "perturbation must be in [0, 1], got {}",
                self.perturbation
            )));
        }
        Ok(())
    }
}
