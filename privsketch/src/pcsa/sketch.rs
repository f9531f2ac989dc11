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

use std::hash::Hash;

use rand::Rng;

use crate::error::Error;
use crate::hash::HashFunction;
use crate::hash::MurmurHash3;
use crate::pcsa::PcsaConfig;
use crate::pcsa::estimator;
use crate::sketch::MergeableSketch;
use crate::sketch::Sketch;

/// A PCSA distinct-counting sketch.
///
/// See the [module level documentation](crate::pcsa) for the algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct PcsaSketch<H = MurmurHash3> {
    // immutable config variables
    length: u8,
    perturbation: f64,
    /// Derived from `perturbation`.
    phi: f64,
    hasher: H,

    /// One word per bitmap; only the low `length` bits are used.
    bitmaps: Vec<u64>,
}

impl<H: HashFunction> PcsaSketch<H> {
    /// Creates an empty sketch.
    ///
    /// If the config asks for perturbation, the initial noise bits are drawn from the
    /// thread-local generator, which is seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if the
    /// config is out of range.
    pub fn new(config: &PcsaConfig, hasher: H) -> Result<Self, Error> {
        Self::with_rng(config, hasher, &mut rand::rng())
    }

    /// Creates an empty sketch, drawing perturbation noise from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        config: &PcsaConfig,
        hasher: H,
        rng: &mut R,
    ) -> Result<Self, Error> {
        config.validate()?;

        let length = config.length();
        let perturbation = config.perturbation();
        let mut bitmaps = vec![0u64; config.num_maps() as usize];
        if perturbation > 0.0 {
            for bitmap in bitmaps.iter_mut() {
                for bit in 0..length {
                    if rng.random_bool(perturbation) {
                        *bitmap |= 1u64 << bit;
                    }
                }
            }
        }

        Ok(Self {
            length,
            perturbation,
            phi: estimator::correction_factor(perturbation),
            hasher,
            bitmaps,
        })
    }

    pub(super) fn from_raw_parts(
        config: &PcsaConfig,
        hasher: H,
        bitmaps: Vec<u64>,
    ) -> Result<Self, Error> {
        config.validate()?;
        debug_assert_eq!(bitmaps.len(), config.num_maps() as usize);
        Ok(Self {
            length: config.length(),
            perturbation: config.perturbation(),
            phi: estimator::correction_factor(config.perturbation()),
            hasher,
            bitmaps,
        })
    }

    /// Inserts an entity.
    ///
    /// Part of the hash selects the bitmap, the rest selects a bit with geometrically
    /// decreasing probability. Bits are only ever set, so the estimate never decreases.
    pub fn add<T: Hash + ?Sized>(&mut self, entity: &T) {
        let hash = self.hasher.hash(entity);
        let num_maps = self.bitmaps.len() as u64;
        let index = (hash % num_maps) as usize;
        // a zero quotient has 64 trailing zeros and lands on the last bit like any deep rank
        let rank = (hash / num_maps).trailing_zeros().min(self.length as u32 - 1);
        self.bitmaps[index] |= 1u64 << rank;
    }

    /// Returns the estimated number of distinct entities.
    pub fn count(&self) -> f64 {
        let hit_counting = self.perturbation == 0.0;
        estimator::estimate(&self.bitmaps, self.length, self.phi, hit_counting)
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<H> PcsaSketch<H> {
    /// Returns the number of bitmaps.
    pub fn num_maps(&self) -> u32 {
        self.bitmaps.len() as u32
    }

    /// Returns the number of bits per bitmap.
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn perturbation(&self) -> f64 {
        self.perturbation
    }

    /// Returns the correction factor `φ` the estimator divides by.
    pub fn correction_factor(&self) -> f64 {
        self.phi
    }

    /// Returns the raw bitmaps, one word per bitmap, bit `i` of a word being bit `i` of
    /// the bitmap.
    pub fn bitmaps(&self) -> &[u64] {
        &self.bitmaps
    }

    /// Returns true if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bitmaps.iter().all(|&bitmap| bitmap == 0)
    }

    /// Returns the size of the bitmaps in bytes, counting only the used bits.
    pub fn size_in_bytes(&self) -> usize {
        (self.bitmaps.len() * self.length as usize).div_ceil(8)
    }

    pub(super) fn config(&self) -> PcsaConfig {
        PcsaConfig::default()
            .with_num_maps(self.num_maps())
            .with_length(self.length)
            .with_perturbation(self.perturbation)
    }
}

impl<H: HashFunction + Clone + PartialEq> PcsaSketch<H> {
    /// Returns a new sketch whose bitmaps are the OR of the bitmaps of all `sketches`.
    ///
    /// The result estimates the cardinality of the union of the entity sets behind the
    /// inputs. Its perturbation is the largest perturbation among the inputs, which keeps
    /// the operation idempotent, commutative and associative.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `sketches` is empty, or if the sketches differ in number of bitmaps, bitmap length or
    /// hash function.
    pub fn union(sketches: &[&Self]) -> Result<Self, Error> {
        let (first, rest) = sketches
            .split_first()
            .ok_or_else(|| Error::config_invalid("cannot union an empty list of sketches"))?;

        let mut union = (*first).clone();
        for sketch in rest {
            union.merge(sketch)?;
        }
        tracing::trace!(
            inputs = sketches.len(),
            num_maps = union.num_maps(),
            "merged pcsa sketches"
        );
        Ok(union)
    }

    /// ORs the bitmaps of `other` into this sketch.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if the
    /// sketches are not compatible; `self` is left unchanged.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        self.check_compatible(other)?;

        for (dst, src) in self.bitmaps.iter_mut().zip(other.bitmaps.iter()) {
            *dst |= *src;
        }
        if other.perturbation > self.perturbation {
            self.perturbation = other.perturbation;
            self.phi = other.phi;
        }
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<(), Error> {
        if self.num_maps() != other.num_maps() {
            return Err(Error::config_invalid("sketches have different values for num_maps")
                .with_context("left", self.num_maps())
                .with_context("right", other.num_maps()));
        }
        if self.length != other.length {
            return Err(Error::config_invalid("sketches have different values for length")
                .with_context("left", self.length)
                .with_context("right", other.length));
        }
        if self.hasher != other.hasher {
            return Err(Error::config_invalid("sketches use different hash functions"));
        }
        Ok(())
    }
}

impl<H: HashFunction> Sketch for PcsaSketch<H> {
    type Config = PcsaConfig;
    type Hasher = H;

    fn new(config: &PcsaConfig, hasher: H) -> Result<Self, Error> {
        PcsaSketch::new(config, hasher)
    }

    fn add<T: Hash + ?Sized>(&mut self, entity: &T) {
        PcsaSketch::add(self, entity)
    }

    fn count(&self) -> f64 {
        PcsaSketch::count(self)
    }
}

impl<H: HashFunction + Clone + PartialEq> MergeableSketch for PcsaSketch<H> {
    fn union(sketches: &[&Self]) -> Result<Self, Error> {
        PcsaSketch::union(sketches)
    }
}
