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

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Error;
use crate::private::Comparison;
use crate::rr::PrivacyMechanism;
use crate::sketch::MergeableSketch;
use crate::sketch::Sketch;

/// Above this, debiasing turns each unit of sketch error into more than a thousand units
/// of estimate error.
const MAX_NOISE_AMPLIFICATION: f64 = 1000.0;

/// One sketch per category behind a randomized-response mechanism.
///
/// `C` is the category label, `S` the per-category sketch and `M` the privacy mechanism.
///
/// # Preconditions
///
/// Every entity must be submitted at most once. A sketch cannot forget an insertion, and
/// an entity submitted twice is randomized twice: it may then be counted under two
/// categories, and the pair of reports leaks more about its true category than `epsilon`
/// allows.
#[derive(Debug)]
pub struct PrivateSketch<C, S, M> {
    uniques: Vec<C>,
    /// Category to index into `uniques` and `sketches`.
    slots: HashMap<C, usize>,
    sketches: Vec<S>,
    mechanism: M,
    /// Number of successful `count_dp` calls.
    total_reports: u64,
}

impl<C, S, M> PrivateSketch<C, S, M>
where
    C: Eq + Hash + Clone + Debug,
    S: Sketch,
    S::Hasher: Clone,
    M: PrivacyMechanism,
{
    /// Creates a private sketch over `uniques`, building the mechanism from `epsilon`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `uniques` is empty or holds duplicates, if the mechanism rejects `epsilon` or the
    /// number of categories, or if the sketch rejects `config`.
    pub fn new(
        epsilon: f64,
        uniques: Vec<C>,
        config: &S::Config,
        hasher: S::Hasher,
    ) -> Result<Self, Error> {
        let slots = index_uniques(&uniques)?;
        let mechanism = M::new(epsilon, uniques.len())?;
        Self::build(uniques, slots, mechanism, config, hasher)
    }

    /// Creates a private sketch around a prebuilt mechanism, e.g. one with a seeded
    /// generator.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new); additionally the mechanism's dimension must equal the number
    /// of categories.
    pub fn with_mechanism(
        uniques: Vec<C>,
        mechanism: M,
        config: &S::Config,
        hasher: S::Hasher,
    ) -> Result<Self, Error> {
        let slots = index_uniques(&uniques)?;
        if mechanism.dimension() != uniques.len() {
            return Err(Error::config_invalid(
                "mechanism dimension does not match the number of categories",
            )
            .with_context("dimension", mechanism.dimension())
            .with_context("categories", uniques.len()));
        }
        Self::build(uniques, slots, mechanism, config, hasher)
    }

    fn build(
        uniques: Vec<C>,
        slots: HashMap<C, usize>,
        mechanism: M,
        config: &S::Config,
        hasher: S::Hasher,
    ) -> Result<Self, Error> {
        let sketches = uniques
            .iter()
            .map(|_| S::new(config, hasher.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let (p, q) = mechanism.probabilities();
        let amplification = mechanism.noise_amplification();
        tracing::debug!(
            categories = uniques.len(),
            epsilon = mechanism.epsilon(),
            p,
            q,
            "built private sketch"
        );
        if amplification > MAX_NOISE_AMPLIFICATION {
            tracing::warn!(
                epsilon = mechanism.epsilon(),
                amplification,
                "epsilon is so small that estimates will be dominated by noise"
            );
        }

        Ok(Self {
            uniques,
            slots,
            sketches,
            mechanism,
            total_reports: 0,
        })
    }

    fn slot(&self, category: &C) -> Result<usize, Error> {
        self.slots
            .get(category)
            .copied()
            .ok_or_else(|| Error::unknown_category(category))
    }

    /// Records `entity` as belonging to `category`.
    ///
    /// The category is randomized first and the entity is inserted into the sketch of the
    /// reported category.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `category` is not one of the configured categories; nothing is recorded then.
    pub fn count_dp<T: Hash + ?Sized>(&mut self, entity: &T, category: &C) -> Result<(), Error> {
        let slot = self.slot(category)?;
        let report = self.mechanism.randomize(slot);
        self.sketches[report].add(entity);
        self.total_reports += 1;
        Ok(())
    }

    /// Returns the debiased estimate of the number of distinct entities in `category`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `category` is not one of the configured categories.
    pub fn get_estimated_cardinality(&self, category: &C) -> Result<f64, Error> {
        let slot = self.slot(category)?;
        Ok(self.estimate_slot(slot))
    }

    fn estimate_slot(&self, slot: usize) -> f64 {
        let raw = self.sketches[slot].count();
        self.mechanism.get_cardinality(raw, self.total_reports)
    }

    /// Returns the debiased estimate of every category, in the order of the categories.
    pub fn estimated_cardinalities(&self) -> Vec<(C, f64)> {
        self.uniques
            .iter()
            .enumerate()
            .map(|(slot, category)| (category.clone(), self.estimate_slot(slot)))
            .collect()
    }

    /// Pairs the caller's true counts with the estimates, in the order of the categories.
    ///
    /// Categories missing from `real_frequencies` have a real count of 0; entries for
    /// categories that are not configured are ignored.
    pub fn compare(&self, real_frequencies: &HashMap<C, u64>) -> Vec<Comparison<C>> {
        self.estimated_cardinalities()
            .into_iter()
            .map(|(category, estimated)| {
                let real = real_frequencies.get(&category).copied().unwrap_or(0);
                Comparison {
                    category,
                    real,
                    estimated,
                }
            })
            .collect()
    }

    /// Returns the categories in construction order.
    pub fn uniques(&self) -> &[C] {
        &self.uniques
    }

    /// Returns the number of observations recorded so far.
    pub fn total_reports(&self) -> u64 {
        self.total_reports
    }

    pub fn mechanism(&self) -> &M {
        &self.mechanism
    }

    /// Returns the sketch holding the reports for `category`.
    pub fn sketch(&self, category: &C) -> Result<&S, Error> {
        let slot = self.slot(category)?;
        Ok(&self.sketches[slot])
    }
}

impl<C, S, M> PrivateSketch<C, S, M>
where
    C: Eq + Hash + Clone + Debug,
    S: MergeableSketch,
    S::Hasher: Clone,
    M: PrivacyMechanism,
{
    /// Returns a new sketch of the union of the reports recorded for `categories`.
    ///
    /// The result is not debiased: an entity belongs to exactly one report category, so the
    /// union over all categories estimates the number of distinct entities regardless of
    /// randomization.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) for
    /// an unknown category and [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if `categories` is empty.
    pub fn union(&self, categories: &[C]) -> Result<S, Error> {
        let sketches = categories
            .iter()
            .map(|category| self.slot(category).map(|slot| &self.sketches[slot]))
            .collect::<Result<Vec<_>, _>>()?;
        S::union(&sketches)
    }

    /// Returns a new sketch of the union of every category.
    pub fn union_all(&self) -> Result<S, Error> {
        let sketches: Vec<&S> = self.sketches.iter().collect();
        S::union(&sketches)
    }
}

fn index_uniques<C: Eq + Hash + Clone + Debug>(uniques: &[C]) -> Result<HashMap<C, usize>, Error> {
    if uniques.is_empty() {
        return Err(Error::config_invalid("size of uniques has to be bigger than 0"));
    }

    let mut slots = HashMap::with_capacity(uniques.len());
    for (slot, category) in uniques.iter().enumerate() {
        if slots.insert(category.clone(), slot).is_some() {
            return Err(Error::config_invalid("uniques must not contain duplicates")
                .with_context("category", format!("{category:?}")));
        }
    }
    Ok(slots)
}
