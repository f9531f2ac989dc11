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

/// Flajolet-Martin bias correction for an unperturbed sketch.
pub(super) const PHI: f64 = 0.773519;

/// Hit counting is used while more than this fraction of bitmaps have bit 0 clear.
const HIT_COUNTING_THRESHOLD: f64 = 0.3;

// Parameters of the perturbed correction factor.
const WORD_BITS: i32 = 32;
const REFERENCE_CARDINALITY: f64 = 100_000.0;

/// Returns the correction factor `φ` for a sketch whose bits were pre-set with
/// probability `perturbation`.
///
/// For `perturbation == 0` this is the Flajolet-Martin constant `0.773519`. Otherwise it is
/// `2^E / n` where `E` is the expected position of the lowest clear bit of a 32-bit bitmap
/// after `n = 100000` insertions, given that every bit is also set independently with
/// probability `perturbation`.
///
/// # Examples
///
/// ```
/// use privsketch::pcsa::correction_factor;
///
/// assert_eq!(correction_factor(0.0), 0.773519);
/// assert!((correction_factor(0.5) - 1.8483246464054996).abs() < 1e-9);
/// ```
pub fn correction_factor(perturbation: f64) -> f64 {
    if perturbation == 0.0 {
        return PHI;
    }

    let keep = 1.0 - perturbation;
    // probability that none of the reference insertions reaches bit `i - 1`
    let untouched = |i: i32| (1.0 - 2f64.powi(-i)).powf(REFERENCE_CARDINALITY);

    let mut all_set = 1.0;
    let mut expected_rank = 0.0;
    for j in 1..=WORD_BITS {
        all_set *= 1.0 - untouched(j) * keep;
        expected_rank += j as f64 * all_set * untouched(j + 1) * keep;
    }
    2f64.powf(expected_rank) / REFERENCE_CARDINALITY
}

/// Index of the lowest clear bit, or `length` if the bitmap is full.
#[inline]
pub(super) fn fill_level(bitmap: u64, length: u8) -> u32 {
    bitmap.trailing_ones().min(length as u32)
}

/// Estimates the number of distinct entities behind `bitmaps`.
///
/// `hit_counting` enables the small-range estimator; it assumes bits are only ever set by
/// insertions and must be off for perturbed sketches.
pub(super) fn estimate(bitmaps: &[u64], length: u8, phi: f64, hit_counting: bool) -> f64 {
    let num_maps = bitmaps.len() as f64;

    if hit_counting {
        let clear = bitmaps.iter().filter(|&&bitmap| bitmap & 1 == 0).count() as f64;
        if clear > HIT_COUNTING_THRESHOLD * num_maps {
            return -2.0 * num_maps * (clear / num_maps).ln();
        }
    }

    let total: u64 = bitmaps
        .iter()
        .map(|&bitmap| fill_level(bitmap, length) as u64)
        .sum();
    let mean = total as f64 / num_maps;
    num_maps * 2f64.powf(mean) / phi
}
