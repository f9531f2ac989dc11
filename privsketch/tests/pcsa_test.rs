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

use googletest::assert_that;
use googletest::prelude::eq;
use googletest::prelude::ge;
use googletest::prelude::lt;
use googletest::prelude::near;
use privsketch::error::ErrorKind;
use privsketch::hash::MurmurHash3;
use privsketch::pcsa::MAX_NUM_MAPS;
use privsketch::pcsa::PcsaConfig;
use privsketch::pcsa::PcsaSketch;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn sketch(num_maps: u32) -> PcsaSketch {
    PcsaSketch::new(
        &PcsaConfig::default().with_num_maps(num_maps),
        MurmurHash3::default(),
    )
    .unwrap()
}

#[test]
fn test_empty_sketch() {
    let sketch = sketch(256);
    assert!(sketch.is_empty());
    assert_that!(sketch.count(), eq(0.0));
    assert_that!(sketch.num_maps(), eq(256));
    assert_that!(sketch.length(), eq(32));
    assert_that!(sketch.size_in_bytes(), eq(256 * 4));
}

#[test]
fn test_count_is_monotonic() {
    let mut sketch = sketch(256);
    let mut previous = sketch.count();
    for i in 0..20_000u32 {
        sketch.add(&i);
        if i % 250 == 0 {
            let current = sketch.count();
            assert_that!(current, ge(previous));
            previous = current;
        }
    }
}

#[test]
fn test_duplicates_do_not_change_count() {
    let mut sketch = sketch(256);
    for i in 0..5_000u32 {
        sketch.add(&i);
    }
    let bitmaps = sketch.bitmaps().to_vec();
    let estimate = sketch.count();

    for i in 0..5_000u32 {
        sketch.add(&i);
    }
    assert_eq!(sketch.bitmaps(), bitmaps.as_slice());
    assert_that!(sketch.count(), eq(estimate));
}

#[test]
fn test_small_cardinality_uses_hit_counting() {
    let mut sketch = sketch(1024);
    for i in 0..1_000u32 {
        sketch.add(&i);
    }
    assert_that!(sketch.count(), near(1_000.0, 120.0));
}

#[test]
fn test_large_cardinality_estimate() {
    let mut sketch = sketch(1024);
    for i in 0..100_000u64 {
        sketch.add(&i);
    }
    assert_that!(sketch.count(), near(100_000.0, 10_000.0));
}

#[test]
fn test_string_entities() {
    let mut sketch = sketch(1024);
    for i in 0..20_000 {
        sketch.add(format!("user-{i}").as_str());
    }
    assert_that!(sketch.count(), near(20_000.0, 2_000.0));
}

#[test]
fn test_error_shrinks_with_more_bitmaps() {
    const N: u32 = 20_000;
    const TRIALS: u32 = 30;

    let rmse = |num_maps: u32| {
        let mut sum = 0.0;
        for seed in 0..TRIALS {
            let mut sketch = PcsaSketch::new(
                &PcsaConfig::default().with_num_maps(num_maps),
                MurmurHash3::with_seed(seed),
            )
            .unwrap();
            for i in 0..N {
                sketch.add(&i);
            }
            let relative = sketch.count() / N as f64 - 1.0;
            sum += relative * relative;
        }
        (sum / TRIALS as f64).sqrt()
    };

    let coarse = rmse(16);
    let fine = rmse(1024);
    assert_that!(fine, lt(coarse));
    // standard error is about 0.78 / sqrt(num_maps)
    assert_that!(fine, lt(2.0 * 0.78 / 32.0));
}

#[test]
fn test_seed_equal_to_key_length() {
    // murmur3 with seed 8 over 8-byte keys has a degenerate low output half
    let config = PcsaConfig::default().with_num_maps(1024);
    let mut sketch = PcsaSketch::new(&config, MurmurHash3::with_seed(8)).unwrap();
    for i in 0..100_000u64 {
        sketch.add(&i);
    }
    assert!(sketch.bitmaps().iter().all(|&bitmap| bitmap != 0));
    assert_that!(sketch.count(), near(100_000.0, 10_000.0));
}

#[test]
fn test_perturbed_estimate() {
    let config = PcsaConfig::default()
        .with_num_maps(1024)
        .with_perturbation(0.1);
    let mut rng = StdRng::seed_from_u64(7);
    let mut sketch = PcsaSketch::with_rng(&config, MurmurHash3::default(), &mut rng).unwrap();
    assert!(!sketch.is_empty());
    assert_that!(sketch.perturbation(), eq(0.1));

    for i in 0..100_000u32 {
        sketch.add(&i);
    }
    assert_that!(sketch.count(), near(100_000.0, 15_000.0));
}

#[test]
fn test_invalid_config() {
    let cases = [
        PcsaConfig::default().with_num_maps(0),
        PcsaConfig::default().with_num_maps(MAX_NUM_MAPS + 1),
        PcsaConfig::default().with_length(0),
        PcsaConfig::default().with_length(65),
        PcsaConfig::default().with_perturbation(-0.1),
        PcsaConfig::default().with_perturbation(1.5),
        PcsaConfig::default().with_perturbation(f64::NAN),
    ];
    for config in cases {
        let err = PcsaSketch::new(&config, MurmurHash3::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid, "{config:?}");
    }

    let err = PcsaSketch::new(
        &PcsaConfig::default().with_length(65),
        MurmurHash3::default(),
    )
    .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"ConfigInvalid => length must be in [1, 64], got 65");
}

#[test]
fn test_length_one_saturates() {
    let config = PcsaConfig::default().with_num_maps(4).with_length(1);
    let mut sketch = PcsaSketch::new(&config, MurmurHash3::default()).unwrap();
    for i in 0..1_000u32 {
        sketch.add(&i);
    }
    assert!(sketch.bitmaps().iter().all(|&bitmap| bitmap == 1));
    // every bitmap is full: 4 * 2^1 / phi
    assert_that!(sketch.count(), near(4.0 * 2.0 / 0.773519, 1e-9));
}
