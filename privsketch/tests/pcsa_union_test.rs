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
use googletest::prelude::contains_substring;
use googletest::prelude::eq;
use googletest::prelude::near;
use privsketch::error::ErrorKind;
use privsketch::hash::MurmurHash3;
use privsketch::pcsa::PcsaConfig;
use privsketch::pcsa::PcsaSketch;
use privsketch::pcsa::correction_factor;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn sketch_of(range: std::ops::Range<u64>) -> PcsaSketch {
    let config = PcsaConfig::default().with_num_maps(1024);
    let mut sketch = PcsaSketch::new(&config, MurmurHash3::default()).unwrap();
    for i in range {
        sketch.add(&i);
    }
    sketch
}

#[test]
fn test_union_equals_sketch_of_all_entities() {
    let left = sketch_of(0..50_000);
    let right = sketch_of(50_000..100_000);
    let all = sketch_of(0..100_000);

    let union = PcsaSketch::union(&[&left, &right]).unwrap();
    assert_eq!(union, all);
    assert_that!(union.count(), near(100_000.0, 10_000.0));
}

#[test]
fn test_union_of_overlapping_sketches() {
    let left = sketch_of(0..30_000);
    let right = sketch_of(20_000..50_000);

    let union = PcsaSketch::union(&[&left, &right]).unwrap();
    assert_eq!(union, sketch_of(0..50_000));
    assert_that!(union.count(), near(50_000.0, 5_000.0));
}

#[test]
fn test_union_laws() {
    let a = sketch_of(0..10_000);
    let b = sketch_of(5_000..20_000);
    let c = sketch_of(40_000..45_000);

    // idempotent
    assert_eq!(PcsaSketch::union(&[&a, &a]).unwrap(), a);
    // commutative
    assert_eq!(
        PcsaSketch::union(&[&a, &b]).unwrap(),
        PcsaSketch::union(&[&b, &a]).unwrap()
    );
    // associative
    let ab = PcsaSketch::union(&[&a, &b]).unwrap();
    let bc = PcsaSketch::union(&[&b, &c]).unwrap();
    assert_eq!(
        PcsaSketch::union(&[&ab, &c]).unwrap(),
        PcsaSketch::union(&[&a, &bc]).unwrap()
    );
    assert_eq!(
        PcsaSketch::union(&[&a, &b, &c]).unwrap(),
        PcsaSketch::union(&[&ab, &c]).unwrap()
    );
}

#[test]
fn test_union_of_single_sketch_is_a_copy() {
    let a = sketch_of(0..1_000);
    assert_eq!(PcsaSketch::union(&[&a]).unwrap(), a);
}

#[test]
fn test_merge_in_place() {
    let mut left = sketch_of(0..5_000);
    let right = sketch_of(5_000..10_000);
    left.merge(&right).unwrap();
    assert_eq!(left, sketch_of(0..10_000));
}

#[test]
fn test_union_takes_largest_perturbation() {
    let mut rng = StdRng::seed_from_u64(1);
    let config = PcsaConfig::default().with_num_maps(64);
    let plain = PcsaSketch::new(&config, MurmurHash3::default()).unwrap();
    let noisy = PcsaSketch::with_rng(
        &config.with_perturbation(0.25),
        MurmurHash3::default(),
        &mut rng,
    )
    .unwrap();

    for union in [
        PcsaSketch::union(&[&plain, &noisy]).unwrap(),
        PcsaSketch::union(&[&noisy, &plain]).unwrap(),
    ] {
        assert_that!(union.perturbation(), eq(0.25));
        assert_that!(union.correction_factor(), eq(correction_factor(0.25)));
        assert_eq!(union.bitmaps(), noisy.bitmaps());
    }
}

#[test]
fn test_union_rejects_empty_list() {
    let err = PcsaSketch::<MurmurHash3>::union(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[test]
fn test_union_rejects_different_shapes() {
    let a = PcsaSketch::new(
        &PcsaConfig::default().with_num_maps(64),
        MurmurHash3::default(),
    )
    .unwrap();
    let b = PcsaSketch::new(
        &PcsaConfig::default().with_num_maps(128),
        MurmurHash3::default(),
    )
    .unwrap();
    let err = PcsaSketch::union(&[&a, &b]).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"ConfigInvalid, context: { left: 64, right: 128 } => sketches have different values for num_maps"
    );

    let c = PcsaSketch::new(
        &PcsaConfig::default().with_num_maps(64).with_length(16),
        MurmurHash3::default(),
    )
    .unwrap();
    let err = PcsaSketch::union(&[&a, &c]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_that!(err.message(), contains_substring("length"));
}

#[test]
fn test_union_rejects_different_hash_functions() {
    let config = PcsaConfig::default().with_num_maps(64);
    let mut a = PcsaSketch::new(&config, MurmurHash3::with_seed(1)).unwrap();
    let b = PcsaSketch::new(&config, MurmurHash3::with_seed(2)).unwrap();
    a.add(&1u32);
    let before = a.clone();

    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_that!(err.message(), contains_substring("hash functions"));
    assert_eq!(a, before);
}
