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

//! Differentially private per-category distinct counting.
//!
//! [`PrivateSketch`] owns one sketch per category and a randomized-response mechanism.
//! Every observation `(entity, category)` is first randomized to a report category and
//! only then inserted into that category's sketch, so no sketch ever holds a reliable
//! record of an entity's true category. Estimates are debiased on the way out.
//!
//! # Usage
//!
//! ```rust
//! use privsketch::hash::MurmurHash3;
//! use privsketch::pcsa::{PcsaConfig, PcsaSketch};
//! use privsketch::private::PrivateSketch;
//! use privsketch::rr::GeneralizedRandomizedResponse;
//!
//! let mut sketch: PrivateSketch<&str, PcsaSketch, GeneralizedRandomizedResponse> =
//!     PrivateSketch::new(
//!         5.0,
//!         vec!["a", "b"],
//!         &PcsaConfig::default().with_num_maps(1024),
//!         MurmurHash3::default(),
//!     )
//!     .unwrap();
//!
//! for id in 0..1_000u32 {
//!     sketch.count_dp(&id, &"a").unwrap();
//! }
//! let estimate = sketch.get_estimated_cardinality(&"a").unwrap();
//! assert!((estimate - 1_000.0).abs() < 200.0);
//! ```

mod comparison;
mod sketch;

pub use self::comparison::Comparison;
pub use self::sketch::PrivateSketch;
