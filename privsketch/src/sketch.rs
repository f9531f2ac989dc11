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

//! Capabilities a distinct-counting sketch plugs into [`PrivateSketch`] with.
//!
//! [`PrivateSketch`]: crate::private::PrivateSketch

use std::hash::Hash;

use crate::error::Error;
use crate::hash::HashFunction;

/// A probabilistic distinct counter.
pub trait Sketch: Sized {
    /// Parameters shared by every sketch of one [`PrivateSketch`](crate::private::PrivateSketch).
    type Config;
    /// The hash function the sketch is keyed with.
    type Hasher: HashFunction;

    /// Builds an empty sketch.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `config` is out of range.
    fn new(config: &Self::Config, hasher: Self::Hasher) -> Result<Self, Error>;

    /// Inserts an entity. Inserting the same entity again has no effect.
    fn add<T: Hash + ?Sized>(&mut self, entity: &T);

    /// Returns the estimated number of distinct entities inserted so far.
    fn count(&self) -> f64;
}

/// A sketch whose state can be combined into the sketch of the union of the inputs.
pub trait MergeableSketch: Sketch {
    /// Returns a new sketch estimating the cardinality of the union of `sketches`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `sketches` is empty or the sketches are not compatible.
    fn union(sketches: &[&Self]) -> Result<Self, Error>;
}
