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

//! # privsketch
//!
//! Differentially private distinct counting per category.
//!
//! An analyst wants to know how many distinct entities fall into each of a fixed set of
//! categories without any data structure recording which category an entity truly
//! belongs to. This crate combines two building blocks:
//!
//! * [`pcsa`]: Probabilistic Counting with Stochastic Averaging, a mergeable sketch that
//!   estimates the number of distinct items inserted into it.
//! * [`rr`]: randomized-response mechanisms that replace a true category by a random
//!   report category with calibrated probabilities, satisfying `epsilon`-local
//!   differential privacy.
//!
//! [`private::PrivateSketch`] ties them together: it keeps one sketch per category,
//! randomizes each observation before inserting it and debiases estimates on the way out.
//!
//! Errors from every fallible operation are reported as [`error::Error`].

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod hash;
pub mod pcsa;
pub mod private;
pub mod rr;
pub mod sketch;

pub(crate) mod codec;
