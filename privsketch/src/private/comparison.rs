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

use std::fmt;

/// Real and estimated cardinality of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison<C> {
    pub category: C,
    /// Caller supplied ground truth; 0 if the caller did not supply one.
    pub real: u64,
    /// Debiased estimate.
    pub estimated: f64,
}

impl<C> Comparison<C> {
    /// Returns `(estimated - real) / real`, or `None` when the real count is 0.
    pub fn relative_error(&self) -> Option<f64> {
        if self.real == 0 {
            return None;
        }
        let real = self.real as f64;
        Some((self.estimated - real) / real)
    }
}

impl<C: fmt::Display> fmt::Display for Comparison<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:.0}", self.category, self.real, self.estimated)
    }
}
