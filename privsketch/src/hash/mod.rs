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

//! Hash functions feeding the sketches.
//!
//! A sketch only needs `hash(key) -> u64` with well distributed output bits, so the
//! capability is a small trait. [`MurmurHash3`] is the default implementation.

use std::hash::Hash;

/// The seed used by [`MurmurHash3::default`].
pub const DEFAULT_UPDATE_SEED: u32 = 9001;

/// Key hashed by [`HashFunction::fingerprint`]. Any fixed value works; it only has to be
/// the same on the serializing and the deserializing side.
const FINGERPRINT_KEY: u64 = 0x9e37_79b9_7f4a_7c15;

/// A pure hash of arbitrary keys into 64 bits.
///
/// Implementations must not keep mutable state between calls: the same key always hashes
/// to the same value for a given hash function value.
pub trait HashFunction {
    /// Returns the hash of `key`.
    fn hash<T: Hash + ?Sized>(&self, key: &T) -> u64;

    /// Returns a 16-bit fingerprint identifying this hash configuration.
    ///
    /// Stored alongside serialized sketches so that bytes produced with one seed are not
    /// silently read back with another.
    fn fingerprint(&self) -> u16 {
        (self.hash(&FINGERPRINT_KEY) & 0xffff) as u16
    }
}

/// Seeded 128-bit MurmurHash3 (x64 variant), reduced to the high 64 bits of its output.
///
/// The low half is always even when the seed equals the byte length of the key, so only
/// the high half is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MurmurHash3 {
    seed: u32,
}

impl Default for MurmurHash3 {
    fn default() -> Self {
        Self::with_seed(DEFAULT_UPDATE_SEED)
    }
}

impl MurmurHash3 {
    /// Creates a hash function with the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Returns the seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl HashFunction for MurmurHash3 {
    fn hash<T: Hash + ?Sized>(&self, key: &T) -> u64 {
        let mut hasher = mur3::Hasher128::with_seed(self.seed);
        key.hash(&mut hasher);
        let (_, hi) = hasher.finish128();
        hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murmurhash3_reference_vectors() {
        // remainder > 8
        let key = "The quick brown fox jumps over the lazy dog";
        let (h1, h2) = mur3::murmurhash3_x64_128(key.as_bytes(), 0);
        assert_eq!(h1, 0xe34bbc7bbc071b6c);
        assert_eq!(h2, 0x7a433ca9c49a9347);

        // test a remainder = 0
        let key = "The quick brown fox jumps over t";
        let (h1, h2) = mur3::murmurhash3_x64_128(key.as_bytes(), 0);
        assert_eq!(h1, 0xdf6af91bb29bdacf);
        assert_eq!(h2, 0x91a341c58df1f3a6);
    }

    #[test]
    fn test_hash_is_pure() {
        let hash = MurmurHash3::default();
        assert_eq!(hash.hash("entity-42"), hash.hash("entity-42"));
        assert_eq!(hash.hash(&42u64), hash.hash(&42u64));
        assert_ne!(hash.hash("entity-42"), hash.hash("entity-43"));
    }

    #[test]
    fn test_seed_equal_to_key_length_keeps_low_bit() {
        // the low output half of murmur3 is always even for these seed and key pairs
        let hash = MurmurHash3::with_seed(8);
        let odd = (0..4_096u64).filter(|key| hash.hash(key) & 1 == 1).count();
        assert!((1_700..=2_400).contains(&odd), "odd hashes: {odd}");

        let hash = MurmurHash3::with_seed(4);
        let odd = (0..4_096u32).filter(|key| hash.hash(key) & 1 == 1).count();
        assert!((1_700..=2_400).contains(&odd), "odd hashes: {odd}");
    }

    #[test]
    fn test_seed_changes_hash_and_fingerprint() {
        let a = MurmurHash3::with_seed(1);
        let b = MurmurHash3::with_seed(2);
        assert_ne!(a.hash("x"), b.hash("x"));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), MurmurHash3::with_seed(1).fingerprint());
        assert_eq!(MurmurHash3::default().seed(), DEFAULT_UPDATE_SEED);
    }
}
