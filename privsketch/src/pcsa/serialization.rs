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

//! Binary layout of a PCSA sketch.
//!
//! ```text
//! byte 0      preamble longs (3)
//! byte 1      serial version (1)
//! byte 2      family id (PCSA)
//! byte 3      flags (bit 0: empty)
//! byte 4      bitmap length in bits
//! byte 5      unused
//! bytes 6-7   hash fingerprint
//! bytes 8-11  number of bitmaps
//! bytes 12-15 unused
//! bytes 16-23 perturbation (f64)
//! then one u64 per bitmap, omitted when the sketch is empty
//! ```
//!
//! All values are little endian.

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::family::Family;
use crate::error::Error;
use crate::hash::HashFunction;
use crate::pcsa::PcsaConfig;
use crate::pcsa::PcsaSketch;

const SERIAL_VERSION: u8 = 1;
const FLAGS_IS_EMPTY: u8 = 1 << 0;
const LONG_SIZE_BYTES: usize = 8;

impl<H: HashFunction> PcsaSketch<H> {
    /// Serializes the sketch into bytes.
    ///
    /// The hash function itself is not stored, only its fingerprint; pass an equal hash
    /// function to [`deserialize`](Self::deserialize).
    pub fn serialize(&self) -> Vec<u8> {
        let empty = self.is_empty();
        let mut size = Family::PCSA.pre_longs as usize * LONG_SIZE_BYTES;
        if !empty {
            size += self.bitmaps().len() * LONG_SIZE_BYTES;
        }

        let mut bytes = SketchBytes::with_capacity(size);
        bytes.write_u8(Family::PCSA.pre_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(Family::PCSA.id);
        bytes.write_u8(if empty { FLAGS_IS_EMPTY } else { 0 });
        bytes.write_u8(self.length());
        bytes.write_u8(0);
        bytes.write_u16_le(self.hasher().fingerprint());
        bytes.write_u32_le(self.num_maps());
        bytes.write_u32_le(0);
        bytes.write_f64_le(self.perturbation());

        if !empty {
            for &bitmap in self.bitmaps() {
                bytes.write_u64_le(bitmap);
            }
        }
        bytes.into_bytes()
    }

    /// Deserializes a sketch produced by [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MalformedDeserializeData`](crate::error::ErrorKind::MalformedDeserializeData)
    /// if the bytes are truncated or corrupt, or were written with a different hash
    /// function.
    pub fn deserialize(bytes: &[u8], hasher: H) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |err| Error::insufficient_data(tag).set_source(err)
        }

        let mut cursor = SketchSlice::new(bytes);
        let pre_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let length = cursor.read_u8().map_err(make_error("length"))?;
        cursor.read_u8().map_err(make_error("unused"))?;
        let fingerprint = cursor.read_u16_le().map_err(make_error("fingerprint"))?;
        let num_maps = cursor.read_u32_le().map_err(make_error("num_maps"))?;
        cursor.read_u32_le().map_err(make_error("unused"))?;
        let perturbation = cursor.read_f64_le().map_err(make_error("perturbation"))?;

        Family::PCSA.validate_id(family_id)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::deserial(format!(
                "unsupported serial version: expected {SERIAL_VERSION}, got {serial_version}"
            )));
        }
        Family::PCSA.validate_pre_longs(pre_longs)?;

        let expected = hasher.fingerprint();
        if fingerprint != expected {
            return Err(Error::deserial(format!(
                "incompatible seed hash: expected {expected}, got {fingerprint}"
            )));
        }

        let config = PcsaConfig::default()
            .with_num_maps(num_maps)
            .with_length(length)
            .with_perturbation(perturbation);
        config
            .validate()
            .map_err(|err| Error::deserial("invalid sketch config").set_source(err))?;

        let empty = flags & FLAGS_IS_EMPTY != 0;
        if !empty && cursor.remaining() < num_maps as usize * LONG_SIZE_BYTES {
            return Err(Error::insufficient_data("bitmaps")
                .with_context("num_maps", num_maps)
                .with_context("remaining", cursor.remaining()));
        }

        let mut bitmaps = vec![0u64; num_maps as usize];
        if !empty {
            for bitmap in bitmaps.iter_mut() {
                *bitmap = cursor.read_u64_le().map_err(make_error("bitmap"))?;
                if length < 64 && *bitmap >> length != 0 {
                    return Err(Error::deserial(format!(
                        "bitmap has bits set beyond length {length}"
                    )));
                }
            }
        }

        PcsaSketch::from_raw_parts(&config, hasher, bitmaps)
    }
}
