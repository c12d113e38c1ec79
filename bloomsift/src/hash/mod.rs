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

//! The hash oracle: a deterministic, seeded hash from labels to `u32` values.
//!
//! Every bit position a filter ever sets comes from [`hash_label`]. The function must give the
//! same answer for the same `(label, seed)` pair in every process on every platform, otherwise
//! filters written by one run would not match queries signed by another. MurmurHash3 (x86,
//! 32-bit) over the raw UTF-8 bytes of the label meets that bar and is what existing record
//! stores were written with.

mod murmurhash;

pub use self::murmurhash::MurmurHash3X86_32;

/// Hashes `label` with the hash function selected by `seed`.
///
/// Distinct seeds behave as independent hash functions over the same label.
///
/// # Examples
///
/// ```
/// # use bloomsift::hash::hash_label;
/// assert_eq!(hash_label("zero", 2), hash_label("zero", 2));
/// assert_ne!(hash_label("zero", 2), hash_label("zero", 3));
/// ```
pub fn hash_label(label: &str, seed: u32) -> u32 {
    let mut hasher = MurmurHash3X86_32::with_seed(seed);
    hasher.write_bytes(label.as_bytes());
    hasher.finish32()
}
