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

//! Bloom filter screening over a fixed label vocabulary.
//!
//! Each label is mapped to `k` bit positions of a `W` bit vector, one position per hash round.
//! A record's filter is the union of the positions of all its labels, stored as an unsigned
//! integer. A query label possibly belongs to a record when all of its bits are set in the
//! record's filter, and certainly does not belong otherwise.
//!
//! # Properties
//!
//! - **No false negatives**: a label coalesced into a filter always matches it
//! - **Possible false positives**: with `n` labels in a filter the rate is about
//!   `(1 - e^(-k * n / W))^k`, see [`SieveConfig::false_positive_rate`]
//! - **Fixed size**: `W` and `k` are fixed by the [`SieveConfig`] for its vocabulary
//! - **Insert only**: bits are never cleared
//!
//! # Usage
//!
//! ```rust
//! use bloomsift::sieve::BitFilter;
//! use bloomsift::sieve::Matcher;
//! use bloomsift::sieve::SieveConfig;
//! use bloomsift::sieve::Signature;
//!
//! // 64 bits, the ten words "zero" to "nine", k = floor(64 / 10 * ln 2) = 4
//! let config = SieveConfig::default();
//!
//! // Build a record filter from its labels
//! let signatures = ["zero", "one"]
//!     .iter()
//!     .map(|label| Signature::compute(&config, label))
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! let record = BitFilter::coalesce(&config, &signatures).encode();
//!
//! // Screen queries against it
//! let matcher = Matcher::new(&config);
//! assert!(matcher.matches("zero", &record).unwrap());
//! println!("stored as {record}");
//! ```
//!
//! # Configurations
//!
//! ```rust
//! # use bloomsift::sieve::SieveConfigBuilder;
//! let config = SieveConfigBuilder::new(["red", "green", "blue", "cyan"])
//!     .num_bytes(2) // W = 16
//!     .seeds([101, 103, 107, 109, 113])
//!     .build()
//!     .unwrap();
//! assert_eq!(config.num_hashes(), 2); // floor(16 / 4 * ln 2)
//! ```

mod config;
mod encode;
mod filter;
mod matcher;
mod signature;

pub use self::config::SieveConfig;
pub use self::config::SieveConfigBuilder;
pub use self::config::BITS_PER_BYTE;
pub use self::config::DEFAULT_NUM_BYTES;
pub use self::config::DEFAULT_SEEDS;
pub use self::config::DEFAULT_VOCABULARY;
pub use self::encode::EncodedFilter;
pub use self::filter::BitFilter;
pub use self::matcher::Matcher;
pub use self::signature::Signature;
