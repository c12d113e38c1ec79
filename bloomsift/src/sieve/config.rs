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

use std::collections::HashSet;

use tracing::debug;

use crate::error::Error;
use crate::sieve::BitFilter;
use crate::sieve::EncodedFilter;

/// Number of bits per byte of filter budget.
pub const BITS_PER_BYTE: u64 = 8;
/// Byte budget of the default configuration, i.e. a 64 bit filter.
pub const DEFAULT_NUM_BYTES: u64 = 8;
/// Vocabulary of the default configuration.
pub const DEFAULT_VOCABULARY: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];
/// Seed table of the default configuration.
///
/// Slot 0 is reserved: hash round `i` (counting from 1) uses `DEFAULT_SEEDS[i]`.
pub const DEFAULT_SEEDS: [u32; 11] = [1, 2, 3, 5, 7, 11, 13, 17, 19, 23, 27];

pub(crate) const MIN_NUM_BITS: u64 = 1;
pub(crate) const MAX_NUM_BITS: u64 = 1 << 32;
pub(crate) const MIN_NUM_HASHES: u16 = 1;

/// Immutable parameters shared by every filter operation.
///
/// A configuration fixes the vocabulary, the seed table, the filter width `W` and the number of
/// hash rounds `k`. Filters built under one configuration are only meaningful when compared
/// under the same configuration.
///
/// Use [`SieveConfigBuilder`] to construct instances, or [`SieveConfig::default`] for the
/// ten-word, 64 bit setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SieveConfig {
    vocabulary: Vec<String>,
    seeds: Vec<u32>,
    num_bits: u64,
    num_hashes: u16,
}

impl SieveConfig {
    /// Returns the vocabulary in insertion order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Returns the number of labels in the vocabulary (`V`).
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Returns the full seed table, including the reserved slot 0.
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Returns the seeds of hash rounds `1..=k`, in round order.
    pub fn round_seeds(&self) -> &[u32] {
        &self.seeds[1..=self.num_hashes as usize]
    }

    /// Returns the filter width in bits (`W`).
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Returns the number of hash rounds per label (`k`).
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns whether `label` belongs to the vocabulary.
    pub fn contains_label(&self, label: &str) -> bool {
        self.vocabulary.iter().any(|l| l == label)
    }

    /// Analytic false positive probability of a filter holding `num_items` distinct labels.
    ///
    /// Formula: `(1 - e^(-k * n / W))^k`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::SieveConfig;
    /// let config = SieveConfig::default();
    /// assert_eq!(config.false_positive_rate(0), 0.0);
    /// assert!(config.false_positive_rate(2) < config.false_positive_rate(9));
    /// ```
    pub fn false_positive_rate(&self, num_items: usize) -> f64 {
        let k = f64::from(self.num_hashes);
        let n = num_items as f64;
        let m = self.num_bits as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Creates an all-zero filter of this configuration's width.
    pub fn empty_filter(&self) -> BitFilter {
        BitFilter::new(self.num_bits, self.num_hashes)
    }

    /// Decodes a stored integer back into the bit vector it was encoded from.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow) if
    /// `filter` needs more than `W` bits.
    pub fn decode(&self, filter: &EncodedFilter) -> Result<BitFilter, Error> {
        BitFilter::decode(self.num_bits, self.num_hashes, filter)
    }
}

impl Default for SieveConfig {
    fn default() -> Self {
        let num_bits = DEFAULT_NUM_BYTES * BITS_PER_BYTE;
        SieveConfig {
            vocabulary: DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            seeds: DEFAULT_SEEDS.to_vec(),
            num_bits,
            num_hashes: SieveConfigBuilder::suggest_num_hashes(
                num_bits,
                DEFAULT_VOCABULARY.len(),
            ),
        }
    }
}

/// Builder for creating [`SieveConfig`] instances.
///
/// The width defaults to [`DEFAULT_NUM_BYTES`] bytes and the seed table to [`DEFAULT_SEEDS`].
/// Unless set explicitly, the number of hash rounds is derived from the width and the
/// vocabulary size with [`suggest_num_hashes()`](Self::suggest_num_hashes).
#[derive(Debug, Clone)]
pub struct SieveConfigBuilder {
    vocabulary: Vec<String>,
    seeds: Vec<u32>,
    num_bits: u64,
    num_hashes: Option<u16>,
}

impl SieveConfigBuilder {
    /// Creates a builder over an ordered vocabulary.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::SieveConfigBuilder;
    /// let config = SieveConfigBuilder::new(["red", "green", "blue"])
    ///     .num_bytes(4)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.num_bits(), 32);
    /// assert_eq!(config.num_hashes(), 7);
    /// ```
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SieveConfigBuilder {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            seeds: DEFAULT_SEEDS.to_vec(),
            num_bits: DEFAULT_NUM_BYTES * BITS_PER_BYTE,
            num_hashes: None,
        }
    }

    /// Replaces the seed table.
    ///
    /// Seeds must be distinct. Slot 0 is reserved; round `i` uses `seeds[i]`.
    pub fn seeds<I>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.seeds = seeds.into_iter().collect();
        self
    }

    /// Sets the width from a byte budget: `W = num_bytes * 8`.
    pub fn num_bytes(mut self, num_bytes: u64) -> Self {
        self.num_bits = num_bytes.saturating_mul(BITS_PER_BYTE);
        self
    }

    /// Sets the width in bits directly.
    pub fn num_bits(mut self, num_bits: u64) -> Self {
        self.num_bits = num_bits;
        self
    }

    /// Overrides the derived number of hash rounds.
    pub fn num_hashes(mut self, num_hashes: u16) -> Self {
        self.num_hashes = Some(num_hashes);
        self
    }

    /// Validates the parameters and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfig`](crate::error::ErrorKind::InvalidConfig) if:
    /// - the vocabulary is empty or holds a label twice, or holds an empty label
    /// - the width is outside `[MIN_NUM_BITS, MAX_NUM_BITS]`
    /// - the seed table repeats a seed or has fewer entries than the vocabulary
    /// - fewer than one hash round results, e.g. the width is too small for the vocabulary
    /// - the seed table has no seed for some hash round
    pub fn build(self) -> Result<SieveConfig, Error> {
        let vocabulary_size = self.vocabulary.len();
        if vocabulary_size == 0 {
            return Err(Error::invalid_config("vocabulary must not be empty"));
        }
        let mut labels = HashSet::with_capacity(vocabulary_size);
        for label in &self.vocabulary {
            if label.is_empty() {
                return Err(Error::invalid_config("vocabulary labels must not be empty"));
            }
            if !labels.insert(label.as_str()) {
                return Err(Error::invalid_config("vocabulary labels must be distinct")
                    .with_context("label", label));
            }
        }

        if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&self.num_bits) {
            return Err(Error::invalid_config(format!(
                "num_bits must be between {MIN_NUM_BITS} and {MAX_NUM_BITS}"
            ))
            .with_context("num_bits", self.num_bits));
        }

        let mut seeds = HashSet::with_capacity(self.seeds.len());
        for seed in &self.seeds {
            if !seeds.insert(*seed) {
                return Err(
                    Error::invalid_config("seeds must be distinct").with_context("seed", seed)
                );
            }
        }
        if self.seeds.len() < vocabulary_size {
            return Err(Error::invalid_config(format!(
                "need at least {vocabulary_size} seeds, got {}",
                self.seeds.len()
            )));
        }

        let num_hashes = self
            .num_hashes
            .unwrap_or_else(|| Self::suggest_num_hashes(self.num_bits, vocabulary_size));
        if num_hashes < MIN_NUM_HASHES {
            return Err(Error::invalid_config(format!(
                "need at least {MIN_NUM_HASHES} hash round, filter is too narrow for the vocabulary"
            ))
            .with_context("num_bits", self.num_bits)
            .with_context("vocabulary_size", vocabulary_size));
        }
        if self.seeds.len() <= num_hashes as usize {
            return Err(Error::invalid_config(format!(
                "{num_hashes} hash rounds need {} seeds, got {}",
                num_hashes as usize + 1,
                self.seeds.len()
            )));
        }

        debug!(
            num_bits = self.num_bits,
            num_hashes, vocabulary_size, "built sieve configuration"
        );

        Ok(SieveConfig {
            vocabulary: self.vocabulary,
            seeds: self.seeds,
            num_bits: self.num_bits,
            num_hashes,
        })
    }

    /// Suggests the number of hash rounds for a width and vocabulary size.
    ///
    /// Formula: `k = floor((m / n) * ln(2))`
    /// where m = num_bits, n = vocabulary_size. An empty vocabulary yields 0.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::SieveConfigBuilder;
    /// assert_eq!(SieveConfigBuilder::suggest_num_hashes(64, 10), 4); // 4.43
    /// assert_eq!(SieveConfigBuilder::suggest_num_hashes(8, 10), 0); // 0.55
    /// ```
    pub fn suggest_num_hashes(num_bits: u64, vocabulary_size: usize) -> u16 {
        if vocabulary_size == 0 {
            return 0;
        }
        let m = num_bits as f64;
        let n = vocabulary_size as f64;

        // Floor, not ceil: stored filters depend on the exact k.
        let k = (m / n * std::f64::consts::LN_2).floor();
        k.clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = SieveConfig::default();
        assert_eq!(config.num_bits(), 64);
        assert_eq!(config.num_hashes(), 4);
        assert_eq!(config.vocabulary_size(), 10);
        assert_eq!(config.round_seeds(), &[2, 3, 5, 7]);
        assert!(config.contains_label("nine"));
        assert!(!config.contains_label("ten"));
    }

    #[test]
    fn test_builder_matches_default() {
        let built = SieveConfigBuilder::new(DEFAULT_VOCABULARY)
            .num_bytes(DEFAULT_NUM_BYTES)
            .build()
            .unwrap();
        assert_eq!(built, SieveConfig::default());
    }

    #[test]
    fn test_explicit_num_hashes() {
        let config = SieveConfigBuilder::new(DEFAULT_VOCABULARY)
            .num_hashes(10)
            .build()
            .unwrap();
        assert_eq!(config.num_hashes(), 10);
        assert_eq!(config.round_seeds().len(), 10);
    }

    #[test]
    fn test_too_narrow_for_vocabulary() {
        let err = SieveConfigBuilder::new(DEFAULT_VOCABULARY)
            .num_bytes(1)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.context("num_bits"), Some("8"));
    }

    #[test]
    fn test_too_few_seeds() {
        let err = SieveConfigBuilder::new(DEFAULT_VOCABULARY)
            .seeds([1, 2, 3])
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.message(), "need at least 10 seeds, got 3");
    }

    #[test]
    fn test_duplicate_seeds() {
        let err = SieveConfigBuilder::new(["a", "b"])
            .seeds([1, 2, 2, 5])
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.context("seed"), Some("2"));
    }

    #[test]
    fn test_seed_table_shorter_than_rounds() {
        // two labels over 64 bits derive k = 22, far more than the seed table holds
        let err = SieveConfigBuilder::new(["a", "b"]).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.message(), "22 hash rounds need 23 seeds, got 11");
    }

    #[test]
    fn test_invalid_vocabulary() {
        let empty: [&str; 0] = [];
        let err = SieveConfigBuilder::new(empty).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = SieveConfigBuilder::new(["a", "b", "a"]).build().unwrap_err();
        assert_eq!(err.context("label"), Some("a"));

        let err = SieveConfigBuilder::new(["a", ""]).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_zero_width() {
        let err = SieveConfigBuilder::new(["a"]).num_bits(0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_suggest_num_hashes() {
        assert_eq!(SieveConfigBuilder::suggest_num_hashes(64, 10), 4);
        assert_eq!(SieveConfigBuilder::suggest_num_hashes(128, 10), 8);
        assert_eq!(SieveConfigBuilder::suggest_num_hashes(32, 3), 7);
        assert_eq!(SieveConfigBuilder::suggest_num_hashes(8, 10), 0);
        assert_eq!(SieveConfigBuilder::suggest_num_hashes(64, 0), 0);
    }

    #[test]
    fn test_false_positive_rate() {
        let config = SieveConfig::default();
        assert_eq!(config.false_positive_rate(0), 0.0);
        // (1 - e^(-4 * 10 / 64))^4
        let expected = (1.0 - (-40.0f64 / 64.0).exp()).powi(4);
        assert!((config.false_positive_rate(10) - expected).abs() < 1e-12);
    }
}
