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

use num_bigint::BigUint;

use crate::error::Error;
use crate::sieve::EncodedFilter;
use crate::sieve::SieveConfig;
use crate::sieve::Signature;

/// A fixed-width bit vector under construction.
///
/// Bit `i` of the vector is the `i`-th most significant bit of its [`EncodedFilter`]. Bits can
/// only be set, never cleared, so a filter only ever grows as signatures are coalesced into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFilter {
    /// Number of hash rounds of the configuration this filter was made under (k)
    num_hashes: u16,
    /// Total number of bits in the filter (W)
    num_bits: u64,
    /// Count of bits set to 1
    num_bits_set: u64,
    /// Bits packed into u64 words, bit `i` lives at `bit_array[i / 64] >> (i % 64)`
    bit_array: Vec<u64>,
}

impl BitFilter {
    pub(crate) fn new(num_bits: u64, num_hashes: u16) -> Self {
        let num_words = num_bits.div_ceil(64) as usize;
        BitFilter {
            num_hashes,
            num_bits,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words],
        }
    }

    /// Builds the filter of a single signature.
    ///
    /// # Panics
    ///
    /// Panics if a position of `signature` is not below the configuration's width. Use
    /// [`try_from_signature()`](Self::try_from_signature) for signatures of unknown origin.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::BitFilter;
    /// # use bloomsift::sieve::SieveConfig;
    /// # use bloomsift::sieve::Signature;
    /// let config = SieveConfig::default();
    /// let signature = Signature::from_positions(&config, [1, 3, 5]).unwrap();
    /// let filter = BitFilter::from_signature(&config, &signature);
    /// assert!(filter.get_bit(1) && filter.get_bit(3) && filter.get_bit(5));
    /// assert_eq!(filter.bits_used(), 3);
    /// ```
    pub fn from_signature(config: &SieveConfig, signature: &Signature) -> Self {
        let mut filter = config.empty_filter();
        filter.insert_signature(signature);
        filter
    }

    /// Builds the filter of a single signature, rejecting out-of-range positions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if a position
    /// of `signature` is not below the configuration's width, e.g. for a signature made under a
    /// wider configuration.
    pub fn try_from_signature(config: &SieveConfig, signature: &Signature) -> Result<Self, Error> {
        let mut filter = config.empty_filter();
        filter.try_insert_signature(signature)?;
        Ok(filter)
    }

    /// Unions any number of signatures into one filter.
    ///
    /// The result does not depend on the order of `signatures`. No signatures give the
    /// all-zero filter.
    ///
    /// # Panics
    ///
    /// Panics if a position of any signature is not below the configuration's width.
    pub fn coalesce<'a, I>(config: &SieveConfig, signatures: I) -> Self
    where
        I: IntoIterator<Item = &'a Signature>,
    {
        signatures
            .into_iter()
            .fold(config.empty_filter(), |mut filter, signature| {
                filter.insert_signature(signature);
                filter
            })
    }

    /// Signs every label and unions the signatures into one filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) on the first
    /// empty label.
    pub fn from_labels<I, S>(config: &SieveConfig, labels: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = config.empty_filter();
        for label in labels {
            filter.insert_label(config, label.as_ref())?;
        }
        Ok(filter)
    }

    /// Sets every bit named by `signature`.
    ///
    /// # Panics
    ///
    /// Panics if a position is not below [`num_bits()`](Self::num_bits). Use
    /// [`try_insert_signature()`](Self::try_insert_signature) to get an error instead.
    pub fn insert_signature(&mut self, signature: &Signature) {
        for position in signature.iter() {
            assert!(
                position < self.num_bits,
                "bit position {position} out of range for a {} bit filter",
                self.num_bits
            );
            self.set_bit(position);
        }
    }

    /// Sets every bit named by `signature`, or none if any position is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if a position
    /// is not below [`num_bits()`](Self::num_bits). The filter is left unchanged.
    pub fn try_insert_signature(&mut self, signature: &Signature) -> Result<(), Error> {
        if let Some(position) = signature.iter().find(|&p| p >= self.num_bits) {
            return Err(Error::invalid_input(format!(
                "bit position {position} out of range for a {} bit filter",
                self.num_bits
            ))
            .with_context("position", position));
        }
        for position in signature.iter() {
            self.set_bit(position);
        }
        Ok(())
    }

    /// Signs `label` and sets its bits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if `label` is
    /// empty.
    pub fn insert_label(&mut self, config: &SieveConfig, label: &str) -> Result<(), Error> {
        let signature = Signature::compute(config, label)?;
        self.insert_signature(&signature);
        Ok(())
    }

    /// Merges another filter into this one via bitwise OR.
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible (different width or hash rounds).
    /// Use [`is_compatible()`](Self::is_compatible) to check first.
    pub fn union(&mut self, other: &BitFilter) {
        assert!(
            self.is_compatible(other),
            "Cannot union incompatible filters"
        );

        let mut num_bits_set = 0;
        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
            num_bits_set += word.count_ones() as u64;
        }
        self.num_bits_set = num_bits_set;
    }

    /// Returns whether every bit of `signature` is set.
    ///
    /// Positions beyond the width are reported as unset.
    pub fn contains_signature(&self, signature: &Signature) -> bool {
        signature
            .iter()
            .all(|position| position < self.num_bits && self.get_bit(position))
    }

    /// Returns whether every bit set in `other` is also set in `self`.
    pub fn contains_filter(&self, other: &BitFilter) -> bool {
        self.is_compatible(other)
            && self
                .bit_array
                .iter()
                .zip(&other.bit_array)
                .all(|(word, other_word)| word & other_word == *other_word)
    }

    /// Checks if two filters can be merged: same width and same number of hash rounds.
    pub fn is_compatible(&self, other: &BitFilter) -> bool {
        self.num_bits == other.num_bits && self.num_hashes == other.num_hashes
    }

    /// Returns the value of bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`num_bits()`](Self::num_bits).
    pub fn get_bit(&self, index: u64) -> bool {
        assert!(index < self.num_bits, "bit index {index} out of range");
        let word_index = (index >> 6) as usize; // Equivalent to index / 64
        let mask = 1u64 << (index & 63);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Returns the indices of all set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.num_bits).filter(|&index| self.get_bit(index))
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the width in bits (W).
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Returns the number of hash rounds (k).
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the fraction of bits set.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.num_bits as f64
    }

    /// Estimates the false positive probability from the observed load: `load_factor^k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(i32::from(self.num_hashes))
    }

    /// Encodes the bit vector as an unsigned integer, bit 0 being the most significant bit.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::BitFilter;
    /// # use bloomsift::sieve::SieveConfigBuilder;
    /// # use bloomsift::sieve::Signature;
    /// let config = SieveConfigBuilder::new(["x"]).num_bits(3).num_hashes(1).build().unwrap();
    /// let signature = Signature::from_positions(&config, [0, 2]).unwrap();
    /// let filter = BitFilter::from_signature(&config, &signature);
    /// assert_eq!(filter.encode().to_string(), "5"); // 0b101
    /// ```
    pub fn encode(&self) -> EncodedFilter {
        let num_bytes = self.num_bits.div_ceil(8) as usize;
        let pad = num_bytes as u64 * 8 - self.num_bits;
        let mut bytes = vec![0u8; num_bytes];
        for index in self.iter_ones() {
            let pos = pad + index;
            bytes[(pos >> 3) as usize] |= 0x80 >> (pos & 7);
        }
        EncodedFilter::from(BigUint::from_bytes_be(&bytes))
    }

    /// Encodes into a `u64`, failing fast when the width exceeds 64 bits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow) if
    /// `W > 64`.
    pub fn to_u64(&self) -> Result<u64, Error> {
        if self.num_bits > 64 {
            return Err(Error::encoding_overflow(self.num_bits, 64));
        }
        Ok((0..self.num_bits).fold(0u64, |acc, index| (acc << 1) | u64::from(self.get_bit(index))))
    }

    /// Encodes into a `u128`, failing fast when the width exceeds 128 bits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow) if
    /// `W > 128`.
    pub fn to_u128(&self) -> Result<u128, Error> {
        if self.num_bits > 128 {
            return Err(Error::encoding_overflow(self.num_bits, 128));
        }
        Ok((0..self.num_bits).fold(0u128, |acc, index| {
            (acc << 1) | u128::from(self.get_bit(index))
        }))
    }

    /// Renders the vector as `W` binary digits, bit 0 first.
    pub fn to_bit_string(&self) -> String {
        (0..self.num_bits)
            .map(|index| if self.get_bit(index) { '1' } else { '0' })
            .collect()
    }

    pub(crate) fn decode(
        num_bits: u64,
        num_hashes: u16,
        filter: &EncodedFilter,
    ) -> Result<Self, Error> {
        let required = filter.bits();
        if required > num_bits {
            return Err(Error::encoding_overflow(required, num_bits));
        }

        let num_bytes = num_bits.div_ceil(8) as usize;
        let pad = num_bytes as u64 * 8 - num_bits;
        let digits = filter.value().to_bytes_be();
        let mut bytes = vec![0u8; num_bytes - digits.len()];
        bytes.extend_from_slice(&digits);

        let mut decoded = BitFilter::new(num_bits, num_hashes);
        for index in 0..num_bits {
            let pos = pad + index;
            if bytes[(pos >> 3) as usize] & (0x80 >> (pos & 7)) != 0 {
                decoded.set_bit(index);
            }
        }
        Ok(decoded)
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, index: u64) {
        let word_index = (index >> 6) as usize; // Equivalent to index / 64
        let mask = 1u64 << (index & 63);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sieve::SieveConfigBuilder;
    use crate::sieve::DEFAULT_VOCABULARY;

    fn narrow_config(num_bits: u64) -> SieveConfig {
        SieveConfigBuilder::new(["x"])
            .num_bits(num_bits)
            .num_hashes(1)
            .build()
            .unwrap()
    }

    fn filter_of(config: &SieveConfig, positions: &[u64]) -> BitFilter {
        let signature = Signature::from_positions(config, positions.iter().copied()).unwrap();
        BitFilter::from_signature(config, &signature)
    }

    #[test]
    fn test_build_from_signature() {
        let config = SieveConfig::default();
        let mut filter = filter_of(&config, &[1, 3, 5]);
        assert!(filter.get_bit(1));
        assert!(filter.get_bit(3));
        assert!(filter.get_bit(5));
        assert_eq!(filter.iter_ones().collect::<Vec<_>>(), vec![1, 3, 5]);

        filter.bit_array.fill(0);
        filter.num_bits_set = 0;
        assert!(filter.encode().is_zero());
    }

    #[test]
    fn test_duplicate_positions_are_idempotent() {
        let config = SieveConfig::default();
        let filter = filter_of(&config, &[7, 7, 7]);
        assert_eq!(filter.bits_used(), 1);
        assert_eq!(filter, filter_of(&config, &[7]));
    }

    #[test]
    fn test_bit_array_encoding() {
        let config = narrow_config(3);
        assert_eq!(filter_of(&config, &[]).to_u64().unwrap(), 0);
        assert_eq!(filter_of(&config, &[1]).to_u64().unwrap(), 2);
        assert_eq!(filter_of(&config, &[0, 2]).to_u64().unwrap(), 5);
        assert_eq!(filter_of(&config, &[0, 2]).encode().to_string(), "5");
        assert_eq!(filter_of(&config, &[0, 2]).to_bit_string(), "101");
    }

    #[test]
    fn test_msb_first_at_full_width() {
        let config = SieveConfig::default();
        assert_eq!(filter_of(&config, &[0]).to_u64().unwrap(), 1 << 63);
        assert_eq!(filter_of(&config, &[63]).to_u64().unwrap(), 1);
        assert_eq!(
            filter_of(&config, &[0, 63]).encode().to_string(),
            ((1u64 << 63) | 1).to_string()
        );
    }

    #[test]
    fn test_coalesce() {
        let config = SieveConfig::default();
        let a = Signature::from_positions(&config, [1]).unwrap();
        let b = Signature::from_positions(&config, [3, 5]).unwrap();
        let filter = BitFilter::coalesce(&config, [&a, &b]);
        assert_eq!(filter.iter_ones().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(filter, BitFilter::coalesce(&config, [&b, &a]));
        // inputs are borrowed, not consumed
        assert_eq!(a.positions(), &[1]);
    }

    #[test]
    fn test_coalesce_nothing() {
        let config = SieveConfig::default();
        let filter = BitFilter::coalesce(&config, std::iter::empty::<&Signature>());
        assert!(filter.is_empty());
        assert!(filter.encode().is_zero());
    }

    #[test]
    fn test_union() {
        let config = SieveConfig::default();
        let mut left = filter_of(&config, &[1, 2]);
        let right = filter_of(&config, &[2, 40]);
        left.union(&right);
        assert_eq!(left.iter_ones().collect::<Vec<_>>(), vec![1, 2, 40]);
        assert_eq!(left.bits_used(), 3);
        assert!(left.contains_filter(&right));
        assert!(!right.contains_filter(&left));
    }

    #[test]
    #[should_panic(expected = "Cannot union incompatible filters")]
    fn test_union_incompatible() {
        let mut left = SieveConfig::default().empty_filter();
        left.union(&narrow_config(3).empty_filter());
    }

    #[test]
    fn test_signature_from_wider_config_is_rejected() {
        let wide = narrow_config(128);
        let narrow = narrow_config(64);
        let signature = Signature::from_positions(&wide, [3, 100]).unwrap();

        let err = BitFilter::try_from_signature(&narrow, &signature).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.context("position"), Some("100"));

        let mut filter = narrow.empty_filter();
        assert!(filter.try_insert_signature(&signature).is_err());
        assert!(filter.is_empty());

        let fits = Signature::from_positions(&wide, [3, 63]).unwrap();
        let filter = BitFilter::try_from_signature(&narrow, &fits).unwrap();
        assert_eq!(filter.iter_ones().collect::<Vec<_>>(), vec![3, 63]);
    }

    #[test]
    fn test_insert_label() {
        let config = SieveConfig::default();
        let mut filter = config.empty_filter();
        filter.insert_label(&config, "zero").unwrap();
        let signature = Signature::compute(&config, "zero").unwrap();
        assert!(filter.contains_signature(&signature));
        assert_eq!(filter, BitFilter::from_signature(&config, &signature));

        let err = filter.insert_label(&config, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_labels() {
        let config = SieveConfig::default();
        let filter = BitFilter::from_labels(&config, ["zero", "one"]).unwrap();
        for label in ["zero", "one"] {
            let signature = Signature::compute(&config, label).unwrap();
            assert!(filter.contains_signature(&signature));
        }
        assert!(BitFilter::from_labels(&config, ["zero", ""]).is_err());
    }

    #[test]
    fn test_statistics() {
        let config = SieveConfig::default();
        let filter = filter_of(&config, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(filter.bits_used(), 8);
        assert_eq!(filter.load_factor(), 0.125);
        assert_eq!(filter.estimated_fpp(), 0.125f64.powi(4));
    }

    #[test]
    fn test_fixed_width_overflow() {
        let config = SieveConfigBuilder::new(DEFAULT_VOCABULARY)
            .num_bytes(16)
            .build()
            .unwrap();
        let filter = config.empty_filter();
        let err = filter.to_u64().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingOverflow);
        assert_eq!(filter.to_u128().unwrap(), 0);
    }

    #[test]
    fn test_decode_round_trip() {
        for num_bits in [1, 3, 8, 13, 64, 65, 200] {
            let config = narrow_config(num_bits);
            let positions: Vec<u64> = (0..num_bits).filter(|i| i % 3 != 1).collect();
            let filter = filter_of(&config, &positions);
            let decoded = config.decode(&filter.encode()).unwrap();
            assert_eq!(decoded, filter, "num_bits = {num_bits}");
        }
    }

    #[test]
    fn test_decode_overflow() {
        let config = narrow_config(3);
        let err = config.decode(&EncodedFilter::from(8u64)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingOverflow);
        assert!(config.decode(&EncodedFilter::from(7u64)).is_ok());
    }
}
