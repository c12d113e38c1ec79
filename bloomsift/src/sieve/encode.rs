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
use std::str::FromStr;

use num_bigint::BigUint;

use crate::error::Error;

/// The canonical integer form of a filter: the unit of storage and comparison.
///
/// The value is unbounded, so filters of any width encode without truncation. Two bit vectors
/// of the same width encode to the same value exactly when they are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EncodedFilter(BigUint);

impl EncodedFilter {
    /// Returns the encoding of the all-zero filter.
    pub fn zero() -> Self {
        EncodedFilter(BigUint::default())
    }

    /// Returns whether no bit is set.
    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Returns the minimum number of bits needed to hold the value.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Returns the underlying integer.
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// The approximate membership decision: every bit set in `query` is also set in `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::EncodedFilter;
    /// let record = EncodedFilter::from(0b1011u64);
    /// assert!(record.contains_bits(&EncodedFilter::from(0b0011u64)));
    /// assert!(!record.contains_bits(&EncodedFilter::from(0b0100u64)));
    /// assert!(record.contains_bits(&EncodedFilter::zero()));
    /// ```
    pub fn contains_bits(&self, query: &EncodedFilter) -> bool {
        (&self.0 & &query.0) == query.0
    }

    /// Renders the value as exactly `num_bits` binary digits, most significant first.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow) if
    /// the value needs more than `num_bits` bits.
    pub fn to_binary_string(&self, num_bits: u64) -> Result<String, Error> {
        let required = self.bits();
        if required > num_bits {
            return Err(Error::encoding_overflow(required, num_bits));
        }
        let digits = if self.is_zero() {
            String::new()
        } else {
            self.0.to_str_radix(2)
        };
        Ok(format!("{digits:0>width$}", width = num_bits as usize))
    }
}

impl From<BigUint> for EncodedFilter {
    fn from(value: BigUint) -> Self {
        EncodedFilter(value)
    }
}

impl From<u64> for EncodedFilter {
    fn from(value: u64) -> Self {
        EncodedFilter(BigUint::from(value))
    }
}

impl From<u128> for EncodedFilter {
    fn from(value: u128) -> Self {
        EncodedFilter(BigUint::from(value))
    }
}

impl fmt::Display for EncodedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EncodedFilter {
    type Err = Error;

    /// Parses the decimal text form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_data("filter must be a non-negative decimal integer")
                .with_context("value", s));
        }
        BigUint::from_str(s).map(EncodedFilter).map_err(|err| {
            Error::invalid_data(format!("malformed filter: {err}")).with_context("value", s)
        })
    }
}
