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

use crate::error::Error;
use crate::hash::hash_label;
use crate::sieve::SieveConfig;

/// The bit positions a label maps to, one per hash round.
///
/// Positions keep round order (position 0 comes from round 1) and are not deduplicated: two
/// rounds may land on the same bit, which is harmless since setting a bit twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    positions: Vec<u64>,
}

impl Signature {
    /// Computes the signature of `label` with the configuration's `k` rounds.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if `label` is
    /// empty. Empty labels are rejected on every path that signs a label, so stored filters and
    /// queries always agree.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::SieveConfig;
    /// # use bloomsift::sieve::Signature;
    /// let config = SieveConfig::default();
    /// let signature = Signature::compute(&config, "zero").unwrap();
    /// assert_eq!(signature.len(), 4);
    /// assert!(signature.iter().all(|p| p < 64));
    /// assert!(Signature::compute(&config, "").is_err());
    /// ```
    pub fn compute(config: &SieveConfig, label: &str) -> Result<Self, Error> {
        Self::with_rounds(config, label, config.num_hashes())
    }

    /// Computes the signature of `label` using only the first `rounds` hash rounds.
    ///
    /// Zero rounds give the empty signature, which every filter contains.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if `label` is
    /// empty or if the seed table has no seed for one of the rounds.
    pub fn with_rounds(config: &SieveConfig, label: &str, rounds: u16) -> Result<Self, Error> {
        if label.is_empty() {
            return Err(Error::empty_label());
        }
        let seeds = config.seeds();
        let rounds = rounds as usize;
        if rounds >= seeds.len() {
            return Err(Error::invalid_input(format!(
                "{rounds} hash rounds need {} seeds, got {}",
                rounds + 1,
                seeds.len()
            )));
        }

        let num_bits = config.num_bits();
        let positions = seeds[1..=rounds]
            .iter()
            .map(|&seed| u64::from(hash_label(label, seed)) % num_bits)
            .collect();
        Ok(Signature { positions })
    }

    /// Builds a signature from raw bit positions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if a position
    /// falls outside `[0, W)`.
    pub fn from_positions<I>(config: &SieveConfig, positions: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = u64>,
    {
        let num_bits = config.num_bits();
        let positions = positions
            .into_iter()
            .map(|p| {
                if p < num_bits {
                    Ok(p)
                } else {
                    Err(Error::invalid_input("bit position out of range")
                        .with_context("position", p)
                        .with_context("num_bits", num_bits))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Signature { positions })
    }

    /// Returns the positions in round order.
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    /// Returns an iterator over the positions in round order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.positions.iter().copied()
    }

    /// Returns the number of rounds this signature was computed with.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns whether the signature has no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
