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

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Error;
use crate::sieve::SieveConfig;
use crate::store::Record;

/// Default upper bound on the number of label draws per generated record.
pub const DEFAULT_MAX_DRAWS: usize = 8;

/// Produces synthetic records with random label sets drawn from a vocabulary.
///
/// Each record draws between one and `max_draws` labels uniformly, with replacement, so it
/// holds at most `max_draws` distinct labels.
#[derive(Debug, Clone, Copy)]
pub struct RecordGenerator<'a> {
    config: &'a SieveConfig,
    max_draws: usize,
}

impl<'a> RecordGenerator<'a> {
    /// Creates a generator over the vocabulary of `config`.
    pub fn new(config: &'a SieveConfig) -> Self {
        RecordGenerator {
            config,
            max_draws: DEFAULT_MAX_DRAWS,
        }
    }

    /// Sets the upper bound on label draws per record.
    ///
    /// # Panics
    ///
    /// Panics if `max_draws` is 0.
    pub fn max_draws(mut self, max_draws: usize) -> Self {
        assert!(max_draws > 0, "max_draws must be at least 1");
        self.max_draws = max_draws;
        self
    }

    /// Draws the label set of one record.
    pub fn sample_labels<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeSet<String> {
        let draws = rng.gen_range(1..=self.max_draws);
        let vocabulary = self.config.vocabulary();
        (0..draws)
            .filter_map(|_| vocabulary.choose(&mut *rng).cloned())
            .collect()
    }

    /// Generates `count` records indexed `0..count`.
    ///
    /// Label sets are drawn sequentially from `rng`, so a seeded generator gives the same store
    /// every time; filters are then built in parallel.
    ///
    /// # Errors
    ///
    /// Fails only if building a record filter fails, which cannot happen for a vocabulary
    /// accepted by [`SieveConfigBuilder`](crate::sieve::SieveConfigBuilder).
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<Record>, Error> {
        let label_sets: Vec<BTreeSet<String>> =
            (0..count).map(|_| self.sample_labels(&mut *rng)).collect();

        let records = label_sets
            .into_par_iter()
            .enumerate()
            .map(|(index, labels)| Record::build(self.config, index as u64, labels))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(records = records.len(), "generated record store");
        Ok(records)
    }
}
