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
use crate::sieve::BitFilter;
use crate::sieve::EncodedFilter;
use crate::sieve::SieveConfig;
use crate::sieve::Signature;

/// Decides whether a query label is possibly present in stored filters.
///
/// `true` means "possibly present", which may be a false positive. `false` is certain: a label
/// that went into a filter always matches it.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    config: &'a SieveConfig,
}

impl<'a> Matcher<'a> {
    /// Creates a matcher for filters built under `config`.
    pub fn new(config: &'a SieveConfig) -> Self {
        Matcher { config }
    }

    /// Returns the configuration queries are signed with.
    pub fn config(&self) -> &'a SieveConfig {
        self.config
    }

    /// Builds and encodes the filter of a single query label.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if `label` is
    /// empty.
    pub fn query_filter(&self, label: &str) -> Result<EncodedFilter, Error> {
        let signature = Signature::compute(self.config, label)?;
        Ok(BitFilter::from_signature(self.config, &signature).encode())
    }

    /// Tests whether `label` is possibly present in `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if `label` is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomsift::sieve::BitFilter;
    /// # use bloomsift::sieve::Matcher;
    /// # use bloomsift::sieve::SieveConfig;
    /// let config = SieveConfig::default();
    /// let record = BitFilter::from_labels(&config, ["zero", "one"]).unwrap().encode();
    ///
    /// let matcher = Matcher::new(&config);
    /// assert!(matcher.matches("zero", &record).unwrap());
    /// assert!(matcher.matches("one", &record).unwrap());
    /// ```
    pub fn matches(&self, label: &str, record: &EncodedFilter) -> Result<bool, Error> {
        let query = self.query_filter(label)?;
        Ok(record.contains_bits(&query))
    }

    /// Tests whether every one of `labels` is possibly present in `record`.
    ///
    /// The query labels are coalesced into one query filter before the subset test, so this is
    /// a conjunction. No labels form the empty query, which every filter contains.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) on the first
    /// empty label.
    pub fn matches_all<I, S>(&self, labels: I, record: &EncodedFilter) -> Result<bool, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query = BitFilter::from_labels(self.config, labels)?.encode();
        Ok(record.contains_bits(&query))
    }
}
