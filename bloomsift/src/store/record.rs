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
use std::fmt;

use crate::error::Error;
use crate::sieve::BitFilter;
use crate::sieve::EncodedFilter;
use crate::sieve::SieveConfig;

pub(crate) const FIELD_SEPARATOR: char = '\t';
pub(crate) const LABEL_SEPARATOR: char = ',';

/// One entry of the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Ordinal identifier of the record.
    pub index: u64,
    /// Union of the signatures of every label of the record.
    pub filter: EncodedFilter,
    /// The labels the filter was built from. Never consulted when matching.
    pub labels: BTreeSet<String>,
}

impl Record {
    /// Builds a record, coalescing the signature of every label into its filter.
    ///
    /// Repeated labels collapse into one.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if a label is
    /// empty.
    pub fn build<I, S>(config: &SieveConfig, index: u64, labels: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        let filter = BitFilter::from_labels(config, &labels)?.encode();
        Ok(Record {
            index,
            filter,
            labels,
        })
    }

    /// Returns whether `label` is one of the record's labels.
    ///
    /// This is the exact comparison that filter screening approximates.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Returns the labels joined with commas.
    pub fn labels_text(&self) -> String {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        labels.join(",")
    }

    /// Renders the record as one store line, without the line terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if a label
    /// contains a field or label separator or a line break, which the text form cannot carry.
    pub fn to_line(&self) -> Result<String, Error> {
        if let Some(label) = self.labels.iter().find(|label| {
            label.contains(&[FIELD_SEPARATOR, LABEL_SEPARATOR, '\n', '\r'][..]) || label.is_empty()
        }) {
            return Err(
                Error::invalid_input("label cannot be stored in the text format")
                    .with_context("index", self.index)
                    .with_context("label", label),
            );
        }
        Ok(format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.index,
            self.filter,
            self.labels_text()
        ))
    }

    /// Checks that the stored filter fits the width of `config`.
    ///
    /// A filter built under a wider configuration would never match its own labels.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow) if the
    /// filter needs more bits than the configuration has, with the record under the `index`
    /// context key.
    pub fn check_width(&self, config: &SieveConfig) -> Result<(), Error> {
        let bits = self.filter.bits();
        if bits > config.num_bits() {
            return Err(Error::encoding_overflow(bits, config.num_bits())
                .with_context("index", self.index));
        }
        Ok(())
    }

    /// Parses one store line, without the line terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if the line does
    /// not hold exactly three fields, the index or filter is not a non-negative decimal integer,
    /// or a label is empty.
    pub fn parse_line(line: &str) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [index, filter, labels] = fields.as_slice() else {
            return Err(Error::invalid_data(format!(
                "expected 3 tab separated fields, got {}",
                fields.len()
            )));
        };

        let index = index.parse::<u64>().map_err(|err| {
            Error::invalid_data(format!("malformed index: {err}")).with_context("value", index)
        })?;
        let filter = filter.parse::<EncodedFilter>()?;
        let labels = if labels.is_empty() {
            BTreeSet::new()
        } else {
            labels
                .split(LABEL_SEPARATOR)
                .map(|label| {
                    if label.is_empty() {
                        Err(Error::invalid_data("empty label"))
                    } else {
                        Ok(label.to_string())
                    }
                })
                .collect::<Result<BTreeSet<_>, _>>()?
        };

        Ok(Record {
            index,
            filter,
            labels,
        })
    }
}

impl fmt::Display for Record {
    /// Formats the record as `{index} - {labels}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.index, self.labels_text())
    }
}
