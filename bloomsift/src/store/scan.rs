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

use rayon::prelude::*;
use tracing::debug;

use crate::error::Error;
use crate::sieve::Matcher;
use crate::store::Record;

/// A record whose filter matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit<'r> {
    /// The matching record.
    pub record: &'r Record,
    /// Whether the record's labels really contain the query, i.e. the hit is no false positive.
    pub confirmed: bool,
}

/// Outcome of screening a record store for one query label.
#[derive(Debug, Clone)]
pub struct ScanReport<'r> {
    query: String,
    scanned: usize,
    hits: Vec<ScanHit<'r>>,
    false_negatives: usize,
}

impl<'r> ScanReport<'r> {
    /// Returns the query label.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the number of records screened.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Returns the matching records in store order.
    pub fn hits(&self) -> &[ScanHit<'r>] {
        &self.hits
    }

    /// Returns the number of hits confirmed by the records' labels.
    pub fn true_positives(&self) -> usize {
        self.hits.iter().filter(|hit| hit.confirmed).count()
    }

    /// Returns the number of hits whose labels do not contain the query.
    pub fn false_positives(&self) -> usize {
        self.hits.len() - self.true_positives()
    }

    /// Returns the number of records holding the query label that did not match.
    ///
    /// Always zero for records whose filters were built from their labels.
    pub fn false_negatives(&self) -> usize {
        self.false_negatives
    }

    /// Returns the fraction of non-holding records that matched anyway.
    pub fn observed_fpp(&self) -> f64 {
        let negatives = self.scanned - self.true_positives() - self.false_negatives;
        if negatives == 0 {
            0.0
        } else {
            self.false_positives() as f64 / negatives as f64
        }
    }
}

/// Screens every record for `query` and checks each decision against the record's labels.
///
/// Records are screened in parallel; hits keep store order.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if `query` is
/// empty, or [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow) if a
/// record's filter is wider than the matcher's configuration.
pub fn scan<'r>(
    matcher: &Matcher<'_>,
    query: &str,
    records: &'r [Record],
) -> Result<ScanReport<'r>, Error> {
    let query_filter = matcher.query_filter(query)?;
    for record in records {
        record.check_width(matcher.config())?;
    }

    let decisions: Vec<(&Record, bool)> = records
        .par_iter()
        .map(|record| (record, record.filter.contains_bits(&query_filter)))
        .collect();

    let mut hits = Vec::new();
    let mut false_negatives = 0;
    for (record, matched) in decisions {
        let confirmed = record.has_label(query);
        if matched {
            hits.push(ScanHit { record, confirmed });
        } else if confirmed {
            false_negatives += 1;
        }
    }

    let report = ScanReport {
        query: query.to_string(),
        scanned: records.len(),
        hits,
        false_negatives,
    };
    debug!(
        query,
        scanned = report.scanned,
        hits = report.hits.len(),
        false_positives = report.false_positives(),
        "scanned record store"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sieve::EncodedFilter;
    use crate::sieve::SieveConfig;
    use crate::sieve::SieveConfigBuilder;
    use crate::sieve::DEFAULT_VOCABULARY;

    #[test]
    fn test_scan_counts_against_ground_truth() {
        let config = SieveConfig::default();
        let mut records = vec![
            Record::build(&config, 0, ["zero", "one"]).unwrap(),
            Record::build(&config, 1, ["two"]).unwrap(),
            Record::build(&config, 2, ["zero"]).unwrap(),
        ];
        // a saturated filter matches everything, so "zero" is a false positive here
        records.push(Record {
            index: 3,
            filter: EncodedFilter::from(u64::MAX),
            labels: ["three".to_string()].into_iter().collect(),
        });

        let report = scan(&Matcher::new(&config), "zero", &records).unwrap();
        assert_eq!(report.query(), "zero");
        assert_eq!(report.scanned(), 4);
        assert_eq!(report.false_negatives(), 0);
        assert_eq!(report.true_positives(), 2);
        assert!(report.false_positives() >= 1);

        let indices: Vec<u64> = report.hits().iter().map(|hit| hit.record.index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
        assert!(indices.contains(&0) && indices.contains(&2) && indices.contains(&3));
        assert!(report.observed_fpp() > 0.0 && report.observed_fpp() <= 1.0);
    }

    #[test]
    fn test_scan_detects_stale_filter() {
        let config = SieveConfig::default();
        let records = vec![Record {
            index: 0,
            filter: EncodedFilter::zero(),
            labels: ["zero".to_string()].into_iter().collect(),
        }];
        let report = scan(&Matcher::new(&config), "zero", &records).unwrap();
        assert!(report.hits().is_empty());
        assert_eq!(report.false_negatives(), 1);
        assert_eq!(report.observed_fpp(), 0.0);
    }

    #[test]
    fn test_scan_rejects_wider_filters() {
        let wide = SieveConfigBuilder::new(DEFAULT_VOCABULARY)
            .num_bytes(16)
            .build()
            .unwrap();
        let config = SieveConfig::default();
        let records: Vec<Record> = (0..4)
            .map(|i| Record::build(&wide, i, [DEFAULT_VOCABULARY[i as usize]]).unwrap())
            .collect();
        let widest = records.iter().map(|r| r.filter.bits()).max().unwrap();
        assert!(widest > 64);

        let err = scan(&Matcher::new(&config), "zero", &records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingOverflow);
        assert_eq!(err.context("index"), Some("0"));

        let report = scan(&Matcher::new(&wide), "zero", &records).unwrap();
        assert_eq!(report.false_negatives(), 0);
    }

    #[test]
    fn test_scan_empty_query() {
        let config = SieveConfig::default();
        let err = scan(&Matcher::new(&config), "", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
