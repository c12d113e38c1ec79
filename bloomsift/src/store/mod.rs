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

//! A small record store screened by per-record filters.
//!
//! Each [`Record`] carries its ordinal index, the encoded union of its labels' signatures and
//! the labels themselves. The labels are ground truth for display and verification; screening
//! only ever looks at the filter.
//!
//! Records persist as one text line each: `index`, `filter` and `labels` separated by tabs,
//! the filter in decimal and the labels comma separated.
//!
//! # Usage
//!
//! ```rust
//! # use bloomsift::sieve::Matcher;
//! # use bloomsift::sieve::SieveConfig;
//! # use bloomsift::store::Record;
//! # use bloomsift::store::scan;
//! let config = SieveConfig::default();
//! let records = vec![
//!     Record::build(&config, 0, ["zero", "one"]).unwrap(),
//!     Record::build(&config, 1, ["two"]).unwrap(),
//! ];
//!
//! let mut text = Vec::new();
//! bloomsift::store::write_records(&mut text, &records).unwrap();
//! let restored = bloomsift::store::read_records(text.as_slice()).unwrap();
//! assert_eq!(restored, records);
//!
//! let report = scan(&Matcher::new(&config), "zero", &restored).unwrap();
//! assert!(report.hits().iter().any(|hit| hit.record.index == 0));
//! assert_eq!(report.false_negatives(), 0);
//! ```

mod format;
mod generate;
mod record;
mod scan;

pub use self::format::load;
pub use self::format::load_with;
pub use self::format::read_records;
pub use self::format::save;
pub use self::format::write_records;
pub use self::generate::RecordGenerator;
pub use self::generate::DEFAULT_MAX_DRAWS;
pub use self::record::Record;
pub use self::scan::scan;
pub use self::scan::ScanHit;
pub use self::scan::ScanReport;
