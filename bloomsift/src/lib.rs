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

//! # bloomsift
//!
//! Bloom filter pre-screening for small labelled record stores.
//!
//! Every record carries a compact filter built from its labels. Checking a query label against
//! the filter costs a handful of hash computations and one integer comparison, and rules out
//! most records that cannot hold the label before any exact comparison is made. Records that
//! pass the screen may still be false positives; records that fail it certainly do not hold
//! the label.
//!
//! The crate is divided into:
//!
//! - [`hash`]: the seeded hash function all bit positions derive from
//! - [`sieve`]: configuration, signatures, filters, encoding and matching
//! - [`store`]: records, their text format, synthetic generation and store scans

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod error;
pub mod hash;
pub mod sieve;
pub mod store;
