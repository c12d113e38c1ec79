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

use bloomsift::sieve::BitFilter;
use bloomsift::sieve::Matcher;
use bloomsift::sieve::SieveConfig;
use bloomsift::sieve::Signature;

fn main() {
    // W = 64 bits, ten labels, k = floor(64 / 10 * ln 2) = 4
    let config = SieveConfig::default();
    println!(
        "Filter width {} bits, {} hash rounds over {} labels",
        config.num_bits(),
        config.num_hashes(),
        config.vocabulary_size()
    );

    for label in config.vocabulary() {
        let signature = Signature::compute(&config, label).unwrap();
        println!("{label:>6}: {:?}", signature.positions());
    }

    // One record holding two labels
    let filter = BitFilter::from_labels(&config, ["zero", "one"]).unwrap();
    let record = filter.encode();
    println!("\nRecord {{zero, one}}");
    println!("  bits:    {}", filter.to_bit_string());
    println!("  stored:  {record}");
    println!("  load:    {:.3}", filter.load_factor());
    println!("  est fpp: {:.5}", filter.estimated_fpp());
    println!("  fpp(2):  {:.5}", config.false_positive_rate(2));

    let matcher = Matcher::new(&config);
    println!("\nScreening:");
    for label in config.vocabulary() {
        let possible = matcher.matches(label, &record).unwrap();
        let actual = label == "zero" || label == "one";
        let verdict = match (possible, actual) {
            (true, true) => "match",
            (true, false) => "false positive",
            (false, _) => "no match",
        };
        println!("{label:>6}: {verdict}");
    }
}
