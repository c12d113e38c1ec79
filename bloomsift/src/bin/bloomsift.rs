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

//! Builds (or loads) a record store and screens it for a query label.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use bloomsift::sieve::Matcher;
use bloomsift::sieve::SieveConfig;
use bloomsift::sieve::SieveConfigBuilder;
use bloomsift::sieve::DEFAULT_NUM_BYTES;
use bloomsift::sieve::DEFAULT_VOCABULARY;
use bloomsift::store;
use bloomsift::store::Record;
use bloomsift::store::RecordGenerator;
use bloomsift::store::DEFAULT_MAX_DRAWS;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bloomsift", version, about)]
struct Args {
    /// Label to screen the record store for.
    query: String,

    /// Record store file.
    #[arg(long, default_value = "database.txt")]
    store: PathBuf,

    /// Screen the existing store instead of generating a fresh one.
    #[arg(long)]
    load: bool,

    /// Number of records to generate.
    #[arg(long, default_value_t = 10)]
    records: usize,

    /// Upper bound on label draws per generated record.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DRAWS as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_draws: u64,

    /// Seed for the record generator; random when omitted.
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Filter width in bytes.
    #[arg(long, default_value_t = DEFAULT_NUM_BYTES)]
    num_bytes: u64,

    /// Comma separated vocabulary; defaults to the words "zero" to "nine".
    #[arg(long, value_delimiter = ',')]
    vocabulary: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse(), &mut std::io::stdout().lock())
}

fn run(args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let vocabulary = if args.vocabulary.is_empty() {
        DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect()
    } else {
        args.vocabulary
    };
    let config = SieveConfigBuilder::new(vocabulary)
        .num_bytes(args.num_bytes)
        .build()
        .context("invalid filter configuration")?;
    info!(
        num_bits = config.num_bits(),
        num_hashes = config.num_hashes(),
        vocabulary_size = config.vocabulary_size(),
        "filter configuration"
    );

    let records = if args.load {
        store::load_with(&config, &args.store)
            .with_context(|| format!("failed to load {}", args.store.display()))?
    } else {
        let mut rng = match args.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let max_draws = usize::try_from(args.max_draws).context("--max-draws is too large")?;
        let records = RecordGenerator::new(&config)
            .max_draws(max_draws)
            .generate(&mut rng, args.records)?;
        store::save(&args.store, &records)
            .with_context(|| format!("failed to save {}", args.store.display()))?;
        records
    };

    let report = store::scan(&Matcher::new(&config), &args.query, &records)?;
    for hit in report.hits() {
        writeln!(out, "{}", hit.record)?;
    }

    info!(
        scanned = report.scanned(),
        hits = report.hits().len(),
        false_positives = report.false_positives(),
        observed_fpp = report.observed_fpp(),
        expected_fpp = expected_fpp(&config, &records),
        "screened {} records for {:?}",
        report.scanned(),
        report.query()
    );
    Ok(())
}

/// Mean of the per-record false positive rates, given each record's label count.
fn expected_fpp(config: &SieveConfig, records: &[Record]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records
        .iter()
        .map(|record| config.false_positive_rate(record.labels.len()))
        .sum();
    total / records.len() as f64
}

#[cfg(test)]
mod tests {
    use std::fs;

    use bloomsift::error::Error;
    use bloomsift::error::ErrorKind;

    use super::*;

    fn temp_store(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bloomsift-cli-{name}-{}.tsv", std::process::id()))
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("bloomsift").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_max_draws_must_be_positive() {
        assert!(Args::try_parse_from(["bloomsift", "zero", "--max-draws", "0"]).is_err());
        assert_eq!(parse(&["zero", "--max-draws", "3"]).max_draws, 3);
        assert_eq!(parse(&["zero"]).max_draws, DEFAULT_MAX_DRAWS as u64);
    }

    #[test]
    fn test_prints_every_hit() {
        let path = temp_store("hits");
        let path_arg = path.display().to_string();
        let mut out = Vec::new();
        run(
            parse(&["zero", "--store", path_arg.as_str(), "--records", "40", "--rng-seed", "7"]),
            &mut out,
        )
        .unwrap();

        // screening the saved store again prints the same lines
        let mut again = Vec::new();
        run(parse(&["zero", "--store", path_arg.as_str(), "--load"]), &mut again).unwrap();
        let records = store::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed, String::from_utf8(again).unwrap());
        let lines: Vec<&str> = printed.lines().collect();
        for record in records.iter().filter(|r| r.has_label("zero")) {
            assert!(lines.contains(&record.to_string().as_str()), "{record}");
        }
        for line in &lines {
            assert!(records.iter().any(|r| r.to_string() == *line), "{line}");
        }
        assert_eq!(records.len(), 40);
    }

    #[test]
    fn test_load_rejects_wider_store() {
        let path = temp_store("wide");
        let path_arg = path.display().to_string();
        run(
            parse(&["one", "--store", path_arg.as_str(), "--num-bytes", "16", "--rng-seed", "3"]),
            &mut Vec::new(),
        )
        .unwrap();
        let result = run(parse(&["one", "--store", path_arg.as_str(), "--load"]), &mut Vec::new());
        fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        let cause = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<Error>())
            .unwrap();
        assert_eq!(cause.kind(), ErrorKind::EncodingOverflow);
    }

    #[test]
    fn test_expected_fpp_uses_exact_label_counts() {
        let config = SieveConfig::default();
        assert_eq!(expected_fpp(&config, &[]), 0.0);

        let records = vec![
            Record::build(&config, 0, ["zero"]).unwrap(),
            Record::build(&config, 1, ["one", "two"]).unwrap(),
        ];
        let expected = (config.false_positive_rate(1) + config.false_positive_rate(2)) / 2.0;
        assert_eq!(expected_fpp(&config, &records), expected);
        assert!(expected > config.false_positive_rate(1));
    }
}
