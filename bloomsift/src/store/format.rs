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

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::sieve::SieveConfig;
use crate::store::Record;

/// Writes `records` in the text store format, one newline-terminated line per record.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidInput`](crate::error::ErrorKind::InvalidInput) if a label cannot
/// be represented in the format, or [`ErrorKind::Io`](crate::error::ErrorKind::Io) if writing
/// fails.
pub fn write_records<W: Write>(mut writer: W, records: &[Record]) -> Result<(), Error> {
    for record in records {
        writeln!(writer, "{}", record.to_line()?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads records in the text store format. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) for a malformed
/// line, with its 1-based number under the `line` context key, or
/// [`ErrorKind::Io`](crate::error::ErrorKind::Io) if reading fails.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record =
            Record::parse_line(&line).map_err(|err| err.with_context("line", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Writes `records` to the file at `path`, replacing its contents.
///
/// # Errors
///
/// See [`write_records`]; I/O errors carry the path under the `path` context key.
pub fn save(path: impl AsRef<Path>, records: &[Record]) -> Result<(), Error> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|err| Error::from(err).with_context("path", path.display()))?;
    write_records(BufWriter::new(file), records)
        .map_err(|err| err.with_context("path", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "saved record store");
    Ok(())
}

/// Reads all records from the file at `path`.
///
/// # Errors
///
/// See [`read_records`]; errors carry the path under the `path` context key.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Record>, Error> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|err| Error::from(err).with_context("path", path.display()))?;
    let records = read_records(BufReader::new(file))
        .map_err(|err| err.with_context("path", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "loaded record store");
    Ok(records)
}

/// Reads all records from the file at `path` and checks that each filter fits `config`.
///
/// # Errors
///
/// See [`load`]. Returns [`ErrorKind::EncodingOverflow`](crate::error::ErrorKind::EncodingOverflow)
/// if a stored filter is wider than the configuration, with the record under the `index`
/// context key.
pub fn load_with(config: &SieveConfig, path: impl AsRef<Path>) -> Result<Vec<Record>, Error> {
    let path = path.as_ref();
    let records = load(path)?;
    for record in &records {
        record
            .check_width(config)
            .map_err(|err| err.with_context("path", path.display()))?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sieve::EncodedFilter;

    #[test]
    fn test_read_skips_blank_lines() {
        let text = "0\t5\tzero\n\n1\t0\t\r\n   \n";
        let records = read_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filter, EncodedFilter::from(5u64));
        assert!(records[1].labels.is_empty());
    }

    #[test]
    fn test_read_reports_line_number() {
        let text = "0\t5\tzero\n1\tfive\tone\n";
        let err = read_records(text.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(err.context("line"), Some("2"));
    }

    #[test]
    fn test_write_terminates_lines() {
        let records = read_records("3\t9\tone,two".as_bytes()).unwrap();
        let mut out = Vec::new();
        write_records(&mut out, &records).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3\t9\tone,two\n");
    }

    #[test]
    fn test_load_with_checks_width() {
        let path = std::env::temp_dir().join(format!("bloomsift-wide-{}.tsv", std::process::id()));
        std::fs::write(&path, "0\t1\tzero\n7\t18446744073709551616\tone\n").unwrap();
        let loaded = load_with(&SieveConfig::default(), &path);
        let unchecked = load(&path);
        std::fs::remove_file(&path).unwrap();

        let err = loaded.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingOverflow);
        assert_eq!(err.context("index"), Some("7"));
        assert_eq!(unchecked.unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/bloomsift/records.tsv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.context("path"), Some("/nonexistent/bloomsift/records.tsv"));
    }
}
