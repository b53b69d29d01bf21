//! CSV snapshot codec for Q-tables.
//!
//! Format: one `state,action,q_value` record per pair, preceded by an
//! optional header. Floats always use a decimal point.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{Result, q_learning::QTable};

/// Header written at the top of every snapshot.
pub const HEADER: [&str; 3] = ["state", "action", "q_value"];

/// Outcome of reading a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records written into the table
    pub applied: usize,
    /// Malformed or out-of-range records that were skipped
    pub skipped: usize,
}

/// Write every `(state, action, value)` record of `table`.
pub fn write_csv<W: Write>(table: &QTable, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for (state, action, value) in table.iter() {
        writer.write_record([state.to_string(), action.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Apply every well-formed record from `reader` to `table`.
///
/// Blank lines and a leading header are ignored. Records that do not parse,
/// or whose indices fall outside the table, are logged and counted in
/// [`LoadReport::skipped`]. Later records overwrite earlier ones.
pub fn read_csv<R: Read>(table: &mut QTable, reader: R) -> Result<LoadReport> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut report = LoadReport::default();
    let mut first_record = true;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                warn!("skipping unreadable Q-table record: {err}");
                report.skipped += 1;
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        let is_first = std::mem::replace(&mut first_record, false);
        if is_first && is_header(&record) {
            continue;
        }

        let line = record.position().map_or(0, |pos| pos.line());
        let Some((state, action, value)) = parse_record(&record) else {
            warn!(
                "skipping malformed Q-table line {line}: {:?} (expected state,action,q_value)",
                record.iter().collect::<Vec<_>>()
            );
            report.skipped += 1;
            continue;
        };

        if let Err(err) = table.set(action, state, value) {
            warn!("skipping Q-table line {line}: {err}");
            report.skipped += 1;
            continue;
        }
        report.applied += 1;
    }

    Ok(report)
}

fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|field| field.parse::<f64>().is_err())
}

fn parse_record(record: &StringRecord) -> Option<(usize, usize, f32)> {
    if record.len() != 3 {
        return None;
    }
    let state = record.get(0)?.parse().ok()?;
    let action = record.get(1)?.parse().ok()?;
    let value: f32 = record.get(2)?.parse().ok()?;
    value.is_finite().then_some((state, action, value))
}
