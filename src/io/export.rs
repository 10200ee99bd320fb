//! CSV export for the daily consumption series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::model::ConsumptionSample;

/// Column header, in field order of [`ConsumptionSample`].
const HEADER: [&str; 5] = ["timestamp", "production", "consumption", "battery", "grid"];

/// Exports consumption samples to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(samples: &[ConsumptionSample], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(samples, buf)
}

/// Writes consumption samples as CSV to any writer, one row per hour.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(samples: &[ConsumptionSample], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER)?;
    for s in samples {
        wtr.write_record(&[
            s.timestamp.clone(),
            format!("{:.2}", s.production),
            format!("{:.2}", s.consumption),
            format!("{:.2}", s.battery),
            format!("{:.2}", s.grid),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
