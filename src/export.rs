//! CSV and JSON export of generated traces

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::stats::SeriesSummary;
use crate::synth::GlucoseSeries;

/// Write the series as CSV. With `start`, a wall-clock timestamp column is added.
pub fn write_csv<W: Write>(mut out: W, series: &GlucoseSeries, start: Option<NaiveDateTime>) -> Result<()> {
    match start {
        Some(_) => writeln!(out, "hour,offset_minutes,glucose_mg_dl,timestamp")?,
        None => writeln!(out, "hour,offset_minutes,glucose_mg_dl")?,
    }

    for point in series.points() {
        write!(out, "{:.4},{},{:.1}", point.hour, point.offset_minutes, point.glucose)?;
        if let Some(start) = start {
            write!(out, ",{}", (start + point.offset()).format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(path: P, series: &GlucoseSeries, start: Option<NaiveDateTime>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_csv(&mut writer, series, start)?;
    writer.flush()?;
    info!("Exported {} readings to {}", series.len(), path.as_ref().display());
    Ok(())
}

/// Series plus its summary, as printed by `glucosim summary --json`
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub series: &'a GlucoseSeries,
    pub summary: &'a SeriesSummary,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
