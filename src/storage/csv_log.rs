//! Comma-separated sample log: fixed header, one record per accepted sample.

use super::SampleSink;
use crate::error::Result;
use crate::features::FeatureVector;
use crate::model::RiskScore;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "Alpha,Beta,Theta,Delta,Stroke_Risk";

pub struct CsvSampleLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvSampleLog {
    /// Create (or truncate) the log at path and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}")?;
        writer.flush()?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Plain decimal text, never exponent form (`1e-7` is written `0.0000001`).
/// Integral values keep a trailing `.0`.
fn render(v: f64) -> String {
    let mut text = v.to_string();
    if v.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

impl SampleSink for CsvSampleLog {
    fn append(&mut self, features: &FeatureVector, score: RiskScore) -> Result<()> {
        let fields: Vec<String> = features
            .values()
            .iter()
            .copied()
            .chain(std::iter::once(score.percent()))
            .map(render)
            .collect();
        writeln!(self.writer, "{}", fields.join(","))?;
        // one record per tick; flush so the file is readable live
        self.writer.flush()?;
        Ok(())
    }
}
