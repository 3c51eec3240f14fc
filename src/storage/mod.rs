//! Local persistence: append-only sample log and window verdict history.

mod csv_log;
mod history;

pub use csv_log::{CsvSampleLog, CSV_HEADER};
pub use history::{HistoryRow, VerdictHistory};

use crate::error::Result;
use crate::features::FeatureVector;
use crate::model::RiskScore;

/// Append-only sink for accepted samples.
pub trait SampleSink {
    fn append(&mut self, features: &FeatureVector, score: RiskScore) -> Result<()>;
}

impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    fn append(&mut self, features: &FeatureVector, score: RiskScore) -> Result<()> {
        (**self).append(features, score)
    }
}

/// In-memory sink, keeps every record in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<(FeatureVector, RiskScore)>,
}

impl SampleSink for MemorySink {
    fn append(&mut self, features: &FeatureVector, score: RiskScore) -> Result<()> {
        self.records.push((*features, score));
        Ok(())
    }
}
