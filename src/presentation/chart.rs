//! Latest values per band, bounded, for the live chart.

use crate::features::{Band, FeatureVector, BAND_COUNT};
use std::collections::VecDeque;
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct ChannelHistory {
    max_len: usize,
    bands: [VecDeque<f64>; BAND_COUNT],
}

impl ChannelHistory {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            bands: Default::default(),
        }
    }

    pub fn publish(&mut self, features: &FeatureVector) {
        for band in Band::ALL {
            let buf = &mut self.bands[band.index()];
            buf.push_back(features.band(band));
            while buf.len() > self.max_len {
                buf.pop_front();
            }
        }
    }

    pub fn latest(&self, band: Band) -> Option<f64> {
        self.bands[band.index()].back().copied()
    }

    pub fn values(&self, band: Band) -> impl Iterator<Item = f64> + '_ {
        self.bands[band.index()].iter().copied()
    }

    pub fn len(&self) -> usize {
        self.bands[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands[0].is_empty()
    }

    /// Display curve for a band: a sine over [0, 2π] with amplitude `last / 10` and
    /// frequency `|last| + 1`. None until the band has a value.
    pub fn waveform(&self, band: Band, points: usize) -> Option<Vec<f64>> {
        let last = self.latest(band)?;
        let amplitude = last / 10.0;
        let frequency = last.abs() + 1.0;
        let step = if points > 1 {
            2.0 * PI / (points - 1) as f64
        } else {
            0.0
        };
        Some(
            (0..points)
                .map(|i| amplitude * (frequency * step * i as f64).sin())
                .collect(),
        )
    }
}
