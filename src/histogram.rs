// Core histogram types shared by the decoder, the per-channel store and
// the aggregator.

pub mod aggregate;
pub mod decode;
pub mod store;


use serde::Serialize;

/// Identifier of a hardware channel as sent on the feed.
pub type ChannelId = i64;

/// The `start:step:stop` triple defining a histogram's bin edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinGeometry {
    pub start: f64,
    pub step: f64,
    pub stop: f64,
}

/// Upper bound on the number of bin edges a geometry may describe.
pub const MAX_BIN_EDGES: usize = 1 << 20;

impl BinGeometry {
    /// Validates the triple. Returns `None` unless all values are finite,
    /// `step > 0`, `stop >= start` and the edge count is in `1..=MAX_BIN_EDGES`.
    pub fn new(start: f64, step: f64, stop: f64) -> Option<Self> {
        let finite = start.is_finite() && step.is_finite() && stop.is_finite();
        if !(finite && step > 0.0 && stop >= start) {
            return None;
        }
        let geometry = BinGeometry { start, step, stop };
        let edges = geometry.edge_count_f64();
        (edges >= 1.0 && edges <= MAX_BIN_EDGES as f64).then_some(geometry)
    }

    fn edge_count_f64(&self) -> f64 {
        ((self.stop + self.step - self.start) / self.step).ceil()
    }

    /// Number of edges, `ceil((stop + step - start) / step)` as numpy's `arange` computes it.
    pub fn edge_count(&self) -> usize {
        let n = self.edge_count_f64();
        if n.is_finite() && n > 0.0 {
            (n as usize).min(MAX_BIN_EDGES)
        } else {
            0
        }
    }

    /// Bin edges from `start` up to (excluding) `stop + step`, in increments of `step`.
    /// `0:1:3` yields `[0, 1, 2, 3]`.
    pub fn bin_edges(&self) -> Vec<f64> {
        (0..self.edge_count())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

/// Midpoints of consecutive bin edges.
pub fn bin_centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| (w[0] + w[1]) * 0.5).collect()
}

/// One channel's histogram state as of a single update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    pub bin_edges: Vec<f64>,
    /// Always `bin_edges.len() - 1` entries.
    pub counts: Vec<f64>,
    /// Cumulative triggers seen on the channel, including those outside the histogram range.
    pub total_seen: u64,
    /// Timestamps of the events included in this update.
    pub new_timestamps: Vec<f64>,
}

impl HistogramSnapshot {
    pub fn bin_centers(&self) -> Vec<f64> {
        bin_centers(&self.bin_edges)
    }
}
