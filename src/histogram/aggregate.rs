//! Folds the current snapshot of every channel into one combined spectrum.

use super::store::StoreView;
use super::{bin_centers, ChannelId};
use serde::Serialize;
use thiserror::Error;

/// Index into each channel's `new_timestamps` used as its representative timestamp.
pub const REPRESENTATIVE_TIMESTAMP_INDEX: usize = 1;

/// Reasons a flush produces no view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("no channels have reported yet")]
    NoChannels,

    #[error("channel {channel} bin geometry differs from reference channel {reference}")]
    GeometryMismatch {
        channel: ChannelId,
        reference: ChannelId,
    },

    #[error("channel {channel} sent {len} timestamps, need at least {}", REPRESENTATIVE_TIMESTAMP_INDEX + 1)]
    InsufficientTimestamps { channel: ChannelId, len: usize },
}

/// Combined spectrum of all channels plus summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub bin_edges: Vec<f64>,
    pub bin_centers: Vec<f64>,
    /// Elementwise sum of every channel's current counts.
    pub combined_counts: Vec<f64>,
    /// Sum of `combined_counts`: triggers that landed inside the histogram range.
    pub included_triggers: f64,
    /// Sum of `total_seen` across channels.
    pub grand_total_seen: u64,
    pub mean_representative_timestamp: f64,
    pub channel_count: usize,
}

impl AggregateView {
    /// Width of one bin, taken from the first two edges.
    pub fn bin_width(&self) -> f64 {
        match self.bin_edges.as_slice() {
            [a, b, ..] => b - a,
            _ => 0.0,
        }
    }
}

/// Aggregates a store view.
///
/// The first channel of the view (lowest id) provides the reference bin
/// edges; every other channel must carry identical edges. Sums and the mean
/// are order independent, so the result does not depend on the order the
/// channels were first seen in.
pub fn aggregate(view: &StoreView) -> Result<AggregateView, AggregateError> {
    let (&reference, first) = view.iter().next().ok_or(AggregateError::NoChannels)?;
    let bin_edges = first.bin_edges.clone();

    let mut combined_counts = vec![0.0; first.counts.len()];
    let mut grand_total_seen = 0u64;
    let mut timestamp_sum = 0.0;

    for (&channel, snapshot) in view {
        if snapshot.bin_edges != bin_edges || snapshot.counts.len() != combined_counts.len() {
            return Err(AggregateError::GeometryMismatch { channel, reference });
        }
        let representative = snapshot
            .new_timestamps
            .get(REPRESENTATIVE_TIMESTAMP_INDEX)
            .ok_or(AggregateError::InsufficientTimestamps {
                channel,
                len: snapshot.new_timestamps.len(),
            })?;

        for (sum, count) in combined_counts.iter_mut().zip(&snapshot.counts) {
            *sum += count;
        }
        grand_total_seen = grand_total_seen.saturating_add(snapshot.total_seen);
        timestamp_sum += representative;
    }

    let channel_count = view.len();
    Ok(AggregateView {
        bin_centers: bin_centers(&bin_edges),
        bin_edges,
        included_triggers: combined_counts.iter().sum(),
        combined_counts,
        grand_total_seen,
        mean_representative_timestamp: timestamp_sum / channel_count as f64,
        channel_count,
    })
}
