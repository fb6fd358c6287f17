//! Per-channel store holding the two most recent snapshots of every channel.

use super::{ChannelId, HistogramSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Point-in-time view of every channel's current snapshot.
///
/// Snapshots are shared, so taking a view is cheap and later updates to the
/// store never alter a view already handed out.
pub type StoreView = BTreeMap<ChannelId, Arc<HistogramSnapshot>>;

/// The previous and current snapshot of a single channel.
#[derive(Debug, Clone)]
pub struct ChannelEntry {
    pub previous: Arc<HistogramSnapshot>,
    pub current: Arc<HistogramSnapshot>,
}

/// What the latest update of a channel added on top of the one before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelDelta {
    pub channel: ChannelId,
    pub new_counts: Vec<f64>,
    pub new_triggers: u64,
}

/// Channels appear on first update and are never evicted.
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: BTreeMap<ChannelId, ChannelEntry>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new snapshot for `channel`.
    ///
    /// On first observation both previous and current are set to `snapshot`,
    /// so a zero delta is defined before a second update arrives.
    pub fn update(&mut self, channel: ChannelId, snapshot: HistogramSnapshot) {
        let snapshot = Arc::new(snapshot);
        match self.channels.get_mut(&channel) {
            Some(entry) => {
                entry.previous = std::mem::replace(&mut entry.current, snapshot);
            }
            None => {
                self.channels.insert(
                    channel,
                    ChannelEntry {
                        previous: Arc::clone(&snapshot),
                        current: snapshot,
                    },
                );
            }
        }
    }

    /// Copies out the current snapshot of every channel.
    pub fn snapshot_all(&self) -> StoreView {
        self.channels
            .iter()
            .map(|(id, entry)| (*id, Arc::clone(&entry.current)))
            .collect()
    }

    pub fn entry(&self, channel: ChannelId) -> Option<&ChannelEntry> {
        self.channels.get(&channel)
    }

    /// Counts and triggers added by the channel's latest update.
    ///
    /// Bins are compared position by position; if the geometry changed
    /// between updates the shorter length wins. Counters that went backwards
    /// (e.g. after a publisher restart) saturate at zero.
    pub fn delta(&self, channel: ChannelId) -> Option<ChannelDelta> {
        let entry = self.channels.get(&channel)?;
        let new_counts = entry
            .current
            .counts
            .iter()
            .zip(&entry.previous.counts)
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .collect();
        Some(ChannelDelta {
            channel,
            new_counts,
            new_triggers: entry
                .current
                .total_seen
                .saturating_sub(entry.previous.total_seen),
        })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
