// The monitor owns all aggregation state: the per-channel store, the flush
// scheduler and the renderer. The main loop feeds it raw messages one at a
// time; nothing here blocks or spawns.

use crate::feed::topic_matches;
use crate::flush::FlushScheduler;
use crate::histogram::aggregate::{aggregate, AggregateError, AggregateView};
use crate::histogram::decode::{decode, DecodeError};
use crate::histogram::store::ChannelStore;
use crate::histogram::ChannelId;
use crate::render::Renderer;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Running counters, reported on shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub messages_received: u64,
    pub messages_decoded: u64,
    pub messages_rejected: u64,
    pub messages_filtered: u64,
    pub flushes_rendered: u64,
    pub flushes_skipped: u64,
}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    /// The message was stored; no flush was due.
    Stored { channel: ChannelId },
    /// The message was stored and a view was rendered.
    Flushed { channel: ChannelId, view: AggregateView },
    /// The message was stored but the due flush failed to aggregate.
    FlushSkipped {
        channel: ChannelId,
        error: AggregateError,
    },
    /// The message did not decode; the store is unchanged.
    Rejected(DecodeError),
    /// The topic did not match the subscription.
    Filtered,
}

pub struct Monitor<R: Renderer> {
    topic: String,
    store: ChannelStore,
    scheduler: FlushScheduler,
    renderer: R,
    stats: MonitorStats,
}

impl<R: Renderer> Monitor<R> {
    pub fn new(topic: impl Into<String>, scheduler: FlushScheduler, renderer: R) -> Self {
        Monitor {
            topic: topic.into(),
            store: ChannelStore::new(),
            scheduler,
            renderer,
            stats: MonitorStats::default(),
        }
    }

    /// Decodes one message, updates the store, and flushes if due at `now`.
    pub fn handle<S: AsRef<str>>(&mut self, parts: &[S], now: Instant) -> HandleOutcome {
        self.stats.messages_received += 1;

        // Topic first, so other publications on the same endpoint are never parsed.
        if let Some(first) = parts.first() {
            let topic: &str = first.as_ref();
            if !topic_matches(&self.topic, topic) {
                self.stats.messages_filtered += 1;
                trace!(topic, "Ignoring message outside subscription");
                return HandleOutcome::Filtered;
            }
        }

        let update = match decode(parts) {
            Ok(update) => update,
            Err(e) => {
                self.stats.messages_rejected += 1;
                warn!(error = %e, "Discarding undecodable message");
                return HandleOutcome::Rejected(e);
            }
        };

        self.stats.messages_decoded += 1;
        let channel = update.channel;
        self.store.update(channel, update.snapshot);
        if let Some(delta) = self.store.delta(channel) {
            debug!(
                channel,
                new_triggers = delta.new_triggers,
                new_counts = delta.new_counts.iter().sum::<f64>(),
                "Channel updated"
            );
        }

        if !self.scheduler.poll(now) {
            return HandleOutcome::Stored { channel };
        }
        match self.flush_now() {
            Ok(view) => HandleOutcome::Flushed { channel, view },
            Err(error) => HandleOutcome::FlushSkipped { channel, error },
        }
    }

    /// Aggregates the current store and renders it, bypassing the scheduler.
    pub fn flush_now(&mut self) -> Result<AggregateView, AggregateError> {
        let view = match aggregate(&self.store.snapshot_all()) {
            Ok(view) => view,
            Err(e) => {
                self.stats.flushes_skipped += 1;
                warn!(error = %e, "Skipping flush");
                return Err(e);
            }
        };
        info!(
            channels = view.channel_count,
            included = view.included_triggers,
            all = view.grand_total_seen,
            mean_timestamp = view.mean_representative_timestamp,
            "Flushing combined spectrum"
        );
        if let Err(e) = self.renderer.render(&view) {
            warn!(error = %e, "Renderer failed");
        }
        self.stats.flushes_rendered += 1;
        Ok(view)
    }

    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    pub fn scheduler(&self) -> &FlushScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
