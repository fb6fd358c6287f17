//! Decoding of the six-part histogram update messages published on the feed.
//!
//! Wire layout, one string per part:
//! `topic`, `channel_id`, `start:step:stop`, `[c1,c2,...]`, `total_seen`, `[t1,t2,...]`.
//! The string quirks of the format stay in this module; everything downstream
//! works on [`HistogramSnapshot`].

use super::{BinGeometry, ChannelId, HistogramSnapshot};
use thiserror::Error;

/// Number of parts in one update message.
pub const PART_COUNT: usize = 6;

/// Reasons a single update message is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("expected 6 message parts, got {0}")]
    PartCount(usize),

    #[error("invalid channel id {0:?}")]
    InvalidChannel(String),

    #[error("invalid bin geometry {0:?} (want start:step:stop with step > 0 and stop >= start)")]
    InvalidGeometry(String),

    #[error("invalid {field} list literal {value:?}")]
    InvalidList { field: &'static str, value: String },

    #[error("invalid total_seen {0:?}")]
    InvalidTotal(String),

    #[error("geometry has {expected} bins but {actual} counts were sent")]
    GeometryMismatch { expected: usize, actual: usize },
}

/// A decoded update: which channel it belongs to and its new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedUpdate {
    pub topic: String,
    pub channel: ChannelId,
    pub geometry: BinGeometry,
    pub snapshot: HistogramSnapshot,
}

/// Decodes one raw message into a [`DecodedUpdate`]. Pure.
pub fn decode<S: AsRef<str>>(parts: &[S]) -> Result<DecodedUpdate, DecodeError> {
    let [topic, channel, geometry, counts, total_seen, new_timestamps] = parts else {
        return Err(DecodeError::PartCount(parts.len()));
    };

    let channel = parse_channel(channel.as_ref())?;
    let geometry = parse_geometry(geometry.as_ref())?;
    let bin_edges = geometry.bin_edges();
    let counts = parse_list("counts", counts.as_ref())?;
    let total_seen = parse_total(total_seen.as_ref())?;
    let new_timestamps = parse_list("new_timestamps", new_timestamps.as_ref())?;

    let expected = bin_edges.len().saturating_sub(1);
    if counts.len() != expected {
        return Err(DecodeError::GeometryMismatch {
            expected,
            actual: counts.len(),
        });
    }

    Ok(DecodedUpdate {
        topic: topic.as_ref().to_string(),
        channel,
        geometry,
        snapshot: HistogramSnapshot {
            bin_edges,
            counts,
            total_seen,
            new_timestamps,
        },
    })
}

fn parse_channel(raw: &str) -> Result<ChannelId, DecodeError> {
    raw.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidChannel(raw.to_string()))
}

/// Parses `start:step:stop`. Exactly three numeric tokens are accepted.
pub fn parse_geometry(raw: &str) -> Result<BinGeometry, DecodeError> {
    let invalid = || DecodeError::InvalidGeometry(raw.to_string());

    let tokens: Vec<&str> = raw.split(':').collect();
    if tokens.len() != 3 {
        return Err(invalid());
    }
    let mut values = [0.0f64; 3];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        *slot = token.trim().parse().map_err(|_| invalid())?;
    }
    BinGeometry::new(values[0], values[1], values[2]).ok_or_else(invalid)
}

fn parse_total(raw: &str) -> Result<u64, DecodeError> {
    raw.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidTotal(raw.to_string()))
}

/// Parses a bracketed, comma separated list literal such as `[1,2.5,3]`.
/// `[]` decodes to an empty vector.
pub fn parse_list(field: &'static str, raw: &str) -> Result<Vec<f64>, DecodeError> {
    let invalid = || DecodeError::InvalidList {
        field,
        value: raw.to_string(),
    };

    let body = raw
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(invalid)?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|item| item.trim().parse::<f64>().map_err(|_| invalid()))
        .collect()
}

/// Formats values as the bracketed list literal used on the wire.
pub fn encode_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(","))
}
