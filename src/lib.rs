// Module declarations for the library crate.

pub mod cli;
pub mod config;
pub mod feed;
pub mod flush;
pub mod histogram;
pub mod monitor;
pub mod render;
pub mod telemetry;
pub mod util;

// Re-export the core types for convenience, e.g., for tests or external users.
pub use histogram::aggregate::{aggregate, AggregateError, AggregateView};
pub use histogram::decode::{decode, DecodeError, DecodedUpdate};
pub use histogram::store::{ChannelStore, StoreView};
pub use histogram::{BinGeometry, ChannelId, HistogramSnapshot};
