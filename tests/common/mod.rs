//! Common helper functions for integration tests.
#![allow(dead_code)]

use hist_listener::histogram::aggregate::AggregateView;
use hist_listener::render::Renderer;
use std::io;

// --- Constants ---
pub const TOPIC: &str = "energy_from_filt_value";
pub const GEOMETRY: &str = "0:1:3";

// --- Message Creation Helpers ---

/// Builds the six parts of one update message.
pub fn msg(channel: i64, geometry: &str, counts: &str, total: u64, timestamps: &str) -> Vec<String> {
    vec![
        TOPIC.to_string(),
        channel.to_string(),
        geometry.to_string(),
        counts.to_string(),
        total.to_string(),
        timestamps.to_string(),
    ]
}

/// Serializes message parts as one feed line (JSON string array + newline).
pub fn frame(parts: &[String]) -> String {
    let mut line = serde_json::to_string(parts).expect("string array serializes");
    line.push('\n');
    line
}

// --- Renderer Helper ---

/// Renderer that keeps every view it is handed.
#[derive(Default)]
pub struct RecordingRenderer {
    pub views: Vec<AggregateView>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, view: &AggregateView) -> io::Result<()> {
        self.views.push(view.clone());
        Ok(())
    }
}

/// Renderer that always fails, for checking that render errors are tolerated.
pub struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&mut self, _view: &AggregateView) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "renderer gone"))
    }
}
