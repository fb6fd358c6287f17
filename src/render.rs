// Renderers consume one AggregateView per flush. The text renderer draws a
// horizontal step plot of the combined spectrum; the JSON renderer emits one
// object per line for downstream tooling.

use crate::histogram::aggregate::AggregateView;
use chrono::Local;
use colored::*;
use serde::Serialize;
use std::io::{self, Write};

/// Default number of columns used for the longest bar of the text plot.
pub const DEFAULT_PLOT_WIDTH: usize = 60;

/// Draws an aggregate view. Called once per successful flush.
pub trait Renderer {
    fn render(&mut self, view: &AggregateView) -> io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, view: &AggregateView) -> io::Result<()> {
        (**self).render(view)
    }
}

/// Human-readable plot of the spectrum.
pub struct TextRenderer<W: Write> {
    writer: W,
    plot_width: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(writer: W, plot_width: usize) -> Self {
        TextRenderer {
            writer,
            plot_width: plot_width.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &AggregateView) -> io::Result<()> {
        let w = &mut self.writer;
        writeln!(
            w,
            "\n{} {}",
            "--- Combined spectrum".blue().bold(),
            format!("({}) ---", Local::now().format("%Y-%m-%d %H:%M:%S%.3f")).dimmed()
        )?;
        writeln!(
            w,
            "mean timestamp {}, included triggers {}",
            format!("{}", view.mean_representative_timestamp).bright_yellow(),
            format!("{}", view.included_triggers).bright_green().bold()
        )?;
        writeln!(
            w,
            "all triggers {}, num channels {}",
            view.grand_total_seen.to_string().bright_white().bold(),
            view.channel_count.to_string().bright_cyan()
        )?;
        writeln!(
            w,
            "{}",
            format!(
                "x: energy (eV)   y: counts per {:.2} eV bin",
                view.bin_width()
            )
            .dimmed()
        )?;

        let max = view
            .combined_counts
            .iter()
            .copied()
            .fold(0.0f64, f64::max);
        for (center, count) in view.bin_centers.iter().zip(&view.combined_counts) {
            let len = if max > 0.0 {
                ((count.max(0.0) / max) * self.plot_width as f64).round() as usize
            } else {
                0
            };
            writeln!(
                w,
                "{:>12.3} | {:<width$} {}",
                center,
                "█".repeat(len).green(),
                count,
                width = self.plot_width
            )?;
        }
        w.flush()
    }
}

/// One JSON object per flush, newline delimited.
pub struct JsonRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(writer: W) -> Self {
        JsonRenderer { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Serialize)]
struct JsonFlush<'a> {
    wallclock: String,
    bin_width: f64,
    #[serde(flatten)]
    view: &'a AggregateView,
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, view: &AggregateView) -> io::Result<()> {
        let record = JsonFlush {
            wallclock: Local::now().to_rfc3339(),
            bin_width: view.bin_width(),
            view,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}
