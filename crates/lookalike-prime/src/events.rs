use std::fmt;
use std::io::{self, Stderr, Stdout, Write};
use std::path::PathBuf;

use lookalike_embed::Accelerator;

/// Status diagnostics produced while priming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimeEvent {
    DeviceSelected(Accelerator),
    DeletingStale(PathBuf),
    Loaded { model: String },
}

impl PrimeEvent {
    /// Deletion notices go to stderr; everything else to stdout.
    pub fn is_notice(&self) -> bool {
        matches!(self, PrimeEvent::DeletingStale(_))
    }
}

impl fmt::Display for PrimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimeEvent::DeviceSelected(accelerator) => write!(f, "Device: {accelerator}"),
            PrimeEvent::DeletingStale(_) => f.write_str("Deleting existing local CLIP model..."),
            PrimeEvent::Loaded { .. } => f.write_str("CLIP model loaded successfully"),
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, event: PrimeEvent);
}

impl EventSink for Vec<PrimeEvent> {
    fn emit(&mut self, event: PrimeEvent) {
        self.push(event);
    }
}

/// Writes each event as one line to `out` or `err`.
pub struct ConsoleSink<O, E> {
    out: O,
    err: E,
}

impl ConsoleSink<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> EventSink for ConsoleSink<O, E> {
    fn emit(&mut self, event: PrimeEvent) {
        let stream: &mut dyn Write = if event.is_notice() {
            &mut self.err
        } else {
            &mut self.out
        };
        if let Err(e) = writeln!(stream, "{event}").and_then(|()| stream.flush()) {
            tracing::warn!(error = %e, %event, "failed to write status line");
        }
    }
}
