//! lookalike-prime: reset the local CLIP weight cache and load the model.
//!
//! Intended as a manual or CI preparation step before the embedding pipeline runs.
//! See [`primer::prime`] for the contract.
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod primer;
pub mod tracing_setup;

pub use config::PrimerConfig;
pub use error::PrimeError;
pub use events::{ConsoleSink, EventSink, PrimeEvent};
pub use primer::{prime, prime_with_defaults, Primed};
