//! Library exports for the input-relay pipeline.
//!
//! Exposes the input sources, the coordinator that bridges them onto an
//! application event sink, and the recording/replay support so hosts and the
//! bundled CLI share one implementation.

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod input;
pub mod recording;
pub mod replay;
pub mod sink;
pub mod surface;

pub use config::Config;
pub use coordinator::InputCoordinator;
