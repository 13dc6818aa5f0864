// Re-export types from the protocol crate so they are accessible via gestpipe_core::*
pub use gestpipe_protocol::config;
pub use gestpipe_protocol::landmarks;
pub use gestpipe_protocol::protocol;
pub use gestpipe_protocol::sample;
pub use gestpipe_protocol::template;

// Internal Modules
pub mod classifier;
pub mod collab;
pub mod collector;
pub mod consts;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod hold;
pub mod quality;
pub mod recorder;
pub mod registry;
pub mod session;
pub mod trajectory;
