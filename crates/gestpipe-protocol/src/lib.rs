pub mod config;
pub mod landmarks;
pub mod protocol;
pub mod sample;
pub mod template;
