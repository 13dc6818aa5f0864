pub mod client;
pub mod frames;
pub mod reports;
pub mod runner;
