pub mod cli;
pub mod load_config;
pub mod schedule;
pub mod upload;

pub use cli::{run, Cli, Commands};
