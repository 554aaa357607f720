pub mod changelog;
pub mod commands;
pub mod config;
pub mod error;
pub mod generate;
pub mod io;
pub mod panel;
pub mod paths;
pub mod prompt;
pub mod scaffold;
pub mod store;
pub mod todo;
pub mod tree;
pub mod types;

pub use error::{PrakterError, Result};
