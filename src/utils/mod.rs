//! Utility Functions

mod io;

pub use io::{load_config, load_json, save_json};
