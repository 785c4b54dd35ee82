//! External process execution and environment detection.

pub mod command;
pub mod platform;

pub use command::{run, CommandOutput};
pub use platform::{expand_home, is_ci};
