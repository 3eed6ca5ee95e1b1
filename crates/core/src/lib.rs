//! Shine Core - shared types and errors for the Unicorn script runner.

mod error;
mod source;

pub use error::{Result, ShineError};
pub use source::ScriptSource;
