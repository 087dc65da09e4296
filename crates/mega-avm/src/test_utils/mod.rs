//! Test utilities for the metered sandbox.

mod body;
mod replay;

pub use body::*;
pub use replay::*;
