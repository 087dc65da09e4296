//! An energy-metered sandbox for untrusted method bodies, backed by a layered transactional
//! state.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod config;
pub use config::*;

mod cost;
pub use cost::*;

mod engine;
pub use engine::*;

mod instruction;
pub use instruction::*;

mod instrument;
pub use instrument::*;

mod meter;
pub use meter::*;

mod result;
pub use result::*;

mod state;
pub use state::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod tx;
pub use tx::*;
