//! # Layered transactional state
//!
//! State changes of a transaction are buffered in a [`StateLayer`] and only become visible to the
//! layer's parent on [`LayeredState::commit`]. Layers live in an arena owned by
//! [`LayeredState`] and are addressed by [`LayerId`]; nested transactions are layers whose parent
//! is another layer. The chain ends in a [`StateBackend`], normally an `Arc<BaseStore>` shared by
//! all executions, which applies committed changes atomically.

mod backend;
mod base;
mod layer;
mod store;
pub use backend::*;
pub use base::*;
pub use layer::*;
pub use store::*;
