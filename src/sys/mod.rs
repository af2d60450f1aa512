//! System Definitions (ABI).
//!
//! Tipos e códigos de erro que atravessam a fronteira entre o subsistema de
//! threads, o scheduler e o userspace.

pub mod error;
pub mod types;

pub use error::{ThreadError, ThreadResult};
pub use types::{ContextId, Pid, Tid};
