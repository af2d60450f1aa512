//! Forge Threads.
//!
//! Ciclo de vida de threads de usuário (create, self, join, detach, exit) em
//! cima do scheduler do Forge. O scheduler entra pela trait
//! [`sched::Substrate`]; o resto é `no_std` + `alloc`.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/Arc)
extern crate alloc;

// --- Infraestrutura ---
pub mod core; // Logging e sink
pub mod klib; // Framework de self test
pub mod sync; // CondVar, contadores atômicos
pub mod sys; // Tipos e erros

// --- Subsistema ---
pub mod sched; // Tids, PTCBs, gerenciador
pub mod syscall; // Interface com Userspace

pub use crate::sched::thread::{ThreadEntry, ThreadManager, ThreadState};
pub use crate::sched::{Substrate, ThreadConfig};
pub use crate::sys::{ContextId, Pid, ThreadError, ThreadResult, Tid};
