//! # Synchronization Primitives
//!
//! Primitivas usadas pelo ciclo de vida de threads.
//!
//! ## Hierarquia de Uso
//!
//! ```text
//! spin::Mutex → Seção crítica de cada operação (tabela de PTCBs do processo)
//! CondVar     → Espera por término de thread (join), dorme via Substrate
//! Counter     → Geração de tids
//! ```
//!
//! ## Regras
//!
//! - **Nunca** dormir segurando o lock do processo: `CondVar::wait` solta e
//!   readquire.
//! - **Ordem de Lock**: bindings → processo. Nunca o inverso.

/// Operações atômicas
pub mod atomic;

/// Condition Variable
pub mod condvar;

pub use atomic::AtomicCounter;
pub use condvar::CondVar;
