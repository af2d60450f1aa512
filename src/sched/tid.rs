//! Alocador de Thread IDs
//!
//! Contador global monotônico: ids nunca são reutilizados, nem entre
//! processos. O estado é explícito (uma instância por `ThreadManager`), com
//! ponto de inicialização definido.

use crate::sched::config::TID_MAX;
use crate::sync::AtomicCounter;
use crate::sys::types::Tid;

/// Gerador de tids
pub struct TidAllocator {
    next: AtomicCounter,
}

impl TidAllocator {
    /// Cria alocador cujo primeiro tid é `first`.
    pub const fn new(first: u32) -> Self {
        Self {
            next: AtomicCounter::new(first as u64),
        }
    }

    /// Próximo tid, estritamente maior que todos os anteriores.
    ///
    /// `None` quando o espaço de 32 bits acabou.
    pub fn next(&self) -> Option<Tid> {
        let raw = self.next.inc_bounded(TID_MAX as u64)?;
        Some(Tid::new(raw as u32))
    }
}
