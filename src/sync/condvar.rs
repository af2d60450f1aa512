//! Condition Variable
//!
//! Sinal de término de cada PTCB. O contador de sinais funciona como
//! "ticket": quem vai dormir lê o contador ainda segurando o lock, solta o lock
//! e pede ao scheduler para bloquear até o contador mudar. Um `notify_all`
//! entre o unlock e o bloqueio não se perde.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::{Mutex, MutexGuard};

use crate::sched::substrate::Substrate;

/// Condition Variable
/// Permite que threads esperem por uma condição específica.
pub struct CondVar {
    signal_counter: AtomicU64,
}

impl CondVar {
    pub const fn new() -> Self {
        Self {
            signal_counter: AtomicU64::new(0),
        }
    }

    /// Valor atual do contador de sinais.
    #[inline]
    pub fn ticket(&self) -> u64 {
        self.signal_counter.load(Ordering::Acquire)
    }

    /// Verdadeiro se houve `notify_all` depois de `ticket` ser lido.
    #[inline]
    pub fn changed_since(&self, ticket: u64) -> bool {
        self.ticket() != ticket
    }

    /// Espera pela condição.
    ///
    /// Libera o lock, dorme no scheduler até ser notificado e readquire o lock.
    /// Pode acordar sem a condição ser verdadeira: o chamador re-testa em loop.
    pub fn wait<'a, T, S: Substrate + ?Sized>(
        &self,
        sched: &S,
        lock: &'a Mutex<T>,
        guard: MutexGuard<'a, T>,
    ) -> MutexGuard<'a, T> {
        let ticket = self.ticket();
        drop(guard);
        sched.block_on(self, ticket);
        lock.lock()
    }

    /// Acorda todas as threads esperando.
    pub fn notify_all<S: Substrate + ?Sized>(&self, sched: &S) {
        self.signal_counter.fetch_add(1, Ordering::AcqRel);
        sched.wake_all(self);
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}
