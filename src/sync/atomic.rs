//! Operações atômicas

use core::sync::atomic::{AtomicU64, Ordering};

/// Contador atômico monotônico
pub struct AtomicCounter(AtomicU64);

impl AtomicCounter {
    pub const fn new(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Incrementa e retorna o valor anterior.
    pub fn inc(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel)
    }

    /// Incrementa só se o valor atual for <= `max`.
    ///
    /// Retorna o valor anterior, ou `None` quando o contador já passou de `max`
    /// (nunca dá a volta).
    pub fn inc_bounded(&self, max: u64) -> Option<u64> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                if cur <= max {
                    Some(cur + 1)
                } else {
                    None
                }
            })
            .ok()
    }
}
