//! Tabela de PTCBs de um processo
//!
//! Arena de slots com free list + índice ordenado por tid.
//!
//! - Tids são crescentes, então a ordem do índice é a ordem de inserção.
//! - Busca por tid: busca binária no índice.
//! - Cada slot tem uma geração; um `RecordHandle` velho (de um PTCB já
//!   colhido) não enxerga nem libera o ocupante novo do slot.
//! - Toda memória de uma inserção é reservada com `try_reserve` antes de
//!   qualquer mudança: falta de memória vira `AllocationFailure` sem estado
//!   parcial.

use alloc::vec::Vec;

use super::record::ThreadRecord;
use crate::sys::error::{ThreadError, ThreadResult};
use crate::sys::types::Tid;

/// Referência contada por geração para um PTCB na tabela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHandle {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    record: Option<ThreadRecord>,
}

/// Coleção de PTCBs do processo.
pub struct ThreadTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: Vec<(Tid, RecordHandle)>,
    limit: usize,
}

impl ThreadTable {
    /// Tabela vazia que aceita até `limit` PTCBs vivos.
    pub const fn new(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: Vec::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Garante espaço para mais um PTCB.
    ///
    /// Depois de `Ok`, o próximo `insert` não aloca.
    pub fn reserve_one(&mut self) -> ThreadResult<()> {
        if self.len() >= self.limit {
            crate::kwarn!("(ThreadTable) Limite de threads atingido=", self.limit);
            return Err(ThreadError::AllocationFailure);
        }
        if self.free.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| ThreadError::AllocationFailure)?;
        }
        self.index
            .try_reserve(1)
            .map_err(|_| ThreadError::AllocationFailure)?;
        // Capacidade para devolver o slot à free list no remove
        self.free
            .try_reserve(self.slots.len() + 1 - self.free.len())
            .map_err(|_| ThreadError::AllocationFailure)?;
        Ok(())
    }

    /// Insere um PTCB. Tids repetidos são recusados.
    pub fn insert(&mut self, record: ThreadRecord) -> ThreadResult<RecordHandle> {
        let tid = record.tid();
        let pos = self.index.partition_point(|(t, _)| *t < tid);
        if self.index.get(pos).is_some_and(|(t, _)| *t == tid) {
            crate::kerror!("(ThreadTable) Tid duplicado=", tid.as_u32());
            return Err(ThreadError::AllocationFailure);
        }

        self.reserve_one()?;

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.record = Some(record);
                RecordHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                RecordHandle {
                    index,
                    generation: 0,
                }
            }
        };

        self.index.insert(pos, (tid, handle));
        Ok(handle)
    }

    /// Handle do PTCB com esse tid.
    pub fn lookup(&self, tid: Tid) -> Option<RecordHandle> {
        self.index
            .binary_search_by(|(t, _)| t.cmp(&tid))
            .ok()
            .map(|pos| self.index[pos].1)
    }

    pub fn get(&self, handle: RecordHandle) -> Option<&ThreadRecord> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.record.as_ref()
    }

    pub fn get_mut(&mut self, handle: RecordHandle) -> Option<&mut ThreadRecord> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.record.as_mut()
    }

    pub fn find(&self, tid: Tid) -> Option<&ThreadRecord> {
        self.get(self.lookup(tid)?)
    }

    pub fn find_mut(&mut self, tid: Tid) -> Option<&mut ThreadRecord> {
        let handle = self.lookup(tid)?;
        self.get_mut(handle)
    }

    /// Retira o PTCB da tabela e devolve a posse dele.
    ///
    /// Handle velho ou já removido retorna `None` (sem double free).
    pub fn remove(&mut self, handle: RecordHandle) -> Option<ThreadRecord> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);

        if let Ok(pos) = self.index.binary_search_by(|(t, _)| t.cmp(&record.tid())) {
            self.index.remove(pos);
        }
        Some(record)
    }

    /// PTCBs em ordem de inserção.
    pub fn iter(&self) -> impl Iterator<Item = &ThreadRecord> + '_ {
        self.index.iter().filter_map(move |(_, h)| self.get(*h))
    }

    /// Libera todos os PTCBs. Retorna quantos foram liberados.
    pub fn clear(&mut self) -> usize {
        let count = self.index.len();
        self.index.clear();
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.record.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(i as u32);
        }
        count
    }
}
