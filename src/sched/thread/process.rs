//! Contexto de threads de um processo
//!
//! Dono exclusivo da tabela de PTCBs e do contador de threads ativas. Tudo
//! fica atrás de um único `spin::Mutex`: cada operação de ciclo de vida é uma
//! seção crítica nele.

use alloc::vec::Vec;

use spin::Mutex;

use super::table::{RecordHandle, ThreadTable};
use crate::sys::types::{Pid, Tid};

/// Estado protegido pelo lock do processo.
pub struct ProcessThreads {
    /// PTCBs do processo (vivos, terminados não colhidos, detached vivos)
    pub table: ThreadTable,
    /// Threads cujo contexto ainda não executou exit
    pub active_threads: usize,
    /// Tids de threads detached já terminadas e colhidas (ordenado).
    /// Só servem para Join/Detach responderem `NotJoinable`/`DetachIneligible`
    /// em vez de `UnknownTarget`; não contam no limite de threads.
    detached_exits: Vec<Tid>,
}

impl ProcessThreads {
    /// Verdadeiro se `tid` foi uma thread detached deste processo que já
    /// terminou e foi colhida.
    pub fn was_detached(&self, tid: Tid) -> bool {
        self.detached_exits.binary_search(&tid).is_ok()
    }

    /// Quantos tids detached já foram colhidos.
    pub fn detached_exits(&self) -> usize {
        self.detached_exits.len()
    }

    /// Colhe um PTCB detached que terminou e não tem waiters.
    ///
    /// O tid vai para a lista de detached terminadas. Sem memória para essa
    /// lista o PTCB fica na tabela (o comportamento observável é o mesmo).
    pub fn reap_detached(&mut self, handle: RecordHandle) -> bool {
        let Some(record) = self.table.get(handle) else {
            return false;
        };
        if record.is_joinable() || !record.has_exited() || record.waiters() > 0 {
            return false;
        }
        let tid = record.tid();
        if self.detached_exits.try_reserve(1).is_err() {
            crate::kwarn!("(Thread) Sem memória para colher detached tid=", tid.as_u32());
            return false;
        }
        self.table.remove(handle);
        let pos = self.detached_exits.partition_point(|t| *t < tid);
        self.detached_exits.insert(pos, tid);
        true
    }

    /// Descarta PTCBs e tids colhidos. Retorna quantos PTCBs foram liberados.
    pub(crate) fn clear(&mut self) -> usize {
        self.active_threads = 0;
        self.detached_exits = Vec::new();
        self.table.clear()
    }
}

/// Contexto de threads do processo (lado "PCB").
pub struct ProcessContext {
    pid: Pid,
    threads: Mutex<ProcessThreads>,
}

impl ProcessContext {
    pub fn new(pid: Pid, max_threads: usize) -> Self {
        Self {
            pid,
            threads: Mutex::new(ProcessThreads {
                table: ThreadTable::new(max_threads),
                active_threads: 0,
                detached_exits: Vec::new(),
            }),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Lock do processo.
    pub fn threads(&self) -> &Mutex<ProcessThreads> {
        &self.threads
    }
}

/// Fotografia do processo para diagnóstico.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub active_threads: usize,
    pub records: usize,
    /// Threads detached já terminadas e colhidas
    pub reaped_detached: usize,
}

impl ProcessInfo {
    pub(crate) fn capture(ctx: &ProcessContext) -> Self {
        let threads = ctx.threads.lock();
        Self {
            pid: ctx.pid(),
            active_threads: threads.active_threads,
            records: threads.table.len(),
            reaped_detached: threads.detached_exits(),
        }
    }
}
