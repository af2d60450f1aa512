//! Process Thread Control Block (PTCB)
//!
//! Estado de uma thread lógica, independente do contexto de execução do
//! scheduler. O PTCB vive na tabela do processo dono e só é liberado quando o
//! último joiner consumiu o exit value (ou quando o processo termina).

use alloc::sync::Arc;

use bitflags::bitflags;

use super::entry::ThreadEntry;
use crate::sync::CondVar;
use crate::sys::types::{ContextId, Pid, Tid};

bitflags! {
    /// Flags de ciclo de vida. Ambas só andam em um sentido:
    /// JOINABLE 1→0 (detach), EXITED 0→1 (exit).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ThreadFlags: u8 {
        /// Join ainda é permitido
        const JOINABLE = 1 << 0;
        /// Exit já publicou o exit value
        const EXITED   = 1 << 1;
    }
}

/// Estado observável de uma thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Executando (ou pronta), joinable
    Running,
    /// Executando, mas detached
    Detached,
    /// Terminou; exit value disponível (se joinable)
    Exited,
}

/// Thread record
pub struct ThreadRecord {
    tid: Tid,
    owner: Pid,
    entry: Option<ThreadEntry>,
    /// Associação não-dona com o contexto do scheduler (None depois do exit)
    context: Option<ContextId>,
    flags: ThreadFlags,
    exit_value: i32,
    waiters: usize,
    signal: Arc<CondVar>,
}

impl ThreadRecord {
    /// PTCB recém criado: joinable, não terminado, sem waiters.
    ///
    /// `entry` é `None` para a thread principal do processo.
    pub fn new(tid: Tid, owner: Pid, entry: Option<ThreadEntry>, context: ContextId) -> Self {
        Self {
            tid,
            owner,
            entry,
            context: Some(context),
            flags: ThreadFlags::JOINABLE,
            exit_value: 0,
            waiters: 0,
            signal: Arc::new(CondVar::new()),
        }
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    pub fn owner(&self) -> Pid {
        self.owner
    }

    pub fn entry(&self) -> Option<&ThreadEntry> {
        self.entry.as_ref()
    }

    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    pub fn flags(&self) -> ThreadFlags {
        self.flags
    }

    pub fn is_joinable(&self) -> bool {
        self.flags.contains(ThreadFlags::JOINABLE)
    }

    pub fn has_exited(&self) -> bool {
        self.flags.contains(ThreadFlags::EXITED)
    }

    /// Exit value, só depois do exit.
    pub fn exit_value(&self) -> Option<i32> {
        self.has_exited().then_some(self.exit_value)
    }

    pub fn waiters(&self) -> usize {
        self.waiters
    }

    pub fn signal(&self) -> &Arc<CondVar> {
        &self.signal
    }

    pub fn state(&self) -> ThreadState {
        if self.has_exited() {
            ThreadState::Exited
        } else if self.is_joinable() {
            ThreadState::Running
        } else {
            ThreadState::Detached
        }
    }

    /// Remove a joinabilidade (irrevogável).
    pub(crate) fn detach(&mut self) {
        self.flags.remove(ThreadFlags::JOINABLE);
    }

    pub(crate) fn add_waiter(&mut self) {
        self.waiters += 1;
    }

    /// Retira um waiter e retorna quantos restam.
    pub(crate) fn remove_waiter(&mut self) -> usize {
        self.waiters = self.waiters.saturating_sub(1);
        self.waiters
    }

    /// Publica o exit value e desfaz a associação com o contexto.
    ///
    /// Retorna `false` (sem efeito) se o PTCB já tinha terminado.
    pub(crate) fn mark_exited(&mut self, value: i32) -> bool {
        if self.has_exited() {
            return false;
        }
        self.exit_value = value;
        self.context = None;
        self.flags.insert(ThreadFlags::EXITED);
        if !self.is_joinable() {
            // Ninguém vai ler: solta a closure e o que ela capturou
            self.entry = None;
        }
        true
    }
}
