//! # Thread Lifecycle
//!
//! create, self, join, detach, exit
//!
//! ## Protocolo
//! - **Create** reserva espaço na tabela, gera o tid, pede um contexto ao
//!   scheduler, registra o PTCB, incrementa `active_threads` e só então
//!   marca o contexto como runnable.
//! - **Join** registra-se como waiter, dorme no `CondVar` do PTCB até o exit,
//!   lê o exit value e, se for o último waiter, colhe o PTCB.
//! - **Detach** remove a joinabilidade. Joiners que já estavam dormindo são
//!   acordados e recebem `NotJoinable`. O PTCB de uma thread detached é
//!   colhido no exit (ou pelo último joiner acordado); o tid fica registrado
//!   para que Join continue respondendo `NotJoinable`.
//! - **Exit** publica o exit value, acorda os joiners e encerra o processo
//!   (última thread) ou estaciona o contexto.
//!
//! ## Locks
//! Cada operação roda inteira sob o lock do processo, exceto os pontos de
//! bloqueio. O mapa de bindings (contexto → thread) tem lock próprio e nunca
//! é adquirido enquanto o lock de um processo está preso.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use spin::Mutex;

use super::entry::ThreadEntry;
use super::process::{ProcessContext, ProcessInfo};
use super::record::{ThreadRecord, ThreadState};
use crate::sched::config::ThreadConfig;
use crate::sched::substrate::{Substrate, Trampoline};
use crate::sched::tid::TidAllocator;
use crate::sys::error::{ThreadError, ThreadResult};
use crate::sys::types::{ContextId, Pid, Tid};

/// Associação contexto de execução → thread lógica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub pid: Pid,
    pub tid: Tid,
}

/// Gerenciador de threads de usuário de todos os processos.
pub struct ThreadManager<S: Substrate> {
    substrate: S,
    config: ThreadConfig,
    tids: TidAllocator,
    processes: Mutex<BTreeMap<Pid, Arc<ProcessContext>>>,
    bindings: Mutex<BTreeMap<ContextId, Binding>>,
}

impl<S: Substrate> ThreadManager<S> {
    pub fn new(substrate: S) -> Self {
        Self::with_config(substrate, ThreadConfig::default())
    }

    pub fn with_config(substrate: S, config: ThreadConfig) -> Self {
        crate::kinfo!("(Thread) Gerenciador iniciado. Primeiro tid=", config.first_tid);
        Self {
            substrate,
            config,
            tids: TidAllocator::new(config.first_tid),
            processes: Mutex::new(BTreeMap::new()),
            bindings: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    // =========================================================================
    // PROCESSOS
    // =========================================================================

    /// Cria o contexto de threads de um processo recém criado.
    ///
    /// `main` é o contexto que já executa o processo; ele ganha o primeiro
    /// PTCB (sem task) e o processo começa com uma thread ativa.
    pub fn attach_process(&self, pid: Pid, main: ContextId) -> ThreadResult<Tid> {
        let process = Arc::new(ProcessContext::new(pid, self.config.max_threads_per_process));

        let tid = {
            let mut threads = process.threads().lock();
            threads.table.reserve_one()?;
            let tid = self.tids.next().ok_or(ThreadError::AllocationFailure)?;
            threads.table.insert(ThreadRecord::new(tid, pid, None, main))?;
            threads.active_threads = 1;
            tid
        };

        {
            let mut processes = self.processes.lock();
            if processes.contains_key(&pid) {
                crate::kwarn!("(Thread) attach: processo já registrado pid=", pid.as_u32());
                return Err(ThreadError::ProcessExists);
            }
            processes.insert(pid, process);
        }

        self.bindings.lock().insert(main, Binding { pid, tid });
        crate::kdebug!("(Thread) attach: pid=", pid.as_u32());
        crate::ktrace!("(Thread) attach: main tid=", tid.as_u32());
        Ok(tid)
    }

    /// Descarta o contexto de threads de um processo (todos os PTCBs).
    ///
    /// Retorna `false` se o pid não estava registrado.
    pub fn release_process(&self, pid: Pid) -> bool {
        let Some(process) = self.processes.lock().remove(&pid) else {
            return false;
        };

        let reclaimed = {
            let mut threads = process.threads().lock();
            // Quem ainda estiver dormindo num join acorda e vê o PTCB sumir
            for record in threads.table.iter() {
                if record.waiters() > 0 {
                    record.signal().notify_all(&self.substrate);
                }
            }
            threads.clear()
        };

        self.bindings.lock().retain(|_, b| b.pid != pid);
        crate::kdebug!("(Thread) release: PTCBs liberados=", reclaimed);
        true
    }

    // =========================================================================
    // CICLO DE VIDA
    // =========================================================================

    /// Cria uma nova thread no processo do chamador.
    pub fn create_thread(self: &Arc<Self>, entry: ThreadEntry) -> ThreadResult<Tid> {
        let me = self.current()?;
        let process = self.process(me.pid)?;
        crate::ktrace!("(Thread) create: pid=", me.pid.as_u32());

        let (tid, ctx) = {
            let mut threads = process.threads().lock();

            if let Err(e) = threads.table.reserve_one() {
                crate::kerror!("(Thread) create: sem memória para PTCB");
                return Err(e);
            }
            let Some(tid) = self.tids.next() else {
                crate::kerror!("(Thread) create: tids esgotados");
                return Err(ThreadError::AllocationFailure);
            };

            let mgr = Arc::clone(self);
            let body: Trampoline = Box::new(move || {
                mgr.run_thread();
            });
            let Some(ctx) = self.substrate.spawn_context(me.pid, body) else {
                crate::kerror!("(Thread) create: scheduler recusou contexto");
                return Err(ThreadError::AllocationFailure);
            };

            threads
                .table
                .insert(ThreadRecord::new(tid, me.pid, Some(entry), ctx))?;
            threads.active_threads += 1;
            (tid, ctx)
        };

        self.bindings.lock().insert(ctx, Binding { pid: me.pid, tid });
        self.substrate.mark_runnable(ctx);

        crate::kdebug!("(Thread) create: novo tid=", tid.as_u32());
        Ok(tid)
    }

    /// Tid da thread que está executando.
    ///
    /// Contexto sem thread associada recebe `Tid::NONE`.
    pub fn thread_self(&self) -> Tid {
        match self.current() {
            Ok(me) => me.tid,
            Err(_) => {
                crate::kwarn!("(Thread) self: contexto sem thread");
                Tid::NONE
            }
        }
    }

    /// Espera a thread `tid` terminar e retorna o exit value dela.
    pub fn thread_join(&self, tid: Tid) -> ThreadResult<i32> {
        let me = self.current()?;
        if tid == me.tid {
            crate::kwarn!("(Thread) join: self join recusado tid=", tid.as_u32());
            return Err(ThreadError::InvalidSelfJoin);
        }

        let process = self.process(me.pid)?;
        let lock = process.threads();
        let mut threads = lock.lock();

        let Some(handle) = threads.table.lookup(tid) else {
            if threads.was_detached(tid) {
                crate::ktrace!("(Thread) join: alvo detached já colhido tid=", tid.as_u32());
                return Err(ThreadError::NotJoinable);
            }
            return Err(ThreadError::UnknownTarget);
        };
        let signal = {
            let record = threads
                .table
                .get_mut(handle)
                .ok_or(ThreadError::UnknownTarget)?;
            if !record.is_joinable() {
                crate::ktrace!("(Thread) join: alvo não joinable tid=", tid.as_u32());
                return Err(ThreadError::NotJoinable);
            }
            record.add_waiter();
            Arc::clone(record.signal())
        };

        crate::ktrace!("(Thread) join: esperando tid=", tid.as_u32());
        loop {
            let done = match threads.table.get(handle) {
                Some(record) => record.has_exited() || !record.is_joinable(),
                // Processo foi descartado enquanto dormíamos
                None => return Err(ThreadError::UnknownTarget),
            };
            if done {
                break;
            }
            threads = signal.wait(&self.substrate, lock, threads);
        }

        let record = threads
            .table
            .get_mut(handle)
            .ok_or(ThreadError::UnknownTarget)?;
        let remaining = record.remove_waiter();

        if !record.is_joinable() {
            crate::ktrace!("(Thread) join: alvo virou detached tid=", tid.as_u32());
            if remaining == 0 {
                threads.reap_detached(handle);
            }
            return Err(ThreadError::NotJoinable);
        }
        let value = record.exit_value().ok_or(ThreadError::UnknownTarget)?;

        if remaining == 0 {
            threads.table.remove(handle);
            crate::ktrace!("(Thread) join: PTCB colhido tid=", tid.as_u32());
        }

        crate::kdebug!("(Thread) join: ok tid=", tid.as_u32());
        Ok(value)
    }

    /// Torna `tid` não-joinable.
    pub fn thread_detach(&self, tid: Tid) -> ThreadResult<()> {
        let me = self.current()?;
        let process = self.process(me.pid)?;
        let mut threads = process.threads().lock();

        if tid == me.tid {
            let record = threads
                .table
                .find_mut(tid)
                .ok_or(ThreadError::UnknownTarget)?;
            self.detach_record(record);
            crate::kdebug!("(Thread) detach: self tid=", tid.as_u32());
            return Ok(());
        }

        if threads.active_threads < 2 {
            crate::ktrace!("(Thread) detach: menos de 2 threads ativas");
            return Err(ThreadError::DetachIneligible);
        }

        if threads.was_detached(tid) {
            crate::ktrace!("(Thread) detach: alvo detached já terminou tid=", tid.as_u32());
            return Err(ThreadError::DetachIneligible);
        }
        let record = threads
            .table
            .find_mut(tid)
            .ok_or(ThreadError::UnknownTarget)?;
        if record.has_exited() {
            crate::ktrace!("(Thread) detach: alvo já terminou tid=", tid.as_u32());
            return Err(ThreadError::DetachIneligible);
        }
        self.detach_record(record);
        crate::kdebug!("(Thread) detach: tid=", tid.as_u32());
        Ok(())
    }

    /// Encerra a thread atual. Nunca retorna.
    pub fn thread_exit(&self, value: i32) -> ! {
        let ctx = self.substrate.current_context();
        let Some(me) = self.bindings.lock().get(&ctx).copied() else {
            crate::kerror!("(Thread) exit: contexto sem thread ctx=", ctx.as_u64());
            self.substrate.park_forever(ctx)
        };
        let Ok(process) = self.process(me.pid) else {
            crate::kerror!("(Thread) exit: processo desconhecido pid=", me.pid.as_u32());
            self.substrate.park_forever(ctx)
        };

        let last = {
            let mut threads = process.threads().lock();
            let published = threads
                .table
                .find_mut(me.tid)
                .map(|record| record.mark_exited(value))
                .unwrap_or(false);
            threads.active_threads = threads.active_threads.saturating_sub(1);
            if published {
                if let Some(handle) = threads.table.lookup(me.tid) {
                    if let Some(record) = threads.table.get(handle) {
                        record.signal().notify_all(&self.substrate);
                    }
                    // Detached sem joiners: ninguém vai ler o exit value
                    threads.reap_detached(handle);
                }
            }
            threads.active_threads == 0
        };

        self.bindings.lock().remove(&ctx);
        crate::ktrace!("(Thread) exit: tid=", me.tid.as_u32());

        if last {
            crate::kdebug!("(Thread) exit: última thread, encerrando pid=", me.pid.as_u32());
            self.release_process(me.pid);
            self.substrate.terminate_process(me.pid, value)
        }

        self.substrate.park_forever(ctx)
    }

    // =========================================================================
    // DIAGNÓSTICO
    // =========================================================================

    /// Estado de uma thread de `pid`. `None` se não existe (ou já foi colhida).
    pub fn thread_state(&self, pid: Pid, tid: Tid) -> Option<ThreadState> {
        let process = self.process(pid).ok()?;
        let threads = process.threads().lock();
        let state = match threads.table.find(tid) {
            Some(record) => Some(record.state()),
            None if threads.was_detached(tid) => Some(ThreadState::Exited),
            None => None,
        };
        state
    }

    /// Quantos joiners estão presos no PTCB `tid` de `pid`.
    pub fn thread_waiters(&self, pid: Pid, tid: Tid) -> Option<usize> {
        let process = self.process(pid).ok()?;
        let threads = process.threads().lock();
        let waiters = threads.table.find(tid).map(|r| r.waiters());
        waiters
    }

    pub fn process_info(&self, pid: Pid) -> Option<ProcessInfo> {
        let process = self.process(pid).ok()?;
        Some(ProcessInfo::capture(&process))
    }

    /// Thread associada a um contexto.
    pub fn binding_of(&self, ctx: ContextId) -> Option<Binding> {
        self.bindings.lock().get(&ctx).copied()
    }

    // =========================================================================
    // INTERNOS
    // =========================================================================

    /// Corpo do trampolim: roda a task do PTCB e entrega o resultado ao exit.
    fn run_thread(&self) -> ! {
        let entry = self.current().ok().and_then(|me| {
            let process = self.process(me.pid).ok()?;
            let threads = process.threads().lock();
            let entry = threads.table.find(me.tid)?.entry().cloned();
            entry
        });

        let value = match entry {
            Some(entry) => entry.call(),
            None => {
                crate::kerror!("(Thread) trampolim sem task");
                -1
            }
        };
        self.thread_exit(value)
    }

    fn current(&self) -> ThreadResult<Binding> {
        let ctx = self.substrate.current_context();
        self.bindings
            .lock()
            .get(&ctx)
            .copied()
            .ok_or(ThreadError::NoCurrentThread)
    }

    fn process(&self, pid: Pid) -> ThreadResult<Arc<ProcessContext>> {
        self.processes
            .lock()
            .get(&pid)
            .cloned()
            .ok_or(ThreadError::NoCurrentThread)
    }

    fn detach_record(&self, record: &mut ThreadRecord) {
        record.detach();
        if record.waiters() > 0 {
            record.signal().notify_all(&self.substrate);
        }
    }
}
