//! # Scheduler Substrate
//!
//! Interface que o scheduler do kernel precisa oferecer ao subsistema de
//! threads. Tudo aqui é *invocado*; a implementação (run queues, troca de
//! contexto, wait queues) fica do outro lado.
//!
//! ## Contrato
//! - `spawn_context` cria um contexto **não executável**; só vira runnable em
//!   `mark_runnable`. Retornar `None` conta como falha de alocação.
//! - `block_on(signal, ticket)` bloqueia o contexto atual até
//!   `signal.changed_since(ticket)`. Deve checar o ticket atomicamente em
//!   relação a `wake_all` (nenhum wakeup perdido).
//! - `park_forever` e `terminate_process` nunca retornam.

use alloc::boxed::Box;

use crate::sync::CondVar;
use crate::sys::types::{ContextId, Pid};

/// Corpo de um contexto recém criado (o trampolim da thread).
pub type Trampoline = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler externo consumido pelo ciclo de vida de threads.
pub trait Substrate: Send + Sync + 'static {
    /// Cria contexto de execução para `owner` cujo corpo é `body`.
    fn spawn_context(&self, owner: Pid, body: Trampoline) -> Option<ContextId>;

    /// Coloca o contexto na run queue.
    fn mark_runnable(&self, ctx: ContextId);

    /// Contexto executando na CPU atual.
    fn current_context(&self) -> ContextId;

    /// Bloqueia o contexto atual até `signal` avançar além de `ticket`.
    fn block_on(&self, signal: &CondVar, ticket: u64);

    /// Acorda todos os contextos bloqueados em `signal`.
    fn wake_all(&self, signal: &CondVar);

    /// Estaciona o contexto para sempre. Ele nunca mais volta à run queue.
    fn park_forever(&self, ctx: ContextId) -> !;

    /// Encerra o processo com `status`.
    fn terminate_process(&self, pid: Pid, status: i32) -> !;
}
