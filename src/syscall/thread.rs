//! # Thread Syscalls
//!
//! create, self, join, detach, exit
//!
//! Camada fina sobre `ThreadManager`: o erro detalhado vai para o log e o
//! chamador recebe só `-1` (ou `Tid::NONE` no create).

use alloc::sync::Arc;

use crate::sched::substrate::Substrate;
use crate::sched::thread::{Task, ThreadEntry, ThreadManager};
use crate::sys::types::Tid;

/// Cria uma thread que executa `task(argl, args)`.
///
/// Retorna o tid novo, ou `Tid::NONE` se não foi possível alocar.
pub fn sys_create_thread<S: Substrate>(
    mgr: &Arc<ThreadManager<S>>,
    task: Task,
    argl: usize,
    args: usize,
) -> Tid {
    match mgr.create_thread(ThreadEntry::from_task(task, argl, args)) {
        Ok(tid) => tid,
        Err(e) => {
            crate::kwarn!("(Syscall) sys_create_thread falhou código=", e as i32);
            Tid::NONE
        }
    }
}

/// Tid da thread chamadora.
pub fn sys_thread_self<S: Substrate>(mgr: &ThreadManager<S>) -> Tid {
    mgr.thread_self()
}

/// Espera `tid` terminar.
///
/// Em sucesso, grava o exit value em `out` (se houver) e retorna 0.
pub fn sys_thread_join<S: Substrate>(
    mgr: &ThreadManager<S>,
    tid: Tid,
    out: Option<&mut i32>,
) -> i32 {
    match mgr.thread_join(tid) {
        Ok(value) => {
            if let Some(out) = out {
                *out = value;
            }
            0
        }
        Err(e) => {
            crate::ktrace!("(Syscall) sys_thread_join erro=", e as i32);
            -1
        }
    }
}

/// Torna `tid` não-joinable. Retorna 0 ou -1.
pub fn sys_thread_detach<S: Substrate>(mgr: &ThreadManager<S>, tid: Tid) -> i32 {
    match mgr.thread_detach(tid) {
        Ok(()) => 0,
        Err(e) => {
            crate::ktrace!("(Syscall) sys_thread_detach erro=", e as i32);
            -1
        }
    }
}

/// Encerra a thread atual com `value`. Nunca retorna.
pub fn sys_thread_exit<S: Substrate>(mgr: &ThreadManager<S>, value: i32) -> ! {
    mgr.thread_exit(value)
}
