//! Dispatcher Central de Syscalls de thread
//!
//! Roteia baseado no número da syscall para `syscall::thread`.
//! O retorno vai em RAX: tid / 0 / -1 conforme a syscall.

use alloc::sync::Arc;

use super::abi::SyscallArgs;
use super::numbers::*;
use super::thread::{
    sys_create_thread, sys_thread_detach, sys_thread_exit, sys_thread_join, sys_thread_self,
};
use crate::sched::substrate::Substrate;
use crate::sched::thread::{Task, ThreadManager};
use crate::sys::types::Tid;

/// Executa a syscall descrita por `args` no contexto do chamador.
///
/// Número desconhecido retorna `-1`.
pub fn dispatch<S: Substrate>(mgr: &Arc<ThreadManager<S>>, args: &SyscallArgs) -> isize {
    crate::ktrace!("(Syscall) num=", args.num);
    crate::ktrace!("(Syscall) arg1=", args.arg1);
    crate::ktrace!("(Syscall) arg2=", args.arg2);

    match args.num {
        SYS_THREAD_CREATE => sys_create_thread_wrapper(mgr, args),
        SYS_THREAD_SELF => sys_thread_self(mgr).as_u32() as isize,
        SYS_THREAD_JOIN => sys_thread_join_wrapper(mgr, args),
        SYS_THREAD_DETACH => match tid_arg(args.arg1) {
            Some(tid) => sys_thread_detach(mgr, tid) as isize,
            None => -1,
        },
        SYS_THREAD_EXIT => sys_thread_exit(mgr, args.arg1 as i32),
        _ => {
            crate::kwarn!("(Syscall) Syscall desconhecida num=", args.num);
            -1
        }
    }
}

// === WRAPPERS ===

fn sys_create_thread_wrapper<S: Substrate>(mgr: &Arc<ThreadManager<S>>, args: &SyscallArgs) -> isize {
    if args.arg1 == 0 {
        crate::kwarn!("(Syscall) sys_create_thread: task nula");
        return Tid::NONE.as_u32() as isize;
    }
    // SAFETY: arg1 é o endereço de uma função `extern` do processo com a
    // assinatura de `Task`; o espaço de endereçamento é compartilhado.
    let task: Task = unsafe { core::mem::transmute::<usize, Task>(args.arg1) };
    sys_create_thread(mgr, task, args.arg2, args.arg3).as_u32() as isize
}

fn sys_thread_join_wrapper<S: Substrate>(mgr: &ThreadManager<S>, args: &SyscallArgs) -> isize {
    let Some(tid) = tid_arg(args.arg1) else {
        return -1;
    };
    let mut value = 0i32;
    let status = sys_thread_join(mgr, tid, Some(&mut value));

    let out = args.arg2 as *mut i32;
    if status == 0 && !out.is_null() {
        // SAFETY: ponteiro não nulo fornecido pelo chamador para um i32
        // alinhado no espaço do processo.
        unsafe { out.write(value) };
    }
    status as isize
}

/// Tid vindo de registrador. Valores acima de 32 bits não são tids.
#[inline]
fn tid_arg(raw: usize) -> Option<Tid> {
    match u32::try_from(raw) {
        Ok(tid) => Some(Tid::new(tid)),
        Err(_) => {
            crate::kwarn!("(Syscall) tid fora do intervalo raw=", raw);
            None
        }
    }
}
