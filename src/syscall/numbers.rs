//! # Syscall Numbers (threads)
//!
//! Faixa de processo (0x01-0x0F). Os números 0x01-0x06 pertencem às syscalls
//! de processo do kernel e não são tratados aqui.
//!
//! **ATENÇÃO**: NÃO é compatível com Linux, POSIX ou qualquer outro sistema.

/// Cria uma thread no processo atual.
/// Args: (task_ptr, argl, args)
/// Retorno: tid, ou 0 (NOTHREAD) em falha
pub const SYS_THREAD_CREATE: usize = 0x07;

/// Tid da thread atual.
/// Args: nenhum
/// Retorno: tid
pub const SYS_THREAD_SELF: usize = 0x08;

/// Espera uma thread terminar.
/// Args: (tid, exit_value_ptr) - ponteiro pode ser nulo
/// Retorno: 0 ou -1
pub const SYS_THREAD_JOIN: usize = 0x09;

/// Torna uma thread não-joinable.
/// Args: (tid)
/// Retorno: 0 ou -1
pub const SYS_THREAD_DETACH: usize = 0x0A;

/// Encerra a thread atual.
/// Args: (exit_value: i32)
/// Retorno: Nunca retorna
pub const SYS_THREAD_EXIT: usize = 0x0B;

/// Nome para logs
pub const fn syscall_name(num: usize) -> &'static str {
    match num {
        SYS_THREAD_CREATE => "thread_create",
        SYS_THREAD_SELF => "thread_self",
        SYS_THREAD_JOIN => "thread_join",
        SYS_THREAD_DETACH => "thread_detach",
        SYS_THREAD_EXIT => "thread_exit",
        _ => "unknown",
    }
}
