//! # Syscall Arguments

/// Argumentos de syscall extraídos do contexto
///
/// Convenção de registradores (x86_64):
/// - RAX: número da syscall
/// - RDI: arg1
/// - RSI: arg2
/// - RDX: arg3
/// - R10: arg4 (RCX é destruído por syscall)
/// - R8:  arg5
/// - R9:  arg6
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallArgs {
    pub num: usize,
    pub arg1: usize,
    pub arg2: usize,
    pub arg3: usize,
    pub arg4: usize,
    pub arg5: usize,
    pub arg6: usize,
}

impl SyscallArgs {
    /// Syscall com até três argumentos (todas as de thread cabem nisso).
    pub const fn new(num: usize, arg1: usize, arg2: usize, arg3: usize) -> Self {
        Self {
            num,
            arg1,
            arg2,
            arg3,
            arg4: 0,
            arg5: 0,
            arg6: 0,
        }
    }

    /// Argumentos vazios (para testes)
    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }
}
