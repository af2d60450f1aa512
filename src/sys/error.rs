//! Códigos de Erro do subsistema de threads
//!
//! Todos os erros são tratados localmente pela operação que os detecta e
//! devolvidos ao chamador imediato. Nenhum deles encerra o processo.
//! Na fronteira de syscall viram `-1` / `Tid::NONE`.

use core::fmt;

/// Erros das operações de ciclo de vida de threads.
///
/// Valores são i32 para permitir representação negativa em isize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ThreadError {
    /// Falha ao alocar o PTCB (memória, limite de threads, tids esgotados
    /// ou scheduler sem contexto livre)
    AllocationFailure = 1,
    /// Thread tentou fazer join em si mesma
    InvalidSelfJoin = 2,
    /// Tid não pertence ao processo do chamador (ou já foi colhido)
    UnknownTarget = 3,
    /// Alvo existe mas foi detached
    NotJoinable = 4,
    /// Detach recusado (processo com menos de duas threads ativas ou alvo já terminou)
    DetachIneligible = 5,
    /// Contexto chamador não está associado a nenhuma thread
    NoCurrentThread = 6,
    /// Processo já possui contexto de threads
    ProcessExists = 7,
}

/// Result padrão do subsistema de threads
pub type ThreadResult<T> = Result<T, ThreadError>;

impl ThreadError {
    /// Converte para isize negativo (formato de retorno da syscall)
    #[inline]
    pub fn as_isize(self) -> isize {
        -(self as i32 as isize)
    }

    /// Cria erro a partir de código negativo
    pub fn from_code(code: isize) -> Option<Self> {
        match -code {
            1 => Some(Self::AllocationFailure),
            2 => Some(Self::InvalidSelfJoin),
            3 => Some(Self::UnknownTarget),
            4 => Some(Self::NotJoinable),
            5 => Some(Self::DetachIneligible),
            6 => Some(Self::NoCurrentThread),
            7 => Some(Self::ProcessExists),
            _ => None,
        }
    }

    /// Nome curto para logs (sem core::fmt)
    pub const fn name(self) -> &'static str {
        match self {
            Self::AllocationFailure => "AllocationFailure",
            Self::InvalidSelfJoin => "InvalidSelfJoin",
            Self::UnknownTarget => "UnknownTarget",
            Self::NotJoinable => "NotJoinable",
            Self::DetachIneligible => "DetachIneligible",
            Self::NoCurrentThread => "NoCurrentThread",
            Self::ProcessExists => "ProcessExists",
        }
    }
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::AllocationFailure => "out of memory for thread record",
            Self::InvalidSelfJoin => "a thread cannot join itself",
            Self::UnknownTarget => "no such thread in this process",
            Self::NotJoinable => "thread is detached",
            Self::DetachIneligible => "thread cannot be detached",
            Self::NoCurrentThread => "caller is not a managed thread",
            Self::ProcessExists => "process already has a thread context",
        };
        f.write_str(msg)
    }
}
