//! Tipos fundamentais do sistema

/// Process ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Pid(pub u32);

impl Pid {
    pub const INIT: Pid = Pid(1);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Thread ID
///
/// Ids são únicos no sistema inteiro e nunca reutilizados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Tid(pub u32);

impl Tid {
    /// Sentinela "nenhuma thread" (NOTHREAD).
    pub const NONE: Tid = Tid(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

/// Handle opaco de um contexto de execução do scheduler.
///
/// O subsistema de threads nunca segura ponteiro para o contexto; só este id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ContextId(pub u64);

impl ContextId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}
