//! Constantes de configuração do subsistema de threads

/// Primeiro tid entregue pelo alocador (0 = NOTHREAD, 1 = reservado)
pub const TID_FIRST: u32 = 2;

/// Maior tid válido. Passado disso, Create falha em vez de reutilizar ids.
pub const TID_MAX: u32 = u32::MAX;

/// Limite padrão de PTCBs vivos por processo (threads ativas + não colhidas)
pub const MAX_THREADS_PER_PROCESS: usize = 1024;

/// Configuração do gerenciador de threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Primeiro tid a ser alocado
    pub first_tid: u32,
    /// Máximo de PTCBs vivos por processo
    pub max_threads_per_process: usize,
}

impl ThreadConfig {
    pub const fn new() -> Self {
        Self {
            first_tid: TID_FIRST,
            max_threads_per_process: MAX_THREADS_PER_PROCESS,
        }
    }

    pub const fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads_per_process = max;
        self
    }

    pub const fn with_first_tid(mut self, first: u32) -> Self {
        self.first_tid = first;
        self
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self::new()
    }
}
