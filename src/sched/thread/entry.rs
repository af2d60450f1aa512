//! Trabalho de entrada de uma thread: a função e seus dois argumentos opacos.

use alloc::sync::Arc;
use core::fmt;

/// Assinatura de task no ABI de syscall: `task(argl, args) -> exit value`.
pub type Task = fn(usize, usize) -> i32;

/// Função + argumentos capturados no Create. Imutável depois disso.
///
/// `argl` é o tamanho do blob e `args` o endereço dele no espaço de
/// endereçamento (compartilhado) do processo. O kernel não interpreta nenhum
/// dos dois.
#[derive(Clone)]
pub struct ThreadEntry {
    task: Arc<dyn Fn(usize, usize) -> i32 + Send + Sync>,
    argl: usize,
    args: usize,
}

impl ThreadEntry {
    pub fn new<F>(task: F, argl: usize, args: usize) -> Self
    where
        F: Fn(usize, usize) -> i32 + Send + Sync + 'static,
    {
        Self {
            task: Arc::new(task),
            argl,
            args,
        }
    }

    /// Entrada vinda do ABI (ponteiro de função puro).
    pub fn from_task(task: Task, argl: usize, args: usize) -> Self {
        Self::new(task, argl, args)
    }

    pub fn argl(&self) -> usize {
        self.argl
    }

    pub fn args(&self) -> usize {
        self.args
    }

    /// Executa a task e devolve o exit value.
    pub fn call(&self) -> i32 {
        (self.task)(self.argl, self.args)
    }
}

impl fmt::Debug for ThreadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadEntry")
            .field("argl", &self.argl)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
