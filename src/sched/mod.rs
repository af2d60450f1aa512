//! # Thread Lifecycle Subsystem
//!
//! Threads de usuário visíveis ao processo (create, self, join, detach, exit)
//! em cima do scheduler do Forge.
//!
//! ## Arquitetura
//! O scheduler é externo: ele só entrega contextos de execução, bloqueia e
//! acorda. Este módulo guarda a parte "lógica" de cada thread (PTCB), que
//! sobrevive ao contexto para que o exit value possa ser lido no join.
//!
//! ```text
//! ThreadManager ──► ProcessContext (por pid) ──► ThreadTable ──► ThreadRecord
//!       │
//!       └──► Substrate (spawn / block / wake / park / terminate)
//! ```
//!
//! - `config`: constantes e `ThreadConfig`
//! - `substrate`: contrato com o scheduler
//! - `tid`: alocador monotônico de tids
//! - `thread`: PTCB, tabela por processo e o gerenciador
//!
//! ## Pontos de Atenção
//! - PTCBs detached só são liberados quando o processo termina.
//! - Tids não são reciclados. Esgotar o espaço de 32 bits faz o Create falhar.

pub mod config;
pub mod substrate;
pub mod thread;
pub mod tid;



#[cfg(test)]
mod scenarios;

pub use config::ThreadConfig;
pub use substrate::{Substrate, Trampoline};
pub use thread::{ThreadEntry, ThreadManager, ThreadState};
pub use tid::TidAllocator;
