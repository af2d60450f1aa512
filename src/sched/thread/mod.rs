//! Threads de usuário
//!
//! Threads leves que compartilham o espaço de endereçamento do processo.
//! Cada thread lógica tem um PTCB (`ThreadRecord`) ligado a um contexto de
//! execução do scheduler.

pub mod entry;
pub mod manager;
pub mod process;
pub mod record;
pub mod table;

pub use entry::{Task, ThreadEntry};
pub use manager::{Binding, ThreadManager};
pub use process::{ProcessContext, ProcessInfo};
pub use record::{ThreadFlags, ThreadRecord, ThreadState};
pub use table::{RecordHandle, ThreadTable};
