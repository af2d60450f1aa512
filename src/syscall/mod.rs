//! # System Call Interface
//!
//! Fronteira userspace → subsistema de threads.
//!
//! - `abi`: argumentos crus (registradores)
//! - `numbers`: números das syscalls de thread
//! - `thread`: implementações (erros viram `-1` / `Tid::NONE`)
//! - `dispatch`: roteamento número → implementação
//!
//! **ATENÇÃO**: Esta numeração é EXCLUSIVA do Redstone OS.

pub mod abi;
pub mod dispatch;
pub mod numbers;
pub mod thread;

pub use abi::SyscallArgs;
pub use dispatch::dispatch;
