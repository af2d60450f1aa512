//! Core Module
//!
//! Infraestrutura comum do subsistema de threads: logging e destino
//! dos logs. Não depende de nada do scheduler.

pub mod logging;
pub mod sink;
