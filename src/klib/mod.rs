//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do subsistema.

#[cfg(any(test, feature = "self_test"))]
pub mod test_framework;
