//! Framework de testes embarcado
//!
//! Suites que rodam dentro do kernel (feature `self_test`), sem o harness do
//! `cargo test`. Cada caso é uma função simples que devolve `TestResult`.

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

impl TestResult {
    /// `Passed` se `cond`, senão `Failed`.
    #[inline]
    pub const fn check(cond: bool) -> Self {
        if cond {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Placar de uma suite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteReport {
    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Executa suite de testes
pub fn run_test_suite(name: &str, tests: &[TestCase]) -> SuiteReport {
    crate::klog!("=== Executando suite: ");
    crate::klog!(name);
    crate::knl!();

    let mut report = SuiteReport::default();

    for test in tests {
        match (test.func)() {
            TestResult::Passed => {
                report.passed += 1;
                crate::kok!(test.name);
            }
            TestResult::Failed => {
                report.failed += 1;
                crate::kfail!(test.name);
            }
            TestResult::Skipped => {
                report.skipped += 1;
                crate::kwarn!(test.name);
            }
        }
    }

    crate::kinfo!("Resultados: passed=", report.passed);
    if report.failed > 0 {
        crate::kerror!("Resultados: failed=", report.failed);
    }
    report
}
