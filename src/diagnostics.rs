//! Crate-wide error taxonomy (§7) and the
//! `"<file>(<line>): info: <message>"` diagnostic line format (§6).

use crate::ast::SourceLocation;
use crate::dependence::DependenceError;
use crate::frontend::FrontendError;
use crate::planner::PlanError;

/// Aggregates every module-local error so the driver can match a single
/// type per rejected nest. `NoSolution`/`NoIntegerSolution` (§7) are not
/// represented here: the Diophantine and Fourier–Motzkin solvers return
/// `None`/infeasible for those cases rather than a typed error, which the
/// analyzer and planner already treat as "no dependence"/"no
/// transformation" rather than a failure to propagate.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error(transparent)]
    Dependence(#[from] DependenceError),
    #[error(transparent)]
    Planner(#[from] PlanError),
}

/// Render `"<file>(<line>): info: <message>"` (§6).
pub fn format_diagnostic(location: &SourceLocation, message: &str) -> String {
    format!("{}({}): info: {}", location.file, location.line, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_line_matches_contract() {
        let loc = SourceLocation { file: "kernel.c".to_string(), line: 42, column: 5 };
        assert_eq!(format_diagnostic(&loc, "nest rejected"), "kernel.c(42): info: nest rejected");
    }

    #[test]
    fn frontend_error_converts_via_from() {
        let err: AnalysisError = FrontendError::NotPerfect.into();
        assert!(matches!(err, AnalysisError::Frontend(FrontendError::NotPerfect)));
    }
}
