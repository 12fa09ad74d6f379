//! The typed validation failure.

use crate::error::Violations;
use crate::report::Report;

/// Data failed validation.
///
/// This is the one failure consumers are expected to handle as a normal
/// outcome. It carries the complete, shape-preserving [`Report`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("data validation failed with {} violation(s)", .report.violation_count())]
pub struct ValidationError {
    report: Report,
}

impl ValidationError {
    /// Wraps a report.
    pub fn new(report: Report) -> Self {
        Self { report }
    }

    /// Returns the report.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Consumes the error and returns the report.
    pub fn into_report(self) -> Report {
        self.report
    }

    /// Flattens the report into path-tagged violations.
    ///
    /// Returns `None` only for a report without any message, which the
    /// validator never produces.
    pub fn violations(&self) -> Option<Violations> {
        Violations::from_vec(self.report.violations())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};
