//! Post-run coverage counts.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// How much of the catalog ended up with derived content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_powers: usize,
    /// Powers with no enabled expression.
    pub without_expressions: usize,
    /// Powers with no enabled acquisition profile.
    pub without_profiles: usize,
}

impl CoverageReport {
    /// Whether every power has at least one expression and one profile.
    pub fn is_complete(&self) -> bool {
        self.without_expressions == 0 && self.without_profiles == 0
    }

    /// Log the counts; gaps are warnings, never failures.
    pub fn log(&self) {
        if self.without_expressions > 0 {
            warn!(
                missing = self.without_expressions,
                total = self.total_powers,
                "powers without expressions"
            );
        }
        if self.without_profiles > 0 {
            warn!(
                missing = self.without_profiles,
                total = self.total_powers,
                "powers without acquisition profiles"
            );
        }
        if self.is_complete() {
            info!(total = self.total_powers, "coverage complete");
        }
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total powers: {}", self.total_powers)?;
        writeln!(f, "Powers without expressions: {}", self.without_expressions)?;
        write!(f, "Powers without acquisition profiles: {}", self.without_profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_when_no_gaps() {
        let report = CoverageReport {
            total_powers: 10,
            ..Default::default()
        };
        assert!(report.is_complete());

        let gap = CoverageReport {
            without_profiles: 1,
            ..report
        };
        assert!(!gap.is_complete());
    }

    #[test]
    fn test_display() {
        let report = CoverageReport {
            total_powers: 3,
            without_expressions: 1,
            without_profiles: 0,
        };
        assert_eq!(
            report.to_string(),
            "Total powers: 3\nPowers without expressions: 1\nPowers without acquisition profiles: 0"
        );
    }
}
