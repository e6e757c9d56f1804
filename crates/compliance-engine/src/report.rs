//! Compliance report assembly
//!
//! Flags are appended check by check, in battery order. The builder refuses
//! malformed flags instead of dropping them, so a report always accounts for
//! every flag the battery produced.

use shared_types::{ComplianceFlag, ComplianceReport};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("flag #{index} has an empty check name")]
    MissingCheckName { index: usize },

    #[error("flag #{index} from '{check}' has an empty message")]
    MissingMessage { index: usize, check: String },

    #[error("flag #{index} claims to come from '{found}' but was returned by '{expected}'")]
    MisattributedFlag {
        index: usize,
        expected: String,
        found: String,
    },
}

/// Collects flags from each check, then builds one [`ComplianceReport`]
#[derive(Debug, Default)]
pub struct ReportBuilder {
    flags: Vec<ComplianceFlag>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one check's flags, keeping their discovery order
    pub fn add_check(
        &mut self,
        check_name: &str,
        flags: Vec<ComplianceFlag>,
    ) -> Result<&mut Self, ReportError> {
        for flag in flags {
            let index = self.flags.len();
            validate_flag(index, &flag)?;
            if flag.check_name != check_name {
                return Err(ReportError::MisattributedFlag {
                    index,
                    expected: check_name.to_string(),
                    found: flag.check_name,
                });
            }
            self.flags.push(flag);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Finish the report; `passed` is derived from flag severities
    pub fn build(self) -> ComplianceReport {
        ComplianceReport::from_flags(self.flags)
    }
}

/// Build a report from flags already in battery order
pub fn build_report(flags: Vec<ComplianceFlag>) -> Result<ComplianceReport, ReportError> {
    for (index, flag) in flags.iter().enumerate() {
        validate_flag(index, flag)?;
    }
    Ok(ComplianceReport::from_flags(flags))
}

fn validate_flag(index: usize, flag: &ComplianceFlag) -> Result<(), ReportError> {
    if flag.check_name.trim().is_empty() {
        return Err(ReportError::MissingCheckName { index });
    }
    if flag.message.trim().is_empty() {
        return Err(ReportError::MissingMessage {
            index,
            check: flag.check_name.clone(),
        });
    }
    Ok(())
}
