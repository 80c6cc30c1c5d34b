use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::result::GuardResult;

/// Aggregate outcome of one audit run.
///
/// `allowed` is true iff `blocks` is empty. Blocks keep the fixed
/// evaluation order of the pipeline and are never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReportRecord")]
pub struct AuditReport {
    allowed: bool,
    blocks: SmallVec<[String; 4]>,
    /// Checks that fired, in evaluation order
    evaluated: Vec<String>,
}

/// Serialized form, checked before it becomes a report.
#[derive(Deserialize)]
struct ReportRecord {
    allowed: bool,
    #[serde(default)]
    blocks: SmallVec<[String; 4]>,
    #[serde(default)]
    evaluated: Vec<String>,
}

impl TryFrom<ReportRecord> for AuditReport {
    type Error = String;

    fn try_from(record: ReportRecord) -> Result<Self, Self::Error> {
        if record.allowed != record.blocks.is_empty() {
            return Err(format!(
                "allowed = {} contradicts {} recorded blocks",
                record.allowed,
                record.blocks.len()
            ));
        }
        Ok(AuditReport {
            allowed: record.allowed,
            blocks: record.blocks,
            evaluated: record.evaluated,
        })
    }
}

impl AuditReport {
    /// An empty report: nothing applied, so the intent is allowed.
    pub fn new() -> Self {
        AuditReport {
            allowed: true,
            blocks: SmallVec::new(),
            evaluated: Vec::new(),
        }
    }

    /// Fold one check outcome into the report.
    pub fn record(&mut self, check_id: &str, result: &GuardResult) {
        self.evaluated.push(check_id.to_string());
        if !result.verified {
            self.blocks.push(result.block_message());
            self.allowed = false;
        }
    }

    #[inline]
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn evaluated(&self) -> &[String] {
        &self.evaluated
    }
}

impl Default for AuditReport {
    fn default() -> Self {
        AuditReport::new()
    }
}
