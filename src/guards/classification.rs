use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{GuardId, GuardResult};

/// Employment classification of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerType {
    #[serde(rename = "W2")]
    Employee,
    #[serde(rename = "1099")]
    Contractor,
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerType::Employee => write!(f, "W2"),
            WorkerType::Contractor => write!(f, "1099"),
        }
    }
}

impl FromStr for WorkerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "W2" | "EMPLOYEE" => Ok(WorkerType::Employee),
            "1099" | "CONTRACTOR" => Ok(WorkerType::Contractor),
            other => Err(format!("unknown worker type: {}", other)),
        }
    }
}

/// Common-law control facts; absent facts read as false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerFacts {
    /// Behavioural control
    pub provides_tools: bool,
    /// Financial control
    pub reimburses_expenses: bool,
    /// Relationship permanence
    pub indefinite_relationship: bool,
}

/// Common-law worker classification test.
#[derive(Debug, Clone, Default)]
pub struct ClassificationGuard;

impl ClassificationGuard {
    pub fn new() -> Self {
        ClassificationGuard
    }

    pub fn verify_worker_status(&self, facts: &WorkerFacts) -> WorkerType {
        let behavioural = facts.provides_tools;
        if behavioural && (facts.reimburses_expenses || facts.indefinite_relationship) {
            WorkerType::Employee
        } else {
            WorkerType::Contractor
        }
    }

    /// Compare a claimed worker type against the control test.
    pub fn verify_classification_claim(&self, claimed: &str, facts: &WorkerFacts) -> GuardResult {
        let status = self.verify_worker_status(facts);

        match claimed.parse::<WorkerType>() {
            Ok(claim) if claim == status => GuardResult::pass(
                GuardId::WorkerClassification,
                format!("Classification {} consistent with control facts.", status),
            ),
            Ok(_) => GuardResult::fail(
                GuardId::WorkerClassification,
                format!("Misclassification risk: logic says {}, intent says {}", status, claimed),
            ),
            Err(_) => GuardResult::fail(
                GuardId::WorkerClassification,
                format!(
                    "Misclassification risk: logic says {}, intent says unrecognised type '{}'",
                    status, claimed
                ),
            ),
        }
    }
}
