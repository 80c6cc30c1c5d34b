use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::DecimalError;

/// Tax jurisdictions a verifier can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    #[serde(rename = "US")]
    Us,
    India,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Jurisdiction::Us => "US",
            Jurisdiction::India => "INDIA",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Jurisdiction {
    type Err = VerifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "US" => Ok(Jurisdiction::Us),
            "INDIA" => Ok(Jurisdiction::India),
            _ => Err(VerifierError::UnsupportedJurisdiction(s.to_string())),
        }
    }
}

/// Misuse of the verifier facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("Unsupported jurisdiction: {0}")]
    UnsupportedJurisdiction(String),

    #[error("{operation} requires the {required} jurisdiction, verifier is bound to {bound}")]
    WrongJurisdiction {
        operation: &'static str,
        required: Jurisdiction,
        bound: Jurisdiction,
    },

    #[error("Invalid numeric argument: {0}")]
    InvalidNumber(#[from] DecimalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("us".parse::<Jurisdiction>().unwrap(), Jurisdiction::Us);
        assert_eq!(" India ".parse::<Jurisdiction>().unwrap(), Jurisdiction::India);
    }

    #[test]
    fn test_unsupported() {
        let err = "UK".parse::<Jurisdiction>().unwrap_err();
        assert_eq!(err, VerifierError::UnsupportedJurisdiction("UK".to_string()));
        assert_eq!(err.to_string(), "Unsupported jurisdiction: UK");
    }

    #[test]
    fn test_wrong_jurisdiction_message() {
        let err = VerifierError::WrongJurisdiction {
            operation: "verify_payroll",
            required: Jurisdiction::Us,
            bound: Jurisdiction::India,
        };
        assert_eq!(
            err.to_string(),
            "verify_payroll requires the US jurisdiction, verifier is bound to INDIA"
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Jurisdiction::Us).unwrap(), "\"US\"");
        assert_eq!(serde_json::to_string(&Jurisdiction::India).unwrap(), "\"INDIA\"");
    }
}
