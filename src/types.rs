use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used for initiatives published without a name
pub const NO_NAME: &str = "No name provided";

/// A validated citizen initiative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// Stable id, the join key for manual classifications
    pub id: i64,
    pub region: String,
    pub name: Option<String>,
    /// Topic code, meaning defined by the source database
    pub topic: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub year: i32,
    pub result: String,
    /// `None` means the initiative has not been processed yet
    pub status: Option<String>,
    pub province: Option<String>,
}

impl Initiative {
    /// Outcome bucket derived from the result text
    pub fn outcome(&self) -> Outcome {
        Outcome::from(self.result.as_str())
    }

    /// Name for display, [`NO_NAME`] when the source had none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_NAME)
    }

    pub fn has_status(&self) -> bool {
        self.status.is_some()
    }
}

/// Result strings counted as a positive outcome
pub const POSITIVE_RESULTS: &[&str] = &[
    "Positiv erledigt durch neuen Gemeinderatsbeschluss",
    "BE im Sinne des Begehrens",
];

/// Result strings counted as a failed initiative
pub const FAILED_RESULTS: &[&str] = &[
    "BB erreicht zu wenig Unterschriften",
    "Unzulässig",
    "Verfahrenstyp",
    "BE nicht im Sinne des Begehrens",
    "BE in Stichentscheid gescheitert",
];

/// Outcome bucket of an initiative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Positive,
    Failed,
    Other,
}

impl From<&str> for Outcome {
    fn from(s: &str) -> Self {
        if POSITIVE_RESULTS.contains(&s) {
            Outcome::Positive
        } else if FAILED_RESULTS.contains(&s) {
            Outcome::Failed
        } else {
            Outcome::Other
        }
    }
}

/// Connotation of an initiative's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connotation {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Connotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connotation::Positive => write!(f, "positive"),
            Connotation::Negative => write!(f, "negative"),
            Connotation::Neutral => write!(f, "neutral"),
        }
    }
}

/// Name-connotation counts for one outcome bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub total: usize,
    pub with_positive_name: usize,
    pub with_negative_name: usize,
    pub neutral: usize,
}

/// Summary over the whole dataset, also the export document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub without_status: usize,
    pub positive: BucketSummary,
    pub failed: BucketSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_from_result_text() {
        assert_eq!(Outcome::from("BE im Sinne des Begehrens"), Outcome::Positive);
        assert_eq!(Outcome::from("Unzulässig"), Outcome::Failed);
        assert_eq!(Outcome::from("Zurückgezogen"), Outcome::Other);
        // exact match only
        assert_eq!(Outcome::from("unzulässig"), Outcome::Other);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = Summary {
            total: 3,
            without_status: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["withoutStatus"], 1);
        assert_eq!(json["positive"]["withPositiveName"], 0);
        assert!(json["failed"].get("neutral").is_some());
    }
}
