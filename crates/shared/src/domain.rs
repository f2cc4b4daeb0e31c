use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(WorkId);
string_id!(VenueId);

/// Review pipeline states for a submitted case. The wire form is the
/// human-readable label ("In Review"), matching what the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Pending,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
    Rejected,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 5] = [
        CaseStatus::Pending,
        CaseStatus::InReview,
        CaseStatus::Approved,
        CaseStatus::Rejected,
        CaseStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "Pending",
            CaseStatus::InReview => "In Review",
            CaseStatus::Approved => "Approved",
            CaseStatus::Rejected => "Rejected",
            CaseStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "pending" => Ok(CaseStatus::Pending),
            "in review" => Ok(CaseStatus::InReview),
            "approved" => Ok(CaseStatus::Approved),
            "rejected" => Ok(CaseStatus::Rejected),
            "closed" => Ok(CaseStatus::Closed),
            _ => Err(format!("unknown case status: {value}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_labels() {
        for status in CaseStatus::ALL {
            let encoded = serde_json::to_string(&status).expect("encode");
            let decoded: CaseStatus = serde_json::from_str(&encoded).expect("decode");
            assert_eq!(decoded, status);
        }
        assert_eq!(
            serde_json::to_string(&CaseStatus::InReview).expect("encode"),
            "\"In Review\""
        );
    }

    #[test]
    fn status_parses_cli_friendly_spellings() {
        assert_eq!(
            "in-review".parse::<CaseStatus>().ok(),
            Some(CaseStatus::InReview)
        );
        assert_eq!(
            "Pending".parse::<CaseStatus>().ok(),
            Some(CaseStatus::Pending)
        );
        assert!("archived".parse::<CaseStatus>().is_err());
    }
}
