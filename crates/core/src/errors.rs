use thiserror::Error;

use crate::domain::price_record::{PriceRecordId, Validity};

/// Errors local to a single operation: one record save or one line recompute.
/// Nothing here retries; persistence failures belong to the external store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validity {candidate} overlaps record {existing_id} with validity {existing}")]
    Overlap { existing_id: PriceRecordId, existing: Validity, candidate: Validity },
    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },
}

impl DomainError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Overlap { .. } => {
                "The validity period overlaps an existing price record. Adjust the dates and try again."
            }
            Self::InvalidInput { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::price_record::{PriceRecordId, Validity};

    use super::DomainError;

    #[test]
    fn overlap_error_names_both_intervals() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let until = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
        let error = DomainError::Overlap {
            existing_id: PriceRecordId("pr-1".to_owned()),
            existing: Validity::bounded(from, until),
            candidate: Validity::open_ended(from),
        };

        assert_eq!(
            error.to_string(),
            "validity [2024-01-01, open) overlaps record pr-1 with validity [2024-01-01, 2024-06-30]"
        );
    }

    #[test]
    fn errors_carry_a_user_safe_message() {
        let error = DomainError::InvalidInput {
            field: "quantity",
            message: "must not be negative".to_owned(),
        };

        assert_eq!(
            error.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }
}
