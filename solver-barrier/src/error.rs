//! Error types for barrier parameter setup.

use thiserror::Error;

/// Errors that can occur while configuring the barrier update.
///
/// All of these are setup-time failures. Once a
/// [`NonmonotoneMuUpdate`](crate::barrier::NonmonotoneMuUpdate) has been
/// constructed, the per-iteration update cannot fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BarrierError {
    /// An option value lies outside its admissible range
    #[error("Option \"{option}\" = {value}: {reason}")]
    OptionOutOfRange {
        /// Option name
        option: String,
        /// Offending value, formatted
        value: String,
        /// Admissible range
        reason: &'static str,
    },

    /// An option was stored with a different kind than the one requested
    #[error("Option \"{option}\" is not a {expected} value")]
    OptionType {
        /// Option name
        option: String,
        /// Requested kind
        expected: &'static str,
    },

    /// Unrecognised acceptance strategy selector
    #[error("Unknown adaptive globalization strategy: {0}")]
    UnknownGlobalization(String),

    /// A μ-oracle refused to initialize
    #[error("Mu oracle {oracle} failed to initialize: {reason}")]
    OracleInit {
        /// Oracle name
        oracle: &'static str,
        /// Failure description
        reason: String,
    },
}

impl BarrierError {
    pub(crate) fn out_of_range(option: &str, value: impl ToString, reason: &'static str) -> Self {
        Self::OptionOutOfRange {
            option: option.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

/// Result type for barrier setup operations.
pub type BarrierResult<T> = Result<T, BarrierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = BarrierError::out_of_range("mu_max", -1.0, "This value must be larger than 0.");
        assert_eq!(
            err.to_string(),
            "Option \"mu_max\" = -1: This value must be larger than 0."
        );
    }
}
