//! # Endorsement Error Types
//!
//! `EndorsementError` is the public error contract of the endorsement
//! analyzer. Every failure is terminal for the current request: the
//! caller receives exactly one error, never a partial descriptor.
//!
//! | Category | Variants |
//! |----------|----------|
//! | Ledger | `PolicyNotFound`, `MetadataNotFound`, `MalformedCollectionConfig` |
//! | Combination | `NoPrincipalSetsRemain`, `PrincipalSetLimitExceeded` |
//! | Peers | `NoSatisfiableCombination`, `InsufficientChaincodeInstallation` |
//! | Runtime | `LoaderTaskFailed` |
//!
//! ## Display Messages
//!
//! Messages are stable and are matched on by callers and tests.
//! Do not reword them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// COLLECTION CONFIG ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Why a chaincode's collection configuration could not be used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionConfigError {
    /// The raw configuration bytes failed to decode.
    InvalidBytes(String),

    /// A collection named in the call is not configured for the chaincode.
    MissingCollection {
        collection: String,
        chaincode: String,
    },
}

impl fmt::Display for CollectionConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionConfigError::InvalidBytes(reason) => {
                write!(f, "invalid collection bytes: {}", reason)
            }
            CollectionConfigError::MissingCollection {
                collection,
                chaincode,
            } => {
                write!(
                    f,
                    "collection {} doesn't exist in collection config for chaincode {}",
                    collection, chaincode
                )
            }
        }
    }
}

impl std::error::Error for CollectionConfigError {}

// ════════════════════════════════════════════════════════════════════════════════
// ENDORSEMENT ERROR
// ════════════════════════════════════════════════════════════════════════════════

/// Failure of a `peers_for_endorsement` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndorsementError {
    /// No endorsement policy is registered for the chaincode.
    PolicyNotFound { chaincode: String },

    /// The ledger holds no deployment metadata for the chaincode.
    MetadataNotFound { chaincode: String, channel: String },

    /// Collection configuration is undecodable or lacks a requested
    /// collection.
    MalformedCollectionConfig(CollectionConfigError),

    /// Filtering and merging left no principal combination to try.
    /// Also returned for an interest without chaincode calls.
    NoPrincipalSetsRemain,

    /// Combinations exist but none can be matched to live peers.
    NoSatisfiableCombination,

    /// Combinations exist and the organizations are present, but too few
    /// of their peers run the recorded chaincode versions.
    InsufficientChaincodeInstallation,

    /// A merge step produced more principal sets than configured.
    PrincipalSetLimitExceeded { limit: usize },

    /// A concurrent loader task did not complete.
    LoaderTaskFailed { chaincode: String, reason: String },
}

impl fmt::Display for EndorsementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndorsementError::PolicyNotFound { .. } => {
                write!(f, "policy not found")
            }
            EndorsementError::MetadataNotFound { chaincode, channel } => {
                write!(
                    f,
                    "No metadata was found for chaincode {} in channel {}",
                    chaincode, channel
                )
            }
            EndorsementError::MalformedCollectionConfig(inner) => {
                write!(f, "{}", inner)
            }
            EndorsementError::NoPrincipalSetsRemain => {
                write!(f, "no principal sets remained after filtering")
            }
            EndorsementError::NoSatisfiableCombination => {
                write!(f, "cannot satisfy any principal combination")
            }
            EndorsementError::InsufficientChaincodeInstallation => {
                write!(
                    f,
                    "chaincode isn't installed on sufficient organizations required by the endorsement policy"
                )
            }
            EndorsementError::PrincipalSetLimitExceeded { limit } => {
                write!(
                    f,
                    "merged principal sets exceed the configured limit of {}",
                    limit
                )
            }
            EndorsementError::LoaderTaskFailed { chaincode, reason } => {
                write!(f, "loading chaincode {} failed: {}", chaincode, reason)
            }
        }
    }
}

impl std::error::Error for EndorsementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EndorsementError::MalformedCollectionConfig(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<CollectionConfigError> for EndorsementError {
    fn from(err: CollectionConfigError) -> Self {
        EndorsementError::MalformedCollectionConfig(err)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_policy_not_found() {
        let err = EndorsementError::PolicyNotFound {
            chaincode: "cc".to_string(),
        };
        assert_eq!(err.to_string(), "policy not found");
    }

    #[test]
    fn test_display_metadata_not_found() {
        let err = EndorsementError::MetadataNotFound {
            chaincode: "chaincode".to_string(),
            channel: "test".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No metadata was found for chaincode chaincode in channel test"
        );
    }

    #[test]
    fn test_display_combination_errors() {
        assert_eq!(
            EndorsementError::NoPrincipalSetsRemain.to_string(),
            "no principal sets remained after filtering"
        );
        assert_eq!(
            EndorsementError::NoSatisfiableCombination.to_string(),
            "cannot satisfy any principal combination"
        );
        assert_eq!(
            EndorsementError::InsufficientChaincodeInstallation.to_string(),
            "chaincode isn't installed on sufficient organizations required by the endorsement policy"
        );
    }

    #[test]
    fn test_collection_errors_wrap() {
        let err: EndorsementError =
            CollectionConfigError::InvalidBytes("unexpected end of file".to_string()).into();
        assert_eq!(
            err.to_string(),
            "invalid collection bytes: unexpected end of file"
        );
        assert!(std::error::Error::source(&err).is_some());

        let err: EndorsementError = CollectionConfigError::MissingCollection {
            collection: "col1".to_string(),
            chaincode: "mycc".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "collection col1 doesn't exist in collection config for chaincode mycc"
        );
    }
}
