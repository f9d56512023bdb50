//! # Endorsement Analysis
//!
//! Answers "which groups of peers, and how many from each, can endorse
//! this chaincode interest?" from live membership and ledger state.
//!
//! ## Modules
//!
//! - `support`: collaborator traits (membership, policies, metadata,
//!   principal evaluation)
//! - `principal_sets`: canonical principal sets, collection intersection,
//!   cross-chaincode merge
//! - `loader`: per-call metadata, collection filter, and policy loading
//! - `matcher`: matching principals to peers present in both membership
//!   views with the right chaincode versions
//! - `analyzer`: the `peers_for_endorsement` orchestrator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use disco_common::{ChaincodeCall, ChaincodeInterest};
//! use disco_endorsement::EndorsementAnalyzer;
//!
//! let analyzer = EndorsementAnalyzer::new(membership, policies, evaluator, metadata);
//! let interest = ChaincodeInterest::new(vec![ChaincodeCall::new("mycc")]);
//! let descriptor = analyzer.peers_for_endorsement("mychannel", &interest)?;
//! for layout in &descriptor.layouts {
//!     // pick `quantity` peers from each group
//! }
//! ```

pub mod analyzer;
pub mod loader;
pub mod matcher;
pub mod principal_sets;
pub mod support;

pub use analyzer::{compute_principal_sets, EndorsementAnalyzer};
pub use loader::{load_metadata_and_filters, CollectionFilter, LedgerPolicyFetcher, LoadedChaincode};
pub use matcher::{Candidate, GroupRequirement, MatchOutcome, PeerMatcher};
pub use principal_sets::{
    canonicalize, canonicalize_all, intersect_with_collection_policy, merge_principal_sets,
    pop_principal_sets, ComparablePrincipalSet,
};
pub use support::{MembershipProvider, MetadataFetcher, PolicyFetcher, PrincipalEvaluator};
