//! # Discovery Common Crate
//!
//! Value types shared between the endorsement analyzer, its
//! collaborators, and its callers.
//!
//! ## Modules
//! - `principal`: principals, principal sets, inquireable policies, identities
//! - `membership`: alive / channel membership views and peer identities
//! - `chaincode`: chaincode calls, interests, metadata, collection config
//! - `descriptor`: the endorsement descriptor returned to callers
//! - `error`: the endorsement error contract
//! - `config`: analyzer configuration
//!
//! ## Data Flow
//! ```text
//! ChaincodeInterest ──► ChaincodeMetadata + InquireablePolicy
//!                                │
//!                                ▼
//!                   merged PrincipalSet alternatives
//!                                │
//!        Members (alive ∩ channel) ──► EndorsementDescriptor
//! ```

pub mod chaincode;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod membership;
pub mod principal;

pub use chaincode::{
    ChaincodeCall, ChaincodeInterest, ChaincodeMetadata, CollectionConfigPackage,
    StaticCollectionConfig,
};
pub use config::{AnalyzerConfig, ConfigError};
pub use descriptor::{EndorsementDescriptor, Layout, Peer, Peers};
pub use error::{CollectionConfigError, EndorsementError};
pub use membership::{
    Envelope, InstalledChaincode, Members, NetworkMember, PeerIdentityInfo, PeerIdentitySet,
    PkiId, Properties,
};
pub use principal::{
    InquireablePolicy, MspRole, Principal, PrincipalClassification, PrincipalSet,
    SerializedIdentity,
};

/// Boxed error used at collaborator seams where the failure cause is opaque.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
