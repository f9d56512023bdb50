//! # Policy & Metadata Loader
//!
//! Resolves one chaincode call into everything the analyzer needs from
//! the ledger:
//!
//! 1. deployment metadata (name, version, raw collection config);
//! 2. a collection filter, when the call names collections;
//! 3. the chaincode's endorsement policy.
//!
//! Every failure is terminal for the whole interest. Metadata is checked
//! first, then collections (undecodable bytes fail before the named
//! collections are looked up), then the policy.

use std::sync::Arc;

use tracing::{debug, warn};

use disco_common::{
    ChaincodeCall, ChaincodeMetadata, CollectionConfigError, CollectionConfigPackage,
    EndorsementError, InquireablePolicy, Principal, PrincipalSet,
};

use crate::principal_sets::intersect_with_collection_policy;
use crate::support::{MetadataFetcher, PolicyFetcher, PrincipalEvaluator};

// ════════════════════════════════════════════════════════════════════════════════
// COLLECTION FILTER
// ════════════════════════════════════════════════════════════════════════════════

/// Member principals of every collection named in a call.
///
/// An alternative passes the filter only if each named collection
/// permits all of its principals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    collections: Vec<(String, Vec<Principal>)>,
}

impl CollectionFilter {
    /// A filter that lets every alternative through.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Builds the filter for `call` from raw collection configuration.
    ///
    /// # Errors
    ///
    /// - [`CollectionConfigError::InvalidBytes`] when `raw` does not decode.
    /// - [`CollectionConfigError::MissingCollection`] when a named
    ///   collection is not configured.
    pub fn from_config(call: &ChaincodeCall, raw: &[u8]) -> Result<Self, CollectionConfigError> {
        let package = CollectionConfigPackage::from_bytes(raw)?;
        let by_name = package.principals_by_collection();
        let mut collections = Vec::with_capacity(call.collection_names.len());
        for name in &call.collection_names {
            let members = by_name.get(name).ok_or_else(|| {
                CollectionConfigError::MissingCollection {
                    collection: name.clone(),
                    chaincode: call.name.clone(),
                }
            })?;
            collections.push((name.clone(), members.clone()));
        }
        Ok(Self { collections })
    }

    /// Drops the alternatives some named collection does not permit.
    #[must_use]
    pub fn apply(
        &self,
        alternatives: Vec<PrincipalSet>,
        evaluator: &dyn PrincipalEvaluator,
    ) -> Vec<PrincipalSet> {
        self.collections
            .iter()
            .fold(alternatives, |remaining, (name, members)| {
                let before = remaining.len();
                let after = intersect_with_collection_policy(remaining, members, |p| {
                    evaluator.msp_of_principal(p)
                });
                debug!(
                    "collection {} kept {} of {} principal sets",
                    name,
                    after.len(),
                    before
                );
                after
            })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// LOADED CHAINCODE
// ════════════════════════════════════════════════════════════════════════════════

/// Result of loading one chaincode call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedChaincode {
    pub metadata: ChaincodeMetadata,
    pub policy: InquireablePolicy,
    pub filter: CollectionFilter,
}

impl LoadedChaincode {
    /// The policy's alternatives that survive the collection filter.
    #[must_use]
    pub fn principal_sets(&self, evaluator: &dyn PrincipalEvaluator) -> Vec<PrincipalSet> {
        self.filter.apply(self.policy.satisfied_by().to_vec(), evaluator)
    }

    /// The (name, version) peers must have installed.
    #[must_use]
    pub fn required_chaincode(&self) -> (String, String) {
        (self.metadata.name.clone(), self.metadata.version.clone())
    }
}

/// Loads metadata, collection filter, and policy for one call.
///
/// # Errors
///
/// - [`EndorsementError::MetadataNotFound`]
/// - [`EndorsementError::MalformedCollectionConfig`]
/// - [`EndorsementError::PolicyNotFound`]
pub fn load_metadata_and_filters(
    channel: &str,
    call: &ChaincodeCall,
    metadata: &dyn MetadataFetcher,
    policies: &dyn PolicyFetcher,
) -> Result<LoadedChaincode, EndorsementError> {
    let with_collections = !call.collection_names.is_empty();
    let md = metadata
        .metadata(channel, &call.name, with_collections)
        .ok_or_else(|| EndorsementError::MetadataNotFound {
            chaincode: call.name.clone(),
            channel: channel.to_string(),
        })?;

    let filter = if with_collections {
        CollectionFilter::from_config(call, &md.collections_config).map_err(|e| {
            warn!(
                "failed initializing collection filter for chaincode {}: {}",
                call.name, e
            );
            EndorsementError::from(e)
        })?
    } else {
        CollectionFilter::allow_all()
    };

    let policy = policies
        .policy_by_chaincode(channel, &call.name)
        .ok_or_else(|| {
            debug!("policy for chaincode {} doesn't exist", call.name);
            EndorsementError::PolicyNotFound {
                chaincode: call.name.clone(),
            }
        })?;

    Ok(LoadedChaincode {
        metadata: md,
        policy,
        filter,
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// LEDGER POLICY FETCHER
// ════════════════════════════════════════════════════════════════════════════════

/// [`PolicyFetcher`] that decodes the policy bytes recorded in chaincode
/// metadata.
///
/// Missing metadata and undecodable policy bytes both read as "no
/// policy"; the latter is logged.
#[derive(Clone)]
pub struct LedgerPolicyFetcher {
    metadata: Arc<dyn MetadataFetcher>,
}

impl LedgerPolicyFetcher {
    #[must_use]
    pub fn new(metadata: Arc<dyn MetadataFetcher>) -> Self {
        Self { metadata }
    }
}

impl PolicyFetcher for LedgerPolicyFetcher {
    fn policy_by_chaincode(&self, channel: &str, chaincode: &str) -> Option<InquireablePolicy> {
        let md = self.metadata.metadata(channel, chaincode, false)?;
        match InquireablePolicy::from_bytes(&md.policy) {
            Ok(policy) => Some(policy),
            Err(e) => {
                warn!(
                    "malformed policy bytes for chaincode {} in channel {}: {}",
                    chaincode, channel, e
                );
                None
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════
