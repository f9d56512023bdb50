//! # Chaincode Calls and Metadata
//!
//! What a caller asks about ([`ChaincodeInterest`]) and what the ledger
//! records about each deployed chaincode ([`ChaincodeMetadata`],
//! [`CollectionConfigPackage`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CollectionConfigError;
use crate::principal::Principal;

// ════════════════════════════════════════════════════════════════════════════════
// INTEREST
// ════════════════════════════════════════════════════════════════════════════════

/// One chaincode invocation, optionally restricted to private data
/// collections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeCall {
    pub name: String,
    pub collection_names: Vec<String>,
}

impl ChaincodeCall {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_collections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collection_names.extend(names.into_iter().map(Into::into));
        self
    }
}

/// The chaincode calls of one logical transaction, in invocation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeInterest {
    pub chaincodes: Vec<ChaincodeCall>,
}

impl ChaincodeInterest {
    #[must_use]
    pub fn new(chaincodes: Vec<ChaincodeCall>) -> Self {
        Self { chaincodes }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// METADATA
// ════════════════════════════════════════════════════════════════════════════════

/// Deployment record of a chaincode on a channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeMetadata {
    pub name: String,
    pub version: String,
    /// Encoded [`InquireablePolicy`](crate::InquireablePolicy).
    pub policy: Vec<u8>,
    /// Encoded [`CollectionConfigPackage`]; empty when the chaincode
    /// defines no collections.
    pub collections_config: Vec<u8>,
}

impl ChaincodeMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// COLLECTIONS
// ════════════════════════════════════════════════════════════════════════════════

/// Static configuration of one private data collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCollectionConfig {
    pub name: String,
    /// Principals allowed to hold the collection's data.
    pub member_orgs: Vec<Principal>,
    pub required_peer_count: i32,
    pub maximum_peer_count: i32,
    pub block_to_live: u64,
    pub member_only_read: bool,
}

impl StaticCollectionConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, member_orgs: Vec<Principal>) -> Self {
        Self {
            name: name.into(),
            member_orgs,
            required_peer_count: 0,
            maximum_peer_count: 0,
            block_to_live: 0,
            member_only_read: false,
        }
    }
}

/// All collections defined for a chaincode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfigPackage {
    pub configs: Vec<StaticCollectionConfig>,
}

impl CollectionConfigPackage {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decodes the package stored in chaincode metadata.
    ///
    /// # Errors
    ///
    /// [`CollectionConfigError::InvalidBytes`] for empty or undecodable input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CollectionConfigError> {
        if bytes.is_empty() {
            return Err(CollectionConfigError::InvalidBytes(
                "empty collection config".to_string(),
            ));
        }
        bincode::deserialize(bytes).map_err(|e| CollectionConfigError::InvalidBytes(e.to_string()))
    }

    /// Member principals keyed by collection name. A repeated name keeps
    /// its last definition.
    #[must_use]
    pub fn principals_by_collection(&self) -> BTreeMap<String, Vec<Principal>> {
        self.configs
            .iter()
            .map(|cfg| (cfg.name.clone(), cfg.member_orgs.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_package_rejects_garbage() {
        let err = CollectionConfigPackage::from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(err.to_string().starts_with("invalid collection bytes"));
    }

    #[test]
    fn test_collection_package_rejects_empty() {
        assert!(matches!(
            CollectionConfigPackage::from_bytes(&[]),
            Err(CollectionConfigError::InvalidBytes(_))
        ));
    }

    #[test]
    fn test_principals_by_collection() {
        let pkg = CollectionConfigPackage {
            configs: vec![
                StaticCollectionConfig::new("c1", vec![Principal::peer_of("Org0MSP")]),
                StaticCollectionConfig::new(
                    "c2",
                    vec![Principal::peer_of("Org1MSP"), Principal::peer_of("Org2MSP")],
                ),
            ],
        };
        let bytes = pkg.to_bytes().expect("encode");
        let by_name = CollectionConfigPackage::from_bytes(&bytes)
            .expect("decode")
            .principals_by_collection();
        assert_eq!(by_name.len(), 2);
        assert_eq!(by_name["c2"].len(), 2);
    }

    #[test]
    fn test_call_builder() {
        let call = ChaincodeCall::new("mycc").with_collections(["col1", "col2"]);
        assert_eq!(call.collection_names, vec!["col1", "col2"]);
    }
}
