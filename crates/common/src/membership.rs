//! # Membership Views
//!
//! Peer records as reported by the membership layer. Two views exist:
//!
//! - the **alive view**: every peer currently reachable, regardless of
//!   channel;
//! - the **channel view**: peers known to participate in one channel,
//!   including the chaincodes they report as installed.
//!
//! A peer is usable for endorsement only if it appears in both views
//! under the same PKI-ID.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// PKI-ID
// ════════════════════════════════════════════════════════════════════════════════

/// Opaque identifier of a peer in the membership layer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PkiId(pub Vec<u8>);

impl From<&str> for PkiId {
    fn from(s: &str) -> Self {
        PkiId(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for PkiId {
    fn from(bytes: Vec<u8>) -> Self {
        PkiId(bytes)
    }
}

impl fmt::Display for PkiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// PEER RECORDS
// ════════════════════════════════════════════════════════════════════════════════

/// A signed membership message as gossiped between peers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A chaincode a peer reports as installed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledChaincode {
    pub name: String,
    pub version: String,
}

/// Channel-scoped state a peer advertises.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub ledger_height: u64,
    pub chaincodes: Vec<InstalledChaincode>,
}

/// One peer as seen by the membership layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMember {
    pub pki_id: PkiId,
    pub endpoint: String,
    pub internal_endpoint: String,
    /// Last membership message received from the peer, if any.
    pub envelope: Option<Envelope>,
    /// `None` means the peer advertised no channel state at all.
    pub properties: Option<Properties>,
}

impl NetworkMember {
    /// Whether the peer reports `name` installed at exactly `version`.
    ///
    /// A peer without properties has nothing installed.
    #[must_use]
    pub fn has_chaincode(&self, name: &str, version: &str) -> bool {
        self.properties.as_ref().is_some_and(|props| {
            props
                .chaincodes
                .iter()
                .any(|cc| cc.name == name && cc.version == version)
        })
    }
}

/// A membership view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Members(pub Vec<NetworkMember>);

impl Members {
    pub fn iter(&self) -> impl Iterator<Item = &NetworkMember> {
        self.0.iter()
    }

    /// Index by PKI-ID. A later duplicate replaces an earlier one.
    #[must_use]
    pub fn by_id(&self) -> BTreeMap<PkiId, NetworkMember> {
        self.0
            .iter()
            .map(|m| (m.pki_id.clone(), m.clone()))
            .collect()
    }
}

impl FromIterator<NetworkMember> for Members {
    fn from_iter<I: IntoIterator<Item = NetworkMember>>(iter: I) -> Self {
        Members(iter.into_iter().collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// IDENTITIES
// ════════════════════════════════════════════════════════════════════════════════

/// Binds a PKI-ID to the identity bytes and organization behind it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentityInfo {
    /// Encoded [`SerializedIdentity`](crate::SerializedIdentity).
    pub identity: Vec<u8>,
    pub pki_id: PkiId,
    pub organization: String,
}

/// Identities of the peers known to the membership layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerIdentitySet(pub Vec<PeerIdentityInfo>);

impl PeerIdentitySet {
    #[must_use]
    pub fn by_id(&self) -> BTreeMap<PkiId, PeerIdentityInfo> {
        self.0
            .iter()
            .map(|info| (info.pki_id.clone(), info.clone()))
            .collect()
    }
}

impl FromIterator<PeerIdentityInfo> for PeerIdentitySet {
    fn from_iter<I: IntoIterator<Item = PeerIdentityInfo>>(iter: I) -> Self {
        PeerIdentitySet(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> NetworkMember {
        NetworkMember {
            pki_id: PkiId::from(id),
            endpoint: id.to_string(),
            internal_endpoint: id.to_string(),
            envelope: None,
            properties: None,
        }
    }

    fn with_cc(mut m: NetworkMember, name: &str, version: &str) -> NetworkMember {
        m.properties
            .get_or_insert_with(Properties::default)
            .chaincodes
            .push(InstalledChaincode {
                name: name.to_string(),
                version: version.to_string(),
            });
        m
    }

    #[test]
    fn test_has_chaincode_requires_exact_version() {
        let m = with_cc(member("p0"), "cc", "1.0");
        assert!(m.has_chaincode("cc", "1.0"));
        assert!(!m.has_chaincode("cc", "1.1"));
        assert!(!m.has_chaincode("other", "1.0"));
    }

    #[test]
    fn test_has_chaincode_without_properties() {
        assert!(!member("p0").has_chaincode("cc", "1.0"));
    }

    #[test]
    fn test_pki_id_display_is_hex() {
        assert_eq!(PkiId::from("p1").to_string(), "7031");
    }
}
