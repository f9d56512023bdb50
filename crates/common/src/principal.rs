//! # Identity Principals
//!
//! Value types describing *who* may endorse: a [`Principal`] asserts
//! "any identity of organization `msp_id` holding `role`", a
//! [`PrincipalSet`] is an AND of principals, and an
//! [`InquireablePolicy`] is an OR over principal sets.
//!
//! ## Multiplicity
//!
//! Repetition inside a `PrincipalSet` is meaningful. The same principal
//! appearing twice requires two *distinct* peers satisfying it.
//!
//! ## Encoding
//!
//! Policies and serialized identities travel as raw bytes through the
//! ledger and membership layers. Both use bincode, which produces the
//! same bytes for the same value on every platform.

use std::fmt;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// PRINCIPAL
// ════════════════════════════════════════════════════════════════════════════════

/// How the principal identifies its members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrincipalClassification {
    /// Members holding a role inside an organization.
    Role,
    /// Members of an organizational unit.
    OrganizationUnit,
    /// One specific identity.
    Identity,
}

/// Role of an identity within its organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MspRole {
    Member,
    Admin,
    Client,
    Peer,
    Orderer,
}

impl fmt::Display for MspRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MspRole::Member => "member",
            MspRole::Admin => "admin",
            MspRole::Client => "client",
            MspRole::Peer => "peer",
            MspRole::Orderer => "orderer",
        };
        f.write_str(name)
    }
}

/// An assertion that an identity belongs to organization `msp_id`
/// with role `role`.
///
/// Ordering is (classification, msp_id, role). The ordering carries no
/// meaning beyond giving principal sets a canonical form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub classification: PrincipalClassification,
    pub msp_id: String,
    pub role: MspRole,
}

impl Principal {
    /// A role principal: any identity of `msp_id` holding `role`.
    #[must_use]
    pub fn role(msp_id: impl Into<String>, role: MspRole) -> Self {
        Self {
            classification: PrincipalClassification::Role,
            msp_id: msp_id.into(),
            role,
        }
    }

    /// Shorthand for a peer-role principal of `msp_id`.
    #[must_use]
    pub fn peer_of(msp_id: impl Into<String>) -> Self {
        Self::role(msp_id, MspRole::Peer)
    }

    /// Shorthand for a member-role principal of `msp_id`.
    #[must_use]
    pub fn member_of(msp_id: impl Into<String>) -> Self {
        Self::role(msp_id, MspRole::Member)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.msp_id, self.role)
    }
}

/// Principals that must all be satisfied, each by a distinct peer.
pub type PrincipalSet = Vec<Principal>;

// ════════════════════════════════════════════════════════════════════════════════
// INQUIREABLE POLICY
// ════════════════════════════════════════════════════════════════════════════════

/// An endorsement policy expressed as alternative principal sets.
///
/// The policy is satisfied when any one of its principal sets is
/// fully satisfied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquireablePolicy {
    principal_sets: Vec<PrincipalSet>,
}

impl InquireablePolicy {
    #[must_use]
    pub fn new(principal_sets: Vec<PrincipalSet>) -> Self {
        Self { principal_sets }
    }

    /// The alternative principal sets, in policy order.
    #[must_use]
    pub fn satisfied_by(&self) -> &[PrincipalSet] {
        &self.principal_sets
    }

    /// Encodes the policy as stored in chaincode metadata.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decodes a policy from raw chaincode metadata bytes.
    ///
    /// Empty input is rejected rather than read as an empty policy.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        if bytes.is_empty() {
            return Err(Box::new(bincode::ErrorKind::Custom(
                "empty policy bytes".to_string(),
            )));
        }
        bincode::deserialize(bytes)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// SERIALIZED IDENTITY
// ════════════════════════════════════════════════════════════════════════════════

/// The identity a peer presents: the organization that issued it plus
/// the opaque certificate bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub id_bytes: Vec<u8>,
}

impl SerializedIdentity {
    #[must_use]
    pub fn new(msp_id: impl Into<String>, id_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            msp_id: msp_id.into(),
            id_bytes: id_bytes.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_ordering_is_by_msp_then_role() {
        let a = Principal::peer_of("Org0MSP");
        let b = Principal::peer_of("Org1MSP");
        let c = Principal::member_of("Org0MSP");
        assert!(a < b);
        // Member sorts before Peer within the same organization.
        assert!(c < a);
    }

    #[test]
    fn test_principal_display() {
        assert_eq!(Principal::peer_of("Org3MSP").to_string(), "Org3MSP.peer");
    }

    #[test]
    fn test_policy_bytes_decode() {
        let policy = InquireablePolicy::new(vec![
            vec![Principal::peer_of("Org0MSP"), Principal::peer_of("Org6MSP")],
            vec![Principal::peer_of("Org12MSP")],
        ]);
        let bytes = policy.to_bytes().expect("encode");
        let decoded = InquireablePolicy::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.satisfied_by().len(), 2);
        assert_eq!(decoded, policy);
    }

    #[test]
    fn test_policy_rejects_garbage_and_empty() {
        assert!(InquireablePolicy::from_bytes(&[1, 2, 3]).is_err());
        assert!(InquireablePolicy::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_serialized_identity_decode() {
        let id = SerializedIdentity::new("Org4MSP", b"p4".to_vec());
        let bytes = id.to_bytes().expect("encode");
        assert_eq!(SerializedIdentity::from_bytes(&bytes).expect("decode"), id);
    }
}
