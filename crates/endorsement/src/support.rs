//! # Collaborator Interfaces
//!
//! The analyzer reads network and ledger state only through these
//! traits. Implementations are injected into
//! [`EndorsementAnalyzer`](crate::EndorsementAnalyzer) at construction.
//!
//! Implementations MUST NOT block indefinitely. The analyzer performs
//! no retries; retry policy, if any, belongs to the implementation.

use disco_common::{
    ChaincodeMetadata, InquireablePolicy, Members, PeerIdentitySet, Principal,
};

/// Snapshot access to the membership layer.
pub trait MembershipProvider: Send + Sync {
    /// Every peer currently considered alive, regardless of channel.
    fn peers(&self) -> Members;

    /// Peers known to participate in `channel`, with their advertised
    /// channel state.
    fn peers_of_channel(&self, channel: &str) -> Members;

    /// Identities of the peers known to the membership layer.
    fn identity_info(&self) -> PeerIdentitySet;
}

/// Looks up endorsement policies.
pub trait PolicyFetcher: Send + Sync {
    /// `None` when no policy is registered for the chaincode.
    fn policy_by_chaincode(&self, channel: &str, chaincode: &str) -> Option<InquireablePolicy>;
}

/// Looks up chaincode deployment records on the ledger.
pub trait MetadataFetcher: Send + Sync {
    /// `None` when the chaincode is not deployed on `channel`.
    ///
    /// When `include_collections` is false the implementation may leave
    /// `collections_config` empty.
    fn metadata(
        &self,
        channel: &str,
        chaincode: &str,
        include_collections: bool,
    ) -> Option<ChaincodeMetadata>;
}

/// Decides organization and role membership of identities.
pub trait PrincipalEvaluator: Send + Sync {
    /// Organization a principal refers to.
    fn msp_of_principal(&self, principal: &Principal) -> String {
        principal.msp_id.clone()
    }

    /// `Ok(())` when `identity` satisfies `principal` on `channel`.
    fn satisfies_principal(
        &self,
        channel: &str,
        identity: &[u8],
        principal: &Principal,
    ) -> disco_common::Result<()>;
}
