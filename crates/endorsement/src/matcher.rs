//! # Peer Matcher
//!
//! Finds which live peers can stand in for each principal of a
//! candidate principal set.
//!
//! ## Candidate Peers
//!
//! A peer is a candidate when it is present in both the alive view and
//! the channel view (matched by PKI-ID) and its identity is known.
//! Candidates are kept in PKI-ID order.
//!
//! ## Matching a Principal
//!
//! For each principal the matcher records two peer lists:
//!
//! - **eligible**: candidates whose identity satisfies the principal;
//! - **installed**: eligible candidates that run *every* chaincode of the
//!   interest at exactly the version recorded in its metadata.
//!
//! A principal needed `n` times is satisfied when `installed` holds at
//! least `n` peers. When it fails, the matcher remembers whether
//! `eligible` alone would have sufficed, which separates a missing
//! chaincode installation from a missing organization.
//!
//! Results are cached per principal for the lifetime of the matcher,
//! which is one analyzer call.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use disco_common::{NetworkMember, Peer, PkiId, Principal};

use crate::principal_sets::ComparablePrincipalSet;
use crate::support::{MembershipProvider, PrincipalEvaluator};

// ════════════════════════════════════════════════════════════════════════════════
// CANDIDATE
// ════════════════════════════════════════════════════════════════════════════════

/// A peer present in both membership views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub pki_id: PkiId,
    pub identity: Vec<u8>,
    /// Record from the alive view.
    pub alive: NetworkMember,
    /// Record from the channel view.
    pub channel: NetworkMember,
}

impl Candidate {
    /// Descriptor entry for this peer.
    #[must_use]
    pub fn to_peer(&self) -> Peer {
        Peer {
            identity: self.identity.clone(),
            membership_info: self.alive.envelope.clone(),
            state_info: self.channel.envelope.clone(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// OUTCOME
// ════════════════════════════════════════════════════════════════════════════════

/// Peers required from one group by a layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRequirement {
    pub peers: BTreeSet<PkiId>,
    pub quantity: u32,
}

/// Result of matching one principal set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Every principal can be covered. Principals resolving to the same
    /// peers share one requirement with their quantities added.
    Satisfied(Vec<GroupRequirement>),

    /// Some principal cannot be covered. `version_only` is true when
    /// every principal had enough eligible peers and only chaincode
    /// installation fell short.
    Unsatisfied { version_only: bool },
}

#[derive(Clone, Debug, Default)]
struct PrincipalMatch {
    eligible: usize,
    installed: BTreeSet<PkiId>,
}

// ════════════════════════════════════════════════════════════════════════════════
// MATCHER
// ════════════════════════════════════════════════════════════════════════════════

pub struct PeerMatcher<'a> {
    channel: &'a str,
    evaluator: &'a dyn PrincipalEvaluator,
    candidates: BTreeMap<PkiId, Candidate>,
    required: Vec<(String, String)>,
    cache: BTreeMap<Principal, PrincipalMatch>,
}

impl<'a> PeerMatcher<'a> {
    /// Snapshots both membership views and the identity mapping.
    ///
    /// `required` lists the (chaincode, version) pairs every endorsing
    /// peer must have installed.
    pub fn new(
        channel: &'a str,
        membership: &dyn MembershipProvider,
        evaluator: &'a dyn PrincipalEvaluator,
        required: Vec<(String, String)>,
    ) -> Self {
        let alive = membership.peers().by_id();
        let identities = membership.identity_info().by_id();
        let mut candidates = BTreeMap::new();
        for member in membership.peers_of_channel(channel).iter() {
            let Some(alive_member) = alive.get(&member.pki_id) else {
                continue;
            };
            let Some(info) = identities.get(&member.pki_id) else {
                warn!(
                    "no identity known for peer {} ({}), skipping",
                    member.pki_id, member.endpoint
                );
                continue;
            };
            candidates.insert(
                member.pki_id.clone(),
                Candidate {
                    pki_id: member.pki_id.clone(),
                    identity: info.identity.clone(),
                    alive: alive_member.clone(),
                    channel: member.clone(),
                },
            );
        }
        debug!(
            "channel {}: {} of {} alive peers are channel members",
            channel,
            candidates.len(),
            alive.len()
        );
        Self {
            channel,
            evaluator,
            candidates,
            required,
            cache: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn candidate(&self, pki_id: &PkiId) -> Option<&Candidate> {
        self.candidates.get(pki_id)
    }

    /// Matches every principal of `set` against the candidates.
    pub fn match_principal_set(&mut self, set: &ComparablePrincipalSet) -> MatchOutcome {
        let mut absent = false;
        let mut short_on_installs = false;
        let mut groups: Vec<GroupRequirement> = Vec::new();

        for (principal, needed) in set.principals() {
            let found = self.match_principal(principal);
            let needed_peers = needed as usize;
            if found.eligible < needed_peers {
                absent = true;
                continue;
            }
            if found.installed.len() < needed_peers {
                short_on_installs = true;
                continue;
            }
            match groups.iter_mut().find(|g| g.peers == found.installed) {
                Some(group) => group.quantity += needed,
                None => groups.push(GroupRequirement {
                    peers: found.installed.clone(),
                    quantity: needed,
                }),
            }
        }

        if absent || short_on_installs {
            return MatchOutcome::Unsatisfied {
                version_only: !absent,
            };
        }
        // Distinct principals that resolved to the same peers now draw
        // from one group.
        if groups.iter().any(|g| g.peers.len() < g.quantity as usize) {
            return MatchOutcome::Unsatisfied {
                version_only: false,
            };
        }
        MatchOutcome::Satisfied(groups)
    }

    fn match_principal(&mut self, principal: &Principal) -> &PrincipalMatch {
        if !self.cache.contains_key(principal) {
            let computed = self.compute_match(principal);
            self.cache.insert(principal.clone(), computed);
        }
        // Inserted above when absent.
        &self.cache[principal]
    }

    fn compute_match(&self, principal: &Principal) -> PrincipalMatch {
        let mut result = PrincipalMatch::default();
        for candidate in self.candidates.values() {
            if let Err(e) =
                self.evaluator
                    .satisfies_principal(self.channel, &candidate.identity, principal)
            {
                debug!(
                    "peer {} does not satisfy {}: {}",
                    candidate.pki_id, principal, e
                );
                continue;
            }
            result.eligible += 1;
            if self.has_required_chaincodes(&candidate.channel) {
                result.installed.insert(candidate.pki_id.clone());
            }
        }
        result
    }

    fn has_required_chaincodes(&self, member: &NetworkMember) -> bool {
        self.required
            .iter()
            .all(|(name, version)| member.has_chaincode(name, version))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════
