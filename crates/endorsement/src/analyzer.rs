//! # Endorsement Analyzer
//!
//! Orchestrates one `peers_for_endorsement` request.
//!
//! ## Pipeline
//!
//! ```text
//! interest ─► load (per call) ─► canonicalize ─► merge ─► match peers ─► assemble
//!               │ fail-fast        │                │          │
//!               ▼                  ▼                ▼          ▼
//!          ledger errors   NoPrincipalSetsRemain   NoSatisfiableCombination /
//!                                                  InsufficientChaincodeInstallation
//! ```
//!
//! Each stage returns immediately on error. No state survives between
//! requests; every request reads fresh snapshots from the collaborators.
//!
//! ## Output Order
//!
//! Layouts follow the canonical order of their principal sets. Group ids
//! are `G0`, `G1`, … handed out the first time a distinct peer set is
//! met while walking the layouts in that order. Two principals that
//! resolve to the same peers share one group.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use disco_common::{
    AnalyzerConfig, ChaincodeCall, ChaincodeInterest, EndorsementDescriptor, EndorsementError,
    Layout, Peers, PkiId,
};

use crate::loader::{load_metadata_and_filters, LoadedChaincode};
use crate::matcher::{GroupRequirement, MatchOutcome, PeerMatcher};
use crate::principal_sets::{canonicalize_all, merge_principal_sets, ComparablePrincipalSet};
use crate::support::{MembershipProvider, MetadataFetcher, PolicyFetcher, PrincipalEvaluator};

/// Computes endorsement descriptors from live membership and ledger
/// state.
///
/// Cloning is cheap; clones share the collaborators.
#[derive(Clone)]
pub struct EndorsementAnalyzer {
    membership: Arc<dyn MembershipProvider>,
    policies: Arc<dyn PolicyFetcher>,
    evaluator: Arc<dyn PrincipalEvaluator>,
    metadata: Arc<dyn MetadataFetcher>,
    config: AnalyzerConfig,
}

impl EndorsementAnalyzer {
    /// Creates an analyzer with [`AnalyzerConfig::default()`].
    #[must_use]
    pub fn new(
        membership: Arc<dyn MembershipProvider>,
        policies: Arc<dyn PolicyFetcher>,
        evaluator: Arc<dyn PrincipalEvaluator>,
        metadata: Arc<dyn MetadataFetcher>,
    ) -> Self {
        Self {
            membership,
            policies,
            evaluator,
            metadata,
            config: AnalyzerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Computes which peer groups can endorse `interest` on `channel`.
    ///
    /// # Errors
    ///
    /// Any [`EndorsementError`]; see the module docs for which stage
    /// produces which.
    pub fn peers_for_endorsement(
        &self,
        channel: &str,
        interest: &ChaincodeInterest,
    ) -> Result<EndorsementDescriptor, EndorsementError> {
        if interest.chaincodes.is_empty() {
            return Err(EndorsementError::NoPrincipalSetsRemain);
        }
        let loaded = interest
            .chaincodes
            .iter()
            .map(|call| self.load(channel, call))
            .collect::<Result<Vec<_>, _>>()?;
        self.analyze(channel, interest, &loaded)
    }

    /// Same as [`peers_for_endorsement`](Self::peers_for_endorsement),
    /// but loads the calls of the interest on blocking tasks in parallel.
    ///
    /// Results are joined in call order, so the merge sees the same
    /// input regardless of completion order, and the first failing call
    /// in interest order decides the error.
    pub async fn peers_for_endorsement_concurrent(
        &self,
        channel: &str,
        interest: &ChaincodeInterest,
    ) -> Result<EndorsementDescriptor, EndorsementError> {
        if interest.chaincodes.is_empty() {
            return Err(EndorsementError::NoPrincipalSetsRemain);
        }
        let tasks = interest.chaincodes.iter().cloned().map(|call| {
            let analyzer = self.clone();
            let channel = channel.to_string();
            tokio::task::spawn_blocking(move || analyzer.load(&channel, &call))
        });
        let results = join_all(tasks).await;

        let mut loaded = Vec::with_capacity(results.len());
        for (call, result) in interest.chaincodes.iter().zip(results) {
            match result {
                Ok(Ok(chaincode)) => loaded.push(chaincode),
                Ok(Err(e)) => return Err(e),
                Err(join_err) => {
                    return Err(EndorsementError::LoaderTaskFailed {
                        chaincode: call.name.clone(),
                        reason: join_err.to_string(),
                    })
                }
            }
        }
        self.analyze(channel, interest, &loaded)
    }

    fn load(&self, channel: &str, call: &ChaincodeCall) -> Result<LoadedChaincode, EndorsementError> {
        load_metadata_and_filters(channel, call, self.metadata.as_ref(), self.policies.as_ref())
    }

    fn analyze(
        &self,
        channel: &str,
        interest: &ChaincodeInterest,
        loaded: &[LoadedChaincode],
    ) -> Result<EndorsementDescriptor, EndorsementError> {
        let principal_sets =
            compute_principal_sets(loaded, self.evaluator.as_ref(), self.config.merge_limit())?;
        debug!(
            "channel {}: {} candidate principal sets for {} chaincodes",
            channel,
            principal_sets.len(),
            loaded.len()
        );

        let required = loaded.iter().map(LoadedChaincode::required_chaincode).collect();
        let mut matcher = PeerMatcher::new(
            channel,
            self.membership.as_ref(),
            self.evaluator.as_ref(),
            required,
        );

        let mut satisfiable = Vec::new();
        let mut version_only = true;
        for set in &principal_sets {
            match matcher.match_principal_set(set) {
                MatchOutcome::Satisfied(groups) => satisfiable.push(groups),
                MatchOutcome::Unsatisfied { version_only: v } => {
                    debug!(
                        "discarding {}: {}",
                        set,
                        if v {
                            "chaincode not installed on enough peers"
                        } else {
                            "not enough matching peers"
                        }
                    );
                    version_only &= v;
                }
            }
        }

        if satisfiable.is_empty() {
            return Err(if version_only {
                EndorsementError::InsufficientChaincodeInstallation
            } else {
                EndorsementError::NoSatisfiableCombination
            });
        }

        let chaincode = interest
            .chaincodes
            .first()
            .map(|call| call.name.clone())
            .unwrap_or_default();
        Ok(assemble(chaincode, &satisfiable, &matcher))
    }
}

/// Canonical, merged principal sets for the loaded calls.
///
/// # Errors
///
/// [`EndorsementError::NoPrincipalSetsRemain`] when `loaded` is empty or
/// some chaincode has no alternative left after collection filtering.
pub fn compute_principal_sets(
    loaded: &[LoadedChaincode],
    evaluator: &dyn PrincipalEvaluator,
    limit: Option<usize>,
) -> Result<Vec<ComparablePrincipalSet>, EndorsementError> {
    let per_chaincode = loaded
        .iter()
        .map(|chaincode| canonicalize_all(&chaincode.principal_sets(evaluator)))
        .collect();
    merge_principal_sets(per_chaincode, limit)
}

fn assemble(
    chaincode: String,
    satisfiable: &[Vec<GroupRequirement>],
    matcher: &PeerMatcher<'_>,
) -> EndorsementDescriptor {
    let mut group_ids: BTreeMap<&BTreeSet<PkiId>, String> = BTreeMap::new();
    let mut endorsers_by_groups = BTreeMap::new();
    let mut layouts = Vec::with_capacity(satisfiable.len());

    for groups in satisfiable {
        let mut layout = Layout::default();
        for group in groups {
            let next_id = group_ids.len();
            let id = group_ids
                .entry(&group.peers)
                .or_insert_with(|| format!("G{}", next_id))
                .clone();
            endorsers_by_groups.entry(id.clone()).or_insert_with(|| Peers {
                peers: group
                    .peers
                    .iter()
                    .filter_map(|pki_id| matcher.candidate(pki_id))
                    .map(|candidate| candidate.to_peer())
                    .collect(),
            });
            *layout.quantities_by_group.entry(id).or_insert(0) += group.quantity;
        }
        layouts.push(layout);
    }

    EndorsementDescriptor {
        chaincode,
        layouts,
        endorsers_by_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;

    impl PrincipalEvaluator for AcceptAll {
        fn satisfies_principal(
            &self,
            _: &str,
            _: &[u8],
            _: &disco_common::Principal,
        ) -> disco_common::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_compute_principal_sets_no_policies() {
        let err = compute_principal_sets(&[], &AcceptAll, None).unwrap_err();
        assert!(err
            .to_string()
            .contains("no principal sets remained after filtering"));
    }
}
