//! # Principal-Set Algebra
//!
//! Canonical forms of principal sets and the operations the analyzer
//! builds on: collection intersection, `pop`, and the cross-chaincode
//! merge.
//!
//! ## Canonical Form
//!
//! A [`ComparablePrincipalSet`] counts how often each principal occurs.
//! Two sets are equal iff they hold the same principals with the same
//! multiplicities, whatever their original order.
//!
//! ## Merge
//!
//! Merging picks one alternative per chaincode and combines them. The
//! combination takes, for each principal, the larger of the two
//! multiplicities: one endorsing peer of an organization covers that
//! organization for every chaincode in the interest. After each merge
//! step the candidates are reduced to their minimal elements; a
//! candidate that strictly contains another is never needed, since any
//! peers satisfying it also satisfy the smaller one.
//!
//! ```text
//! cc1: {A,B} | {C,D}      cc2: {C,D,E}
//!   {A,B}+{C,D,E} = {A,B,C,D,E}   ⊃ {C,D,E}  → dropped
//!   {C,D}+{C,D,E} = {C,D,E}                  → kept
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use disco_common::{EndorsementError, Principal, PrincipalSet};

// ════════════════════════════════════════════════════════════════════════════════
// COMPARABLE PRINCIPAL SET
// ════════════════════════════════════════════════════════════════════════════════

/// Order-independent form of a [`PrincipalSet`] that keeps multiplicities.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComparablePrincipalSet {
    counts: BTreeMap<Principal, u32>,
}

impl ComparablePrincipalSet {
    #[must_use]
    pub fn new(set: &[Principal]) -> Self {
        let mut counts = BTreeMap::new();
        for principal in set {
            *counts.entry(principal.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of principals, counting repetitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.values().map(|&c| c as usize).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct principals with the number of distinct peers each needs,
    /// in canonical order.
    pub fn principals(&self) -> impl Iterator<Item = (&Principal, u32)> {
        self.counts.iter().map(|(p, &c)| (p, c))
    }

    /// Whether every principal of `other` occurs in `self` at least as
    /// often.
    #[must_use]
    pub fn contains(&self, other: &ComparablePrincipalSet) -> bool {
        other
            .counts
            .iter()
            .all(|(p, &c)| self.counts.get(p).is_some_and(|&mine| mine >= c))
    }

    /// The smallest set containing both `self` and `other`.
    #[must_use]
    pub fn merge(&self, other: &ComparablePrincipalSet) -> ComparablePrincipalSet {
        let mut counts = self.counts.clone();
        for (p, &c) in &other.counts {
            let entry = counts.entry(p.clone()).or_insert(0);
            *entry = (*entry).max(c);
        }
        ComparablePrincipalSet { counts }
    }
}

impl From<&PrincipalSet> for ComparablePrincipalSet {
    fn from(set: &PrincipalSet) -> Self {
        ComparablePrincipalSet::new(set)
    }
}

impl fmt::Display for ComparablePrincipalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (p, c)) in self.principals().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if c > 1 {
                write!(f, "{}x{}", c, p)?;
            } else {
                write!(f, "{}", p)?;
            }
        }
        f.write_str("]")
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// OPERATIONS
// ════════════════════════════════════════════════════════════════════════════════

/// Canonical form of one principal set.
#[must_use]
pub fn canonicalize(set: &[Principal]) -> ComparablePrincipalSet {
    ComparablePrincipalSet::new(set)
}

/// Canonical forms of a policy's alternatives, deduplicated and sorted.
#[must_use]
pub fn canonicalize_all(sets: &[PrincipalSet]) -> Vec<ComparablePrincipalSet> {
    sets.iter()
        .map(|set| canonicalize(set))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Keeps the alternatives whose every principal is permitted by the
/// collection's member principals.
///
/// A principal is permitted when `org_of` maps it to the organization of
/// at least one collection member. Alternatives are never altered, only
/// dropped, so the result is a subset of `alternatives`.
pub fn intersect_with_collection_policy<F>(
    alternatives: Vec<PrincipalSet>,
    collection_members: &[Principal],
    org_of: F,
) -> Vec<PrincipalSet>
where
    F: Fn(&Principal) -> String,
{
    let permitted: BTreeSet<String> = collection_members.iter().map(&org_of).collect();
    alternatives
        .into_iter()
        .filter(|set| set.iter().all(|p| permitted.contains(&org_of(p))))
        .collect()
}

/// Removes and returns the first element of `sets`.
///
/// # Errors
///
/// [`EndorsementError::NoPrincipalSetsRemain`] if `sets` is empty.
pub fn pop_principal_sets<T>(mut sets: Vec<T>) -> Result<(T, Vec<T>), EndorsementError> {
    if sets.is_empty() {
        return Err(EndorsementError::NoPrincipalSetsRemain);
    }
    let first = sets.remove(0);
    Ok((first, sets))
}

/// Combines per-chaincode alternatives into alternatives that satisfy
/// every chaincode at once.
///
/// The fold starts from the first chaincode's alternatives and merges in
/// one chaincode at a time. Output is deduplicated and in canonical
/// order. With a single chaincode the alternatives are only
/// deduplicated, not reduced.
///
/// # Errors
///
/// - [`EndorsementError::NoPrincipalSetsRemain`] if `per_chaincode` is
///   empty or any chaincode contributes no alternative.
/// - [`EndorsementError::PrincipalSetLimitExceeded`] if merging in a
///   chaincode yields more than `limit` candidates. The first chaincode's
///   own alternatives are never bounded.
pub fn merge_principal_sets(
    per_chaincode: Vec<Vec<ComparablePrincipalSet>>,
    limit: Option<usize>,
) -> Result<Vec<ComparablePrincipalSet>, EndorsementError> {
    let (first, rest) = pop_principal_sets(per_chaincode)?;
    let mut merged: Vec<ComparablePrincipalSet> =
        first.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

    for alternatives in rest {
        if merged.is_empty() {
            break;
        }
        let mut product = BTreeSet::new();
        for left in &merged {
            for right in &alternatives {
                product.insert(left.merge(right));
            }
        }
        merged = reduce(product);
        check_limit(merged.len(), limit)?;
    }

    if merged.is_empty() {
        return Err(EndorsementError::NoPrincipalSetsRemain);
    }
    Ok(merged)
}

/// Minimal elements of `sets`: drops every set that strictly contains
/// another one.
fn reduce(sets: BTreeSet<ComparablePrincipalSet>) -> Vec<ComparablePrincipalSet> {
    sets.iter()
        .filter(|candidate| {
            !sets
                .iter()
                .any(|other| other != *candidate && candidate.contains(other))
        })
        .cloned()
        .collect()
}

fn check_limit(len: usize, limit: Option<usize>) -> Result<(), EndorsementError> {
    match limit {
        Some(limit) if len > limit => Err(EndorsementError::PrincipalSetLimitExceeded { limit }),
        _ => Ok(()),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════════
