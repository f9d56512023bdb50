//! # Endorsement Descriptor
//!
//! The analyzer's answer: every feasible layout of endorsing groups, and
//! the peers behind each group. Groups are shared between layouts, so
//! two layouts may reference the same group id.
//!
//! ```text
//! layouts[0]: { G0: 1, G1: 1 }        endorsers_by_groups:
//! layouts[1]: { G2: 1 }                 G0 -> [p0]
//!                                       G1 -> [p6]
//!                                       G2 -> [p12]
//! ```
//!
//! Selecting the final endorsers for a transaction is left to the
//! caller: pick a layout, then pick `quantity` peers from each group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::membership::Envelope;

/// An endorsing peer as reported to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Encoded [`SerializedIdentity`](crate::SerializedIdentity).
    pub identity: Vec<u8>,
    /// Membership message from the alive view.
    pub membership_info: Option<Envelope>,
    /// State message from the channel view.
    pub state_info: Option<Envelope>,
}

/// The peers of one endorsement group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peers {
    pub peers: Vec<Peer>,
}

/// How many peers to take from each group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub quantities_by_group: BTreeMap<String, u32>,
}

impl Layout {
    /// Total number of endorsements the layout asks for.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.quantities_by_group.values().sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementDescriptor {
    /// Name of the first chaincode in the interest.
    pub chaincode: String,
    pub layouts: Vec<Layout>,
    pub endorsers_by_groups: BTreeMap<String, Peers>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_quantity() {
        let mut layout = Layout::default();
        layout.quantities_by_group.insert("G0".to_string(), 2);
        layout.quantities_by_group.insert("G1".to_string(), 1);
        assert_eq!(layout.total_quantity(), 3);
    }
}
