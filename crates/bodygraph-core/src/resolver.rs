//! Definition resolver - complete channels, defined centers, hanging gates

use crate::activation::ActivationSet;
use crate::topology::Topology;
use crate::types::{CenterCode, ChannelId, Gate};
use serde::Serialize;
use std::collections::BTreeSet;

/// Graph state derived from one activation set. Recompute rather than mutate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedGraph {
    pub active_gates: BTreeSet<Gate>,
    pub complete_channels: BTreeSet<ChannelId>,
    pub defined_centers: BTreeSet<CenterCode>,
    pub hanging_gates: BTreeSet<Gate>,
}

impl ResolvedGraph {
    pub fn is_defined(&self, center: CenterCode) -> bool {
        self.defined_centers.contains(&center)
    }

    pub fn is_complete(&self, channel: ChannelId) -> bool {
        self.complete_channels.contains(&channel)
    }

    pub fn open_centers(&self) -> impl Iterator<Item = CenterCode> + '_ {
        CenterCode::ALL
            .into_iter()
            .filter(move |c| !self.is_defined(*c))
    }
}

/// Resolve an activation set against the registry.
///
/// A channel is complete when both endpoint gates are active, whichever
/// stream supplied each one. A center is defined when it owns an endpoint
/// of a complete channel. An active gate that completes none of its
/// channels is hanging.
pub fn resolve(activations: &ActivationSet, topology: &Topology) -> ResolvedGraph {
    let active_gates = activations.active_gates();

    let mut complete_channels = BTreeSet::new();
    let mut defined_centers = BTreeSet::new();
    for channel in topology.channels() {
        let (a, b) = channel.endpoints();
        if active_gates.contains(&a) && active_gates.contains(&b) {
            complete_channels.insert(channel.id);
            defined_centers.insert(channel.centers.0);
            defined_centers.insert(channel.centers.1);
        }
    }

    let hanging_gates = active_gates
        .iter()
        .copied()
        .filter(|g| !complete_channels.iter().any(|c: &ChannelId| c.contains(*g)))
        .collect();

    ResolvedGraph {
        active_gates,
        complete_channels,
        defined_centers,
        hanging_gates,
    }
}
