//! Routing table: current best next-hop per destination, updated by the
//! link-state flood per the rule in spec.md §4.D.

use std::collections::BTreeMap;

use crate::model::link::{Link, RouteEntry};
use crate::model::lsp::LSPPacket;
use crate::model::node_id::NodeId;

#[derive(Debug, Default)]
pub struct RoutingTable {
    entries: BTreeMap<NodeId, RouteEntry>,
}

impl RoutingTable {
    /// Seeds the table with one entry per direct neighbor, at the
    /// neighbor's direct-link cost — every direct neighbor is present
    /// in the table at startup (spec.md §3 invariant).
    pub fn seeded_from_links(links: &[Link]) -> Self {
        let mut entries = BTreeMap::new();
        for link in links {
            entries.insert(link.dest_id, RouteEntry::from(*link));
        }
        Self { entries }
    }

    pub fn get(&self, dest_id: NodeId) -> Option<&RouteEntry> {
        self.entries.get(&dest_id)
    }

    pub fn snapshot(&self) -> Vec<RouteEntry> {
        self.entries.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies the routing-table update rule (spec.md §4.D) for an
    /// incoming packet. `is_direct_neighbor` tells whether
    /// `packet.header.src_id` is one of this router's configured direct
    /// links — that set never changes after startup, unlike the table
    /// entry for the source, which this function itself may rewrite.
    /// If the source is not a direct neighbor, the packet is ignored
    /// entirely: the next-hop data needed to install new routes is the
    /// link to the source, and if it's not direct we don't have it yet
    /// (it arrives later via the direct neighbor that forwards this
    /// source's LSPs).
    ///
    /// Returns `true` if any entry was inserted or replaced.
    pub fn apply_update(
        &mut self,
        packet: &LSPPacket,
        self_id: NodeId,
        is_direct_neighbor: bool,
    ) -> bool {
        if !is_direct_neighbor {
            return false;
        }
        let Some(nhop) = self.entries.get(&packet.header.src_id).copied() else {
            return false;
        };

        let mut changed = false;
        for entry in packet.entries() {
            if entry.id == self_id {
                continue;
            }

            let candidate = RouteEntry {
                dest_id: entry.id,
                cost: entry.cost + nhop.cost,
                out_port: nhop.out_port,
                dest_port: nhop.dest_port,
            };

            match self.entries.get(&entry.id) {
                None => {
                    self.entries.insert(entry.id, candidate);
                    changed = true;
                }
                Some(existing) => {
                    if Self::candidate_wins(&candidate, existing) {
                        self.entries.insert(entry.id, candidate);
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    /// Tie-breaking order: lower cost wins; on equal cost, lower
    /// `out_port` wins; on equal cost and port (impossible in practice,
    /// since `out_port` already distinguishes neighbors, but resolved
    /// deterministically per the source's own "TODO check ids" note),
    /// lower destination id wins.
    fn candidate_wins(candidate: &RouteEntry, existing: &RouteEntry) -> bool {
        if candidate.cost != existing.cost {
            return candidate.cost < existing.cost;
        }
        if candidate.out_port != existing.out_port {
            return candidate.out_port < existing.out_port;
        }
        candidate.dest_id < existing.dest_id
    }
}
