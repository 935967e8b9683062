//! Compact first-pass nodes and reachability culling.
//!
//! The first pass keeps only location and neighbor ids per node, enough to
//! decide which nodes must be fully loaded: everything in the visible
//! subspace, plus the out-of-bounds chains needed to keep in-bounds nodes
//! connected to their true chain termini.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::reader::NodeRecord;
use super::{Neighbor, NodeId};
use crate::error::{Result, TopologyError};
use crate::geometry::{Bounds, Vec3};

#[derive(Clone, Debug)]
pub struct MinimalNode {
    pub id: NodeId,
    pub location: Vec3,
    pub in_bounds: bool,
    pub keep: bool,
    pub neighbor_ids: Vec<NodeId>,
    pub file_order_index: u32,
}

impl MinimalNode {
    pub fn degree(&self) -> usize {
        self.neighbor_ids.len()
    }
}

/// All first-pass nodes plus the deduplicated undirected edge set.
#[derive(Debug, Default)]
pub struct MinimalNodes {
    nodes: Vec<MinimalNode>,
    by_id: FxHashMap<NodeId, usize>,
    edges: BTreeSet<Neighbor>,
}

impl MinimalNodes {
    /// Consume a record stream, keeping the compact form of each node.
    pub fn from_records<I>(records: I, subspace: &Bounds) -> Result<Self>
    where
        I: IntoIterator<Item = Result<NodeRecord>>,
    {
        let mut nodes = Self::default();
        for record in records {
            nodes.push(&record?, subspace);
        }
        log::debug!(
            "read {} minimal nodes, {} unique edges",
            nodes.len(),
            nodes.edges.len()
        );
        Ok(nodes)
    }

    pub fn push(&mut self, record: &NodeRecord, subspace: &Bounds) {
        let file_order_index = self.nodes.len() as u32;

        let mut neighbor_ids = Vec::with_capacity(record.arms.len());
        for arm in &record.arms {
            if arm.neighbor == record.id {
                log::warn!("node {} lists itself as a neighbor; ignored", record.id);
                continue;
            }
            neighbor_ids.push(arm.neighbor);
            // Both endpoints mention the edge; the set keeps one copy.
            self.edges.insert(Neighbor::new(record.id, arm.neighbor));
        }

        if self
            .by_id
            .insert(record.id, file_order_index as usize)
            .is_some()
        {
            log::warn!("node {} appears more than once; last record wins", record.id);
        }

        self.nodes.push(MinimalNode {
            id: record.id,
            location: record.location,
            in_bounds: subspace.contains(record.location),
            keep: false,
            neighbor_ids,
            file_order_index,
        });
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[MinimalNode] {
        &self.nodes
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&MinimalNode> {
        self.by_id.get(&id).map(|&i| &self.nodes[i])
    }

    /// Mark every node that must be fully loaded. Returns the kept count.
    pub fn classify(&mut self) -> Result<usize> {
        for i in 0..self.nodes.len() {
            if !self.nodes[i].in_bounds {
                continue;
            }
            self.nodes[i].keep = true;

            for n in 0..self.nodes[i].neighbor_ids.len() {
                let Some(&j) = self.by_id.get(&self.nodes[i].neighbor_ids[n]) else {
                    continue;
                };
                if self.nodes[j].in_bounds || self.nodes[j].keep {
                    continue;
                }
                self.mark_oob_chain(i, j)?;
            }
        }

        Ok(self.nodes.iter().filter(|n| n.keep).count())
    }

    /// Walk the out-of-bounds degree-2 chain starting at `start` (entered
    /// from `source`) until a chain terminus or a node next to the visible
    /// region, marking every node on the way.
    fn mark_oob_chain(&mut self, source: usize, start: usize) -> Result<()> {
        let (mut prev, mut cur) = (source, start);

        loop {
            self.nodes[cur].keep = true;
            if self.nodes[cur].degree() != 2 {
                return Ok(());
            }

            let ids = &self.nodes[cur].neighbor_ids;
            let a = self.by_id.get(&ids[0]).copied();
            let b = self.by_id.get(&ids[1]).copied();
            let next = match (a, b) {
                (Some(a), Some(b)) if a == prev && b == prev => {
                    return Err(TopologyError::TwoNodeCycle {
                        node: self.nodes[cur].id,
                    }
                    .into());
                }
                (Some(a), b) if a == prev => b,
                (a, _) => a,
            };

            let Some(next) = next else {
                return Ok(());
            };
            if self.nodes[next].in_bounds || self.nodes[next].keep {
                return Ok(());
            }
            prev = cur;
            cur = next;
        }
    }

    /// Drop every node not marked `keep`, returning the file positions of
    /// the survivors in file order.
    pub fn cull(self) -> RetainedNodes {
        let total = self.nodes.len();
        let file_order: Vec<u32> = self
            .nodes
            .into_iter()
            .filter(|n| n.keep)
            .map(|n| n.file_order_index)
            .collect();
        debug_assert!(file_order.windows(2).all(|w| w[0] < w[1]));

        RetainedNodes {
            culled: total - file_order.len(),
            file_order,
        }
    }
}

/// File positions of the nodes that survived culling, ascending.
#[derive(Clone, Debug, Default)]
pub struct RetainedNodes {
    pub file_order: Vec<u32>,
    pub culled: usize,
}

impl RetainedNodes {
    pub fn len(&self) -> usize {
        self.file_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::network::reader::ArmRecord;

    fn bounds() -> Bounds {
        Bounds::new(Vec3::splat(0.0), Vec3::splat(10.0))
    }

    fn record(local: u32, location: Vec3, neighbors: &[u32]) -> NodeRecord {
        NodeRecord {
            id: NodeId::new(0, local),
            location,
            constraint: 0,
            arms: neighbors
                .iter()
                .map(|&n| ArmRecord {
                    neighbor: NodeId::new(0, n),
                    burgers: Vec3::X,
                    normal: Vec3::Z,
                })
                .collect(),
        }
    }

    fn outside(x: f64) -> Vec3 {
        Vec3::new(20.0 + x, 5.0, 5.0)
    }

    fn build(records: Vec<NodeRecord>) -> MinimalNodes {
        MinimalNodes::from_records(records.into_iter().map(Ok), &bounds()).unwrap()
    }

    #[test]
    fn test_oob_chain_to_in_bounds_node_is_kept() {
        // 0 (in) - 1 - 2 - 3 - 4 - 5 - 6 (terminus), 1..=6 out of bounds
        // 10 - 11 - 12 isolated, all out of bounds
        let mut records = vec![record(0, Vec3::splat(5.0), &[1])];
        for i in 1..=5 {
            records.push(record(i, outside(i as f64), &[i - 1, i + 1]));
        }
        records.push(record(6, outside(6.0), &[5]));
        records.push(record(10, outside(10.0), &[11]));
        records.push(record(11, outside(11.0), &[10, 12]));
        records.push(record(12, outside(12.0), &[11]));

        let mut nodes = build(records);
        let kept = nodes.classify().unwrap();
        assert_eq!(kept, 7);

        for i in 1..=5 {
            assert!(nodes.get(NodeId::new(0, i)).unwrap().keep, "node {i}");
        }
        for i in 10..=12 {
            assert!(!nodes.get(NodeId::new(0, i)).unwrap().keep, "node {i}");
        }

        let retained = nodes.cull();
        assert_eq!(retained.file_order, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(retained.culled, 3);
    }

    #[test]
    fn test_walk_stops_next_to_visible_region() {
        // 0 (in) - 1 - 2 - 3 (in): the chain bridges two in-bounds nodes.
        let records = vec![
            record(0, Vec3::splat(1.0), &[1]),
            record(1, outside(1.0), &[0, 2]),
            record(2, outside(2.0), &[1, 3]),
            record(3, Vec3::splat(9.0), &[2]),
        ];
        let mut nodes = build(records);
        assert_eq!(nodes.classify().unwrap(), 4);
    }

    #[test]
    fn test_walk_stops_at_junction() {
        // 0 (in) - 1 - 2 (junction) - {3, 4}; 3 and 4 are beyond the terminus.
        let records = vec![
            record(0, Vec3::splat(1.0), &[1]),
            record(1, outside(1.0), &[0, 2]),
            record(2, outside(2.0), &[1, 3, 4]),
            record(3, outside(3.0), &[2]),
            record(4, outside(4.0), &[2]),
        ];
        let mut nodes = build(records);
        assert_eq!(nodes.classify().unwrap(), 3);
        assert!(!nodes.get(NodeId::new(0, 3)).unwrap().keep);
    }

    #[test]
    fn test_two_node_cycle_is_fatal() {
        // Node 1 lists node 0 twice: a degenerate two-node cycle.
        let records = vec![
            record(0, Vec3::splat(1.0), &[1, 1]),
            record(1, outside(1.0), &[0, 0]),
        ];
        let mut nodes = build(records);
        let err = nodes.classify().unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Topology(TopologyError::TwoNodeCycle { .. })
        ));
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let records = vec![
            record(0, Vec3::splat(1.0), &[1]),
            record(1, Vec3::splat(2.0), &[0]),
        ];
        let nodes = build(records);
        assert_eq!(nodes.edge_count(), 1);
    }
}
