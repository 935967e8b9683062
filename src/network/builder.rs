//! Second pass: full nodes and deduplicated arm segments.
//!
//! Only records whose file position survived culling are materialized.
//! Each neighbor entry either creates a segment (with the far end left as
//! a placeholder id) or resolves the placeholder of the segment created
//! when the other endpoint was read first.
//!
//! Node types come from the full record, so a junction kept at the edge
//! of the subspace keeps its real degree after its culled arms are gone.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::burgers::{all_distinct_known, burgers_type, is_100, is_111};
use super::constants::{BURGERS_UNKNOWN, MAX_NODE_TYPE, MONSTER_111_NODE, MONSTER_MIXED_NODE};
use super::graph::{ArmSegment, FullNode, Network};
use super::ids::IdAllocator;
use super::minimal::RetainedNodes;
use super::reader::NodeRecord;
use super::{Neighbor, NodeId};
use crate::error::{ClassificationWarning, Result};
use crate::geometry::{Bounds, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentEnd {
    Node(usize),
    Pending(NodeId),
}

#[derive(Debug)]
struct PendingSegment {
    ends: [SegmentEnd; 2],
    burgers: Vec3,
    normal: Vec3,
    duplicate_count: u8,
}

/// Accumulates full nodes and segments from retained node records.
#[derive(Debug)]
pub struct GraphBuilder {
    subspace: Bounds,
    nodes: Vec<FullNode>,
    /// Burgers types of every arm entry in each node's record.
    record_burgers: Vec<Vec<u8>>,
    by_id: FxHashMap<NodeId, usize>,
    segments: Vec<PendingSegment>,
    segment_index: BTreeMap<Neighbor, usize>,
}

impl GraphBuilder {
    pub fn new(subspace: Bounds) -> Self {
        Self {
            subspace,
            nodes: Vec::new(),
            record_burgers: Vec::new(),
            by_id: FxHashMap::default(),
            segments: Vec::new(),
            segment_index: BTreeMap::new(),
        }
    }

    /// Re-scan a record stream, materializing only the retained positions.
    ///
    /// Stops reading once the last retained record has been consumed.
    pub fn from_retained<I>(records: I, retained: &RetainedNodes, subspace: Bounds) -> Result<Self>
    where
        I: IntoIterator<Item = Result<NodeRecord>>,
    {
        let mut builder = Self::new(subspace);
        let mut wanted = retained.file_order.iter().copied().peekable();

        for (position, record) in records.into_iter().enumerate() {
            let Some(&next) = wanted.peek() else {
                break;
            };
            let record = record?;
            if next as usize == position {
                builder.add_record(record);
                wanted.next();
            }
        }

        if wanted.peek().is_some() {
            log::warn!(
                "{} retained records missing on second pass",
                wanted.count()
            );
        }
        Ok(builder)
    }

    pub fn add_record(&mut self, record: NodeRecord) {
        if self.by_id.contains_key(&record.id) {
            log::warn!("duplicate record for node {}; skipped", record.id);
            return;
        }

        let node = self.nodes.len();
        let in_bounds = self.subspace.contains(record.location);
        self.nodes.push(FullNode::new(
            record.id,
            record.location,
            record.constraint,
            in_bounds,
        ));
        self.by_id.insert(record.id, node);
        self.record_burgers.push(
            record
                .arms
                .iter()
                .filter(|arm| arm.neighbor != record.id)
                .map(|arm| burgers_type(arm.burgers))
                .collect(),
        );

        for arm in record.arms {
            if arm.neighbor == record.id {
                continue;
            }
            let key = Neighbor::new(record.id, arm.neighbor);

            if let Some(&s) = self.segment_index.get(&key) {
                let seg = &mut self.segments[s];
                seg.duplicate_count = seg.duplicate_count.saturating_add(1);
                let placeholder = SegmentEnd::Pending(record.id);
                if let Some(end) = seg.ends.iter_mut().find(|end| **end == placeholder) {
                    *end = SegmentEnd::Node(node);
                    self.nodes[node].neighbor_segments.push(s);
                }
                continue;
            }

            let s = self.segments.len();
            let far = match self.by_id.get(&arm.neighbor) {
                Some(&other) => {
                    // Neighbor was read already but never listed us.
                    self.nodes[other].neighbor_segments.push(s);
                    SegmentEnd::Node(other)
                }
                None => SegmentEnd::Pending(arm.neighbor),
            };
            self.segments.push(PendingSegment {
                ends: [SegmentEnd::Node(node), far],
                burgers: arm.burgers,
                normal: arm.normal,
                duplicate_count: 1,
            });
            self.nodes[node].neighbor_segments.push(s);
            self.segment_index.insert(key, s);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop segments whose far end was never loaded, assign ids, classify
    /// Burgers vectors, and type nodes (monsters included) from their
    /// records.
    pub fn finish(
        self,
        ids: &mut IdAllocator,
        warnings: &mut Vec<ClassificationWarning>,
    ) -> Network {
        let mut remap: Vec<Option<usize>> = vec![None; self.segments.len()];
        let mut segments = Vec::with_capacity(self.segments.len());

        for (s, pending) in self.segments.into_iter().enumerate() {
            let [SegmentEnd::Node(a), SegmentEnd::Node(b)] = pending.ends else {
                continue;
            };
            let id = ids.next_segment();
            let kind = burgers_type(pending.burgers);
            if kind == BURGERS_UNKNOWN {
                log::warn!(
                    "segment {id}: unclassifiable Burgers vector {:?}",
                    pending.burgers
                );
                warnings.push(ClassificationWarning::UnclassifiableBurgers {
                    segment: id,
                    burgers: pending.burgers,
                });
            }
            let mut seg = ArmSegment::new(id, [a, b], pending.burgers, kind);
            seg.normal = pending.normal;
            seg.duplicate_count = pending.duplicate_count;
            remap[s] = Some(segments.len());
            segments.push(seg);
        }
        log::debug!(
            "{} segments resolved, {} dropped with an unloaded endpoint",
            segments.len(),
            remap.iter().filter(|r| r.is_none()).count()
        );

        let mut nodes = self.nodes;
        let mut monsters = 0;
        for (node, types) in nodes.iter_mut().zip(&self.record_burgers) {
            node.neighbor_segments = node
                .neighbor_segments
                .iter()
                .filter_map(|&s| remap[s])
                .collect();

            let degree = types.len();
            node.node_type = if let Some(monster) = monster_type(types) {
                monsters += 1;
                monster
            } else if degree > MAX_NODE_TYPE as usize {
                log::warn!("node {}: degree {degree} clamped", node.id);
                warnings.push(ClassificationWarning::NodeTypeClamped {
                    node: node.id,
                    degree,
                });
                MAX_NODE_TYPE
            } else {
                degree as i8
            };
        }

        log::debug!("{monsters} monster junctions");

        Network {
            nodes,
            segments,
            arms: Vec::new(),
        }
    }
}

/// Monster code for a four-valent junction whose arms carry pairwise
/// distinct, classifiable Burgers types, or `None`.
pub fn monster_type(types: &[u8]) -> Option<i8> {
    if types.len() != 4 || !all_distinct_known(types) {
        return None;
    }
    let n111 = types.iter().filter(|&&t| is_111(t)).count();
    let n100 = types.iter().filter(|&&t| is_100(t)).count();
    match (n111, n100) {
        (4, 0) => Some(MONSTER_111_NODE),
        (2, 2) => Some(MONSTER_MIXED_NODE),
        _ => None,
    }
}
