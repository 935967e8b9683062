//! Arena-backed dislocation graph: full nodes, arm segments and arms.
//!
//! Nodes and segments reference each other by index into the owning
//! `Network`'s vectors. Indices are stable until pruning compacts the
//! arenas, after which every surviving node's `index` equals its position.

use super::arms::{Arm, ArmType};
use super::constants::{is_type_m, is_type_n, PINNED_CONSTRAINT};
use super::NodeId;
use crate::geometry::Vec3;

#[derive(Clone, Debug)]
pub struct FullNode {
    pub id: NodeId,
    pub location: Vec3,
    /// Degree, a junction-pattern code, or `USELESS_NODE` before pruning.
    pub node_type: i8,
    pub constraint: i32,
    pub in_bounds: bool,
    /// Synthesized by periodic wrapping.
    pub ghost: bool,
    /// For a ghost, the id of the node it mirrors.
    pub mirror_of: Option<NodeId>,
    pub neighbor_segments: Vec<usize>,
    /// Dense output index, assigned by renumbering.
    pub index: u32,
}

impl FullNode {
    pub fn new(id: NodeId, location: Vec3, constraint: i32, in_bounds: bool) -> Self {
        Self {
            id,
            location,
            node_type: 0,
            constraint,
            in_bounds,
            ghost: false,
            mirror_of: None,
            neighbor_segments: Vec::new(),
            index: 0,
        }
    }

    pub fn degree(&self) -> usize {
        self.neighbor_segments.len()
    }

    pub fn is_pinned(&self) -> bool {
        self.constraint == PINNED_CONSTRAINT
    }

    pub fn is_type_m(&self) -> bool {
        is_type_m(self.node_type)
    }

    pub fn is_type_n(&self) -> bool {
        is_type_n(self.node_type)
    }

    /// Id of the physical node this one stands for.
    pub fn physical_id(&self) -> NodeId {
        self.mirror_of.unwrap_or(self.id)
    }
}

/// One undirected, deduplicated connection between two nodes.
#[derive(Clone, Debug)]
pub struct ArmSegment {
    pub id: i32,
    pub endpoints: [usize; 2],
    pub burgers_vector: Vec3,
    /// Glide-plane normal from the record that created the segment.
    pub normal: Vec3,
    pub burgers_type: u8,
    pub mn_type: ArmType,
    /// This segment is the mirrored copy created by periodic wrapping.
    pub wrapped: bool,
    /// The synthetic mirror node among this segment's endpoints, if any.
    pub ghost_endpoint: Option<usize>,
    /// Number of file records that mentioned this connection.
    pub duplicate_count: u8,
    pub arm_id: i32,
    pub meta_arm_id: i32,
    /// Scratch flag for arm tracing.
    pub seen: bool,
}

impl ArmSegment {
    pub fn new(id: i32, endpoints: [usize; 2], burgers_vector: Vec3, burgers_type: u8) -> Self {
        Self {
            id,
            endpoints,
            burgers_vector,
            normal: Vec3::ZERO,
            burgers_type,
            mn_type: ArmType::Unknown,
            wrapped: false,
            ghost_endpoint: None,
            duplicate_count: 1,
            arm_id: -1,
            meta_arm_id: -1,
            seen: false,
        }
    }

    /// The endpoint opposite `node`.
    pub fn other_end(&self, node: usize) -> usize {
        if self.endpoints[0] == node {
            self.endpoints[1]
        } else {
            self.endpoints[0]
        }
    }

    pub fn touches(&self, node: usize) -> bool {
        self.endpoints.contains(&node)
    }

    /// Replace the endpoint `old` with `new`, keeping the other one.
    pub fn replace_endpoint(&mut self, old: usize, new: usize) {
        if self.endpoints[0] == old {
            self.endpoints[0] = new;
        } else if self.endpoints[1] == old {
            self.endpoints[1] = new;
        }
    }
}

/// Owner of every node, segment and arm of a loaded dump.
#[derive(Clone, Debug, Default)]
pub struct Network {
    pub nodes: Vec<FullNode>,
    pub segments: Vec<ArmSegment>,
    pub arms: Vec<Arm>,
}

impl Network {
    pub fn degree(&self, node: usize) -> usize {
        self.nodes[node].degree()
    }

    /// Straight-line length of a segment.
    pub fn segment_length(&self, segment: usize) -> f64 {
        let [a, b] = self.segments[segment].endpoints;
        (self.nodes[b].location - self.nodes[a].location).length()
    }

    /// Add a segment and register it with both endpoints.
    pub fn link(&mut self, segment: ArmSegment) -> usize {
        let s = self.segments.len();
        let [a, b] = segment.endpoints;
        self.segments.push(segment);
        self.nodes[a].neighbor_segments.push(s);
        self.nodes[b].neighbor_segments.push(s);
        s
    }

    /// Burgers types of the given segments.
    pub fn burgers_types(&self, segments: &[usize]) -> Vec<u8> {
        segments
            .iter()
            .map(|&s| self.segments[s].burgers_type)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Hand-built networks for stage tests.

    use super::*;
    use crate::network::burgers::burgers_type;

    pub const S: f64 = 0.577_350_269;

    /// Burgers vector for a given type (1..=7).
    pub fn burgers_of(t: u8) -> Vec3 {
        match t {
            1 => Vec3::X,
            2 => Vec3::Y,
            3 => Vec3::Z,
            4 => Vec3::new(S, S, S),
            5 => Vec3::new(S, S, -S),
            6 => Vec3::new(S, -S, S),
            7 => Vec3::new(S, -S, -S),
            _ => Vec3::new(1.0, 1.0, 0.0),
        }
    }

    #[derive(Default)]
    pub struct NetworkBuilder {
        pub net: Network,
        next_segment: i32,
    }

    impl NetworkBuilder {
        pub fn node(&mut self, location: Vec3, in_bounds: bool) -> usize {
            let i = self.net.nodes.len();
            self.net
                .nodes
                .push(FullNode::new(NodeId::new(0, i as u32), location, 0, in_bounds));
            i
        }

        pub fn segment(&mut self, a: usize, b: usize, t: u8) -> usize {
            let b_vec = burgers_of(t);
            let seg = ArmSegment::new(self.next_segment, [a, b], b_vec, burgers_type(b_vec));
            self.next_segment += 1;
            self.net.link(seg)
        }

        /// Set every node type to its degree.
        pub fn finish(mut self) -> Network {
            for node in &mut self.net.nodes {
                node.node_type = node.degree() as i8;
            }
            self.net
        }
    }
}
