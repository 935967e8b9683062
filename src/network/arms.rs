//! Arm tracing and classification.
//!
//! An arm is a maximal run of segments between nodes of degree other than
//! two, or a closed cycle of degree-2 nodes. Arms are typed by how many of
//! their terminals are "M" junctions (butterflies and monsters) and by the
//! Burgers type of their segments.

use std::fmt;

use super::burgers::{all_distinct_known, is_100, is_111};
use super::constants::{BURGERS_UNKNOWN, BUTTERFLY_NODE, MONSTER_MIXED_NODE, SPECIAL_BUTTERFLY_NODE};
use super::graph::Network;
use super::ids::IdAllocator;
use crate::error::{Result, TopologyError};

#[repr(i8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ArmType {
    #[default]
    Unknown = 0,
    /// Representative Burgers vector is unclassifiable.
    Uninteresting = 1,
    Loop = 2,
    Mm111 = 3,
    Mn111 = 4,
    Nn111 = 5,
    Mm100 = 6,
    Mn100 = 7,
    Nn100 = 8,
}

impl ArmType {
    pub const ALL: [ArmType; 9] = [
        ArmType::Unknown,
        ArmType::Uninteresting,
        ArmType::Loop,
        ArmType::Mm111,
        ArmType::Mn111,
        ArmType::Nn111,
        ArmType::Mm100,
        ArmType::Mn100,
        ArmType::Nn100,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArmType::Unknown => "UNKNOWN",
            ArmType::Uninteresting => "UNINTERESTING",
            ArmType::Loop => "LOOP",
            ArmType::Mm111 => "MM_111",
            ArmType::Mn111 => "MN_111",
            ArmType::Nn111 => "NN_111",
            ArmType::Mm100 => "MM_100",
            ArmType::Mn100 => "MN_100",
            ArmType::Nn100 => "NN_100",
        }
    }

    /// The "100" counterpart of a "111" arm type.
    fn demoted(self) -> Self {
        match self {
            ArmType::Mm111 => ArmType::Mm100,
            ArmType::Mn111 => ArmType::Mn100,
            ArmType::Nn111 => ArmType::Nn100,
            other => other,
        }
    }
}

impl fmt::Display for ArmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub struct Arm {
    pub id: i32,
    /// One entry for a closed loop, two for an open chain.
    pub terminal_nodes: Vec<usize>,
    /// First and last segment; one entry if the arm is a single segment.
    pub terminal_segments: Vec<usize>,
    /// Segments in traversal order.
    pub segments: Vec<usize>,
    pub arm_type: ArmType,
}

impl Arm {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_loop(&self) -> bool {
        self.terminal_nodes.len() == 1
    }

    pub fn representative_segment(&self) -> usize {
        self.terminal_segments[0]
    }
}

/// Trace every arm of the network. Returns the number of arms built.
pub fn build_arms(net: &mut Network, ids: &mut IdAllocator) -> Result<usize> {
    for seg in &mut net.segments {
        seg.seen = false;
    }
    net.arms.clear();

    // Chains anchored at junctions and ends first.
    for n in 0..net.nodes.len() {
        if net.degree(n) == 2 {
            continue;
        }
        for k in 0..net.degree(n) {
            let s = net.nodes[n].neighbor_segments[k];
            if !net.segments[s].seen {
                let arm = trace_arm(net, n, s, ids.next_arm())?;
                net.arms.push(arm);
            }
        }
    }

    // Whatever is left belongs to junction-free cycles.
    for s in 0..net.segments.len() {
        if !net.segments[s].seen {
            let start = net.segments[s].endpoints[0];
            let arm = trace_arm(net, start, s, ids.next_arm())?;
            net.arms.push(arm);
        }
    }

    Ok(net.arms.len())
}

fn trace_arm(net: &mut Network, start: usize, first: usize, id: i32) -> Result<Arm> {
    let mut segments = Vec::new();
    let (mut node, mut seg) = (start, first);

    let end = loop {
        let segment = &mut net.segments[seg];
        if segment.seen {
            return Err(TopologyError::BrokenChain { segment: segment.id }.into());
        }
        segment.seen = true;
        segment.arm_id = id;
        segments.push(seg);

        let other = segment.other_end(node);
        if other == start || net.degree(other) != 2 {
            break other;
        }

        let Some(next) = net.nodes[other]
            .neighbor_segments
            .iter()
            .copied()
            .find(|&s| s != seg)
        else {
            return Err(TopologyError::BrokenChain {
                segment: net.segments[seg].id,
            }
            .into());
        };
        node = other;
        seg = next;
    };

    let last = seg;
    Ok(Arm {
        id,
        terminal_nodes: if end == start {
            vec![start]
        } else {
            vec![start, end]
        },
        terminal_segments: if last == first {
            vec![first]
        } else {
            vec![first, last]
        },
        segments,
        arm_type: ArmType::Unknown,
    })
}

/// Detect butterfly junctions across "100" arms. Returns the number of
/// nodes retyped.
///
/// A type-3 terminal whose partner is a mixed monster becomes a special
/// butterfly. Two type-3 terminals whose four outer segments carry four
/// distinct "111" Burgers types both become normal butterflies.
pub fn find_butterflies(net: &mut Network) -> usize {
    let mut retyped = 0;

    for a in 0..net.arms.len() {
        let arm = &net.arms[a];
        if arm.terminal_nodes.len() != 2 {
            continue;
        }
        if !is_100(net.segments[arm.representative_segment()].burgers_type) {
            continue;
        }
        let (arm_id, ends) = (arm.id, [arm.terminal_nodes[0], arm.terminal_nodes[1]]);

        for (this, other) in [(ends[0], ends[1]), (ends[1], ends[0])] {
            if net.nodes[this].node_type != 3 {
                continue;
            }
            if net.nodes[other].node_type == MONSTER_MIXED_NODE {
                net.nodes[this].node_type = SPECIAL_BUTTERFLY_NODE;
                retyped += 1;
                continue;
            }
            if net.nodes[other].node_type != 3 {
                continue;
            }

            let outer: Vec<usize> = [this, other]
                .iter()
                .flat_map(|&n| net.nodes[n].neighbor_segments.iter().copied())
                .filter(|&s| net.segments[s].arm_id != arm_id)
                .collect();
            let types = net.burgers_types(&outer);
            if types.len() == 4 && types.iter().all(|&t| is_111(t)) && all_distinct_known(&types) {
                net.nodes[this].node_type = BUTTERFLY_NODE;
                net.nodes[other].node_type = BUTTERFLY_NODE;
                retyped += 2;
                break;
            }
        }
    }

    retyped
}

/// Assign every arm its type and stamp it on the arm's segments.
pub fn classify_arms(net: &mut Network) {
    for a in 0..net.arms.len() {
        let arm = &net.arms[a];
        let arm_type = if arm.is_loop() {
            ArmType::Loop
        } else {
            let rep = net.segments[arm.representative_segment()].burgers_type;
            if rep == BURGERS_UNKNOWN {
                ArmType::Uninteresting
            } else {
                let m_count = arm
                    .terminal_nodes
                    .iter()
                    .filter(|&&n| net.nodes[n].is_type_m())
                    .count();
                let base = match m_count {
                    2 => ArmType::Mm111,
                    1 => ArmType::Mn111,
                    _ => ArmType::Nn111,
                };
                if is_100(rep) {
                    base.demoted()
                } else {
                    base
                }
            }
        };

        net.arms[a].arm_type = arm_type;
        for i in 0..net.arms[a].segments.len() {
            let s = net.arms[a].segments[i];
            net.segments[s].mn_type = arm_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::network::constants::MONSTER_MIXED_NODE;
    use crate::network::graph::test_support::NetworkBuilder;

    fn at(x: f64) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    fn build(net: &mut Network) -> usize {
        let mut ids = IdAllocator::default();
        build_arms(net, &mut ids).unwrap()
    }

    #[test]
    fn test_open_chain_is_one_arm() {
        let mut b = NetworkBuilder::default();
        let nodes: Vec<usize> = (0..5).map(|i| b.node(at(i as f64), true)).collect();
        for w in nodes.windows(2) {
            b.segment(w[0], w[1], 4);
        }
        let mut net = b.finish();

        assert_eq!(build(&mut net), 1);
        let arm = &net.arms[0];
        assert_eq!(arm.segment_count(), 4);
        assert_eq!(arm.terminal_nodes, vec![0, 4]);
        assert_eq!(arm.terminal_segments.len(), 2);
        assert!(net.segments.iter().all(|s| s.seen && s.arm_id == arm.id));
    }

    #[test]
    fn test_pure_cycle_is_loop() {
        let mut b = NetworkBuilder::default();
        let nodes: Vec<usize> = (0..4).map(|i| b.node(at(i as f64), true)).collect();
        for i in 0..4 {
            b.segment(nodes[i], nodes[(i + 1) % 4], 5);
        }
        let mut net = b.finish();

        assert_eq!(build(&mut net), 1);
        classify_arms(&mut net);
        let arm = &net.arms[0];
        assert!(arm.is_loop());
        assert_eq!(arm.segment_count(), 4);
        assert_eq!(arm.terminal_segments.len(), 2);
        assert_eq!(arm.arm_type, ArmType::Loop);
    }

    #[test]
    fn test_loop_hanging_off_junction() {
        // 0 - 1 junction, with cycle 1 - 2 - 3 - 1
        let mut b = NetworkBuilder::default();
        let n: Vec<usize> = (0..4).map(|i| b.node(at(i as f64), true)).collect();
        b.segment(n[0], n[1], 4);
        b.segment(n[1], n[2], 4);
        b.segment(n[2], n[3], 4);
        b.segment(n[3], n[1], 4);
        let mut net = b.finish();

        assert_eq!(build(&mut net), 2);
        let lp = net.arms.iter().find(|a| a.is_loop()).unwrap();
        assert_eq!(lp.terminal_nodes, vec![1]);
        assert_eq!(lp.terminal_segments.len(), 2);
        assert_eq!(lp.segment_count(), 3);
    }

    #[test]
    fn test_single_segment_arm() {
        let mut b = NetworkBuilder::default();
        let x = b.node(at(0.0), true);
        let y = b.node(at(1.0), true);
        b.segment(x, y, 1);
        let mut net = b.finish();

        build(&mut net);
        classify_arms(&mut net);
        let arm = &net.arms[0];
        assert_eq!(arm.terminal_nodes.len(), 2);
        assert_eq!(arm.terminal_segments.len(), 1);
        assert_eq!(arm.arm_type, ArmType::Nn100);
        assert_eq!(net.segments[0].mn_type, ArmType::Nn100);
    }

    /// Two type-3 nodes joined by a "100" segment, each with two outer
    /// "111" segments of the given types.
    fn butterfly(outer: [u8; 4]) -> Network {
        let mut b = NetworkBuilder::default();
        let left = b.node(at(0.0), true);
        let right = b.node(at(1.0), true);
        b.segment(left, right, 1);
        for (i, t) in outer.into_iter().enumerate() {
            let leaf = b.node(at(10.0 + i as f64), true);
            let hub = if i < 2 { left } else { right };
            b.segment(hub, leaf, t);
        }
        let mut net = b.finish();
        build(&mut net);
        net
    }

    #[test]
    fn test_normal_butterfly() {
        let mut net = butterfly([4, 5, 6, 7]);
        assert_eq!(find_butterflies(&mut net), 2);
        assert_eq!(net.nodes[0].node_type, BUTTERFLY_NODE);
        assert_eq!(net.nodes[1].node_type, BUTTERFLY_NODE);

        classify_arms(&mut net);
        let bridge = net.arms.iter().find(|a| a.segments == vec![0]).unwrap();
        assert_eq!(bridge.arm_type, ArmType::Mm100);
        // Leaf arms have one M terminal.
        assert!(net
            .arms
            .iter()
            .filter(|a| a.id != bridge.id)
            .all(|a| a.arm_type == ArmType::Mn111));
    }

    #[test]
    fn test_repeated_outer_type_is_not_a_butterfly() {
        let mut net = butterfly([4, 5, 4, 7]);
        assert_eq!(find_butterflies(&mut net), 0);
        assert_eq!(net.nodes[0].node_type, 3);
    }

    #[test]
    fn test_special_butterfly_next_to_mixed_monster() {
        let mut net = butterfly([4, 5, 6, 7]);
        net.nodes[1].node_type = MONSTER_MIXED_NODE;
        assert_eq!(find_butterflies(&mut net), 1);
        assert_eq!(net.nodes[0].node_type, SPECIAL_BUTTERFLY_NODE);
        assert_eq!(net.nodes[1].node_type, MONSTER_MIXED_NODE);
    }

    #[test]
    fn test_unclassifiable_arm_is_uninteresting() {
        let mut b = NetworkBuilder::default();
        let x = b.node(at(0.0), true);
        let y = b.node(at(1.0), true);
        b.segment(x, y, 8);
        let mut net = b.finish();
        build(&mut net);
        classify_arms(&mut net);
        assert_eq!(net.arms[0].arm_type, ArmType::Uninteresting);
    }
}
