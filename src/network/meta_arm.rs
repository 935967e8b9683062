//! Meta-arms: caller-defined groupings of classified arms.
//!
//! The grouping rule belongs to the caller. This module fixes the contract
//! (a type plus an ordered point list per group) and supplies the point
//! walking that every grouping needs.

use super::arms::{Arm, ArmType};
use super::graph::Network;
use crate::geometry::Vec3;

/// One group of arms sharing a type, with a polyline for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaArm {
    pub arm_type: ArmType,
    /// Ids of the member arms.
    pub arm_ids: Vec<i32>,
    pub points: Vec<Vec3>,
}

impl MetaArm {
    /// Concatenate the point lists of `arms` (indices into `net.arms`).
    pub fn from_arms(net: &Network, arm_type: ArmType, arms: &[usize], include_ghosts: bool) -> Self {
        let mut points: Vec<Vec3> = Vec::new();
        for &a in arms {
            for p in arm_points(net, &net.arms[a], include_ghosts) {
                if points.last() != Some(&p) {
                    points.push(p);
                }
            }
        }
        Self {
            arm_type,
            arm_ids: arms.iter().map(|&a| net.arms[a].id).collect(),
            points,
        }
    }
}

/// Builds meta-arms from a loaded, classified and pruned network.
pub trait MetaArmGrouping {
    fn group(&self, net: &Network) -> Vec<MetaArm>;
}

/// Ordered node locations along an arm, starting at its first terminal.
///
/// Where periodic wrapping split the arm, the walk jumps from the ghost to
/// the physical node it mirrors. With `include_ghosts == false` ghost
/// locations are left out entirely.
pub fn arm_points(net: &Network, arm: &Arm, include_ghosts: bool) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(arm.segments.len() + 1);
    let Some(&start) = arm.terminal_nodes.first() else {
        return points;
    };

    let push = |n: usize, points: &mut Vec<Vec3>| {
        let node = &net.nodes[n];
        if include_ghosts || !node.ghost {
            points.push(node.location);
        }
    };

    let mut cur = start;
    push(cur, &mut points);
    for &s in &arm.segments {
        let seg = &net.segments[s];
        let here = net.nodes[cur].physical_id();
        let from = if seg.touches(cur) {
            cur
        } else {
            // Continue from the physical counterpart of a ghost.
            match seg
                .endpoints
                .iter()
                .find(|&&e| net.nodes[e].physical_id() == here)
            {
                Some(&e) => e,
                None => seg.endpoints[0],
            }
        };
        if from != cur {
            push(from, &mut points);
        }
        cur = seg.other_end(from);
        push(cur, &mut points);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::network::arms::{build_arms, classify_arms};
    use crate::network::graph::test_support::NetworkBuilder;
    use crate::network::ids::IdAllocator;
    use crate::network::wrap::wrap_boundary_segments;

    /// One group per arm type, in type order.
    struct ByType;

    impl MetaArmGrouping for ByType {
        fn group(&self, net: &Network) -> Vec<MetaArm> {
            ArmType::ALL
                .iter()
                .filter_map(|&t| {
                    let members: Vec<usize> =
                        (0..net.arms.len()).filter(|&a| net.arms[a].arm_type == t).collect();
                    (!members.is_empty()).then(|| MetaArm::from_arms(net, t, &members, true))
                })
                .collect()
        }
    }

    fn chain(xs: &[f64]) -> (Network, IdAllocator) {
        let mut b = NetworkBuilder::default();
        let nodes: Vec<usize> = xs.iter().map(|&x| b.node(Vec3::new(x, 0.0, 0.0), true)).collect();
        for w in nodes.windows(2) {
            b.segment(w[0], w[1], 5);
        }
        let mut net = b.finish();
        let mut ids = IdAllocator::default();
        build_arms(&mut net, &mut ids).unwrap();
        classify_arms(&mut net);
        (net, ids)
    }

    #[test]
    fn test_points_follow_the_chain() {
        let (net, _) = chain(&[0.0, 1.0, 2.0, 3.0]);
        let points = arm_points(&net, &net.arms[0], true);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert!(xs == vec![0.0, 1.0, 2.0, 3.0] || xs == vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_wrapped_arm_jumps_across_the_seam() {
        let (mut net, mut ids) = chain(&[7.0, 9.0, -9.0, -7.0]);
        let cell = Bounds::new(Vec3::splat(-10.0), Vec3::splat(10.0));
        wrap_boundary_segments(&mut net, &cell, &cell, &mut ids);

        let with = arm_points(&net, &net.arms[0], true);
        let without = arm_points(&net, &net.arms[0], false);
        println!("with ghosts: {with:?}");
        assert_eq!(with.len(), 5);
        assert_eq!(without.len(), 4);
        assert!(without.iter().all(|p| p.x.abs() <= 10.0));
    }

    #[test]
    fn test_grouping_contract() {
        let (net, _) = chain(&[0.0, 1.0, 2.0]);
        let groups = ByType.group(&net);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].arm_type, ArmType::Nn111);
        assert_eq!(groups[0].arm_ids, vec![net.arms[0].id]);
        assert_eq!(groups[0].points.len(), 3);
    }
}
