//! Removal of useless nodes, segments and arms, plus final renumbering.

use super::constants::{is_valid_node_type, BURGERS_UNKNOWN, USELESS_NODE};
use super::graph::Network;
use super::ArmType;
use crate::error::{ClassificationError, Result, TopologyError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub useless_nodes: usize,
    pub removed_segments: usize,
    pub removed_arms: usize,
}

/// A node is useless if it is out of bounds and so is every neighbor.
fn is_useless(net: &Network, node: usize) -> bool {
    let n = &net.nodes[node];
    !n.in_bounds
        && n.neighbor_segments.iter().all(|&s| {
            let other = net.segments[s].other_end(node);
            !net.nodes[other].in_bounds
        })
}

/// Delete useless nodes, every segment touching one, and every arm that
/// terminates at one or lost a segment. Compacts all three arenas.
pub fn delete_useless(net: &mut Network) -> PruneSummary {
    let useless: Vec<bool> = (0..net.nodes.len()).map(|n| is_useless(net, n)).collect();
    for (node, &dead) in net.nodes.iter_mut().zip(&useless) {
        if dead {
            node.node_type = USELESS_NODE;
        }
    }

    let dead_segment: Vec<bool> = net
        .segments
        .iter()
        .map(|s| s.endpoints.iter().any(|&e| useless[e]))
        .collect();

    let mut summary = PruneSummary {
        useless_nodes: useless.iter().filter(|&&u| u).count(),
        removed_segments: dead_segment.iter().filter(|&&d| d).count(),
        removed_arms: 0,
    };

    let node_map = compact_map(&useless);
    let segment_map = compact_map(&dead_segment);

    let nodes = std::mem::take(&mut net.nodes);
    net.nodes = nodes
        .into_iter()
        .zip(&useless)
        .filter(|(_, &dead)| !dead)
        .map(|(mut node, _)| {
            node.neighbor_segments = node
                .neighbor_segments
                .iter()
                .filter_map(|&s| segment_map[s])
                .collect();
            node
        })
        .collect();

    let segments = std::mem::take(&mut net.segments);
    net.segments = segments
        .into_iter()
        .zip(&dead_segment)
        .filter(|(_, &dead)| !dead)
        .map(|(mut seg, _)| {
            seg.endpoints = seg.endpoints.map(|e| node_map[e].unwrap_or(e));
            seg.ghost_endpoint = seg.ghost_endpoint.and_then(|g| node_map[g]);
            seg
        })
        .collect();

    let arms = std::mem::take(&mut net.arms);
    let before = arms.len();
    net.arms = arms
        .into_iter()
        .filter(|arm| {
            !arm.terminal_nodes.iter().any(|&n| useless[n])
                && !arm.segments.iter().any(|&s| dead_segment[s])
        })
        .map(|mut arm| {
            let remap_nodes = |v: &[usize]| v.iter().filter_map(|&n| node_map[n]).collect();
            let remap_segments = |v: &[usize]| v.iter().filter_map(|&s| segment_map[s]).collect();
            arm.terminal_nodes = remap_nodes(&arm.terminal_nodes);
            arm.terminal_segments = remap_segments(&arm.terminal_segments);
            arm.segments = remap_segments(&arm.segments);
            arm
        })
        .collect();
    summary.removed_arms = before - net.arms.len();

    log::debug!(
        "pruned {} useless nodes, {} segments, {} arms",
        summary.useless_nodes,
        summary.removed_segments,
        summary.removed_arms
    );
    summary
}

/// Old index -> new index, `None` for removed entries.
fn compact_map(removed: &[bool]) -> Vec<Option<usize>> {
    let mut next = 0;
    removed
        .iter()
        .map(|&dead| {
            if dead {
                None
            } else {
                next += 1;
                Some(next - 1)
            }
        })
        .collect()
}

/// Assign dense output indices in current order.
pub fn renumber_nodes(net: &mut Network) {
    for (i, node) in net.nodes.iter_mut().enumerate() {
        node.index = i as u32;
    }
}

/// Verify the pruned network against the closed type taxonomy and the
/// wrapping invariants.
pub fn check_consistency(net: &Network) -> Result<()> {
    for node in &net.nodes {
        if !is_valid_node_type(node.node_type) {
            return Err(ClassificationError::NodeTypeOutOfRange {
                node: node.id,
                node_type: node.node_type,
            }
            .into());
        }
    }

    for seg in &net.segments {
        debug_assert_ne!(seg.endpoints[0], seg.endpoints[1]);
        if !(1..=BURGERS_UNKNOWN).contains(&seg.burgers_type) {
            return Err(ClassificationError::BurgersTypeOutOfRange {
                segment: seg.id,
                burgers_type: seg.burgers_type,
            }
            .into());
        }
        if seg.mn_type == ArmType::Unknown {
            return Err(ClassificationError::UnclassifiedSegment { segment: seg.id }.into());
        }
        if seg.wrapped || seg.ghost_endpoint.is_some() {
            let ghosts = seg
                .endpoints
                .iter()
                .filter(|&&e| net.nodes[e].ghost)
                .count();
            if ghosts != 1 || seg.ghost_endpoint.is_none() {
                return Err(TopologyError::GhostEndpoint {
                    segment: seg.id,
                    ghosts,
                }
                .into());
            }
        }
    }
    Ok(())
}
