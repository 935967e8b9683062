//! Periodic wrapping of segments that cross the simulation cell boundary.
//!
//! A segment whose endpoints lie more than half a cell apart on some axis
//! really connects through the periodic face. For each one we mint a
//! mirror of both endpoints and a mirrored segment, then splice endpoints
//! so both copies are geometrically short:
//!
//! ```text
//!   before:  A ------------------------------------ B
//!   after:   A -- B'        (original, B' = B shifted next to A)
//!            A' -- B        (mirror,   A' = A shifted next to B)
//! ```

use super::graph::{FullNode, Network};
use super::ids::IdAllocator;
use crate::geometry::{periodic_shift, Bounds, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WrapSummary {
    pub wrapped_segments: usize,
    pub ghost_nodes: usize,
    /// Summed length of segments that needed no wrapping.
    pub short_length: f64,
}

/// Wrap every boundary-crossing segment present before the call.
pub fn wrap_boundary_segments(
    net: &mut Network,
    domain: &Bounds,
    subspace: &Bounds,
    ids: &mut IdAllocator,
) -> WrapSummary {
    let size = domain.size();
    let mut summary = WrapSummary::default();

    for s in 0..net.segments.len() {
        let [a, b] = net.segments[s].endpoints;
        let (pa, pb) = (net.nodes[a].location, net.nodes[b].location);
        let shift = periodic_shift(pa, pb, size);
        if shift == Vec3::ZERO {
            summary.short_length += (pb - pa).length();
            continue;
        }

        let b_ghost = push_ghost(net, b, pb + shift, subspace, ids);
        let a_ghost = push_ghost(net, a, pa - shift, subspace, ids);

        // Original segment now ends at B's mirror next to A.
        let seg = &mut net.segments[s];
        seg.replace_endpoint(b, b_ghost);
        seg.ghost_endpoint = Some(b_ghost);
        net.nodes[b].neighbor_segments.retain(|&x| x != s);
        net.nodes[b_ghost].neighbor_segments.push(s);

        // Mirrored copy runs from A's mirror to B.
        let mut mirror = net.segments[s].clone();
        mirror.id = ids.next_segment();
        mirror.endpoints = [a_ghost, b];
        mirror.wrapped = true;
        mirror.ghost_endpoint = Some(a_ghost);
        net.link(mirror);

        summary.wrapped_segments += 1;
        summary.ghost_nodes += 2;
    }

    log::debug!(
        "wrapped {} segments, {} ghost nodes",
        summary.wrapped_segments,
        summary.ghost_nodes
    );
    summary
}

fn push_ghost(
    net: &mut Network,
    original: usize,
    location: Vec3,
    subspace: &Bounds,
    ids: &mut IdAllocator,
) -> usize {
    let source = &net.nodes[original];
    let mut ghost = FullNode::new(
        ids.next_ghost_node(),
        location,
        source.constraint,
        subspace.contains(location),
    );
    ghost.node_type = source.node_type;
    ghost.ghost = true;
    ghost.mirror_of = Some(source.id);
    net.nodes.push(ghost);
    net.nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::graph::test_support::NetworkBuilder;

    fn domain() -> Bounds {
        Bounds::new(Vec3::splat(-10.0), Vec3::splat(10.0))
    }

    #[test]
    fn test_short_segments_are_untouched() {
        let mut b = NetworkBuilder::default();
        let x = b.node(Vec3::new(-2.0, 0.0, 0.0), true);
        let y = b.node(Vec3::new(2.0, 0.0, 0.0), true);
        b.segment(x, y, 4);
        let mut net = b.finish();

        let summary =
            wrap_boundary_segments(&mut net, &domain(), &domain(), &mut IdAllocator::default());
        assert_eq!(summary.wrapped_segments, 0);
        assert_eq!(net.nodes.len(), 2);
        assert_eq!(net.segments.len(), 1);
        assert!((summary.short_length - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_segment_gets_two_mirrors_and_one_copy() {
        let mut b = NetworkBuilder::default();
        let x = b.node(Vec3::new(9.0, 0.0, 0.0), true);
        let y = b.node(Vec3::new(-9.0, 0.0, 0.0), true);
        b.segment(x, y, 4);
        let mut net = b.finish();

        let summary =
            wrap_boundary_segments(&mut net, &domain(), &domain(), &mut IdAllocator::default());
        assert_eq!(summary.wrapped_segments, 1);
        assert_eq!(net.nodes.len(), 4);
        assert_eq!(net.segments.len(), 2);

        let original = &net.segments[0];
        let mirror = &net.segments[1];
        assert!(!original.wrapped && mirror.wrapped);
        assert_eq!(original.endpoints[0], x);
        assert_eq!(mirror.endpoints[1], y);

        let b_ghost = original.endpoints[1];
        let a_ghost = mirror.endpoints[0];
        assert!(net.nodes[b_ghost].ghost && net.nodes[a_ghost].ghost);
        assert_eq!(net.nodes[b_ghost].physical_id(), net.nodes[y].id);
        assert_eq!(net.nodes[a_ghost].physical_id(), net.nodes[x].id);
        assert_eq!(
            net.nodes[b_ghost].location,
            net.nodes[y].location + Vec3::new(20.0, 0.0, 0.0)
        );
        assert_eq!(
            net.nodes[a_ghost].location,
            net.nodes[x].location - Vec3::new(20.0, 0.0, 0.0)
        );
        // Mirrors land outside the cell.
        assert!(!net.nodes[b_ghost].in_bounds && !net.nodes[a_ghost].in_bounds);

        // Both copies are short, and connectivity is preserved.
        assert!((net.segment_length(0) - 2.0).abs() < 1e-12);
        assert!((net.segment_length(1) - 2.0).abs() < 1e-12);
        assert_eq!(net.nodes[x].neighbor_segments, vec![0]);
        assert_eq!(net.nodes[y].neighbor_segments, vec![1]);
        assert_eq!(net.nodes[b_ghost].neighbor_segments, vec![0]);
        assert_eq!(net.nodes[a_ghost].neighbor_segments, vec![1]);
    }
}
