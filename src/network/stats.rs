//! Summary statistics over a reconstructed network.

use std::fmt;

use super::arms::ArmType;
use super::graph::Network;

/// Per-arm-type totals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArmTypeStats {
    pub arms: usize,
    pub segments: usize,
    pub length: f64,
}

/// Counters gathered across the load pipeline plus per-type totals of the
/// final network. Mirror segments from periodic wrapping are excluded from
/// segment counts and lengths so each physical line is measured once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkStats {
    pub records_read: usize,
    pub nodes_culled: usize,
    pub useless_nodes: usize,
    pub wrapped_segments: usize,
    pub ghost_nodes: usize,
    /// Length of segments that needed no periodic wrapping.
    pub short_length: f64,

    pub nodes: usize,
    pub segments: usize,
    pub arms: usize,
    pub total_length: f64,
    by_type: [ArmTypeStats; 9],
}

impl NetworkStats {
    /// Per-type totals of `net`. Pipeline counters are left at zero.
    pub fn collect(net: &Network) -> Self {
        let mut stats = Self {
            nodes: net.nodes.len(),
            arms: net.arms.len(),
            ..Self::default()
        };

        for arm in &net.arms {
            stats.by_type[slot(arm.arm_type)].arms += 1;
        }
        for s in 0..net.segments.len() {
            let seg = &net.segments[s];
            if seg.wrapped {
                continue;
            }
            let length = net.segment_length(s);
            let entry = &mut stats.by_type[slot(seg.mn_type)];
            entry.segments += 1;
            entry.length += length;
            stats.segments += 1;
            stats.total_length += length;
        }
        stats
    }

    pub fn by_type(&self, arm_type: ArmType) -> &ArmTypeStats {
        &self.by_type[slot(arm_type)]
    }
}

fn slot(arm_type: ArmType) -> usize {
    arm_type as i8 as usize
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records read:      {}", self.records_read)?;
        writeln!(f, "nodes culled:      {}", self.nodes_culled)?;
        writeln!(f, "useless pruned:    {}", self.useless_nodes)?;
        writeln!(
            f,
            "wrapped segments:  {} ({} ghost nodes)",
            self.wrapped_segments, self.ghost_nodes
        )?;
        writeln!(
            f,
            "final network:     {} nodes, {} segments, {} arms, length {:.3}",
            self.nodes, self.segments, self.arms, self.total_length
        )?;
        writeln!(f, "{:<14} {:>8} {:>10} {:>14}", "arm type", "arms", "segments", "length")?;
        for arm_type in ArmType::ALL {
            let s = self.by_type(arm_type);
            if s.arms == 0 && s.segments == 0 {
                continue;
            }
            writeln!(
                f,
                "{:<14} {:>8} {:>10} {:>14.3}",
                arm_type.name(),
                s.arms,
                s.segments,
                s.length
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, Vec3};
    use crate::network::arms::{build_arms, classify_arms};
    use crate::network::graph::test_support::NetworkBuilder;
    use crate::network::ids::IdAllocator;
    use crate::network::wrap::wrap_boundary_segments;

    #[test]
    fn test_wrapped_mirrors_are_counted_once() {
        let mut b = NetworkBuilder::default();
        let x = b.node(Vec3::new(9.0, 0.0, 0.0), true);
        let y = b.node(Vec3::new(-9.0, 0.0, 0.0), true);
        let z = b.node(Vec3::new(-9.0, 3.0, 0.0), true);
        b.segment(x, y, 4);
        b.segment(y, z, 4);
        let mut net = b.finish();

        let mut ids = IdAllocator::default();
        build_arms(&mut net, &mut ids).unwrap();
        classify_arms(&mut net);
        let cell = Bounds::new(Vec3::splat(-10.0), Vec3::splat(10.0));
        wrap_boundary_segments(&mut net, &cell, &cell, &mut ids);

        let stats = NetworkStats::collect(&net);
        println!("{stats}");
        assert_eq!(net.segments.len(), 3);
        assert_eq!(stats.segments, 2);
        // 2 across the boundary plus 3 along y.
        assert!((stats.total_length - 5.0).abs() < 1e-9);

        let nn = stats.by_type(ArmType::Nn111);
        assert_eq!(nn.arms, 1);
        assert_eq!(nn.segments, 2);
        assert_eq!(stats.by_type(ArmType::Loop).arms, 0);
    }

    #[test]
    fn test_report_lists_only_present_types() {
        let mut b = NetworkBuilder::default();
        let x = b.node(Vec3::ZERO, true);
        let y = b.node(Vec3::X, true);
        b.segment(x, y, 1);
        let mut net = b.finish();
        build_arms(&mut net, &mut IdAllocator::default()).unwrap();
        classify_arms(&mut net);

        let report = NetworkStats::collect(&net).to_string();
        assert!(report.contains("NN_100"));
        assert!(!report.contains("MM_111"));
    }
}
