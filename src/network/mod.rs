//! Dislocation network model and the stages that build it.
//!
//! **Reading**
//! - Reader - header variants and streaming node records
//! - Minimal - compact first pass, reachability marking, culling
//!
//! **Building**
//! - Builder - full nodes, deduplicated segments, monster junctions
//! - Arms - arm tracing, butterfly junctions, arm classification
//! - Wrap - mirrors for segments crossing the periodic boundary
//!
//! **Finishing**
//! - Prune - useless-node removal, renumbering, consistency check
//! - Stats - per-arm-type totals
//! - Meta arms - caller-defined arm groupings

mod arms;
mod builder;
mod burgers;
mod constants;
mod graph;
mod ids;
mod meta_arm;
mod minimal;
mod prune;
mod stats;
mod wrap;

pub mod reader;

pub use arms::{build_arms, classify_arms, find_butterflies, Arm, ArmType};
pub use builder::{monster_type, GraphBuilder};
pub use burgers::{burgers_type, is_100, is_111};
pub use constants::*;
pub use graph::{ArmSegment, FullNode, Network};
pub use ids::{IdAllocator, Neighbor, NodeId, GHOST_DOMAIN};
pub use meta_arm::{arm_points, MetaArm, MetaArmGrouping};
pub use minimal::{MinimalNode, MinimalNodes, RetainedNodes};
pub use prune::{check_consistency, delete_useless, renumber_nodes, PruneSummary};
pub use stats::{ArmTypeStats, NetworkStats};
pub use wrap::{wrap_boundary_segments, WrapSummary};
