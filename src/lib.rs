//! Dislocation-line network reconstruction.
//!
//! Turns a flat serial dump of dislocation nodes (each with a list of
//! neighbor arms and Burgers vectors) into a classified topological graph:
//!
//! 1. Bounds and a compact first pass over every node record
//! 2. Reachability culling against the visible subspace
//! 3. Full nodes and deduplicated arm segments for the retained set
//! 4. Arm tracing, butterfly/monster junction detection, arm classification
//! 5. Periodic wrapping of boundary-crossing segments
//! 6. Pruning of useless nodes, final renumbering
//!
//! # Example
//!
//! ```no_run
//! use dislocation_network::DataSet;
//!
//! let data = DataSet::open("rs0100.data").expect("dump should load");
//! println!("{} nodes, {} arms", data.num_nodes(), data.num_arms());
//! print!("{}", data.stats());
//! ```

pub mod dataset;
pub mod error;
pub mod geometry;
pub mod network;
pub mod util;

pub use dataset::{ArmSummary, DataSet, LoadOptions};
pub use error::{
    ClassificationError, ClassificationWarning, FormatError, NetworkError, Result, TopologyError,
    UsageError,
};
pub use geometry::{Bounds, Vec3};
pub use network::{
    Arm, ArmSegment, ArmType, FullNode, MetaArm, MetaArmGrouping, NetworkStats, NodeId,
};
