//! Error taxonomy for loading and classifying a dislocation network.
//!
//! Every fatal error aborts `read_data()`; the `DataSet` must then be
//! discarded. `ClassificationWarning` is the only non-fatal kind.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Vec3;
use crate::network::NodeId;

pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
}

/// Header or record could not be parsed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("no recognizable file version marker (line {line})")]
    MissingVersion { line: usize },

    #[error("unsupported data file version {version}")]
    UnsupportedVersion { version: i64 },

    #[error("header field `{field}` missing")]
    MissingField { field: &'static str },

    #[error("line {line}: expected a number, found `{token}`")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: expected {expected}, found `{token}`")]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        token: String,
    },

    #[error("line {line}: malformed node tag `{token}`")]
    InvalidNodeTag { line: usize, token: String },

    #[error("unexpected end of file while reading {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("dump is split across {segments} file segments; only single-segment dumps are readable")]
    MultiSegmentDump { segments: i64 },
}

/// The graph read from the file is malformed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("two-node cycle at node {node} while marking an out-of-bounds chain")]
    TwoNodeCycle { node: NodeId },

    #[error("wrapped segment {segment} has {ghosts} ghost endpoints, expected exactly one")]
    GhostEndpoint { segment: i32, ghosts: usize },

    #[error("arm chain through segment {segment} revisits an already traced segment")]
    BrokenChain { segment: i32 },
}

/// A survivor ended up outside the closed type taxonomy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("node {node} has type {node_type} outside the node taxonomy")]
    NodeTypeOutOfRange { node: NodeId, node_type: i8 },

    #[error("segment {segment} has Burgers type {burgers_type} outside 1..=8")]
    BurgersTypeOutOfRange { segment: i32, burgers_type: u8 },

    #[error("segment {segment} was never assigned an arm type")]
    UnclassifiedSegment { segment: i32 },
}

/// The caller configured or drove the `DataSet` incorrectly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UsageError {
    #[error("read_data() already ran; subspace and processor split are fixed")]
    AlreadyLoaded,

    #[error("cannot split domain as processor {index} of {total}; total must be a power of two above index")]
    InvalidProcSplit { index: u32, total: u32 },

    #[error("subspace minimum exceeds maximum")]
    InvalidSubspace,

    #[error("an explicit subspace and a processor split cannot both be given")]
    ConflictingSubspace,
}

/// Recoverable anomaly recorded during classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationWarning {
    /// Burgers vector matched none of the known patterns; segment kept as type 8.
    UnclassifiableBurgers { segment: i32, burgers: Vec3 },
    /// Node degree exceeded the taxonomy and was clamped.
    NodeTypeClamped { node: NodeId, degree: usize },
}

impl std::fmt::Display for ClassificationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnclassifiableBurgers { segment, burgers } => write!(
                f,
                "segment {segment}: unclassifiable Burgers vector ({:.4}, {:.4}, {:.4})",
                burgers.x, burgers.y, burgers.z
            ),
            Self::NodeTypeClamped { node, degree } => {
                write!(f, "node {node}: degree {degree} clamped to node type 8")
            }
        }
    }
}
