//! The loaded dislocation network and its query surface.
//!
//! A `DataSet` is configured (subspace, processor split) before
//! `read_data()` and is read-only afterwards. The load runs the pipeline
//! stages in order; any fatal error discards everything built so far.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::{ClassificationWarning, Result, UsageError};
use crate::geometry::{Bounds, Vec3};
use crate::network::reader::{read_header_from_path, DumpReader, Header};
use crate::network::{
    build_arms, check_consistency, classify_arms, delete_useless, find_butterflies,
    renumber_nodes, wrap_boundary_segments, Arm, ArmSegment, ArmType, FullNode, GraphBuilder,
    IdAllocator, MetaArm, MetaArmGrouping, MinimalNodes, Network, NetworkStats,
};
use crate::util::StageTimer;

/// Load-time configuration, fixed once `read_data()` runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadOptions {
    /// Visible region; defaults to the whole domain.
    pub subspace: Option<Bounds>,
    /// `(index, total)` of a processor split.
    pub proc_split: Option<(u32, u32)>,
}

/// Aggregate figures for one arm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmSummary {
    pub id: i32,
    pub arm_type: ArmType,
    pub segment_count: usize,
    pub length: f64,
    pub is_loop: bool,
}

pub struct DataSet {
    path: PathBuf,
    header: Header,
    options: LoadOptions,
    network: Network,
    warnings: Vec<ClassificationWarning>,
    stats: NetworkStats,
    meta_arms: Vec<MetaArm>,
    loaded: bool,
}

impl DataSet {
    /// Read the header of `path` so bounds are known. No nodes are loaded.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let header = read_header_from_path(&path)?;
        Ok(Self {
            path,
            header,
            options: LoadOptions::default(),
            network: Network::default(),
            warnings: Vec::new(),
            stats: NetworkStats::default(),
            meta_arms: Vec::new(),
            loaded: false,
        })
    }

    /// `new` followed by `read_data` over the whole domain.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut data = Self::new(path)?;
        data.read_data()?;
        Ok(data)
    }

    /// `new` with the given options applied, then `read_data`.
    pub fn open_with(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let mut data = Self::new(path)?;
        data.apply_options(&options)?;
        data.read_data()?;
        Ok(data)
    }

    /// Apply a processor split or an explicit subspace. Setting both is a
    /// `ConflictingSubspace` error.
    pub fn apply_options(&mut self, options: &LoadOptions) -> Result<()> {
        match (options.proc_split, options.subspace) {
            (Some(_), Some(_)) => Err(UsageError::ConflictingSubspace.into()),
            (Some((index, total)), None) => self.set_proc(index, total),
            (None, Some(sub)) => self.set_subspace(sub.min, sub.max),
            (None, None) => Ok(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Full simulation domain from the header.
    pub fn bounds(&self) -> &Bounds {
        &self.header.bounds
    }

    /// Region used for in-bounds tests.
    pub fn subspace(&self) -> Bounds {
        self.options.subspace.unwrap_or(self.header.bounds)
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Restrict the in-bounds region. Must precede `read_data`.
    pub fn set_subspace(&mut self, min: Vec3, max: Vec3) -> Result<()> {
        if self.loaded {
            return Err(UsageError::AlreadyLoaded.into());
        }
        let subspace = Bounds::new(min, max);
        if !subspace.is_valid() {
            return Err(UsageError::InvalidSubspace.into());
        }
        self.options.subspace = Some(subspace);
        Ok(())
    }

    /// Set the subspace to chunk `index` of `total` equal chunks.
    ///
    /// Chunk counts double along X, Y, Z in turn until they multiply to
    /// `total`, which must be a power of two. Chunks are numbered X-fastest.
    pub fn set_proc(&mut self, index: u32, total: u32) -> Result<()> {
        if self.loaded {
            return Err(UsageError::AlreadyLoaded.into());
        }
        let chunk = proc_chunk(&self.header.bounds, index, total)?;
        self.set_subspace(chunk.min, chunk.max)?;
        self.options.proc_split = Some((index, total));
        log::info!(
            "processor {index}/{total}: subspace {:?}..{:?}",
            chunk.min,
            chunk.max
        );
        Ok(())
    }

    /// Run the full reconstruction pipeline. Callable once.
    pub fn read_data(&mut self) -> Result<()> {
        if self.loaded {
            return Err(UsageError::AlreadyLoaded.into());
        }
        let _total = StageTimer::new("ReadData");
        let subspace = self.subspace();
        let domain = self.header.bounds;
        let mut ids = IdAllocator::default();
        let mut warnings = Vec::new();
        let mut counters = NetworkStats::default();

        let mut minimal = {
            let _t = StageTimer::new("ReadMinimalNodes");
            MinimalNodes::from_records(DumpReader::open(&self.path)?, &subspace)?
        };
        counters.records_read = minimal.len();
        if let Some(declared) = self.header.node_count {
            if declared != minimal.len() {
                log::warn!(
                    "{}: header declares {declared} nodes, found {}",
                    self.path.display(),
                    minimal.len()
                );
            }
        }

        let retained = {
            let _t = StageTimer::new("CullMinimalNodes");
            let kept = minimal.classify()?;
            log::debug!("{kept} nodes kept by reachability");
            minimal.cull()
        };
        counters.nodes_culled = retained.culled;
        log::info!(
            "{} records, {} retained, {} culled",
            counters.records_read,
            retained.len(),
            retained.culled
        );

        let mut net = {
            let _t = StageTimer::new("CreateFullNodesAndArmSegments");
            let builder =
                GraphBuilder::from_retained(DumpReader::open(&self.path)?, &retained, subspace)?;
            builder.finish(&mut ids, &mut warnings)
        };

        {
            let _t = StageTimer::new("BuildArms");
            let arms = build_arms(&mut net, &mut ids)?;
            let butterflies = find_butterflies(&mut net);
            classify_arms(&mut net);
            log::info!(
                "{} nodes, {} segments, {arms} arms, {butterflies} butterfly nodes",
                net.nodes.len(),
                net.segments.len()
            );
        }

        {
            let _t = StageTimer::new("WrapBoundarySegments");
            let wrap = wrap_boundary_segments(&mut net, &domain, &subspace, &mut ids);
            counters.wrapped_segments = wrap.wrapped_segments;
            counters.ghost_nodes = wrap.ghost_nodes;
            counters.short_length = wrap.short_length;
        }

        {
            let _t = StageTimer::new("DeleteUselessNodes");
            let pruned = delete_useless(&mut net);
            renumber_nodes(&mut net);
            check_consistency(&net)?;
            counters.useless_nodes = pruned.useless_nodes;
        }

        let mut stats = NetworkStats::collect(&net);
        stats.records_read = counters.records_read;
        stats.nodes_culled = counters.nodes_culled;
        stats.useless_nodes = counters.useless_nodes;
        stats.wrapped_segments = counters.wrapped_segments;
        stats.ghost_nodes = counters.ghost_nodes;
        stats.short_length = counters.short_length;
        log::info!(
            "final network: {} nodes, {} segments, {} arms, {} warnings",
            stats.nodes,
            stats.segments,
            stats.arms,
            warnings.len()
        );

        self.network = net;
        self.warnings = warnings;
        self.stats = stats;
        self.loaded = true;
        Ok(())
    }

    // --- Nodes ---

    pub fn num_nodes(&self) -> usize {
        self.network.nodes.len()
    }

    pub fn node(&self, i: usize) -> &FullNode {
        &self.network.nodes[i]
    }

    pub fn node_location(&self, i: usize) -> Vec3 {
        self.network.nodes[i].location
    }

    pub fn node_type(&self, i: usize) -> i8 {
        self.network.nodes[i].node_type
    }

    /// Degree-2 node on a LOOP arm.
    pub fn is_loop_node(&self, i: usize) -> bool {
        let node = &self.network.nodes[i];
        node.degree() == 2
            && node
                .neighbor_segments
                .iter()
                .any(|&s| self.network.segments[s].mn_type == ArmType::Loop)
    }

    pub fn is_type_m(&self, i: usize) -> bool {
        self.network.nodes[i].is_type_m()
    }

    pub fn is_type_n(&self, i: usize) -> bool {
        self.network.nodes[i].is_type_n()
    }

    pub fn node_num_neighbors(&self, i: usize) -> usize {
        self.network.nodes[i].degree()
    }

    // --- Segments ---

    pub fn num_segments(&self) -> usize {
        self.network.segments.len()
    }

    pub fn segment(&self, i: usize) -> &ArmSegment {
        &self.network.segments[i]
    }

    /// Endpoints as dense node indices.
    pub fn segment_endpoints(&self, i: usize) -> [u32; 2] {
        self.network.segments[i]
            .endpoints
            .map(|n| self.network.nodes[n].index)
    }

    pub fn segment_burgers_type(&self, i: usize) -> u8 {
        self.network.segments[i].burgers_type
    }

    pub fn segment_mn_type(&self, i: usize) -> ArmType {
        self.network.segments[i].mn_type
    }

    pub fn segment_arm_id(&self, i: usize) -> i32 {
        self.network.segments[i].arm_id
    }

    pub fn segment_meta_arm_id(&self, i: usize) -> i32 {
        self.network.segments[i].meta_arm_id
    }

    // --- Arms ---

    pub fn num_arms(&self) -> usize {
        self.network.arms.len()
    }

    pub fn arm(&self, i: usize) -> &Arm {
        &self.network.arms[i]
    }

    pub fn arm_summary(&self, i: usize) -> ArmSummary {
        let arm = &self.network.arms[i];
        ArmSummary {
            id: arm.id,
            arm_type: arm.arm_type,
            segment_count: arm.segment_count(),
            length: arm
                .segments
                .iter()
                .map(|&s| self.network.segment_length(s))
                .sum(),
            is_loop: arm.is_loop(),
        }
    }

    // --- Whole network ---

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn nodes(&self) -> &[FullNode] {
        &self.network.nodes
    }

    pub fn segments(&self) -> &[ArmSegment] {
        &self.network.segments
    }

    pub fn arms(&self) -> &[Arm] {
        &self.network.arms
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    /// Non-fatal anomalies recorded during the load.
    pub fn warnings(&self) -> &[ClassificationWarning] {
        &self.warnings
    }

    // --- Meta arms ---

    /// Store the groups produced by `grouping` and stamp each member
    /// segment with its group index. Replaces any earlier groups.
    pub fn attach_meta_arms(&mut self, grouping: &dyn MetaArmGrouping) -> usize {
        let groups = grouping.group(&self.network);

        let mut group_of: FxHashMap<i32, i32> = FxHashMap::default();
        for (g, meta) in groups.iter().enumerate() {
            for &arm_id in &meta.arm_ids {
                group_of.insert(arm_id, g as i32);
            }
        }
        for seg in &mut self.network.segments {
            seg.meta_arm_id = group_of.get(&seg.arm_id).copied().unwrap_or(-1);
        }

        log::debug!("attached {} meta arms", groups.len());
        self.meta_arms = groups;
        self.meta_arms.len()
    }

    pub fn num_meta_arms(&self) -> usize {
        self.meta_arms.len()
    }

    pub fn meta_arm(&self, i: usize) -> &MetaArm {
        &self.meta_arms[i]
    }

    pub fn meta_arms(&self) -> &[MetaArm] {
        &self.meta_arms
    }
}

/// Region of chunk `index` when `domain` is split into `total` chunks.
pub fn proc_chunk(domain: &Bounds, index: u32, total: u32) -> Result<Bounds> {
    if total == 0 || !total.is_power_of_two() || index >= total {
        return Err(UsageError::InvalidProcSplit { index, total }.into());
    }

    let mut counts = [1u32; 3];
    let mut axis = 0;
    while counts.iter().product::<u32>() < total {
        counts[axis] *= 2;
        axis = (axis + 1) % 3;
    }

    let [nx, ny, _] = counts;
    let cell = [index % nx, (index / nx) % ny, index / (nx * ny)];
    let step = domain.size() / Vec3::new(counts[0] as f64, counts[1] as f64, counts[2] as f64);
    let min = domain.min + step * Vec3::new(cell[0] as f64, cell[1] as f64, cell[2] as f64);
    Ok(Bounds::new(min, min + step))
}
