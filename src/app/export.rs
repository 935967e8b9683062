//! Network export for external analysis and rendering.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use dislocation_network::network::arm_points;
use dislocation_network::{DataSet, NetworkError, Result, Vec3};

/// Export the loaded network to a JSON file (optionally gzipped).
pub fn export_network(data: &DataSet, path: &Path) -> Result<()> {
    print!("Exporting to {}... ", path.display());
    let start = Instant::now();

    let export = NetworkExport::from_dataset(data);
    write_json(&export, path).map_err(|source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    println!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

fn write_json(export: &NetworkExport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;

    // Check if we should gzip based on extension
    let is_gzip = path.extension().map(|ext| ext == "gz").unwrap_or(false);

    if is_gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, export)?;
        encoder.finish()?.flush()
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, export)?;
        writer.flush()
    }
}

#[derive(Serialize)]
struct NetworkExport {
    metadata: Metadata,
    nodes: NodeData,
    segments: SegmentData,
    arms: Vec<ArmData>,
}

#[derive(Serialize)]
struct Metadata {
    source: String,
    file_version: i64,
    domain_min: [f64; 3],
    domain_max: [f64; 3],
    subspace_min: [f64; 3],
    subspace_max: [f64; 3],
    num_nodes: usize,
    num_segments: usize,
    num_arms: usize,
    total_length: f64,
    num_warnings: usize,
}

#[derive(Serialize)]
struct NodeData {
    id: Vec<String>,
    location: Vec<[f64; 3]>,
    node_type: Vec<i8>,
    num_neighbors: Vec<usize>,
    ghost: Vec<bool>,
}

#[derive(Serialize)]
struct SegmentData {
    endpoints: Vec<[u32; 2]>,
    burgers_type: Vec<u8>,
    arm_type: Vec<&'static str>,
    arm_id: Vec<i32>,
    wrapped: Vec<bool>,
}

#[derive(Serialize)]
struct ArmData {
    id: i32,
    arm_type: &'static str,
    segment_count: usize,
    length: f64,
    points: Vec<[f64; 3]>,
}

fn arr(v: Vec3) -> [f64; 3] {
    v.to_array()
}

impl NetworkExport {
    fn from_dataset(data: &DataSet) -> Self {
        let nodes = data.nodes();
        let segments = data.segments();
        let subspace = data.subspace();

        let node_data = NodeData {
            id: nodes.iter().map(|n| n.id.to_string()).collect(),
            location: nodes.iter().map(|n| arr(n.location)).collect(),
            node_type: nodes.iter().map(|n| n.node_type).collect(),
            num_neighbors: nodes.iter().map(|n| n.degree()).collect(),
            ghost: nodes.iter().map(|n| n.ghost).collect(),
        };

        let segment_data = SegmentData {
            endpoints: (0..segments.len()).map(|s| data.segment_endpoints(s)).collect(),
            burgers_type: segments.iter().map(|s| s.burgers_type).collect(),
            arm_type: segments.iter().map(|s| s.mn_type.name()).collect(),
            arm_id: segments.iter().map(|s| s.arm_id).collect(),
            wrapped: segments.iter().map(|s| s.wrapped).collect(),
        };

        let arms = (0..data.num_arms())
            .map(|a| {
                let summary = data.arm_summary(a);
                ArmData {
                    id: summary.id,
                    arm_type: summary.arm_type.name(),
                    segment_count: summary.segment_count,
                    length: summary.length,
                    points: arm_points(data.network(), data.arm(a), true)
                        .into_iter()
                        .map(arr)
                        .collect(),
                }
            })
            .collect();

        let stats = data.stats();
        Self {
            metadata: Metadata {
                source: data.path().display().to_string(),
                file_version: data.header().version,
                domain_min: arr(data.bounds().min),
                domain_max: arr(data.bounds().max),
                subspace_min: arr(subspace.min),
                subspace_max: arr(subspace.max),
                num_nodes: data.num_nodes(),
                num_segments: data.num_segments(),
                num_arms: data.num_arms(),
                total_length: stats.total_length,
                num_warnings: data.warnings().len(),
            },
            nodes: node_data,
            segments: segment_data,
            arms,
        }
    }
}
