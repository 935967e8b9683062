//! Streaming reader for ParaDiS-style node dump files.
//!
//! Three header grammars are recognized from the first significant token:
//!
//! - a bare integer `1`: legacy positional header
//!   (`1 segs minX minY minZ maxX maxY maxZ nodeCount decompType gx gy gz`)
//! - `dataFileVersion = 2|3`: keyed header with `minSideX`..`maxSideZ`
//! - `dataFileVersion = N` (N >= 4): keyed header with
//!   `minCoordinates = [ x y z ]` / `maxCoordinates = [ x y z ]`
//!
//! Keyed headers end at `nodalData =`. Node records are identical in all
//! three: `dom,idx x y z numArms constraint` followed by `numArms` entries
//! of `dom,idx bx by bz nx ny nz`.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::NodeId;
use crate::error::{FormatError, NetworkError, Result};
use crate::geometry::{Bounds, Vec3};

/// Upper bound on arms reserved up front; the count comes from the file.
const ARM_CAPACITY_HINT: usize = 16;

/// Which header grammar the file used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderVariant {
    Legacy,
    ScalarBounds,
    ArrayBounds,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub variant: HeaderVariant,
    pub version: i64,
    pub bounds: Bounds,
    /// Declared node count, if the header carried one.
    pub node_count: Option<usize>,
}

/// One neighbor entry of a node record.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmRecord {
    pub neighbor: NodeId,
    pub burgers: Vec3,
    /// Glide-plane normal.
    pub normal: Vec3,
}

/// One node as written in the dump.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub location: Vec3,
    pub constraint: i32,
    pub arms: Vec<ArmRecord>,
}

/// Whitespace tokenizer over a line-oriented reader; `#` starts a comment.
struct Tokens<R> {
    reader: R,
    path: PathBuf,
    line: usize,
    pending: VecDeque<String>,
    buf: String,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R, path: PathBuf) -> Self {
        Self {
            reader,
            path,
            line: 0,
            pending: VecDeque::new(),
            buf: String::new(),
        }
    }

    fn next(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            self.buf.clear();
            let n = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|source| NetworkError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            if n == 0 {
                return Ok(None);
            }
            self.line += 1;
            let content = self.buf.split('#').next().unwrap_or("");
            self.pending
                .extend(content.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }

    fn require(&mut self, expected: &'static str) -> Result<String> {
        self.next()?
            .ok_or_else(|| FormatError::UnexpectedEof { expected }.into())
    }

    fn f64(&mut self, expected: &'static str) -> Result<f64> {
        let token = self.require(expected)?;
        parse_f64(&token, self.line)
    }

    fn int(&mut self, expected: &'static str) -> Result<i64> {
        let token = self.require(expected)?;
        parse_int(&token, self.line)
    }

    fn vec3(&mut self, expected: &'static str) -> Result<Vec3> {
        Ok(Vec3::new(
            self.f64(expected)?,
            self.f64(expected)?,
            self.f64(expected)?,
        ))
    }

    fn node_id(&mut self, expected: &'static str) -> Result<NodeId> {
        let token = self.require(expected)?;
        token.parse().map_err(|_| {
            FormatError::InvalidNodeTag {
                line: self.line,
                token,
            }
            .into()
        })
    }
}

fn parse_f64(token: &str, line: usize) -> Result<f64> {
    token.parse().map_err(|_| {
        FormatError::InvalidNumber {
            line,
            token: token.to_owned(),
        }
        .into()
    })
}

fn parse_int(token: &str, line: usize) -> Result<i64> {
    token.parse().map_err(|_| {
        FormatError::InvalidNumber {
            line,
            token: token.to_owned(),
        }
        .into()
    })
}

/// Streams node records out of a dump, one at a time.
pub struct DumpReader<R> {
    tokens: Tokens<R>,
    header: Header,
    records_read: usize,
    failed: bool,
}

impl DumpReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| NetworkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: BufRead> DumpReader<R> {
    /// Parse the header and position the reader at the first node record.
    pub fn from_reader(reader: R, path: &Path) -> Result<Self> {
        let mut tokens = Tokens::new(reader, path.to_path_buf());
        let header = read_header(&mut tokens)?;
        log::debug!(
            "{}: {:?} header, version {}, bounds {:?}..{:?}",
            path.display(),
            header.variant,
            header.version,
            header.bounds.min,
            header.bounds.max
        );
        Ok(Self {
            tokens,
            header,
            records_read: 0,
            failed: false,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read the next node record, or `None` at end of file.
    pub fn next_record(&mut self) -> Result<Option<NodeRecord>> {
        let Some(tag) = self.tokens.next()? else {
            return Ok(None);
        };
        let id: NodeId = tag.parse().map_err(|_| FormatError::InvalidNodeTag {
            line: self.tokens.line,
            token: tag,
        })?;
        let location = self.tokens.vec3("node location")?;
        let num_arms = self.tokens.int("arm count")?;
        let num_arms = usize::try_from(num_arms).map_err(|_| FormatError::InvalidNumber {
            line: self.tokens.line,
            token: num_arms.to_string(),
        })?;
        let constraint = self.tokens.int("node constraint")?;
        let constraint = i32::try_from(constraint).map_err(|_| FormatError::InvalidNumber {
            line: self.tokens.line,
            token: constraint.to_string(),
        })?;

        let mut arms = Vec::with_capacity(num_arms.min(ARM_CAPACITY_HINT));
        for _ in 0..num_arms {
            arms.push(ArmRecord {
                neighbor: self.tokens.node_id("arm neighbor tag")?,
                burgers: self.tokens.vec3("Burgers vector")?,
                normal: self.tokens.vec3("glide plane normal")?,
            });
        }

        self.records_read += 1;
        Ok(Some(NodeRecord {
            id,
            location,
            constraint,
            arms,
        }))
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<NodeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_record().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

/// Read only the header of a dump file.
pub fn read_header_from_path(path: &Path) -> Result<Header> {
    DumpReader::open(path).map(|r| r.header)
}

fn read_header<R: BufRead>(tokens: &mut Tokens<R>) -> Result<Header> {
    let Some(first) = tokens.next()? else {
        return Err(FormatError::MissingVersion { line: tokens.line }.into());
    };

    if first == "dataFileVersion" {
        return read_keyed_header(tokens);
    }

    match first.parse::<i64>() {
        Ok(1) => read_legacy_header(tokens),
        Ok(version) => Err(FormatError::UnsupportedVersion { version }.into()),
        Err(_) => Err(FormatError::MissingVersion { line: tokens.line }.into()),
    }
}

fn check_file_segments(segments: i64) -> Result<()> {
    if segments > 1 {
        return Err(FormatError::MultiSegmentDump { segments }.into());
    }
    Ok(())
}

fn to_count(count: i64, line: usize) -> Result<usize> {
    usize::try_from(count).map_err(|_| {
        FormatError::InvalidNumber {
            line,
            token: count.to_string(),
        }
        .into()
    })
}

fn read_legacy_header<R: BufRead>(tokens: &mut Tokens<R>) -> Result<Header> {
    check_file_segments(tokens.int("numFileSegments")?)?;
    let min = tokens.vec3("minimum coordinates")?;
    let max = tokens.vec3("maximum coordinates")?;
    let count = tokens.int("nodeCount")?;
    let count = to_count(count, tokens.line)?;
    let _decomp_type = tokens.int("decomposition type")?;
    let _decomp_geometry = tokens.vec3("decomposition geometry")?;

    Ok(Header {
        variant: HeaderVariant::Legacy,
        version: 1,
        bounds: Bounds::new(min, max),
        node_count: Some(count),
    })
}

fn read_keyed_header<R: BufRead>(tokens: &mut Tokens<R>) -> Result<Header> {
    let mut fields: FxHashMap<String, (usize, Vec<String>)> = FxHashMap::default();
    let mut key = String::from("dataFileVersion");

    loop {
        let eq = tokens.require("`=`")?;
        if eq != "=" {
            return Err(FormatError::UnexpectedToken {
                line: tokens.line,
                expected: "`=`",
                token: eq,
            }
            .into());
        }
        if key == "nodalData" {
            break;
        }

        let first = tokens.require("header value")?;
        let line = tokens.line;
        let values = if first == "[" {
            let mut values = Vec::new();
            loop {
                let token = tokens.require("`]`")?;
                if token == "]" {
                    break;
                }
                values.push(token);
            }
            values
        } else {
            vec![first]
        };
        fields.insert(key, (line, values));

        key = tokens.require("`nodalData`")?;
    }

    let scalar = |name: &'static str| -> Result<f64> {
        let (line, values) = fields
            .get(name)
            .ok_or(FormatError::MissingField { field: name })?;
        let token = values
            .first()
            .ok_or(FormatError::MissingField { field: name })?;
        parse_f64(token, *line)
    };
    let array = |name: &'static str| -> Result<Vec3> {
        let (line, values) = fields
            .get(name)
            .ok_or(FormatError::MissingField { field: name })?;
        if values.len() != 3 {
            return Err(FormatError::MissingField { field: name }.into());
        }
        Ok(Vec3::new(
            parse_f64(&values[0], *line)?,
            parse_f64(&values[1], *line)?,
            parse_f64(&values[2], *line)?,
        ))
    };
    let integer = |name: &'static str| -> Result<Option<i64>> {
        match fields.get(name) {
            Some((line, values)) => {
                let token = values
                    .first()
                    .ok_or(FormatError::MissingField { field: name })?;
                parse_int(token, *line).map(Some)
            }
            None => Ok(None),
        }
    };

    let version = integer("dataFileVersion")?.ok_or(FormatError::MissingField {
        field: "dataFileVersion",
    })?;
    if let Some(segments) = integer("numFileSegments")? {
        check_file_segments(segments)?;
    }

    let (variant, bounds) = match version {
        2 | 3 => (
            HeaderVariant::ScalarBounds,
            Bounds::new(
                Vec3::new(scalar("minSideX")?, scalar("minSideY")?, scalar("minSideZ")?),
                Vec3::new(scalar("maxSideX")?, scalar("maxSideY")?, scalar("maxSideZ")?),
            ),
        ),
        v if v >= 4 => (
            HeaderVariant::ArrayBounds,
            Bounds::new(array("minCoordinates")?, array("maxCoordinates")?),
        ),
        v => return Err(FormatError::UnsupportedVersion { version: v }.into()),
    };

    let node_count = match integer("nodeCount")? {
        Some(count) => Some(to_count(count, tokens.line)?),
        None => None,
    };

    Ok(Header {
        variant,
        version,
        bounds,
        node_count,
    })
}
