//! OFF and NOFF point files
//!
//! The header is a tag followed by three counts: `<tag> <vertices> <faces> <edges>`.
//! `OFF` vertices carry a position, `NOFF` vertices a position and a normal.
//! Only the vertex block is read; face records after it are ignored.

use crate::error::{open, IoError, IoResult};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;
use surfcrate_core::{NormalPointCloud3f, Point3f, Vector3f};
use tracing::debug;

/// Upper bound on the up-front allocation for the vertex block
const MAX_RESERVED_VERTICES: usize = 1 << 16;

/// Vertex data of an OFF or NOFF file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffPoints {
    pub positions: Vec<Point3f>,
    /// Present for `NOFF` files
    pub normals: Option<Vec<Vector3f>>,
}

impl OffPoints {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pair positions with normals, failing for files without normals
    pub fn into_oriented_cloud(self) -> IoResult<NormalPointCloud3f> {
        let normals = self.normals.ok_or_else(|| IoError::InvalidFormat {
            format: "OFF file has no normals, expected NOFF".to_string(),
        })?;
        NormalPointCloud3f::from_positions_and_normals(&self.positions, &normals).map_err(|e| {
            IoError::InvalidFormat {
                format: e.to_string(),
            }
        })
    }
}

/// Whitespace-separated tokens with their line numbers, `#` comments stripped
struct Tokens<R> {
    lines: std::io::Lines<R>,
    line: usize,
    pending: std::vec::IntoIter<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            pending: Vec::new().into_iter(),
        }
    }

    fn next_token(&mut self) -> IoResult<String> {
        loop {
            if let Some(token) = self.pending.next() {
                return Ok(token);
            }
            let text = self.lines.next().ok_or_else(|| IoError::ParseError {
                line: self.line,
                message: "unexpected end of file".to_string(),
            })??;
            self.line += 1;
            let content = text.split('#').next().unwrap_or("");
            self.pending = content
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
                .into_iter();
        }
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> IoResult<T> {
        let token = self.next_token()?;
        token.parse().map_err(|_| IoError::ParseError {
            line: self.line,
            message: format!("expected {}, found {:?}", what, token),
        })
    }

    fn vector(&mut self) -> IoResult<[f32; 3]> {
        Ok([
            self.parse("a coordinate")?,
            self.parse("a coordinate")?,
            self.parse("a coordinate")?,
        ])
    }
}

/// Parse OFF or NOFF vertex data from a reader
pub fn parse_off<R: BufRead>(reader: R) -> IoResult<OffPoints> {
    let mut tokens = Tokens::new(reader);

    let tag = tokens.next_token()?;
    let with_normals = match tag.as_str() {
        "OFF" => false,
        "NOFF" => true,
        _ => {
            return Err(IoError::InvalidFormat {
                format: format!("unknown OFF header {:?}", tag),
            })
        }
    };
    let vertex_count: usize = tokens.parse("a vertex count")?;
    let _faces: usize = tokens.parse("a face count")?;
    let _edges: usize = tokens.parse("an edge count")?;

    // The header count is untrusted until the body has been read
    let reserve = vertex_count.min(MAX_RESERVED_VERTICES);
    let mut positions = Vec::with_capacity(reserve);
    let mut normals = Vec::with_capacity(if with_normals { reserve } else { 0 });
    for _ in 0..vertex_count {
        let [x, y, z] = tokens.vector()?;
        positions.push(Point3f::new(x, y, z));
        if with_normals {
            let [nx, ny, nz] = tokens.vector()?;
            normals.push(Vector3f::new(nx, ny, nz));
        }
    }

    debug!(tag = %tag, vertices = vertex_count, "Parsed OFF vertices");
    Ok(OffPoints {
        positions,
        normals: with_normals.then_some(normals),
    })
}

/// Read an OFF or NOFF file
pub fn read_off<P: AsRef<Path>>(path: P) -> IoResult<OffPoints> {
    let file = open(path.as_ref())?;
    parse_off(BufReader::new(file))
}

/// Read a NOFF file as an oriented point cloud
pub fn read_oriented_cloud<P: AsRef<Path>>(path: P) -> IoResult<NormalPointCloud3f> {
    read_off(path)?.into_oriented_cloud()
}

/// Write an oriented cloud as NOFF with no faces
pub fn write_noff<W: Write>(cloud: &NormalPointCloud3f, mut writer: W) -> IoResult<()> {
    writeln!(writer, "NOFF {} 0 0", cloud.len())?;
    for p in cloud.iter() {
        writeln!(
            writer,
            "{} {} {} {} {} {}",
            p.position.x, p.position.y, p.position.z, p.normal.x, p.normal.y, p.normal.z
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_noff<P: AsRef<Path>>(cloud: &NormalPointCloud3f, path: P) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    write_noff(cloud, std::io::BufWriter::new(file))
}
