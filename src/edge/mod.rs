//! Edge-adjacency extraction
//!
//! Reduces a triangle mesh to a deduplicated edge list where each record
//! carries the indices of the vertices opposite the edge in its (up to two)
//! incident triangles. The shading stage amplifies each record into outline
//! geometry; a missing second triangle marks a hard silhouette.
//!
//! Edge identity is the *unordered pair of endpoint positions*, keyed at a
//! fixed 4-decimal precision, so co-located duplicate vertices (UV seams)
//! collapse to a single edge instead of producing a doubled outline.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::collections::HashMap;
use thiserror::Error;

/// Sentinel for "no second incident triangle" (boundary edge).
pub const NO_OPPOSITE: i32 = -1;

/// Size of one persisted edge record in bytes.
pub const EDGE_RECORD_SIZE: usize = 16;

/// A deduplicated undirected mesh edge with opposite-apex bookkeeping.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct EdgeRecord {
    /// Index of the edge's first endpoint vertex.
    pub vertex1: i32,
    /// Index of the edge's second endpoint vertex.
    pub vertex2: i32,
    /// Index of the vertex opposite this edge in the first incident triangle.
    pub opposite1: i32,
    /// Index of the vertex opposite this edge in the second incident
    /// triangle, or [`NO_OPPOSITE`].
    pub opposite2: i32,
}

impl EdgeRecord {
    /// Whether this edge has only one incident triangle.
    pub fn is_boundary(&self) -> bool {
        self.opposite2 == NO_OPPOSITE
    }
}

/// Canonical edge key function: maps an ordered endpoint pair to its
/// identity string.
pub type EdgeKeyFn = fn(Vec3, Vec3) -> String;

/// Default canonical key: endpoint positions at fixed 4-decimal precision.
///
/// The exact formatting is load-bearing: persisted edge indices were
/// generated with it, and reproducing their dedup behavior requires the
/// same rounding.
pub fn position_key(a: Vec3, b: Vec3) -> String {
    format!(
        "({:.4},{:.4},{:.4})-({:.4},{:.4},{:.4})",
        a.x, a.y, a.z, b.x, b.y, b.z
    )
}

/// Builds deduplicated edge lists from triangle meshes.
pub struct EdgeIndexBuilder {
    key_fn: EdgeKeyFn,
}

impl Default for EdgeIndexBuilder {
    fn default() -> Self {
        Self {
            key_fn: position_key,
        }
    }
}

impl EdgeIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canonical key computation (e.g. with an exact or
    /// index-based identity scheme). The scan itself is unaffected.
    pub fn with_key_fn(key_fn: EdgeKeyFn) -> Self {
        Self { key_fn }
    }

    /// Extract the edge list from `positions` and a triangle index array.
    ///
    /// Records appear in first-discovery order of the scan, which makes
    /// reruns over unchanged input byte-identical. Output length is at most
    /// three times the triangle count. Triangles beyond the second one
    /// sharing an edge contribute nothing (non-manifold input).
    pub fn build(&self, positions: &[Vec3], indices: &[u32]) -> Vec<EdgeRecord> {
        let mut records: Vec<EdgeRecord> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();

        for tri in indices.chunks_exact(3) {
            let (v1, v2, v3) = (tri[0], tri[1], tri[2]);
            self.add_edge(v1, v2, v3, positions, &mut lookup, &mut records);
            self.add_edge(v2, v3, v1, positions, &mut lookup, &mut records);
            self.add_edge(v3, v1, v2, positions, &mut lookup, &mut records);
        }

        records
    }

    fn add_edge(
        &self,
        a: u32,
        b: u32,
        opposite: u32,
        positions: &[Vec3],
        lookup: &mut HashMap<String, usize>,
        records: &mut Vec<EdgeRecord>,
    ) {
        let pa = positions[a as usize];
        let pb = positions[b as usize];

        let forward = (self.key_fn)(pa, pb);
        if let Some(&i) = lookup.get(&forward) {
            if records[i].opposite2 == NO_OPPOSITE {
                records[i].opposite2 = opposite as i32;
            }
            return;
        }

        let reverse = (self.key_fn)(pb, pa);
        if let Some(&i) = lookup.get(&reverse) {
            if records[i].opposite2 == NO_OPPOSITE {
                records[i].opposite2 = opposite as i32;
            }
            return;
        }

        lookup.insert(forward, records.len());
        records.push(EdgeRecord {
            vertex1: a as i32,
            vertex2: b as i32,
            opposite1: opposite as i32,
            opposite2: NO_OPPOSITE,
        });
    }
}

/// Persisted edge-index decode error
#[derive(Error, Debug)]
pub enum EdgeIndexError {
    #[error("edge index blob length {0} is not a multiple of {EDGE_RECORD_SIZE}")]
    TruncatedRecord(usize),
}

/// Encode an edge list into the persisted record layout: an ordered list of
/// little-endian `(i32, i32, i32, i32)` tuples.
pub fn encode_edges(records: &[EdgeRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * EDGE_RECORD_SIZE);
    for record in records {
        out.extend_from_slice(&record.vertex1.to_le_bytes());
        out.extend_from_slice(&record.vertex2.to_le_bytes());
        out.extend_from_slice(&record.opposite1.to_le_bytes());
        out.extend_from_slice(&record.opposite2.to_le_bytes());
    }
    out
}

/// Decode the persisted record layout back into an edge list.
pub fn decode_edges(bytes: &[u8]) -> Result<Vec<EdgeRecord>, EdgeIndexError> {
    if bytes.len() % EDGE_RECORD_SIZE != 0 {
        return Err(EdgeIndexError::TruncatedRecord(bytes.len()));
    }

    let mut records = Vec::with_capacity(bytes.len() / EDGE_RECORD_SIZE);
    for chunk in bytes.chunks_exact(EDGE_RECORD_SIZE) {
        let field = |i: usize| i32::from_le_bytes(chunk[i * 4..i * 4 + 4].try_into().unwrap());
        records.push(EdgeRecord {
            vertex1: field(0),
            vertex2: field(1),
            opposite1: field(2),
            opposite2: field(3),
        });
    }
    Ok(records)
}
