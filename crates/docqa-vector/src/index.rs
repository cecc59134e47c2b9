//! Exact nearest-neighbour index over squared Euclidean distance.
//!
//! Vectors are stored row-major in insertion order; a vector's row is its id.
//! Search scans every row and keeps the k best in a bounded max-heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use docqa_core::error::{Error, Result};
use docqa_core::types::ChunkId;

use crate::distance::squared_l2;

/// Id reported for search slots that no stored vector fills.
pub const SENTINEL_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    pub id: i64,
}

impl Neighbor {
    fn sentinel() -> Self { Self { distance: f32::INFINITY, id: SENTINEL_ID } }

    pub fn is_sentinel(&self) -> bool { self.id < 0 }

    /// The chunk id, or `None` for a sentinel.
    pub fn chunk_id(&self) -> Option<ChunkId> { usize::try_from(self.id).ok() }
}

/// Up to k neighbours in ascending distance; padded with sentinels when k exceeds the index size.
///
/// Only stored hits are held in memory. The sentinel tail is produced on
/// iteration, so `k` may be arbitrarily large.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    hits: Vec<Neighbor>,
    k: usize,
}

impl SearchResult {
    /// Requested slot count, sentinels included.
    pub fn len(&self) -> usize { self.k }
    pub fn is_empty(&self) -> bool { self.k == 0 }

    /// All `k` slots: stored hits first, then sentinels.
    pub fn neighbors(&self) -> impl Iterator<Item = Neighbor> + '_ {
        let padding = self.k.saturating_sub(self.hits.len());
        self.hits.iter().copied().chain(std::iter::repeat(Neighbor::sentinel()).take(padding))
    }

    /// Non-sentinel entries as `(id, distance)`, order preserved.
    pub fn valid(&self) -> impl Iterator<Item = (ChunkId, f32)> + '_ {
        self.hits.iter().filter_map(|n| n.chunk_id().map(|id| (id, n.distance)))
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    id: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Candidate {
    // Lower id wins ties, so it sorts as the smaller candidate.
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance).then(self.id.cmp(&other.id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("index dimension must be positive".to_string()));
        }
        Ok(Self { dim, data: Vec::new() })
    }

    /// Build from vectors, inferring the dimension from the first one.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let first = vectors
            .first()
            .ok_or_else(|| Error::Encoding("cannot infer index dimension from zero vectors".to_string()))?;
        let mut index = Self::new(first.len())?;
        index.add(vectors)?;
        Ok(index)
    }

    /// Rebuild from a row-major buffer, as read back from storage.
    pub fn from_parts(dim: usize, data: Vec<f32>) -> Result<Self> {
        let index = Self::new(dim)?;
        if data.len() % dim != 0 {
            return Err(Error::MissingArtifact(format!(
                "index data of {} floats is not a whole number of {}-dim rows",
                data.len(),
                dim
            )));
        }
        Ok(Self { data, ..index })
    }

    /// Append vectors; ids continue from the current length. Nothing is added if any width is wrong.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: bad.len() });
        }
        self.data.reserve(vectors.len() * self.dim);
        for v in vectors { self.data.extend_from_slice(v); }
        Ok(())
    }

    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.data.len() / self.dim }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
    pub fn as_slice(&self) -> &[f32] { &self.data }

    pub fn vector(&self, id: ChunkId) -> Option<&[f32]> {
        let start = id.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResult> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if self.is_empty() || k == 0 {
            return Ok(SearchResult::default());
        }
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        for (id, row) in self.data.chunks_exact(self.dim).enumerate() {
            let candidate = Candidate { distance: squared_l2(query, row), id };
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }
        let hits: Vec<Neighbor> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor { distance: c.distance, id: c.id as i64 })
            .collect();
        Ok(SearchResult { hits, k })
    }
}
