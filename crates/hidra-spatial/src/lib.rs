// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
3D grid spatial hash for neuron neighbor queries (spec §4.B).

Grounded on the teacher's `feagi_bdu::spatial::hash::MortonSpatialHash` —
same shape (a position-keyed bucket map plus neighbor queries, rebuilt by
the caller rather than kept live under concurrent mutation) — but keyed by
plain floor-divided grid cells rather than Morton/Roaring-bitmap encoding,
since Hidra neurons live in continuous `f32` space rather than a bounded
voxel grid.

Not safe for concurrent mutation: callers rebuild the hash within the tick
loop under the world lock, exactly as spec §4.B requires.
*/

use ahash::AHashMap;
use hidra_types::{NeuronId, Position};

type Cell = (i32, i32, i32);

#[derive(Debug, Clone, Copy)]
struct Entry {
    neuron_id: NeuronId,
    position: Position,
    /// Index of the next entry in this cell's bucket, or `None` for the
    /// list's tail. The arena is append-only within a build cycle and is
    /// reset (not freed) by `clear()`, so indices remain stable until the
    /// next clear.
    next: Option<usize>,
}

/// A grid-cell spatial hash over neuron positions.
pub struct SpatialHash {
    cell_size: f32,
    buckets: AHashMap<Cell, usize>,
    arena: Vec<Entry>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            buckets: AHashMap::new(),
            arena: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, p: Position) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    /// Reset the hash for a fresh rebuild. The arena's backing allocation is
    /// reused (truncated, not deallocated) — this is the "pool that is
    /// reset (not freed)" spec §4.B calls for.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.arena.clear();
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Insert a neuron at its current position. O(1) amortized.
    pub fn insert(&mut self, neuron_id: NeuronId, position: Position) {
        let cell = self.cell_of(position);
        let head = self.buckets.get(&cell).copied();
        let idx = self.arena.len();
        self.arena.push(Entry { neuron_id, position, next: head });
        self.buckets.insert(cell, idx);
    }

    /// Find every neuron whose Euclidean distance from `center` is at most
    /// `radius`, excluding any candidate located exactly at `center` itself
    /// (distance `0`) per spec §4.B. Points exactly on the radius boundary
    /// are included. Iterates the inclusive cube of cells spanning
    /// `[center - radius, center + radius]`.
    pub fn find_neighbors(&self, center: Position, radius: f32) -> Vec<NeuronId> {
        if self.arena.is_empty() || radius < 0.0 {
            return Vec::new();
        }

        let min_cell = self.cell_of(Position::new(center.x - radius, center.y - radius, center.z - radius));
        let max_cell = self.cell_of(Position::new(center.x + radius, center.y + radius, center.z + radius));
        let radius_sq = radius * radius;

        let mut out = Vec::new();
        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                for cz in min_cell.2..=max_cell.2 {
                    let mut next = self.buckets.get(&(cx, cy, cz)).copied();
                    while let Some(idx) = next {
                        let entry = &self.arena[idx];
                        let dist_sq = entry.position.distance_squared(&center);
                        if dist_sq > 0.0 && dist_sq <= radius_sq {
                            out.push(entry.neuron_id);
                        }
                        next = entry.next;
                    }
                }
            }
        }
        out
    }

    /// Count of distinct neurons within `radius` of `center` (see
    /// `find_neighbors` for the exclusion/inclusion rules).
    pub fn count_neighbors(&self, center: Position, radius: f32) -> usize {
        self.find_neighbors(center, radius).len()
    }

    /// The single nearest neighbor to `center`, if any exist within
    /// `radius`. Ties are broken by ascending neuron id for determinism.
    pub fn nearest_neighbor(&self, center: Position, radius: f32) -> Option<(NeuronId, Position)> {
        let min_cell = self.cell_of(Position::new(center.x - radius, center.y - radius, center.z - radius));
        let max_cell = self.cell_of(Position::new(center.x + radius, center.y + radius, center.z + radius));
        let radius_sq = radius * radius;

        let mut best: Option<(f32, Entry)> = None;
        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                for cz in min_cell.2..=max_cell.2 {
                    let mut next = self.buckets.get(&(cx, cy, cz)).copied();
                    while let Some(idx) = next {
                        let entry = self.arena[idx];
                        let dist_sq = entry.position.distance_squared(&center);
                        next = entry.next;
                        if dist_sq == 0.0 || dist_sq > radius_sq {
                            continue;
                        }
                        best = match best {
                            None => Some((dist_sq, entry)),
                            Some((best_dist, best_entry)) => {
                                if dist_sq < best_dist
                                    || (dist_sq == best_dist && entry.neuron_id < best_entry.neuron_id)
                                {
                                    Some((dist_sq, entry))
                                } else {
                                    Some((best_dist, best_entry))
                                }
                            }
                        };
                    }
                }
            }
        }
        best.map(|(_, e)| (e.neuron_id, e.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32, z: f32) -> Position {
        Position::new(x, y, z)
    }

    #[test]
    fn finds_neighbors_within_radius() {
        let mut hash = SpatialHash::new(5.0);
        hash.insert(NeuronId(1), p(0.0, 0.0, 0.0));
        hash.insert(NeuronId(2), p(1.0, 0.0, 0.0));
        hash.insert(NeuronId(3), p(10.0, 0.0, 0.0));

        let mut found = hash.find_neighbors(p(0.0, 0.0, 0.0), 2.0);
        found.sort_by_key(|id| id.0);
        assert_eq!(found, vec![NeuronId(2)]);
    }

    #[test]
    fn excludes_center_point_but_includes_radius_boundary() {
        let mut hash = SpatialHash::new(5.0);
        hash.insert(NeuronId(1), p(0.0, 0.0, 0.0)); // exactly at center
        hash.insert(NeuronId(2), p(3.0, 4.0, 0.0)); // distance exactly 5.0

        let found = hash.find_neighbors(p(0.0, 0.0, 0.0), 5.0);
        assert_eq!(found, vec![NeuronId(2)]);
    }

    #[test]
    fn clear_resets_pool_without_shrinking_capacity() {
        let mut hash = SpatialHash::new(5.0);
        for i in 0..100u64 {
            hash.insert(NeuronId(i), p(i as f32, 0.0, 0.0));
        }
        let cap_before = hash.arena.capacity();
        hash.clear();
        assert_eq!(hash.len(), 0);
        assert!(hash.arena.capacity() >= cap_before);
        assert!(hash.find_neighbors(p(0.0, 0.0, 0.0), 100.0).is_empty());
    }

    #[test]
    fn nearest_neighbor_breaks_ties_by_id() {
        let mut hash = SpatialHash::new(5.0);
        hash.insert(NeuronId(5), p(1.0, 0.0, 0.0));
        hash.insert(NeuronId(2), p(-1.0, 0.0, 0.0));
        let (id, _) = hash.nearest_neighbor(p(0.0, 0.0, 0.0), 10.0).unwrap();
        assert_eq!(id, NeuronId(2));
    }

    #[test]
    fn searches_spanning_multiple_cells() {
        let mut hash = SpatialHash::new(1.0);
        hash.insert(NeuronId(1), p(0.9, 0.0, 0.0));
        hash.insert(NeuronId(2), p(-0.9, 0.0, 0.0));
        let found = hash.find_neighbors(p(0.0, 0.0, 0.0), 1.0);
        assert_eq!(found.len(), 2);
    }
}
