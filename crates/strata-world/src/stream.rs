//! Streaming policy: which chunks should exist around a viewpoint.
//!
//! Two concentric radii with a hysteresis band between them. Chunks inside
//! the load radius must exist; chunks beyond the evict radius must not; a
//! chunk in the band between keeps whatever state it has, so a viewpoint
//! oscillating near the boundary never thrashes.

use strata_voxel::ChunkCoord;

/// Radii of the streaming shell, in chunk units.
#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    /// Chunks within this distance of the viewpoint's chunk are loaded.
    pub load_radius: u32,
    /// Chunks beyond this distance are evicted. Must exceed `load_radius`.
    pub evict_radius: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            load_radius: 4,
            evict_radius: 6,
        }
    }
}

impl StreamConfig {
    /// `true` if a loaded chunk at `coord` has fallen out of range.
    pub fn should_evict(&self, center: ChunkCoord, coord: ChunkCoord) -> bool {
        let r = u64::from(self.evict_radius);
        center.distance_sq(coord) > r * r
    }
}

/// All chunk coordinates within `load_radius` of `center`, sorted by
/// ascending distance so nearby chunks are inserted (and therefore
/// serviced) first.
pub fn load_set(center: ChunkCoord, config: &StreamConfig) -> Vec<ChunkCoord> {
    debug_assert!(
        config.evict_radius > config.load_radius,
        "evict radius must exceed load radius to form a hysteresis band"
    );

    let r = config.load_radius as i32;
    let r_sq = u64::from(config.load_radius) * u64::from(config.load_radius);
    let mut set = Vec::new();

    for dz in -r..=r {
        for dy in -r..=r {
            for dx in -r..=r {
                let dist_sq = (dx * dx + dy * dy + dz * dz) as u64;
                if dist_sq <= r_sq {
                    set.push((dist_sq, center.offset(dx, dy, dz)));
                }
            }
        }
    }

    set.sort_by_key(|&(dist_sq, _)| dist_sq);
    set.into_iter().map(|(_, coord)| coord).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(load: u32, evict: u32) -> StreamConfig {
        StreamConfig {
            load_radius: load,
            evict_radius: evict,
        }
    }

    #[test]
    fn test_load_set_is_a_sphere_not_a_cube() {
        let set = load_set(ChunkCoord::new(0, 0, 0), &config(2, 4));
        // r=2 sphere: 33 lattice points; r=2 cube would be 125.
        assert_eq!(set.len(), 33);
        assert!(set.contains(&ChunkCoord::new(2, 0, 0)));
        assert!(!set.contains(&ChunkCoord::new(2, 2, 0)));
    }

    #[test]
    fn test_load_set_sorted_by_ascending_distance() {
        let center = ChunkCoord::new(5, -3, 2);
        let set = load_set(center, &config(3, 5));
        assert_eq!(set[0], center, "center chunk comes first");
        for pair in set.windows(2) {
            assert!(center.distance_sq(pair[0]) <= center.distance_sq(pair[1]));
        }
    }

    #[test]
    fn test_load_set_is_translation_invariant() {
        let at_origin = load_set(ChunkCoord::new(0, 0, 0), &config(2, 4));
        let shifted = load_set(ChunkCoord::new(10, 20, -30), &config(2, 4));
        assert_eq!(at_origin.len(), shifted.len());
    }

    #[test]
    fn test_hysteresis_band_neither_loads_nor_evicts() {
        let cfg = config(2, 4);
        let center = ChunkCoord::new(0, 0, 0);
        let in_band = ChunkCoord::new(3, 0, 0);

        assert!(!load_set(center, &cfg).contains(&in_band));
        assert!(!cfg.should_evict(center, in_band));
    }

    #[test]
    fn test_evict_boundary_is_exclusive() {
        let cfg = config(2, 4);
        let center = ChunkCoord::new(0, 0, 0);
        assert!(!cfg.should_evict(center, ChunkCoord::new(4, 0, 0)));
        assert!(cfg.should_evict(center, ChunkCoord::new(5, 0, 0)));
        assert!(cfg.should_evict(center, ChunkCoord::new(3, 3, 0)));
    }
}
