//! Image Tiles

use crate::geometry::*;
use crate::pbrt::*;
use std::sync::Mutex;

/// Default edge length of square tiles in pixels.
pub const DEFAULT_TILE_SIZE: usize = 16;

/// A rectangular block of pixels rendered as a unit by one thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Pixel bounds of the tile (upper bounds exclusive).
    pub bounds: Bounds2i,
}

impl Tile {
    /// Create a new tile.
    ///
    /// * `bounds` - Pixel bounds.
    pub fn new(bounds: Bounds2i) -> Self {
        Self { bounds }
    }
}

impl IntoIterator for Tile {
    type Item = Point2i;
    type IntoIter = Bounds2iIterator;

    /// Iterate over the tile's pixels in scanline order.
    fn into_iter(self) -> Self::IntoIter {
        self.bounds.into_iter()
    }
}

/// Produces the tiles of an image and hands them out to rendering threads.
pub trait TileGenerator {
    /// Returns every tile of the image.
    fn generate_tiles(&self) -> Vec<Tile>;

    /// Returns the next tile not yet handed out in the current pass or `None` when all tiles are taken. Every tile
    /// is handed out exactly once per pass even when called concurrently.
    fn generate_next_tile(&self) -> Option<Tile>;

    /// Start a new pass over all tiles.
    fn reset(&self);
}

/// Generates tiles in scanline order.
pub struct SequenceTileGenerator {
    /// The tiles of the image.
    tiles: Vec<Tile>,

    /// Index of the next tile to hand out.
    cursor: Mutex<usize>,
}

impl SequenceTileGenerator {
    /// Create a new `SequenceTileGenerator`.
    ///
    /// * `resolution` - Image resolution.
    /// * `tile_size`  - Edge length of the square tiles; edge tiles are clipped to the image.
    pub fn new(resolution: &Point2i, tile_size: usize) -> Result<Self, String> {
        if tile_size == 0 {
            return Err(String::from("Tile size must be greater than 0"));
        }
        if resolution.x <= 0 || resolution.y <= 0 {
            return Err(format!("Invalid image resolution {} x {}", resolution.x, resolution.y));
        }

        let size = tile_size as Int;
        let n_tiles_x = (resolution.x + size - 1) / size;
        let n_tiles_y = (resolution.y + size - 1) / size;

        let mut tiles = Vec::with_capacity((n_tiles_x * n_tiles_y) as usize);
        for ty in 0..n_tiles_y {
            for tx in 0..n_tiles_x {
                let p0 = Point2i::new(tx * size, ty * size);
                let p1 = Point2i::new(min(p0.x + size, resolution.x), min(p0.y + size, resolution.y));
                tiles.push(Tile::new(Bounds2i::new(p0, p1)));
            }
        }

        debug!("Generated {} tiles of size {}", tiles.len(), tile_size);

        Ok(Self {
            tiles,
            cursor: Mutex::new(0),
        })
    }
}

impl TileGenerator for SequenceTileGenerator {
    fn generate_tiles(&self) -> Vec<Tile> {
        self.tiles.clone()
    }

    fn generate_next_tile(&self) -> Option<Tile> {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        let tile = self.tiles.get(*cursor).copied();
        if tile.is_some() {
            *cursor += 1;
        }
        tile
    }

    fn reset(&self) {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner()) = 0;
    }
}

/// Boxed `TileGenerator` shared between rendering threads.
pub type BoxTileGenerator = Box<dyn TileGenerator + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn zero_tile_size_is_an_error() {
        assert!(SequenceTileGenerator::new(&Point2i::new(8, 8), 0).is_err());
        assert!(SequenceTileGenerator::new(&Point2i::new(0, 8), 4).is_err());
    }

    #[test]
    fn reset_starts_a_new_pass() {
        let generator = SequenceTileGenerator::new(&Point2i::new(4, 4), 2).unwrap();
        let first: Vec<Tile> = std::iter::from_fn(|| generator.generate_next_tile()).collect();
        assert_eq!(first.len(), 4);
        assert!(generator.generate_next_tile().is_none());
        generator.reset();
        let second: Vec<Tile> = std::iter::from_fn(|| generator.generate_next_tile()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_hand_out_is_exactly_once() {
        let generator = Arc::new(SequenceTileGenerator::new(&Point2i::new(100, 70), 8).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || std::iter::from_fn(|| generator.generate_next_tile()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<Tile> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        assert_eq!(all.len(), generator.generate_tiles().len());
        all.sort_by_key(|t| (t.bounds.p_min.y, t.bounds.p_min.x));
        all.dedup();
        assert_eq!(all.len(), generator.generate_tiles().len());
    }

    proptest! {
        #[test]
        fn tiles_partition_image(w in 1..80i32, h in 1..80i32, tile_size in 1..20usize) {
            let generator = SequenceTileGenerator::new(&Point2i::new(w, h), tile_size).unwrap();
            let mut seen = HashSet::new();
            for tile in generator.generate_tiles() {
                for p in tile {
                    prop_assert!(p.x >= 0 && p.x < w && p.y >= 0 && p.y < h);
                    prop_assert!(seen.insert((p.x, p.y)));
                }
            }
            prop_assert_eq!(seen.len() as i32, w * h);
        }
    }
}
