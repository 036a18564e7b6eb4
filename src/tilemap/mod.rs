use std::collections::HashMap;
use std::fmt;

use crate::rect::Rect;

pub mod chunk;

pub use chunk::{CHUNK_SIZE, ChunkBatch, ChunkBatcher, RenderBatches, TileVertex};

/// Small integer identifying a terrain type in the grid.
pub type TileId = u32;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Failures from tile-grid operations.
///
/// These are returned, never panicked: `set_tile` sits on a hot per-frame
/// interactive-edit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    /// Coordinate outside the fixed grid extent.
    InvalidCoordinate {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Row-major map data whose length does not match the grid extent.
    MapSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::InvalidCoordinate { x, y, width, height } => {
                write!(f, "tile coordinate ({x}, {y}) outside {width}x{height} grid")
            }
            TileError::MapSizeMismatch { expected, actual } => {
                write!(f, "map data has {actual} cells, grid expects {expected}")
            }
        }
    }
}

impl std::error::Error for TileError {}

/// Failures while building an [`AtlasMapping`] from JSON.
#[derive(Debug)]
pub enum AtlasError {
    /// The document is not valid JSON of the expected shape.
    Parse(serde_json::Error),
    /// A key could not be parsed as a tile id.
    BadTileId(String),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Parse(e) => write!(f, "atlas mapping parse error: {e}"),
            AtlasError::BadTileId(key) => write!(f, "atlas mapping key '{key}' is not a tile id"),
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::Parse(e) => Some(e),
            AtlasError::BadTileId(_) => None,
        }
    }
}

// ── TileMap ──────────────────────────────────────────────────────────────────

/// Fixed-size 2D grid of tile ids.
///
/// The extent is set once at construction and never changes; every access is
/// bounds-checked against it. Storage is a single owned row-major buffer.
#[derive(Debug, Clone)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<TileId>,
}

impl TileMap {
    /// Create a `width` × `height` grid filled with tile id 0.
    ///
    /// Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "tile map extent must be non-zero");
        Self {
            width,
            height,
            tiles: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile id at `(x, y)`, or `None` out of range.
    pub fn get(&self, x: u32, y: u32) -> Option<TileId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.tiles[(y * self.width + x) as usize])
    }

    /// Write the tile id at `(x, y)`. Out of range is a no-op error.
    pub fn set(&mut self, x: u32, y: u32, id: TileId) -> Result<(), TileError> {
        if x >= self.width || y >= self.height {
            return Err(TileError::InvalidCoordinate {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.tiles[(y * self.width + x) as usize] = id;
        Ok(())
    }

    /// Overwrite every cell with `id`.
    pub fn fill(&mut self, id: TileId) {
        self.tiles.fill(id);
    }

    /// Replace the whole grid from row-major `data` (`width * height` cells).
    pub fn load(&mut self, data: &[TileId]) -> Result<(), TileError> {
        let expected = (self.width * self.height) as usize;
        if data.len() != expected {
            return Err(TileError::MapSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        self.tiles.copy_from_slice(data);
        Ok(())
    }
}

// ── AtlasMapping ─────────────────────────────────────────────────────────────

/// Static table mapping tile ids to source rects in an atlas texture.
///
/// Built once at scene setup and read-only thereafter. An id with no entry
/// is a defined edge case: the cell simply contributes no geometry.
#[derive(Debug, Clone, Default)]
pub struct AtlasMapping {
    entries: HashMap<TileId, Rect>,
}

impl AtlasMapping {
    pub fn from_entries(entries: &[(TileId, Rect)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// Parse a JSON document of the shape `{"0": [x, y, w, h], ...}`.
    pub fn from_json(json: &str) -> Result<Self, AtlasError> {
        let raw: HashMap<String, [f32; 4]> =
            serde_json::from_str(json).map_err(AtlasError::Parse)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, [x, y, w, h]) in raw {
            let id: TileId = key
                .parse()
                .map_err(|_| AtlasError::BadTileId(key.clone()))?;
            entries.insert(id, Rect::new(x, y, w, h));
        }
        Ok(Self { entries })
    }

    /// Source rect for `id`, or `None` if the id is unmapped.
    pub fn get(&self, id: TileId) -> Option<Rect> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
