use std::marker::PhantomData;

use glam::Vec2;

use crate::assets::TextureHandle;
use crate::rect::Rect;
use crate::tilemap::TileError;

/// Cells per chunk side. A chunk is the unit of geometry generation and
/// invalidation: a single-tile edit dirties one chunk, and rebuilding costs
/// O(chunk area) regardless of total map size.
pub const CHUNK_SIZE: u32 = 8;

// ── TileVertex ───────────────────────────────────────────────────────────────

/// One vertex of a tile quad: world-pixel position and normalised UV.
///
/// Plain `Pod` data so the external render backend can upload chunk buffers
/// without any conversion.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

// ── Chunk ────────────────────────────────────────────────────────────────────

/// A fixed `CHUNK_SIZE` × `CHUNK_SIZE` sub-region of the grid.
///
/// Owns the resolved per-cell source rects, the generated vertex buffer, the
/// texture the buffer samples from, and a dirty bit. Invariant: when `dirty`
/// is false the vertex buffer exactly reflects the current cell state.
#[derive(Debug)]
struct Chunk {
    /// Resolved source rect per cell, row-major within the chunk.
    /// `None` cells (unmapped or outside the map extent) emit no geometry.
    cells: Vec<Option<Rect>>,
    vertices: Vec<TileVertex>,
    texture: Option<TextureHandle>,
    dirty: bool,
    /// Number of `Some` cells; chunks with zero mapped cells are never yielded.
    mapped: u32,
}

impl Chunk {
    fn new() -> Self {
        Self {
            cells: vec![None; (CHUNK_SIZE * CHUNK_SIZE) as usize],
            vertices: Vec::new(),
            texture: None,
            dirty: false,
            mapped: 0,
        }
    }

    /// Regenerate the vertex buffer from current cell state, row-major,
    /// then clear the dirty bit. Two triangles (six vertices) per mapped cell.
    fn rebuild(&mut self, chunk_x: u32, chunk_y: u32, tile_size: u32) {
        self.vertices.clear();
        self.dirty = false;
        let Some(texture) = self.texture else {
            return;
        };
        let (tex_w, tex_h) = (texture.width as f32, texture.height as f32);
        let size = tile_size as f32;

        for ly in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let Some(src) = self.cells[(ly * CHUNK_SIZE + lx) as usize] else {
                    continue;
                };
                let x0 = ((chunk_x * CHUNK_SIZE + lx) * tile_size) as f32;
                let y0 = ((chunk_y * CHUNK_SIZE + ly) * tile_size) as f32;
                let (x1, y1) = (x0 + size, y0 + size);

                let u0 = src.x / tex_w;
                let v0 = src.y / tex_h;
                let u1 = src.right() / tex_w;
                let v1 = src.bottom() / tex_h;

                let tl = TileVertex { position: [x0, y0], uv: [u0, v0] };
                let tr = TileVertex { position: [x1, y0], uv: [u1, v0] };
                let br = TileVertex { position: [x1, y1], uv: [u1, v1] };
                let bl = TileVertex { position: [x0, y1], uv: [u0, v1] };
                self.vertices.extend_from_slice(&[tl, tr, br, br, bl, tl]);
            }
        }
    }
}

// ── ChunkBatch ───────────────────────────────────────────────────────────────

/// One chunk's draw data, as consumed by the external render backend.
#[derive(Debug)]
pub struct ChunkBatch<'a> {
    /// Chunk coordinates in the chunk grid.
    pub chunk_x: u32,
    pub chunk_y: u32,
    /// World-pixel position of the chunk's top-left corner.
    pub origin: Vec2,
    pub texture: TextureHandle,
    pub vertices: &'a [TileVertex],
}

// ── ChunkBatcher ─────────────────────────────────────────────────────────────

/// Partitions a fixed tile grid into chunks and owns their generated geometry.
///
/// Edits are O(1): they store resolved cell state and flip the owning chunk's
/// dirty bit. Rebuilds are deferred until [`ChunkBatcher::render_batches`]
/// visits a dirty chunk, so a burst of edits before a render costs one
/// rebuild per touched chunk, not one per edit.
#[derive(Debug)]
pub struct ChunkBatcher {
    map_width: u32,
    map_height: u32,
    tile_size: u32,
    chunks_x: u32,
    chunks_y: u32,
    chunks: Vec<Chunk>,
}

impl ChunkBatcher {
    /// Partition a `map_width` × `map_height` grid of `tile_size`-pixel cells.
    pub fn new(map_width: u32, map_height: u32, tile_size: u32) -> Self {
        assert!(
            map_width > 0 && map_height > 0,
            "tile map extent must be non-zero"
        );
        assert!(tile_size > 0, "tile size must be non-zero");
        let chunks_x = map_width.div_ceil(CHUNK_SIZE);
        let chunks_y = map_height.div_ceil(CHUNK_SIZE);
        let chunks = (0..chunks_x * chunks_y).map(|_| Chunk::new()).collect();
        Self {
            map_width,
            map_height,
            tile_size,
            chunks_x,
            chunks_y,
            chunks,
        }
    }

    pub fn map_width(&self) -> u32 {
        self.map_width
    }

    pub fn map_height(&self) -> u32 {
        self.map_height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Chunk grid extent `(columns, rows)`.
    pub fn chunk_extent(&self) -> (u32, u32) {
        (self.chunks_x, self.chunks_y)
    }

    /// Store the resolved source rect and texture for the cell at `(x, y)` and
    /// mark the owning chunk dirty. O(1); out-of-range coordinates are a no-op
    /// error with no dirty marking.
    ///
    /// All cells of a chunk batch against one texture. Setting a cell with a
    /// texture different from the chunk's current one replaces the chunk
    /// texture and logs a warning; mixing atlases within a chunk is not
    /// supported.
    pub fn set_tile(
        &mut self,
        x: u32,
        y: u32,
        texture: TextureHandle,
        source_rect: Rect,
    ) -> Result<(), TileError> {
        let (chunk_idx, cell_idx) = self.locate(x, y)?;
        let chunk = &mut self.chunks[chunk_idx];
        if let Some(current) = chunk.texture {
            if current != texture {
                log::warn!(
                    "chunk ({}, {}) rebatched from texture {} to {}; chunks sample a single texture",
                    chunk_idx as u32 % self.chunks_x,
                    chunk_idx as u32 / self.chunks_x,
                    current.id,
                    texture.id
                );
            }
        }
        chunk.texture = Some(texture);
        if chunk.cells[cell_idx].is_none() {
            chunk.mapped += 1;
        }
        chunk.cells[cell_idx] = Some(source_rect);
        chunk.dirty = true;
        Ok(())
    }

    /// Remove the cell at `(x, y)` from its chunk's geometry. Used when an
    /// edit resolves to an unmapped tile id. Marks the chunk dirty only if
    /// the cell previously had a rect.
    pub fn clear_tile(&mut self, x: u32, y: u32) -> Result<(), TileError> {
        let (chunk_idx, cell_idx) = self.locate(x, y)?;
        let chunk = &mut self.chunks[chunk_idx];
        if chunk.cells[cell_idx].take().is_some() {
            chunk.mapped -= 1;
            chunk.dirty = true;
            if chunk.mapped == 0 {
                chunk.texture = None;
            }
        }
        Ok(())
    }

    /// Regenerate one chunk's vertex buffer from its current cell state and
    /// clear its dirty bit. O(chunk area), independent of total map size.
    ///
    /// Normally called lazily by [`ChunkBatcher::render_batches`]; exposed for
    /// hosts that want to amortise rebuilds themselves.
    pub fn rebuild_chunk(&mut self, chunk_x: u32, chunk_y: u32) -> Result<(), TileError> {
        if chunk_x >= self.chunks_x || chunk_y >= self.chunks_y {
            return Err(TileError::InvalidCoordinate {
                x: chunk_x,
                y: chunk_y,
                width: self.chunks_x,
                height: self.chunks_y,
            });
        }
        let tile_size = self.tile_size;
        self.chunks[(chunk_y * self.chunks_x + chunk_x) as usize]
            .rebuild(chunk_x, chunk_y, tile_size);
        Ok(())
    }

    /// Resolve every cell of `map` through `mapping` and store the results.
    /// Cells whose tile id has no atlas entry are skipped silently and emit
    /// no geometry.
    pub fn populate(
        &mut self,
        map: &super::TileMap,
        mapping: &super::AtlasMapping,
        texture: TextureHandle,
    ) -> Result<(), TileError> {
        for y in 0..map.height() {
            for x in 0..map.width() {
                let Some(id) = map.get(x, y) else { continue };
                match mapping.get(id) {
                    Some(rect) => self.set_tile(x, y, texture, rect)?,
                    None => {
                        log::debug!("tile id {id} at ({x}, {y}) has no atlas entry; skipped");
                        self.clear_tile(x, y)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Lazy, finite, restartable sequence of draw batches: one per chunk with
    /// at least one mapped cell. A chunk found dirty is rebuilt immediately
    /// before it is yielded, so rebuild cost is paid by the first render
    /// after an edit rather than by the edit itself.
    pub fn render_batches(&mut self) -> RenderBatches<'_> {
        RenderBatches {
            chunks: self.chunks.as_mut_ptr(),
            len: self.chunks.len(),
            index: 0,
            chunks_x: self.chunks_x,
            tile_size: self.tile_size,
            _marker: PhantomData,
        }
    }

    /// Dirty bit of the chunk at chunk coordinates, or `None` out of range.
    pub fn is_chunk_dirty(&self, chunk_x: u32, chunk_y: u32) -> Option<bool> {
        self.chunk(chunk_x, chunk_y).map(|c| c.dirty)
    }

    /// Current vertex buffer of a chunk (possibly stale if dirty).
    pub fn chunk_geometry(&self, chunk_x: u32, chunk_y: u32) -> Option<&[TileVertex]> {
        self.chunk(chunk_x, chunk_y).map(|c| c.vertices.as_slice())
    }

    /// Number of chunks currently flagged dirty.
    pub fn dirty_chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.dirty).count()
    }

    // -- Internal helpers -----------------------------------------------------

    fn chunk(&self, chunk_x: u32, chunk_y: u32) -> Option<&Chunk> {
        if chunk_x >= self.chunks_x || chunk_y >= self.chunks_y {
            return None;
        }
        Some(&self.chunks[(chunk_y * self.chunks_x + chunk_x) as usize])
    }

    /// Map cell coordinates to (chunk index, cell index within chunk).
    fn locate(&self, x: u32, y: u32) -> Result<(usize, usize), TileError> {
        if x >= self.map_width || y >= self.map_height {
            return Err(TileError::InvalidCoordinate {
                x,
                y,
                width: self.map_width,
                height: self.map_height,
            });
        }
        let chunk_idx = (y / CHUNK_SIZE) * self.chunks_x + x / CHUNK_SIZE;
        let cell_idx = (y % CHUNK_SIZE) * CHUNK_SIZE + x % CHUNK_SIZE;
        Ok((chunk_idx as usize, cell_idx as usize))
    }
}

// ── RenderBatches ────────────────────────────────────────────────────────────

/// Iterator over [`ChunkBatch`]es; see [`ChunkBatcher::render_batches`].
pub struct RenderBatches<'a> {
    chunks: *mut Chunk,
    len: usize,
    index: usize,
    chunks_x: u32,
    tile_size: u32,
    _marker: PhantomData<&'a mut Chunk>,
}

impl<'a> Iterator for RenderBatches<'a> {
    type Item = ChunkBatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.len {
            let i = self.index;
            self.index += 1;
            // SAFETY: each chunk index is visited exactly once and `len`
            // equals the chunk vec length, so yielded batches never alias.
            let chunk = unsafe { &mut *self.chunks.add(i) };
            if chunk.mapped == 0 {
                continue;
            }
            let chunk_x = i as u32 % self.chunks_x;
            let chunk_y = i as u32 / self.chunks_x;
            if chunk.dirty {
                chunk.rebuild(chunk_x, chunk_y, self.tile_size);
            }
            // mapped > 0 implies a texture was set with the first cell; a
            // chunk that somehow lost it is skipped, not a stop signal.
            let Some(texture) = chunk.texture else {
                continue;
            };
            let vertices: &'a [TileVertex] = &(*chunk).vertices;
            return Some(ChunkBatch {
                chunk_x,
                chunk_y,
                origin: Vec2::new(
                    (chunk_x * CHUNK_SIZE * self.tile_size) as f32,
                    (chunk_y * CHUNK_SIZE * self.tile_size) as f32,
                ),
                texture,
                vertices,
            });
        }
        None
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
