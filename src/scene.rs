use std::fmt;

use crate::assets::{TextureHandle, TextureSource};
use crate::components::{Sprite, Transform};
use crate::ecs::{Entity, World};
use crate::tilemap::{AtlasMapping, ChunkBatcher, RenderBatches, TileError, TileId, TileMap};

// ── SceneError ───────────────────────────────────────────────────────────────

/// Failures while setting up a scene's contents.
///
/// These are load-time problems: the host is expected to treat them as fatal
/// and abort initialisation rather than retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The texture resolver has no entry for the requested path.
    TextureNotFound(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::TextureNotFound(path) => write!(f, "texture not found: {path}"),
        }
    }
}

impl std::error::Error for SceneError {}

// ── Scene ────────────────────────────────────────────────────────────────────

/// One loaded game scene: a tile grid with its chunk batcher, the entity
/// store, and the ordered draw list.
///
/// Created at startup, mutated during the run (tile edits, object
/// registration, animation ticks), and dropped whole on scene switch. The
/// scene exclusively owns its tile map, batcher, and entity store; nothing
/// else mutates them.
pub struct Scene {
    name: String,
    tile_map: TileMap,
    batcher: ChunkBatcher,
    atlas: Option<(AtlasMapping, TextureHandle)>,
    world: World,
    /// Draw list in registration order. Draw order is exactly this order;
    /// no depth sort or layering is applied.
    objects: Vec<Entity>,
}

impl Scene {
    /// Create a scene with a `grid_width` × `grid_height` tile grid of
    /// `tile_size`-pixel cells, no atlas bound, and no objects.
    pub fn new(name: &str, grid_width: u32, grid_height: u32, tile_size: u32) -> Self {
        log::info!("scene '{name}': {grid_width}x{grid_height} grid, {tile_size}px tiles");
        Self {
            name: name.to_string(),
            tile_map: TileMap::new(grid_width, grid_height),
            batcher: ChunkBatcher::new(grid_width, grid_height, tile_size),
            atlas: None,
            world: World::new(),
            objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -- Tile grid --------------------------------------------------------------

    /// Bind the tile-id → source-rect table and the atlas texture used to
    /// resolve grid edits, and resolve the current grid contents through
    /// them. Tiles written before the atlas was bound batch as soon as it
    /// is, so the binding order does not matter.
    pub fn set_atlas(
        &mut self,
        mapping: AtlasMapping,
        texture: TextureHandle,
    ) -> Result<(), TileError> {
        self.batcher.populate(&self.tile_map, &mapping, texture)?;
        self.atlas = Some((mapping, texture));
        Ok(())
    }

    /// Replace the whole grid from row-major `data` and regenerate the
    /// batcher's cell state through the atlas mapping. Ids without an atlas
    /// entry contribute no geometry.
    pub fn load_map(&mut self, data: &[TileId]) -> Result<(), TileError> {
        self.tile_map.load(data)?;
        if let Some((mapping, texture)) = &self.atlas {
            self.batcher.populate(&self.tile_map, mapping, *texture)?;
        }
        Ok(())
    }

    /// Write one tile id into the grid and update the owning chunk's cell:
    /// mapped ids store their resolved source rect, unmapped ids clear the
    /// cell (silent skip). O(1) plus the eventual chunk rebuild at render.
    pub fn set_tile(&mut self, x: u32, y: u32, id: TileId) -> Result<(), TileError> {
        self.tile_map.set(x, y, id)?;
        let Some((mapping, texture)) = &self.atlas else {
            return Ok(());
        };
        match mapping.get(id) {
            Some(rect) => self.batcher.set_tile(x, y, *texture, rect),
            None => {
                log::debug!("tile id {id} at ({x}, {y}) has no atlas entry; skipped");
                self.batcher.clear_tile(x, y)
            }
        }
    }

    pub fn tile_map(&self) -> &TileMap {
        &self.tile_map
    }

    pub fn batcher(&self) -> &ChunkBatcher {
        &self.batcher
    }

    pub fn batcher_mut(&mut self) -> &mut ChunkBatcher {
        &mut self.batcher
    }

    /// Chunk draw batches for the render pass; rebuilds dirty chunks lazily.
    pub fn render_batches(&mut self) -> RenderBatches<'_> {
        self.batcher.render_batches()
    }

    // -- Game objects -------------------------------------------------------------

    /// Spawn a game object with a default transform (position 0,0 scale 1,1)
    /// and a sprite covering the given texture's full extent.
    ///
    /// The texture is resolved now, through the injected source; a missing
    /// texture is an unrecoverable setup failure.
    pub fn create_sprite_object(
        &mut self,
        name: &str,
        texture_path: &str,
        textures: &dyn TextureSource,
    ) -> Result<Entity, SceneError> {
        let texture = textures
            .get_texture(texture_path)
            .ok_or_else(|| SceneError::TextureNotFound(texture_path.to_string()))?;
        let entity = self.world.spawn();
        self.world.set_name(entity, name);
        self.world.insert_transform(entity, Transform::default());
        self.world.insert_sprite(entity, Sprite::new(texture));
        Ok(entity)
    }

    /// Append to the draw list. Duplicate registration of the same entity is
    /// not deduplicated; callers own that invariant.
    pub fn register_game_object(&mut self, entity: Entity) {
        self.objects.push(entity);
    }

    /// Registered objects in draw order.
    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // -- Frame tick -----------------------------------------------------------

    /// Per-frame update: advance every entity animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.world.advance_animations(dt);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
