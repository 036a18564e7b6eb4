//! Chunked tile-map render batching and a sprite scene core for 2D games.
//!
//! The crate is the CPU side of a 2D engine: a fixed tile grid partitioned
//! into chunks whose quad geometry is generated and invalidated as a unit,
//! an entity store with fixed component tables feeding thousands of
//! independently animated sprites, and a directional-input camera. Rendering
//! backends, texture decoding, audio, and window plumbing are external
//! collaborators; the core hands them `Pod` vertex buffers, texture handles,
//! and a view-projection matrix.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod components;
pub mod ecs;
pub mod input;
pub mod rect;
pub mod scene;
pub mod tilemap;

pub use animation::{Animation, AnimationFrame};
pub use assets::{TextureHandle, TextureSource, TextureTable};
pub use camera::{Camera2D, CameraUniform, DirectionBindings};
pub use components::{Sprite, Transform};
pub use ecs::{Entity, World};
pub use input::{InputState, KeyCode};
pub use rect::Rect;
pub use scene::{Scene, SceneError};
pub use tilemap::{AtlasMapping, ChunkBatcher, TileError, TileId, TileMap, TileVertex};

/// Default edge length of a rendered tile in world pixels.
pub const DEFAULT_TILE_SIZE: u32 = 32;
