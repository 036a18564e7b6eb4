use glam::Vec2;

use crate::assets::TextureHandle;
use crate::rect::Rect;

// ── Transform ────────────────────────────────────────────────────────────────

/// World-space placement of a game object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
}

impl Default for Transform {
    /// Position (0, 0), scale (1, 1).
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }
}

// ── Sprite ───────────────────────────────────────────────────────────────────

/// Textured quad component: which texture to sample and which region of it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub source_rect: Rect,
}

impl Sprite {
    /// Sprite showing the texture's full extent.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            source_rect: texture.full_extent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transform_is_origin_unit_scale() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn new_sprite_covers_full_texture() {
        let tex = TextureHandle { id: 3, width: 64, height: 48 };
        let sprite = Sprite::new(tex);
        assert_eq!(sprite.source_rect, Rect::new(0.0, 0.0, 64.0, 48.0));
    }
}
