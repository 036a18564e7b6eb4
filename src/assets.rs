use std::collections::HashMap;

use crate::rect::Rect;

// ── TextureHandle ────────────────────────────────────────────────────────────

/// Opaque reference to a texture owned by the external asset/render layer.
///
/// The core never decodes or uploads pixels; it only carries the handle
/// through to render batches and uses the pixel dimensions to compute UVs
/// and full-extent sprite rects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    /// Source rect covering the whole texture.
    pub fn full_extent(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

// ── TextureSource ────────────────────────────────────────────────────────────

/// Load-time texture resolver contract.
///
/// Implemented by the host's asset manager; queried when sprite objects are
/// created. An absent texture is `None`, which callers treat as a fatal
/// initialisation failure.
pub trait TextureSource {
    fn get_texture(&self, path: &str) -> Option<TextureHandle>;
}

// ── TextureTable ─────────────────────────────────────────────────────────────

/// In-memory `TextureSource`: path → handle.
///
/// Suitable for hosts that pre-register every texture up front, and for
/// tests that need a resolver without any I/O.
#[derive(Debug, Default)]
pub struct TextureTable {
    entries: HashMap<String, TextureHandle>,
    next_id: u32,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture under `path`, assigning it a fresh id.
    /// Re-registering a path replaces the previous entry.
    pub fn register(&mut self, path: &str, width: u32, height: u32) -> TextureHandle {
        let handle = TextureHandle {
            id: self.next_id,
            width,
            height,
        };
        self.next_id += 1;
        self.entries.insert(path.to_string(), handle);
        handle
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureSource for TextureTable {
    fn get_texture(&self, path: &str) -> Option<TextureHandle> {
        self.entries.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_unique_ids() {
        let mut table = TextureTable::new();
        let a = table.register("a.png", 32, 32);
        let b = table.register("b.png", 64, 64);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn get_texture_returns_none_for_unknown_path() {
        let table = TextureTable::new();
        assert!(table.get_texture("missing.png").is_none());
    }

    #[test]
    fn full_extent_covers_whole_texture() {
        let mut table = TextureTable::new();
        let t = table.register("atlas.png", 128, 32);
        assert_eq!(t.full_extent(), Rect::new(0.0, 0.0, 128.0, 32.0));
    }
}
