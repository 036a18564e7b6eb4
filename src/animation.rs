use std::collections::HashMap;

use crate::rect::Rect;

// ── AnimationFrame ───────────────────────────────────────────────────────────

/// One frame of a clip: the atlas region to sample and how long to hold it.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    pub source_rect: Rect,
    /// Hold time in seconds.
    pub duration: f32,
}

impl AnimationFrame {
    pub fn new(source_rect: Rect, duration: f32) -> Self {
        Self { source_rect, duration }
    }
}

// ── Animation ────────────────────────────────────────────────────────────────

/// Per-entity sprite animation: named clips plus instance playback state.
///
/// Clips loop; there is no pingpong or finite-play mode. Every instance owns
/// its elapsed time and frame index, so large populations of entities animate
/// independently with no shared mutable state.
#[derive(Clone, Debug, Default)]
pub struct Animation {
    clips: HashMap<String, Vec<AnimationFrame>>,
    active: Option<String>,
    frame_index: usize,
    /// Time accumulated within the current frame, in seconds.
    elapsed: f32,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named clip. The first clip added becomes the active one.
    /// Adding under an existing name replaces that clip's frames.
    pub fn add_clip(&mut self, name: &str, frames: Vec<AnimationFrame>) {
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
        self.clips.insert(name.to_string(), frames);
    }

    /// Switch the active clip. Changing clip resets the frame index and
    /// elapsed time to zero; re-playing the already-active clip is a no-op.
    /// Returns false if no clip with that name exists.
    pub fn play(&mut self, name: &str) -> bool {
        if !self.clips.contains_key(name) {
            return false;
        }
        if self.active.as_deref() != Some(name) {
            self.active = Some(name.to_string());
            self.frame_index = 0;
            self.elapsed = 0.0;
        }
        true
    }

    pub fn active_clip(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The active clip's current frame, if any clip is active and non-empty.
    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        let frames = self.clips.get(self.active.as_deref()?)?;
        frames.get(self.frame_index)
    }

    /// Advance playback by `dt` seconds: accumulate elapsed time and step
    /// through as many frames as it covers, wrapping at the clip end.
    ///
    /// A clip whose total duration is zero (or an empty/absent clip) holds
    /// its current frame instead of spinning.
    pub fn advance(&mut self, dt: f32) {
        let Some(name) = self.active.as_deref() else {
            return;
        };
        let Some(frames) = self.clips.get(name) else {
            return;
        };
        if frames.is_empty() {
            return;
        }
        let total: f32 = frames.iter().map(|f| f.duration).sum();
        if total <= 0.0 {
            return;
        }

        self.elapsed += dt;
        while self.elapsed >= frames[self.frame_index].duration {
            self.elapsed -= frames[self.frame_index].duration;
            self.frame_index = (self.frame_index + 1) % frames.len();
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
