//! Visual side of an entity and the seam to whatever draws it.

use shared::{Direction, PlayerId, TileMap, DEFAULT_TILE_SIZE};
use std::sync::Arc;

/// Frames per entity in one row of the sprite sheet.
pub const FRAMES_PER_ENTITY: u32 = 4;
/// Distance between a standing frame and its matching walking frame.
pub const WALK_FRAME_STRIDE: u32 = 204;
pub const ANIMATION_FPS: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animation {
    StandFront,
    StandBack,
    StandRight,
    StandLeft,
    WalkFront,
    WalkBack,
    WalkRight,
    WalkLeft,
}

impl Animation {
    pub fn name(self) -> &'static str {
        match self {
            Animation::StandFront => "stand_f",
            Animation::StandBack => "stand_b",
            Animation::StandRight => "stand_r",
            Animation::StandLeft => "stand_l",
            Animation::WalkFront => "anim_f",
            Animation::WalkBack => "anim_b",
            Animation::WalkRight => "anim_r",
            Animation::WalkLeft => "anim_l",
        }
    }

    /// Walking animation played for a step; moving up shows the back.
    pub fn walking(direction: Direction) -> Animation {
        match direction {
            Direction::Left => Animation::WalkLeft,
            Direction::Right => Animation::WalkRight,
            Direction::Up => Animation::WalkBack,
            Direction::Down => Animation::WalkFront,
        }
    }

    fn column(self) -> u32 {
        match self {
            Animation::StandFront | Animation::WalkFront => 0,
            Animation::StandBack | Animation::WalkBack => 1,
            Animation::StandRight | Animation::WalkRight => 2,
            Animation::StandLeft | Animation::WalkLeft => 3,
        }
    }

    fn is_walking(self) -> bool {
        matches!(
            self,
            Animation::WalkFront | Animation::WalkBack | Animation::WalkRight | Animation::WalkLeft
        )
    }

    /// Sprite sheet frames of this animation for the given entity.
    pub fn frames(self, entity_id: PlayerId) -> Vec<u32> {
        let base = (entity_id.max(0) as u32)
            .saturating_mul(FRAMES_PER_ENTITY)
            .saturating_add(self.column());
        if self.is_walking() {
            vec![base, base.saturating_add(WALK_FRAME_STRIDE)]
        } else {
            vec![base]
        }
    }
}

/// Pixel-space visual owned by exactly one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub entity_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub animation: Animation,
}

impl Sprite {
    pub fn new(entity_id: PlayerId, x: f32, y: f32) -> Self {
        Self {
            entity_id,
            x,
            y,
            animation: Animation::StandFront,
        }
    }

    pub fn shift(&mut self, direction: Direction, step_x: f32, step_y: f32) {
        let (dx, dy) = direction.offset();
        self.x += dx as f32 * step_x;
        self.y += dy as f32 * step_y;
    }

    /// Sheet frame to draw after `elapsed` seconds of looping playback.
    pub fn frame(&self, elapsed: f32) -> u32 {
        let frames = self.animation.frames(self.entity_id);
        let tick = (elapsed.max(0.0) * ANIMATION_FPS) as usize;
        frames[tick % frames.len()]
    }
}

/// What the reconciliation core needs from the renderer.
pub trait RenderAdapter {
    /// Pixel size of one grid cell.
    fn tile_size(&self) -> (f32, f32);

    /// Whether `layer` has a tile at the given cell.
    fn has_tile(&self, layer: &str, x: i32, y: i32) -> bool;

    fn create_sprite(&mut self, entity_id: PlayerId, x: i32, y: i32) -> Sprite {
        let (w, h) = self.tile_size();
        Sprite::new(entity_id, x as f32 * w, y as f32 * h)
    }

    fn shift_sprite(&mut self, sprite: &mut Sprite, direction: Direction, animation: Animation) {
        let (w, h) = self.tile_size();
        sprite.shift(direction, w, h);
        sprite.animation = animation;
    }
}

/// Renderer without a window; records what it was asked to animate.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    map: Option<Arc<TileMap>>,
    pub created: Vec<PlayerId>,
    pub shifts: Vec<(PlayerId, Direction, Animation)>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: Arc<TileMap>) -> Self {
        Self {
            map: Some(map),
            ..Self::default()
        }
    }
}

impl RenderAdapter for HeadlessRenderer {
    fn tile_size(&self) -> (f32, f32) {
        match &self.map {
            Some(map) => (map.tile_width as f32, map.tile_height as f32),
            None => (DEFAULT_TILE_SIZE as f32, DEFAULT_TILE_SIZE as f32),
        }
    }

    fn has_tile(&self, layer: &str, x: i32, y: i32) -> bool {
        self.map
            .as_ref()
            .map_or(false, |map| map.has_tile(layer, x, y))
    }

    fn create_sprite(&mut self, entity_id: PlayerId, x: i32, y: i32) -> Sprite {
        self.created.push(entity_id);
        let (w, h) = self.tile_size();
        Sprite::new(entity_id, x as f32 * w, y as f32 * h)
    }

    fn shift_sprite(&mut self, sprite: &mut Sprite, direction: Direction, animation: Animation) {
        self.shifts.push((sprite.entity_id, direction, animation));
        let (w, h) = self.tile_size();
        sprite.shift(direction, w, h);
        sprite.animation = animation;
    }
}
