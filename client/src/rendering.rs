use crate::entity::Entity;
use crate::sprite::{RenderAdapter, Sprite};
use crate::world::WorldState;
use macroquad::prelude::*;
use shared::{PlayerId, TileMap, FLOOR_LAYER, FURNITURE_LAYER};
use std::sync::Arc;

/// Pixel size of one frame in the character sprite sheet.
pub const SHEET_FRAME_SIZE: f32 = 21.0;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub game_id: i32,
    pub local_player: Option<PlayerId>,
    pub round: u32,
    pub pending: bool,
    pub player_count: usize,
    pub queued: usize,
}

impl UiConfig {
    pub fn from_world(world: &WorldState, queued: usize) -> Self {
        Self {
            game_id: world.game_id,
            local_player: world.local_player().map(Entity::id),
            round: world.round(),
            pending: world.has_pending(),
            player_count: world.entity_count(),
            queued,
        }
    }
}

/// Source rectangle of a frame in a sheet laid out row by row.
pub fn frame_source(frame: u32, sheet_width: f32) -> Rect {
    let columns = (sheet_width / SHEET_FRAME_SIZE).max(1.0) as u32;
    Rect::new(
        (frame % columns) as f32 * SHEET_FRAME_SIZE,
        (frame / columns) as f32 * SHEET_FRAME_SIZE,
        SHEET_FRAME_SIZE,
        SHEET_FRAME_SIZE,
    )
}

pub struct Renderer {
    map: Arc<TileMap>,
    walls_layer: String,
    sheet: Option<Texture2D>,
    started: f64,
}

impl Renderer {
    pub fn new(map: Arc<TileMap>, walls_layer: &str, sheet: Option<Texture2D>) -> Self {
        if let Some(sheet) = &sheet {
            sheet.set_filter(FilterMode::Nearest);
        }
        Renderer {
            map,
            walls_layer: walls_layer.to_string(),
            sheet,
            started: get_time(),
        }
    }

    pub fn render(&self, world: &WorldState, ui: UiConfig) {
        clear_background(Color::from_rgba(120, 120, 120, 255));

        self.draw_layer(FLOOR_LAYER, Color::from_rgba(60, 60, 60, 255));
        self.draw_layer(FURNITURE_LAYER, Color::from_rgba(139, 94, 60, 255));
        self.draw_layer(&self.walls_layer, Color::from_rgba(200, 200, 200, 255));

        let elapsed = (get_time() - self.started) as f32;
        for entity in world.entities() {
            let is_local = Some(entity.id()) == ui.local_player;
            self.draw_entity(entity, is_local, elapsed);
        }

        self.draw_ui(ui);
    }

    pub fn render_connecting(&self, message: &str) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        draw_text(message, 20.0, 40.0, 24.0, WHITE);
    }

    fn draw_layer(&self, name: &str, color: Color) {
        let (w, h) = (self.map.tile_width as f32, self.map.tile_height as f32);
        for y in 0..self.map.height as i32 {
            for x in 0..self.map.width as i32 {
                if self.map.has_tile(name, x, y) {
                    let (px, py) = self.map.cell_origin(x, y);
                    draw_rectangle(px, py, w, h, color);
                }
            }
        }
    }

    fn draw_entity(&self, entity: &Entity, is_local: bool, elapsed: f32) {
        let sprite = entity.sprite();
        let (w, h) = self.tile_size();

        match &self.sheet {
            Some(sheet) => self.draw_frame(sheet, sprite, elapsed, w, h),
            None => {
                let color = if is_local {
                    GREEN
                } else {
                    Color::from_rgba(255, 68, 68, 255)
                };
                draw_rectangle(sprite.x + 2.0, sprite.y + 2.0, w - 4.0, h - 4.0, color);
            }
        }

        if is_local {
            draw_rectangle_lines(sprite.x, sprite.y, w, h, 2.0, YELLOW);
        }

        if let Some(name) = entity.name() {
            draw_text(name, sprite.x, sprite.y - 2.0, 12.0, WHITE);
        }
    }

    fn draw_frame(&self, sheet: &Texture2D, sprite: &Sprite, elapsed: f32, w: f32, h: f32) {
        let source = frame_source(sprite.frame(elapsed), sheet.width());

        draw_texture_ex(
            sheet,
            sprite.x,
            sprite.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(w, h)),
                source: Some(source),
                ..Default::default()
            },
        );
    }

    fn draw_ui(&self, ui: UiConfig) {
        let x = 10.0;
        let y = screen_height() - 40.0;

        let who = match ui.local_player {
            Some(id) => format!("player {}", id),
            None => "spectator".to_string(),
        };
        let line = format!(
            "game {} | {} | round {} | {} players | queued {}",
            ui.game_id, who, ui.round, ui.player_count, ui.queued
        );
        draw_text(&line, x, y, 16.0, WHITE);

        // Pending indicator: yellow while a move waits for its round.
        let color = if ui.pending { YELLOW } else { GREEN };
        draw_rectangle(x, y + 8.0, 8.0, 8.0, color);
        draw_text(
            if ui.pending { "waiting" } else { "ready" },
            x + 12.0,
            y + 16.0,
            12.0,
            WHITE,
        );
    }
}

impl RenderAdapter for Renderer {
    fn tile_size(&self) -> (f32, f32) {
        (self.map.tile_width as f32, self.map.tile_height as f32)
    }

    fn has_tile(&self, layer: &str, x: i32, y: i32) -> bool {
        self.map.has_tile(layer, x, y)
    }
}
