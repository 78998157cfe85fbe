//! Tile maps exported from Tiled as JSON.
//!
//! Only tile layers matter here: each carries a row-major `data` array of global
//! tile ids where `0` means "no tile". Cells outside the map have no tile either.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    #[serde(default)]
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    #[serde(default)]
    pub layers: Vec<TileLayer>,
}

impl TileMap {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width,
            tile_height,
            layers: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a layer, padding or truncating `data` to the map size.
    pub fn with_layer(mut self, name: &str, mut data: Vec<u32>) -> Self {
        data.resize((self.width * self.height) as usize, 0);
        self.layers.push(TileLayer {
            name: name.to_string(),
            data,
        });
        self
    }

    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Tile id at a cell, `None` for empty cells, missing layers and out-of-map cells.
    pub fn tile(&self, layer: &str, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.layer(layer)
            .and_then(|layer| layer.data.get(index))
            .copied()
            .filter(|gid| *gid != 0)
    }

    pub fn has_tile(&self, layer: &str, x: i32, y: i32) -> bool {
        self.tile(layer, x, y).is_some()
    }

    /// Top-left pixel of a cell.
    pub fn cell_origin(&self, x: i32, y: i32) -> (f32, f32) {
        (
            x as f32 * self.tile_width as f32,
            y as f32 * self.tile_height as f32,
        )
    }

}

impl fmt::Display for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "height: {}", self.height)?;
        writeln!(f, "width: {}", self.width)?;
        writeln!(f, "tileheight: {}", self.tile_height)?;
        writeln!(f, "tilewidth: {}", self.tile_width)?;
        for layer in &self.layers {
            writeln!(f, "{}:", layer.name)?;
            for row in layer.data.chunks(self.width.max(1) as usize) {
                writeln!(f, "{:?}", row)?;
            }
        }
        Ok(())
    }
}
