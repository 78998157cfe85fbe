//! Movable actors on the tile grid.

use crate::sprite::{Animation, RenderAdapter, Sprite};
use shared::{Direction, PlayerId, PlayerInfo};

/// Integer grid cell. Pixel positions only exist on the [`Sprite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> GridPos {
        let (dx, dy) = direction.offset();
        GridPos::new(self.x + dx, self.y + dy)
    }
}

/// A player on the grid together with the sprite that shows it.
#[derive(Debug, Clone)]
pub struct Entity {
    id: PlayerId,
    name: Option<String>,
    position: GridPos,
    sprite: Sprite,
}

impl Entity {
    /// Creates the entity and its sprite; the sprite is never recreated afterwards.
    pub fn spawn(
        id: PlayerId,
        position: GridPos,
        name: Option<String>,
        render: &mut dyn RenderAdapter,
    ) -> Self {
        let sprite = render.create_sprite(id, position.x, position.y);
        Self {
            id,
            name,
            position,
            sprite,
        }
    }

    pub fn from_info(info: &PlayerInfo, render: &mut dyn RenderAdapter) -> Self {
        Self::spawn(
            info.player_id,
            GridPos::new(info.x, info.y),
            info.name.clone(),
            render,
        )
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    /// Moves exactly one cell and asks the renderer to animate the step.
    pub fn step(&mut self, direction: Direction, render: &mut dyn RenderAdapter) {
        self.position = self.position.step(direction);
        render.shift_sprite(&mut self.sprite, direction, Animation::walking(direction));
    }

    pub fn move_left(&mut self, render: &mut dyn RenderAdapter) {
        self.step(Direction::Left, render);
    }

    pub fn move_right(&mut self, render: &mut dyn RenderAdapter) {
        self.step(Direction::Right, render);
    }

    pub fn move_up(&mut self, render: &mut dyn RenderAdapter) {
        self.step(Direction::Up, render);
    }

    pub fn move_down(&mut self, render: &mut dyn RenderAdapter) {
        self.step(Direction::Down, render);
    }
}
