//! Overlap tests between agents, obstacles, and
//! the edges of the world.
//!
//! Two shapes are supported. [`Hitbox::BoundingBox`]
//! treats every sprite as a solid rectangle. [`Hitbox::PixelMask`]
//! uses per-pixel [`Mask`]s, the way sprite-based games
//! test collisions; masks come from the caller, as this
//! crate never loads images.
use crate::{Obstacle, ObstacleConfig};

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, `y` growing downwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns whether both rectangles share
    /// some area. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A 2D bitmap of solid pixels.
///
/// # Examples
/// ```
/// use flapsim::Mask;
///
/// let a = Mask::from_rows(&["##", "#."]);
/// let b = Mask::from_rows(&["#"]);
/// assert!(a.overlap(&b, (1, 0)));
/// assert!(!a.overlap(&b, (1, 1)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    /// Returns a mask with every pixel solid.
    pub fn filled(width: usize, height: usize) -> Mask {
        Mask {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    /// Builds a mask by querying `solid(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, solid: impl Fn(usize, usize) -> bool) -> Mask {
        let bits = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| solid(x, y))
            .collect();
        Mask {
            width,
            height,
            bits,
        }
    }

    /// Builds a mask from text rows, where `#` marks a solid pixel.
    /// Rows shorter than the longest are padded with empty pixels.
    pub fn from_rows(rows: &[&str]) -> Mask {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        Mask::from_fn(width, rows.len(), |x, y| rows[y].chars().nth(x) == Some('#'))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns whether the pixel at `(x, y)` is solid.
    /// Pixels outside the mask are empty.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.bits[y as usize * self.width + x as usize]
    }

    /// Returns a copy mirrored top to bottom.
    pub fn flipped_vertically(&self) -> Mask {
        Mask::from_fn(self.width, self.height, |x, y| {
            self.bits[(self.height - 1 - y) * self.width + x]
        })
    }

    /// Returns whether any solid pixel of `self` coincides
    /// with a solid pixel of `other` placed at `offset`
    /// relative to `self`'s top-left corner.
    pub fn overlap(&self, other: &Mask, offset: (i64, i64)) -> bool {
        let (dx, dy) = offset;
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.width as i64).min(self.width as i64);
        let y1 = (dy + other.height as i64).min(self.height as i64);
        (y0..y1).any(|y| (x0..x1).any(|x| self.get(x, y) && other.get(x - dx, y - dy)))
    }
}

/// The shapes used for obstacle overlap tests.
#[derive(Clone, Debug, PartialEq)]
pub enum Hitbox {
    /// Solid rectangles.
    BoundingBox,
    /// Per-pixel masks. The top half of every obstacle
    /// uses `obstacle` flipped vertically.
    PixelMask {
        agent: Mask,
        obstacle_top: Mask,
        obstacle_bottom: Mask,
    },
}

/// Stateless collision predicates over current positions.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionDetector {
    hitbox: Hitbox,
    obstacle_width: f32,
    obstacle_height: f32,
}

impl CollisionDetector {
    /// Returns a detector treating agents and obstacles
    /// as solid rectangles.
    pub fn bounding_box(obstacles: &ObstacleConfig) -> CollisionDetector {
        CollisionDetector {
            hitbox: Hitbox::BoundingBox,
            obstacle_width: obstacles.width,
            obstacle_height: obstacles.height,
        }
    }

    /// Returns a detector using per-pixel masks.
    /// `obstacle` is the mask of the bottom half.
    pub fn pixel_mask(agent: Mask, obstacle: Mask) -> CollisionDetector {
        let obstacle_width = obstacle.width() as f32;
        let obstacle_height = obstacle.height() as f32;
        CollisionDetector {
            hitbox: Hitbox::PixelMask {
                agent,
                obstacle_top: obstacle.flipped_vertically(),
                obstacle_bottom: obstacle,
            },
            obstacle_width,
            obstacle_height,
        }
    }

    pub fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    /// Returns whether the agent occupying `agent` touches
    /// either half of `obstacle`.
    pub fn check(&self, agent: &Rect, obstacle: &Obstacle) -> bool {
        match &self.hitbox {
            Hitbox::BoundingBox => {
                let top = Rect::new(
                    obstacle.x(),
                    obstacle.top(),
                    self.obstacle_width,
                    self.obstacle_height,
                );
                let bottom = Rect::new(
                    obstacle.x(),
                    obstacle.bottom(),
                    self.obstacle_width,
                    self.obstacle_height,
                );
                agent.intersects(&top) || agent.intersects(&bottom)
            }
            Hitbox::PixelMask {
                agent: agent_mask,
                obstacle_top,
                obstacle_bottom,
            } => {
                let dx = (obstacle.x() - agent.x).round() as i64;
                let agent_y = agent.y.round();
                let top_offset = (dx, (obstacle.top() - agent_y).round() as i64);
                let bottom_offset = (dx, (obstacle.bottom() - agent_y).round() as i64);
                agent_mask.overlap(obstacle_bottom, bottom_offset)
                    || agent_mask.overlap(obstacle_top, top_offset)
            }
        }
    }

    /// Returns whether `agent` has left the world through
    /// the top edge or reached the ground line.
    pub fn check_bounds(&self, agent: &Rect, world_height: f32) -> bool {
        agent.y < 0.0 || agent.bottom() >= world_height
    }
}
