//! Collision shapes for the collision layer
//!
//! Every collision cell holds one of six codes. Code `0` is an empty cell;
//! codes `1..=5` are the placeable shapes:
//!
//! | code | shape        |
//! |------|--------------|
//! | 1    | full tile    |
//! | 2    | top-left     |
//! | 3    | top-right    |
//! | 4    | bottom-right |
//! | 5    | bottom-left  |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A collision code outside `0..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid collision code {0} (expected 0-5)")]
pub struct InvalidCollisionCode(pub u8);

/// Shape of a single collision cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CollisionShape {
    /// No collision
    #[default]
    Empty,
    /// Whole tile is solid
    Full,
    /// Triangle filling the top-left half
    TopLeft,
    /// Triangle filling the top-right half
    TopRight,
    /// Triangle filling the bottom-right half
    BottomRight,
    /// Triangle filling the bottom-left half
    BottomLeft,
}

impl CollisionShape {
    /// All shapes that can be placed with the collision tool, in code order
    pub const PLACEABLE: [CollisionShape; 5] = [
        CollisionShape::Full,
        CollisionShape::TopLeft,
        CollisionShape::TopRight,
        CollisionShape::BottomRight,
        CollisionShape::BottomLeft,
    ];

    /// Numeric code stored in the collision layer
    pub fn code(self) -> u8 {
        match self {
            CollisionShape::Empty => 0,
            CollisionShape::Full => 1,
            CollisionShape::TopLeft => 2,
            CollisionShape::TopRight => 3,
            CollisionShape::BottomRight => 4,
            CollisionShape::BottomLeft => 5,
        }
    }

    /// Parse a placeable shape; rejects `0` and anything above `5`
    pub fn placeable(code: u8) -> Result<Self, InvalidCollisionCode> {
        match Self::try_from(code)? {
            CollisionShape::Empty => Err(InvalidCollisionCode(code)),
            shape => Ok(shape),
        }
    }

    /// Check if this shape has collision
    pub fn is_solid(self) -> bool {
        !matches!(self, CollisionShape::Empty)
    }

    /// Polygon outline in normalized tile coordinates (0-1, y down)
    pub fn points(self) -> &'static [[f32; 2]] {
        match self {
            CollisionShape::Empty => &[],
            CollisionShape::Full => &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            CollisionShape::TopLeft => &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            CollisionShape::TopRight => &[[0.0, 0.0], [1.0, 1.0], [1.0, 0.0]],
            CollisionShape::BottomRight => &[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            CollisionShape::BottomLeft => &[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
        }
    }

    /// Get the display name of this shape
    pub fn name(self) -> &'static str {
        match self {
            CollisionShape::Empty => "Empty",
            CollisionShape::Full => "Full",
            CollisionShape::TopLeft => "Top Left",
            CollisionShape::TopRight => "Top Right",
            CollisionShape::BottomRight => "Bottom Right",
            CollisionShape::BottomLeft => "Bottom Left",
        }
    }
}

impl TryFrom<u8> for CollisionShape {
    type Error = InvalidCollisionCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CollisionShape::Empty),
            1 => Ok(CollisionShape::Full),
            2 => Ok(CollisionShape::TopLeft),
            3 => Ok(CollisionShape::TopRight),
            4 => Ok(CollisionShape::BottomRight),
            5 => Ok(CollisionShape::BottomLeft),
            other => Err(InvalidCollisionCode(other)),
        }
    }
}

impl From<CollisionShape> for u8 {
    fn from(shape: CollisionShape) -> Self {
        shape.code()
    }
}
