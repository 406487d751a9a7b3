use std::fmt;

use glam::Vec2;

/// One of the four quadrants of a region. The declaration order is the
/// canonical order used for quadrant lookup, child slots and traversal.
///
/// Coordinates are screen-style: north is towards smaller `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Direction> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::NorthWest => "NW",
            Direction::NorthEast => "NE",
            Direction::SouthWest => "SW",
            Direction::SouthEast => "SE",
        };
        f.write_str(name)
    }
}

/// Axis-aligned bounding box given by its minimum corner and its size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub position: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn square(position: Vec2, size: f32) -> Self {
        Self::new(position, Vec2::splat(size))
    }

    pub fn min(&self) -> Vec2 {
        self.position
    }

    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Same size, moved to `position`.
    pub fn with_position(&self, position: Vec2) -> Self {
        Self::new(position, self.size)
    }

    /// Whether `other` lies entirely inside this box. Shared edges count as inside.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        other.min().cmpge(self.min()).all() && other.max().cmple(self.max()).all()
    }

    /// Whether the interiors overlap. Boxes that only touch do not collide.
    pub fn collide_aabb(&self, other: &Aabb) -> bool {
        self.min().cmplt(other.max()).all() && other.min().cmplt(self.max()).all()
    }

    /// The half-size sub-box for `direction`.
    pub fn quadrant(&self, direction: Direction) -> Aabb {
        let half = self.size * 0.5;
        let offset = match direction {
            Direction::NorthWest => Vec2::ZERO,
            Direction::NorthEast => Vec2::new(half.x, 0.0),
            Direction::SouthWest => Vec2::new(0.0, half.y),
            Direction::SouthEast => half,
        };
        Aabb::new(self.position + offset, half)
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ position: {}, size: {} }}", self.position, self.size)
    }
}
