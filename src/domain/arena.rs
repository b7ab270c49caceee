// Playable rectangle: origin at (0, 0), extending to (width, height).

use super::vector::Vec2;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArenaError {
    /// Width or height is non-positive or not a finite number.
    InvalidDimensions { width: f32, height: f32 },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::InvalidDimensions { width, height } => {
                write!(f, "invalid arena dimensions {width}x{height}")
            }
        }
    }
}

impl std::error::Error for ArenaError {}

fn validate(width: f32, height: f32) -> Result<(), ArenaError> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(ArenaError::InvalidDimensions { width, height })
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Result<Self, ArenaError> {
        validate(width, height)?;
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Applies new dimensions only if both validate; otherwise nothing changes.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ArenaError> {
        validate(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// True when the point lies inside the rectangle (edges included).
    pub fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Clamps a circle of `radius` so it stays fully inside the arena.
    ///
    /// Axes narrower than the circle collapse to the arena center.
    pub fn clamp(&self, p: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            clamp_axis(p.x, radius, self.width),
            clamp_axis(p.y, radius, self.height),
        )
    }

    /// Uniformly random position where a circle of `radius` fits.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R, radius: f32) -> Vec2 {
        Vec2::new(
            random_axis(rng, radius, self.width),
            random_axis(rng, radius, self.height),
        )
    }
}

fn clamp_axis(v: f32, radius: f32, extent: f32) -> f32 {
    let (lo, hi) = (radius, extent - radius);
    if lo > hi { extent / 2.0 } else { v.clamp(lo, hi) }
}

fn random_axis<R: Rng + ?Sized>(rng: &mut R, radius: f32, extent: f32) -> f32 {
    let (lo, hi) = (radius, extent - radius);
    if lo >= hi {
        extent / 2.0
    } else {
        rng.gen_range(lo..=hi)
    }
}
