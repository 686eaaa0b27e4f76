//! Core type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an entity.
///
/// Ids are handed out in increasing order by the registry and never reused,
/// so comparing two ids also orders entities by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 2D position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared euclidean distance, used for ordering candidates
    pub fn distance_squared(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Position) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Move at most `max_step` toward `target` without overshooting it.
    pub fn step_toward(&self, target: &Position, max_step: f32) -> Self {
        let distance = self.distance(target);
        if distance <= max_step || distance == 0.0 {
            return *target;
        }
        let scale = max_step / distance;
        self.add((target.x - self.x) * scale, (target.y - self.y) * scale)
    }

    /// Whether the position lies inside `[0, width] x [0, height]`
    pub fn within_bounds(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.x <= width && self.y >= 0.0 && self.y <= height
    }

    pub fn clamp(&self, width: f32, height: f32) -> Self {
        Self {
            x: self.x.clamp(0.0, width),
            y: self.y.clamp(0.0, height),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Category of an entity. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Mongoose,
    Snake,
    Rat,
    Berry,
}

impl Species {
    pub fn all() -> [Species; 4] {
        [Species::Mongoose, Species::Snake, Species::Rat, Species::Berry]
    }

    /// Species this one eats on contact
    pub fn diet(&self) -> &'static [Species] {
        match self {
            Species::Mongoose => &[Species::Rat, Species::Berry],
            Species::Snake => &[Species::Rat, Species::Berry],
            Species::Rat => &[Species::Berry],
            Species::Berry => &[],
        }
    }

    pub fn can_eat(&self, prey: Species) -> bool {
        self.diet().contains(&prey)
    }

    /// Whether the AI controller drives this species.
    ///
    /// The mongoose belongs to the player and berries never act.
    pub fn is_agent(&self) -> bool {
        matches!(self, Species::Snake | Species::Rat)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Mongoose => "mongoose",
            Species::Snake => "snake",
            Species::Rat => "rat",
            Species::Berry => "berry",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongoose" => Ok(Species::Mongoose),
            "snake" => Ok(Species::Snake),
            "rat" | "mouse" | "mice" => Ok(Species::Rat),
            "berry" => Ok(Species::Berry),
            other => Err(Error::UnknownSpecies(other.to_string())),
        }
    }
}

/// Selects which entities a registry query yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityFilter {
    All,
    Species(Species),
}

impl EntityFilter {
    pub fn matches(&self, species: Species) -> bool {
        match self {
            EntityFilter::All => true,
            EntityFilter::Species(s) => *s == species,
        }
    }
}

impl From<Species> for EntityFilter {
    fn from(species: Species) -> Self {
        EntityFilter::Species(species)
    }
}
