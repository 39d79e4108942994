//! Collision detection between the entity and obstacles
//!
//! Plain AABB overlap. Boxes that merely touch along an edge are not a hit.

use glam::Vec2;

use super::state::{Entity, Obstacle};

/// True if the entity's box strictly overlaps the obstacle's box on both axes
#[inline]
pub fn intersects(entity: &Entity, obstacle: &Obstacle) -> bool {
    entity.bounds().overlaps(&obstacle.bounds())
}

/// IDs of every obstacle the entity overlaps.
///
/// Every obstacle is tested; callers get the full list, not just the first hit.
pub fn hits(entity: &Entity, obstacles: &[Obstacle]) -> Vec<u32> {
    obstacles
        .iter()
        .filter(|o| intersects(entity, o))
        .map(|o| o.id)
        .collect()
}

/// Offset from the obstacle's centre to the entity's centre
pub fn collision_offset(entity: &Entity, obstacle: &Obstacle) -> Vec2 {
    entity.bounds().center() - obstacle.bounds().center()
}

/// Width and height of the overlap, or `None` when there is no hit
pub fn penetration(entity: &Entity, obstacle: &Obstacle) -> Option<Vec2> {
    entity
        .bounds()
        .intersection(&obstacle.bounds())
        .map(|overlap| Vec2::new(overlap.width(), overlap.height()))
}
