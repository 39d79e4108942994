//! Vertical motion of the controlled entity
//!
//! Gravity is a constant per-tick velocity increment, so the tick cadence is
//! the unit of time. Callers must tick at a stable rate for a consistent feel.

use super::state::Entity;

/// Advance one tick under gravity, clamping to the ground
pub fn advance(entity: &Entity, gravity: f32, ground_y: f32) -> Entity {
    let mut velocity_y = entity.velocity_y + gravity;
    let mut y = entity.y + velocity_y;
    let mut is_jumping = entity.is_jumping;

    if y >= ground_y {
        y = ground_y;
        velocity_y = 0.0;
        is_jumping = false;
    }

    Entity {
        y,
        velocity_y,
        is_jumping,
        ..*entity
    }
}

/// Apply a jump impulse if the entity is within `tolerance` of the ground.
///
/// Returns whether the jump was accepted. No double jumps.
pub fn try_jump(entity: &mut Entity, jump_force: f32, ground_y: f32, tolerance: f32) -> bool {
    if (entity.y - ground_y).abs() > tolerance {
        return false;
    }
    entity.velocity_y = jump_force;
    entity.is_jumping = true;
    true
}

/// Height gained by a full jump from rest under the per-tick integration above
pub fn jump_apex(jump_force: f32, gravity: f32) -> f32 {
    if !(gravity > 0.0 && jump_force < 0.0) {
        return 0.0;
    }
    // Ticks that still move upward after gravity is applied
    let force = -(jump_force as f64);
    let gravity = gravity as f64;
    let rising_ticks = ((force / gravity).ceil() - 1.0).max(0.0);
    let rise = rising_ticks * force - gravity * rising_ticks * (rising_ticks + 1.0) / 2.0;
    rise as f32
}
