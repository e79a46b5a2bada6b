//! Proximity checks on the continuous render plane.

use glam::Vec2;

/// Distance below which two entities touch.
///
/// Kept under the default lattice step of 22 so that entities on adjacent
/// cells never register as colliding.
pub const DEFAULT_COLLISION_THRESHOLD: f32 = 20.0;

/// Reports whether two entities are closer than `threshold` render units.
#[must_use]
pub fn is_colliding(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance(b) < threshold
}
