//! Pairwise attraction simulation.
//!
//! One [`PhysicsEngine::step`] call advances every placed magnet by one
//! tick: force accumulation, damping, speed clamp, integration, wall
//! bounce, and the per-tick deviation report the settling protocol
//! consumes. The engine knows nothing about rooms or turns.

use std::collections::HashMap;

use crate::config::GameConfig;
use crate::magnet::{MagnetArena, MagnetId};
use crate::math::Vec2;

/// Stateless simulation step over a room's magnet arena.
///
/// Holds only the tuning constants; all mutable state lives in the arena.
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    config: GameConfig,
}

impl PhysicsEngine {
    /// Create an engine with the given tuning.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    /// Advance all placed magnets by one tick.
    ///
    /// Returns the ids of placed magnets whose distance from their
    /// captured placement position exceeds the movement threshold after
    /// this tick. The report is recomputed every tick, not latched.
    pub fn step(&self, arena: &mut MagnetArena) -> Vec<MagnetId> {
        let placed = arena.placed_ids();

        // Accumulate pairwise impulses first so force application is
        // independent of iteration order.
        let mut impulses: HashMap<MagnetId, Vec2> = HashMap::new();
        for (i, &a) in placed.iter().enumerate() {
            for &b in &placed[i + 1..] {
                let (pa, pb) = match (arena.get(a), arena.get(b)) {
                    (Some(ma), Some(mb)) => (ma.position(), mb.position()),
                    _ => continue,
                };
                if let Some(impulse) = self.attraction(pa, pb) {
                    *impulses.entry(a).or_insert(Vec2::ZERO) += impulse;
                    *impulses.entry(b).or_insert(Vec2::ZERO) += impulse.scale(-1.0);
                }
            }
        }

        let mut moved = Vec::new();
        for &id in &placed {
            let Some(magnet) = arena.get_mut(id) else {
                continue;
            };

            if let Some(impulse) = impulses.get(&id) {
                magnet.vx += impulse.x;
                magnet.vy += impulse.y;
            }

            // Damping, then clamp to the speed cap by uniform rescale.
            magnet.vx *= self.config.damping;
            magnet.vy *= self.config.damping;
            let speed = Vec2::new(magnet.vx, magnet.vy).length();
            if speed > self.config.max_velocity {
                let scale = self.config.max_velocity / speed;
                magnet.vx *= scale;
                magnet.vy *= scale;
            }

            magnet.x += magnet.vx;
            magnet.y += magnet.vy;

            // Inelastic wall bounce: clamp position, invert and halve the
            // perpendicular velocity component.
            let r = self.config.magnet_radius;
            let bounds = self.config.world_bounds;
            if magnet.x - r < 0.0 {
                magnet.x = r;
                magnet.vx = magnet.vx.abs() * 0.5;
            } else if magnet.x + r > bounds.width {
                magnet.x = bounds.width - r;
                magnet.vx = -magnet.vx.abs() * 0.5;
            }
            if magnet.y - r < 0.0 {
                magnet.y = r;
                magnet.vy = magnet.vy.abs() * 0.5;
            } else if magnet.y + r > bounds.height {
                magnet.y = bounds.height - r;
                magnet.vy = -magnet.vy.abs() * 0.5;
            }

            if let Some(initial) = magnet.initial_position() {
                if magnet.position().distance(initial) > self.config.movement_threshold {
                    moved.push(id);
                }
            }

            // Snap creeping velocities to zero so "all still" is reachable.
            if magnet.vx.abs() < self.config.stop_epsilon {
                magnet.vx = 0.0;
            }
            if magnet.vy.abs() < self.config.stop_epsilon {
                magnet.vy = 0.0;
            }
        }

        moved
    }

    /// Impulse on the magnet at `a` from the magnet at `b`, if the pair is
    /// inside the force band. The opposite impulse applies to `b`.
    fn attraction(&self, a: Vec2, b: Vec2) -> Option<Vec2> {
        let delta = b - a;
        let distance = delta.length();
        if distance < self.config.min_force_distance || distance > self.config.max_force_distance {
            return None;
        }
        // F = k / r^2, always attractive.
        let magnitude = self.config.magnetic_strength / (distance * distance);
        Some(delta.scale(magnitude / distance))
    }

    /// Whether `point` is a legal placement: fully inside the walls and at
    /// least two radii away from every placed magnet. Pure query.
    #[must_use]
    pub fn is_valid_placement(&self, point: Vec2, arena: &MagnetArena) -> bool {
        let r = self.config.magnet_radius;
        let bounds = self.config.world_bounds;
        if point.x - r < 0.0
            || point.x + r > bounds.width
            || point.y - r < 0.0
            || point.y + r > bounds.height
        {
            return false;
        }

        arena
            .iter()
            .filter(|m| m.is_placed)
            .all(|m| point.distance(m.position()) >= r * 2.0)
    }
}
