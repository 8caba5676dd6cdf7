//! Collision detection and response for circles in a box
//!
//! Walls reflect and bleed energy; pairs are pushed apart along the contact
//! normal and exchange an elastic impulse only while approaching.

use glam::Vec2;

use super::state::Duck;
use crate::consts::EPSILON;

/// Which walls a circle was clamped against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    pub x: bool,
    pub y: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Clamp a circle into `[radius, extent - radius]` and reflect the clamped
/// velocity component, scaled by `restitution`
pub fn resolve_walls(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    width: f32,
    height: f32,
    restitution: f32,
) -> WallHit {
    let mut hit = WallHit::default();

    if pos.x < radius {
        pos.x = radius;
        vel.x = vel.x.abs() * restitution;
        hit.x = true;
    } else if pos.x > width - radius {
        pos.x = width - radius;
        vel.x = -vel.x.abs() * restitution;
        hit.x = true;
    }

    if pos.y < radius {
        pos.y = radius;
        vel.y = vel.y.abs() * restitution;
        hit.y = true;
    } else if pos.y > height - radius {
        pos.y = height - radius;
        vel.y = -vel.y.abs() * restitution;
        hit.y = true;
    }

    hit
}

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Unit vector from `from` to `to`, falling back to +X when they coincide
#[inline]
pub fn contact_normal(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let dist = delta.length();
    if dist < EPSILON {
        (Vec2::X, dist)
    } else {
        (delta / dist, dist)
    }
}

/// How far a duck yields during separation (0 = immovable)
fn mobility(duck: &Duck, grabbed_mobility: f32) -> f32 {
    if duck.pinned {
        0.0
    } else if duck.grabbed {
        grabbed_mobility
    } else {
        1.0
    }
}

/// Inverse mass for impulses; only pinned ducks are immovable
fn inverse_mass(duck: &Duck) -> f32 {
    if duck.pinned { 0.0 } else { 1.0 }
}

/// Result of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContact {
    pub overlap: f32,
    pub normal: Vec2,
    /// Whether an impulse was applied (pair was approaching)
    pub impulse: bool,
}

/// Separate two overlapping ducks and apply an elastic impulse
///
/// Returns `None` when the circles do not overlap.
pub fn resolve_pair(
    a: &mut Duck,
    b: &mut Duck,
    restitution: f32,
    grabbed_mobility: f32,
) -> Option<PairContact> {
    let (normal, dist) = contact_normal(a.pos, b.pos);
    let overlap = a.radius + b.radius - dist;
    if overlap <= 0.0 {
        return None;
    }

    let ma = mobility(a, grabbed_mobility);
    let mb = mobility(b, grabbed_mobility);
    let share_a = if ma + mb > 0.0 { ma / (ma + mb) } else { 0.5 };
    a.pos -= normal * overlap * share_a;
    b.pos += normal * overlap * (1.0 - share_a);

    let wa = inverse_mass(a);
    let wb = inverse_mass(b);
    let approaching = (b.vel - a.vel).dot(normal);
    let mut impulse = false;
    if approaching < 0.0 && wa + wb > 0.0 {
        let j = -(1.0 + restitution) * approaching / (wa + wb);
        a.vel -= normal * j * wa;
        b.vel += normal * j * wb;
        impulse = true;
    }

    Some(PairContact {
        overlap,
        normal,
        impulse,
    })
}

/// Resolve every unordered pair once
pub fn resolve_all_pairs(ducks: &mut [Duck], restitution: f32, grabbed_mobility: f32) -> usize {
    let mut contacts = 0;
    for i in 0..ducks.len() {
        let (head, tail) = ducks.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if resolve_pair(a, b, restitution, grabbed_mobility).is_some() {
                contacts += 1;
            }
        }
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duck(x: f32, y: f32, r: f32) -> Duck {
        Duck::new("d", "d", Vec2::new(x, y), r)
    }

    #[test]
    fn test_overlap_fully_resolved_without_impulse() {
        let mut a = duck(100.0, 100.0, 10.0);
        let mut b = duck(110.0, 100.0, 10.0);

        let contact = resolve_pair(&mut a, &mut b, 0.9, 0.25).unwrap();
        assert!((contact.overlap - 10.0).abs() < 1e-4);
        assert!(!contact.impulse);
        assert!((a.pos.distance(b.pos) - 20.0).abs() < 1e-4);
        assert_eq!(a.vel, Vec2::ZERO);
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn test_head_on_elastic_exchange() {
        let mut a = duck(100.0, 100.0, 10.0);
        let mut b = duck(118.0, 100.0, 10.0);
        a.vel = Vec2::new(50.0, 0.0);
        b.vel = Vec2::new(-50.0, 0.0);

        let contact = resolve_pair(&mut a, &mut b, 1.0, 0.25).unwrap();
        assert!(contact.impulse);
        assert!((a.vel.x + 50.0).abs() < 1e-3);
        assert!((b.vel.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let mut a = duck(100.0, 100.0, 10.0);
        let mut b = duck(115.0, 100.0, 10.0);
        a.vel = Vec2::new(-30.0, 0.0);
        b.vel = Vec2::new(30.0, 0.0);

        resolve_pair(&mut a, &mut b, 0.9, 0.25).unwrap();
        assert_eq!(a.vel, Vec2::new(-30.0, 0.0));
        assert_eq!(b.vel, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_grabbed_duck_moves_less() {
        let mut a = duck(100.0, 100.0, 10.0);
        let mut b = duck(110.0, 100.0, 10.0);
        a.grabbed = true;

        resolve_pair(&mut a, &mut b, 0.9, 0.25).unwrap();
        let a_moved = (a.pos.x - 100.0).abs();
        let b_moved = (b.pos.x - 110.0).abs();
        assert!(a_moved < b_moved);
        assert!((a_moved + b_moved - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_held_duck_shares_impulse_equally() {
        let mut a = duck(100.0, 100.0, 10.0);
        let mut b = duck(115.0, 100.0, 10.0);
        a.grabbed = true;
        a.vel = Vec2::new(100.0, 0.0);

        let contact = resolve_pair(&mut a, &mut b, 1.0, 0.25).unwrap();
        assert!(contact.impulse);
        assert!(a.vel.x.abs() < 1e-3);
        assert!((b.vel.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_pinned_duck_stays_put() {
        let mut a = duck(100.0, 100.0, 10.0);
        let mut b = duck(110.0, 100.0, 10.0);
        a.pinned = true;
        b.vel = Vec2::new(-40.0, 0.0);

        resolve_pair(&mut a, &mut b, 0.9, 0.25).unwrap();
        assert_eq!(a.pos, Vec2::new(100.0, 100.0));
        assert_eq!(a.vel, Vec2::ZERO);
        assert!(b.vel.x > 0.0);
    }

    #[test]
    fn test_coincident_centres_use_fallback_normal() {
        let mut a = duck(50.0, 50.0, 10.0);
        let mut b = duck(50.0, 50.0, 10.0);

        let contact = resolve_pair(&mut a, &mut b, 0.9, 0.25).unwrap();
        assert_eq!(contact.normal, Vec2::X);
        assert!(a.pos.is_finite() && b.pos.is_finite());
        assert!((a.pos.distance(b.pos) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_wall_reflects_with_restitution() {
        let mut pos = Vec2::new(395.0, 50.0);
        let mut vel = Vec2::new(100.0, -20.0);

        let hit = resolve_walls(&mut pos, &mut vel, 10.0, 400.0, 300.0, 0.5);
        assert!(hit.x && !hit.y);
        assert_eq!(pos.x, 390.0);
        assert_eq!(vel, Vec2::new(-50.0, -20.0));
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x + 100.0).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }
}
