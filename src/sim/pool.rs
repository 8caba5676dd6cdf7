//! Entity pool: one duck per profile
//!
//! Reconciling against a new profile list removes ducks whose profile is
//! gone and spawns ducks for new profiles. Ducks that persist keep their
//! kinematic state so unrelated adds/removes never make them jump.

use std::collections::{HashMap, HashSet};
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{Duck, PondState, Profile};
use crate::clamp_to_bounds;
use crate::cycle::resolve_origin;

/// What a reconcile call changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub was_empty: bool,
    pub is_empty: bool,
}

impl ReconcileOutcome {
    pub fn became_empty(&self) -> bool {
        !self.was_empty && self.is_empty
    }

    pub fn became_non_empty(&self) -> bool {
        self.was_empty && !self.is_empty
    }

    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Bring the pond's ducks in line with `profiles`
///
/// `sprite_for` maps a cycle day to a sprite URL.
pub fn reconcile(
    state: &mut PondState,
    profiles: &[Profile],
    anchor: &str,
    sprite_for: &dyn Fn(u8) -> String,
) -> ReconcileOutcome {
    let was_empty = state.ducks.is_empty();

    let mut seen = HashSet::new();
    let wanted: Vec<&Profile> = profiles
        .iter()
        .filter(|p| seen.insert(p.id.as_str()))
        .collect();

    let mut existing: HashMap<String, Duck> = state
        .ducks
        .drain(..)
        .map(|d| (d.id.clone(), d))
        .collect();

    let mut added = Vec::new();
    let mut ducks = Vec::with_capacity(wanted.len());
    for profile in wanted {
        match existing.remove(&profile.id) {
            Some(mut duck) => {
                refresh_identity(&mut duck, profile, anchor, sprite_for);
                ducks.push(duck);
            }
            None => {
                ducks.push(spawn_duck(state, profile, anchor, sprite_for));
                added.push(profile.id.clone());
            }
        }
    }

    let mut removed: Vec<String> = existing.into_keys().collect();
    removed.sort();
    state.ducks = ducks;

    let outcome = ReconcileOutcome {
        added,
        removed,
        was_empty,
        is_empty: state.ducks.is_empty(),
    };

    if outcome.became_non_empty() {
        activate_orb(state);
    } else if outcome.became_empty() {
        state.orb.active = false;
        state.orb.vel = Vec2::ZERO;
        state.orb.hit_cooldown = 0.0;
        state.score = 0.0;
        state.ripples.clear();
    }

    outcome
}

/// Recompute sprite URLs for every duck (kinematics untouched)
pub fn refresh_sprites(state: &mut PondState, sprite_for: &dyn Fn(u8) -> String) {
    for duck in &mut state.ducks {
        duck.sprite = duck.cycle_day.map(sprite_for);
    }
}

/// Update display fields of a persisting duck
fn refresh_identity(duck: &mut Duck, profile: &Profile, anchor: &str, sprite_for: &dyn Fn(u8) -> String) {
    duck.name = profile.display_name.clone();
    if duck.birthdate != profile.birthdate {
        duck.birthdate = profile.birthdate.clone();
        duck.cycle_day = resolve_origin(&profile.birthdate, anchor);
    }
    duck.sprite = duck.cycle_day.map(sprite_for);
}

fn spawn_duck(
    state: &mut PondState,
    profile: &Profile,
    anchor: &str,
    sprite_for: &dyn Fn(u8) -> String,
) -> Duck {
    let radius = state.duck_radius();
    let (w, h) = (state.width, state.height);
    let t = &state.tuning;
    let (spread_x, spread_y, speed) = (t.spawn_spread_x, t.spawn_spread_y, t.spawn_speed);
    let rng = &mut state.rng;

    let offset = Vec2::new(
        rng.random_range(-1.0..=1.0) * spread_x * w,
        rng.random_range(-1.0..=1.0) * spread_y * h,
    );
    let pos = clamp_to_bounds(Vec2::new(w / 2.0, h / 2.0) + offset, radius, w, h);

    let mut duck = Duck::new(profile.id.clone(), profile.display_name.clone(), pos, radius);
    duck.birthdate = profile.birthdate.clone();
    duck.cycle_day = resolve_origin(&profile.birthdate, anchor);
    duck.sprite = duck.cycle_day.map(sprite_for);
    duck.vel = Vec2::new(
        rng.random_range(-speed..=speed),
        rng.random_range(-speed..=speed),
    );
    duck.drift_seed_x = rng.random_range(0.0..TAU);
    duck.drift_seed_y = rng.random_range(0.0..TAU);
    duck.pulse_seed = rng.random_range(0.0..TAU);
    duck
}

/// Place the orb away from the centre cluster and wake it up
fn activate_orb(state: &mut PondState) {
    let center = state.center();
    let angle = state.rng.random_range(0.0..TAU);
    let reach = state.width.min(state.height) * 0.3;
    let pos = center + Vec2::new(angle.cos(), angle.sin()) * reach;

    let orb = &mut state.orb;
    orb.pos = clamp_to_bounds(pos, orb.radius, state.width, state.height);
    orb.vel = Vec2::ZERO;
    orb.hit_cooldown = 0.0;
    orb.active = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;

    const ANCHOR: &str = "1985-04-20";

    fn sprite(day: u8) -> String {
        format!("/duck-{}.png", day)
    }

    fn profiles(ids: &[&str]) -> Vec<Profile> {
        ids.iter()
            .map(|id| Profile::new(*id, format!("Name {}", id), "1985-04-21"))
            .collect()
    }

    #[test]
    fn test_reconcile_adds_and_activates_orb() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 7);
        let outcome = reconcile(&mut state, &profiles(&["a", "b"]), ANCHOR, &sprite);

        assert_eq!(outcome.added, vec!["a".to_string(), "b".to_string()]);
        assert!(outcome.became_non_empty());
        assert!(state.orb.active);
        assert_eq!(state.ducks.len(), 2);
        assert_eq!(state.ducks[0].cycle_day, Some(2));
        assert_eq!(state.ducks[0].sprite.as_deref(), Some("/duck-2.png"));
    }

    #[test]
    fn test_spawn_is_near_center_and_in_bounds() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 99);
        let ids: Vec<String> = (0..40).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        reconcile(&mut state, &profiles(&refs), ANCHOR, &sprite);

        for duck in &state.ducks {
            assert!((duck.pos.x - 400.0).abs() <= 0.35 * 800.0 + 1e-3);
            assert!((duck.pos.y - 300.0).abs() <= 0.25 * 600.0 + 1e-3);
            assert!(duck.pos.x >= duck.radius && duck.pos.x <= 800.0 - duck.radius);
            assert!(!duck.pinned);
        }
    }

    #[test]
    fn test_persisting_ducks_untouched() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 3);
        reconcile(&mut state, &profiles(&["a", "b"]), ANCHOR, &sprite);
        state.ducks[0].pinned = true;
        let before: Vec<_> = state
            .ducks
            .iter()
            .map(|d| (d.id.clone(), d.pos, d.vel, d.pinned))
            .collect();

        let outcome = reconcile(&mut state, &profiles(&["a", "b", "c"]), ANCHOR, &sprite);
        assert_eq!(outcome.added, vec!["c".to_string()]);
        for (id, pos, vel, pinned) in before {
            let duck = &state.ducks[state.find(&id).unwrap()];
            assert_eq!((duck.pos, duck.vel, duck.pinned), (pos, vel, pinned));
        }
    }

    #[test]
    fn test_remove_to_empty_resets_score() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 3);
        reconcile(&mut state, &profiles(&["a"]), ANCHOR, &sprite);
        state.score = 12.5;

        let outcome = reconcile(&mut state, &[], ANCHOR, &sprite);
        assert_eq!(outcome.removed, vec!["a".to_string()]);
        assert!(outcome.became_empty());
        assert!(!state.orb.active);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 3);
        reconcile(&mut state, &profiles(&["a", "a", "b"]), ANCHOR, &sprite);
        assert_eq!(state.ducks.len(), 2);
    }

    #[test]
    fn test_invalid_birthdate_has_no_cycle_day() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 3);
        let list = vec![Profile::new("x", "X", "someday")];
        reconcile(&mut state, &list, ANCHOR, &sprite);
        assert_eq!(state.ducks[0].cycle_day, None);
        assert_eq!(state.ducks[0].sprite, None);
    }

    #[test]
    fn test_rename_keeps_kinematics() {
        let mut state = PondState::new(800.0, 600.0, Tuning::default(), 3);
        reconcile(&mut state, &profiles(&["a"]), ANCHOR, &sprite);
        let pos = state.ducks[0].pos;

        let renamed = vec![Profile::new("a", "Ada", "1985-04-22")];
        let outcome = reconcile(&mut state, &renamed, ANCHOR, &sprite);
        assert!(!outcome.changed());
        assert_eq!(state.ducks[0].name, "Ada");
        assert_eq!(state.ducks[0].cycle_day, Some(3));
        assert_eq!(state.ducks[0].pos, pos);
    }
}
