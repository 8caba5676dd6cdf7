//! Property tests for the cycle resolver, pond physics, scoring and the ring

use chrono::{Duration, NaiveDate};
use glam::Vec2;
use proptest::prelude::*;

use duck_pond::cycle::cycle_position;
use duck_pond::input::apply_burst;
use duck_pond::settings::Tuning;
use duck_pond::sim::{PondState, Profile, advance, reconcile};
use duck_pond::{CarouselMode, RingCarousel, Settings};

const ANCHOR: &str = "1985-04-20";

fn sprite(day: u8) -> String {
    format!("/ducks/duck-{day}.png")
}

fn profiles(n: usize) -> Vec<Profile> {
    (0..n)
        .map(|i| Profile::new(format!("p{i}"), format!("Duck {i}"), "1990-03-15"))
        .collect()
}

fn pond(width: f32, height: f32, ducks: usize, seed: u64) -> PondState {
    let mut state = PondState::new(width, height, Tuning::default(), seed);
    reconcile(&mut state, &profiles(ducks), ANCHOR, &sprite);
    state
}

fn in_bounds(state: &PondState) -> bool {
    const TOL: f32 = 1e-3;
    state.ducks.iter().all(|d| {
        d.pos.x >= d.radius - TOL
            && d.pos.x <= state.width - d.radius + TOL
            && d.pos.y >= d.radius - TOL
            && d.pos.y <= state.height - d.radius + TOL
    })
}

/// One thing that can happen to a running pond
#[derive(Debug, Clone)]
enum Op {
    Step(f32),
    Burst(f32, f32),
    Fling(usize, f32, f32),
    SetCount(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0.001f32..0.1).prop_map(Op::Step),
        1 => (0.0f32..1.0, 0.0f32..1.0).prop_map(|(x, y)| Op::Burst(x, y)),
        1 => (0usize..8, -3000.0f32..3000.0, -3000.0f32..3000.0)
            .prop_map(|(i, vx, vy)| Op::Fling(i, vx, vy)),
        1 => (0usize..8).prop_map(Op::SetCount),
    ]
}

fn apply(state: &mut PondState, op: &Op) {
    match *op {
        Op::Step(dt) => {
            let t = state.time + dt;
            advance(state, dt, t);
        }
        Op::Burst(x, y) => {
            let at = Vec2::new(x * state.width, y * state.height);
            apply_burst(state, at);
        }
        Op::Fling(i, vx, vy) => {
            let n = state.ducks.len();
            if n > 0 {
                let duck = &mut state.ducks[i % n];
                if !duck.pinned {
                    duck.vel = Vec2::new(vx, vy);
                }
            }
        }
        Op::SetCount(n) => {
            reconcile(state, &profiles(n), ANCHOR, &sprite);
        }
    }
}

proptest! {
    #[test]
    fn cycle_position_wraps_every_18_days(d in -200_000i64..200_000) {
        let anchor = NaiveDate::from_ymd_opt(1985, 4, 20).unwrap();
        let date = anchor + Duration::days(d);
        let expected = (((d % 18) + 18) % 18 + 1) as u8;
        prop_assert_eq!(cycle_position(anchor, date), expected);
        prop_assert_eq!(cycle_position(anchor, anchor), 1);
    }

    #[test]
    fn ducks_stay_inside_the_canvas(
        width in 200.0f32..1600.0,
        height in 200.0f32..1200.0,
        ducks in 1usize..10,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let mut state = pond(width, height, ducks, seed);
        for op in &ops {
            apply(&mut state, op);
            if matches!(op, Op::Step(_)) {
                prop_assert!(in_bounds(&state), "duck escaped after {:?}", op);
            }
        }
    }

    #[test]
    fn pinned_ducks_never_move(
        ducks in 2usize..8,
        pinned in 0usize..8,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..150),
    ) {
        let mut state = pond(800.0, 600.0, ducks, seed);
        let id = state.ducks[pinned % ducks].id.clone();
        state.ducks[pinned % ducks].pinned = true;

        for op in &ops {
            // Keep the pinned duck in the pond
            if let Op::SetCount(_) = op {
                continue;
            }
            apply(&mut state, op);
            if matches!(op, Op::Step(_)) {
                let i = state.find(&id).unwrap();
                prop_assert_eq!(state.ducks[i].vel, Vec2::ZERO);
            }
        }
    }

    #[test]
    fn score_only_drops_when_the_pond_empties(
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..250),
    ) {
        let mut state = pond(800.0, 600.0, 3, seed);
        for op in &ops {
            let before = state.score;
            let was_empty = state.ducks.is_empty();
            apply(&mut state, op);

            if !was_empty && state.ducks.is_empty() {
                prop_assert_eq!(state.score, 0.0);
            } else {
                prop_assert!(state.score >= before, "score fell from {} to {}", before, state.score);
            }
        }
    }

    #[test]
    fn ring_settles_on_a_card(
        n in 1usize..13,
        coast in any::<bool>(),
        moves in prop::collection::vec(-400.0f32..400.0, 1..12),
    ) {
        let mode = if coast { CarouselMode::Coast } else { CarouselMode::Snap };
        let mut ring = RingCarousel::new(&Settings::default(), mode);
        ring.set_profiles(&profiles(n), ANCHOR, None);

        let mut x = 0.0;
        ring.pointer_down(1, x, 0.0);
        for (i, dx) in moves.iter().enumerate() {
            x += dx;
            ring.pointer_move(1, x, (i as f64 + 1.0) * 16.0);
        }
        ring.pointer_up(1);

        let mut frames = 0;
        while ring.tick(1.0 / 60.0) && frames < 10_000 {
            frames += 1;
        }
        prop_assert!(ring.is_settled());

        let k = ring.rotation() / ring.step();
        prop_assert!((k - k.round()).abs() < 1e-3, "rotation {} is not a multiple of {}", ring.rotation(), ring.step());
    }
}
