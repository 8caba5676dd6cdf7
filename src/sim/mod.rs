//! Pond simulation module
//!
//! All physics and scoring lives here. This module stays free of rendering
//! and platform dependencies:
//! - `dt` clamped to a small maximum
//! - Seeded RNG only
//! - Stable iteration order (profile order)

pub mod collision;
pub mod orb;
pub mod pool;
pub mod state;
pub mod tick;

pub use collision::{PairContact, WallHit, resolve_all_pairs, resolve_pair, resolve_walls};
pub use orb::{score_rate, step_orb, step_score};
pub use pool::{ReconcileOutcome, reconcile, refresh_sprites};
pub use state::{Duck, Orb, PondState, Profile, Ripple};
pub use tick::{StepReport, advance, drift_accel};
