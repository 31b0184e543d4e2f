//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a session produces identical
//! results given identical config, seed and inputs.
//!
//! # Testing Strategy
//!
//! Replay verification only works if sessions are 100% deterministic.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Host frame times are converted once with
//!   [`galaxy_core::math::seconds`]; everything after that is fixed-point.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   The instance registry is always walked in sorted id order.
//!
//! - **System randomness**: The session never creates its own generator.
//!   All "random" behavior uses the seeded `Rng` passed in by the host.

use std::thread;

use galaxy_core::math::Fixed;
use galaxy_core::session::Session;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the session was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one step
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a started session twice with the same seed and compare final hashes.
///
/// # Example
///
/// ```ignore
/// use galaxy_test_utils::determinism::verify_session_determinism;
/// use galaxy_test_utils::fixtures::default_session;
///
/// assert!(verify_session_determinism(default_session, 42, 600));
/// ```
pub fn verify_session_determinism<F>(setup_fn: F, seed: u64, num_ticks: u64) -> bool
where
    F: Fn() -> Session,
{
    let dt = Fixed::from_num(1) / Fixed::from_num(60);
    let result = verify_determinism(
        2,
        num_ticks,
        || {
            let mut session = setup_fn();
            session.on_start_trigger();
            (session, StdRng::seed_from_u64(seed))
        },
        |(session, rng)| session.tick(dt, rng),
        |(session, _)| session.state_hash(),
    );
    result.is_deterministic
}

/// Compare two session runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the sessions stay identical, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, seed: u64, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Session,
{
    let dt = Fixed::from_num(1) / Fixed::from_num(60);
    let mut a = setup_fn();
    let mut b = setup_fn();
    let mut rng_a = StdRng::seed_from_u64(seed);
    let mut rng_b = StdRng::seed_from_u64(seed);
    a.on_start_trigger();
    b.on_start_trigger();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        a.tick(dt, &mut rng_a);
        b.tick(dt, &mut rng_b);

        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Run N sessions on scoped threads and collect final hashes.
///
/// Sessions are built inside their threads, so the setup function only
/// has to be `Sync`.
pub fn run_parallel_sessions<F>(setup_fn: F, seed: u64, num_sessions: usize, num_ticks: u64) -> Vec<u64>
where
    F: Fn() -> Session + Sync,
{
    let dt = Fixed::from_num(1) / Fixed::from_num(60);
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_sessions)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    let mut rng = StdRng::seed_from_u64(seed);
                    session.on_start_trigger();
                    for _ in 0..num_ticks {
                        session.tick(dt, &mut rng);
                    }
                    session.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    })
}

/// Proptest strategies for rule-engine inputs.
pub mod strategies {
    use galaxy_core::data::PowerupKind;
    use galaxy_core::math::{Fixed, Vec2Fixed};
    use proptest::prelude::*;

    /// Player operations exercised by the invariant properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PlayerOp {
        /// Pick up a powerup.
        Collect(PowerupKind),
        /// Try to fire.
        Fire,
        /// Get hit.
        Contact,
        /// Thruster on.
        ThrusterOn,
        /// Thruster off.
        ThrusterOff,
        /// Advance time.
        Tick(Fixed),
    }

    /// Any powerup kind.
    pub fn arb_powerup_kind() -> impl Strategy<Value = PowerupKind> {
        prop::sample::select(PowerupKind::ALL.to_vec())
    }

    /// Frame time between 1 ms and 2 s, in milliseconds.
    pub fn arb_dt() -> impl Strategy<Value = Fixed> {
        (1i32..2000i32).prop_map(|ms| Fixed::from_num(ms) / Fixed::from_num(1000))
    }

    /// Movement axis with components in `{-1, 0, 1}`.
    pub fn arb_axis() -> impl Strategy<Value = Vec2Fixed> {
        ((-1i32..=1), (-1i32..=1)).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// One player operation.
    pub fn arb_player_op() -> impl Strategy<Value = PlayerOp> {
        prop_oneof![
            arb_powerup_kind().prop_map(PlayerOp::Collect),
            Just(PlayerOp::Fire),
            Just(PlayerOp::Contact),
            Just(PlayerOp::ThrusterOn),
            Just(PlayerOp::ThrusterOff),
            arb_dt().prop_map(PlayerOp::Tick),
        ]
    }

    /// A sequence of player operations.
    pub fn arb_player_ops(max_len: usize) -> impl Strategy<Value = Vec<PlayerOp>> {
        proptest::collection::vec(arb_player_op(), 0..max_len)
    }
}
