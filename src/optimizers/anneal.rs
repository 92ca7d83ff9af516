//! Fixed-length annealing loop with a temperature floor.
//!
//! The assignment annealers run a fixed number of proposals, cooling after
//! every one, instead of stopping at a minimum temperature the way
//! [`u_metaheur::sa::SaRunner`] does. The temperature never drops below
//! [`TEMPERATURE_FLOOR`], so late proposals still have a tiny chance of
//! being accepted uphill.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::Rng;
use tracing::trace;
use u_metaheur::sa::{SaProblem, SaResult};

use crate::branch::is_cancelled;

/// Lowest temperature the assignment annealers cool to.
pub const TEMPERATURE_FLOOR: f64 = 1e-6;

/// Schedule of one floored annealing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FlooredSchedule {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub iterations: usize,
}

/// Anneals `problem` from `initial` for `schedule.iterations` proposals.
///
/// `cost_history` holds the best cost before the first proposal and after
/// each one, so it is non-increasing and `iterations + 1` long unless the
/// run was cancelled.
pub(crate) fn anneal_floored<P, R>(
    problem: &P,
    initial: P::Solution,
    schedule: FlooredSchedule,
    cancel: &Option<Arc<AtomicBool>>,
    rng: &mut R,
) -> SaResult<P::Solution>
where
    P: SaProblem,
    R: Rng,
{
    let mut current = initial;
    let mut current_cost = problem.cost(&current);
    let mut best = current.clone();
    let mut best_cost = current_cost;

    let mut temperature = if schedule.initial_temperature > 0.0 {
        schedule.initial_temperature
    } else {
        TEMPERATURE_FLOOR
    };
    let mut iterations = 0;
    let mut accepted_moves = 0;
    let mut improving_moves = 0;
    let mut cancelled = false;
    let mut cost_history = Vec::with_capacity(schedule.iterations + 1);
    cost_history.push(best_cost);

    for _ in 0..schedule.iterations {
        if is_cancelled(cancel) {
            cancelled = true;
            break;
        }

        let candidate = problem.neighbor(&current, rng);
        let candidate_cost = problem.cost(&candidate);
        let delta = candidate_cost - current_cost;

        let accept = delta <= 0.0 || rng.random::<f64>() < (-delta / temperature).exp();
        if accept {
            if delta < 0.0 {
                improving_moves += 1;
            }
            trace!(iteration = iterations, delta, temperature, "accepted move");
            current = candidate;
            current_cost = candidate_cost;
            accepted_moves += 1;
            if current_cost < best_cost {
                best = current.clone();
                best_cost = current_cost;
            }
        }

        iterations += 1;
        cost_history.push(best_cost);
        temperature = (temperature * schedule.cooling_rate).max(TEMPERATURE_FLOOR);
    }

    SaResult {
        best,
        best_cost,
        iterations,
        final_temperature: temperature,
        accepted_moves,
        improving_moves,
        cancelled,
        cost_history,
    }
}
