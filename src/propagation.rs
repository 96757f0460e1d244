//! The single-run propagation engine
//!
//! Drives one epidemic over a fixed population and adjacency relation to a
//! fixed point. Every initially infected person is seeded at t = 0; each
//! newly infected person projects time-stamped infection attempts onto their
//! uninfected neighbors; the earliest pending attempt resolves next, until no
//! attempts remain.

use log::trace;
use rand::Rng;
use rand_distr::{Beta, Distribution};

use crate::network::AdjacencyMatrix;
use crate::people::Person;
use crate::queue::AttemptQueue;

/// Counters describing one completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Attempts that resolved and infected their target. Each person past
    /// the initial seeds is infected by exactly one attempt, so this equals
    /// the number of people infected during the run.
    pub events_executed: usize,
    /// Attempts cancelled because their target was infected first.
    pub events_discarded: usize,
}

/// Runs one epidemic to completion, marking infected people in place.
///
/// `adjacency` is borrowed and cloned into a running copy; the clone has an
/// infected node's column consumed as soon as that node resolves, so no
/// later attempt can target them again. The final infection statuses and
/// times are left on `population`.
///
/// A population with no initially infected people returns immediately with
/// nothing scheduled.
pub fn propagate<R: Rng>(
    population: &mut [Person],
    adjacency: &AdjacencyMatrix,
    rng: &mut R,
) -> RunStats {
    let mut running = adjacency.clone();
    let mut queue = AttemptQueue::new();
    let mut stats = RunStats::default();

    for idx in 0..population.len() {
        if population[idx].is_infected() {
            infect_and_project(population, idx, 0.0, &mut running, &mut queue, rng);
        }
    }

    while let Some(attempt) = queue.pop_earliest() {
        trace!(
            "resolving attempt {} -> {} at t={:.2}",
            attempt.source,
            attempt.target,
            attempt.time
        );
        // The target is being infected now; competing attempts on them are
        // moot.
        stats.events_discarded += queue.cancel_targeting(attempt.target);
        infect_and_project(
            population,
            attempt.target,
            attempt.time,
            &mut running,
            &mut queue,
            rng,
        );
        stats.events_executed += 1;
    }

    stats
}

/// Marks `target` infected at `time` and projects attempts onto each of
/// their surviving neighbors, then consumes the target's column so they
/// never appear as a target again.
fn infect_and_project<R: Rng>(
    population: &mut [Person],
    target: usize,
    time: f64,
    running: &mut AdjacencyMatrix,
    queue: &mut AttemptQueue,
    rng: &mut R,
) {
    population[target].set_infected(time);

    let neighbors = running.neighbors_of(target);
    if !neighbors.is_empty() {
        let offsets = sample_attempt_offsets(&population[target], neighbors.len(), rng);
        // zip clamps to the shorter of the two lists
        for (&neighbor, offset) in neighbors.iter().zip(offsets) {
            queue.push(target, neighbor, time + offset);
        }
    }
    running.isolate(target);
}

/// Times until each transmission attempt, relative to the moment `person`
/// was infected.
///
/// Drawn from a Beta(2, 5) distribution scaled by the person's infectious
/// window, which concentrates attempts early in the window when viral load
/// is highest.
fn sample_attempt_offsets<R: Rng>(person: &Person, n: usize, rng: &mut R) -> Vec<f64> {
    let beta = Beta::new(2.0, 5.0).unwrap();
    (0..n)
        .map(|_| person.infectious_window() * beta.sample(rng))
        .collect()
}
