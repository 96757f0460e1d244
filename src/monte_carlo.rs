//! Monte Carlo driver: runs many independent trials of the propagation
//! engine and reduces them into binned time-series statistics
//!
//! Each trial samples its own realization of active edges, runs one epidemic
//! over them, and reduces the result to a symptomatic-case curve. The batch
//! driver bins each curve into fixed time windows, accumulates one column
//! per trial, and reduces the table to per-bin mean and standard deviation,
//! per-node infection frequency, and per-trial total-infected counts.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::EpinetError;
use crate::history::symptomatic_history;
use crate::network::{AdjacencyMatrix, Link, Node};
use crate::people::{DiseaseParams, Person};
use crate::propagation::propagate;

/// Batch-level knobs for [`run_batch`].
///
/// The defaults are the stock configuration: 100 trials over a 100-day
/// horizon in 12-hour bins, with the reported curve trimmed past the point
/// where the mean count goes quiet.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub n_trials: usize,
    /// Horizon, in hours; longer than any individual trial is expected to
    /// last.
    pub t_max: f64,
    /// Width of the fixed time bins, in hours.
    pub bin_width: f64,
    /// Trailing bins with a mean below this are trimmed from the report.
    pub trim_threshold: f64,
    /// Bins restored past the trim point so the tail shape stays visible.
    pub trim_buffer: usize,
    /// Base seed; trial `i` derives its own generator from `seed + i`.
    pub seed: u64,
    pub disease: DiseaseParams,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            n_trials: 100,
            t_max: 2400.0,
            bin_width: 12.0,
            trim_threshold: 0.001,
            trim_buffer: 5,
            seed: 0,
            disease: DiseaseParams::default(),
        }
    }
}

/// Per-person outcome of a single trial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeOutcome {
    pub name: String,
    pub infected: bool,
}

/// One trial's reduced output.
#[derive(Clone, Debug)]
pub struct TrialOutcome {
    /// Final statuses, aligned to the input node order.
    pub outcomes: Vec<NodeOutcome>,
    /// Time-ordered (time, symptomatic count) pairs.
    pub curve: Vec<(f64, i64)>,
}

/// Aggregate output of a batch, consumed by the visualization/response
/// collaborator.
#[derive(Clone, Debug, Serialize)]
pub struct BatchSummary {
    /// Fraction of trials in which each node ended infected, aligned to the
    /// input node order.
    pub node_infection_fraction: Vec<f64>,
    /// Ascending bin-start times, in hours, trimmed past the quiet tail.
    pub bins: Vec<f64>,
    pub binwise_mean: Vec<f64>,
    pub binwise_stdev: Vec<f64>,
    /// Total number of people infected in each trial.
    pub total_infected: Vec<usize>,
}

/// Runs one independent trial: samples which links are active with
/// probability `infection_prob`, builds the adjacency relation from the
/// active links only, runs the propagation engine over a freshly sampled
/// population, and reduces the result to a symptomatic-case curve.
///
/// # Errors
///
/// Fails on a link referencing an unknown node, a self-loop, or an
/// `infection_prob` outside `[0, 1]`, all before any simulation work.
pub fn run_single<R: Rng>(
    nodes: &[Node],
    links: &[Link],
    infection_prob: f64,
    disease: &DiseaseParams,
    rng: &mut R,
) -> Result<TrialOutcome, EpinetError> {
    validate_probability(infection_prob)?;

    let active: Vec<Link> = links
        .iter()
        .filter(|_| rng.random_bool(infection_prob))
        .cloned()
        .collect();
    let adjacency = AdjacencyMatrix::from_links(nodes, &active)?;

    let mut population: Vec<Person> = nodes
        .iter()
        .map(|node| Person::new(&node.name, node.infected, disease, rng))
        .collect();

    let stats = propagate(&mut population, &adjacency, rng);
    debug!(
        "trial infected {}/{} people ({} attempts discarded)",
        population.iter().filter(|p| p.is_infected()).count(),
        population.len(),
        stats.events_discarded
    );

    let curve = symptomatic_history(&population).collect();
    let outcomes = population
        .iter()
        .map(|person| NodeOutcome {
            name: person.name().to_string(),
            infected: person.is_infected(),
        })
        .collect();

    Ok(TrialOutcome { outcomes, curve })
}

/// Runs `config.n_trials` independent trials and reduces them to a
/// [`BatchSummary`].
///
/// Trials run sequentially, each from its own seeded generator, and
/// accumulate by addition only, so trial order cannot affect the aggregate.
///
/// # Errors
///
/// Configuration errors (an unknown node, a self-loop, an out-of-range
/// probability, a degenerate bin layout) surface before the first trial
/// runs. No per-trial failure modes remain once the input validates.
pub fn run_batch(
    nodes: &[Node],
    links: &[Link],
    infection_prob: f64,
    config: &BatchConfig,
) -> Result<BatchSummary, EpinetError> {
    validate_probability(infection_prob)?;
    // Resolve every link against the full node set up front so a bad edge
    // fails the batch rather than some arbitrary trial.
    AdjacencyMatrix::from_links(nodes, links)?;

    if config.n_trials == 0 {
        return Err("batch needs at least one trial".into());
    }
    if !config.bin_width.is_finite() || config.bin_width <= 0.0 || config.t_max < config.bin_width
    {
        return Err(EpinetError::EpinetError(format!(
            "degenerate bin layout: t_max={}, bin_width={}",
            config.t_max, config.bin_width
        )));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_bins = (config.t_max / config.bin_width) as usize;
    // One column per trial, zero-filled where a trial has no curve points.
    let mut table = vec![vec![0.0_f64; config.n_trials]; n_bins];
    let mut infection_counts = vec![0_usize; nodes.len()];
    let mut total_infected = Vec::with_capacity(config.n_trials);

    info!(
        "running {} trials over {} nodes / {} links (p={})",
        config.n_trials,
        nodes.len(),
        links.len(),
        infection_prob
    );

    for trial in 0..config.n_trials {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(trial as u64));
        let outcome = run_single(nodes, links, infection_prob, &config.disease, &mut rng)?;

        accumulate_binned(&outcome.curve, config.bin_width, &mut table, trial);

        let mut infected_this_trial = 0;
        for (node_idx, node_outcome) in outcome.outcomes.iter().enumerate() {
            if node_outcome.infected {
                infection_counts[node_idx] += 1;
                infected_this_trial += 1;
            }
        }
        total_infected.push(infected_this_trial);
    }

    let mut binwise_mean: Vec<f64> = table.iter().map(|column| mean(column)).collect();
    let mut binwise_stdev: Vec<f64> = table.iter().map(|column| stdev(column)).collect();
    let mut bins: Vec<f64> = (0..n_bins)
        .map(|bin| {
            #[allow(clippy::cast_precision_loss)]
            let start = bin as f64 * config.bin_width;
            start
        })
        .collect();

    // Trim the quiet tail, then restore a few bins so its shape survives.
    let mut last_active = n_bins;
    while last_active > 0 && binwise_mean[last_active - 1] < config.trim_threshold {
        last_active -= 1;
    }
    let cut = (last_active + config.trim_buffer).min(n_bins);
    binwise_mean.truncate(cut);
    binwise_stdev.truncate(cut);
    bins.truncate(cut);

    #[allow(clippy::cast_precision_loss)]
    let node_infection_fraction = infection_counts
        .iter()
        .map(|&count| count as f64 / config.n_trials as f64)
        .collect();

    Ok(BatchSummary {
        node_infection_fraction,
        bins,
        binwise_mean,
        binwise_stdev,
        total_infected,
    })
}

fn validate_probability(infection_prob: f64) -> Result<(), EpinetError> {
    if !(0.0..=1.0).contains(&infection_prob) {
        return Err(EpinetError::EpinetError(format!(
            "infection probability {infection_prob} is outside [0, 1]"
        )));
    }
    Ok(())
}

/// Assigns each curve point to the bin containing its time and stores the
/// per-bin mean of the points as this trial's column value. Points past the
/// horizon land in the last bin.
fn accumulate_binned(curve: &[(f64, i64)], bin_width: f64, table: &mut [Vec<f64>], trial: usize) {
    let n_bins = table.len();
    let mut sums = vec![0.0_f64; n_bins];
    let mut counts = vec![0_u32; n_bins];
    for &(time, active) in curve {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bin = ((time / bin_width) as usize).min(n_bins - 1);
        #[allow(clippy::cast_precision_loss)]
        {
            sums[bin] += active as f64;
        }
        counts[bin] += 1;
    }
    for bin in 0..n_bins {
        if counts[bin] > 0 {
            table[bin][trial] = sums[bin] / f64::from(counts[bin]);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn stdev(values: &[f64]) -> f64 {
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
