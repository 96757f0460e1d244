//! Reduces a completed run's infection times into a symptomatic-case curve
//!
//! Each infected person is symptomatic over
//! `[infection_time + time_to_symptoms, infection_time + time_to_symptoms +
//! symptoms_duration)`. The reducer collects the interval boundaries into two
//! sorted sequences and merges them with a two-pointer sweep into a
//! time-ordered running count of concurrently symptomatic people.

use crate::people::Person;

/// A finite, forward-only sweep over symptomatic-interval boundaries,
/// yielding `(time, running count)` pairs in ascending time order.
///
/// Once the horizon encloses every interval, the count at the final yielded
/// timestamp is 0: every interval that opens eventually closes.
pub struct HistorySweep {
    starts: Vec<f64>,
    ends: Vec<f64>,
    next_start: usize,
    next_end: usize,
    active: i64,
}

/// Builds the symptomatic-case sweep for a completed propagation run.
///
/// People who were never infected contribute no interval.
#[must_use]
pub fn symptomatic_history(population: &[Person]) -> HistorySweep {
    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for person in population {
        if let Some(infection_time) = person.infection_time() {
            let onset = infection_time + person.time_to_symptoms();
            starts.push(onset);
            ends.push(onset + person.symptoms_duration());
        }
    }
    starts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ends.sort_by(|a, b| a.partial_cmp(b).unwrap());

    HistorySweep {
        starts,
        ends,
        next_start: 0,
        next_end: 0,
        active: 0,
    }
}

impl Iterator for HistorySweep {
    type Item = (f64, i64);

    fn next(&mut self) -> Option<(f64, i64)> {
        if self.next_start < self.starts.len() {
            let onset = self.starts[self.next_start];
            let clearance = self.ends[self.next_end];
            if onset < clearance {
                self.next_start += 1;
                self.active += 1;
                Some((onset, self.active))
            } else {
                self.next_end += 1;
                self.active -= 1;
                Some((clearance, self.active))
            }
        } else if self.next_end < self.ends.len() {
            // All onsets consumed; drain the remaining clearances.
            let clearance = self.ends[self.next_end];
            self.next_end += 1;
            self.active -= 1;
            Some((clearance, self.active))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining =
            self.starts.len() - self.next_start + self.ends.len() - self.next_end;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HistorySweep {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::DiseaseParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn infected_person(name: &str, infection_time: f64, rng: &mut StdRng) -> Person {
        let mut person = Person::new(name, false, &DiseaseParams::default(), rng);
        person.set_infected(infection_time);
        person
    }

    #[test]
    fn empty_population_yields_nothing() {
        let mut sweep = symptomatic_history(&[]);
        assert!(sweep.next().is_none());
    }

    #[test]
    fn uninfected_people_contribute_no_interval() {
        let mut rng = StdRng::seed_from_u64(10);
        let population = vec![Person::new("n0", false, &DiseaseParams::default(), &mut rng)];
        assert_eq!(symptomatic_history(&population).count(), 0);
    }

    #[test]
    fn single_infection_opens_and_closes_one_interval() {
        let mut rng = StdRng::seed_from_u64(11);
        let population = vec![infected_person("n0", 0.0, &mut rng)];
        let points: Vec<(f64, i64)> = symptomatic_history(&population).collect();

        assert_eq!(points.len(), 2);
        let (onset, up) = points[0];
        let (clearance, down) = points[1];
        assert_eq!(up, 1);
        assert_eq!(down, 0);
        assert_eq!(onset, population[0].infection_time().unwrap() + population[0].time_to_symptoms());
        assert_eq!(clearance, onset + population[0].symptoms_duration());
    }

    #[test]
    fn overlapping_intervals_stack() {
        // Two infections close together overlap; the count reaches 2.
        let mut rng = StdRng::seed_from_u64(12);
        let population = vec![
            infected_person("n0", 0.0, &mut rng),
            infected_person("n1", 1.0, &mut rng),
        ];
        let points: Vec<(f64, i64)> = symptomatic_history(&population).collect();

        assert_eq!(points.len(), 4);
        let peak = points.iter().map(|&(_, count)| count).max().unwrap();
        assert_eq!(peak, 2);
    }

    #[test]
    fn count_returns_to_zero_and_times_ascend() {
        let mut rng = StdRng::seed_from_u64(13);
        let population: Vec<Person> = (0..8)
            .map(|i| infected_person(&format!("n{i}"), f64::from(i) * 30.0, &mut rng))
            .collect();
        let points: Vec<(f64, i64)> = symptomatic_history(&population).collect();

        assert_eq!(points.len(), 16);
        for pair in points.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
        for &(_, count) in &points {
            assert!(count >= 0);
        }
        assert_eq!(points.last().unwrap().1, 0);
    }

    #[test]
    fn sweep_is_exact_size() {
        let mut rng = StdRng::seed_from_u64(14);
        let population = vec![
            infected_person("n0", 0.0, &mut rng),
            infected_person("n1", 5.0, &mut rng),
        ];
        let mut sweep = symptomatic_history(&population);
        assert_eq!(sweep.len(), 4);
        sweep.next();
        assert_eq!(sweep.len(), 3);
    }
}
