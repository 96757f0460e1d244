//! Per-person disease state: infection status plus the sampled latent
//! durations that govern when an infected person becomes infectious,
//! symptomatic, and healthy again.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Parameters (in hours) of the normal distributions that per-person latent
/// durations are drawn from.
///
/// These are passed explicitly into [`Person::new`] so that different runs or
/// tests can vary them without touching shared state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiseaseParams {
    /// Time after infection before a person can transmit.
    pub dormancy_mean: f64,
    pub dormancy_sd: f64,
    /// Time after infection until symptoms manifest.
    pub onset_mean: f64,
    pub onset_sd: f64,
    /// Time symptoms last for.
    pub symptoms_mean: f64,
    pub symptoms_sd: f64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        DiseaseParams {
            dormancy_mean: 24.0,
            dormancy_sd: 2.0,
            onset_mean: 120.0,
            onset_sd: 8.0,
            symptoms_mean: 168.0,
            symptoms_sd: 12.0,
        }
    }
}

/// One individual in the contact network.
///
/// The four latent durations are sampled once at construction and never
/// change for the lifetime of the `Person`, so an individual can be run
/// through several propagations (after [`Person::reset`]) with identical
/// disease dynamics but a different network around them.
#[derive(Clone, Debug)]
pub struct Person {
    name: String,
    infected: bool,
    infection_time: Option<f64>,
    dormancy: f64,
    time_to_symptoms: f64,
    symptoms_duration: f64,
    infectious_window: f64,
}

impl Person {
    /// Creates a person, sampling their latent durations from `params`.
    ///
    /// A person created with `infected = true` is a seed case; their
    /// infection time is recorded when the propagation engine processes them
    /// at the start of a run.
    pub fn new<R: Rng>(
        name: &str,
        infected: bool,
        params: &DiseaseParams,
        rng: &mut R,
    ) -> Person {
        let dormancy = Normal::new(params.dormancy_mean, params.dormancy_sd)
            .unwrap()
            .sample(rng);
        let time_to_symptoms = Normal::new(params.onset_mean, params.onset_sd)
            .unwrap()
            .sample(rng);
        let symptoms_duration = Normal::new(params.symptoms_mean, params.symptoms_sd)
            .unwrap()
            .sample(rng);
        // Infectious from the end of dormancy until symptoms clear.
        let infectious_window = (time_to_symptoms + symptoms_duration) - dormancy;

        Person {
            name: name.to_string(),
            infected,
            infection_time: None,
            dormancy,
            time_to_symptoms,
            symptoms_duration,
            infectious_window,
        }
    }

    /// Marks this person infected at absolute time `time`.
    ///
    /// # Panics
    ///
    /// Panics if an infection time was already recorded. The queue cleanup in
    /// the propagation engine guarantees each person is resolved by exactly
    /// one attempt, so a second call is a scheduling defect.
    pub fn set_infected(&mut self, time: f64) {
        assert!(
            self.infection_time.is_none(),
            "person {} is already infected",
            self.name
        );
        self.infected = true;
        self.infection_time = Some(time);
    }

    /// Clears the infection flag and time, preserving the sampled durations.
    ///
    /// Used when the same population is run through a second propagation so
    /// the individual disease dynamics stay the same while the network around
    /// them changes.
    pub fn reset(&mut self) {
        self.infected = false;
        self.infection_time = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    pub fn infection_time(&self) -> Option<f64> {
        self.infection_time
    }

    pub fn dormancy(&self) -> f64 {
        self.dormancy
    }

    pub fn time_to_symptoms(&self) -> f64 {
        self.time_to_symptoms
    }

    pub fn symptoms_duration(&self) -> f64 {
        self.symptoms_duration
    }

    /// How long this person can transmit to neighbors once infected.
    pub fn infectious_window(&self) -> f64 {
        self.infectious_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_person(infected: bool) -> Person {
        let mut rng = StdRng::seed_from_u64(42);
        Person::new("n0", infected, &DiseaseParams::default(), &mut rng)
    }

    #[test]
    fn new_person_is_not_yet_timestamped() {
        let person = test_person(false);
        assert!(!person.is_infected());
        assert!(person.infection_time().is_none());

        let seed = test_person(true);
        assert!(seed.is_infected());
        assert!(seed.infection_time().is_none());
    }

    #[test]
    fn infectious_window_is_derived_from_sampled_durations() {
        let person = test_person(false);
        assert_approx_eq!(
            person.infectious_window(),
            person.time_to_symptoms() + person.symptoms_duration() - person.dormancy()
        );
    }

    #[test]
    fn sampled_durations_are_plausible() {
        // With sd an order of magnitude below the mean, samples stay near it.
        let params = DiseaseParams::default();
        let mut rng = StdRng::seed_from_u64(88);
        for i in 0..100 {
            let person = Person::new(&format!("n{i}"), false, &params, &mut rng);
            assert!(person.dormancy() > 0.0 && person.dormancy() < 48.0);
            assert!(person.time_to_symptoms() > 60.0 && person.time_to_symptoms() < 180.0);
            assert!(person.symptoms_duration() > 100.0 && person.symptoms_duration() < 240.0);
            assert!(person.infectious_window() > 0.0);
        }
    }

    #[test]
    fn set_infected_records_time() {
        let mut person = test_person(false);
        person.set_infected(12.5);
        assert!(person.is_infected());
        assert_eq!(person.infection_time(), Some(12.5));
    }

    #[test]
    #[should_panic(expected = "already infected")]
    fn set_infected_twice_panics() {
        let mut person = test_person(false);
        person.set_infected(1.0);
        person.set_infected(2.0);
    }

    #[test]
    fn reset_preserves_durations() {
        let mut person = test_person(false);
        let dormancy = person.dormancy();
        let onset = person.time_to_symptoms();
        let symptoms = person.symptoms_duration();

        person.set_infected(3.0);
        person.reset();

        assert!(!person.is_infected());
        assert!(person.infection_time().is_none());
        assert_eq!(person.dormancy(), dormancy);
        assert_eq!(person.time_to_symptoms(), onset);
        assert_eq!(person.symptoms_duration(), symptoms);

        // A reset person can be infected again.
        person.set_infected(7.0);
        assert_eq!(person.infection_time(), Some(7.0));
    }
}
