//! This module takes care of scheduling the analysis work, encapsulating use
//! of multiple threads and anything else that will come in the future

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::{histos::Histograms, random::RandomGenerator};

/// Size of the processed event batches
///
/// Events are grouped in batches of a certain size, each with its own random
/// stream and histogram set, in order to achieve perfect reproducibility
/// between sequential and parallel runs of the analysis.
///
const EVENT_BATCH_SIZE: usize = 10_000;

/// Run the analysis in the manner that was configured at build time.
///
/// Takes as parameters the total number of events to be processed, the
/// random number generator that every batch stream derives from, and an
/// analysis kernel that processes a certain number of events given an initial
/// random number generator state.
///
/// Returns the histograms of all batches, merged in batch order.
///
pub fn run_analysis(
    num_events: usize,
    rng: RandomGenerator,
    process_events: impl Send + Sync + Fn(usize, &mut RandomGenerator) -> Histograms,
) -> Histograms {
    // Check that the user is being reasonable (should have already been checked
    // at configuration time, but bugs can happen...)
    assert!(num_events > 0, "Must process at least one event");

    // Process and merge the event batches...
    let histos = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_analysis_impl(num_events, rng, process_events)
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_analysis_impl(num_events, rng, process_events)
        }
    };
    histos
}

/// Sizes of the successive event batches
fn batch_sizes(num_events: usize) -> impl Iterator<Item = usize> {
    let num_batches = (num_events + EVENT_BATCH_SIZE - 1) / EVENT_BATCH_SIZE;
    (0..num_batches).map(move |batch| {
        let first_event = batch * EVENT_BATCH_SIZE;
        EVENT_BATCH_SIZE.min(num_events - first_event)
    })
}

/// Random stream of the next batch
///
/// The batch gets the current state of the parent generator, which then jumps
/// far away so that no two batches share random numbers.
///
fn next_batch_rng(rng: &mut RandomGenerator) -> RandomGenerator {
    let batch_rng = rng.clone();
    rng.jump();
    batch_rng
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histos::{Axis, HistogramSink};
    use rand::Rng;

    #[test]
    fn batching() {
        assert_eq!(batch_sizes(1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(
            batch_sizes(EVENT_BATCH_SIZE).collect::<Vec<_>>(),
            vec![EVENT_BATCH_SIZE]
        );
        assert_eq!(
            batch_sizes(2 * EVENT_BATCH_SIZE + 3).collect::<Vec<_>>(),
            vec![EVENT_BATCH_SIZE, EVENT_BATCH_SIZE, 3]
        );
    }

    fn uniform_kernel(num_events: usize, rng: &mut RandomGenerator) -> Histograms {
        let mut histos = Histograms::new();
        histos.add("h", ";x;counts", vec![Axis::uniform(10, 0., 1.)]);
        for _ in 0..num_events {
            histos.fill("h", rng.gen());
        }
        histos
    }

    #[test]
    fn every_event_is_processed() {
        let num_events = EVENT_BATCH_SIZE + 17;
        let histos = run_analysis(num_events, RandomGenerator::seeded(4), uniform_kernel);
        assert_eq!(histos.get("h").unwrap().entries(), num_events);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let num_events = 2 * EVENT_BATCH_SIZE + 5;
        let run = || run_analysis(num_events, RandomGenerator::seeded(9), uniform_kernel);
        assert_eq!(run(), run());
    }
}
