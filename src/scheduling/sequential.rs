//! Sequential back-end of the analysis

use crate::{
    histos::Histograms,
    random::RandomGenerator,
    scheduling::{batch_sizes, next_batch_rng},
};

use log::debug;

/// Process events in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs.
///
pub fn run_analysis_impl(
    num_events: usize,
    mut rng: RandomGenerator,
    process_events: impl Send + Sync + Fn(usize, &mut RandomGenerator) -> Histograms,
) -> Histograms {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must process at least one event");

    // Process the batches in order, merging as we go
    batch_sizes(num_events)
        .enumerate()
        .map(|(batch_id, batch_size)| {
            let mut batch_rng = next_batch_rng(&mut rng);
            let result = process_events(batch_size, &mut batch_rng);
            debug!("Processed batch {} ({} events)", batch_id, batch_size);
            result
        })
        .reduce(|mut acc, result| {
            acc.merge(result);
            acc
        })
        .unwrap_or_default()
}
