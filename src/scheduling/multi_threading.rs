//! Multi-threaded back-end of the analysis

use crate::{
    histos::Histograms,
    random::RandomGenerator,
    scheduling::{batch_sizes, next_batch_rng},
};

use log::debug;

use std::sync::Mutex;

/// Process events in multi-threaded mode
///
/// Takes the random number generator state as input, and hands each batch
/// the same random stream as the sequential back-end would, so that both
/// produce identical histograms.
///
pub fn run_analysis_impl(
    num_events: usize,
    mut rng: RandomGenerator,
    process_events: impl Send + Sync + Fn(usize, &mut RandomGenerator) -> Histograms,
) -> Histograms {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must process at least one event");

    // We know in advance how many batches of event we will process
    let batches = batch_sizes(num_events).collect::<Vec<_>>();
    let accumulator = ReproducibleAccumulator::new(batches.len());

    // This function is a synchronization scope: it will only return
    // once all inner tasks have been executed
    rayon::scope(|scope| {
        for (batch_id, &batch_size) in batches.iter().enumerate() {
            // Spawn a task which is responsible for processing the batch
            let mut task_rng = next_batch_rng(&mut rng);
            let accumulator_ref = &accumulator;
            let process_events_ref = &process_events;
            scope.spawn(move |_| {
                let result = process_events_ref(batch_size, &mut task_rng);
                debug!("Processed batch {} ({} events)", batch_id, batch_size);
                accumulator_ref.set_task_result(batch_id, result);
            });
        }
    });

    // Extract the results from the accumulator
    accumulator.get_merged_result()
}

/// Reproducibility-optimized results accumulation mechanism
struct ReproducibleAccumulator {
    /// Storage for the intermediary histograms of parallel tasks
    results: Box<[Mutex<Option<Histograms>>]>,
}
//
impl ReproducibleAccumulator {
    /// Set up results storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        assert!(num_tasks > 0, "There should be at least one task");
        Self {
            results: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Integrate the results of the n-th analysis task
    fn set_task_result(&self, task_id: usize, result: Histograms) {
        let mut lock = self.results[task_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(lock.is_none(), "Tasks should not report results twice");
        *lock = Some(result);
    }

    /// Merge the results in batch order
    fn get_merged_result(self) -> Histograms {
        // Start iterating over the task results
        let mut results_iter = self.results.into_vec().into_iter().map(|entry| {
            entry
                .into_inner()
                .expect("Mutex data should be valid")
                .expect("Result should be ready")
        });

        // Initialize results storage with the result of the first task
        let first_result = results_iter
            .next()
            .expect("There should be at least one task");

        // Merge the results of the other tasks
        results_iter.fold(first_result, |mut r1, r2| {
            r1.merge(r2);
            r1
        })
    }
}
