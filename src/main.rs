//! upc_rho: ρ⁰ photoproduction analysis for ultra-peripheral collisions
//!
//!
//! # Introduction (for the physicist)
//!
//! In ultra-peripheral collisions (UPCs), two lead nuclei pass each other at
//! impact parameters larger than the sum of their radii. A photon from one
//! nucleus fluctuates into a ρ⁰ which scatters off the other nucleus, then
//! decays into a π⁺π⁻ pair. The events are extremely clean: two tracks, a
//! small pair transverse momentum, and a pair mass around 775 MeV/c².
//!
//! Either nucleus may additionally emit forward neutrons. Tagging this with
//! the zero-degree calorimeters (0n0n, Xn0n, 0nXn, XnXn) selects different
//! impact parameter ranges. The azimuthal decay angle probes the linear
//! polarization of the photon.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program follows a simple dataflow:
//!
//! * read in the configuration and book the histograms
//! * loop over (randomly generated) events, in batches,
//!     * applying event cuts and tagging neutron emission,
//!     * applying track cuts and joint pion identification,
//!     * reconstructing the multi-pion system and its decay angle,
//!     * filling histograms all along the way
//! * then merge the histograms of all batches and display / store them.
//!
//! Batches own their random stream and their histograms, which makes
//! sequential and multi-threaded runs produce identical output.

#![warn(missing_docs)]

mod analysis;
mod config;
mod decay;
mod evcut;
mod event;
mod evgen;
mod histos;
mod momentum;
mod numeric;
mod output;
mod pid;
mod random;
mod scheduling;
mod system;
mod track;
mod trkcut;
mod zdc;

use crate::{
    analysis::{book_histograms, Outcome, RhoAnalysis},
    config::Configuration,
    evgen::EventGenerator,
    random::RandomGenerator,
};

use env_logger::Env;
use eyre::WrapErr;
use log::{debug, info};

use std::{env, time::Instant};

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG: &str = "upcrho.cfg";

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // Log at info level unless told otherwise via RUST_LOG
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // ### CONFIGURATION READOUT ###

    let config_file = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_owned());
    info!("Loading configuration from {}", config_file);
    let cfg = Configuration::load(&config_file).wrap_err("Failed to load the configuration")?;

    // ### ANALYSIS INITIALIZATION ###

    // Start the clock after configuration I/O to avoid IO-induced fluctuations
    let saved_time = Instant::now();

    let analysis = RhoAnalysis::new(&cfg);
    let evgen = EventGenerator::new()?;
    let rng = RandomGenerator::new(cfg.seed);
    if cfg.seed == 0 {
        info!("Seeding the random number generator from the clock");
    }

    // ### ANALYSIS EXECUTION ###

    // This kernel processes a number of events, given an initial random number
    // generator state, and returns the histograms that were filled
    let process_events = |num_events: usize, rng: &mut RandomGenerator| {
        let mut histos = book_histograms();
        let (mut num_rejected, mut num_selected) = (0usize, 0usize);
        for _ in 0..num_events {
            let event = evgen.generate(rng);
            match analysis.process(&event.collision, &event.tracks, rng, &mut histos) {
                Outcome::EventRejected => num_rejected += 1,
                Outcome::PionPair(pair) if pair.passes_system_cut => num_selected += 1,
                _ => {}
            }
        }
        debug!(
            "Batch of {} events: {} rejected, {} selected pion pairs",
            num_events, num_rejected, num_selected
        );
        histos
    };

    let histos = scheduling::run_analysis(cfg.num_events, rng, process_events);

    // ### RESULTS DISPLAY AND STORAGE ###

    let elapsed_time = saved_time.elapsed();
    info!("Processed {} events in {:?}", cfg.num_events, elapsed_time);
    output::dump_results(&cfg, &histos, elapsed_time).wrap_err("Failed to output the results")?;

    Ok(())
}
