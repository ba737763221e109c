//! Mechanism for loading and sharing the analysis configuration

use crate::{
    evcut::EventCut, numeric::Float, pid::PionPid, system::SystemCut, trkcut::TrackCut,
    zdc::ZdcClassifier, Result,
};

use eyre::{ensure, eyre, WrapErr};
use log::info;

use std::{fs, path::Path, str::FromStr};

/// Analysis configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Number of events to be processed
    pub num_events: usize,

    /// Seed of the random number generator (0 = seed from the clock)
    pub seed: u64,

    /// Cuts on the primary vertex and gap side
    pub event_cut: EventCut,

    /// Neutron emission tagging thresholds
    pub zdc: ZdcClassifier,

    /// Track quality cuts
    pub track_cut: TrackCut,

    /// Joint pion identification cut
    pub pid: PionPid,

    /// Cuts on the reconstructed two-pion system
    pub system_cut: SystemCut,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and log it
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read {}", file_name.display()))?;
        let config = config_str.parse::<Self>()?;
        config.print();
        Ok(config)
    }

    /// Log the configuration
    pub fn print(&self) {
        info!("num_events       : {}", self.num_events);
        info!("seed             : {}", self.seed);
        info!("pos_z_max        : {}", self.event_cut.pos_z_max);
        match self.event_cut.gap_side {
            Some(side) => info!("gap_side         : {}", side),
            None => info!("gap_side         : any"),
        }
        info!("zn_energy_cut    : {}", self.zdc.energy_threshold);
        info!("zn_time_cut      : {}", self.zdc.time_window);
        info!("require_tof      : {}", self.track_cut.require_tof);
        info!("dca_z_max        : {}", self.track_cut.dca_z_max);
        info!("n_sigma_pi_cut   : {}", self.pid.n_sigma_cut);
        info!("mass_min         : {}", self.system_cut.mass_min);
        info!("mass_max         : {}", self.system_cut.mass_max);
        info!("pt_max           : {}", self.system_cut.pt_max);
        info!("y_max            : {}", self.system_cut.y_max);
    }
}

impl FromStr for Configuration {
    type Err = eyre::Report;

    /// Decode and check a configuration
    ///
    /// Configuration items are the first non-whitespace chunk of text on each
    /// line, in a fixed order. The rest of a line is free-form commentary.
    /// Blank lines and lines starting with '#' are ignored.
    ///
    fn from_str(config_str: &str) -> Result<Self> {
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|item| !item.starts_with('#'));

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        // Decode the configuration items into concrete values
        let num_events = next_item("num_events")?.parse::<usize>()?;
        let seed = next_item("seed")?.parse::<u64>()?;
        let pos_z_max = next_item("pos_z_max")?.parse::<Float>()?;
        let specify_gap_side = next_item("specify_gap_side")?.parse_bool()?;
        let gap_side = next_item("gap_side")?.parse::<i32>()?;
        let config = Configuration {
            num_events,
            seed,
            event_cut: EventCut::new(pos_z_max, specify_gap_side.then_some(gap_side)),
            zdc: ZdcClassifier::new(
                next_item("zn_energy_cut")?.parse::<Float>()?,
                next_item("zn_time_cut")?.parse::<Float>()?,
            ),
            track_cut: TrackCut::new(
                next_item("require_tof")?.parse_bool()?,
                next_item("dca_z_max")?.parse::<Float>()?,
            ),
            pid: PionPid::new(next_item("n_sigma_pi_cut")?.parse::<Float>()?),
            system_cut: SystemCut {
                mass_min: next_item("mass_min")?.parse::<Float>()?,
                mass_max: next_item("mass_max")?.parse::<Float>()?,
                pt_max: next_item("pt_max")?.parse::<Float>()?,
                y_max: next_item("y_max")?.parse::<Float>()?,
            },
        };

        // A sensible run must process at least one event
        ensure!(config.num_events > 0, "Please process at least one event");

        // Cuts must describe non-empty acceptance regions
        ensure!(
            config.event_cut.pos_z_max > 0.,
            "pos_z_max must be positive"
        );
        ensure!(config.zdc.time_window > 0., "zn_time_cut must be positive");
        ensure!(
            config.track_cut.dca_z_max > 0.,
            "dca_z_max must be positive"
        );
        ensure!(
            config.pid.n_sigma_cut > 0.,
            "n_sigma_pi_cut must be positive"
        );
        let sys = &config.system_cut;
        ensure!(
            sys.mass_min < sys.mass_max,
            "mass_min ({}) must be below mass_max ({})",
            sys.mass_min,
            sys.mass_max
        );
        ensure!(sys.pt_max > 0., "pt_max must be positive");
        ensure!(sys.y_max > 0., "y_max must be positive");

        Ok(config)
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse a boolean, also accepting the usual on/off spellings
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            "yes" | "on" | "1" => Ok(true),
            "no" | "off" | "0" => Ok(false),
            _ => self.parse::<bool>(),
        }
    }
}
