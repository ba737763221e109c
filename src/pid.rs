//! Joint pion identification of a set of tracks

use crate::{numeric::Float, track::HasPid};

/// Pion identification cut on the TPC response of a set of tracks
///
/// The n-sigma distances of all tracks are combined into a single radius in
/// n-sigma space, so the acceptance region is a hypersphere rather than a
/// hypercube. Tracks which each pass the per-track value may still fail
/// together, and a track beyond the radius is never rescued by clean partners.
///
#[derive(Clone, Debug, PartialEq)]
pub struct PionPid {
    /// Per-track n-sigma value, i.e. the radius of the acceptance region
    pub n_sigma_cut: Float,
}
//
impl PionPid {
    /// Setup the pion identification cut
    pub fn new(n_sigma_cut: Float) -> Self {
        Self { n_sigma_cut }
    }

    /// Squared n-sigma radius of a set of tracks
    pub fn radius2<'a, T: HasPid + 'a>(tracks: impl IntoIterator<Item = &'a T>) -> Float {
        tracks
            .into_iter()
            .map(|track| track.tpc_n_sigma_pi().powi(2))
            .sum()
    }

    /// Decide whether a set of tracks is jointly compatible with pions
    pub fn accept<'a, T: HasPid + 'a>(&self, tracks: impl IntoIterator<Item = &'a T>) -> bool {
        Self::radius2(tracks) < self.n_sigma_cut.powi(2)
    }
}
