//! Reconstructed tracks, and the capabilities that track selection relies on
//!
//! The selection logic never names a concrete track type. It asks for the
//! capabilities it needs (kinematics, PID, impact parameters...) so that any
//! track representation exposing those fields can flow through the analysis.

use crate::{
    momentum::{self, Momentum, PION_MASS},
    numeric::Float,
};
use prefix_num_ops::real::*;

/// Momentum and charge of a track
pub trait HasKinematics {
    /// Momentum along X (GeV/c)
    fn px(&self) -> Float;

    /// Momentum along Y (GeV/c)
    fn py(&self) -> Float;

    /// Momentum along Z (GeV/c)
    fn pz(&self) -> Float;

    /// Charge sign (+1 or -1)
    fn sign(&self) -> i32;

    /// Transverse momentum
    fn pt(&self) -> Float {
        sqrt(self.px() * self.px() + self.py() * self.py())
    }

    /// Pseudorapidity, computed from the full 3-momentum
    fn eta(&self) -> Float {
        momentum::pseudorapidity(self.px(), self.py(), self.pz())
    }

    /// 4-momentum under the charged pion mass hypothesis
    fn pion_momentum(&self) -> Momentum {
        momentum::from_p_mass(self.px(), self.py(), self.pz(), PION_MASS)
    }
}

/// Particle identification response
pub trait HasPid {
    /// TPC n-sigma distance to the pion hypothesis
    fn tpc_n_sigma_pi(&self) -> Float;

    /// TPC n-sigma distance to the electron hypothesis
    fn tpc_n_sigma_el(&self) -> Float;

    /// TOF n-sigma distance to the pion hypothesis
    fn tof_n_sigma_pi(&self) -> Float;

    /// TPC specific energy loss signal
    fn tpc_signal(&self) -> Float;
}

/// Distances of closest approach to the primary vertex
pub trait HasImpactParameters {
    /// Transverse DCA (cm)
    fn dca_xy(&self) -> Float;

    /// Longitudinal DCA (cm)
    fn dca_z(&self) -> Float;
}

/// Which detectors contributed to the track
pub trait HasDetectorFlags {
    /// Truth that the track was used to fit the primary vertex
    fn is_pv_contributor(&self) -> bool;

    /// Truth that the track has inner tracking system hits
    fn has_its(&self) -> bool;

    /// Truth that the track has time projection chamber hits
    fn has_tpc(&self) -> bool;

    /// Truth that the track has a time-of-flight signal
    fn has_tof(&self) -> bool;
}

/// Fit quality figures, only used for QA
pub trait HasTrackQuality {
    /// Number of ITS clusters
    fn its_n_cls(&self) -> u8;

    /// ITS fit χ² per cluster
    fn its_chi2_n_cl(&self) -> Float;

    /// TPC fit χ² per cluster
    fn tpc_chi2_n_cl(&self) -> Float;

    /// Number of findable TPC clusters
    fn tpc_n_cls_findable(&self) -> u8;

    /// Number of crossed TPC pad rows
    fn tpc_n_cls_crossed_rows(&self) -> u8;
}

/// Everything the ρ⁰ analysis needs to know about a track
pub trait TrackLike:
    HasKinematics + HasPid + HasImpactParameters + HasDetectorFlags + HasTrackQuality
{
}
//
impl<T> TrackLike for T where
    T: HasKinematics + HasPid + HasImpactParameters + HasDetectorFlags + HasTrackQuality
{
}

/// Flat, owned track record
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    /// Momentum along x (GeV/c)
    pub px: Float,

    /// Momentum along y (GeV/c)
    pub py: Float,

    /// Momentum along z (GeV/c)
    pub pz: Float,

    /// Electric charge sign (+1 or -1)
    pub sign: i32,

    /// TPC n-sigma under the pion hypothesis
    pub tpc_n_sigma_pi: Float,

    /// TPC n-sigma under the electron hypothesis
    pub tpc_n_sigma_el: Float,

    /// TOF n-sigma under the pion hypothesis
    pub tof_n_sigma_pi: Float,

    /// TPC specific energy loss signal
    pub tpc_signal: Float,

    /// Transverse distance of closest approach to the vertex (cm)
    pub dca_xy: Float,

    /// Longitudinal distance of closest approach to the vertex (cm)
    pub dca_z: Float,

    /// Whether the track was used to fit the primary vertex
    pub is_pv_contributor: bool,

    /// Track has ITS hits
    pub has_its: bool,

    /// Track has TPC hits
    pub has_tpc: bool,

    /// Track has a TOF match
    pub has_tof: bool,

    /// Number of ITS clusters
    pub its_n_cls: u8,

    /// ITS fit χ² per cluster
    pub its_chi2_n_cl: Float,

    /// TPC fit χ² per cluster
    pub tpc_chi2_n_cl: Float,

    /// Number of findable TPC clusters
    pub tpc_n_cls_findable: u8,

    /// Number of crossed TPC pad rows
    pub tpc_n_cls_crossed_rows: u8,
}
//
impl Track {
    /// Well-reconstructed, pion-like track with the given momentum and charge
    ///
    /// Detector flags, impact parameters and PID response are set to values
    /// that pass every track cut. Callers tweak individual fields from there.
    ///
    #[cfg(test)]
    pub fn good_pion(px: Float, py: Float, pz: Float, sign: i32) -> Self {
        Self {
            px,
            py,
            pz,
            sign,
            tpc_n_sigma_pi: 0.,
            tpc_n_sigma_el: 5.,
            tof_n_sigma_pi: 0.,
            tpc_signal: 50.,
            dca_xy: 0.,
            dca_z: 0.,
            is_pv_contributor: true,
            has_its: true,
            has_tpc: true,
            has_tof: true,
            its_n_cls: 7,
            its_chi2_n_cl: 1.,
            tpc_chi2_n_cl: 1.,
            tpc_n_cls_findable: 150,
            tpc_n_cls_crossed_rows: 140,
        }
    }
}

impl HasKinematics for Track {
    fn px(&self) -> Float {
        self.px
    }
    fn py(&self) -> Float {
        self.py
    }
    fn pz(&self) -> Float {
        self.pz
    }
    fn sign(&self) -> i32 {
        self.sign
    }
}

impl HasPid for Track {
    fn tpc_n_sigma_pi(&self) -> Float {
        self.tpc_n_sigma_pi
    }
    fn tpc_n_sigma_el(&self) -> Float {
        self.tpc_n_sigma_el
    }
    fn tof_n_sigma_pi(&self) -> Float {
        self.tof_n_sigma_pi
    }
    fn tpc_signal(&self) -> Float {
        self.tpc_signal
    }
}

impl HasImpactParameters for Track {
    fn dca_xy(&self) -> Float {
        self.dca_xy
    }
    fn dca_z(&self) -> Float {
        self.dca_z
    }
}

impl HasDetectorFlags for Track {
    fn is_pv_contributor(&self) -> bool {
        self.is_pv_contributor
    }
    fn has_its(&self) -> bool {
        self.has_its
    }
    fn has_tpc(&self) -> bool {
        self.has_tpc
    }
    fn has_tof(&self) -> bool {
        self.has_tof
    }
}

impl HasTrackQuality for Track {
    fn its_n_cls(&self) -> u8 {
        self.its_n_cls
    }
    fn its_chi2_n_cl(&self) -> Float {
        self.its_chi2_n_cl
    }
    fn tpc_chi2_n_cl(&self) -> Float {
        self.tpc_chi2_n_cl
    }
    fn tpc_n_cls_findable(&self) -> u8 {
        self.tpc_n_cls_findable
    }
    fn tpc_n_cls_crossed_rows(&self) -> u8 {
        self.tpc_n_cls_crossed_rows
    }
}
