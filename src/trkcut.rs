//! Mechanism to apply quality and geometry cuts to reconstructed tracks
//!
//! PID is deliberately not part of this: it is applied jointly to the set of
//! surviving tracks (see the pid module).

use crate::{
    histos::HistogramSink,
    numeric::Float,
    track::{HasDetectorFlags, HasImpactParameters, HasKinematics},
};

/// Name of the track selection counter histogram
pub const SELECTION_COUNTER: &str = "QC/tracks/hSelectionCounter";

/// Pseudorapidity acceptance recommended for central barrel tracks
pub const ETA_MAX: Float = 0.9;

/// Stages of the track selection, in evaluation order
///
/// The discriminant is the selection counter bin attributed to the stage.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionStage {
    AllTracks = 0,
    PvContributor = 1,
    ItsTpcHit = 2,
    TofRequirement = 3,
    DcaCut = 4,
    EtaCut = 5,
    PionPid = 6,
}
//
impl SelectionStage {
    /// All stages, in counter bin order
    pub const ALL: [SelectionStage; 7] = [
        Self::AllTracks,
        Self::PvContributor,
        Self::ItsTpcHit,
        Self::TofRequirement,
        Self::DcaCut,
        Self::EtaCut,
        Self::PionPid,
    ];

    /// Coordinate at which this stage is filled into the counter
    pub fn bin(self) -> Float {
        self as usize as Float
    }

    /// Human-readable bin label
    pub fn label(self) -> &'static str {
        match self {
            Self::AllTracks => "all tracks",
            Self::PvContributor => "PV contributor",
            Self::ItsTpcHit => "ITS + TPC hit",
            Self::TofRequirement => "TOF requirement",
            Self::DcaCut => "DCA cut",
            Self::EtaCut => "#eta cut",
            Self::PionPid => "2D TPC n#sigma_{#pi} cut",
        }
    }
}

/// Maximal transverse DCA for a given transverse momentum (Run 2 parametrization)
pub fn dca_xy_max(pt: Float) -> Float {
    0.0182 + 0.0350 / pt.powf(1.01)
}

/// Cuts on reconstructed tracks
#[derive(Clone, Debug, PartialEq)]
pub struct TrackCut {
    /// Truth that a TOF signal is required
    pub require_tof: bool,

    /// Cut on maximum |DCA_z| (cm)
    pub dca_z_max: Float,
}
//
impl TrackCut {
    /// Setup the cuts on reconstructed tracks
    pub fn new(require_tof: bool, dca_z_max: Float) -> Self {
        Self {
            require_tof,
            dca_z_max,
        }
    }

    /// Decide whether a track passes the cuts
    ///
    /// Every stage which the track survives is reported to the selection
    /// counter, so the stage order below defines which counter bin a rejected
    /// track stops at. It must not be changed lightly.
    ///
    pub fn keep<T>(&self, track: &T, counter: &mut impl HistogramSink) -> bool
    where
        T: HasKinematics + HasImpactParameters + HasDetectorFlags,
    {
        let mut passed = |stage: SelectionStage| counter.fill(SELECTION_COUNTER, stage.bin());

        if !track.is_pv_contributor() {
            return false;
        }
        passed(SelectionStage::PvContributor);

        if !track.has_its() || !track.has_tpc() {
            return false;
        }
        passed(SelectionStage::ItsTpcHit);

        if self.require_tof && !track.has_tof() {
            return false;
        }
        passed(SelectionStage::TofRequirement);

        // NaN offsets never pass
        let dca_z_ok = track.dca_z().abs() <= self.dca_z_max;
        let dca_xy_ok = track.dca_xy().abs() <= dca_xy_max(track.pt());
        if !(dca_z_ok && dca_xy_ok) {
            return false;
        }
        passed(SelectionStage::DcaCut);

        if !(track.eta().abs() <= ETA_MAX) {
            return false;
        }
        passed(SelectionStage::EtaCut);

        true
    }
}
