//! Reconstruction of the multi-pion system from the selected tracks

use crate::{
    momentum::{Kinematics, Momentum},
    numeric::Float,
    track::HasKinematics,
};

/// Composite system, i.e. the vector sum of its constituents' 4-momenta
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct System {
    momentum: Momentum,
}
//
impl System {
    /// Sum up the constituents' 4-momenta
    pub fn reconstruct(constituents: &[Momentum]) -> Self {
        let momentum = constituents
            .iter()
            .fold(Momentum::zeros(), |sum, p| sum + p);
        Self { momentum }
    }

    /// Invariant mass of the sum (not the sum of constituent masses)
    pub fn mass(&self) -> Float {
        self.momentum.mass()
    }

    /// Transverse momentum
    pub fn pt(&self) -> Float {
        self.momentum.pt()
    }

    /// Rapidity
    pub fn rapidity(&self) -> Float {
        self.momentum.rapidity()
    }
}

/// Net charge of a set of tracks
pub fn total_charge<'a, T: HasKinematics + 'a>(tracks: impl IntoIterator<Item = &'a T>) -> i32 {
    tracks.into_iter().map(|track| track.sign()).sum()
}

/// Cuts on the reconstructed two-pion system
#[derive(Clone, Debug, PartialEq)]
pub struct SystemCut {
    /// Cut on minimal invariant mass (GeV/c²)
    pub mass_min: Float,

    /// Cut on maximal invariant mass (GeV/c²)
    pub mass_max: Float,

    /// Cut on maximal transverse momentum (GeV/c)
    pub pt_max: Float,

    /// Cut on maximal |rapidity|
    pub y_max: Float,
}
//
impl SystemCut {
    /// Decide whether a system passes the cuts
    pub fn keep(&self, system: &System) -> bool {
        let mass = system.mass();
        (self.mass_min..=self.mass_max).contains(&mass)
            && system.pt() <= self.pt_max
            && system.rapidity().abs() <= self.y_max
    }
}
