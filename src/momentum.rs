//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::{floats::consts::PI, Float};
use nalgebra::SVector;
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Charged pion rest mass (GeV/c²)
///
/// Every selected track is reconstructed under this mass hypothesis, since
/// particle identification only tells us how pion-like a track is.
///
pub const PION_MASS: Float = 0.139_570_39;

/// Build a 4-momentum from a 3-momentum and a rest mass
pub fn from_p_mass(px: Float, py: Float, pz: Float, mass: Float) -> Momentum {
    let e = sqrt(px * px + py * py + pz * pz + mass * mass);
    Momentum::new(px, py, pz, e)
}

/// Pseudorapidity of a 3-momentum
///
/// Momenta along the beam axis go to ±infinity, a null momentum has η = 0.
///
pub fn pseudorapidity(px: Float, py: Float, pz: Float) -> Float {
    let p = sqrt(px * px + py * py + pz * pz);
    if p == 0. {
        return 0.;
    }
    0.5 * ln((p + pz) / (p - pz))
}

/// Wrap an angle difference into (-π, π]
///
/// A single wrap is enough as long as both operands are azimuthal angles
/// computed by atan2, which lie in [-π, π].
///
pub fn wrap_phi(d_phi: Float) -> Float {
    if d_phi > PI {
        d_phi - 2. * PI
    } else if d_phi <= -PI {
        d_phi + 2. * PI
    } else {
        d_phi
    }
}

/// Kinematic quantities that can be derived from a 4-momentum
pub trait Kinematics {
    /// Transverse momentum
    fn pt(&self) -> Float;

    /// Azimuthal angle in [-π, π]
    fn phi(&self) -> Float;

    /// Pseudorapidity
    fn eta(&self) -> Float;

    /// Rapidity along the beam axis
    fn rapidity(&self) -> Float;

    /// Invariant mass, negative for space-like vectors
    fn mass(&self) -> Float;
}

impl Kinematics for Momentum {
    fn pt(&self) -> Float {
        sqrt(self[X] * self[X] + self[Y] * self[Y])
    }

    fn phi(&self) -> Float {
        self[Y].atan2(self[X])
    }

    fn eta(&self) -> Float {
        pseudorapidity(self[X], self[Y], self[Z])
    }

    fn rapidity(&self) -> Float {
        0.5 * ln((self[E] + self[Z]) / (self[E] - self[Z]))
    }

    fn mass(&self) -> Float {
        let m2 = self[E] * self[E] - self.xyz().norm_squared();
        if m2 < 0. {
            -sqrt(-m2)
        } else {
            sqrt(m2)
        }
    }
}
