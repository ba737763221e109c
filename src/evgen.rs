//! This module provides a toy source of reconstructed UPC events
//!
//! It stands in for the reduced-data tables that the analysis would normally
//! consume, so that the full pipeline can be exercised end to end. The event
//! mixture is qualitative: coherent ρ⁰ → π⁺π⁻ production on top of like-sign
//! and four-pion backgrounds, with detector effects that let every cut reject
//! something.

use crate::{
    event::{Collision, Event, ZdcInfo},
    momentum::{Kinematics, Momentum, E, PION_MASS, X, Y, Z},
    numeric::{floats::consts::PI, Float},
    random::RandomGenerator,
    track::Track,
    Result,
};

use eyre::WrapErr;
use prefix_num_ops::real::*;
use rand::Rng;
use rand_distr::{Cauchy, Exp1, StandardNormal};

/// Pole mass of the ρ⁰ (GeV/c²)
const RHO_MASS: Float = 0.775;

/// Width of the ρ⁰ (GeV/c²)
const RHO_WIDTH: Float = 0.149;

/// Scale of the coherent transverse momentum spectrum (GeV/c)
const COHERENT_PT: Float = 0.04;

/// Generated rapidity range of the produced system
const Y_RANGE: Float = 1.0;

/// Fraction of events which contain a ρ⁰
const RHO_FRACTION: Float = 0.8;

/// Fraction of events which contain a like-sign pion pair (the rest are 4π)
const LIKE_SIGN_FRACTION: Float = 0.12;

/// Probability for each ZDC side to see forward neutrons
const NEUTRON_PROBABILITY: f64 = 0.3;

/// Probability for a ZDC hit to be out of time
const OUT_OF_TIME_PROBABILITY: f64 = 0.05;

/// Probability to add an extra secondary track to an event
const SECONDARY_PROBABILITY: f64 = 0.2;

/// Generator of UPC events
#[derive(Clone, Debug)]
pub struct EventGenerator {
    /// Relativistic line shape of the ρ⁰, before threshold effects
    rho_mass: Cauchy<Float>,
}
//
impl EventGenerator {
    // ### CONSTRUCTION ###

    /// Initialize event generation
    pub fn new() -> Result<Self> {
        let rho_mass = Cauchy::new(RHO_MASS, 0.5 * RHO_WIDTH)
            .wrap_err("Invalid ρ⁰ line shape")?;
        Ok(Self { rho_mass })
    }

    // ### EVENT GENERATION ###

    /// Generate one event
    pub fn generate(&self, rng: &mut RandomGenerator) -> Event {
        // Pick the physics process and produce its pions
        let process = rng.gen::<Float>();
        let mut pions = if process < RHO_FRACTION {
            let rho = self.generate_rho(rng);
            let (pi_plus, pi_minus) = two_body_decay(&rho, PION_MASS, rng);
            vec![(pi_plus, 1), (pi_minus, -1)]
        } else if process < RHO_FRACTION + LIKE_SIGN_FRACTION {
            let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
            (0..2)
                .map(|_| (Self::generate_free_pion(rng), sign))
                .collect::<Vec<_>>()
        } else {
            [1, -1, 1, -1]
                .iter()
                .map(|&sign| (Self::generate_free_pion(rng), sign))
                .collect::<Vec<_>>()
        };

        // Secondaries do not come from the primary vertex
        let has_secondary = rng.gen_bool(SECONDARY_PROBABILITY);
        if has_secondary {
            let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
            pions.push((Self::generate_free_pion(rng), sign));
        }

        // Apply detector response to every track
        let num_tracks = pions.len();
        let tracks = pions
            .into_iter()
            .enumerate()
            .map(|(idx, (p, sign))| {
                let secondary = has_secondary && idx == num_tracks - 1;
                Self::reconstruct_track(&p, sign, secondary, rng)
            })
            .collect::<Vec<_>>();

        // Generate the collision-level information
        let num_contrib = tracks.iter().filter(|t| t.is_pv_contributor).count() as u32;
        let gap_side = match rng.gen::<Float>() {
            r if r < 0.85 => 2,
            r if r < 0.925 => 0,
            _ => 1,
        };
        let mut zdc = ZdcInfo::empty();
        if let Some((energy, time)) = Self::generate_zn(rng) {
            zdc.energy_a = energy;
            zdc.time_a = time;
        }
        if let Some((energy, time)) = Self::generate_zn(rng) {
            zdc.energy_c = energy;
            zdc.time_c = time;
        }
        Event {
            collision: Collision {
                pos: [0.01 * normal(rng), 0.01 * normal(rng), 6. * normal(rng)],
                gap_side,
                num_contrib,
                zdc,
            },
            tracks,
        }
    }

    /// Generate a ρ⁰ 4-momentum with a Breit-Wigner mass distribution
    fn generate_rho(&self, rng: &mut RandomGenerator) -> Momentum {
        // Re-roll masses below the 2π threshold and far in the tail
        let mass = loop {
            let mass: Float = rng.sample(&self.rho_mass);
            if mass > 2. * PION_MASS + 0.01 && mass < 2.5 {
                break mass;
            }
        };

        // Coherent production yields a small, Rayleigh-like pT
        let pt = COHERENT_PT * sqrt(2. * rng.sample::<Float, _>(Exp1));
        let phi = 2. * PI * rng.gen::<Float>();
        let y = Y_RANGE * (2. * rng.gen::<Float>() - 1.);
        from_pt_y_phi_m(pt, y, phi, mass)
    }

    /// Generate a pion which does not come from a resonance
    fn generate_free_pion(rng: &mut RandomGenerator) -> Momentum {
        let pt = 0.1 + 0.4 * rng.gen::<Float>();
        let phi = 2. * PI * rng.gen::<Float>();
        let y = Y_RANGE * (2. * rng.gen::<Float>() - 1.);
        from_pt_y_phi_m(pt, y, phi, PION_MASS)
    }

    /// Generate the response of one neutron calorimeter, if it fired
    fn generate_zn(rng: &mut RandomGenerator) -> Option<(Float, Float)> {
        if !rng.gen_bool(NEUTRON_PROBABILITY) {
            return None;
        }
        let energy = 2.5 * (1. + normal(rng).abs());
        let time = if rng.gen_bool(OUT_OF_TIME_PROBABILITY) {
            5. + 3. * rng.gen::<Float>()
        } else {
            0.3 * normal(rng)
        };
        Some((energy, time))
    }

    /// Simulate the reconstruction of a charged pion
    fn reconstruct_track(
        p: &Momentum,
        sign: i32,
        secondary: bool,
        rng: &mut RandomGenerator,
    ) -> Track {
        let dca_scale = if secondary { 2. } else { 1. };
        Track {
            px: p[X],
            py: p[Y],
            pz: p[Z],
            sign,
            tpc_n_sigma_pi: normal(rng),
            tpc_n_sigma_el: 4. + 2. * normal(rng),
            tof_n_sigma_pi: normal(rng),
            tpc_signal: 50. + 4. * normal(rng) + 2. / p.pt(),
            dca_xy: 0.005 * dca_scale * normal(rng),
            dca_z: 0.1 * dca_scale * normal(rng),
            is_pv_contributor: !secondary && rng.gen_bool(0.98),
            has_its: rng.gen_bool(0.97),
            has_tpc: rng.gen_bool(0.99),
            has_tof: rng.gen_bool(0.6),
            its_n_cls: 7 - (3. * rng.gen::<Float>()) as u8,
            its_chi2_n_cl: 1. + normal(rng).abs(),
            tpc_chi2_n_cl: 1. + 0.5 * normal(rng).abs(),
            tpc_n_cls_findable: 130 + (30. * rng.gen::<Float>()) as u8,
            tpc_n_cls_crossed_rows: 120 + (30. * rng.gen::<Float>()) as u8,
        }
    }
}

/// Build a 4-momentum from transverse momentum, rapidity, azimuth and mass
pub fn from_pt_y_phi_m(pt: Float, y: Float, phi: Float, mass: Float) -> Momentum {
    let mt = sqrt(mass * mass + pt * pt);
    Momentum::new(
        pt * cos(phi),
        pt * sin(phi),
        mt * y.sinh(),
        mt * y.cosh(),
    )
}

/// Boost a 4-momentum from the rest frame of a parent to the lab frame
pub fn boost_from_rest_frame(p: &Momentum, parent: &Momentum) -> Momentum {
    let parent_mass = parent.mass();
    let p_dot = parent.xyz().dot(&p.xyz());
    let energy = (parent[E] * p[E] + p_dot) / parent_mass;
    let scale = p_dot / (parent_mass * (parent[E] + parent_mass)) + p[E] / parent_mass;
    let xyz = p.xyz() + parent.xyz() * scale;
    Momentum::new(xyz[0], xyz[1], xyz[2], energy)
}

/// Isotropic decay of a parent into two daughters of identical mass
///
/// Returns the daughters' lab-frame 4-momenta.
///
pub fn two_body_decay(
    parent: &Momentum,
    daughter_mass: Float,
    rng: &mut RandomGenerator,
) -> (Momentum, Momentum) {
    let cos_theta = 2. * rng.gen::<Float>() - 1.;
    let phi = 2. * PI * rng.gen::<Float>();
    back_to_back_decay(parent, daughter_mass, cos_theta, phi)
}

/// Two-body decay along a given rest-frame direction of the first daughter
pub fn back_to_back_decay(
    parent: &Momentum,
    daughter_mass: Float,
    cos_theta: Float,
    phi: Float,
) -> (Momentum, Momentum) {
    let half_mass = 0.5 * parent.mass();
    let p_star = sqrt(half_mass * half_mass - daughter_mass * daughter_mass);
    let sin_theta = sqrt(1. - cos_theta * cos_theta);
    let direction = [sin_theta * cos(phi), sin_theta * sin(phi), cos_theta];
    let daughter = |side: Float| {
        Momentum::new(
            side * p_star * direction[0],
            side * p_star * direction[1],
            side * p_star * direction[2],
            half_mass,
        )
    };
    (
        boost_from_rest_frame(&daughter(1.), parent),
        boost_from_rest_frame(&daughter(-1.), parent),
    )
}

/// Normally distributed random number
fn normal(rng: &mut RandomGenerator) -> Float {
    rng.sample(StandardNormal)
}
