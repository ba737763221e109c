//! This module defines the properties and storage of analysed events

use crate::{numeric::Float, track::Track};

/// Response of the two zero-degree neutron calorimeters
///
/// ZNA sits on the A side of the experiment, ZNC on the C side. Energies are
/// the "common" (summed tower) energies, times are in ns relative to the
/// bunch crossing.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZdcInfo {
    /// ZNA common energy
    pub energy_a: Float,

    /// ZNA time (ns)
    pub time_a: Float,

    /// ZNC common energy
    pub energy_c: Float,

    /// ZNC time (ns)
    pub time_c: Float,
}
//
impl ZdcInfo {
    /// Value used by reduced data for a calorimeter which did not fire
    pub const NO_SIGNAL: Float = -999.;

    /// Neither calorimeter fired
    pub fn empty() -> Self {
        Self {
            energy_a: Self::NO_SIGNAL,
            time_a: Self::NO_SIGNAL,
            energy_c: Self::NO_SIGNAL,
            time_c: Self::NO_SIGNAL,
        }
    }
}

/// Reconstructed collision (primary vertex and event-level information)
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    /// Primary vertex position (cm)
    pub pos: [Float; 3],

    /// Rapidity gap side tag of the single-gap producer (0 = A, 1 = C, 2 = AC)
    pub gap_side: i32,

    /// Number of tracks contributing to the primary vertex
    pub num_contrib: u32,

    /// Zero-degree calorimeter response
    pub zdc: ZdcInfo,
}
//
impl Collision {
    /// Vertex X coordinate
    pub fn pos_x(&self) -> Float {
        self.pos[0]
    }

    /// Vertex Y coordinate
    pub fn pos_y(&self) -> Float {
        self.pos[1]
    }

    /// Vertex Z coordinate
    pub fn pos_z(&self) -> Float {
        self.pos[2]
    }
}

/// Storage for one collision and the tracks attached to it
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Vertex, rapidity gap and ZDC information
    pub collision: Collision,

    /// Every reconstructed track of the collision
    pub tracks: Vec<Track>,
}
