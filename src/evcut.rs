//! Mechanism to apply a cut to reconstructed collisions

use crate::{event::Collision, numeric::Float};

/// Cuts on reconstructed collisions
#[derive(Clone, Debug, PartialEq)]
pub struct EventCut {
    /// Cut on maximum |z| of the primary vertex (cm)
    pub pos_z_max: Float,

    /// Required gap side, if gap side selection is enabled
    pub gap_side: Option<i32>,
}
//
impl EventCut {
    /// Setup the cuts on reconstructed collisions
    pub fn new(pos_z_max: Float, gap_side: Option<i32>) -> Self {
        Self {
            pos_z_max,
            gap_side,
        }
    }

    /// Decide whether a collision passes the cut or should be rejected
    pub fn keep(&self, collision: &Collision) -> bool {
        // Check the vertex position (a NaN vertex never passes)
        if !(collision.pos_z().abs() <= self.pos_z_max) {
            return false;
        }

        // Check the gap side, if requested
        match self.gap_side {
            Some(side) => collision.gap_side == side,
            None => true,
        }
    }
}
