//! Event tagging by forward neutron emission, as seen by the ZDCs

use crate::{event::ZdcInfo, numeric::Float};

use std::fmt::{self, Display};

/// Forward neutron emission class
///
/// "0n" means no neutron was detected on a side, "Xn" at least one. The first
/// half of the tag refers to the A side, the second half to the C side.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NeutronClass {
    ZeroZero,
    XZero,
    ZeroX,
    XX,
}
//
impl NeutronClass {
    /// All classes, in tagging priority order
    pub const ALL: [NeutronClass; 4] = [Self::ZeroZero, Self::XZero, Self::ZeroX, Self::XX];

    /// Conventional short name
    pub fn label(self) -> &'static str {
        match self {
            Self::ZeroZero => "0n0n",
            Self::XZero => "Xn0n",
            Self::ZeroX => "0nXn",
            Self::XX => "XnXn",
        }
    }
}

impl Display for NeutronClass {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.label())
    }
}

/// Neutron emission classifier
#[derive(Clone, Debug, PartialEq)]
pub struct ZdcClassifier {
    /// Common energy above which a calorimeter is considered to have fired
    pub energy_threshold: Float,

    /// Maximal |time| (ns) of a calorimeter signal belonging to the collision
    pub time_window: Float,
}
//
impl ZdcClassifier {
    /// Setup the classifier
    pub fn new(energy_threshold: Float, time_window: Float) -> Self {
        Self {
            energy_threshold,
            time_window,
        }
    }

    /// Tag a ZDC response with a neutron emission class
    ///
    /// Returns None when a side has an energy above threshold but a time
    /// outside of the window, or an energy sitting exactly on the threshold.
    /// Such events belong to none of the four classes and are left untagged.
    ///
    pub fn classify(&self, zdc: &ZdcInfo) -> Option<NeutronClass> {
        let no_a = zdc.energy_a < self.energy_threshold;
        let no_c = zdc.energy_c < self.energy_threshold;
        let in_time = |time: Float| time.abs() < self.time_window;
        let hit_a = zdc.energy_a > self.energy_threshold && in_time(zdc.time_a);
        let hit_c = zdc.energy_c > self.energy_threshold && in_time(zdc.time_c);

        // Flags are evaluated independently, the first one in priority order wins
        let flags = [
            (NeutronClass::ZeroZero, no_a && no_c),
            (NeutronClass::XZero, hit_a && no_c),
            (NeutronClass::ZeroX, no_a && hit_c),
            (NeutronClass::XX, hit_a && hit_c),
        ];
        flags
            .iter()
            .find(|(_, flag)| *flag)
            .map(|(class, _)| *class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zdc(energy_a: Float, time_a: Float, energy_c: Float, time_c: Float) -> ZdcInfo {
        ZdcInfo {
            energy_a,
            time_a,
            energy_c,
            time_c,
        }
    }

    #[test]
    fn reference_cases() {
        let classifier = ZdcClassifier::new(0., 2.);
        assert_eq!(
            classifier.classify(&zdc(-1., 0., -1., 0.)),
            Some(NeutronClass::ZeroZero)
        );
        assert_eq!(
            classifier.classify(&zdc(5., 0.5, -1., 0.)),
            Some(NeutronClass::XZero)
        );
        assert_eq!(
            classifier.classify(&zdc(-1., 0., 5., -1.5)),
            Some(NeutronClass::ZeroX)
        );
        assert_eq!(
            classifier.classify(&zdc(5., 0.5, 3., -0.5)),
            Some(NeutronClass::XX)
        );
    }

    #[test]
    fn out_of_time_signal_is_untagged() {
        // ZNA fired, but outside of the time window: this is neither 0n nor
        // Xn on the A side, so the event belongs to no class at all.
        let classifier = ZdcClassifier::new(0., 2.);
        assert_eq!(classifier.classify(&zdc(5., 5., -1., 0.)), None);
        assert_eq!(classifier.classify(&zdc(5., 0., 5., -3.)), None);
    }

    #[test]
    fn energy_on_threshold_is_untagged() {
        let classifier = ZdcClassifier::new(0., 2.);
        assert_eq!(classifier.classify(&zdc(0., 0., -1., 0.)), None);
    }

    #[test]
    fn missing_signal_sentinel_is_zero_neutron() {
        let classifier = ZdcClassifier::new(0., 2.);
        assert_eq!(
            classifier.classify(&ZdcInfo::empty()),
            Some(NeutronClass::ZeroZero)
        );
    }

    #[test]
    fn labels() {
        let labels = NeutronClass::ALL.map(|class| class.to_string());
        assert_eq!(labels, ["0n0n", "Xn0n", "0nXn", "XnXn"]);
    }
}
