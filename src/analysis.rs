//! The ρ⁰ analysis proper: per-event selection, reconstruction and histogram
//! filling, chaining together the cut, PID, ZDC and decay angle machinery.

use crate::{
    config::Configuration,
    decay,
    evcut::EventCut,
    event::Collision,
    histos::{Axis, HistogramSink, Histograms},
    momentum::{Kinematics, Momentum},
    numeric::{floats::consts::PI, Float},
    pid::PionPid,
    system::{self, System, SystemCut},
    track::TrackLike,
    trkcut::{SelectionStage, TrackCut, SELECTION_COUNTER},
    zdc::{NeutronClass, ZdcClassifier},
};

use prefix_num_ops::real::*;
use rand::Rng;

/// Edges of the variable-width pT axis, chosen to hold equal ρ⁰ yields
const PT_QUANTILE_EDGES: [Float; 10] = [
    0.0181689, 0.0263408, 0.0330488, 0.0390369, 0.045058, 0.0512604, 0.0582598, 0.066986,
    0.0788085, 0.1,
];

/// Name of the histogram group which ignores neutron emission
const NO_SELECTION: &str = "no-selection";

/// Charge configuration of a two-pion system
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PairSign {
    /// π⁺π⁻, the signal
    Unlike,

    /// π⁺π⁺, background
    LikePositive,

    /// π⁻π⁻, background
    LikeNegative,
}
//
impl PairSign {
    /// All sign configurations
    pub const ALL: [PairSign; 3] = [Self::Unlike, Self::LikePositive, Self::LikeNegative];

    /// Classify a pair by its net charge
    pub fn from_charge(total_charge: i32) -> Option<Self> {
        match total_charge {
            0 => Some(Self::Unlike),
            2 => Some(Self::LikePositive),
            -2 => Some(Self::LikeNegative),
            _ => None,
        }
    }

    /// Histogram directory of system-level observables
    pub fn system_dir(self) -> &'static str {
        match self {
            Self::Unlike => "unlike-sign",
            Self::LikePositive => "like-sign/positive",
            Self::LikeNegative => "like-sign/negative",
        }
    }

    /// Histogram directory of single-pion observables (like-sign pairs share one)
    pub fn pions_dir(self) -> &'static str {
        match self {
            Self::Unlike => "unlike-sign",
            Self::LikePositive | Self::LikeNegative => "like-sign",
        }
    }
}

/// What became of a two-pion candidate
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PairOutcome {
    /// Charge configuration
    pub sign: PairSign,

    /// Truth that the system passed the mass, pT and rapidity cuts
    pub passes_system_cut: bool,

    /// Neutron emission class of the event, if any
    pub class: Option<NeutronClass>,
}

/// Where an event ended up in the analysis
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Failed the vertex or gap side cuts
    EventRejected,

    /// Surviving tracks were not jointly pion-like
    PidRejected,

    /// Two surviving tracks
    PionPair(PairOutcome),

    /// Four or six surviving tracks with zero net charge
    MultiPion(usize),

    /// Any other track multiplicity or charge configuration
    Unused,
}

/// UPC ρ⁰ → π⁺π⁻ analysis
#[derive(Clone, Debug)]
pub struct RhoAnalysis {
    event_cut: EventCut,
    zdc: ZdcClassifier,
    track_cut: TrackCut,
    pid: PionPid,
    system_cut: SystemCut,
}
//
impl RhoAnalysis {
    // ### CONSTRUCTION ###

    /// Setup the analysis from the configuration
    pub fn new(cfg: &Configuration) -> Self {
        Self {
            event_cut: cfg.event_cut.clone(),
            zdc: cfg.zdc.clone(),
            track_cut: cfg.track_cut.clone(),
            pid: cfg.pid.clone(),
            system_cut: cfg.system_cut.clone(),
        }
    }

    // ### EVENT PROCESSING ###

    /// Process one collision and its tracks
    ///
    /// Every histogram that gets filled must have been registered by
    /// `book_histograms()`. The random number generator is only used to
    /// assign roles in the decay angle of two-track events.
    ///
    pub fn process<T: TrackLike>(
        &self,
        collision: &Collision,
        tracks: &[T],
        rng: &mut impl Rng,
        histos: &mut impl HistogramSink,
    ) -> Outcome {
        // Collision QC is filled before any selection
        Self::fill_collision_qc(collision, histos);
        if !self.event_cut.keep(collision) {
            return Outcome::EventRejected;
        }
        let class = self.zdc.classify(&collision.zdc);

        // Select tracks, keeping their 4-momenta under the pion hypothesis
        let mut selected = Vec::with_capacity(tracks.len());
        let mut momenta = Vec::with_capacity(tracks.len());
        for track in tracks {
            Self::fill_raw_track_qc(track, histos);
            histos.fill(SELECTION_COUNTER, SelectionStage::AllTracks.bin());
            if !self.track_cut.keep(track, histos) {
                continue;
            }
            histos.fill_2d(
                "QC/tracks/cut/hTpcSignalVsPt",
                track.pt(),
                track.tpc_signal(),
            );
            histos.fill_2d("QC/tracks/cut/hDcaXYZ", track.dca_z(), track.dca_xy());
            selected.push(track);
            momenta.push(track.pion_momentum());
        }
        let num_tracks = selected.len();
        histos.fill("QC/tracks/cut/hRemainingTracks", num_tracks as Float);
        if let [first, second] = selected[..] {
            histos.fill_2d(
                "QC/tracks/cut/hTpcNSigmaPi2D",
                first.tpc_n_sigma_pi(),
                second.tpc_n_sigma_pi(),
            );
            histos.fill_2d(
                "QC/tracks/cut/hTpcNSigmaEl2D",
                first.tpc_n_sigma_el(),
                second.tpc_n_sigma_el(),
            );
        }

        // Joint PID on everything that survived
        if !self.pid.accept(selected.iter().copied()) {
            return Outcome::PidRejected;
        }
        histos.fill_weighted(
            SELECTION_COUNTER,
            &[SelectionStage::PionPid.bin()],
            num_tracks as Float,
        );

        let system = System::reconstruct(&momenta);
        let total_charge = system::total_charge(selected.iter().copied());
        match (num_tracks, total_charge) {
            (2, _) => {
                let Some(sign) = PairSign::from_charge(total_charge) else {
                    return Outcome::Unused;
                };
                let pair = [momenta[0], momenta[1]];
                let signs = [selected[0].sign(), selected[1].sign()];
                self.process_pair(&pair, signs, sign, &system, class, rng, histos)
            }
            (4, 0) | (6, 0) => {
                let dir = format!("system/{num_tracks}pi");
                let (mass, pt) = (system.mass(), system.pt());
                histos.fill(&format!("{dir}/hM"), mass);
                histos.fill(&format!("{dir}/hPt"), pt);
                histos.fill_2d(&format!("{dir}/hPtVsM"), mass, pt);
                histos.fill(&format!("{dir}/hY"), system.rapidity());
                Outcome::MultiPion(num_tracks)
            }
            _ => Outcome::Unused,
        }
    }

    /// Two-pion branch of the analysis
    #[allow(clippy::too_many_arguments)]
    fn process_pair(
        &self,
        pair: &[Momentum; 2],
        signs: [i32; 2],
        sign: PairSign,
        system: &System,
        class: Option<NeutronClass>,
        rng: &mut impl Rng,
        histos: &mut impl HistogramSink,
    ) -> Outcome {
        // Both angle definitions are evaluated before the system cut, so that
        // the random stream does not depend on the cut outcome
        let phi_random = decay::phi_random(pair, rng);
        let phi_charge = decay::phi_charge(pair, signs);
        let (mass, pt, rapidity) = (system.mass(), system.pt(), system.rapidity());

        Self::fill_pions("no-selection", sign, pair, histos);
        let raw_dir = format!("system/2pi/raw/{}", sign.system_dir());
        histos.fill(&format!("{raw_dir}/hM"), mass);
        histos.fill(&format!("{raw_dir}/hPt"), pt);
        histos.fill_2d(&format!("{raw_dir}/hPtVsM"), mass, pt);
        histos.fill(&format!("{raw_dir}/hY"), rapidity);

        let passes_system_cut = self.system_cut.keep(system);
        if passes_system_cut {
            Self::fill_pions("selected", sign, pair, histos);
            let groups = std::iter::once(NO_SELECTION).chain(class.map(NeutronClass::label));
            for group in groups {
                let dir = format!("system/2pi/cut/{group}/{}", sign.system_dir());
                let path = |name: &str| format!("{dir}/{name}");
                histos.fill(&path("hM"), mass);
                histos.fill(&path("hPt"), pt);
                histos.fill(&path("hPt2"), pt * pt);
                histos.fill_2d(&path("hPtVsM"), mass, pt);
                histos.fill(&path("hY"), rapidity);
                histos.fill(&path("hPhiRandom"), phi_random);
                histos.fill(&path("hPhiCharge"), phi_charge);
                histos.fill_2d(&path("hPhiRandomVsM"), mass, phi_random);
                histos.fill_2d(&path("hPhiChargeVsM"), mass, phi_charge);
                histos.fill_2d(
                    &path("hPyVsPxRandom"),
                    pt * cos(phi_random),
                    pt * sin(phi_random),
                );
                histos.fill_2d(
                    &path("hPyVsPxCharge"),
                    pt * cos(phi_charge),
                    pt * sin(phi_charge),
                );
                histos.fill_2d(&path("hMInPtQuantileBins"), mass, pt);
            }
        }

        Outcome::PionPair(PairOutcome {
            sign,
            passes_system_cut,
            class,
        })
    }

    /// Per-pion observables of a pair, azimuths shifted into [0, 2π]
    fn fill_pions(
        selection: &str,
        sign: PairSign,
        pair: &[Momentum; 2],
        histos: &mut impl HistogramSink,
    ) {
        let dir = format!("pions/{selection}/{}", sign.pions_dir());
        histos.fill_2d(&format!("{dir}/hPt"), pair[0].pt(), pair[1].pt());
        histos.fill_2d(&format!("{dir}/hEta"), pair[0].eta(), pair[1].eta());
        histos.fill_2d(
            &format!("{dir}/hPhi"),
            pair[0].phi() + PI,
            pair[1].phi() + PI,
        );
    }

    /// Collision-level QC
    fn fill_collision_qc(collision: &Collision, histos: &mut impl HistogramSink) {
        let zdc = &collision.zdc;
        let pos_z = collision.pos_z();
        histos.fill_2d("QC/collisions/hPosXY", collision.pos_x(), collision.pos_y());
        histos.fill("QC/collisions/hPosZ", pos_z);
        histos.fill_2d("QC/collisions/hZdcCommonEnergy", zdc.energy_a, zdc.energy_c);
        histos.fill_2d("QC/collisions/hZdcTime", zdc.time_a, zdc.time_c);
        histos.fill_2d(
            "QC/collisions/hZnaTimeVsCommonEnergy",
            zdc.energy_a,
            zdc.time_a,
        );
        histos.fill_2d(
            "QC/collisions/hZncTimeVsCommonEnergy",
            zdc.energy_c,
            zdc.time_c,
        );
        histos.fill("QC/collisions/hNumContrib", collision.num_contrib as Float);
        histos.fill_2d("QC/collisions/hZnaTimeVsPosZ", pos_z, zdc.time_a);
        histos.fill_2d("QC/collisions/hZncTimeVsPosZ", pos_z, zdc.time_c);
        histos.fill_2d(
            "QC/collisions/hPosZVsZnTimeAdd",
            (zdc.time_a + zdc.time_c) / 2.,
            pos_z,
        );
        histos.fill_2d(
            "QC/collisions/hPosZVsZnTimeSub",
            (zdc.time_a - zdc.time_c) / 2.,
            pos_z,
        );
    }

    /// Track-level QC, before any cut
    fn fill_raw_track_qc<T: TrackLike>(track: &T, histos: &mut impl HistogramSink) {
        histos.fill("QC/tracks/raw/hTpcNSigmaPi", track.tpc_n_sigma_pi());
        histos.fill("QC/tracks/raw/hTofNSigmaPi", track.tof_n_sigma_pi());
        histos.fill("QC/tracks/raw/hTpcNSigmaEl", track.tpc_n_sigma_el());
        histos.fill_2d("QC/tracks/raw/hDcaXYZ", track.dca_z(), track.dca_xy());
        histos.fill("QC/tracks/raw/hItsNCls", track.its_n_cls() as Float);
        histos.fill("QC/tracks/raw/hItsChi2NCl", track.its_chi2_n_cl());
        histos.fill("QC/tracks/raw/hTpcChi2NCl", track.tpc_chi2_n_cl());
        histos.fill(
            "QC/tracks/raw/hTpcNClsFindable",
            track.tpc_n_cls_findable() as Float,
        );
        histos.fill(
            "QC/tracks/raw/hTpcNClsCrossedRows",
            track.tpc_n_cls_crossed_rows() as Float,
        );
    }
}

/// Register every histogram that the analysis may fill
#[rustfmt::skip]
pub fn book_histograms() -> Histograms {
    let mut histos = Histograms::new();

    // Axes shared by many histograms
    let m_axis = || Axis::uniform(1000, 0., 10.);
    let m_cut_axis = || Axis::uniform(70, 0.5, 1.2);
    let pt_axis = || Axis::uniform(1000, 0., 10.);
    let pt_cut_axis = || Axis::uniform(300, 0., 0.3);
    let pt2_axis = || Axis::uniform(300, 0., 0.09);
    let eta_axis = || Axis::uniform(180, -0.9, 0.9);
    let y_axis = || Axis::uniform(180, -0.9, 0.9);
    let phi_axis = || Axis::uniform(180, 0., 2. * PI);
    let phi_asymm_axis = || Axis::uniform(182, -PI, PI);
    let momentum_from_phi_axis = || Axis::uniform(400, -0.1, 0.1);
    let pt_quantile_axis = || Axis::variable(&PT_QUANTILE_EDGES);
    let n_sigma_axis = || Axis::uniform(400, -10., 30.);
    let dca_axis = || Axis::uniform(1000, -5., 5.);
    let zn_energy_axis = || Axis::uniform(250, -5., 20.);
    let zn_time_axis = || Axis::uniform(200, -10., 10.);
    let zn_time_narrow_axis = || Axis::uniform(300, -1.5, 1.5);
    let pos_z_axis = || Axis::uniform(400, -20., 20.);

    // Collision QC
    histos.add("QC/collisions/hPosXY", ";x (cm);y (cm);counts",
               vec![Axis::uniform(2000, -0.1, 0.1), Axis::uniform(2000, -0.1, 0.1)]);
    histos.add("QC/collisions/hPosZ", ";z (cm);counts", vec![pos_z_axis()]);
    histos.add("QC/collisions/hNumContrib", ";number of contributors;counts",
               vec![Axis::uniform(36, -0.5, 35.5)]);
    histos.add("QC/collisions/hZdcCommonEnergy", ";ZNA common energy;ZNC common energy;counts",
               vec![zn_energy_axis(), zn_energy_axis()]);
    histos.add("QC/collisions/hZdcTime", ";ZNA time (ns);ZNC time (ns);counts",
               vec![zn_time_axis(), zn_time_axis()]);
    histos.add("QC/collisions/hZnaTimeVsCommonEnergy", ";ZNA common energy;ZNA time (ns);counts",
               vec![zn_energy_axis(), zn_time_axis()]);
    histos.add("QC/collisions/hZncTimeVsCommonEnergy", ";ZNC common energy;ZNC time (ns);counts",
               vec![zn_energy_axis(), zn_time_axis()]);
    histos.add("QC/collisions/hZnaTimeVsPosZ", ";z (cm);ZNA time (ns);counts",
               vec![pos_z_axis(), zn_time_narrow_axis()]);
    histos.add("QC/collisions/hZncTimeVsPosZ", ";z (cm);ZNC time (ns);counts",
               vec![pos_z_axis(), zn_time_narrow_axis()]);
    histos.add("QC/collisions/hPosZVsZnTimeAdd", ";(ZNA time + ZNC time)/2 (ns);z (cm);counts",
               vec![zn_time_narrow_axis(), pos_z_axis()]);
    histos.add("QC/collisions/hPosZVsZnTimeSub", ";(ZNA time - ZNC time)/2 (ns);z (cm);counts",
               vec![zn_time_narrow_axis(), pos_z_axis()]);

    // Track QC
    histos.add("QC/tracks/raw/hTpcNSigmaPi", ";TPC n#sigma_{#pi};counts", vec![n_sigma_axis()]);
    histos.add("QC/tracks/raw/hTofNSigmaPi", ";TOF n#sigma_{#pi};counts",
               vec![Axis::uniform(400, -20., 20.)]);
    histos.add("QC/tracks/raw/hTpcNSigmaEl", ";TPC n#sigma_{e};counts", vec![n_sigma_axis()]);
    histos.add("QC/tracks/raw/hDcaXYZ", ";DCA_{z} (cm);DCA_{xy} (cm);counts",
               vec![dca_axis(), dca_axis()]);
    histos.add("QC/tracks/raw/hItsNCls", ";ITS N_{cls};counts", vec![Axis::uniform(11, -0.5, 10.5)]);
    histos.add("QC/tracks/raw/hItsChi2NCl", ";ITS #chi^{2}/N_{cls};counts",
               vec![Axis::uniform(1000, 0., 100.)]);
    histos.add("QC/tracks/raw/hTpcChi2NCl", ";TPC #chi^{2}/N_{cls};counts",
               vec![Axis::uniform(1000, 0., 100.)]);
    histos.add("QC/tracks/raw/hTpcNClsFindable", ";TPC N_{cls} findable;counts",
               vec![Axis::uniform(200, 0., 200.)]);
    histos.add("QC/tracks/raw/hTpcNClsCrossedRows", ";TPC crossed rows;counts",
               vec![Axis::uniform(200, 0., 200.)]);
    histos.add("QC/tracks/cut/hTpcNSigmaPi2D", ";TPC n#sigma(#pi_{1});TPC n#sigma(#pi_{2});counts",
               vec![n_sigma_axis(), n_sigma_axis()]);
    histos.add("QC/tracks/cut/hTpcNSigmaEl2D", ";TPC n#sigma(e_{1});TPC n#sigma(e_{2});counts",
               vec![n_sigma_axis(), n_sigma_axis()]);
    histos.add("QC/tracks/cut/hTpcSignalVsPt", ";p_{T} (GeV/#it{c});TPC signal;counts",
               vec![pt_axis(), Axis::uniform(500, 0., 500.)]);
    histos.add("QC/tracks/cut/hRemainingTracks", ";remaining tracks;counts",
               vec![Axis::uniform(21, -0.5, 20.5)]);
    histos.add("QC/tracks/cut/hDcaXYZ", ";DCA_{z} (cm);DCA_{xy} (cm);counts",
               vec![dca_axis(), dca_axis()]);

    // Selection counter, one labeled bin per stage
    let num_stages = SelectionStage::ALL.len();
    histos
        .add(
            SELECTION_COUNTER,
            ";;counts",
            vec![Axis::uniform(num_stages, -0.5, num_stages as Float - 0.5)],
        )
        .set_labels(&SelectionStage::ALL.map(SelectionStage::label));

    // Single pions
    for selection in ["no-selection", "selected"] {
        for sign_dir in ["unlike-sign", "like-sign"] {
            let dir = format!("pions/{selection}/{sign_dir}");
            histos.add(
                format!("{dir}/hPt"),
                ";p_{T}(#pi_{1}) (GeV/#it{c});p_{T}(#pi_{2}) (GeV/#it{c});counts",
                vec![pt_axis(), pt_axis()],
            );
            histos.add(
                format!("{dir}/hEta"),
                ";#eta(#pi_{1});#eta(#pi_{2});counts",
                vec![eta_axis(), eta_axis()],
            );
            histos.add(
                format!("{dir}/hPhi"),
                ";#phi(#pi_{1});#phi(#pi_{2});counts",
                vec![phi_axis(), phi_axis()],
            );
        }
    }

    // Titles shared by system-level histograms
    const M_TITLE: &str = ";m (GeV/#it{c}^{2});counts";
    const PT_TITLE: &str = ";p_{T} (GeV/#it{c});counts";
    const PT_VS_M_TITLE: &str = ";m (GeV/#it{c}^{2});p_{T} (GeV/#it{c});counts";
    const Y_TITLE: &str = ";y;counts";
    const PHI_TITLE: &str = ";#phi;counts";
    const PHI_VS_M_TITLE: &str = ";m (GeV/#it{c}^{2});#phi;counts";
    const PY_VS_PX_TITLE: &str = ";p_{x} (GeV/#it{c});p_{y} (GeV/#it{c});counts";

    // Uncut systems, with wide axes
    let raw_dirs = PairSign::ALL.map(|sign| format!("system/2pi/raw/{}", sign.system_dir()));
    let multi_dirs = ["system/4pi".to_owned(), "system/6pi".to_owned()];
    for dir in raw_dirs.iter().chain(&multi_dirs) {
        histos.add(format!("{dir}/hM"), M_TITLE, vec![m_axis()]);
        histos.add(format!("{dir}/hPt"), PT_TITLE, vec![pt_axis()]);
        histos.add(format!("{dir}/hPtVsM"), PT_VS_M_TITLE, vec![m_axis(), pt_axis()]);
        histos.add(format!("{dir}/hY"), Y_TITLE, vec![y_axis()]);
    }

    // Systems passing the cuts, per neutron class
    let groups = std::iter::once(NO_SELECTION).chain(NeutronClass::ALL.map(NeutronClass::label));
    for group in groups {
        for sign in PairSign::ALL {
            let dir = format!("system/2pi/cut/{group}/{}", sign.system_dir());
            histos.add(format!("{dir}/hM"), M_TITLE, vec![m_cut_axis()]);
            histos.add(format!("{dir}/hPt"), PT_TITLE, vec![pt_cut_axis()]);
            histos.add(format!("{dir}/hPt2"), ";p_{T}^{2} (GeV^{2}/#it{c}^{2});counts", vec![pt2_axis()]);
            histos.add(format!("{dir}/hPtVsM"), PT_VS_M_TITLE, vec![m_cut_axis(), pt_cut_axis()]);
            histos.add(format!("{dir}/hY"), Y_TITLE, vec![y_axis()]);
            histos.add(format!("{dir}/hPhiRandom"), PHI_TITLE, vec![phi_asymm_axis()]);
            histos.add(format!("{dir}/hPhiCharge"), PHI_TITLE, vec![phi_asymm_axis()]);
            histos.add(format!("{dir}/hPhiRandomVsM"), PHI_VS_M_TITLE, vec![m_cut_axis(), phi_asymm_axis()]);
            histos.add(format!("{dir}/hPhiChargeVsM"), PHI_VS_M_TITLE, vec![m_cut_axis(), phi_asymm_axis()]);
            histos.add(format!("{dir}/hPyVsPxRandom"), PY_VS_PX_TITLE,
                       vec![momentum_from_phi_axis(), momentum_from_phi_axis()]);
            histos.add(format!("{dir}/hPyVsPxCharge"), PY_VS_PX_TITLE,
                       vec![momentum_from_phi_axis(), momentum_from_phi_axis()]);
            histos.add(format!("{dir}/hMInPtQuantileBins"), PT_VS_M_TITLE,
                       vec![m_cut_axis(), pt_quantile_axis()]);
        }
    }

    histos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::ZdcInfo,
        evgen::{back_to_back_decay, from_pt_y_phi_m},
        momentum::{PION_MASS, X, Y, Z},
        random::RandomGenerator,
        track::Track,
    };

    fn configuration() -> Configuration {
        Configuration {
            num_events: 1,
            seed: 1,
            event_cut: EventCut::new(10., Some(2)),
            zdc: ZdcClassifier::new(0., 2.),
            track_cut: TrackCut::new(false, 1.),
            pid: PionPid::new(3.),
            system_cut: SystemCut {
                mass_min: 0.5,
                mass_max: 1.2,
                pt_max: 0.1,
                y_max: 0.9,
            },
        }
    }

    fn collision(zdc: ZdcInfo) -> Collision {
        Collision {
            pos: [0., 0., 1.],
            gap_side: 2,
            num_contrib: 2,
            zdc,
        }
    }

    fn xn0n() -> ZdcInfo {
        ZdcInfo {
            energy_a: 5.,
            time_a: 0.5,
            energy_c: -1.,
            time_c: 0.,
        }
    }

    /// Pions from a ρ⁰ candidate decaying transversely in its rest frame
    fn rho_pions(mass: Float, pt: Float, y: Float, signs: [i32; 2]) -> Vec<Track> {
        let rho = from_pt_y_phi_m(pt, y, 0.3, mass);
        let (p1, p2) = back_to_back_decay(&rho, PION_MASS, 0., 1.);
        vec![
            Track::good_pion(p1[X], p1[Y], p1[Z], signs[0]),
            Track::good_pion(p2[X], p2[Y], p2[Z], signs[1]),
        ]
    }

    fn entries(histos: &Histograms, name: &str) -> usize {
        histos
            .get(name)
            .unwrap_or_else(|| panic!("{name} is not booked"))
            .entries()
    }

    #[test]
    fn unlike_sign_rho_candidate() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(
            outcome,
            Outcome::PionPair(PairOutcome {
                sign: PairSign::Unlike,
                passes_system_cut: true,
                class: Some(NeutronClass::XZero),
            })
        );
        assert_eq!(entries(&histos, "system/2pi/cut/Xn0n/unlike-sign/hM"), 1);
        assert_eq!(
            entries(&histos, "system/2pi/cut/no-selection/unlike-sign/hM"),
            1
        );
        assert_eq!(entries(&histos, "system/2pi/cut/0n0n/unlike-sign/hM"), 0);
        assert_eq!(entries(&histos, "system/2pi/raw/unlike-sign/hM"), 1);
        assert_eq!(entries(&histos, "pions/selected/unlike-sign/hPt"), 1);

        // Every stage was passed by both tracks
        let counter = histos.get(SELECTION_COUNTER).unwrap();
        for stage in SelectionStage::ALL {
            assert_eq!(counter.bin_content(&[stage as usize + 1]), 2.);
        }
        assert_eq!(counter.labels()[6], "2D TPC n#sigma_{#pi} cut");
    }

    #[test]
    fn system_cut_failure_only_fills_raw() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let tracks = rho_pions(1.5, 0.05, 0.1, [-1, 1]);

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert!(matches!(
            outcome,
            Outcome::PionPair(PairOutcome {
                sign: PairSign::Unlike,
                passes_system_cut: false,
                ..
            })
        ));
        assert_eq!(entries(&histos, "system/2pi/raw/unlike-sign/hM"), 1);
        assert_eq!(entries(&histos, "pions/no-selection/unlike-sign/hPhi"), 1);
        assert_eq!(
            entries(&histos, "system/2pi/cut/no-selection/unlike-sign/hM"),
            0
        );
        assert_eq!(entries(&histos, "pions/selected/unlike-sign/hPhi"), 0);
    }

    #[test]
    fn like_sign_pairs() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);

        let positive = rho_pions(0.77, 0.05, 0.1, [1, 1]);
        let outcome = analysis.process(
            &collision(ZdcInfo::empty()),
            &positive,
            &mut rng,
            &mut histos,
        );
        assert_eq!(
            outcome,
            Outcome::PionPair(PairOutcome {
                sign: PairSign::LikePositive,
                passes_system_cut: true,
                class: Some(NeutronClass::ZeroZero),
            })
        );

        let negative = rho_pions(0.77, 0.05, 0.1, [-1, -1]);
        analysis.process(
            &collision(ZdcInfo::empty()),
            &negative,
            &mut rng,
            &mut histos,
        );

        assert_eq!(entries(&histos, "pions/no-selection/like-sign/hPt"), 2);
        assert_eq!(entries(&histos, "system/2pi/raw/like-sign/positive/hM"), 1);
        assert_eq!(entries(&histos, "system/2pi/raw/like-sign/negative/hM"), 1);
        assert_eq!(
            entries(&histos, "system/2pi/cut/0n0n/like-sign/negative/hPt2"),
            1
        );
        assert_eq!(entries(&histos, "system/2pi/raw/unlike-sign/hM"), 0);
    }

    #[test]
    fn untagged_event_only_fills_no_selection() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        let out_of_time = ZdcInfo {
            time_a: 5.,
            ..xn0n()
        };

        let outcome = analysis.process(&collision(out_of_time), &tracks, &mut rng, &mut histos);
        assert!(matches!(outcome, Outcome::PionPair(PairOutcome { class: None, .. })));
        assert_eq!(
            entries(&histos, "system/2pi/cut/no-selection/unlike-sign/hY"),
            1
        );
        for class in NeutronClass::ALL {
            let name = format!("system/2pi/cut/{class}/unlike-sign/hY");
            assert_eq!(entries(&histos, &name), 0);
        }
    }

    #[test]
    fn rejected_event_only_fills_collision_qc() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        let mut far_away = collision(xn0n());
        far_away.pos[2] = 15.;

        let outcome = analysis.process(&far_away, &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::EventRejected);
        assert_eq!(entries(&histos, "QC/collisions/hPosZ"), 1);
        assert_eq!(entries(&histos, "QC/tracks/raw/hTpcNSigmaPi"), 0);
        assert_eq!(entries(&histos, SELECTION_COUNTER), 0);
    }

    #[test]
    fn pid_rejection() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let mut tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        tracks[0].tpc_n_sigma_pi = 2.5;
        tracks[1].tpc_n_sigma_pi = 2.5;

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::PidRejected);
        assert_eq!(entries(&histos, "QC/tracks/cut/hTpcNSigmaPi2D"), 1);
        let counter = histos.get(SELECTION_COUNTER).unwrap();
        assert_eq!(counter.bin_content(&[6]), 2.);
        assert_eq!(counter.bin_content(&[7]), 0.);
    }

    #[test]
    fn track_cut_shrinks_multiplicity() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let mut tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        tracks[1].is_pv_contributor = false;

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::Unused);
        let remaining = histos.get("QC/tracks/cut/hRemainingTracks").unwrap();
        assert_eq!(remaining.bin_content(&[2]), 1.);
        let counter = histos.get(SELECTION_COUNTER).unwrap();
        assert_eq!(counter.bin_content(&[1]), 2.);
        assert_eq!(counter.bin_content(&[2]), 1.);
        assert_eq!(counter.bin_content(&[7]), 1.);
    }

    #[test]
    fn four_pion_system() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let mut tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        tracks.extend(rho_pions(0.9, 0.1, -0.2, [-1, 1]));

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::MultiPion(4));
        assert_eq!(entries(&histos, "system/4pi/hM"), 1);
        assert_eq!(entries(&histos, "system/6pi/hM"), 0);

        // Three tracks are of no use
        tracks.truncate(3);
        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::Unused);
    }

    #[test]
    fn six_pion_system() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let mut tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        tracks.extend(rho_pions(0.9, 0.1, -0.2, [-1, 1]));
        tracks.extend(rho_pions(0.8, 0.08, 0.3, [1, -1]));

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::MultiPion(6));
        for name in ["hM", "hPt", "hPtVsM", "hY"] {
            assert_eq!(entries(&histos, &format!("system/6pi/{name}")), 1);
            assert_eq!(entries(&histos, &format!("system/4pi/{name}")), 0);
        }
        let counter = histos.get(SELECTION_COUNTER).unwrap();
        assert_eq!(counter.bin_content(&[7]), 6.);
    }

    #[test]
    fn charged_four_track_set_is_unused() {
        let analysis = RhoAnalysis::new(&configuration());
        let mut histos = book_histograms();
        let mut rng = RandomGenerator::seeded(5);
        let mut tracks = rho_pions(0.77, 0.05, 0.1, [1, -1]);
        tracks.extend(rho_pions(0.9, 0.1, -0.2, [1, 1]));

        let outcome = analysis.process(&collision(xn0n()), &tracks, &mut rng, &mut histos);
        assert_eq!(outcome, Outcome::Unused);
        assert_eq!(entries(&histos, "system/4pi/hM"), 0);
        assert_eq!(entries(&histos, "system/4pi/hY"), 0);
        assert_eq!(entries(&histos, "system/2pi/raw/unlike-sign/hM"), 0);
    }

    #[test]
    fn booking_covers_every_group() {
        let histos = book_histograms();
        let groups = 1 + NeutronClass::ALL.len();
        let expected = 11 + 14 + 1 + 12 + 3 * 4 + 2 * 4 + groups * PairSign::ALL.len() * 12;
        assert_eq!(histos.len(), expected);
        let quantiles = histos
            .get("system/2pi/cut/XnXn/like-sign/positive/hMInPtQuantileBins")
            .unwrap();
        assert_eq!(quantiles.axes()[1].num_bins(), 9);
    }
}
