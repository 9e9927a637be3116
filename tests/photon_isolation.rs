//! Configure the isolation cut from files on disk and run it on a few events

use approx::assert_relative_eq;
use pho_pfiso_cut::{
    select, CandidateKey, ConsumesCollector, CutApplicator, Error, Event, Float, InputTag,
    ParameterSet, Photon, ValueMap,
};

use std::{fs, path::PathBuf};

const EFFECTIVE_AREAS: &str = "
# |eta| min   |eta| max   effective area
0.0000         1.0000       0.1703
1.0000         1.4790       0.1715
1.4790         2.0000       0.1213
2.0000         2.2000       0.1635
2.2000         2.3000       0.1937
2.3000         2.4000       0.2393
2.4000         5.0000       0.2680
";

/// Relative isolation with a pT-dependent threshold
const PARAMETERS: &str = "
cutName                          PhoAnyPFIsoWithEACut
anyPFIsoWithEACutValue_C1_EB     0.1
anyPFIsoWithEACutValue_C2_EB     0.001
anyPFIsoWithEACutValue_C1_EE     0.08
anyPFIsoWithEACutValue_C2_EE     0.0005
barrelCutOff                     1.479
useRelativeIso                   true
effAreasConfigFile               effAreaPhotons.txt
anyPFIsoMap                      photonIDValueMapProducer:phoPhotonIsolation
rho                              fixedGridRhoFastjetAll
";

/// Scratch directory holding the configuration files of one test
struct ConfigDir(PathBuf);
//
impl ConfigDir {
    fn new(test_name: &str, parameters: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "pho_pfiso_cut-{}-{test_name}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("effAreaPhotons.txt"), EFFECTIVE_AREAS).unwrap();
        fs::write(dir.join("cut.cfg"), parameters).unwrap();
        Self(dir)
    }

    fn params(&self) -> ParameterSet {
        ParameterSet::load(self.0.join("cut.cfg")).unwrap()
    }
}
//
impl Drop for ConfigDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn make_event(isolations: &[f32], rho: f64) -> Event {
    let mut event = Event::new();
    let iso_map = isolations
        .iter()
        .enumerate()
        .map(|(idx, &iso)| (CandidateKey::new(7, idx), iso))
        .collect::<ValueMap<f32>>();
    event.put(
        InputTag::with_instance("photonIDValueMapProducer", "phoPhotonIsolation"),
        iso_map,
    );
    event.put(InputTag::new("fixedGridRhoFastjetAll"), rho);
    event
}

#[test]
fn configured_from_files() {
    let dir = ConfigDir::new("configured", PARAMETERS);
    let mut cut = CutApplicator::from_config(&dir.params()).unwrap();
    assert_eq!(cut.name(), "PhoAnyPFIsoWithEACut");

    let mut cc = ConsumesCollector::new();
    cut.set_consumes(&mut cc);
    let consumed = cc
        .consumed()
        .map(|(tag, _)| tag.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        consumed,
        [
            "photonIDValueMapProducer:phoPhotonIsolation",
            "fixedGridRhoFastjetAll"
        ]
    );

    // Barrel photon: (5.0 - 20 × 0.1703) / 100 = 0.01594 < 0.1 + 100 × 0.001
    // Endcap photon: (9.0 - 20 × 0.1213) / 40 = 0.16435 > 0.08 + 40 × 0.0005
    // Far endcap photon: (1.0 - 20 × 0.2680) clamped to 0 < 0.08 + 20 × 0.0005
    let photons = [
        Photon::at_eta(CandidateKey::new(7, 0), 100., 0.4),
        Photon::at_eta(CandidateKey::new(7, 1), 40., -1.7),
        Photon::at_eta(CandidateKey::new(7, 2), 20., 2.45),
    ];
    let event = make_event(&[5.0, 9.0, 1.0], 20.);

    let content = cut.event_content(&event).unwrap();
    let values = photons
        .iter()
        .map(|photon| cut.value(photon, &content).unwrap())
        .collect::<Vec<Float>>();
    assert_relative_eq!(values[0], 0.01594, epsilon = 1e-5);
    assert_relative_eq!(values[1], 0.16435, epsilon = 1e-5);
    assert_eq!(values[2], 0.);

    let result = select(&cut, &photons, &event).unwrap();
    assert_eq!(result.decisions, [true, false, true]);
    assert_eq!(result.num_passed, 2);
}

#[test]
fn missing_rho_is_reported() {
    let dir = ConfigDir::new("missing-rho", PARAMETERS);
    let mut cut = CutApplicator::from_config(&dir.params()).unwrap();
    cut.set_consumes(&mut ConsumesCollector::new());

    let mut event = Event::new();
    event.put(
        InputTag::with_instance("photonIDValueMapProducer", "phoPhotonIsolation"),
        ValueMap::<f32>::new(),
    );
    let err = select(&cut, &[], &event).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::ProductNotFound("fixedGridRhoFastjetAll".to_owned()))
    );
}

#[test]
fn incomplete_configuration() {
    let parameters = PARAMETERS.replace("barrelCutOff", "# barrelCutOff");
    let dir = ConfigDir::new("incomplete", &parameters);
    let err = CutApplicator::from_config(&dir.params()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::MissingParameter("barrelCutOff".to_owned()))
    );
}

#[test]
fn missing_effective_areas() {
    let parameters = PARAMETERS.replace("effAreaPhotons.txt", "effAreaElectrons.txt");
    let dir = ConfigDir::new("missing-areas", &parameters);
    let err = CutApplicator::from_config(&dir.params()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidParameter { name, .. }) if name == "effAreasConfigFile"
    ));
}
