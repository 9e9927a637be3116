//! Selection cuts that can be applied to reconstructed candidates
//!
//! The set of available cuts is closed: each one is a variant of
//! `CutApplicator`, and configurations pick one by its registered name.

mod pho_any_pf_iso_with_ea;

pub use self::pho_any_pf_iso_with_ea::{pile_up_corrected, IsolationInputs, PhoAnyPfIsoWithEaCut};
#[cfg(test)]
pub(crate) use self::pho_any_pf_iso_with_ea::tests::make_cut;

use crate::{
    candidate::Photon,
    config::ParameterSet,
    error::Error,
    event::{ConsumesCollector, Event},
    numeric::Float,
    Result,
};

/// Kind of candidate that a cut can be applied to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateType {
    /// Reconstructed photons
    Photon,
}

/// Constructor of a registered cut
type CutBuilder = fn(&ParameterSet) -> Result<CutApplicator>;

/// Registered cuts, by name
const REGISTRY: &[(&str, CutBuilder)] = &[(
    PhoAnyPfIsoWithEaCut::CUT_NAME,
    build_pho_any_pf_iso_with_ea,
)];

fn build_pho_any_pf_iso_with_ea(params: &ParameterSet) -> Result<CutApplicator> {
    PhoAnyPfIsoWithEaCut::new(params).map(CutApplicator::PhoAnyPfIsoWithEa)
}

/// Any of the available cuts
#[derive(Debug)]
pub enum CutApplicator {
    /// Pile-up corrected PF isolation cut on photons
    PhoAnyPfIsoWithEa(PhoAnyPfIsoWithEaCut),
}

/// Per-event inputs of any of the available cuts
#[derive(Clone, Copy, Debug)]
pub enum EventContent<'ev> {
    /// Inputs of the PF isolation cut
    Isolation(IsolationInputs<'ev>),
}

impl CutApplicator {
    /// Build the cut named by the `cutName` parameter
    pub fn from_config(params: &ParameterSet) -> Result<Self> {
        let name = params.get_string("cutName")?;
        let (_, build) = REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .ok_or_else(|| Error::UnknownCut(name.clone()))?;
        build(params)
    }

    /// Names of all cuts that can be built
    pub fn registered_names() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(name, _)| *name)
    }

    /// Name of this cut in the configuration
    pub fn name(&self) -> &str {
        match self {
            Self::PhoAnyPfIsoWithEa(cut) => cut.name(),
        }
    }

    /// Kind of candidate that this cut applies to
    pub fn candidate_type(&self) -> CandidateType {
        match self {
            Self::PhoAnyPfIsoWithEa(_) => CandidateType::Photon,
        }
    }

    /// Declare the per-event data that this cut is going to read
    pub fn set_consumes(&mut self, cc: &mut ConsumesCollector) {
        match self {
            Self::PhoAnyPfIsoWithEa(cut) => cut.set_consumes(cc),
        }
    }

    /// Fetch the inputs of this cut from the current event
    pub fn event_content<'ev>(&self, event: &'ev Event) -> Result<EventContent<'ev>> {
        match self {
            Self::PhoAnyPfIsoWithEa(cut) => cut.event_content(event).map(EventContent::Isolation),
        }
    }

    /// Decide whether a photon passes this cut
    pub fn evaluate(&self, photon: &Photon, content: &EventContent) -> Result<bool> {
        match (self, content) {
            (Self::PhoAnyPfIsoWithEa(cut), EventContent::Isolation(inputs)) => {
                cut.evaluate(photon, inputs)
            }
        }
    }

    /// Quantity on which this cut is applied, for a given photon
    pub fn value(&self, photon: &Photon, content: &EventContent) -> Result<Float> {
        match (self, content) {
            (Self::PhoAnyPfIsoWithEa(cut), EventContent::Isolation(inputs)) => {
                cut.value(photon, inputs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry() {
        assert_eq!(
            CutApplicator::registered_names().collect::<Vec<_>>(),
            ["PhoAnyPFIsoWithEACut"]
        );
    }

    #[test]
    fn unknown_cut() {
        let params = ParameterSet::from_str_with_base("cutName GsfEleFull5x5SigmaIEtaIEtaCut", ".")
            .unwrap();
        let err = CutApplicator::from_config(&params).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::UnknownCut("GsfEleFull5x5SigmaIEtaIEtaCut".to_owned()))
        );
    }

    #[test]
    fn forwards_to_the_variant() {
        use crate::{
            candidate::CandidateKey,
            event::{InputTag, ValueMap},
        };

        let cut = CutApplicator::PhoAnyPfIsoWithEa(make_cut((0.1, 0.), (0.1, 0.), 0.15, true));
        assert_eq!(cut.name(), "test");
        assert_eq!(cut.candidate_type(), CandidateType::Photon);

        let key = CandidateKey::new(0, 0);
        let mut event = Event::new();
        event.put(InputTag::new("isoMap"), [(key, 2.0f32)].into_iter().collect::<ValueMap<_>>());
        event.put(InputTag::new("rho"), 10f64);
        let content = cut.event_content(&event).unwrap();
        let photon = Photon::at_eta(key, 50., 2.);
        assert!(cut.evaluate(&photon, &content).unwrap());
        approx::assert_relative_eq!(cut.value(&photon, &content).unwrap(), 0.01, epsilon = 1e-6);
    }
}
