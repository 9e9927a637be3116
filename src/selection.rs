//! This module applies a cut to all the candidates of an event, encapsulating
//! use of multiple threads when that is enabled at build time

use crate::{
    candidate::Photon,
    cuts::{CandidateType, CutApplicator, EventContent},
    event::Event,
    Result,
};

#[cfg(feature = "multi-threading")]
use rayon::prelude::*;

/// Outcome of a cut on the candidates of one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionResult {
    /// Decision for each candidate, in candidate order
    pub decisions: Vec<bool>,

    /// Number of candidates which passed
    pub num_passed: usize,
}
//
impl SelectionResult {
    /// Candidates which passed the cut
    pub fn passed<'a>(&'a self, photons: &'a [Photon]) -> impl Iterator<Item = &'a Photon> + 'a {
        photons
            .iter()
            .zip(&self.decisions)
            .filter_map(|(photon, &pass)| pass.then_some(photon))
    }
}

/// Apply a cut to the photons of an event
///
/// The event content of the cut is fetched once, then every candidate is
/// evaluated against it. Evaluation does not mutate anything, so when the
/// `multi-threading` feature is on, candidates are evaluated in parallel.
///
/// The first failure aborts the selection.
///
pub fn select(cut: &CutApplicator, photons: &[Photon], event: &Event) -> Result<SelectionResult> {
    // Cuts for other candidate types have nothing to do here
    eyre::ensure!(
        cut.candidate_type() == CandidateType::Photon,
        "{} does not apply to photons",
        cut.name()
    );

    let content = cut.event_content(event)?;
    let decisions = evaluate_all(cut, photons, &content)?;
    let num_passed = decisions.iter().filter(|&&pass| pass).count();
    log::debug!(
        "{}: {num_passed}/{} photons passed",
        cut.name(),
        decisions.len()
    );
    Ok(SelectionResult {
        decisions,
        num_passed,
    })
}

/// Evaluate the candidates sequentially
#[cfg(not(feature = "multi-threading"))]
fn evaluate_all(
    cut: &CutApplicator,
    photons: &[Photon],
    content: &EventContent,
) -> Result<Vec<bool>> {
    photons
        .iter()
        .map(|photon| cut.evaluate(photon, content))
        .collect()
}

/// Evaluate the candidates in parallel, preserving their order
#[cfg(feature = "multi-threading")]
fn evaluate_all(
    cut: &CutApplicator,
    photons: &[Photon],
    content: &EventContent,
) -> Result<Vec<bool>> {
    photons
        .par_iter()
        .map(|photon| cut.evaluate(photon, content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        candidate::CandidateKey,
        error::Error,
        event::{InputTag, ValueMap},
    };

    fn photons() -> Vec<Photon> {
        vec![
            Photon::at_eta(CandidateKey::new(3, 0), 80., 0.2),
            Photon::at_eta(CandidateKey::new(3, 1), 45., -1.1),
            Photon::at_eta(CandidateKey::new(3, 2), 30., 2.1),
        ]
    }

    fn event(isolations: &[f32]) -> Event {
        let mut event = Event::new();
        let iso_map = isolations
            .iter()
            .enumerate()
            .map(|(idx, &iso)| (CandidateKey::new(3, idx), iso))
            .collect::<ValueMap<_>>();
        event.put(InputTag::new("isoMap"), iso_map);
        event.put(InputTag::new("rho"), 20f64);
        event
    }

    fn cut() -> CutApplicator {
        let mut cut = CutApplicator::PhoAnyPfIsoWithEa(
            crate::cuts::make_cut((1.0, 0.), (2.0, 0.), 0.1, false),
        );
        cut.set_consumes(&mut crate::event::ConsumesCollector::new());
        cut
    }

    #[test]
    fn selects_isolated_photons() {
        // Corrected isolations are 0.5, 2.5 and 1.5 against thresholds 1, 1, 2
        let photons = photons();
        let result = select(&cut(), &photons, &event(&[2.5, 4.5, 3.5])).unwrap();
        assert_eq!(result.decisions, [true, false, true]);
        assert_eq!(result.num_passed, 2);
        let passed = result.passed(&photons).map(Photon::key).collect::<Vec<_>>();
        assert_eq!(passed, [CandidateKey::new(3, 0), CandidateKey::new(3, 2)]);
    }

    #[test]
    fn missing_candidate_aborts() {
        let err = select(&cut(), &photons(), &event(&[2.5, 4.5])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::KeyNotFound("3:2".to_owned()))
        );
    }

    #[test]
    fn empty_event() {
        let result = select(&cut(), &[], &event(&[])).unwrap();
        assert!(result.decisions.is_empty());
        assert_eq!(result.num_passed, 0);
    }
}
