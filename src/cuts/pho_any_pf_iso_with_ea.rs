//! Cut on the particle-flow isolation of photons, corrected for pile-up with
//! effective areas

use crate::{
    candidate::Photon,
    config::ParameterSet,
    effective_areas::EffectiveAreas,
    event::{ConsumesCollector, Event, InputTag, Token, ValueMap},
    numeric::{from_f32, from_f64, Float},
    Result,
};

use eyre::WrapErr;
use num_traits::Zero;
use prefix_num_ops::real::*;

use std::collections::BTreeMap;

/// Name under which the isolation map is known among the cut's inputs
const ANY_PF_ISO_WITH_EA: &str = "anyPFIsoWithEA";

/// Name under which the pile-up density is known among the cut's inputs
const RHO: &str = "rho";

/// Isolation cut with a pT-dependent threshold, separate for barrel and endcap
///
/// A photon passes if its pile-up corrected isolation (optionally divided by
/// its pT) is below C1 + pT × C2, with the (C1, C2) pair of the detector
/// region where its supercluster lies.
///
#[derive(Debug)]
pub struct PhoAnyPfIsoWithEaCut {
    /// Name of this cut in the configuration
    name: String,

    /// Constant term of the threshold in the barrel
    c1_eb: Float,

    /// pT slope of the threshold in the barrel
    c2_eb: Float,

    /// Constant term of the threshold in the endcaps
    c1_ee: Float,

    /// pT slope of the threshold in the endcaps
    c2_ee: Float,

    /// Supercluster |eta| from which candidates are in the endcaps
    barrel_cut_off: Float,

    /// Truth that the isolation is divided by pT before cutting
    use_relative_iso: bool,

    /// Effective areas for the pile-up correction
    effective_areas: EffectiveAreas,

    /// Input tags of the per-event data, by input name
    content_tags: BTreeMap<&'static str, InputTag>,

    /// Isolation map token, once the inputs have been declared
    iso_token: Option<Token<ValueMap<f32>>>,

    /// Pile-up density token, once the inputs have been declared
    rho_token: Option<Token<f64>>,
}

/// Per-event inputs of the cut, borrowed from the event being processed
#[derive(Clone, Copy, Debug)]
pub struct IsolationInputs<'ev> {
    /// Uncorrected isolation of each photon
    pub iso_map: &'ev ValueMap<f32>,

    /// Pile-up energy density of the event
    pub rho: f64,
}

/// Pile-up subtracted isolation, never below zero
pub fn pile_up_corrected(raw_iso: Float, rho: Float, effective_area: Float) -> Float {
    let corrected = raw_iso - rho * effective_area;
    if corrected > Float::zero() {
        corrected
    } else {
        Float::zero()
    }
}

impl PhoAnyPfIsoWithEaCut {
    /// Name under which this cut is registered
    pub const CUT_NAME: &'static str = "PhoAnyPFIsoWithEACut";

    /// Configure the cut from its parameters
    pub fn new(params: &ParameterSet) -> Result<Self> {
        let eff_areas_file = params.get_file_in_path("effAreasConfigFile")?;
        let effective_areas = EffectiveAreas::load(&eff_areas_file)?;

        let mut content_tags = BTreeMap::new();
        content_tags.insert(ANY_PF_ISO_WITH_EA, params.get_input_tag("anyPFIsoMap")?);
        content_tags.insert(RHO, params.get_input_tag("rho")?);

        let cut = Self {
            name: params.get_string("cutName")?,
            c1_eb: params.get_float("anyPFIsoWithEACutValue_C1_EB")?,
            c2_eb: params.get_float("anyPFIsoWithEACutValue_C2_EB")?,
            c1_ee: params.get_float("anyPFIsoWithEACutValue_C1_EE")?,
            c2_ee: params.get_float("anyPFIsoWithEACutValue_C2_EE")?,
            barrel_cut_off: params.get_float("barrelCutOff")?,
            use_relative_iso: params.get_bool("useRelativeIso")?,
            effective_areas,
            content_tags,
            iso_token: None,
            rho_token: None,
        };
        cut.print();
        Ok(cut)
    }

    /// Name of this cut in the configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare the per-event data that this cut is going to read
    pub fn set_consumes(&mut self, cc: &mut ConsumesCollector) {
        self.iso_token = Some(cc.consumes(self.content_tags[ANY_PF_ISO_WITH_EA].clone()));
        self.rho_token = Some(cc.consumes(self.content_tags[RHO].clone()));
    }

    /// Fetch the inputs of the cut from the current event
    pub fn event_content<'ev>(&self, event: &'ev Event) -> Result<IsolationInputs<'ev>> {
        // Use the tokens if the inputs were declared, the labels otherwise
        let iso_map = match &self.iso_token {
            Some(token) => event.get_by_token(token),
            None => event.get_by_label::<ValueMap<f32>>(&self.content_tags[ANY_PF_ISO_WITH_EA]),
        }
        .wrap_err_with(|| format!("{} could not fetch its isolation map", self.name))?;
        let rho = *match &self.rho_token {
            Some(token) => event.get_by_token(token),
            None => event.get_by_label::<f64>(&self.content_tags[RHO]),
        }
        .wrap_err_with(|| format!("{} could not fetch the pile-up density", self.name))?;
        log::debug!("{}: rho = {rho}, {} isolation values", self.name, iso_map.len());
        Ok(IsolationInputs { iso_map, rho })
    }

    /// Isolation threshold for a candidate at a certain |eta| and pT
    pub fn threshold(&self, abs_eta: Float, pt: Float) -> Float {
        if abs_eta < self.barrel_cut_off {
            self.c1_eb + pt * self.c2_eb
        } else {
            self.c1_ee + pt * self.c2_ee
        }
    }

    /// Pile-up corrected isolation of a candidate, relative to its pT if so
    /// configured. This is the quantity that gets compared to the threshold.
    pub fn value(&self, photon: &Photon, inputs: &IsolationInputs) -> Result<Float> {
        let abs_eta = abs(photon.sc_eta());
        let raw_iso = from_f32(inputs.iso_map.get(photon.key())?);
        let effective_area = self.effective_areas.effective_area(abs_eta);
        let iso = pile_up_corrected(raw_iso, from_f64(inputs.rho), effective_area);
        if self.use_relative_iso {
            Ok(iso / photon.pt())
        } else {
            Ok(iso)
        }
    }

    /// Decide whether a photon passes the cut
    pub fn evaluate(&self, photon: &Photon, inputs: &IsolationInputs) -> Result<bool> {
        let threshold = self.threshold(abs(photon.sc_eta()), photon.pt());
        let iso = self.value(photon, inputs)?;
        let pass = iso < threshold;
        log::trace!(
            "{}: photon {} with pT={} has isolation {iso} vs threshold {threshold} => {}",
            self.name,
            photon.key(),
            photon.pt(),
            if pass { "pass" } else { "fail" }
        );
        Ok(pass)
    }

    /// Log the configuration of the cut
    pub fn print(&self) {
        log::info!("{} ({})", self.name, Self::CUT_NAME);
        log::info!("  C1_EB          : {}", self.c1_eb);
        log::info!("  C2_EB          : {}", self.c2_eb);
        log::info!("  C1_EE          : {}", self.c1_ee);
        log::info!("  C2_EE          : {}", self.c2_ee);
        log::info!("  barrelCutOff   : {}", self.barrel_cut_off);
        log::info!("  useRelativeIso : {}", self.use_relative_iso);
        for (name, tag) in &self.content_tags {
            log::info!("  {name:<15}: {tag}");
        }
    }
}
