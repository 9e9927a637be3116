//! Photon isolation cut with effective-area pile-up correction
//!
//!
//! # Introduction (for the physicist)
//!
//! Prompt photons are usually isolated, while photons from hadron decays sit
//! inside jets. Summing the particle-flow energy in a cone around a photon
//! candidate (its isolation) therefore tells the two apart. Overlapping
//! collisions (pile-up) add a diffuse energy density ρ to every cone, so the
//! isolation is corrected by subtracting ρ × A_eff, where the effective area
//! A_eff depends on the candidate's pseudorapidity.
//!
//! The cut then requires the corrected isolation, optionally divided by the
//! photon pT, to be below C1 + pT × C2, with separate coefficients for the
//! barrel and the endcaps of the calorimeter.
//!
//!
//! # Introduction (for the computer guy)
//!
//! * A `ParameterSet` configures a `CutApplicator` (the cut registry picks
//!   the implementation from the `cutName` parameter)
//! * The cut declares which per-event products it reads on a
//!   `ConsumesCollector`
//! * For each `Event`, the cut fetches its inputs once as a borrowed context,
//!   then every `Photon` is evaluated against that context without mutation.
//!   `selection::select` wraps that sequence, in parallel if the
//!   `multi-threading` feature is enabled.

#![warn(missing_docs)]

pub mod candidate;
pub mod config;
pub mod cuts;
pub mod effective_areas;
pub mod error;
pub mod event;
pub mod numeric;
pub mod selection;

pub use crate::{
    candidate::{CandidateKey, Photon},
    config::ParameterSet,
    cuts::{CandidateType, CutApplicator, EventContent, PhoAnyPfIsoWithEaCut},
    effective_areas::EffectiveAreas,
    error::Error,
    event::{ConsumesCollector, Event, InputTag, ValueMap},
    numeric::Float,
    selection::{select, SelectionResult},
};

/// We'll use eyre's type-erased result type throughout the crate
pub type Result<T> = eyre::Result<T>;
