//! This module defines the reconstructed photon candidates that cuts act on

use crate::numeric::Float;

use nalgebra::Point3;
use prefix_num_ops::real::*;

use std::fmt::{self, Display};

/// Identity of a candidate: the collection it belongs to and its index there
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey {
    /// Identifier of the candidate collection
    pub product_id: u32,

    /// Index of the candidate in its collection
    pub index: usize,
}
//
impl CandidateKey {
    /// Designate the index-th candidate of a collection
    pub fn new(product_id: u32, index: usize) -> Self {
        Self { product_id, index }
    }
}
//
impl Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.product_id, self.index)
    }
}

/// Reconstructed photon candidate
#[derive(Clone, Debug, PartialEq)]
pub struct Photon {
    /// Identity of this candidate, used to look up per-candidate values
    key: CandidateKey,

    /// Transverse momentum (GeV)
    pt: Float,

    /// Position of the supercluster (cm, beam along z)
    sc_position: Point3<Float>,
}
//
impl Photon {
    /// Describe a photon candidate
    pub fn new(key: CandidateKey, pt: Float, sc_position: Point3<Float>) -> Self {
        Self {
            key,
            pt,
            sc_position,
        }
    }

    /// Build a candidate whose supercluster sits at pseudorapidity `eta` on a
    /// cylinder of unit radius, which is handy when only eta matters
    pub fn at_eta(key: CandidateKey, pt: Float, eta: Float) -> Self {
        Self::new(key, pt, Point3::new(1., 0., eta.sinh()))
    }

    /// Identity of this candidate
    pub fn key(&self) -> CandidateKey {
        self.key
    }

    /// Transverse momentum (GeV)
    pub fn pt(&self) -> Float {
        self.pt
    }

    /// Position of the supercluster
    pub fn sc_position(&self) -> &Point3<Float> {
        &self.sc_position
    }

    /// Pseudorapidity of the supercluster position
    ///
    /// Computed as ½·ln((r + z) / (r - z)), which is -ln(tan(θ/2)) without
    /// the trigonometry. Positions on the beam axis give ±infinity.
    pub fn sc_eta(&self) -> Float {
        let z = self.sc_position.z;
        let r = self.sc_position.coords.norm();
        if r == 0. {
            return 0.;
        }
        let sign = if z < 0. { -1. } else { 1. };
        let z = abs(z);
        // Keep the denominator away from cancellation for large eta
        let rho = sqrt(self.sc_position.x.powi(2) + self.sc_position.y.powi(2));
        sign * ln((r + z) / rho)
    }
}
