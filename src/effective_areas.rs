//! Effective areas, which convert the pile-up energy density of an event into
//! the isolation contribution to be subtracted from each candidate

use crate::{error::Error, numeric::Float, Result};

use eyre::WrapErr;
use prefix_num_ops::real::*;

use std::{fs, path::Path};

/// One |eta| bin of the effective area table
#[derive(Clone, Copy, Debug, PartialEq)]
struct EtaBin {
    /// Lower |eta| edge (inclusive)
    abs_eta_min: Float,

    /// Upper |eta| edge (exclusive)
    abs_eta_max: Float,

    /// Effective area within the bin
    effective_area: Float,
}

/// Table of effective areas in contiguous bins of |eta|
///
/// The text format has one bin per line, given as three numbers: lower |eta|
/// edge, upper |eta| edge, effective area. Blank lines and lines starting
/// with `#` are ignored, as are any extra columns.
///
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveAreas {
    /// Where the table came from, for error and log messages
    source: String,

    /// Bins, sorted by increasing |eta|
    bins: Vec<EtaBin>,
}
//
impl EffectiveAreas {
    /// Load and check an effective area table from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read effective areas from {}", path.display()))?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Parse and check an effective area table, `source` naming its origin
    pub fn parse(source: &str, text: &str) -> Result<Self> {
        // Reporting helper
        let malformed = |reason: String| -> eyre::Report {
            Error::MalformedEffectiveAreas {
                file: source.to_owned(),
                reason,
            }
            .into()
        };

        // Decode the bins
        let mut bins = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_num = line_idx + 1;
            let mut columns = line.split_whitespace().map(str::parse::<Float>);
            let mut next_column = |what: &str| match columns.next() {
                Some(Ok(x)) => Ok(x),
                Some(Err(e)) => Err(malformed(format!("line {line_num}: bad {what} ({e})"))),
                None => Err(malformed(format!("line {line_num}: missing {what}"))),
            };
            bins.push(EtaBin {
                abs_eta_min: next_column("|eta| lower edge")?,
                abs_eta_max: next_column("|eta| upper edge")?,
                effective_area: next_column("effective area")?,
            });
        }

        // Check that the bins make sense
        if bins.is_empty() {
            return Err(malformed("no |eta| bin".to_owned()));
        }
        for (idx, bin) in bins.iter().enumerate() {
            if !(bin.abs_eta_min >= 0. && bin.abs_eta_min < bin.abs_eta_max) {
                return Err(malformed(format!(
                    "bin {idx} has invalid |eta| range [{}, {})",
                    bin.abs_eta_min, bin.abs_eta_max
                )));
            }
            if idx > 0 && bin.abs_eta_min != bins[idx - 1].abs_eta_max {
                return Err(malformed(format!(
                    "bin {idx} starts at |eta|={} but bin {} ends at |eta|={}",
                    bin.abs_eta_min,
                    idx - 1,
                    bins[idx - 1].abs_eta_max
                )));
            }
        }

        let areas = Self {
            source: source.to_owned(),
            bins,
        };
        areas.print();
        Ok(areas)
    }

    /// Effective area for a candidate at pseudorapidity `eta`
    ///
    /// Candidates outside of the table's |eta| range get no correction.
    pub fn effective_area(&self, eta: Float) -> Float {
        let abs_eta = abs(eta);
        self.bins
            .iter()
            .find(|bin| abs_eta >= bin.abs_eta_min && abs_eta < bin.abs_eta_max)
            .map_or(0., |bin| bin.effective_area)
    }

    /// Number of |eta| bins
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Log the contents of the table
    pub fn print(&self) {
        log::info!("Effective areas from {}:", self.source);
        log::info!("  eta_min   eta_max    effective area");
        for bin in &self.bins {
            log::info!(
                "  {:>7.4}   {:>7.4}   {:>10.4}",
                bin.abs_eta_min,
                bin.abs_eta_max,
                bin.effective_area
            );
        }
    }
}
