//! Axis identifiers and their serialized short names.

use serde::{Deserialize, Serialize};

/// Axes addressed by a codeword entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Imaging / hybridization round.
    Round,
    /// Fluorescence channel.
    Channel,
}

/// Returns the short name used for an axis in the codebook JSON schema.
pub fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::Round => "r",
        Axis::Channel => "c",
    }
}

/// Gene label assigned to features that could not be decoded.
pub const NO_GENE: &str = "None";
