//! Algorithm catalog listing.

use kc_crypto::HmacAlgorithm;
use serde::Serialize;
use tabled::Tabled;

use crate::config::OutputFormat;
use crate::output::output;

/// One catalog entry.
#[derive(Debug, Serialize, Tabled)]
pub struct AlgorithmRow {
    /// JCA name.
    #[tabled(rename = "Algorithm")]
    pub name: &'static str,
    /// Digest length in bits.
    #[tabled(rename = "Digest bits")]
    pub digest_bits: usize,
    /// Whether the digest is considered legacy.
    #[tabled(rename = "Legacy")]
    pub legacy: bool,
    /// Whether it is the configured default.
    #[tabled(rename = "Default")]
    pub default: bool,
}

/// Builds the catalog rows, flagging `default`.
#[must_use]
pub fn algorithm_rows(default: HmacAlgorithm) -> Vec<AlgorithmRow> {
    HmacAlgorithm::ALL
        .iter()
        .map(|&alg| AlgorithmRow {
            name: alg.name(),
            digest_bits: alg.output_len() * 8,
            legacy: alg.is_legacy(),
            default: alg == default,
        })
        .collect()
}

/// Runs the algorithms command.
///
/// ## Errors
///
/// Returns an error if output fails.
pub fn run_algorithms(default: HmacAlgorithm, format: OutputFormat) -> crate::CliResult<()> {
    output(&algorithm_rows(default), format, |row| row.name.to_string())
}
