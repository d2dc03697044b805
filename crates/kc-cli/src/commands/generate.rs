//! Pseudonym computation from explicit inputs.

use kc_crypto::HmacAlgorithm;
use kc_protocol_oidc::pairwise::{
    Pseudonym, SectorIdentifier, SectorMode, generate_salted, generate_sector_keyed,
};
use serde::Serialize;
use tracing::debug;

use crate::cli::{Convention, GenerateArgs};
use crate::config::OutputFormat;
use crate::output::output_single;

#[derive(Debug, Serialize)]
struct PseudonymOutput<'a> {
    pseudonym: &'a str,
    algorithm: &'static str,
    convention: &'static str,
    sector: &'a str,
}

/// Computes the pseudonym a mapper would issue for these inputs.
///
/// ## Errors
///
/// Returns the pairwise error for an unknown algorithm, an invalid sector
/// or a missing salt.
pub fn compute(args: &GenerateArgs, default_algorithm: HmacAlgorithm) -> crate::CliResult<(HmacAlgorithm, Pseudonym)> {
    let algorithm = match args.algorithm.as_deref() {
        Some(name) => HmacAlgorithm::from_name(name).map_err(kc_protocol_oidc::PairwiseError::from)?,
        None => default_algorithm,
    };

    let pseudonym = match args.convention {
        Convention::Salted => {
            let sector = SectorIdentifier::resolve(Some(args.sector.as_str()), SectorMode::StaticUri)?;
            generate_salted(algorithm, args.salt.as_deref(), &sector, &args.local_id)?
        }
        Convention::SectorKeyed => {
            if args.salt.is_some() {
                debug!("salt ignored by the sector-keyed convention");
            }
            let sector = SectorIdentifier::resolve(Some(args.sector.as_str()), SectorMode::Simple)?;
            generate_sector_keyed(algorithm, &sector, &args.local_id)?
        }
    };

    Ok((algorithm, pseudonym))
}

/// Runs the generate command.
///
/// ## Errors
///
/// See [`compute`].
pub fn run_generate(
    args: &GenerateArgs,
    default_algorithm: HmacAlgorithm,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let (algorithm, pseudonym) = compute(args, default_algorithm)?;

    match format {
        OutputFormat::Quiet => println!("{pseudonym}"),
        _ => output_single(
            &PseudonymOutput {
                pseudonym: pseudonym.as_str(),
                algorithm: algorithm.name(),
                convention: match args.convention {
                    Convention::Salted => "salted",
                    Convention::SectorKeyed => "sector-keyed",
                },
                sector: &args.sector,
            },
            format,
        )?,
    }
    Ok(())
}
