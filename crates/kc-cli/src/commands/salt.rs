//! Salt generation.

use kc_crypto::{MIN_SALT_BYTES, generate_salt};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::output::output_single;

#[derive(Debug, Serialize)]
struct SaltOutput {
    salt: String,
    bytes: usize,
}

/// Runs the salt command.
///
/// ## Errors
///
/// Returns [`crate::CliError::InvalidArgument`] for a length below the
/// minimum.
pub fn run_salt(length: usize, format: OutputFormat) -> crate::CliResult<()> {
    if length < MIN_SALT_BYTES {
        return Err(crate::CliError::InvalidArgument(format!(
            "salt length must be at least {MIN_SALT_BYTES} bytes"
        )));
    }

    let salt = generate_salt(length);
    match format {
        OutputFormat::Quiet => println!("{salt}"),
        _ => output_single(&SaltOutput { salt, bytes: length }, format)?,
    }
    Ok(())
}
