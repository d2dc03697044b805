//! Save-time validation of exported mapper configurations.
//!
//! The export is replayed into an [`InMemoryMapperStore`], so every mapper
//! goes through exactly the validation an administrator's save would.
//! Pseudonym list mappers are saved last so their references resolve.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use kc_core::PairwiseSettings;
use kc_protocol_oidc::pairwise::{PSEUDONYM_LIST_MAPPER_ID, keys};
use kc_protocol_oidc::{
    InMemoryMapperStore, MapperConfig, MapperOwner, OidcError, ProtocolMapperRegistry,
};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::config::OutputFormat;
use crate::output::{output, output_single, success, warning};

/// Mapper configurations of one realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperExport {
    /// Realm-level mappers.
    #[serde(default)]
    pub realm: Vec<MapperConfig>,

    /// Mappers per client ID.
    #[serde(default)]
    pub clients: BTreeMap<String, Vec<MapperConfig>>,
}

/// Outcome of one mapper.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ValidationRow {
    /// Owner, `realm` or `client:<id>`.
    #[tabled(rename = "Owner")]
    pub owner: String,
    /// Mapper name.
    #[tabled(rename = "Mapper")]
    pub mapper: String,
    /// Mapper type ID.
    #[tabled(rename = "Type")]
    pub mapper_type: String,
    /// `ok`, or the error message key.
    #[tabled(rename = "Result")]
    pub result: String,
    /// Error parameters or details.
    #[tabled(rename = "Detail")]
    pub detail: String,
}

impl ValidationRow {
    fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}

/// Validation results plus the normalized export.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// One row per mapper, in save order.
    pub rows: Vec<ValidationRow>,
    /// The accepted configurations as stored.
    pub normalized: MapperExport,
}

impl ValidationReport {
    /// Number of rejected mappers.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_ok()).count()
    }
}

fn is_list(config: &MapperConfig) -> bool {
    config.mapper_type == PSEUDONYM_LIST_MAPPER_ID
}

fn describe(error: &OidcError) -> (String, String) {
    match error.as_mapper_error() {
        Some(e) => (e.message_key().to_string(), e.parameters().join(", ")),
        None => (error.error_code().to_string(), error.to_string()),
    }
}

/// Replays `export` through save-time validation.
#[must_use]
pub fn validate_export(export: &MapperExport, settings: &PairwiseSettings) -> ValidationReport {
    let store = InMemoryMapperStore::new(
        Arc::new(ProtocolMapperRegistry::with_pairwise_mappers()),
        settings.clone(),
    );
    for client_id in export.clients.keys() {
        store.create_client(client_id.as_str());
    }

    let mut owned: Vec<(MapperOwner, &MapperConfig)> = export
        .realm
        .iter()
        .map(|m| (MapperOwner::Realm, m))
        .chain(export.clients.iter().flat_map(|(id, mappers)| {
            mappers.iter().map(move |m| (MapperOwner::Client(id.clone()), m))
        }))
        .collect();
    // Stable: keeps export order within each group.
    owned.sort_by_key(|(_, m)| is_list(m));

    let rows = owned
        .into_iter()
        .map(|(owner, config)| {
            let (result, detail) = match store.save(&owner, config.clone()) {
                Ok(_) => ("ok".to_string(), String::new()),
                Err(e) => describe(&e),
            };
            ValidationRow {
                owner: owner.to_string(),
                mapper: config.name.clone(),
                mapper_type: config.mapper_type.clone(),
                result,
                detail,
            }
        })
        .collect();

    let normalized = MapperExport {
        realm: store.list(&MapperOwner::Realm),
        clients: export
            .clients
            .keys()
            .map(|id| (id.clone(), store.list(&MapperOwner::Client(id.clone()))))
            .collect(),
    };

    ValidationReport { rows, normalized }
}

/// Replaces stored salts with a mask for display.
fn mask_salts(mut export: MapperExport) -> MapperExport {
    let configs = export
        .realm
        .iter_mut()
        .chain(export.clients.values_mut().flatten());
    for config in configs {
        if let Some(salt) = config.config.get_mut(keys::SALT) {
            "********".clone_into(salt);
        }
    }
    export
}

/// Runs the validate command.
///
/// JSON output is the normalized export, generated salts included, ready
/// to be imported. Table output masks salts.
///
/// ## Errors
///
/// Returns an error if the file cannot be read or parsed, and
/// [`crate::CliError::Validation`] if any mapper was rejected.
pub fn run_validate(file: &Path, settings: &PairwiseSettings, format: OutputFormat) -> crate::CliResult<()> {
    let content = std::fs::read_to_string(file)?;
    let export: MapperExport = serde_json::from_str(&content)?;
    let report = validate_export(&export, settings);

    match format {
        OutputFormat::Json => output_single(&report.normalized, format)?,
        OutputFormat::Table => {
            output(&report.rows, format, |_| String::new())?;
            println!();
            output_single(&mask_salts(report.normalized.clone()), format)?;
        }
        OutputFormat::Quiet => output(&report.rows, format, |row| {
            format!("{}\t{}\t{}", row.owner, row.mapper, row.result)
        })?,
    }

    let failures = report.failures();
    if failures > 0 {
        warning(&format!("{failures} of {} mapper(s) rejected", report.rows.len()));
        return Err(crate::CliError::Validation(failures));
    }
    if format == OutputFormat::Table {
        success(&format!("{} mapper(s) valid", report.rows.len()));
    }
    Ok(())
}
