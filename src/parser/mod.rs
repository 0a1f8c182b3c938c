pub mod disclaimer;
pub mod error;
pub mod geocode;
pub mod header;
pub mod priority;
pub mod rows;
pub mod tables;

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::html;
use crate::record::{IncidentRecord, IncidentSet};
use error::ExtractError;
use geocode::{Checksum, Crc32};
use tables::RawTable;

/// Six-stage pipeline: select → header → rows → disclaimers → priority → geocode.
pub fn extract_incidents<C: Checksum + ?Sized>(
    tables: &[RawTable],
    cfg: &EngineConfig,
    checksum: &C,
) -> Result<Vec<IncidentRecord>, ExtractError> {
    let table = tables::select_table(tables)?;
    debug!("Selected table with {} rows out of {}", table.row_count(), tables.len());

    let resolved = header::resolve_header(table);
    if let Some(w) = &resolved.warning {
        info!("{}; using {} synthetic columns", w, resolved.header.width());
    }

    let body = &table.rows[resolved.consumed..];
    let mut records = rows::normalize_rows(body, &resolved.header, cfg, resolved.consumed);
    debug!("Normalized {} of {} rows", records.len(), body.len());

    if cfg.dedupe {
        let before = records.len();
        records = rows::dedupe(records);
        debug!("Dedupe dropped {} records", before - records.len());
    }

    let before = records.len();
    let mut records = disclaimer::filter_disclaimers(records, &cfg.banned_substrings);
    debug!("Disclaimer filter dropped {} records", before - records.len());

    priority::classify(&mut records, &cfg.keywords);
    geocode::assign_locations(&mut records, &cfg.bbox, checksum);
    Ok(records)
}

/// Run the pipeline and never fail: degradations give an empty set,
/// unexpected failures give an empty set carrying the error message.
///
/// `input` is `Err(ExtractError::Fetch(..))` when the page could not be loaded.
pub fn run_pipeline(input: Result<Vec<RawTable>, ExtractError>, cfg: &EngineConfig) -> IncidentSet {
    run_pipeline_with(input, cfg, &Crc32)
}

pub fn run_pipeline_with<C: Checksum + ?Sized>(
    input: Result<Vec<RawTable>, ExtractError>,
    cfg: &EngineConfig,
    checksum: &C,
) -> IncidentSet {
    let tables = match input {
        Ok(t) => t,
        Err(e) if e.is_recoverable() => {
            info!("{}; returning no incidents", e);
            return IncidentSet::empty();
        }
        Err(e) => return IncidentSet::failed(e.to_string()),
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| extract_incidents(&tables, cfg, checksum)));

    match outcome {
        Ok(Ok(records)) => {
            let set = IncidentSet::new(records);
            info!(
                "Extracted {} incidents ({} priority)",
                set.total_incidents, set.priority_count
            );
            set
        }
        Ok(Err(e)) if e.is_recoverable() => {
            info!("{}; returning no incidents", e);
            IncidentSet::empty()
        }
        Ok(Err(e)) => {
            warn!("Extraction failed: {}", e);
            IncidentSet::failed(e.to_string())
        }
        Err(payload) => {
            let e = ExtractError::Internal(panic_message(payload.as_ref()));
            warn!("Extraction failed: {}", e);
            IncidentSet::failed(e.to_string())
        }
    }
}

/// Parse a saved or fetched page and extract its incidents.
pub fn process_html(page: &str, cfg: &EngineConfig) -> IncidentSet {
    run_pipeline(Ok(html::parse_tables(page)), cfg)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ── Tests ──
