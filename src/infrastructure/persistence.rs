//! Persistence engine
//!
//! The whole catalog is stored as one JSON document: a `config` block with the
//! loan policy followed by one array per entity collection. Saving writes to a
//! sibling temporary file and renames it over the target after taking a
//! best-effort `.backup` copy of the previous contents. Loading decodes into a
//! staging catalog that replaces the live one only when every record decoded,
//! so a failed load leaves the caller's catalog as it was.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Normalized, PersistenceError, RecordError, ValidationWarning};
use crate::models::{LibraryEvent, Loan, LoanPolicy, Notification, Reservation, Resource, User};
use crate::services::Catalog;

const MAX_PATH_LEN: usize = 260;
const FORBIDDEN_PATH_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigBlock {
    max_renewals: u32,
    loan_period_days: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    max_renewals: Option<i64>,
    loan_period_days: Option<i64>,
}

#[derive(Serialize)]
struct CatalogDocument {
    config: ConfigBlock,
    users: Vec<Value>,
    resources: Vec<Value>,
    loans: Vec<Value>,
    reservations: Vec<Value>,
    notifications: Vec<Value>,
    events: Vec<Value>,
}

#[derive(Deserialize)]
struct ImportDocument {
    config: Option<Value>,
    users: Option<Vec<Value>>,
    resources: Option<Vec<Value>>,
    loans: Option<Vec<Value>>,
    reservations: Option<Vec<Value>>,
    notifications: Option<Vec<Value>>,
    events: Option<Vec<Value>>,
}

/// Reject empty or overlong paths and characters that are illegal on common filesystems
pub fn validate_path(path: &Path) -> Result<(), PersistenceError> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(PersistenceError::InvalidPath("path is empty".to_string()));
    }
    if text.chars().count() > MAX_PATH_LEN {
        return Err(PersistenceError::InvalidPath(format!(
            "path longer than {} characters",
            MAX_PATH_LEN
        )));
    }
    // Windows drive prefixes (`C:\`) are the one legal use of ':'
    let bytes = text.as_bytes();
    let has_drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/');
    let checked = if has_drive { &text[2..] } else { &text[..] };
    if let Some(c) = checked.chars().find(|c| FORBIDDEN_PATH_CHARS.contains(c)) {
        return Err(PersistenceError::InvalidPath(format!(
            "path contains forbidden character '{}'",
            c
        )));
    }
    Ok(())
}

/// Only `.json` and `.JSON` are accepted
pub fn validate_extension(path: &Path) -> Result<(), PersistenceError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("JSON") => Ok(()),
        other => Err(PersistenceError::InvalidExtension(format!(
            "expected .json, got {}",
            other.map(|e| format!(".{}", e)).unwrap_or_else(|| "no extension".to_string())
        ))),
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

pub fn backup_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".backup")
}

/// Copy a catalog file that failed to load to `<path>.unreadable` so later
/// saves and their `.backup` rotation cannot overwrite it.
pub fn preserve_unreadable(path: &Path) -> Result<PathBuf, PersistenceError> {
    let target = sibling_with_suffix(path, ".unreadable");
    fs::copy(path, &target).map_err(io_error(path))?;
    tracing::warn!("Kept unreadable catalog as {}", target.display());
    Ok(target)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn encode_all<T>(
    collection: &'static str,
    items: &[T],
    encode: impl Fn(&T) -> Result<Value, serde_json::Error>,
) -> Result<Vec<Value>, PersistenceError> {
    items
        .iter()
        .map(|item| {
            encode(item).map_err(|source| PersistenceError::Serialize { collection, source })
        })
        .collect()
}

fn build_document(catalog: &Catalog) -> Result<CatalogDocument, PersistenceError> {
    Ok(CatalogDocument {
        config: ConfigBlock {
            max_renewals: catalog.policy.max_renewals(),
            loan_period_days: catalog.policy.loan_period_days(),
        },
        users: encode_all("users", &catalog.users, User::to_document)?,
        resources: encode_all("resources", &catalog.resources, Resource::to_document)?,
        loans: encode_all("loans", &catalog.loans, Loan::to_document)?,
        reservations: encode_all(
            "reservations",
            &catalog.reservations,
            Reservation::to_document,
        )?,
        notifications: encode_all(
            "notifications",
            &catalog.notifications,
            Notification::to_document,
        )?,
        events: encode_all("events", &catalog.events, LibraryEvent::to_document)?,
    })
}

/// Write the whole catalog to `path`.
///
/// Any existing file is first copied to `<path>.backup`; a failed backup is
/// logged and does not stop the save.
pub fn save_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    validate_path(path)?;
    validate_extension(path)?;

    // 1. Encode everything before touching the disk
    let document = build_document(catalog)?;
    let json =
        serde_json::to_string_pretty(&document).map_err(|source| PersistenceError::Serialize {
            collection: "catalog",
            source,
        })?;

    // 2. Backup the previous file
    if path.exists() {
        let backup = backup_path(path);
        match fs::copy(path, &backup) {
            Ok(_) => tracing::debug!("Backup written to {}", backup.display()),
            Err(e) => tracing::warn!("Could not back up {}: {}", path.display(), e),
        }
    }

    // 3. Write to a temporary sibling, then move it into place
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let tmp = sibling_with_suffix(path, ".tmp");
    if let Err(e) = fs::write(&tmp, json) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(&tmp)(e));
    }
    fs::rename(&tmp, path).map_err(io_error(path))?;

    tracing::info!("Catalog saved to {} ({})", path.display(), catalog.summary());
    Ok(())
}

fn decode_all<T>(
    collection: &'static str,
    items: Option<Vec<Value>>,
    warnings: &mut Vec<ValidationWarning>,
    decode: impl Fn(&Value) -> Result<Normalized<T>, RecordError>,
) -> Result<Vec<T>, PersistenceError> {
    items
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let normalized = decode(item).map_err(|source| PersistenceError::Record {
                collection,
                index,
                source,
            })?;
            warnings.extend(normalized.warnings);
            Ok(normalized.value)
        })
        .collect()
}

fn decode_policy(
    config: Option<Value>,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<LoanPolicy, PersistenceError> {
    let stored: StoredConfig = match config {
        None | Some(Value::Null) => StoredConfig::default(),
        Some(value) => serde_json::from_value(value).map_err(|e| PersistenceError::Record {
            collection: "config",
            index: 0,
            source: RecordError::malformed("config", e),
        })?,
    };

    let mut policy = LoanPolicy::default();
    if let Some(max) = stored.max_renewals {
        warnings.extend(policy.set_max_renewals(max));
    }
    if let Some(days) = stored.loan_period_days {
        warnings.extend(policy.set_loan_period_days(days));
    }
    Ok(policy)
}

/// Replace the contents of `catalog` with the catalog stored at `path`.
///
/// On any error `catalog` is left untouched. Returns the normalization
/// warnings raised while decoding.
pub fn load_catalog(
    path: impl AsRef<Path>,
    catalog: &mut Catalog,
) -> Result<Vec<ValidationWarning>, PersistenceError> {
    let path = path.as_ref();
    validate_path(path)?;
    validate_extension(path)?;
    if !path.exists() {
        return Err(PersistenceError::NotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let document: ImportDocument = serde_json::from_str(&text).map_err(PersistenceError::Parse)?;

    // Policy first: loans are normalized against it
    let mut warnings = Vec::new();
    let policy = decode_policy(document.config, &mut warnings)?;

    let staged = Catalog {
        policy,
        users: decode_all("users", document.users, &mut warnings, User::from_document)?,
        resources: decode_all(
            "resources",
            document.resources,
            &mut warnings,
            Resource::from_document,
        )?,
        loans: decode_all("loans", document.loans, &mut warnings, |v| {
            Loan::from_document(v, &policy)
        })?,
        reservations: decode_all(
            "reservations",
            document.reservations,
            &mut warnings,
            Reservation::from_document,
        )?,
        notifications: decode_all("notifications", document.notifications, &mut warnings, |v| {
            Notification::from_document(v).map(Normalized::clean)
        })?,
        events: decode_all("events", document.events, &mut warnings, |v| {
            LibraryEvent::from_document(v).map(Normalized::clean)
        })?,
    };

    *catalog = staged;
    tracing::info!(
        "Catalog loaded from {} ({}, {} warnings)",
        path.display(),
        catalog.summary(),
        warnings.len()
    );
    Ok(warnings)
}
