//! JSON tag sidecars stored next to media files.
//!
//! `photo.png` gets `photo.json` holding `{"tags": ["score__7", ...]}`. Any
//! other fields in the record are carried over untouched when tags are
//! rewritten.

use crate::config::SIDECAR_EXTENSION;
use crate::error::{AppError, Result};
use crate::file_utils::PathExt;
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persistence for the tags of a media file.
pub trait TagStore: Send + Sync {
    /// Tags of `media`, empty when none are stored or they cannot be read.
    fn load(&self, media: &Path) -> Vec<String>;
    /// Replaces the tags of `media`.
    fn save(&self, media: &Path, tags: &[String]) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SidecarRecord {
    tags: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Sidecar file for a media path: same directory, extension replaced.
pub fn sidecar_path(media: &Path) -> PathBuf {
    media.with_extension(SIDECAR_EXTENSION)
}

/// Tag store backed by `<stem>.json` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SidecarStore;

impl SidecarStore {
    pub fn new() -> Self {
        Self
    }

    fn read_record(path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Existing record to merge into. Unparsable tags are dropped but the
    /// remaining fields survive when the file is still a JSON object.
    fn existing_fields(path: &Path) -> Map<String, Value> {
        let text = match Self::read_record(path) {
            Ok(Some(text)) => text,
            Ok(None) => return Map::new(),
            Err(e) => {
                warn!("Could not read existing sidecar {}: {}", path.format_for_log(), e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(mut fields)) => {
                fields.remove("tags");
                fields
            }
            Ok(_) => {
                warn!("Sidecar {} is not a JSON object, replacing it", path.format_for_log());
                Map::new()
            }
            Err(e) => {
                warn!("Could not parse existing sidecar {}: {}", path.format_for_log(), e);
                Map::new()
            }
        }
    }
}

impl TagStore for SidecarStore {
    fn load(&self, media: &Path) -> Vec<String> {
        let path = sidecar_path(media);
        let text = match Self::read_record(&path) {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Error reading sidecar {}: {}", path.format_for_log(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(fields)) => match fields.get("tags") {
                Some(Value::Array(values)) => {
                    let tags: Vec<String> = values
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    if tags.len() != values.len() {
                        warn!("Skipped non-string tags in {}", path.format_for_log());
                    }
                    debug!("Loaded {} tags from {}", tags.len(), path.format_for_log());
                    tags
                }
                _ => {
                    warn!("Sidecar {} has no tags array", path.format_for_log());
                    Vec::new()
                }
            },
            Ok(_) => {
                error!("Sidecar {} is not a JSON object", path.format_for_log());
                Vec::new()
            }
            Err(e) => {
                error!("Error parsing sidecar {}: {}", path.format_for_log(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, media: &Path, tags: &[String]) -> Result<()> {
        let path = sidecar_path(media);
        let record = SidecarRecord {
            tags: tags.to_vec(),
            extra: Self::existing_fields(&path),
        };

        let sidecar_error = |message: String| AppError::Sidecar {
            path: path.clone(),
            message,
        };

        let json = serde_json::to_vec(&record).map_err(|e| sidecar_error(e.to_string()))?;

        // Write next to the target and rename over it so readers never see
        // a half-written record.
        let tmp = path.with_extension(format!("{}.tmp", SIDECAR_EXTENSION));
        fs::write(&tmp, json).map_err(|e| sidecar_error(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(sidecar_error(e.to_string()));
        }

        debug!("Saved {} tags to {}", tags.len(), path.format_for_log());
        Ok(())
    }
}
