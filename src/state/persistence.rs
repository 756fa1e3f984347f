use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::document::{CanvasSize, Document};
use crate::element::CanvasElement;
use crate::grid::{FREE_TEMPLATE_ID, GridLayout};
use crate::id_generator::ElementId;
use crate::util::time;

/// Errors that can occur during state persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize state: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write state: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read state file: {0}")]
    ReadError(String),

    #[error("Invalid state data: {0}")]
    InvalidState(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAssignment {
    pub zone_id: String,
    pub element_id: ElementId,
}

/// Serializable copy of a document: canvas, elements (rasters as base64
/// PNG) and grid assignments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Version of the crate that wrote the snapshot
    pub version: String,
    /// Seconds since the epoch
    pub timestamp: u64,
    pub canvas: CanvasSize,
    pub elements: Vec<CanvasElement>,
    #[serde(default = "free_template_id")]
    pub template_id: String,
    #[serde(default)]
    pub assignments: Vec<ZoneAssignment>,
}

fn free_template_id() -> String {
    FREE_TEMPLATE_ID.to_owned()
}

impl DocumentSnapshot {
    pub fn capture(document: &Document) -> Self {
        let grid = document.grid();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: time::timestamp_secs(),
            canvas: document.canvas(),
            elements: document.elements().to_vec(),
            template_id: grid.template().id.to_owned(),
            assignments: grid
                .zones()
                .iter()
                .filter_map(|zone| {
                    zone.element_id.as_ref().map(|element_id| ZoneAssignment {
                        zone_id: zone.id().to_owned(),
                        element_id: element_id.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Rebuild the document. Duplicate ids and unknown templates are
    /// rejected; assignments to missing zones or elements are dropped.
    pub fn restore(self) -> PersistenceResult<Document> {
        if self.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Snapshot version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        let mut seen = HashSet::new();
        for element in &self.elements {
            if !seen.insert(&element.id) {
                return Err(PersistenceError::InvalidState(format!("duplicate element id {}", element.id)));
            }
        }

        let mut grid = GridLayout::new();
        grid.select_template(&self.template_id)
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;
        for assignment in self.assignments {
            if !seen.contains(&assignment.element_id) {
                log::warn!("Dropping assignment of missing element {}", assignment.element_id);
                continue;
            }
            if !grid.restore_assignment(&assignment.zone_id, assignment.element_id) {
                log::warn!("Dropping assignment to unknown zone {}", assignment.zone_id);
            }
        }

        log::info!("Restored snapshot with {} elements", self.elements.len());
        Ok(Document::from_parts(self.canvas, self.elements, grid))
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Named snapshots stored as JSON files in one directory
#[derive(Debug, Clone)]
pub struct StatePersistence {
    state_dir: PathBuf,
}

impl StatePersistence {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        Path::new(&self.state_dir).join(format!("{}.json", name))
    }

    pub fn save_snapshot(&self, document: &Document, name: &str) -> PersistenceResult<PathBuf> {
        let snapshot = DocumentSnapshot::capture(document);
        let path = self.path(name);

        fs::create_dir_all(&self.state_dir)?;
        fs::write(&path, snapshot.to_json()?)?;
        log::info!("Saved snapshot {}", path.display());
        Ok(path)
    }

    pub fn load_snapshot(&self, name: &str) -> PersistenceResult<DocumentSnapshot> {
        let json = fs::read_to_string(self.path(name)).map_err(|e| PersistenceError::ReadError(e.to_string()))?;
        DocumentSnapshot::from_json(&json)
    }
}
