//! Import run lifecycle
//!
//! An import run progresses through defined states:
//! PENDING → PROCESSING → COMPLETED | FAILED

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Import run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportRunStatus {
    /// Run created, document attached, waiting for the job
    Pending,
    /// Import job picked up the run
    Processing,
    /// Import finished; counters are final
    Completed,
    /// Import aborted; error_message describes the fault
    Failed,
}

impl ImportRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportRunStatus::Pending => "pending",
            ImportRunStatus::Processing => "processing",
            ImportRunStatus::Completed => "completed",
            ImportRunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ImportRunStatus::Pending),
            "processing" => Some(ImportRunStatus::Processing),
            "completed" => Some(ImportRunStatus::Completed),
            "failed" => Some(ImportRunStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states never transition again within the same run
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportRunStatus::Completed | ImportRunStatus::Failed)
    }
}

/// Aggregate counters for one import pass
///
/// Written once, at the end of a successful pass; never partially updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    pub created_restaurants: u64,
    pub created_menus: u64,
    pub created_menu_items: u64,
    pub linked_menu_items: u64,
    pub failed_restaurants: u64,
    pub failed_menus: u64,
    pub failed_menu_items: u64,
    pub failed_links: u64,
}

impl ImportCounts {
    /// True when no record failed at any level
    pub fn is_clean(&self) -> bool {
        self.failed_restaurants == 0
            && self.failed_menus == 0
            && self.failed_menu_items == 0
            && self.failed_links == 0
    }
}

/// Persisted import run record
#[derive(Debug, Clone, Serialize)]
pub struct ImportRun {
    pub id: Uuid,
    pub status: ImportRunStatus,
    /// Attached JSON document text, None when nothing was attached
    #[serde(skip_serializing)]
    pub document: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub counts: ImportCounts,
    pub created_at: DateTime<Utc>,
}

impl ImportRun {
    /// Create a new pending run with an attached document
    pub fn new(document: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: ImportRunStatus::Pending,
            document,
            started_at: None,
            finished_at: None,
            error_message: None,
            counts: ImportCounts::default(),
            created_at: Utc::now(),
        }
    }
}
