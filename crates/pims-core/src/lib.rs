//! Record and natural-key types shared by the PIMS cleaner and importer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "pims-core";

/// Column names of the cleaned export.
pub mod columns {
    pub const TITLE: &str = "Title";
    pub const ORGANIZATION_NAME: &str = "Organization Name";
    pub const CITY: &str = "City";
    pub const PROVINCE: &str = "Province";
    pub const DATE: &str = "Date";
    pub const SUMMARY: &str = "Summary";
    pub const SOURCE_LINK: &str = "Source Link";
    pub const TOPICS: &str = "Topics";
    pub const ID: &str = "ID";
    pub const HAS_PHOTOS: &str = "Has Photos";
    pub const EVENT_TYPE: &str = "Event Type";
}

/// One cleaned export row, as the importer consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub source_id: String,
    pub title: String,
    pub organization_name: Option<String>,
    pub city: String,
    pub province: String,
    pub date: Option<NaiveDate>,
    pub summary: String,
    pub source_link: String,
    pub topics: Vec<String>,
    pub has_photos: bool,
    pub event_type: Option<String>,
}

impl CleanedRecord {
    pub fn location(&self) -> LocationKey {
        LocationKey {
            city: self.city.clone(),
            province: self.province.clone(),
        }
    }
}

/// Natural key of the `locations` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey {
    pub city: String,
    pub province: String,
}

impl LocationKey {
    /// Composite `City|Province` form used to collapse duplicate pairs.
    pub fn composite(&self) -> String {
        format!("{}|{}", self.city, self.province)
    }
}

/// Natural key of a `pims_main` entry. A null component still takes part in
/// equality, so two rows lacking a date collide when the rest matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub title: String,
    pub organization_id: Option<i32>,
    pub location_id: Option<i32>,
    pub date: Option<NaiveDate>,
}

/// Non-key entry columns. These travel together: a merge keeps one row's
/// content as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryContent {
    pub summary: String,
    pub source_link: String,
    pub has_photos: bool,
    pub event_type: Option<String>,
}

impl EntryContent {
    pub fn from_record(record: &CleanedRecord) -> Self {
        Self {
            summary: record.summary.clone(),
            source_link: record.source_link.clone(),
            has_photos: record.has_photos,
            event_type: record.event_type.clone(),
        }
    }
}

/// Deduplicated entry ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCandidate {
    pub key: EntryKey,
    pub content: EntryContent,
}

/// Storage id assigned (or matched) by an entry upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub id: i32,
    pub key: EntryKey,
}
