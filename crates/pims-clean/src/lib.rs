//! Normalization of raw PIMS exports into the cleaned schema.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pims_core::columns;
use pims_table::{read_table, write_table_atomic, DelimitedTable, TableError};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};
use uuid::Uuid;

pub mod literal;

pub use literal::{format_string_list, parse_string_list, LiteralError};

pub const CRATE_NAME: &str = "pims-clean";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(st|nd|rd|th)").unwrap());
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s\-.,:]").unwrap());

const MONTHS: [(&str, &str); 12] = [
    ("January", "01"),
    ("February", "02"),
    ("March", "03"),
    ("April", "04"),
    ("May", "05"),
    ("June", "06"),
    ("July", "07"),
    ("August", "08"),
    ("September", "09"),
    ("October", "10"),
    ("November", "11"),
    ("December", "12"),
];

// Full names first so abbreviations never split a longer word.
const WEEKDAYS: [&str; 16] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "Tues",
    "Thurs", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun",
];

const NUMERIC_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const NUMERIC_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %m %Y"];
const MONTH_FIRST_FORMATS: [&str; 2] = ["%m %d %Y", "%m %d, %Y"];
const DAY_FIRST_FORMATS: [&str; 2] = ["%d %m %Y", "%d %m, %Y"];

/// Raw column names that are renamed onto a canonical column.
pub const COLUMN_ALIASES: [(&str, &str); 3] = [
    ("City2", columns::CITY),
    ("Province2", columns::PROVINCE),
    ("Date(s)", columns::DATE),
];

pub const REQUIRED_COLUMNS: [&str; 7] = [
    columns::TITLE,
    columns::ORGANIZATION_NAME,
    columns::CITY,
    columns::PROVINCE,
    columns::DATE,
    columns::SUMMARY,
    columns::TOPICS,
];

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("raw export not found: {0}")]
    MissingInput(PathBuf),
    #[error("raw export has no {0:?} column")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Spreadsheet exports spell an empty cell several ways.
pub fn is_missing(cell: &str) -> bool {
    matches!(
        cell,
        "" | "NA" | "N/A" | "NaN" | "nan" | "NULL" | "null" | "#N/A"
    )
}

fn present(cell: &str) -> Option<&str> {
    (!is_missing(cell)).then_some(cell)
}

fn strip_list_punctuation(item: &str) -> String {
    item.chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
        .collect::<String>()
        .trim()
        .to_string()
}

fn list_items(raw: &str) -> Vec<String> {
    parse_string_list(raw).unwrap_or_else(|_| raw.split(',').map(str::to_string).collect())
}

/// A value encoded as a list literal yields its first element; anything else
/// passes through unchanged.
pub fn clean_organization_name(raw: &str) -> String {
    if !raw.starts_with('[') {
        return raw.to_string();
    }
    list_items(raw)
        .first()
        .map(|first| strip_list_punctuation(first))
        .unwrap_or_else(|| raw.to_string())
}

pub fn clean_summary(raw: Option<&str>) -> String {
    let Some(text) = raw else {
        return String::new();
    };
    let text = TAG_RE.replace_all(text, "");
    let text = text.replace("&#58;", ":");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Where a spelled-out month sat relative to the day number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonthPosition {
    Numeric,
    BeforeDay,
    AfterDay,
}

fn normalize_with_position(raw: &str) -> (String, MonthPosition) {
    let mut text = ORDINAL_RE.replace_all(raw.trim(), "$1").into_owned();
    for weekday in WEEKDAYS {
        text = text.replace(weekday, "");
    }

    let name_at = MONTHS
        .iter()
        .filter_map(|(name, _)| text.find(&name[..3]))
        .min();
    let digit_at = text.find(|c: char| c.is_ascii_digit());
    let position = match (name_at, digit_at) {
        (None, _) => MonthPosition::Numeric,
        (Some(name), Some(digit)) if digit < name => MonthPosition::AfterDay,
        (Some(_), _) => MonthPosition::BeforeDay,
    };

    for (name, number) in MONTHS {
        text = text.replace(name, number);
        if name == "September" {
            text = text.replace("Sept", number);
        }
        text = text.replace(&name[..3], number);
    }
    let text = WHITESPACE_RE.replace_all(&text, " ").replace(" ,", ",");
    let text = text
        .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .to_string();
    (text, position)
}

/// Rewrite a free-form date into numeric tokens: ordinal suffixes and weekday
/// names are dropped, month names become two-digit numbers.
pub fn normalize_date_text(raw: &str) -> String {
    normalize_with_position(raw).0
}

fn first_match(text: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_normalized_date(text: &str, position: MonthPosition) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    let full = match position {
        MonthPosition::Numeric => NUMERIC_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(|dt| dt.date())
            .or_else(|| first_match(text, &NUMERIC_DATE_FORMATS)),
        MonthPosition::BeforeDay => first_match(text, &MONTH_FIRST_FORMATS),
        MonthPosition::AfterDay => first_match(text, &DAY_FIRST_FORMATS),
    };
    if full.is_some() {
        return full;
    }
    // Month-and-year or a bare year resolve to the first day.
    let first_of_month = format!("1 {text}");
    if let Some(date) = first_match(&first_of_month, &["%d %m %Y", "%d %m, %Y", "%d %m/%Y"]) {
        return Some(date);
    }
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        return text
            .parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }
    None
}

/// Parse a free-form date. Anything unparseable yields `None`; it is never an
/// error. Idempotent on its own `%Y-%m-%d` output.
pub fn clean_date(raw: Option<&str>) -> Option<NaiveDate> {
    let (text, position) = normalize_with_position(raw?);
    parse_normalized_date(&text, position)
}

/// Parse a topic list. The list-literal form is tried first, then a plain
/// comma split. Empty elements are dropped.
pub fn clean_topics(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    list_items(raw)
        .iter()
        .map(|item| strip_list_punctuation(item))
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn clean_location(raw: Option<&str>) -> String {
    raw.map(|loc| LOCATION_RE.replace_all(loc, "").trim().to_string())
        .unwrap_or_default()
}

/// Keep only letters, digits, whitespace, hyphen, period, comma and colon.
pub fn restrict_text(raw: &str) -> String {
    TEXT_RE.replace_all(raw, "").trim().to_string()
}

/// Rename alias columns onto their canonical names. When both exist the
/// alias wins and the canonical column is dropped.
pub fn resolve_aliases(mut table: DelimitedTable) -> DelimitedTable {
    for (alias, canonical) in COLUMN_ALIASES {
        if table.column(alias).is_none() {
            continue;
        }
        if let Some(dropped) = table.column(canonical) {
            table.headers.remove(dropped);
            for row in &mut table.rows {
                row.remove(dropped);
            }
        }
        if let Some(idx) = table.column(alias) {
            table.headers[idx] = canonical.to_string();
        }
    }
    table
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub total_rows: usize,
    pub empty_cells: BTreeMap<String, usize>,
    pub unparsed_dates: usize,
    pub rows_without_topics: usize,
}

#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: DelimitedTable,
    pub stats: CleanStats,
}

struct ColumnIndex {
    title: usize,
    organization: usize,
    city: usize,
    province: usize,
    date: usize,
    summary: usize,
    topics: usize,
    has_photos: usize,
    event_type: usize,
}

fn require(table: &DelimitedTable, name: &'static str) -> Result<usize, CleanError> {
    table.column(name).ok_or(CleanError::MissingColumn(name))
}

fn ensure_column(table: &mut DelimitedTable, name: &str) -> usize {
    if let Some(idx) = table.column(name) {
        return idx;
    }
    table.headers.push(name.to_string());
    for row in &mut table.rows {
        row.push(String::new());
    }
    table.headers.len() - 1
}

/// Normalize every row of a raw export into the cleaned schema.
pub fn clean_table(table: DelimitedTable) -> Result<CleanOutcome, CleanError> {
    let mut table = resolve_aliases(table);
    for name in REQUIRED_COLUMNS {
        require(&table, name)?;
    }
    let has_photos = ensure_column(&mut table, columns::HAS_PHOTOS);
    let event_type = ensure_column(&mut table, columns::EVENT_TYPE);
    let idx = ColumnIndex {
        title: require(&table, columns::TITLE)?,
        organization: require(&table, columns::ORGANIZATION_NAME)?,
        city: require(&table, columns::CITY)?,
        province: require(&table, columns::PROVINCE)?,
        date: require(&table, columns::DATE)?,
        summary: require(&table, columns::SUMMARY)?,
        topics: require(&table, columns::TOPICS)?,
        has_photos,
        event_type,
    };

    let mut stats = CleanStats {
        total_rows: table.rows.len(),
        ..CleanStats::default()
    };

    for row in &mut table.rows {
        let raw_date = present(&row[idx.date]).map(str::to_string);
        let date = clean_date(raw_date.as_deref());
        if raw_date.is_some() && date.is_none() {
            stats.unparsed_dates += 1;
        }

        let topics = clean_topics(present(&row[idx.topics]));
        if topics.is_empty() {
            stats.rows_without_topics += 1;
        }

        let organization = present(&row[idx.organization])
            .map(clean_organization_name)
            .map(|org| restrict_text(&org))
            .unwrap_or_default();
        let summary = restrict_text(&clean_summary(present(&row[idx.summary])));
        let city = restrict_text(&clean_location(present(&row[idx.city])));
        let province = restrict_text(&clean_location(present(&row[idx.province])));
        let title = present(&row[idx.title])
            .map(restrict_text)
            .unwrap_or_default();

        for (i, cell) in row.iter_mut().enumerate() {
            if i == idx.title {
                *cell = title.clone();
            } else if i == idx.organization {
                *cell = organization.clone();
            } else if i == idx.city {
                *cell = city.clone();
            } else if i == idx.province {
                *cell = province.clone();
            } else if i == idx.date {
                *cell = date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
            } else if i == idx.summary {
                *cell = summary.clone();
            } else if i == idx.topics {
                *cell = format_string_list(&topics);
            } else if i == idx.has_photos {
                *cell = "False".to_string();
            } else if i == idx.event_type {
                cell.clear();
            } else if is_missing(cell) {
                cell.clear();
            }
        }
    }

    for (col, name) in table.headers.iter().enumerate() {
        let empty = table.rows.iter().filter(|row| row[col].is_empty()).count();
        stats.empty_cells.insert(name.clone(), empty);
    }

    Ok(CleanOutcome { table, stats })
}

#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub reports_dir: PathBuf,
}

impl CleanConfig {
    pub fn from_env() -> Self {
        Self {
            input_path: std::env::var("PIMS_RAW_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("DATA_raw.csv")),
            output_path: std::env::var("PIMS_CLEAN_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data1.csv")),
            reports_dir: std::env::var("PIMS_REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./reports")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_path: String,
    pub input_bytes: usize,
    pub input_sha256: String,
    pub output_path: String,
    pub output_bytes: usize,
    pub output_sha256: String,
    #[serde(flatten)]
    pub stats: CleanStats,
}

#[derive(Debug, Clone)]
pub struct CleanSummary {
    pub run_id: Uuid,
    pub rows: usize,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
}

async fn write_report(reports_dir: &Path, report: &CleanReport) -> Result<PathBuf> {
    let run_dir = reports_dir.join(report.run_id.to_string());
    fs::create_dir_all(&run_dir)
        .await
        .with_context(|| format!("creating {}", run_dir.display()))?;
    let path = run_dir.join("clean_report.json");
    let bytes = serde_json::to_vec_pretty(report).context("serializing clean report")?;
    fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Clean the raw export named by `config` and write the cleaned file plus a
/// data-quality report. A missing input aborts before anything is written.
pub async fn run_clean(config: &CleanConfig) -> Result<CleanSummary> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    let input = &config.input_path;

    let loaded = match read_table(input).await {
        Ok(loaded) => loaded,
        Err(TableError::NotFound(path)) => {
            error!(path = %path.display(), "raw export not found; aborting");
            return Err(CleanError::MissingInput(path).into());
        }
        Err(err) => {
            return Err(CleanError::from(err))
                .with_context(|| format!("reading {}", input.display()));
        }
    };
    let table = loaded.table;
    info!(%run_id, rows = table.len(), path = %input.display(), "raw export loaded");

    let outcome = clean_table(table)?;
    if outcome.stats.unparsed_dates > 0 {
        warn!(
            count = outcome.stats.unparsed_dates,
            "dates could not be parsed and were left empty"
        );
    }

    let written = write_table_atomic(&config.output_path, &outcome.table)
        .await
        .map_err(CleanError::from)
        .with_context(|| format!("writing {}", config.output_path.display()))?;
    info!(rows = written.rows, path = %written.path.display(), "cleaned export written");

    let report = CleanReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        input_path: input.display().to_string(),
        input_bytes: loaded.byte_size,
        input_sha256: loaded.content_hash,
        output_path: written.path.display().to_string(),
        output_bytes: written.byte_size,
        output_sha256: written.content_hash,
        stats: outcome.stats,
    };
    let report_path = write_report(&config.reports_dir, &report).await?;

    Ok(CleanSummary {
        run_id,
        rows: written.rows,
        output_path: written.path,
        report_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn raw_table(rows: &[[&str; 8]]) -> DelimitedTable {
        let mut table = DelimitedTable::new(
            [
                "ID",
                "Title",
                "Organization Name",
                "City2",
                "Province2",
                "Date(s)",
                "Summary",
                "Topics",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        );
        for row in rows {
            table.rows.push(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    fn cell<'a>(table: &'a DelimitedTable, row: usize, name: &str) -> &'a str {
        let col = table.column(name).expect("column");
        &table.rows[row][col]
    }

    #[test]
    fn summary_strips_tags_entities_and_whitespace() {
        assert_eq!(
            clean_summary(Some("<p>Time&#58;  noon</p>\n <b>Fun</b>")),
            "Time: noon Fun"
        );
        assert_eq!(clean_summary(None), "");
    }

    #[test]
    fn organization_list_literal_yields_first_element() {
        assert_eq!(clean_organization_name("['Lions Club']"), "Lions Club");
        assert_eq!(clean_organization_name("[Lions Club]"), "Lions Club");
        assert_eq!(clean_organization_name("['A', 'B']"), "A");
        assert_eq!(clean_organization_name("Rotary"), "Rotary");
    }

    #[test]
    fn dates_lose_ordinals_and_month_names() {
        assert_eq!(normalize_date_text("3rd May 2021"), "3 05 2021");
        assert_eq!(normalize_date_text("Saturday, June 1st, 2019"), "06 1, 2019");
        assert_eq!(normalize_date_text("Sept 5, 2010"), "09 5, 2010");
    }

    #[test]
    fn every_date_spelling_resolves_to_the_same_day() {
        let cases = [
            // ISO, with and without a time
            ("2021-05-03", (2021, 5, 3)),
            ("2021-05-03 18:30:00", (2021, 5, 3)),
            ("2021-05-03T18:30:00", (2021, 5, 3)),
            ("2021/05/03", (2021, 5, 3)),
            ("05/03/2021", (2021, 5, 3)),
            ("3 05 2021", (2021, 5, 3)),
            // month name before the day
            ("May 3 2021", (2021, 5, 3)),
            ("May 3, 2021", (2021, 5, 3)),
            ("May 3rd, 2021", (2021, 5, 3)),
            ("May 31 2021", (2021, 5, 31)),
            ("Monday, May 3, 2021", (2021, 5, 3)),
            ("June 1, 2021", (2021, 6, 1)),
            ("Aug 21, 1999", (1999, 8, 21)),
            ("Sept 5, 2010", (2010, 9, 5)),
            ("Dec 12 2012", (2012, 12, 12)),
            // month name after the day
            ("3 May 2021", (2021, 5, 3)),
            ("3 May, 2021", (2021, 5, 3)),
            ("3rd May 2021", (2021, 5, 3)),
            ("1 June, 2021", (2021, 6, 1)),
            ("31 May 2021", (2021, 5, 31)),
            ("12 Dec 2012", (2012, 12, 12)),
            // month and year, bare year
            ("June 2004", (2004, 6, 1)),
            ("Sep 2004", (2004, 9, 1)),
            ("1988", (1988, 1, 1)),
        ];
        for (raw, (y, m, d)) in cases {
            assert_eq!(
                clean_date(Some(raw)),
                NaiveDate::from_ymd_opt(y, m, d),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn unparseable_dates_become_none() {
        assert_eq!(clean_date(Some("sometime in the 80s")), None);
        assert_eq!(clean_date(Some("June 1-3, 2021")), None);
        assert_eq!(clean_date(Some("")), None);
        assert_eq!(clean_date(None), None);
    }

    #[test]
    fn date_cleaning_is_idempotent() {
        for raw in [
            "3rd May 2021",
            "May 3, 2021",
            "May 3 2021",
            "1 June, 2021",
            "2021-06-01T09:00:00",
            "12/25/1995",
            "June 2004",
            "1988",
            "not a date",
            "2021-06-01",
        ] {
            let once = clean_date(Some(raw));
            let formatted = once.map(|d| d.format("%Y-%m-%d").to_string());
            assert_eq!(clean_date(formatted.as_deref()), once, "input {raw:?}");
        }
    }

    #[test]
    fn topic_parse_paths_agree_on_equivalent_input() {
        let expected = vec!["Music".to_string(), "Food".to_string()];
        assert_eq!(clean_topics(Some("['Music', 'Food']")), expected);
        assert_eq!(clean_topics(Some("[Music, Food]")), expected);
        assert_eq!(clean_topics(Some("['Music', Food]")), expected);
        assert_eq!(clean_topics(Some("Music,Food")), expected);
        assert!(clean_topics(Some("[]")).is_empty());
        assert!(clean_topics(None).is_empty());
    }

    #[test]
    fn locations_keep_word_characters_and_hyphens() {
        assert_eq!(clean_location(Some(" Kitchener! ")), "Kitchener");
        assert_eq!(clean_location(Some("Saint-Jean (QC)")), "Saint-Jean QC");
        assert_eq!(clean_location(None), "");
    }

    #[test]
    fn text_restriction_drops_other_punctuation() {
        assert_eq!(restrict_text("Pride & Joy: 2021!"), "Pride  Joy: 2021");
    }

    #[test]
    fn spring_fair_row_cleans_end_to_end() {
        let table = raw_table(&[[
            "7",
            "Spring Fair",
            "[Lions Club]",
            "Kitchener!",
            "ON",
            "3rd May 2021",
            "<b>Fun</b> day",
            "['Music', 'Food']",
        ]]);
        let outcome = clean_table(table).expect("clean");
        let t = &outcome.table;
        assert_eq!(cell(t, 0, "Title"), "Spring Fair");
        assert_eq!(cell(t, 0, "Organization Name"), "Lions Club");
        assert_eq!(cell(t, 0, "City"), "Kitchener");
        assert_eq!(cell(t, 0, "Province"), "ON");
        assert_eq!(cell(t, 0, "Date"), "2021-05-03");
        assert_eq!(cell(t, 0, "Summary"), "Fun day");
        assert_eq!(cell(t, 0, "Topics"), "['Music', 'Food']");
        assert_eq!(cell(t, 0, "Has Photos"), "False");
        assert_eq!(cell(t, 0, "Event Type"), "");
        assert_eq!(cell(t, 0, "ID"), "7");
        assert_eq!(
            clean_topics(Some(cell(t, 0, "Topics"))),
            vec!["Music".to_string(), "Food".to_string()]
        );
    }

    #[test]
    fn alias_column_replaces_existing_canonical_column() {
        let mut table = raw_table(&[["1", "T", "", "Ottawa", "ON", "", "", ""]]);
        table.headers.push("City".into());
        table.rows[0].push("stale".into());
        let table = resolve_aliases(table);
        assert_eq!(table.headers.iter().filter(|h| *h == "City").count(), 1);
        assert_eq!(cell(&table, 0, "City"), "Ottawa");
    }

    #[test]
    fn missing_cells_are_counted_and_blank() {
        let table = raw_table(&[["1", "NA", "", "", "", "whenever", "", ""]]);
        let outcome = clean_table(table).expect("clean");
        assert_eq!(outcome.stats.total_rows, 1);
        assert_eq!(outcome.stats.unparsed_dates, 1);
        assert_eq!(outcome.stats.rows_without_topics, 1);
        assert_eq!(outcome.stats.empty_cells["Title"], 1);
        assert_eq!(cell(&outcome.table, 0, "Topics"), "[]");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let table = DelimitedTable::new(vec!["Title".into()]);
        assert!(matches!(
            clean_table(table),
            Err(CleanError::MissingColumn("Organization Name"))
        ));
    }

    #[tokio::test]
    async fn missing_input_aborts_without_output() {
        let dir = tempdir().expect("tempdir");
        let config = CleanConfig {
            input_path: dir.path().join("DATA_raw.csv"),
            output_path: dir.path().join("data1.csv"),
            reports_dir: dir.path().join("reports"),
        };
        let err = run_clean(&config).await.expect_err("missing input");
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::MissingInput(_))
        ));
        assert!(!config.output_path.exists());
        assert!(!config.reports_dir.exists());
    }
}
