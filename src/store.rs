use serde::Serialize;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{Result, RosterError};
use crate::record::{Record, MARK_COUNT};
use crate::roster::{Roster, UpdateField};

pub const DEFAULT_STORE_PATH: &str = "resources/studentMarks.txt";
const FIELD_COUNT: usize = 2 + MARK_COUNT + 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: String,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedRoster {
    pub declared_count: i64,
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedLine>,
}

/// Parses the roster file body:
///
/// ```text
/// <count>
/// <code>,<name>,<mark1>,<mark2>,<mark3>,<exam>
/// ```
///
/// The count is informational. Record lines with the wrong number of fields,
/// or with numeric fields that are not integers, are skipped and reported.
/// Only a missing or non-integer count line fails the whole parse; any
/// integer, negative included, is accepted.
pub fn parse_roster_text(text: &str) -> io::Result<ParsedRoster> {
    let mut lines = text.lines().enumerate();

    let header = lines
        .next()
        .map(|(_, l)| l.trim())
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "missing record count line"))?;
    let declared_count = header.parse::<i64>().map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("invalid record count line: {header:?}"),
        )
    })?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (i, raw) in lines {
        let t = raw.trim();
        if t.is_empty() {
            continue;
        }
        match parse_record_line(t) {
            Ok(r) => records.push(r),
            Err(reason) => skipped.push(SkippedLine {
                line_no: i + 1,
                reason,
                raw: raw.to_string(),
            }),
        }
    }

    Ok(ParsedRoster {
        declared_count,
        records,
        skipped,
    })
}

fn parse_record_line(line: &str) -> std::result::Result<Record, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} fields, found {}",
            parts.len()
        ));
    }
    Record::parse(parts[0], parts[1], [parts[2], parts[3], parts[4]], parts[5])
        .map_err(|e| e.to_string())
}

pub fn serialize_roster(roster: &Roster) -> String {
    let mut out = format!("{}\n", roster.len());
    for r in roster.records() {
        let [m1, m2, m3] = r.coursework_marks();
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            r.code(),
            r.name(),
            m1,
            m2,
            m3,
            r.exam_mark()
        ));
    }
    out
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub roster: Roster,
    pub declared_count: Option<i64>,
    pub skipped: Vec<SkippedLine>,
    /// Set when the file existed but could not be read; `roster` is then empty.
    pub error: Option<RosterError>,
}

/// Best-effort load. A missing file is an empty roster, not an error.
pub fn load_roster(path: &Path) -> LoadOutcome {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::default(),
        Err(e) => return failed_load(RosterError::io("failed to read", path, e)),
    };
    let text = match String::from_utf8(bytes) {
        Ok(t) => t,
        Err(e) => {
            let e = io::Error::new(ErrorKind::InvalidData, e);
            return failed_load(RosterError::io("failed to decode", path, e));
        }
    };

    match parse_roster_text(&text) {
        Ok(parsed) => {
            for s in &parsed.skipped {
                tracing::warn!(
                    path = %path.display(),
                    line = s.line_no,
                    reason = %s.reason,
                    "skipping malformed roster line"
                );
            }
            LoadOutcome {
                roster: Roster::from_records(parsed.records),
                declared_count: Some(parsed.declared_count),
                skipped: parsed.skipped,
                error: None,
            }
        }
        Err(e) => failed_load(RosterError::io("failed to parse", path, e)),
    }
}

fn failed_load(error: RosterError) -> LoadOutcome {
    tracing::error!(error = %error, "roster load failed; starting empty");
    LoadOutcome {
        error: Some(error),
        ..LoadOutcome::default()
    }
}

/// Writes the whole roster. Not atomic: a failure mid-write can leave a
/// truncated file behind.
pub fn save_roster(path: &Path, roster: &Roster) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| RosterError::io("failed to create directory", parent, e))?;
    }
    std::fs::write(path, serialize_roster(roster))
        .map_err(|e| RosterError::io("failed to write", path, e))?;
    tracing::debug!(path = %path.display(), count = roster.len(), "roster saved");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub loaded: usize,
    pub declared_count: Option<i64>,
    pub skipped: Vec<SkippedLine>,
    pub load_error: Option<String>,
}

/// A roster bound to its file. Every successful mutation is written back
/// before returning; if the write fails the in-memory change is undone.
#[derive(Debug)]
pub struct RosterStore {
    path: PathBuf,
    roster: Roster,
}

impl RosterStore {
    pub fn open(path: impl Into<PathBuf>) -> (Self, LoadReport) {
        let path = path.into();
        let outcome = load_roster(&path);
        let report = LoadReport {
            loaded: outcome.roster.len(),
            declared_count: outcome.declared_count,
            skipped: outcome.skipped,
            load_error: outcome.error.map(|e| e.to_string()),
        };
        tracing::info!(
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "roster opened"
        );
        (
            Self {
                path,
                roster: outcome.roster,
            },
            report,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn save(&self) -> Result<()> {
        save_roster(&self.path, &self.roster)
    }

    pub fn add(
        &mut self,
        code: &str,
        name: &str,
        marks: [&str; MARK_COUNT],
        exam: &str,
    ) -> Result<Record> {
        let record = self.roster.add(code, name, marks, exam)?;
        if let Err(e) = self.save() {
            self.roster.pop();
            return Err(e);
        }
        tracing::info!(code = record.code(), student = record.name(), "student added");
        Ok(record)
    }

    pub fn delete(&mut self, identifier: &str) -> Result<Record> {
        let idx = self.roster.position(identifier);
        let removed = self.roster.delete(identifier)?;
        if let Err(e) = self.save() {
            self.roster.insert(idx.unwrap_or(0), removed);
            return Err(e);
        }
        tracing::info!(code = removed.code(), student = removed.name(), "student deleted");
        Ok(removed)
    }

    pub fn update(&mut self, identifier: &str, field: UpdateField, value: &str) -> Result<Record> {
        let idx = self.roster.position(identifier);
        let (previous, updated) = self.roster.update(identifier, field, value)?;
        if let Err(e) = self.save() {
            if let Some(i) = idx {
                self.roster.replace(i, previous);
            }
            return Err(e);
        }
        tracing::info!(
            code = updated.code(),
            field = %field,
            "student updated"
        );
        Ok(updated)
    }

    /// Reorders in memory only; the order reaches disk with the next save.
    pub fn sort(&mut self, ascending: bool) {
        self.roster.sort(ascending);
    }
}
