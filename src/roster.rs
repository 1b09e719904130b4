use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RosterError};
use crate::record::{parse_int, MarkSlot, Record, EXAM_MAX, MARK_COUNT, MARK_MAX};

pub const CODE_MIN: u32 = 1000;
pub const CODE_MAX: u32 = 9999;

/// Fields that `update` may change. Each variant owns its validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateField {
    Name,
    Code,
    Mark1,
    Mark2,
    Mark3,
    Exam,
}

impl UpdateField {
    pub const ALL: [UpdateField; 6] = [
        UpdateField::Name,
        UpdateField::Code,
        UpdateField::Mark1,
        UpdateField::Mark2,
        UpdateField::Mark3,
        UpdateField::Exam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateField::Name => "Name",
            UpdateField::Code => "Code",
            UpdateField::Mark1 => "Mark1",
            UpdateField::Mark2 => "Mark2",
            UpdateField::Mark3 => "Mark3",
            UpdateField::Exam => "Exam",
        }
    }
}

impl fmt::Display for UpdateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateField {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        UpdateField::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                RosterError::validation(format!(
                    "Unknown field '{wanted}'; expected one of Name, Code, Mark1, Mark2, Mark3, Exam"
                ))
            })
    }
}

pub fn validate_code(raw: &str) -> Result<String> {
    let code = raw.trim();
    let in_range = code.len() == 4
        && code.chars().all(|c| c.is_ascii_digit())
        && code
            .parse::<u32>()
            .map(|n| (CODE_MIN..=CODE_MAX).contains(&n))
            .unwrap_or(false);
    if !in_range {
        return Err(RosterError::validation(format!(
            "Code must be {CODE_MIN}-{CODE_MAX}"
        )));
    }
    Ok(code.to_string())
}

/// Names are stored unescaped in a comma-separated file, so separators are
/// rejected rather than written out into an unreadable line.
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RosterError::validation("Name must not be empty"));
    }
    if name.contains([',', '\n', '\r']) {
        return Err(RosterError::validation(
            "Name must not contain commas or line breaks",
        ));
    }
    Ok(name.to_string())
}

pub fn validate_mark(label: &str, raw: &str) -> Result<i32> {
    let mark = parse_int(label, raw)?;
    if !(0..=MARK_MAX).contains(&mark) {
        return Err(RosterError::validation(format!(
            "{label} must be 0-{MARK_MAX}"
        )));
    }
    Ok(mark)
}

pub fn validate_exam(raw: &str) -> Result<i32> {
    let exam = parse_int("Exam", raw)?;
    if !(0..=EXAM_MAX).contains(&exam) {
        return Err(RosterError::validation(format!("Exam must be 0-{EXAM_MAX}")));
    }
    Ok(exam)
}

/// Ordered in-memory collection of records. Never touches disk; see
/// `store::RosterStore` for the persisted wrapper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    records: Vec<Record>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose code equals `identifier` or whose name matches it
    /// ignoring case.
    pub fn position(&self, identifier: &str) -> Option<usize> {
        let wanted = identifier.trim();
        self.records
            .iter()
            .position(|r| r.code() == wanted || r.name_matches(wanted))
    }

    pub fn find(&self, identifier: &str) -> Option<&Record> {
        self.position(identifier).map(|i| &self.records[i])
    }

    /// Exact, case-sensitive name match.
    pub fn find_by_name(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.name() == name)
    }

    pub fn add(
        &mut self,
        code: &str,
        name: &str,
        marks: [&str; MARK_COUNT],
        exam: &str,
    ) -> Result<Record> {
        let code = validate_code(code)?;
        let name = validate_name(name)?;
        let mut parsed = [0; MARK_COUNT];
        for (i, raw) in marks.iter().enumerate() {
            parsed[i] = validate_mark(&format!("Mark{}", i + 1), raw)?;
        }
        let exam = validate_exam(exam)?;

        if self.records.iter().any(|r| r.code() == code) {
            return Err(RosterError::validation(format!("Duplicate code: {code}")));
        }
        if self.records.iter().any(|r| r.name_matches(&name)) {
            return Err(RosterError::validation(format!("Duplicate name: {name}")));
        }

        let record = Record::new(code, name, parsed, exam);
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn delete(&mut self, identifier: &str) -> Result<Record> {
        let idx = self
            .position(identifier)
            .ok_or_else(|| RosterError::NotFound(identifier.trim().to_string()))?;
        Ok(self.records.remove(idx))
    }

    /// Returns the record as it was before the change alongside the updated
    /// one, so callers can revert.
    pub fn update(
        &mut self,
        identifier: &str,
        field: UpdateField,
        value: &str,
    ) -> Result<(Record, Record)> {
        let idx = self
            .position(identifier)
            .ok_or_else(|| RosterError::NotFound(identifier.trim().to_string()))?;
        let taken_by_other = |pred: &dyn Fn(&Record) -> bool| {
            self.records
                .iter()
                .enumerate()
                .any(|(i, r)| i != idx && pred(r))
        };

        let mut next = self.records[idx].clone();
        match field {
            UpdateField::Name => {
                let name = validate_name(value)?;
                if taken_by_other(&|r: &Record| r.name_matches(&name)) {
                    return Err(RosterError::validation(format!("Duplicate name: {name}")));
                }
                next.set_name(name);
            }
            UpdateField::Code => {
                let code = validate_code(value)?;
                if taken_by_other(&|r: &Record| r.code() == code) {
                    return Err(RosterError::validation(format!("Duplicate code: {code}")));
                }
                next.set_code(code);
            }
            UpdateField::Mark1 | UpdateField::Mark2 | UpdateField::Mark3 => {
                let slot = match field {
                    UpdateField::Mark1 => MarkSlot::First,
                    UpdateField::Mark2 => MarkSlot::Second,
                    _ => MarkSlot::Third,
                };
                let mark = validate_mark(field.as_str(), value)?;
                next.set_mark(slot, mark);
            }
            UpdateField::Exam => {
                next.set_exam_mark(validate_exam(value)?);
            }
        }

        let previous = std::mem::replace(&mut self.records[idx], next.clone());
        Ok((previous, next))
    }

    /// Stable: records with equal percent keep their relative order.
    pub fn sort(&mut self, ascending: bool) {
        if ascending {
            self.records.sort_by(|a, b| a.percent().total_cmp(&b.percent()));
        } else {
            self.records.sort_by(|a, b| b.percent().total_cmp(&a.percent()));
        }
    }

    pub fn highest(&self) -> Option<&Record> {
        self.first_by(Ordering::Greater)
    }

    pub fn lowest(&self) -> Option<&Record> {
        self.first_by(Ordering::Less)
    }

    // Ties keep the earliest record: a later one must compare strictly
    // `wanted` to replace it.
    fn first_by(&self, wanted: Ordering) -> Option<&Record> {
        let mut best: Option<&Record> = None;
        for r in &self.records {
            let replace = match best {
                Some(b) => r.percent().total_cmp(&b.percent()) == wanted,
                None => true,
            };
            if replace {
                best = Some(r);
            }
        }
        best
    }

    pub fn average(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.records.iter().map(Record::percent).sum();
        sum / self.records.len() as f64
    }

    /// Every summary, then the head count and the average percentage.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for r in &self.records {
            out.push_str(&r.summary());
            out.push('\n');
        }
        out.push_str(&format!(
            "\nNumber of Students: {}\nAverage Percentage: {:.2}%",
            self.records.len(),
            self.average()
        ));
        out
    }

    pub fn individual_report(&self, name: &str) -> String {
        match self.find_by_name(name) {
            Some(r) => r.summary(),
            None => "Student not found.".to_string(),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, record: Record) {
        let index = index.min(self.records.len());
        self.records.insert(index, record);
    }

    pub(crate) fn replace(&mut self, index: usize, record: Record) {
        if let Some(slot) = self.records.get_mut(index) {
            *slot = record;
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Record> {
        self.records.pop()
    }
}
