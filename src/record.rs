use serde::Serialize;
use std::fmt;

use crate::error::{Result, RosterError};

/// Maximum combined score: three coursework marks of 20 plus an exam of 100.
/// Must move together with `MARK_MAX` and `EXAM_MAX`.
pub const TOTAL_MAX: f64 = 160.0;
pub const MARK_MAX: i32 = 20;
pub const EXAM_MAX: i32 = 100;
pub const MARK_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Bands are checked top-down; a value on a boundary takes the higher band.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 70.0 {
            Grade::A
        } else if percent >= 60.0 {
            Grade::B
        } else if percent >= 50.0 {
            Grade::C
        } else if percent >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 2-decimal rounding with ties to even, as the stored roster files were
/// produced with: `round(0.625, 2) == 0.62`.
pub fn round_2_decimals(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

pub fn percent_of(total: i64) -> f64 {
    round_2_decimals(total as f64 / TOTAL_MAX * 100.0)
}

/// One of the three coursework mark positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkSlot {
    First,
    Second,
    Third,
}

impl MarkSlot {
    pub fn index(self) -> usize {
        match self {
            MarkSlot::First => 0,
            MarkSlot::Second => 1,
            MarkSlot::Third => 2,
        }
    }
}

pub fn parse_int(label: &str, raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| RosterError::validation(format!("{label} must be a whole number")))
}

/// One student. Input fields are private so the derived fields cannot drift:
/// every setter re-derives before returning. Totals are `i64` so marks read
/// from a file without range checks cannot overflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    code: String,
    name: String,
    coursework_marks: [i32; MARK_COUNT],
    exam_mark: i32,
    coursework_total: i64,
    total: i64,
    percent: f64,
    grade: Grade,
}

impl Record {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        coursework_marks: [i32; MARK_COUNT],
        exam_mark: i32,
    ) -> Self {
        let mut record = Self {
            code: code.into(),
            name: name.into(),
            coursework_marks,
            exam_mark,
            coursework_total: 0,
            total: 0,
            percent: 0.0,
            grade: Grade::F,
        };
        record.recompute();
        record
    }

    /// Builds a record from raw text fields. Only checks that the numeric
    /// fields are integers; ranges and uniqueness are the roster's job.
    pub fn parse(code: &str, name: &str, marks: [&str; MARK_COUNT], exam: &str) -> Result<Self> {
        let mut parsed = [0; MARK_COUNT];
        for (i, raw) in marks.iter().enumerate() {
            parsed[i] = parse_int(&format!("Mark{}", i + 1), raw)?;
        }
        let exam_mark = parse_int("Exam", exam)?;
        Ok(Self::new(code.trim(), name.trim(), parsed, exam_mark))
    }

    pub fn recompute(&mut self) {
        self.coursework_total = self.coursework_marks.iter().map(|&m| i64::from(m)).sum();
        self.total = self.coursework_total + i64::from(self.exam_mark);
        self.percent = percent_of(self.total);
        self.grade = Grade::from_percent(self.percent);
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coursework_marks(&self) -> [i32; MARK_COUNT] {
        self.coursework_marks
    }

    pub fn exam_mark(&self) -> i32 {
        self.exam_mark
    }

    pub fn coursework_total(&self) -> i64 {
        self.coursework_total
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
        self.recompute();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.recompute();
    }

    pub fn set_mark(&mut self, slot: MarkSlot, mark: i32) {
        self.coursework_marks[slot.index()] = mark;
        self.recompute();
    }

    pub fn set_exam_mark(&mut self, exam_mark: i32) {
        self.exam_mark = exam_mark;
        self.recompute();
    }

    /// Case-insensitive name comparison used for uniqueness and lookup.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }

    pub fn summary(&self) -> String {
        format!(
            "Name: {}\nNumber: {}\nCoursework Total: {}\nExam Mark: {}\nOverall Percentage: {:.2}%\nGrade: {}\n",
            self.name, self.code, self.coursework_total, self.exam_mark, self.percent, self.grade
        )
    }
}
