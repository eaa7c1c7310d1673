//! bCourses enrollment term lookup

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SqlGenError};

/// Academic term season, with the single-letter code used by the campus SIS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semester {
    Spring,
    Summer,
    Fall,
}

impl Semester {
    pub fn code(&self) -> &'static str {
        match self {
            Semester::Spring => "B",
            Semester::Summer => "C",
            Semester::Fall => "D",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Semester {
    type Err = SqlGenError;

    /// Accepts the letter code or the season name, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" | "spring" => Ok(Semester::Spring),
            "c" | "summer" => Ok(Semester::Summer),
            "d" | "fall" => Ok(Semester::Fall),
            _ => Err(SqlGenError::InvalidSemester(s.to_string())),
        }
    }
}

/// Parse a `<year><semester code>` key such as `2020D`
pub fn parse_term_key(key: &str) -> Result<(i32, Semester)> {
    let key = key.trim();
    let invalid = || SqlGenError::InvalidTermKey(key.to_string());

    let split = key
        .char_indices()
        .last()
        .map(|(idx, _)| idx)
        .ok_or_else(invalid)?;
    let (year, code) = key.split_at(split);
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let semester = Semester::from_str(code).map_err(|_| invalid())?;
    Ok((year, semester))
}

/// Static table of enrollment term ids keyed by year and semester
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentTerms {
    terms: HashMap<(i32, Semester), i64>,
}

impl EnrollmentTerms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from configured `<year><code> = id` entries
    pub fn from_config(entries: &HashMap<String, i64>) -> Result<Self> {
        let mut terms = Self::new();
        for (key, term_id) in entries {
            let (year, semester) = parse_term_key(key)?;
            terms.insert(year, semester, *term_id);
        }
        Ok(terms)
    }

    pub fn insert(&mut self, year: i32, semester: Semester, term_id: i64) -> &mut Self {
        self.terms.insert((year, semester), term_id);
        self
    }

    pub fn get(&self, year: i32, semester: Semester) -> Option<i64> {
        self.terms.get(&(year, semester)).copied()
    }

    /// Like [`EnrollmentTerms::get`], but a missing term is a [`SqlGenError::Lookup`]
    pub fn lookup(&self, year: i32, semester: Semester) -> Result<i64> {
        self.get(year, semester)
            .ok_or(SqlGenError::Lookup { year, semester })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<((i32, Semester), i64)> for EnrollmentTerms {
    fn from_iter<I: IntoIterator<Item = ((i32, Semester), i64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}
