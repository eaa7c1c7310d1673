//! SQL for looking up enrollments of specific users in one bCourses term

use crate::config::CanvasDataConfig;
use crate::enrollment::terms::{EnrollmentTerms, Semester};
use crate::error::{Result, SqlGenError};
use crate::template::{substitute, TokenMap};

/// Distinct (user, course) pairs for the requested term, intended for the
/// `lakeview` database
const ENROLLMENTS_SQL: &str = r#"
    SELECT
      DISTINCT(p.unique_name, c.canvas_id),
      p.unique_name AS uid,
      u.name person_name,
      c.canvas_id AS canvas_course_id,
      c.name AS course_name,
      c.code as course_code,
      :year as year,
      ':semesterCode' as semesterCode
    FROM user_dim u
      JOIN enrollment_fact e ON e.user_id = u.id
      JOIN course_dim c ON c.id = e.course_id
      JOIN pseudonym_dim p ON p.user_id = u.id
    WHERE
      e.enrollment_term_id = :enrollmentTermId
      AND
      p.unique_name IN (:uids)
    ORDER BY
      p.unique_name,
      c.canvas_id
  "#;

/// Quote each identifier as a SQL string literal and join them with `, `
///
/// Embedded single quotes are doubled. `['123', '456']` becomes `'123', '456'`.
pub fn quote_literal_list<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    if ids.is_empty() {
        return Err(SqlGenError::EmptyIdentifiers);
    }

    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("'{}'", id.as_ref().replace('\'', "''")))
        .collect();
    Ok(quoted.join(", "))
}

/// Builds enrollment lookup SQL against a fixed term table
///
/// No term ids are built in: the table comes from
/// `data_lake.canvas_data.enrollment_terms` (see [`EnrollmentQueryBuilder::from_config`])
/// or is assembled by the caller. A `Default` builder has an empty table and
/// answers every [`EnrollmentQueryBuilder::build`] with [`SqlGenError::Lookup`].
#[derive(Debug, Clone, Default)]
pub struct EnrollmentQueryBuilder {
    terms: EnrollmentTerms,
}

impl EnrollmentQueryBuilder {
    pub fn new(terms: EnrollmentTerms) -> Self {
        Self { terms }
    }

    pub fn from_config(config: &CanvasDataConfig) -> Result<Self> {
        Ok(Self::new(EnrollmentTerms::from_config(&config.enrollment_terms)?))
    }

    pub fn terms(&self) -> &EnrollmentTerms {
        &self.terms
    }

    /// Build the SQL selecting the enrollments of `uids` in the given term
    ///
    /// Fails with [`SqlGenError::Lookup`] when the term is not in the table; no
    /// SQL is constructed in that case.
    pub fn build<S: AsRef<str>>(&self, year: i32, semester: Semester, uids: &[S]) -> Result<String> {
        let term_id = self.terms.lookup(year, semester)?;
        let uid_list = quote_literal_list(uids)?;

        log::debug!(
            "Building enrollments SQL for {}{} (term {}) with {} uid(s)",
            year,
            semester.code(),
            term_id,
            uids.len()
        );

        let tokens = enrollment_tokens(year, semester, term_id, uid_list);
        Ok(substitute(ENROLLMENTS_SQL, &tokens))
    }
}

fn enrollment_tokens(year: i32, semester: Semester, term_id: i64, uid_list: String) -> TokenMap {
    TokenMap::new()
        .with("year", year.to_string())
        .with("semesterCode", semester.code())
        .with("enrollmentTermId", term_id.to_string())
        .with("uids", uid_list)
}
