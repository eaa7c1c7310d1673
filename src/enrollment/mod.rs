//! Enrollment lookup queries for bCourses terms

pub mod query;
pub mod terms;

pub use query::{quote_literal_list, EnrollmentQueryBuilder};
pub use terms::{parse_term_key, EnrollmentTerms, Semester};
