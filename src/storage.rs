//! Storage-location hashes for daily data dumps
//!
//! Each day's Canvas Data dump is uploaded under `<s3Location>/<hash>`; the
//! hash only has to be opaque and stable for the day.

use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};

/// Source of the opaque hash that namespaces a run's storage location
pub trait LocationHasher {
    fn generate_hash(&self) -> String;
}

impl<H: LocationHasher + ?Sized> LocationHasher for &H {
    fn generate_hash(&self) -> String {
        (**self).generate_hash()
    }
}

/// SHA-256 of the UTC calendar date, optionally salted
#[derive(Debug, Clone, Default)]
pub struct DailyHasher {
    salt: Option<String>,
    date: Option<NaiveDate>,
}

impl DailyHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Pin the hash to a fixed date instead of today
    pub fn for_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl LocationHasher for DailyHasher {
    fn generate_hash(&self) -> String {
        let date = self.date.unwrap_or_else(|| Utc::now().date_naive());

        let mut hasher = Sha256::new();
        hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
        if let Some(salt) = &self.salt {
            hasher.update(salt.as_bytes());
        }
        let hash = format!("{:x}", hasher.finalize());

        log::debug!("Generated storage location hash {} for {}", hash, date);
        hash
    }
}
