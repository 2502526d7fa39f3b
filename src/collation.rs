//! Locale-aware string collation
//!
//! Sorting by raw code points puts Persian letters such as `پ` after `ت`, so
//! names and fields are compared with an ICU collator instead. The collator is
//! registered on each SQLite connection under the name `LOCALIZED`.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use rusqlite::Connection;

use crate::{Error, Result};

/// Name of the SQL collation used by every ordered query
pub const COLLATION_NAME: &str = "LOCALIZED";

/// Locale used when nothing else is configured
pub const DEFAULT_LOCALE: &str = "fa";

thread_local! {
    // ICU collators are not `Send`; each thread builds its own on first use.
    static COLLATORS: RefCell<HashMap<String, Collator>> = RefCell::new(HashMap::new());
}

fn build_collator(locale: &str) -> Result<Collator> {
    let parsed: Locale = locale
        .parse()
        .map_err(|e| Error::Collation(format!("invalid locale '{}': {}", locale, e)))?;
    Collator::try_new(&(&parsed).into(), CollatorOptions::new())
        .map_err(|e| Error::Collation(format!("no collation data for '{}': {}", locale, e)))
}

/// Collation bound to one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCollation {
    locale: String,
}

impl LocaleCollation {
    /// Validate the locale by building its collator once
    pub fn new(locale: &str) -> Result<Self> {
        build_collator(locale)?;
        Ok(Self {
            locale: locale.to_string(),
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        compare_in(&self.locale, a, b)
    }

    /// Register as the `LOCALIZED` collation on a connection
    pub fn register(&self, conn: &Connection) -> Result<()> {
        let locale = self.locale.clone();
        conn.create_collation(COLLATION_NAME, move |a, b| compare_in(&locale, a, b))?;
        tracing::debug!("Registered {} collation for locale {}", COLLATION_NAME, self.locale);
        Ok(())
    }
}

impl Default for LocaleCollation {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

fn compare_in(locale: &str, a: &str, b: &str) -> Ordering {
    COLLATORS.with(|cell| {
        let mut collators = cell.borrow_mut();
        if !collators.contains_key(locale) {
            match build_collator(locale) {
                Ok(collator) => {
                    collators.insert(locale.to_string(), collator);
                }
                // Locale was validated on construction; only reachable if ICU data vanished.
                Err(_) => return a.cmp(b),
            }
        }
        match collators.get(locale) {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persian_letters_follow_alphabet() {
        let collation = LocaleCollation::new("fa").unwrap();
        let mut names = vec!["تهرانی", "پاکزاد", "بهرامی"];
        names.sort_by(|a, b| collation.compare(a, b));
        assert_eq!(names, vec!["بهرامی", "پاکزاد", "تهرانی"]);

        // Code-point order disagrees
        assert!("تهرانی" < "پاکزاد");
    }

    #[test]
    fn test_latin_ordering() {
        let collation = LocaleCollation::new("en").unwrap();
        assert_eq!(collation.compare("adams", "Baker"), Ordering::Less);
        assert_eq!(collation.compare("Zamani", "Zamani"), Ordering::Equal);
    }

    #[test]
    fn test_invalid_locale_rejected() {
        let err = LocaleCollation::new("not a locale!").unwrap_err();
        assert!(matches!(err, Error::Collation(_)));
    }

    #[test]
    fn test_registered_collation_orders_rows() {
        let conn = Connection::open_in_memory().unwrap();
        LocaleCollation::default().register(&conn).unwrap();
        conn.execute_batch(
            "CREATE TABLE t (name TEXT);
             INSERT INTO t VALUES ('تهرانی'), ('پاکزاد'), ('بهرامی');",
        )
        .unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM t ORDER BY name COLLATE LOCALIZED")
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(names, vec!["بهرامی", "پاکزاد", "تهرانی"]);
    }
}
