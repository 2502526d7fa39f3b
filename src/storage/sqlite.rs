//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use rusqlite::{Connection, OptionalExtension, params};
use crate::{Error, Result};
use crate::collation::LocaleCollation;
use crate::interest::Interest;
use crate::member::Member;
use super::schema::{self, INTEREST_COLUMNS, MEMBER_COLUMNS};

/// Matches `field` against the first name, and against the second one unless it is empty.
/// Binary equality; under the collation a trailing ZWNJ compares equal.
const FIELD_FILTER: &str = "(field = ?1 OR (?2 <> '' AND field = ?2))";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed storage for members and interests
pub struct TecStore {
    conn: Connection,
    collation: LocaleCollation,
}

impl TecStore {
    /// Open a database file (creates if doesn't exist) with the default collation locale
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_collation(path, LocaleCollation::default())
    }

    /// Open a database file, sorting text with the given collation
    pub fn open_with_collation(path: &Path, collation: LocaleCollation) -> Result<Self> {
        let unavailable = |source: rusqlite::Error| Error::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(unavailable)?;
        // Other processes may be writing the same file
        conn.busy_timeout(BUSY_TIMEOUT).map_err(unavailable)?;
        let store = Self { conn, collation };
        store.collation.register(&store.conn)?;
        // A corrupt file only surfaces on first use
        store.initialize_schema().map_err(|e| match e {
            Error::Storage(source) => unavailable(source),
            other => other,
        })?;
        tracing::info!("Opened store at {}", path.display());
        Ok(store)
    }

    /// Open `path`, first copying the pre-populated `template` database there if it is missing
    pub fn open_from_template(template: &Path, path: &Path, collation: LocaleCollation) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            // An interrupted copy must not leave a truncated database at `path`
            let mut partial = path.as_os_str().to_owned();
            partial.push(".partial");
            let partial = std::path::PathBuf::from(partial);
            if let Err(e) = std::fs::copy(template, &partial) {
                let _ = std::fs::remove_file(&partial);
                return Err(e.into());
            }
            std::fs::rename(&partial, path)?;
            tracing::info!("Copied bundled database {} to {}", template.display(), path.display());
        }
        Self::open_with_collation(path, collation)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            collation: LocaleCollation::default(),
        };
        store.collation.register(&store.conn)?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Counter that changes whenever another connection commits to the database.
    ///
    /// Commits made through this connection leave it unchanged.
    pub fn data_version(&self) -> Result<i64> {
        let version = self.conn.query_row("PRAGMA data_version", [], |row| row.get(0))?;
        Ok(version)
    }

    // ========== Member Operations ==========

    /// Dean of either field, if any
    pub fn dean_of_faculty(&self, field_a: &str, field_b: &str) -> Result<Option<Member>> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE {FIELD_FILTER} AND dean_of_faculty = 1 ORDER BY id LIMIT 1"
        );
        self.conn
            .query_row(&sql, params![field_a, field_b], row_to_member)
            .optional()
            .map_err(Into::into)
    }

    /// Academics of either field, ordered by last name
    pub fn academics(&self, field_a: &str, field_b: &str) -> Result<Vec<Member>> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE {FIELD_FILTER} AND dean_of_faculty = 0 \
             ORDER BY last_name COLLATE LOCALIZED, id"
        );
        self.query_members(&sql, field_a, field_b)
    }

    /// Authorities of either field, ordered by last name
    pub fn authorities(&self, field_a: &str, field_b: &str) -> Result<Vec<Member>> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE {FIELD_FILTER} AND dean_of_faculty IS NULL \
             ORDER BY last_name COLLATE LOCALIZED, id"
        );
        self.query_members(&sql, field_a, field_b)
    }

    /// Dean of the whole complex: the only non-faculty-dean with an interest
    pub fn dean_of_complex(&self) -> Result<Option<Member>> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE interest IS NOT NULL AND dean_of_faculty = 0 \
             ORDER BY id LIMIT 1"
        );
        self.conn
            .query_row(&sql, [], row_to_member)
            .optional()
            .map_err(Into::into)
    }

    /// Deans plus academics
    pub fn count_academics(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM members WHERE dean_of_faculty IS NOT NULL")
    }

    pub fn count_authorities(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM members WHERE dean_of_faculty IS NULL")
    }

    pub fn count_members(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM members")
    }

    /// Get a member by id
    pub fn get_member(&self, id: i64) -> Result<Option<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], row_to_member)
            .optional()
            .map_err(Into::into)
    }

    /// Insert a member and return its id.
    ///
    /// An id of 0 lets the database assign one; any other id is inserted as given
    /// and fails with [`Error::Integrity`] if it is taken.
    pub fn insert_member(&self, member: &Member) -> Result<i64> {
        let id = (member.id != 0).then_some(member.id);
        self.conn.execute(
            r#"
            INSERT INTO members (id, first_name, last_name, field, interest, title, contact_info, dean_of_faculty, image_bytes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                member.first_name,
                member.last_name,
                member.field,
                member.interest,
                member.title,
                member.contact_info,
                member.dean_of_faculty,
                member.image_bytes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace every column of the member with the same id
    pub fn update_member(&self, member: &Member) -> Result<()> {
        let changed = self.conn.execute(
            r#"
            UPDATE members
            SET first_name = ?2, last_name = ?3, field = ?4, interest = ?5, title = ?6,
                contact_info = ?7, dean_of_faculty = ?8, image_bytes = ?9
            WHERE id = ?1
            "#,
            params![
                member.id,
                member.first_name,
                member.last_name,
                member.field,
                member.interest,
                member.title,
                member.contact_info,
                member.dean_of_faculty,
                member.image_bytes,
            ],
        )?;
        if changed == 0 {
            return Err(Error::MemberNotFound(member.id));
        }
        Ok(())
    }

    fn query_members(&self, sql: &str, field_a: &str, field_b: &str) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let members = stmt
            .query_map(params![field_a, field_b], row_to_member)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    // ========== Interest Operations ==========

    /// Interests of either field, ordered by name
    pub fn interests(&self, field_a: &str, field_b: &str) -> Result<Vec<Interest>> {
        let sql = format!(
            "SELECT {INTEREST_COLUMNS} FROM interests WHERE {FIELD_FILTER} ORDER BY name COLLATE LOCALIZED, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let interests = stmt
            .query_map(params![field_a, field_b], row_to_interest)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(interests)
    }

    /// Distinct stages, in the order they first appear
    pub fn educational_stages(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT stage FROM interests GROUP BY stage ORDER BY MIN(id)")?;
        let stages = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(stages)
    }

    pub fn count_interests(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM interests")
    }

    /// Insert an interest and return its id (0 lets the database assign one)
    pub fn insert_interest(&self, interest: &Interest) -> Result<i64> {
        let id = (interest.id != 0).then_some(interest.id);
        self.conn.execute(
            "INSERT INTO interests (id, name, field, stage) VALUES (?1, ?2, ?3, ?4)",
            params![id, interest.name, interest.field, interest.stage],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ========== Bulk Operations ==========

    fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            members: self.count_members()?,
            academics: self.count_academics()?,
            authorities: self.count_authorities()?,
            interests: self.count_interests()?,
            stages: self.educational_stages()?.len() as u64,
        })
    }
}

/// Helper to convert a row to a Member
fn row_to_member(row: &rusqlite::Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        field: row.get(3)?,
        interest: row.get(4)?,
        title: row.get(5)?,
        contact_info: row.get(6)?,
        dean_of_faculty: row.get(7)?,
        image_bytes: row.get(8)?,
    })
}

/// Helper to convert a row to an Interest
fn row_to_interest(row: &rusqlite::Row) -> rusqlite::Result<Interest> {
    Ok(Interest {
        id: row.get(0)?,
        name: row.get(1)?,
        field: row.get(2)?,
        stage: row.get(3)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub members: u64,
    pub academics: u64,
    pub authorities: u64,
    pub interests: u64,
    pub stages: u64,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Members: {}", self.members)?;
        writeln!(f, "  Academics: {}", self.academics)?;
        writeln!(f, "  Authorities: {}", self.authorities)?;
        writeln!(f, "  Interests: {}", self.interests)?;
        writeln!(f, "  Stages: {}", self.stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPUTER: &str = "کامپیوتر";

    fn academic(first: &str, last: &str, field: &str) -> Member {
        Member::new(first, last, format!("{}@tec.ac.ir", first))
            .with_field(field)
            .with_title("استادیار")
            .with_dean_of_faculty(false)
    }

    #[test]
    fn test_member_crud() {
        let store = TecStore::open_in_memory().unwrap();

        let id = store.insert_member(&academic("Ali", "Rezaei", COMPUTER)).unwrap();
        assert!(id > 0);

        let retrieved = store.get_member(id).unwrap().unwrap();
        assert_eq!(retrieved.last_name, "Rezaei");
        assert_eq!(retrieved.dean_of_faculty, Some(false));
        assert_eq!(retrieved.field.as_deref(), Some(COMPUTER));

        let updated = Member { last_name: "Rahimi".to_string(), ..retrieved };
        store.update_member(&updated).unwrap();
        assert_eq!(store.get_member(id).unwrap().unwrap().last_name, "Rahimi");
    }

    #[test]
    fn test_insert_with_taken_id_is_integrity_error() {
        let store = TecStore::open_in_memory().unwrap();
        store.insert_member(&academic("Ali", "Rezaei", COMPUTER).with_id(5)).unwrap();

        let err = store.insert_member(&academic("Sara", "Karimi", COMPUTER).with_id(5)).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
        assert_eq!(store.count_members().unwrap(), 1);
    }

    #[test]
    fn test_update_unknown_member_fails() {
        let store = TecStore::open_in_memory().unwrap();
        let err = store.update_member(&academic("Ali", "Rezaei", COMPUTER).with_id(42)).unwrap_err();
        assert!(matches!(err, Error::MemberNotFound(42)));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = TecStore::open_in_memory().unwrap();
        let first = store.insert_member(&academic("A", "A", COMPUTER)).unwrap();
        let second = store.insert_member(&academic("B", "B", COMPUTER)).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_image_bytes_roundtrip() {
        let store = TecStore::open_in_memory().unwrap();
        let bytes = vec![0x89, b'P', b'N', b'G', 0, 1, 2];
        let id = store
            .insert_member(&academic("Ali", "Rezaei", COMPUTER).with_image(bytes.clone()))
            .unwrap();
        assert_eq!(store.get_member(id).unwrap().unwrap().image_bytes, Some(bytes));
    }

    #[test]
    fn test_empty_second_field_matches_nothing_extra() {
        let store = TecStore::open_in_memory().unwrap();
        store.insert_member(&academic("Ali", "Rezaei", COMPUTER)).unwrap();
        store.insert_member(&academic("Sara", "Karimi", "")).unwrap();

        let academics = store.academics(COMPUTER, "").unwrap();
        assert_eq!(academics.len(), 1);
        assert_eq!(academics[0].last_name, "Rezaei");
    }

    #[test]
    fn test_stages_in_first_seen_order() {
        let store = TecStore::open_in_memory().unwrap();
        for (name, stage) in [("Networks", "2"), ("Algorithms", "1"), ("AI", "2"), ("Thesis", "3")] {
            store.insert_interest(&Interest::new(name, COMPUTER, stage)).unwrap();
        }
        assert_eq!(store.educational_stages().unwrap(), vec!["2", "1", "3"]);
        assert_eq!(store.count_interests().unwrap(), 4);
    }

    #[test]
    fn test_stats() {
        let store = TecStore::open_in_memory().unwrap();
        store.insert_member(&academic("Ali", "Rezaei", COMPUTER)).unwrap();
        store.insert_member(&Member::new("Reza", "Moradi", "1234").with_field(COMPUTER)).unwrap();
        store.insert_interest(&Interest::new("Networks", COMPUTER, "1")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(
            stats,
            DbStats { members: 2, academics: 1, authorities: 1, interests: 1, stages: 1 }
        );
    }

    #[test]
    fn test_template_copied_on_first_open_only() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("bundled.db");
        let target = dir.path().join("data").join("tec.db");

        {
            let seed = TecStore::open(&template).unwrap();
            seed.insert_member(&academic("Ali", "Rezaei", COMPUTER)).unwrap();
        }

        let store = TecStore::open_from_template(&template, &target, LocaleCollation::default()).unwrap();
        assert_eq!(store.count_members().unwrap(), 1);
        store.insert_member(&academic("Sara", "Karimi", COMPUTER)).unwrap();
        drop(store);

        let reopened = TecStore::open_from_template(&template, &target, LocaleCollation::default()).unwrap();
        assert_eq!(reopened.count_members().unwrap(), 2);
    }

    #[test]
    fn test_failed_template_copy_leaves_no_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tec.db");

        let result = TecStore::open_from_template(&dir.path().join("missing.db"), &target, LocaleCollation::default());
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!target.exists());
        assert!(!dir.path().join("tec.db.partial").exists());
    }

    #[test]
    fn test_data_version_tracks_other_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tec.db");
        let reader = TecStore::open(&path).unwrap();
        let writer = TecStore::open(&path).unwrap();

        let before = reader.data_version().unwrap();
        reader.insert_member(&academic("Own", "Write", COMPUTER)).unwrap();
        assert_eq!(reader.data_version().unwrap(), before);

        writer.insert_member(&academic("Ali", "Rezaei", COMPUTER)).unwrap();
        assert_ne!(reader.data_version().unwrap(), before);
    }

    #[test]
    fn test_field_filter_is_exact() {
        let store = TecStore::open_in_memory().unwrap();
        store.insert_member(&academic("Ali", "Rezaei", "کامپیوتر\u{200C}")).unwrap();

        assert!(store.academics(COMPUTER, "").unwrap().is_empty());
        assert!(store.academics("", "").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.db");
        std::fs::write(&path, b"this is definitely not an sqlite database file, just text padding").unwrap();

        let err = TecStore::open(&path).err().unwrap();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }
}
