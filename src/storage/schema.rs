//! Database schema definitions

/// SQL to create the members table
pub const CREATE_MEMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    field TEXT,
    interest TEXT,
    title TEXT,
    contact_info TEXT NOT NULL,
    dean_of_faculty INTEGER,
    image_bytes BLOB
)
"#;

/// SQL to create the interests table
pub const CREATE_INTERESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS interests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    field TEXT NOT NULL,
    stage TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_members_field ON members(field)",
    "CREATE INDEX IF NOT EXISTS idx_members_dean ON members(dean_of_faculty)",
    "CREATE INDEX IF NOT EXISTS idx_interests_field ON interests(field)",
];

/// Column list shared by every member query, in `row_to_member` order
pub const MEMBER_COLUMNS: &str =
    "id, first_name, last_name, field, interest, title, contact_info, dean_of_faculty, image_bytes";

/// Column list shared by every interest query, in `row_to_interest` order
pub const INTEREST_COLUMNS: &str = "id, name, field, stage";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_MEMBERS_TABLE, CREATE_INTERESTS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
