//! Member records - deans, academics and authorities
//!
//! A single record type covers every kind of staff member. The role is not
//! stored; it is derived from `dean_of_faculty` together with `interest`:
//! - `Some(true)`: dean of one faculty
//! - `Some(false)`: academic, or dean of the whole complex when `interest` is set
//! - `None`: authority (administrative staff)

use serde::{Deserialize, Serialize};

/// Role of a member, derived from the stored attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Head of the entire complex
    ComplexDean,
    /// Head of one field/department
    FacultyDean,
    Academic,
    /// Administrative staff
    Authority,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ComplexDean => "complex_dean",
            Role::FacultyDean => "faculty_dean",
            Role::Academic => "academic",
            Role::Authority => "authority",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a member is reached: academics publish an email, authorities a phone extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact<'a> {
    Email(&'a str),
    Phone(&'a str),
}

impl Contact<'_> {
    /// URI handed to a mail or dialer application
    pub fn uri(&self) -> String {
        match self {
            Contact::Email(address) => format!("mailto:{}", address),
            Contact::Phone(number) => format!("tel:{}", number),
        }
    }
}

/// A staff member of the complex.
///
/// Two members are equal when their ids match, whatever the other fields hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Row id; 0 until the store assigns one
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Field the member is assigned to; `None` for staff outside any field
    pub field: Option<String>,
    /// Field of interest, only filled in for the dean of the complex
    pub interest: Option<String>,
    /// Academic rank; `None` marks administrative staff
    pub title: Option<String>,
    /// Email for academics, phone extension for authorities
    pub contact_info: String,
    pub dean_of_faculty: Option<bool>,
    /// Encoded profile photo
    #[serde(skip)]
    pub image_bytes: Option<Vec<u8>>,
}

impl Member {
    /// Create an unsaved member with only the required fields
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            field: None,
            interest: None,
            title: None,
            contact_info: contact_info.into(),
            dean_of_faculty: None,
            image_bytes: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_interest(mut self, interest: impl Into<String>) -> Self {
        self.interest = Some(interest.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_dean_of_faculty(mut self, dean: bool) -> Self {
        self.dean_of_faculty = Some(dean);
        self
    }

    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image_bytes = Some(bytes);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Derive the role from `dean_of_faculty` and `interest`
    pub fn role(&self) -> Role {
        match self.dean_of_faculty {
            Some(true) => Role::FacultyDean,
            Some(false) if self.interest.is_some() => Role::ComplexDean,
            Some(false) => Role::Academic,
            None => Role::Authority,
        }
    }

    pub fn contact(&self) -> Contact<'_> {
        match self.dean_of_faculty {
            Some(_) => Contact::Email(&self.contact_info),
            None => Contact::Phone(&self.contact_info),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_bytes.as_ref().is_some_and(|bytes| !bytes.is_empty())
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Member {}

impl std::hash::Hash for Member {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
