//! Static reference data that does not live in the database
//!
//! Facility counts, the student headcount and the list of former deans change
//! rarely enough to be compiled in.

use serde::Serialize;
use std::str::FromStr;

use crate::member::Contact;

/// Title and description of the complex history card
pub const COMPLEX_HISTORY: (&str, &str) = (
    "History of the complex",
    "The technical-engineering complex grew out of a single faculty into five \
     fields of study: computer, electrical, mechanical, civil and architectural engineering.",
);

/// Students enrolled; not published anywhere the database could pick it up
pub const STUDENTS: u64 = 4006;

/// Fields of study taught at the complex
pub const FIELDS: u64 = 5;

/// Campus coordinates (latitude, longitude)
pub const MAP_LOCATION: (f64, f64) = (37.2435, 49.5776);

/// URI opening the campus location in a map application
pub fn map_uri() -> String {
    format!("geo:0,0?q={},{}", MAP_LOCATION.0, MAP_LOCATION.1)
}

/// Public contact details of the complex
pub const UNIVERSITY_EMAIL: &str = "info@tec.ac.ir";
pub const UNIVERSITY_PHONE: &str = "013-33690274";
pub const ADDRESS: &str = "Technical-engineering complex, University campus, Rasht";
pub const OPENING_HOURS: &str = "Saturday to Wednesday, 08:00 to 16:00";

pub fn university_email() -> Contact<'static> {
    Contact::Email(UNIVERSITY_EMAIL)
}

pub fn university_phone() -> Contact<'static> {
    Contact::Phone(UNIVERSITY_PHONE)
}

/// A facility and how many the complex has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Facility {
    pub name: &'static str,
    pub count: u32,
}

pub const FACILITIES: &[Facility] = &[
    Facility { name: "Classrooms", count: 15 },
    Facility { name: "Computer sites", count: 3 },
    Facility { name: "Architectural ateliers", count: 52 },
    Facility { name: "Civil laboratory", count: 1 },
    Facility { name: "Electrical laboratories", count: 2 },
    Facility { name: "Mechanical workshops", count: 3 },
];

/// A past dean of the complex and the term they served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormerDean {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub term: &'static str,
}

impl FormerDean {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub const FORMER_DEANS: &[FormerDean] = &[
    FormerDean { first_name: "حسین", last_name: "معز", term: "دوره اول" },
    FormerDean { first_name: "سید علی", last_name: "صدیق ضیابری", term: "دوره دوم" },
    FormerDean { first_name: "فرزانه", last_name: "اسدی ملک جهان", term: "دوره سوم" },
];

/// Department groups as browsed in the directory.
///
/// Electrical and mechanical engineering share a dean and authorities, so they
/// form one group spanning two fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Group {
    Computer,
    ElectricalMechanical,
    Civil,
    Architectural,
}

impl Group {
    /// Field names stored in the database; the second is empty for single-field groups
    pub fn fields(&self) -> (&'static str, &'static str) {
        match self {
            Group::Computer => ("کامپیوتر", ""),
            Group::ElectricalMechanical => ("برق", "مکانیک"),
            Group::Civil => ("عمران", ""),
            Group::Architectural => ("معماری", ""),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Group::Computer => "Computer",
            Group::ElectricalMechanical => "Electrical & Mechanical",
            Group::Civil => "Civil",
            Group::Architectural => "Architectural",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Computer => "computer",
            Group::ElectricalMechanical => "electrical-mechanical",
            Group::Civil => "civil",
            Group::Architectural => "architectural",
        }
    }

    pub fn all() -> &'static [Group] {
        &[
            Group::Computer,
            Group::ElectricalMechanical,
            Group::Civil,
            Group::Architectural,
        ]
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "computer" | "کامپیوتر" => Ok(Group::Computer),
            "electrical-mechanical" | "electrical" | "mechanical" | "برق" | "مکانیک" => {
                Ok(Group::ElectricalMechanical)
            }
            "civil" | "عمران" => Ok(Group::Civil),
            "architectural" | "معماری" => Ok(Group::Architectural),
            _ => Err(format!("Unknown group: {}", s)),
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
