use serde::{Deserialize, Serialize};

pub mod roster;

/// Identifier used as giver or recipient of questions which are about the
/// class as a whole rather than a specific participant.
pub const GENERAL_IDENTIFIER: &str = "%GENERAL%";
/// Pseudo-team that instructors are placed in.
pub const INSTRUCTORS_TEAM: &str = "Instructors";
pub const DEFAULT_SECTION: &str = "None";
pub const NO_SPECIFIC_SECTION: &str = "No specific section";
/// Shown in place of a participant who has no displayable name.
pub const NOBODY_TEXT: &str = "-";
pub const UNKNOWN_TEXT: &str = "Unknown user";

/// The feedback session the results belong to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub course_id: String,
    pub name: String,
    /// IANA time zone name, e.g. `Asia/Singapore`.
    pub time_zone: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Student {
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub team: String,
    pub section: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instructor {
    pub email: String,
    pub name: String,
}
