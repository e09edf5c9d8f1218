use std::collections::{HashMap, HashSet};

use crate::course::{
    GENERAL_IDENTIFIER, INSTRUCTORS_TEAM, NOBODY_TEXT, UNKNOWN_TEXT,
    roster::Roster,
};

/// Suffix appended to a pseudonym to label the (equally anonymous) team of
/// the hidden participant.
pub const TEAM_OF_OWNER_SUFFIX: &str = " (Team)";

/// What an identifier resolves to in the lookup tables of a bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameEntry {
    /// Not a known participant.
    Missing,
    /// The "general" participant of class-level questions.
    Nobody,
    /// A team; its display name lives in the team table.
    Team,
    Named(String),
}

static MISSING: NameEntry = NameEntry::Missing;

/// Identifier → name/team tables used by one bundle.
///
/// Seeded from the roster, then extended with pseudonyms while identities
/// are hidden. Entries are never overwritten, so a pseudonym keeps the same
/// label for the rest of the build.
#[derive(Clone, Debug, Default)]
pub struct NameTables {
    names: HashMap<String, NameEntry>,
    last_names: HashMap<String, NameEntry>,
    teams: HashMap<String, String>,
    pseudonym_keys: HashSet<String>,
    pseudonyms: HashSet<String>,
}

impl NameTables {
    pub fn from_roster(roster: &Roster) -> Self {
        let mut tables = Self::default();

        for (team, _) in roster.teams() {
            tables.names.insert(team.to_string(), NameEntry::Team);
            tables.last_names.insert(team.to_string(), NameEntry::Team);
            tables.teams.insert(team.to_string(), team.to_string());
        }

        for instructor in roster.instructors() {
            let name = NameEntry::Named(instructor.name.clone());
            tables.names.insert(instructor.email.clone(), name.clone());
            tables.last_names.insert(instructor.email.clone(), name);
            tables
                .teams
                .insert(instructor.email.clone(), INSTRUCTORS_TEAM.to_string());
        }

        for student in roster.students() {
            tables.names.insert(
                student.email.clone(),
                NameEntry::Named(student.name.clone()),
            );
            tables.last_names.insert(
                student.email.clone(),
                NameEntry::Named(student.last_name.clone()),
            );
            tables
                .teams
                .insert(student.email.clone(), student.team.clone());
        }

        tables
            .names
            .insert(GENERAL_IDENTIFIER.to_string(), NameEntry::Nobody);
        tables
            .last_names
            .insert(GENERAL_IDENTIFIER.to_string(), NameEntry::Nobody);

        tables
    }

    /// Records the label of a freshly minted pseudonym. Calling this again
    /// for the same key has no effect.
    pub(crate) fn register_pseudonym(
        &mut self,
        key: &str,
        pseudonym: &str,
        team: String,
    ) {
        if !self.pseudonym_keys.insert(key.to_string()) {
            return;
        }
        self.pseudonyms.insert(pseudonym.to_string());
        self.names
            .entry(key.to_string())
            .or_insert_with(|| NameEntry::Named(pseudonym.to_string()));
        self.last_names
            .entry(key.to_string())
            .or_insert_with(|| NameEntry::Named(pseudonym.to_string()));
        self.teams.entry(key.to_string()).or_insert(team);
    }

    pub fn entry(&self, identifier: &str) -> &NameEntry {
        self.names.get(identifier).unwrap_or(&MISSING)
    }

    pub fn name_for<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.resolve(self.entry(identifier), identifier)
    }

    pub fn last_name_for<'a>(&'a self, identifier: &'a str) -> &'a str {
        let entry = self.last_names.get(identifier).unwrap_or(&MISSING);
        self.resolve(entry, identifier)
    }

    fn resolve<'a>(&'a self, entry: &'a NameEntry, identifier: &'a str) -> &'a str {
        match entry {
            NameEntry::Missing => UNKNOWN_TEXT,
            NameEntry::Nobody => NOBODY_TEXT,
            NameEntry::Team => self.team_name_for(identifier),
            NameEntry::Named(name) => name,
        }
    }

    pub fn team_name_for<'a>(&'a self, identifier: &'a str) -> &'a str {
        if identifier == GENERAL_IDENTIFIER {
            return NOBODY_TEXT;
        }
        self.teams
            .get(identifier)
            .map(String::as_str)
            .unwrap_or(NOBODY_TEXT)
    }

    /// The team name, or the participant's own name if they have no team.
    pub fn team_or_name<'a>(&'a self, identifier: &'a str) -> &'a str {
        match self.team_name_for(identifier) {
            "" => self.name_for(identifier),
            team => team,
        }
    }

    /// The name a hidden participant is pseudonymised from, if known.
    pub(crate) fn real_name<'a>(&'a self, identifier: &'a str) -> Option<&'a str> {
        match self.entry(identifier) {
            NameEntry::Named(name) => Some(name),
            NameEntry::Team => self.teams.get(identifier).map(String::as_str),
            NameEntry::Missing | NameEntry::Nobody => None,
        }
    }

    pub fn is_pseudonym_key(&self, identifier: &str) -> bool {
        self.pseudonym_keys.contains(identifier)
    }

    pub fn is_pseudonym(&self, name: &str) -> bool {
        self.pseudonyms.contains(name)
    }

    /// True if `identifier` looks like the email of a person rather than a
    /// team name (which may itself contain `@`) or a pseudonym key.
    pub fn is_email_of_person(&self, identifier: &str) -> bool {
        if !identifier.contains('@') || self.is_pseudonym_key(identifier) {
            return false;
        }

        let is_name_or_team = match self.entry(identifier) {
            NameEntry::Named(name) => name == identifier,
            NameEntry::Team => true,
            NameEntry::Missing | NameEntry::Nobody => false,
        };
        let is_team_name = self
            .teams
            .get(identifier)
            .is_some_and(|team| team == identifier);

        !(is_name_or_team || is_team_name)
    }

    /// `name (team)`, unless there is nothing useful to append.
    pub fn append_team_name_to_name(&self, name: &str, team: &str) -> String {
        if self.is_pseudonym(name)
            || name == UNKNOWN_TEXT
            || name == NOBODY_TEXT
            || team.is_empty()
        {
            name.to_string()
        } else {
            format!("{name} ({team})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Instructor, Student};

    fn tables() -> NameTables {
        NameTables::from_roster(&Roster::new(
            vec![
                Student {
                    email: "alice@x.edu".into(),
                    name: "Alice Tan".into(),
                    last_name: "Tan".into(),
                    team: "T1".into(),
                    section: "S1".into(),
                },
                Student {
                    email: "lone@x.edu".into(),
                    name: "Lone Wolf".into(),
                    last_name: "Wolf".into(),
                    team: "".into(),
                    section: "S1".into(),
                },
                Student {
                    email: "at@team.edu".into(),
                    name: "At".into(),
                    last_name: "At".into(),
                    team: "Team@Home".into(),
                    section: "S2".into(),
                },
            ],
            vec![Instructor {
                email: "ins@x.edu".into(),
                name: "Ivy".into(),
            }],
        ))
    }

    #[test]
    fn resolves_roster_identifiers() {
        let tables = tables();
        assert_eq!(tables.name_for("alice@x.edu"), "Alice Tan");
        assert_eq!(tables.last_name_for("alice@x.edu"), "Tan");
        assert_eq!(tables.team_name_for("alice@x.edu"), "T1");
        assert_eq!(tables.name_for("ins@x.edu"), "Ivy");
        assert_eq!(tables.team_name_for("ins@x.edu"), INSTRUCTORS_TEAM);
        assert_eq!(tables.name_for("T1"), "T1");
        assert_eq!(tables.entry("T1"), &NameEntry::Team);
    }

    #[test]
    fn sentinels_for_general_and_unknown() {
        let tables = tables();
        assert_eq!(tables.name_for(GENERAL_IDENTIFIER), NOBODY_TEXT);
        assert_eq!(tables.team_name_for(GENERAL_IDENTIFIER), NOBODY_TEXT);
        assert_eq!(tables.name_for("ghost@x.edu"), UNKNOWN_TEXT);
        assert_eq!(tables.team_name_for("ghost@x.edu"), NOBODY_TEXT);
    }

    #[test]
    fn team_or_name_falls_back_to_name() {
        let tables = tables();
        assert_eq!(tables.team_or_name("alice@x.edu"), "T1");
        assert_eq!(tables.team_or_name("lone@x.edu"), "Lone Wolf");
    }

    #[test]
    fn pseudonym_registration_is_append_only() {
        let mut tables = tables();
        tables.register_pseudonym(
            "Anonymous student 1@Anonymous student 1.com",
            "Anonymous student 1",
            "Anonymous student 1 (Team)".into(),
        );
        tables.register_pseudonym(
            "Anonymous student 1@Anonymous student 1.com",
            "Something else",
            "Other".into(),
        );

        let key = "Anonymous student 1@Anonymous student 1.com";
        assert_eq!(tables.name_for(key), "Anonymous student 1");
        assert_eq!(tables.team_name_for(key), "Anonymous student 1 (Team)");
        assert!(tables.is_pseudonym("Anonymous student 1"));
        assert!(!tables.is_pseudonym("Something else"));
    }

    #[test]
    fn email_of_person() {
        let mut tables = tables();
        assert!(tables.is_email_of_person("alice@x.edu"));
        assert!(tables.is_email_of_person("stranger@x.edu"));
        assert!(!tables.is_email_of_person("T1"));
        assert!(!tables.is_email_of_person("Team@Home"));

        tables.register_pseudonym("p@p.com", "p", "p (Team)".into());
        assert!(!tables.is_email_of_person("p@p.com"));
    }

    #[test]
    fn appends_team_only_for_real_names() {
        let mut tables = tables();
        tables.register_pseudonym("k", "Anonymous team 7", "Anonymous team 7".into());

        assert_eq!(
            tables.append_team_name_to_name("Alice Tan", "T1"),
            "Alice Tan (T1)"
        );
        assert_eq!(tables.append_team_name_to_name("Lone Wolf", ""), "Lone Wolf");
        assert_eq!(
            tables.append_team_name_to_name("Anonymous team 7", "Anonymous team 7"),
            "Anonymous team 7"
        );
        assert_eq!(tables.append_team_name_to_name(UNKNOWN_TEXT, "T1"), UNKNOWN_TEXT);
        assert_eq!(tables.append_team_name_to_name(NOBODY_TEXT, "T1"), NOBODY_TEXT);
    }
}
