use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::course::{
    DEFAULT_SECTION, INSTRUCTORS_TEAM, Instructor, NO_SPECIFIC_SECTION,
    NOBODY_TEXT, Student,
};

/// Student and instructor lists as fetched from storage.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RosterData {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
}

/// Name, team and section of a participant identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantInfo {
    pub name: String,
    pub team_name: String,
    pub section_name: String,
}

/// Index over the students and instructors of a course. Built once per
/// results bundle and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    students: IndexMap<String, Student>,
    instructors: IndexMap<String, Instructor>,
    team_members: IndexMap<String, Vec<Student>>,
    section_teams: IndexMap<String, IndexSet<String>>,
}

impl Roster {
    /// Duplicate emails are not expected; if they occur the last record
    /// wins.
    pub fn new(students: Vec<Student>, instructors: Vec<Instructor>) -> Self {
        let students: IndexMap<String, Student> = students
            .into_iter()
            .map(|student| (student.email.clone(), student))
            .collect();

        let instructors = instructors
            .into_iter()
            .map(|instructor| (instructor.email.clone(), instructor))
            .collect();

        let mut team_members: IndexMap<String, Vec<Student>> = IndexMap::new();
        let mut section_teams: IndexMap<String, IndexSet<String>> =
            IndexMap::new();
        for student in students.values() {
            team_members
                .entry(student.team.clone())
                .or_default()
                .push(student.clone());
            section_teams
                .entry(student.section.clone())
                .or_default()
                .insert(student.team.clone());
        }

        Self {
            students,
            instructors,
            team_members,
            section_teams,
        }
    }

    pub fn from_data(data: RosterData) -> Self {
        Self::new(data.students, data.instructors)
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub fn instructors(&self) -> impl Iterator<Item = &Instructor> {
        self.instructors.values()
    }

    pub fn is_student(&self, email: &str) -> bool {
        self.students.contains_key(email)
    }

    pub fn is_instructor(&self, email: &str) -> bool {
        self.instructors.contains_key(email)
    }

    pub fn is_team(&self, name: &str) -> bool {
        self.team_members.contains_key(name)
    }

    pub fn student(&self, email: &str) -> Option<&Student> {
        self.students.get(email)
    }

    pub fn instructor(&self, email: &str) -> Option<&Instructor> {
        self.instructors.get(email)
    }

    pub fn is_student_in_team(&self, email: &str, team: &str) -> bool {
        self.student(email).is_some_and(|student| student.team == team)
    }

    pub fn students_in_same_team(&self, a: &str, b: &str) -> bool {
        match (self.student(a), self.student(b)) {
            (Some(a), Some(b)) => a.team == b.team,
            _ => false,
        }
    }

    /// Members of a team in the order they were enrolled. Empty if there is
    /// no such team.
    pub fn students_of_team(&self, team: &str) -> &[Student] {
        self.team_members
            .get(team)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn teams_of_section(
        &self,
        section: &str,
    ) -> impl Iterator<Item = &str> {
        self.section_teams
            .get(section)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn teams(&self) -> impl Iterator<Item = (&str, &[Student])> {
        self.team_members
            .iter()
            .map(|(team, members)| (team.as_str(), members.as_slice()))
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.section_teams
            .iter()
            .map(|(section, teams)| (section.as_str(), teams))
    }

    /// Email to display name of everyone in the course. A person enrolled as
    /// both student and instructor is listed under their student name.
    pub fn email_to_name(&self) -> IndexMap<String, String> {
        let mut table = IndexMap::new();
        for instructor in self.instructors.values() {
            table.insert(instructor.email.clone(), instructor.name.clone());
        }
        for student in self.students.values() {
            table.insert(student.email.clone(), student.name.clone());
        }
        table
    }

    /// Resolves an identifier as a student, then an instructor, then a team
    /// name.
    pub fn info_for(&self, identifier: &str) -> ParticipantInfo {
        if let Some(student) = self.student(identifier) {
            return ParticipantInfo {
                name: student.name.clone(),
                team_name: student.team.clone(),
                section_name: student.section.clone(),
            };
        }

        if let Some(instructor) = self.instructor(identifier) {
            return ParticipantInfo {
                name: instructor.name.clone(),
                team_name: INSTRUCTORS_TEAM.to_string(),
                section_name: NO_SPECIFIC_SECTION.to_string(),
            };
        }

        if let Some(member) = self.students_of_team(identifier).first() {
            return ParticipantInfo {
                name: identifier.to_string(),
                team_name: identifier.to_string(),
                section_name: member.section.clone(),
            };
        }

        ParticipantInfo {
            name: NOBODY_TEXT.to_string(),
            team_name: NOBODY_TEXT.to_string(),
            section_name: DEFAULT_SECTION.to_string(),
        }
    }
}
