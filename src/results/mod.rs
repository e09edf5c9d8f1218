use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineConfig,
    course::{
        GENERAL_IDENTIFIER, INSTRUCTORS_TEAM, NO_SPECIFIC_SECTION, NOBODY_TEXT,
        Session, Student,
        roster::{Roster, RosterData},
    },
    error::BundleError,
    feedback::{
        Comment, ParticipantType, Question, Response, ResponseId, ResponseView,
    },
    results::{
        anonymize::Anonymizer,
        missing::ExpectationMap,
        names::NameTables,
        visibility::{Side, VisibilityTable, is_visible},
    },
};

pub mod anonymize;
pub mod csv;
pub mod group;
pub mod missing;
pub mod names;
pub mod order;
pub mod visibility;

/// Everything a bundle is built from. All of it is fetched (and filtered
/// down to what the viewer may see) by the caller.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BundleInput {
    pub session: Option<Session>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub responses: Vec<Response>,
    pub roster: Option<RosterData>,
    #[serde(default)]
    pub visibility: VisibilityTable,
    #[serde(default)]
    pub expected: ExpectationMap,
    #[serde(default)]
    pub comments: IndexMap<ResponseId, Vec<Comment>>,
    #[serde(default)]
    pub is_complete: bool,
}

/// A response as shown to the viewer.
///
/// `giver` and `recipient` are either the stored identifiers or, when the
/// viewer may not see them, pseudonym keys. The stored identifiers are kept
/// privately and are only reachable through
/// [`ResultsBundle::actual_response`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayResponse {
    pub(crate) giver: String,
    pub(crate) recipient: String,
    pub(crate) actual: Response,
}

impl DisplayResponse {
    fn new(actual: Response) -> Self {
        Self {
            giver: actual.giver.clone(),
            recipient: actual.recipient.clone(),
            actual,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.actual.created_at
    }
}

impl ResponseView for DisplayResponse {
    fn id(&self) -> &ResponseId {
        &self.actual.id
    }

    fn question_id(&self) -> &str {
        &self.actual.question_id
    }

    fn giver(&self) -> &str {
        &self.giver
    }

    fn recipient(&self) -> &str {
        &self.recipient
    }

    fn giver_section(&self) -> &str {
        &self.actual.giver_section
    }

    fn recipient_section(&self) -> &str {
        &self.actual.recipient_section
    }

    fn answer(&self) -> &str {
        &self.actual.answer
    }
}

/// The results of one feedback session as seen by one viewer.
///
/// Built eagerly by [`ResultsBundle::build`] and never modified afterwards;
/// every query borrows and sorts into fresh structures, so a bundle can be
/// shared between readers.
#[derive(Debug)]
pub struct ResultsBundle {
    session: Session,
    questions: IndexMap<String, Question>,
    responses: Vec<DisplayResponse>,
    actual_responses: Vec<Response>,
    missing_responses: Vec<Response>,
    roster: Roster,
    names: NameTables,
    visibility: VisibilityTable,
    comments: IndexMap<ResponseId, Vec<Comment>>,
    comment_giver_names: IndexMap<String, String>,
    roster_team_members: IndexMap<String, BTreeSet<String>>,
    roster_section_teams: IndexMap<String, BTreeSet<String>>,
    is_complete: bool,
}

impl ResultsBundle {
    #[tracing::instrument(
        skip_all,
        fields(course = tracing::field::Empty, session = tracing::field::Empty)
    )]
    pub fn build(
        input: BundleInput,
        config: &EngineConfig,
    ) -> Result<Self, BundleError> {
        let session =
            input.session.ok_or(BundleError::MissingInput("session"))?;
        let roster = Roster::from_data(
            input.roster.ok_or(BundleError::MissingInput("roster"))?,
        );

        let span = tracing::Span::current();
        span.record("course", session.course_id.as_str());
        span.record("session", session.name.as_str());

        let questions: IndexMap<String, Question> = input
            .questions
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();

        let mut seen = HashSet::with_capacity(input.responses.len());
        for response in &input.responses {
            if !seen.insert(&response.id) {
                return Err(BundleError::DuplicateResponse(response.id.clone()));
            }
        }

        let mut responses = input.responses;
        for response in &mut responses {
            let Some(question) = questions.get(&response.question_id) else {
                tracing::warn!(
                    response = %response.id,
                    question = response.question_id.as_str(),
                    "response refers to an unknown question"
                );
                continue;
            };
            // Older team responses were stored under the email of the member
            // who submitted them.
            if question.giver_type == ParticipantType::Teams {
                if let Some(student) = roster.student(&response.giver) {
                    response.giver = student.team.clone();
                }
            }
        }

        let actual_responses = responses.clone();

        let missing_responses = missing::synthesize(
            &session,
            &actual_responses,
            &input.expected,
            &roster,
        );

        let anonymizer = Anonymizer::new(config)?;
        let mut names = NameTables::from_roster(&roster);
        let mut responses: Vec<DisplayResponse> =
            responses.into_iter().map(DisplayResponse::new).collect();
        anonymize::hide_identities(
            &mut responses,
            &questions,
            &input.visibility,
            &mut names,
            &anonymizer,
        );

        let roster_team_members = team_members_table(&roster);
        let roster_section_teams = section_teams_table(&roster);
        let comment_giver_names = roster.email_to_name();

        tracing::debug!(
            responses = responses.len(),
            missing = missing_responses.len(),
            questions = questions.len(),
            "built results bundle"
        );

        Ok(Self {
            session,
            questions,
            responses,
            actual_responses,
            missing_responses,
            roster,
            names,
            visibility: input.visibility,
            comments: input.comments,
            comment_giver_names,
            roster_team_members,
            roster_section_teams,
            is_complete: input.is_complete,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn time_zone(&self) -> &str {
        &self.session.time_zone
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn questions(&self) -> &IndexMap<String, Question> {
        &self.questions
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.get(question_id)
    }

    pub fn question_text(&self, question_id: &str) -> Option<&str> {
        self.question(question_id)
            .map(|question| question.text.as_str())
    }

    /// Responses in the order they were supplied, with hidden identities
    /// replaced.
    pub fn responses(&self) -> &[DisplayResponse] {
        &self.responses
    }

    pub fn missing_responses(&self) -> &[Response] {
        &self.missing_responses
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn names(&self) -> &NameTables {
        &self.names
    }

    pub fn visibility(&self) -> &VisibilityTable {
        &self.visibility
    }

    pub fn comments(&self) -> &IndexMap<ResponseId, Vec<Comment>> {
        &self.comments
    }

    /// Responses with their real identities, for computing anonymous
    /// statistics. Never show these directly.
    pub fn actual_responses(&self) -> &[Response] {
        &self.actual_responses
    }

    pub fn actual_response(&self, id: &ResponseId) -> Option<&Response> {
        self.actual_responses
            .iter()
            .find(|response| &response.id == id)
    }

    pub fn actual_responses_for(&self, question: &Question) -> Vec<&Response> {
        self.actual_responses
            .iter()
            .filter(|response| response.question_id == question.id)
            .collect()
    }

    pub fn is_visible(&self, side: Side, response: &impl ResponseView) -> bool {
        is_visible(
            side,
            response,
            self.question(response.question_id()),
            &self.visibility,
        )
    }

    pub fn is_giver_visible(&self, response: &impl ResponseView) -> bool {
        self.is_visible(Side::Giver, response)
    }

    pub fn is_recipient_visible(&self, response: &impl ResponseView) -> bool {
        self.is_visible(Side::Recipient, response)
    }

    pub fn name_for<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.names.name_for(identifier)
    }

    pub fn last_name_for<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.names.last_name_for(identifier)
    }

    pub fn team_name_for<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.names.team_name_for(identifier)
    }

    pub fn giver_name_for_response<'a>(
        &'a self,
        response: &'a impl ResponseView,
    ) -> &'a str {
        self.names.name_for(response.giver())
    }

    pub fn recipient_name_for_response<'a>(
        &'a self,
        response: &'a impl ResponseView,
    ) -> &'a str {
        self.names.name_for(response.recipient())
    }

    pub fn append_team_name_to_name(&self, name: &str, team: &str) -> String {
        self.names.append_team_name_to_name(name, team)
    }

    pub fn is_email_of_person(&self, identifier: &str) -> bool {
        self.names.is_email_of_person(identifier)
    }

    /// The giver's or recipient's identifier if it is the email of a person
    /// and the viewer may see it, otherwise the nobody text.
    pub fn displayable_email<'a>(
        &self,
        side: Side,
        response: &'a impl ResponseView,
    ) -> &'a str {
        let identifier = match side {
            Side::Giver => response.giver(),
            Side::Recipient => response.recipient(),
        };

        if self.is_email_of_person(identifier) && self.is_visible(side, response)
        {
            identifier
        } else {
            NOBODY_TEXT
        }
    }

    pub fn displayable_email_giver<'a>(
        &self,
        response: &'a impl ResponseView,
    ) -> &'a str {
        self.displayable_email(Side::Giver, response)
    }

    pub fn displayable_email_recipient<'a>(
        &self,
        response: &'a impl ResponseView,
    ) -> &'a str {
        self.displayable_email(Side::Recipient, response)
    }

    fn name_from_roster(&self, identifier: &str, full_name: bool) -> String {
        if identifier == GENERAL_IDENTIFIER {
            return NOBODY_TEXT.to_string();
        }
        if let Some(student) = self.roster.student(identifier) {
            return if full_name {
                student.name.clone()
            } else {
                student.last_name.clone()
            };
        }
        if let Some(instructor) = self.roster.instructor(identifier) {
            return instructor.name.clone();
        }
        if self.roster_team_members.contains_key(identifier) {
            return identifier.to_string();
        }
        String::new()
    }

    /// Full name according to the roster rather than the lookup tables:
    /// the student or instructor name, the team name for a team, and an
    /// empty string otherwise.
    pub fn full_name_from_roster(&self, identifier: &str) -> String {
        self.name_from_roster(identifier, true)
    }

    pub fn last_name_from_roster(&self, identifier: &str) -> String {
        self.name_from_roster(identifier, false)
    }

    pub fn is_email_of_person_from_roster(&self, identifier: &str) -> bool {
        self.roster.is_student(identifier)
            || self.roster.is_instructor(identifier)
    }

    pub fn displayable_email_from_roster<'a>(
        &self,
        identifier: &'a str,
    ) -> &'a str {
        if self.is_email_of_person_from_roster(identifier) {
            identifier
        } else {
            NOBODY_TEXT
        }
    }

    pub fn team_name_from_roster(&self, identifier: &str) -> &str {
        if identifier == GENERAL_IDENTIFIER {
            return NOBODY_TEXT;
        }
        if let Some(student) = self.roster.student(identifier) {
            &student.team
        } else if self.roster.is_instructor(identifier) {
            INSTRUCTORS_TEAM
        } else {
            ""
        }
    }

    pub fn section_from_roster(&self, identifier: &str) -> &str {
        if let Some(student) = self.roster.student(identifier) {
            &student.section
        } else if self.roster.is_instructor(identifier)
            || identifier == GENERAL_IDENTIFIER
        {
            NO_SPECIFIC_SECTION
        } else {
            ""
        }
    }

    /// Emails of the members of a team; for the instructors pseudo-team,
    /// the emails of all instructors.
    pub fn team_members_from_roster(&self, team: &str) -> BTreeSet<String> {
        self.roster_team_members
            .get(team)
            .cloned()
            .unwrap_or_default()
    }

    pub fn teams_in_section_from_roster(&self, section: &str) -> BTreeSet<String> {
        self.roster_section_teams
            .get(section)
            .cloned()
            .unwrap_or_default()
    }

    pub fn sections_in_course(&self) -> BTreeSet<&str> {
        self.roster_section_teams
            .keys()
            .map(String::as_str)
            .collect()
    }

    pub fn roster_team_members(&self) -> &IndexMap<String, BTreeSet<String>> {
        &self.roster_team_members
    }

    pub fn roster_section_teams(&self) -> &IndexMap<String, BTreeSet<String>> {
        &self.roster_section_teams
    }

    /// True if some response was given by an instructor. Someone who is
    /// both instructor and student counts as a student.
    pub fn has_response_from_instructor(&self) -> bool {
        self.responses.iter().any(|response| {
            self.roster.is_instructor(&response.giver)
                && !self.roster.is_student(&response.giver)
        })
    }

    pub fn has_response_to_instructor_or_general(&self) -> bool {
        self.responses.iter().any(|response| {
            self.section_from_roster(&response.recipient) == NO_SPECIFIC_SECTION
        })
    }

    /// True if the student can see a response they did not write, or a
    /// comment on any response.
    pub fn has_something_new_for(&self, student: &Student) -> bool {
        self.responses.iter().any(|response| {
            response.giver != student.email
                || self.comments.contains_key(response.id())
        })
    }
}

fn team_members_table(roster: &Roster) -> IndexMap<String, BTreeSet<String>> {
    let mut table: IndexMap<String, BTreeSet<String>> = roster
        .teams()
        .map(|(team, members)| {
            let emails = members
                .iter()
                .map(|member| member.email.clone())
                .collect();
            (team.to_string(), emails)
        })
        .collect();

    let instructors: BTreeSet<String> = roster
        .instructors()
        .map(|instructor| instructor.email.clone())
        .collect();
    if !instructors.is_empty() {
        table.insert(INSTRUCTORS_TEAM.to_string(), instructors);
    }

    table
}

fn section_teams_table(roster: &Roster) -> IndexMap<String, BTreeSet<String>> {
    roster
        .sections()
        .map(|(section, teams)| {
            (section.to_string(), teams.iter().cloned().collect())
        })
        .collect()
}
