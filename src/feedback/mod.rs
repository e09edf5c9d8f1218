use std::{cmp::Ordering, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text stored in the placeholder created for an expected response which was
/// never submitted.
pub const MISSING_RESPONSE_TEXT: &str = "No Response";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    /// Feedback about oneself. As a recipient type this means "the same
    /// kind of participant as the giver".
    #[serde(rename = "SELF")]
    Myself,
    Students,
    StudentsExcludingSelf,
    Instructors,
    Teams,
    TeamsExcludingSelf,
    OwnTeam,
    OwnTeamMembers,
    OwnTeamMembersIncludingSelf,
    Receiver,
    ReceiverTeamMembers,
    /// No specific participant, e.g. feedback about the course as a whole.
    None,
}

impl ParticipantType {
    pub fn singular(self) -> &'static str {
        match self {
            ParticipantType::Students
            | ParticipantType::StudentsExcludingSelf
            | ParticipantType::OwnTeamMembers
            | ParticipantType::OwnTeamMembersIncludingSelf
            | ParticipantType::ReceiverTeamMembers => "student",
            ParticipantType::Instructors => "instructor",
            ParticipantType::Teams
            | ParticipantType::TeamsExcludingSelf
            | ParticipantType::OwnTeam => "team",
            ParticipantType::Myself
            | ParticipantType::Receiver
            | ParticipantType::None => "participant",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Question {
    pub id: String,
    /// Position of the question within the session.
    pub number: u32,
    #[serde(default)]
    pub text: String,
    pub giver_type: ParticipantType,
    pub recipient_type: ParticipantType,
}

impl Question {
    /// Question number, with the id breaking ties between questions that
    /// were (inconsistently) given the same number.
    pub fn cmp_position(&self, other: &Question) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// The type used to describe the recipient. Self-feedback is about a
    /// participant of the giver's type.
    pub fn effective_recipient_type(&self) -> ParticipantType {
        match self.recipient_type {
            ParticipantType::Myself => self.giver_type,
            other => other,
        }
    }
}

/// Stable identity of a response, derived from its question, giver and
/// recipient when it was first stored.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct ResponseId(String);

impl ResponseId {
    pub fn new(question_id: &str, giver: &str, recipient: &str) -> Self {
        Self(format!("{question_id}%{giver}%{recipient}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResponseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A response as stored. Giver and recipient are emails for individuals,
/// team names for teams and [`crate::course::GENERAL_IDENTIFIER`] for
/// general feedback.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub id: ResponseId,
    pub question_id: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub session_name: String,
    pub giver: String,
    #[serde(default)]
    pub giver_section: String,
    pub recipient: String,
    #[serde(default)]
    pub recipient_section: String,
    /// The answer rendered as text.
    pub answer: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Whether the giver and recipient of one response may be shown to the
/// current viewer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub giver: bool,
    pub recipient: bool,
}

impl Visibility {
    pub const HIDDEN: Visibility = Visibility {
        giver: false,
        recipient: false,
    };

    pub const VISIBLE: Visibility = Visibility {
        giver: true,
        recipient: true,
    };
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub response_id: ResponseId,
    /// Email of whoever wrote the comment.
    pub giver: String,
    /// Rich text (HTML) as entered.
    pub text: String,
    /// True if written by the giver or recipient of the response rather than
    /// by an instructor.
    #[serde(default)]
    pub from_participant: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Read access shared by stored responses and the displayed (possibly
/// anonymized) responses of a bundle, so that both can be ordered by the
/// same comparators.
pub trait ResponseView {
    fn id(&self) -> &ResponseId;
    fn question_id(&self) -> &str;
    fn giver(&self) -> &str;
    fn recipient(&self) -> &str;
    fn giver_section(&self) -> &str;
    fn recipient_section(&self) -> &str;
    fn answer(&self) -> &str;
}

impl ResponseView for Response {
    fn id(&self) -> &ResponseId {
        &self.id
    }

    fn question_id(&self) -> &str {
        &self.question_id
    }

    fn giver(&self) -> &str {
        &self.giver
    }

    fn recipient(&self) -> &str {
        &self.recipient
    }

    fn giver_section(&self) -> &str {
        &self.giver_section
    }

    fn recipient_section(&self) -> &str {
        &self.recipient_section
    }

    fn answer(&self) -> &str {
        &self.answer
    }
}

impl<T: ResponseView + ?Sized> ResponseView for &T {
    fn id(&self) -> &ResponseId {
        (**self).id()
    }

    fn question_id(&self) -> &str {
        (**self).question_id()
    }

    fn giver(&self) -> &str {
        (**self).giver()
    }

    fn recipient(&self) -> &str {
        (**self).recipient()
    }

    fn giver_section(&self) -> &str {
        (**self).giver_section()
    }

    fn recipient_section(&self) -> &str {
        (**self).recipient_section()
    }

    fn answer(&self) -> &str {
        (**self).answer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_types_use_screaming_case() {
        let types: Vec<ParticipantType> =
            serde_json::from_str(r#"["SELF", "OWN_TEAM_MEMBERS", "NONE"]"#)
                .unwrap();
        assert_eq!(
            types,
            vec![
                ParticipantType::Myself,
                ParticipantType::OwnTeamMembers,
                ParticipantType::None
            ]
        );
        assert_eq!(
            serde_json::to_string(&ParticipantType::StudentsExcludingSelf)
                .unwrap(),
            r#""STUDENTS_EXCLUDING_SELF""#
        );
    }

    #[test]
    fn response_id_joins_with_percent() {
        let id = ResponseId::new("q1", "alice@x.edu", "bob@x.edu");
        assert_eq!(id.as_str(), "q1%alice@x.edu%bob@x.edu");
    }

    #[test]
    fn self_feedback_takes_giver_type() {
        let question = Question {
            id: "q".into(),
            number: 1,
            text: String::new(),
            giver_type: ParticipantType::Teams,
            recipient_type: ParticipantType::Myself,
        };
        assert_eq!(question.effective_recipient_type(), ParticipantType::Teams);
    }

    #[test]
    fn role_visibility_lists_are_ignored() {
        let question: Question = serde_json::from_str(
            r#"{
                "id": "q1",
                "number": 1,
                "giver_type": "STUDENTS",
                "recipient_type": "SELF",
                "show_giver_name_to": ["INSTRUCTORS"]
            }"#,
        )
        .unwrap();
        assert_eq!(question.text, "");
        assert_eq!(question.effective_recipient_type(), ParticipantType::Students);
    }
}
