use std::collections::HashMap;

use crate::feedback::{
    ParticipantType, Question, ResponseId, ResponseView, Visibility,
};

/// Per-response visibility as computed by the access-control layer for the
/// current viewer.
pub type VisibilityTable = HashMap<ResponseId, Visibility>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Giver,
    Recipient,
}

/// Whether the giver or recipient of `response` may be shown.
///
/// A side whose participant type is [`ParticipantType::None`] is always
/// visible, whatever the table says, since it does not identify anybody.
/// Responses missing from the table are treated as hidden.
pub fn is_visible(
    side: Side,
    response: &impl ResponseView,
    question: Option<&Question>,
    table: &VisibilityTable,
) -> bool {
    let participant_type = question.map(|question| match side {
        Side::Giver => question.giver_type,
        Side::Recipient => question.effective_recipient_type(),
    });
    if participant_type == Some(ParticipantType::None) {
        return true;
    }

    table
        .get(response.id())
        .map(|visibility| match side {
            Side::Giver => visibility.giver,
            Side::Recipient => visibility.recipient,
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Response;

    fn question(giver: ParticipantType, recipient: ParticipantType) -> Question {
        Question {
            id: "q1".into(),
            number: 1,
            text: String::new(),
            giver_type: giver,
            recipient_type: recipient,
        }
    }

    fn response() -> Response {
        Response {
            id: ResponseId::new("q1", "alice@x.edu", "bob@x.edu"),
            question_id: "q1".into(),
            course_id: "C1".into(),
            session_name: "S".into(),
            giver: "alice@x.edu".into(),
            giver_section: "S1".into(),
            recipient: "bob@x.edu".into(),
            recipient_section: "S1".into(),
            answer: "ok".into(),
            created_at: None,
        }
    }

    #[test]
    fn reads_the_requested_side() {
        let response = response();
        let question =
            question(ParticipantType::Students, ParticipantType::Students);
        let table = VisibilityTable::from([(
            response.id.clone(),
            Visibility {
                giver: true,
                recipient: false,
            },
        )]);

        assert!(is_visible(Side::Giver, &response, Some(&question), &table));
        assert!(!is_visible(
            Side::Recipient,
            &response,
            Some(&question),
            &table
        ));
    }

    #[test]
    fn none_recipient_is_always_visible() {
        let response = response();
        let question =
            question(ParticipantType::Students, ParticipantType::None);
        let table =
            VisibilityTable::from([(response.id.clone(), Visibility::HIDDEN)]);

        assert!(is_visible(
            Side::Recipient,
            &response,
            Some(&question),
            &table
        ));
        assert!(is_visible(
            Side::Recipient,
            &response,
            Some(&question),
            &VisibilityTable::new()
        ));
        assert!(!is_visible(Side::Giver, &response, Some(&question), &table));
    }

    #[test]
    fn self_recipient_follows_giver_type() {
        let response = response();
        let question =
            question(ParticipantType::None, ParticipantType::Myself);
        let table =
            VisibilityTable::from([(response.id.clone(), Visibility::HIDDEN)]);

        assert!(is_visible(
            Side::Recipient,
            &response,
            Some(&question),
            &table
        ));
    }

    #[test]
    fn unknown_entries_are_hidden() {
        let response = response();
        let question =
            question(ParticipantType::Students, ParticipantType::Students);

        assert!(!is_visible(
            Side::Giver,
            &response,
            Some(&question),
            &VisibilityTable::new()
        ));
        assert!(!is_visible(
            Side::Giver,
            &response,
            None,
            &VisibilityTable::new()
        ));
    }
}
