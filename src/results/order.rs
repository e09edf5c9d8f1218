//! Orderings over responses.
//!
//! Every named order is a list of [`SortKey`]s compared lexicographically.
//! All of them end with the answer text and then the response id, which
//! makes each order total over responses with distinct ids.

use std::cmp::Ordering;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    feedback::{Question, Response, ResponseView},
    results::{
        DisplayResponse, ResultsBundle,
        names::{NameEntry, NameTables},
        visibility::{Side, VisibilityTable, is_visible},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortKey {
    GiverSection,
    /// The giver's team, or the giver's name if they have no team.
    GiverTeam,
    /// The giver's entry in the name table.
    GiverName,
    /// The giver's displayed name.
    GiverDisplayName,
    /// The giver identifier itself.
    GiverEmail,
    RecipientSection,
    RecipientTeam,
    RecipientName,
    RecipientDisplayName,
    RecipientEmail,
    /// Question number, then question id.
    Question,
    Answer,
    Identity,
}

impl SortKey {
    fn participant(self) -> Option<(Side, NameSource)> {
        Some(match self {
            SortKey::GiverTeam => (Side::Giver, NameSource::Team),
            SortKey::GiverName => (Side::Giver, NameSource::Entry),
            SortKey::GiverDisplayName => (Side::Giver, NameSource::Display),
            SortKey::GiverEmail => (Side::Giver, NameSource::Identifier),
            SortKey::RecipientTeam => (Side::Recipient, NameSource::Team),
            SortKey::RecipientName => (Side::Recipient, NameSource::Entry),
            SortKey::RecipientDisplayName => {
                (Side::Recipient, NameSource::Display)
            }
            SortKey::RecipientEmail => (Side::Recipient, NameSource::Identifier),
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NameSource {
    Team,
    Entry,
    Display,
    Identifier,
}

/// The named orders used by the results views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseOrder {
    GiverRecipientQuestion,
    GiverRecipient,
    TeamGiverRecipientQuestion,
    RecipientGiverQuestion,
    TeamRecipientGiverQuestion,
    GiverQuestionTeamRecipient,
    TeamGiverQuestionTeamRecipient,
    RecipientQuestionTeamGiver,
    TeamRecipientQuestionTeamGiver,
    TeamQuestionRecipientTeamGiver,
    TeamQuestionGiverTeamRecipient,
    RecipientNameEmailGiverNameEmail,
}

impl ResponseOrder {
    pub const ALL: [ResponseOrder; 12] = [
        ResponseOrder::GiverRecipientQuestion,
        ResponseOrder::GiverRecipient,
        ResponseOrder::TeamGiverRecipientQuestion,
        ResponseOrder::RecipientGiverQuestion,
        ResponseOrder::TeamRecipientGiverQuestion,
        ResponseOrder::GiverQuestionTeamRecipient,
        ResponseOrder::TeamGiverQuestionTeamRecipient,
        ResponseOrder::RecipientQuestionTeamGiver,
        ResponseOrder::TeamRecipientQuestionTeamGiver,
        ResponseOrder::TeamQuestionRecipientTeamGiver,
        ResponseOrder::TeamQuestionGiverTeamRecipient,
        ResponseOrder::RecipientNameEmailGiverNameEmail,
    ];

    pub fn keys(self) -> &'static [SortKey] {
        use SortKey::*;

        match self {
            ResponseOrder::GiverRecipientQuestion => &[
                GiverSection,
                GiverName,
                RecipientName,
                Question,
                Answer,
                Identity,
            ],
            ResponseOrder::GiverRecipient => &[
                GiverName,
                RecipientName,
                Answer,
                Identity,
            ],
            ResponseOrder::TeamGiverRecipientQuestion => &[
                GiverSection,
                GiverTeam,
                GiverName,
                RecipientName,
                Question,
                Answer,
                Identity,
            ],
            ResponseOrder::RecipientGiverQuestion => &[
                RecipientSection,
                RecipientName,
                GiverName,
                Question,
                Answer,
                Identity,
            ],
            ResponseOrder::TeamRecipientGiverQuestion => &[
                RecipientSection,
                RecipientTeam,
                RecipientName,
                GiverName,
                Question,
                Answer,
                Identity,
            ],
            ResponseOrder::GiverQuestionTeamRecipient => &[
                GiverSection,
                GiverName,
                Question,
                RecipientTeam,
                RecipientName,
                Answer,
                Identity,
            ],
            ResponseOrder::TeamGiverQuestionTeamRecipient => &[
                GiverSection,
                GiverTeam,
                GiverName,
                Question,
                RecipientTeam,
                RecipientName,
                Answer,
                Identity,
            ],
            ResponseOrder::RecipientQuestionTeamGiver => &[
                RecipientSection,
                RecipientName,
                Question,
                GiverTeam,
                GiverName,
                Answer,
                Identity,
            ],
            ResponseOrder::TeamRecipientQuestionTeamGiver => &[
                RecipientSection,
                RecipientTeam,
                RecipientName,
                Question,
                GiverTeam,
                GiverName,
                Answer,
                Identity,
            ],
            ResponseOrder::TeamQuestionRecipientTeamGiver => &[
                RecipientTeam,
                Question,
                RecipientName,
                GiverTeam,
                GiverName,
                Answer,
                Identity,
            ],
            ResponseOrder::TeamQuestionGiverTeamRecipient => &[
                GiverTeam,
                Question,
                GiverName,
                RecipientTeam,
                RecipientName,
                Answer,
                Identity,
            ],
            ResponseOrder::RecipientNameEmailGiverNameEmail => &[
                RecipientDisplayName,
                RecipientEmail,
                GiverDisplayName,
                GiverEmail,
                Answer,
                Identity,
            ],
        }
    }
}

/// A name as seen by the comparators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKey<'a> {
    Nobody,
    Named(&'a str),
    Missing,
    Team,
}

impl NameKey<'_> {
    fn rank(self) -> u8 {
        match self {
            NameKey::Nobody => 0,
            NameKey::Named(_) => 1,
            NameKey::Missing => 2,
            NameKey::Team => 3,
        }
    }
}

/// Compares two display strings ignoring case first, so that `alice` sorts
/// before `Bob`.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect_vec();
    folded(a).cmp(&folded(b)).then_with(|| a.cmp(b))
}

/// The one rule every name comparison goes through.
///
/// Hidden names sort after visible ones and compare equal among
/// themselves. Visible names order as nobody, then real names, then unknown
/// identifiers, then teams.
pub fn compare_names(
    a: NameKey<'_>,
    a_visible: bool,
    b: NameKey<'_>,
    b_visible: bool,
) -> Ordering {
    match (a_visible, b_visible) {
        (false, false) => return Ordering::Equal,
        (false, true) => return Ordering::Greater,
        (true, false) => return Ordering::Less,
        (true, true) => {}
    }

    a.rank().cmp(&b.rank()).then_with(|| match (a, b) {
        (NameKey::Named(a), NameKey::Named(b)) => collate(a, b),
        _ => Ordering::Equal,
    })
}

/// Everything a comparator needs to look at.
#[derive(Clone, Copy, Debug)]
pub struct OrderContext<'a> {
    questions: &'a IndexMap<String, Question>,
    names: &'a NameTables,
    visibility: &'a VisibilityTable,
}

impl<'a> OrderContext<'a> {
    pub fn new(
        questions: &'a IndexMap<String, Question>,
        names: &'a NameTables,
        visibility: &'a VisibilityTable,
    ) -> Self {
        Self {
            questions,
            names,
            visibility,
        }
    }

    pub fn compare<R: ResponseView>(
        &self,
        order: ResponseOrder,
        a: &R,
        b: &R,
    ) -> Ordering {
        order
            .keys()
            .iter()
            .map(|key| self.compare_by(*key, a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub fn compare_by<R: ResponseView>(
        &self,
        key: SortKey,
        a: &R,
        b: &R,
    ) -> Ordering {
        if let Some((side, source)) = key.participant() {
            return self.compare_participants(side, source, a, b);
        }

        match key {
            SortKey::GiverSection => a.giver_section().cmp(b.giver_section()),
            SortKey::RecipientSection => {
                a.recipient_section().cmp(b.recipient_section())
            }
            SortKey::Question => self.compare_questions(a, b),
            SortKey::Answer => a.answer().cmp(b.answer()),
            SortKey::Identity => a.id().cmp(b.id()),
            _ => Ordering::Equal,
        }
    }

    /// Unknown questions compare as equal to anything.
    pub fn compare_questions<R: ResponseView>(&self, a: &R, b: &R) -> Ordering {
        match (
            self.questions.get(a.question_id()),
            self.questions.get(b.question_id()),
        ) {
            (Some(a), Some(b)) => a.cmp_position(b),
            _ => Ordering::Equal,
        }
    }

    fn compare_participants<R: ResponseView>(
        &self,
        side: Side,
        source: NameSource,
        a: &R,
        b: &R,
    ) -> Ordering {
        compare_names(
            self.name_key(source, participant(side, a)),
            self.is_visible(side, a),
            self.name_key(source, participant(side, b)),
            self.is_visible(side, b),
        )
    }

    fn is_visible<R: ResponseView>(&self, side: Side, response: &R) -> bool {
        is_visible(
            side,
            response,
            self.questions.get(response.question_id()),
            self.visibility,
        )
    }

    fn name_key<'s>(&'s self, source: NameSource, identifier: &'s str) -> NameKey<'s> {
        let entry = self.names.entry(identifier);
        match (source, entry) {
            (_, NameEntry::Nobody) => NameKey::Nobody,
            (NameSource::Identifier, _) => NameKey::Named(identifier),
            (NameSource::Team, _) => {
                NameKey::Named(self.names.team_or_name(identifier))
            }
            (NameSource::Entry | NameSource::Display, NameEntry::Missing) => {
                NameKey::Missing
            }
            (NameSource::Entry, NameEntry::Team) => NameKey::Team,
            (NameSource::Entry, NameEntry::Named(name)) => NameKey::Named(name),
            (NameSource::Display, _) => {
                NameKey::Named(self.names.name_for(identifier))
            }
        }
    }
}

fn participant(side: Side, response: &impl ResponseView) -> &str {
    match side {
        Side::Giver => response.giver(),
        Side::Recipient => response.recipient(),
    }
}

impl ResultsBundle {
    pub fn order_context(&self) -> OrderContext<'_> {
        OrderContext::new(self.questions(), self.names(), self.visibility())
    }

    pub fn compare<R: ResponseView>(
        &self,
        order: ResponseOrder,
        a: &R,
        b: &R,
    ) -> Ordering {
        self.order_context().compare(order, a, b)
    }

    /// The displayed responses in the given order.
    pub fn sorted_responses(&self, order: ResponseOrder) -> Vec<&DisplayResponse> {
        let context = self.order_context();
        self.responses()
            .iter()
            .sorted_by(|a, b| context.compare(order, *a, *b))
            .collect()
    }

    /// The real responses to `question` ordered by giver, recipient and
    /// question, for anonymous statistics.
    pub fn actual_responses_sorted_by_gqr(
        &self,
        question: &Question,
    ) -> Vec<&Response> {
        let context = self.order_context();
        self.actual_responses_for(question)
            .into_iter()
            .sorted_by(|a, b| {
                context.compare(ResponseOrder::GiverRecipientQuestion, *a, *b)
            })
            .collect()
    }
}
