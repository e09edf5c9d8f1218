//! Nested views over the displayed responses.
//!
//! Each grouping sorts a fresh list of borrowed responses with the matching
//! [`ResponseOrder`] and then buckets it, so the buckets and the responses
//! inside them come out in that order. The bundle itself is never
//! reordered.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    feedback::{Question, ResponseView},
    results::{DisplayResponse, ResultsBundle, order::ResponseOrder},
};

pub type ByQuestion<'a> = IndexMap<&'a Question, Vec<&'a DisplayResponse>>;
pub type Nested<'a, K> = IndexMap<String, IndexMap<K, Vec<&'a DisplayResponse>>>;

impl ResultsBundle {
    fn question_of(&self, response: &DisplayResponse) -> Option<&Question> {
        let question = self.question(response.question_id());
        if question.is_none() {
            tracing::warn!(
                response = %response.id(),
                question = response.question_id(),
                "leaving response to an unknown question out of the grouping"
            );
        }
        question
    }

    fn questions_in_order(&self) -> impl Iterator<Item = &Question> {
        self.questions()
            .values()
            .sorted_by(|a, b| a.cmp_position(b))
    }

    fn by_question(&self, order: ResponseOrder) -> ByQuestion<'_> {
        let mut map: ByQuestion<'_> = self
            .questions_in_order()
            .map(|question| (question, Vec::new()))
            .collect();

        for response in self.sorted_responses(order) {
            if let Some(question) = self.question_of(response) {
                map.entry(question).or_default().push(response);
            }
        }

        map
    }

    /// Every question in question order (including those without
    /// responses), each with its responses ordered by giver and recipient.
    pub fn question_response_map(&self) -> ByQuestion<'_> {
        self.by_question(ResponseOrder::GiverRecipient)
    }

    /// Like [`Self::question_response_map`], with each question's responses
    /// ordered by recipient name and email, then giver name and email.
    pub fn question_response_map_sorted_by_recipient(&self) -> ByQuestion<'_> {
        self.by_question(ResponseOrder::RecipientNameEmailGiverNameEmail)
    }

    fn by_team_then_question<'a>(
        &'a self,
        order: ResponseOrder,
        participant: impl Fn(&'a DisplayResponse) -> &'a str,
    ) -> Nested<'a, &'a Question> {
        let mut map: Nested<'a, &'a Question> = IndexMap::new();

        for response in self.sorted_responses(order) {
            let Some(question) = self.question_of(response) else {
                continue;
            };
            let team = self.names().team_or_name(participant(response));
            map.entry(team.to_string())
                .or_default()
                .entry(question)
                .or_default()
                .push(response);
        }

        map
    }

    /// recipient team (or name, without a team) → question → responses.
    pub fn question_response_map_by_recipient_team(
        &self,
    ) -> Nested<'_, &Question> {
        self.by_team_then_question(
            ResponseOrder::TeamQuestionRecipientTeamGiver,
            |response| response.recipient(),
        )
    }

    /// giver team (or name, without a team) → question → responses.
    pub fn question_response_map_by_giver_team(&self) -> Nested<'_, &Question> {
        self.by_team_then_question(
            ResponseOrder::TeamQuestionGiverTeamRecipient,
            |response| response.giver(),
        )
    }

    fn by_identifier_then_question<'a>(
        &'a self,
        order: ResponseOrder,
        participant: impl Fn(&'a DisplayResponse) -> &'a str,
    ) -> Nested<'a, &'a Question> {
        let mut map: Nested<'a, &'a Question> = IndexMap::new();

        for response in self.sorted_responses(order) {
            let Some(question) = self.question_of(response) else {
                continue;
            };
            map.entry(participant(response).to_string())
                .or_default()
                .entry(question)
                .or_default()
                .push(response);
        }

        map
    }

    /// recipient identifier → question → responses.
    pub fn responses_by_recipient_question_giver(
        &self,
        by_team: bool,
    ) -> Nested<'_, &Question> {
        let order = if by_team {
            ResponseOrder::TeamRecipientQuestionTeamGiver
        } else {
            ResponseOrder::RecipientQuestionTeamGiver
        };
        self.by_identifier_then_question(order, |response| response.recipient())
    }

    /// giver identifier → question → responses.
    pub fn responses_by_giver_question_recipient(
        &self,
        by_team: bool,
    ) -> Nested<'_, &Question> {
        let order = if by_team {
            ResponseOrder::TeamGiverQuestionTeamRecipient
        } else {
            ResponseOrder::GiverQuestionTeamRecipient
        };
        self.by_identifier_then_question(order, |response| response.giver())
    }

    fn display_name_with_team(&self, identifier: &str) -> String {
        self.append_team_name_to_name(
            self.name_for(identifier),
            self.team_name_for(identifier),
        )
    }

    fn by_pair(
        &self,
        order: ResponseOrder,
        recipient_first: bool,
        key: impl Fn(&str) -> String,
    ) -> Nested<'_, String> {
        let mut map: Nested<'_, String> = IndexMap::new();

        for response in self.sorted_responses(order) {
            let (outer, inner) = if recipient_first {
                (response.recipient(), response.giver())
            } else {
                (response.giver(), response.recipient())
            };
            map.entry(key(outer))
                .or_default()
                .entry(key(inner))
                .or_default()
                .push(response);
        }

        map
    }

    /// recipient name (with team) → giver name (with team) → responses.
    pub fn responses_by_recipient(&self, by_team: bool) -> Nested<'_, String> {
        let order = if by_team {
            ResponseOrder::TeamRecipientGiverQuestion
        } else {
            ResponseOrder::RecipientGiverQuestion
        };
        self.by_pair(order, true, |identifier| {
            self.display_name_with_team(identifier)
        })
    }

    /// giver name (with team) → recipient name (with team) → responses.
    pub fn responses_by_giver(&self, by_team: bool) -> Nested<'_, String> {
        let order = if by_team {
            ResponseOrder::TeamGiverRecipientQuestion
        } else {
            ResponseOrder::GiverRecipientQuestion
        };
        self.by_pair(order, false, |identifier| {
            self.display_name_with_team(identifier)
        })
    }

    /// recipient identifier → giver identifier → responses.
    pub fn responses_by_recipient_giver_question(
        &self,
        by_team: bool,
    ) -> Nested<'_, String> {
        let order = if by_team {
            ResponseOrder::TeamRecipientGiverQuestion
        } else {
            ResponseOrder::RecipientGiverQuestion
        };
        self.by_pair(order, true, str::to_string)
    }

    /// giver identifier → recipient identifier → responses.
    pub fn responses_by_giver_recipient_question(
        &self,
        by_team: bool,
    ) -> Nested<'_, String> {
        let order = if by_team {
            ResponseOrder::TeamGiverRecipientQuestion
        } else {
            ResponseOrder::GiverRecipientQuestion
        };
        self.by_pair(order, false, str::to_string)
    }
}
