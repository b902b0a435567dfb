//! Credit duplication planning: copy the creative team of the previous issue onto a new one.

use crate::models::{FlashMessage, NamedRef};

/// Publishers whose credits are entered issue by issue.
pub const BLOCKED_PUBLISHERS: [&str; 2] = ["DC Comics", "Marvel"];

const COVER_ROLE: &str = "Cover";

/// One credit on the source issue.
#[derive(Debug, Clone)]
pub struct SourceCredit {
    pub creator_id: i64,
    pub creator_name: String,
    pub roles: Vec<NamedRef>,
}

impl SourceCredit {
    /// Cover artists change from issue to issue, so cover-only credits are not carried over.
    pub fn is_cover_only(&self) -> bool {
        self.roles.len() == 1 && self.roles[0].name.eq_ignore_ascii_case(COVER_ROLE)
    }
}

/// A credit to insert: creator plus role ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCredit {
    pub creator_id: i64,
    pub role_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateRefusal {
    BlockedPublisher(String),
    AlreadyHasCredits,
    NoPreviousIssue,
    PreviousHasNoCredits(String),
    OnlyCoverCredits(String),
}

impl DuplicateRefusal {
    pub fn message(&self) -> FlashMessage {
        match self {
            Self::BlockedPublisher(name) => FlashMessage::error(format!(
                "Credits cannot be duplicated for {name} issues."
            )),
            Self::AlreadyHasCredits => FlashMessage::warning("Issue already has credits."),
            Self::NoPreviousIssue => {
                FlashMessage::warning("No previous issue found in this series.")
            }
            Self::PreviousHasNoCredits(previous) => {
                FlashMessage::warning(format!("{previous} has no credits to duplicate."))
            }
            Self::OnlyCoverCredits(previous) => FlashMessage::warning(format!(
                "{previous} only has cover credits, nothing was duplicated."
            )),
        }
    }
}

/// Checks that do not need the previous issue.
pub fn check_target(publisher: &str, existing_credits: usize) -> Result<(), DuplicateRefusal> {
    if BLOCKED_PUBLISHERS.contains(&publisher) {
        return Err(DuplicateRefusal::BlockedPublisher(publisher.to_string()));
    }
    if existing_credits > 0 {
        return Err(DuplicateRefusal::AlreadyHasCredits);
    }
    Ok(())
}

/// Pick the credits of `previous` that should be copied.
pub fn plan_duplicate(
    previous: &str,
    credits: &[SourceCredit],
) -> Result<Vec<PlannedCredit>, DuplicateRefusal> {
    if credits.is_empty() {
        return Err(DuplicateRefusal::PreviousHasNoCredits(previous.to_string()));
    }

    let planned: Vec<PlannedCredit> = credits
        .iter()
        .filter(|c| !c.is_cover_only())
        .map(|c| PlannedCredit {
            creator_id: c.creator_id,
            role_ids: c.roles.iter().map(|r| r.id).collect(),
        })
        .collect();

    if planned.is_empty() {
        return Err(DuplicateRefusal::OnlyCoverCredits(previous.to_string()));
    }
    Ok(planned)
}

pub fn success_message(count: usize, previous: &str) -> FlashMessage {
    FlashMessage::success(format!(
        "Successfully duplicated {count} credit(s) from {previous}."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, name: &str) -> NamedRef {
        NamedRef { id, name: name.into() }
    }

    fn credit(creator_id: i64, roles: Vec<NamedRef>) -> SourceCredit {
        SourceCredit {
            creator_id,
            creator_name: format!("Creator {creator_id}"),
            roles,
        }
    }

    #[test]
    fn blocked_publishers_are_refused() {
        assert_eq!(
            check_target("Marvel", 0),
            Err(DuplicateRefusal::BlockedPublisher("Marvel".into()))
        );
        assert!(check_target("Image", 0).is_ok());
        assert_eq!(check_target("Image", 2), Err(DuplicateRefusal::AlreadyHasCredits));
    }

    #[test]
    fn cover_only_credits_are_skipped() {
        let credits = vec![
            credit(1, vec![role(1, "Writer")]),
            credit(2, vec![role(7, "Cover")]),
            credit(3, vec![role(2, "Artist"), role(7, "Cover")]),
        ];
        let planned = plan_duplicate("Saga (2012) #1", &credits).unwrap();
        assert_eq!(
            planned,
            vec![
                PlannedCredit { creator_id: 1, role_ids: vec![1] },
                PlannedCredit { creator_id: 3, role_ids: vec![2, 7] },
            ]
        );
    }

    #[test]
    fn empty_sources_are_refused() {
        assert_eq!(
            plan_duplicate("Saga (2012) #1", &[]),
            Err(DuplicateRefusal::PreviousHasNoCredits("Saga (2012) #1".into()))
        );
        assert_eq!(
            plan_duplicate("Saga (2012) #1", &[credit(2, vec![role(7, "cover")])]),
            Err(DuplicateRefusal::OnlyCoverCredits("Saga (2012) #1".into()))
        );
    }

    #[test]
    fn success_text() {
        assert_eq!(
            success_message(2, "Saga (2012) #1").text,
            "Successfully duplicated 2 credit(s) from Saga (2012) #1."
        );
    }
}
