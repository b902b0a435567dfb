//! Reprint sync planning.
//!
//! A collection issue (trade paperback, omnibus, hardcover) lists the single issues it
//! reprints. Syncing copies their characters, teams and story titles onto the collection.
//! This module only decides *what* to write; the database layer applies the plan in a
//! single transaction.

use std::collections::HashSet;

use crate::models::FlashMessage;
use crate::models::series_types;

/// Placeholder story title for reprints that have none.
pub const UNTITLED_STORY: &str = "[Untitled]";

/// Reprints with more story titles than this are skipped.
pub const MAX_STORIES: usize = 1;

/// What the collection issue already has.
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    pub series_type_id: i64,
    pub character_ids: Vec<i64>,
    pub team_ids: Vec<i64>,
    pub stories: Vec<String>,
}

/// One reprinted issue. Callers pass these sorted by cover date, then id.
#[derive(Debug, Clone)]
pub struct ReprintSource {
    pub id: i64,
    /// Display label, used when reporting skipped reprints.
    pub display: String,
    pub stories: Vec<String>,
    pub character_ids: Vec<i64>,
    pub team_ids: Vec<i64>,
}

/// Why a sync was refused. Nothing is written in any of these cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRefusal {
    NotCollection,
    NoReprints,
    AlreadyPopulated,
    /// Every usable reprint was empty; `skipped` lists multi-story reprints.
    NothingToAdd { skipped: Vec<String> },
}

impl SyncRefusal {
    pub fn messages(&self) -> Vec<FlashMessage> {
        match self {
            Self::NotCollection => vec![FlashMessage::error(
                "Reprint sync only works for Trade Paperback, Omnibus and Hardcover issues.",
            )],
            Self::NoReprints => vec![FlashMessage::warning("No reprinted issues found.")],
            Self::AlreadyPopulated => vec![FlashMessage::warning(
                "Issue already has characters, teams, or stories assigned.",
            )],
            Self::NothingToAdd { skipped } => {
                let mut messages: Vec<FlashMessage> = skipped_warning(skipped).into_iter().collect();
                messages.push(FlashMessage::warning(
                    "No characters or teams found in the reprinted issues.",
                ));
                messages
            }
        }
    }
}

/// The writes a successful sync performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Characters to add, deduplicated in first-seen order.
    pub character_ids: Vec<i64>,
    pub team_ids: Vec<i64>,
    /// Full story list for the collection.
    pub stories: Vec<String>,
    /// Labels of the reprints that were skipped.
    pub skipped: Vec<String>,
}

impl SyncPlan {
    pub fn messages(&self) -> Vec<FlashMessage> {
        let mut messages: Vec<FlashMessage> = skipped_warning(&self.skipped).into_iter().collect();
        messages.push(FlashMessage::success(format!(
            "Successfully added {} character(s), {} team(s), and {} story title(s) from reprints.",
            self.character_ids.len(),
            self.team_ids.len(),
            self.stories.len()
        )));
        messages
    }
}

fn skipped_warning(skipped: &[String]) -> Option<FlashMessage> {
    if skipped.is_empty() {
        return None;
    }
    Some(FlashMessage::warning(format!(
        "Skipped {} reprint(s) with multiple stories: {}",
        skipped.len(),
        skipped.join(", ")
    )))
}

/// Decide what a reprint sync would write to `collection`.
pub fn plan_reprint_sync(
    collection: &CollectionState,
    reprints: &[ReprintSource],
) -> Result<SyncPlan, SyncRefusal> {
    if !series_types::is_collection(collection.series_type_id) {
        return Err(SyncRefusal::NotCollection);
    }
    if reprints.is_empty() {
        return Err(SyncRefusal::NoReprints);
    }
    if !collection.character_ids.is_empty()
        || !collection.team_ids.is_empty()
        || !collection.stories.is_empty()
    {
        return Err(SyncRefusal::AlreadyPopulated);
    }

    let mut characters = OrderedSet::default();
    let mut teams = OrderedSet::default();
    let mut stories = Vec::new();
    let mut skipped = Vec::new();

    for reprint in reprints {
        if reprint.stories.len() > MAX_STORIES {
            skipped.push(reprint.display.clone());
            continue;
        }

        match reprint.stories.first() {
            Some(story) => stories.push(story.clone()),
            None => stories.push(UNTITLED_STORY.to_string()),
        }
        characters.extend(&reprint.character_ids);
        teams.extend(&reprint.team_ids);
    }

    if characters.is_empty() && teams.is_empty() {
        if !skipped.is_empty() {
            tracing::warn!(skipped = skipped.len(), "reprint sync skipped multi-story reprints");
        }
        return Err(SyncRefusal::NothingToAdd { skipped });
    }

    Ok(SyncPlan {
        character_ids: characters.items,
        team_ids: teams.items,
        stories,
        skipped,
    })
}

#[derive(Default)]
struct OrderedSet {
    seen: HashSet<i64>,
    items: Vec<i64>,
}

impl OrderedSet {
    fn extend(&mut self, ids: &[i64]) {
        for &id in ids {
            if self.seen.insert(id) {
                self.items.push(id);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageLevel;

    fn tpb() -> CollectionState {
        CollectionState {
            series_type_id: series_types::TRADE_PAPERBACK,
            ..Default::default()
        }
    }

    fn reprint(id: i64, stories: &[&str], characters: &[i64], teams: &[i64]) -> ReprintSource {
        ReprintSource {
            id,
            display: format!("Final Crisis (2008) #{id}"),
            stories: stories.iter().map(|s| s.to_string()).collect(),
            character_ids: characters.to_vec(),
            team_ids: teams.to_vec(),
        }
    }

    #[test]
    fn single_story_reprints_are_merged() {
        let plan = plan_reprint_sync(
            &tpb(),
            &[
                reprint(1, &["D.O.A."], &[10, 11], &[3]),
                reprint(2, &["Darkseid Rising"], &[11, 12], &[]),
            ],
        )
        .unwrap();
        assert_eq!(plan.character_ids, vec![10, 11, 12]);
        assert_eq!(plan.team_ids, vec![3]);
        assert_eq!(plan.stories, vec!["D.O.A.", "Darkseid Rising"]);
        assert!(plan.skipped.is_empty());

        let messages = plan.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, MessageLevel::Success);
        assert_eq!(
            messages[0].text,
            "Successfully added 3 character(s), 1 team(s), and 2 story title(s) from reprints."
        );
    }

    #[test]
    fn missing_story_uses_placeholder() {
        let plan = plan_reprint_sync(&tpb(), &[reprint(1, &[], &[10], &[])]).unwrap();
        assert_eq!(plan.stories, vec![UNTITLED_STORY]);
    }

    #[test]
    fn multi_story_reprints_are_never_merged() {
        let plan = plan_reprint_sync(
            &tpb(),
            &[
                reprint(1, &["A", "B"], &[99], &[98]),
                reprint(2, &["C"], &[10], &[]),
            ],
        )
        .unwrap();
        assert_eq!(plan.character_ids, vec![10]);
        assert!(plan.team_ids.is_empty());
        assert_eq!(plan.stories, vec!["C"]);
        assert_eq!(plan.skipped, vec!["Final Crisis (2008) #1"]);

        let messages = plan.messages();
        assert_eq!(messages[0].level, MessageLevel::Warning);
        assert_eq!(
            messages[0].text,
            "Skipped 1 reprint(s) with multiple stories: Final Crisis (2008) #1"
        );
    }

    #[test]
    fn only_collections_can_sync() {
        let state = CollectionState {
            series_type_id: series_types::ANNUAL,
            ..Default::default()
        };
        let err = plan_reprint_sync(&state, &[reprint(1, &["A"], &[1], &[])]).unwrap_err();
        assert_eq!(err, SyncRefusal::NotCollection);
        assert_eq!(err.messages()[0].level, MessageLevel::Error);
    }

    #[test]
    fn no_reprints_is_refused() {
        assert_eq!(
            plan_reprint_sync(&tpb(), &[]).unwrap_err(),
            SyncRefusal::NoReprints
        );
    }

    #[test]
    fn existing_data_blocks_sync() {
        let reprints = [reprint(1, &["A"], &[1], &[])];
        for state in [
            CollectionState { character_ids: vec![5], ..tpb() },
            CollectionState { team_ids: vec![5], ..tpb() },
            CollectionState { stories: vec!["Existing".into()], ..tpb() },
        ] {
            assert_eq!(
                plan_reprint_sync(&state, &reprints).unwrap_err(),
                SyncRefusal::AlreadyPopulated
            );
        }
    }

    #[test]
    fn nothing_collected_writes_nothing() {
        let err = plan_reprint_sync(
            &tpb(),
            &[reprint(1, &["A"], &[], &[]), reprint(2, &["B", "C"], &[7], &[])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SyncRefusal::NothingToAdd {
                skipped: vec!["Final Crisis (2008) #2".into()]
            }
        );
        let messages = err.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].text.starts_with("Skipped 1 reprint(s)"));
    }

    #[test]
    fn visit_order_follows_input() {
        let plan = plan_reprint_sync(
            &tpb(),
            &[reprint(2, &["First"], &[2], &[]), reprint(1, &["Second"], &[1], &[])],
        )
        .unwrap();
        assert_eq!(plan.stories, vec!["First", "Second"]);
        assert_eq!(plan.character_ids, vec![2, 1]);
    }
}
