//! URL slug generation.
//!
//! Every catalog object is addressable by a unique slug. The base slug is derived from the
//! object's name; collisions get a numeric suffix (`-1`, `-2`, …) picked against the set of
//! slugs already stored under the same prefix.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Lower-case ASCII slug. Accented letters fold to their base letter; letters, digits and
/// `_` are kept; whitespace/`-` runs collapse into a single hyphen; everything else is
/// dropped. Leading and trailing `-`/`_` are trimmed.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;

    for c in value.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_ascii_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Base slug for name-keyed objects (publishers, characters, arcs, …).
///
/// Purely numeric names would collide with id-based routes, so they get a `-slug` tail.
pub fn name_slug(name: &str) -> String {
    let trimmed = name.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        slugify(&format!("{trimmed}-slug"))
    } else {
        slugify(trimmed)
    }
}

/// Base slug for a series: `<name>-<year began>`.
pub fn series_slug(name: &str, year_began: i32) -> String {
    slugify(&format!("{name}-{year_began}"))
}

/// Base slug for an issue: `<series slug>-<number>`.
pub fn issue_slug(series_slug: &str, number: &str) -> String {
    slugify(&format!("{series_slug}-{number}"))
}

/// Pick the first free candidate for `base` given the slugs already taken.
///
/// `existing` normally holds every stored slug starting with `base`.
pub fn unique_slug<S: AsRef<str>>(base: &str, existing: &[S]) -> String {
    let taken: HashSet<&str> = existing.iter().map(AsRef::as_ref).collect();
    first_free(base, |candidate| taken.contains(candidate))
}

/// Fresh slugs for every issue of a series, in the order given.
///
/// Numbers that slugify to the same text (`1/2` and `12`, `1.5` and `15`) get suffixes
/// so the batch stays unique, both within itself and against `taken`, the slugs held by
/// issues outside the batch.
pub fn batch_issue_slugs<S: AsRef<str>>(
    series_slug: &str,
    issues: &[(i64, String)],
    taken: &[S],
) -> Vec<(i64, String)> {
    let mut taken: HashSet<String> = taken.iter().map(|s| s.as_ref().to_string()).collect();
    issues
        .iter()
        .map(|(id, number)| {
            let slug = first_free(&issue_slug(series_slug, number), |c| taken.contains(c));
            taken.insert(slug.clone());
            (*id, slug)
        })
        .collect()
}

fn first_free(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}-{i}"))
        .find(|candidate| !is_taken(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Batman / Superman"), "batman-superman");
        assert_eq!(slugify("  The Amazing Spider-Man  "), "the-amazing-spider-man");
        assert_eq!(slugify("X-Men: Gold - Edition"), "x-men-gold-edition");
        assert_eq!(slugify("Who's Who"), "whos-who");
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("Astérix"), "asterix");
        assert_eq!(slugify("Les Légendaires"), "les-legendaires");
        assert_eq!(slugify("Ōkami"), "okami");
    }

    #[test]
    fn slugify_keeps_underscores_inside() {
        assert_eq!(slugify("Gold__Edition"), "gold__edition");
        assert_eq!(slugify("_hidden_ "), "hidden");
    }

    #[test]
    fn numeric_names_get_tail() {
        assert_eq!(name_slug("2099"), "2099-slug");
        assert_eq!(name_slug("Spider-Man 2099"), "spider-man-2099");
    }

    #[test]
    fn series_and_issue_slugs() {
        assert_eq!(series_slug("Final Crisis", 2008), "final-crisis-2008");
        assert_eq!(issue_slug("final-crisis-2008", "1"), "final-crisis-2008-1");
        assert_eq!(issue_slug("sandman-1989", "1/2"), "sandman-1989-12");
    }

    #[test]
    fn unique_slug_skips_taken_candidates() {
        let none: [&str; 0] = [];
        assert_eq!(unique_slug("superman", &none), "superman");
        assert_eq!(unique_slug("superman", &["superman"]), "superman-1");
        assert_eq!(
            unique_slug("superman", &["superman", "superman-1", "superman-3"]),
            "superman-2"
        );
    }

    #[test]
    fn batch_issue_slugs_separates_colliding_numbers() {
        let none: [&str; 0] = [];
        let issues = vec![(1, "1/2".to_string()), (2, "12".to_string()), (3, "1.5".to_string()), (4, "15".to_string())];
        let slugs = batch_issue_slugs("sandman-1989", &issues, &none);
        assert_eq!(
            slugs,
            vec![
                (1, "sandman-1989-12".to_string()),
                (2, "sandman-1989-12-1".to_string()),
                (3, "sandman-1989-15".to_string()),
                (4, "sandman-1989-15-1".to_string()),
            ]
        );
    }

    #[test]
    fn batch_issue_slugs_avoids_slugs_held_elsewhere() {
        let issues = vec![(9, "1".to_string())];
        let slugs = batch_issue_slugs("x-men-1991", &issues, &["x-men-1991-1"]);
        assert_eq!(slugs, vec![(9, "x-men-1991-1-1".to_string())]);
    }

    #[test]
    fn unique_slug_never_returns_an_existing_slug() {
        let existing: Vec<String> = std::iter::once("batman".to_string())
            .chain((1..50).map(|i| format!("batman-{i}")))
            .collect();
        let slug = unique_slug("batman", &existing);
        assert!(!existing.contains(&slug));
        assert_eq!(slug, "batman-50");
    }
}
