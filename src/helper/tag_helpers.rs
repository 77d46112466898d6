//! Tag entry: canonicalising free-text tokens against the vocabulary and
//! filtering suggestions while a user types.

use crate::models::Tag;

fn matches_tag(tag: &Tag, lowered: &str) -> bool {
    tag.slug.to_lowercase() == lowered
        || tag.name_en.to_lowercase() == lowered
        || tag.name_de.to_lowercase() == lowered
        || tag.name_ru.to_lowercase() == lowered
}

/// Adds one raw token to `committed`. Returns true when the committed set changed.
///
/// The token is trimmed and lowercased. A token already committed is a no-op.
/// A token naming a known tag (by slug or any localized name) commits that
/// tag's slug; anything else commits the lowered text as an ad-hoc tag.
pub fn commit_tag(committed: &mut Vec<String>, raw: &str, vocabulary: &[Tag]) -> bool {
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
        return false;
    }
    if committed.iter().any(|c| c.to_lowercase() == token) {
        return false;
    }

    let canonical = vocabulary
        .iter()
        .find(|tag| matches_tag(tag, &token))
        .map(|tag| tag.slug.clone())
        .unwrap_or(token);

    if committed.contains(&canonical) {
        return false;
    }
    committed.push(canonical);
    true
}

/// Normalizes raw tag entries into an ordered, de-duplicated token list.
/// Each entry may itself be a comma-separated list.
pub fn normalize_tag_list<S: AsRef<str>>(raw: &[S], vocabulary: &[Tag]) -> Vec<String> {
    let mut committed = Vec::new();
    for token in raw.iter().flat_map(|entry| entry.as_ref().split(',')) {
        commit_tag(&mut committed, token, vocabulary);
    }
    committed
}

/// Vocabulary entries whose slug or any localized name contains `query`
/// (case-insensitive), minus tags already committed.
pub fn suggest_tags<'a>(query: &str, committed: &[String], vocabulary: &'a [Tag]) -> Vec<&'a Tag> {
    let query = query.trim().to_lowercase();
    let committed: Vec<String> = committed.iter().map(|c| c.trim().to_lowercase()).collect();

    vocabulary
        .iter()
        .filter(|tag| !committed.iter().any(|c| matches_tag(tag, c)))
        .filter(|tag| {
            [&tag.slug, &tag.name_en, &tag.name_de, &tag.name_ru]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vec<Tag> {
        vec![
            Tag {
                slug: "love".into(),
                name_en: "Love".into(),
                name_de: "Liebe".into(),
                name_ru: "Любовь".into(),
            },
            Tag {
                slug: "nature".into(),
                name_en: "Nature".into(),
                name_de: "Natur".into(),
                name_ru: "Природа".into(),
            },
        ]
    }

    #[test]
    fn localized_name_maps_to_slug() {
        let mut committed = Vec::new();
        assert!(commit_tag(&mut committed, "  LIEBE ", &vocabulary()));
        assert!(commit_tag(&mut committed, "природа", &vocabulary()));
        assert_eq!(committed, vec!["love", "nature"]);
    }

    #[test]
    fn unknown_token_becomes_ad_hoc_tag() {
        let mut committed = Vec::new();
        commit_tag(&mut committed, "Melancholy", &vocabulary());
        assert_eq!(committed, vec!["melancholy"]);
    }

    #[test]
    fn committing_twice_keeps_one_tag() {
        let mut committed = Vec::new();
        assert!(commit_tag(&mut committed, "winter", &vocabulary()));
        assert!(!commit_tag(&mut committed, "Winter", &vocabulary()));
        assert!(commit_tag(&mut committed, "Love", &vocabulary()));
        assert!(!commit_tag(&mut committed, "liebe", &vocabulary()));
        assert_eq!(committed, vec!["winter", "love"]);
    }

    #[test]
    fn empty_tokens_are_ignored() {
        assert_eq!(normalize_tag_list(&[" , ,love,,"], &vocabulary()), vec!["love"]);
        assert!(normalize_tag_list(&[""], &vocabulary()).is_empty());
        assert_eq!(
            normalize_tag_list(&["Liebe, sea", "LOVE", "Natur"], &vocabulary()),
            vec!["love", "sea", "nature"]
        );
    }

    #[test]
    fn suggestions_match_any_name_and_skip_committed() {
        let vocab = vocabulary();
        let slugs = |tags: Vec<&Tag>| tags.into_iter().map(|t| t.slug.clone()).collect::<Vec<_>>();

        assert_eq!(slugs(suggest_tags("nat", &[], &vocab)), vec!["nature"]);
        assert_eq!(slugs(suggest_tags("ЛЮБ", &[], &vocab)), vec!["love"]);
        assert_eq!(slugs(suggest_tags("", &["Liebe".to_string()], &vocab)), vec!["nature"]);
    }
}
