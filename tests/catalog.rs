mod common;

use common::{day, publish, store};
use inkwell_backend::helper::admin_helpers::{self, AdminHelperError, NewTagRequest};
use inkwell_backend::helper::public_helpers::{self, CatalogError};
use inkwell_backend::models::db_operations::works_db_operations::CatalogFilter;
use inkwell_backend::models::{Language, WorkType};
use std::thread;

fn slugs(works: &[inkwell_backend::models::WorkSummary]) -> Vec<&str> {
    works.iter().map(|w| w.slug.as_str()).collect()
}

fn seeded() -> common::TestStore {
    let store = store();
    publish(&store.pool, "Ada Quill", "Oldest", WorkType::Poem, Language::En, day(2001, 1, 1));
    publish(&store.pool, "Boris Pero", "Middle", WorkType::Tale, Language::Ru, day(2010, 6, 1));
    publish(&store.pool, "Ada Quill", "Newest", WorkType::Poem, Language::De, day(2020, 3, 1));
    store
}

#[test]
fn works_are_listed_newest_first() {
    let store = seeded();
    let works = public_helpers::list_works(&store.pool, &store.views, CatalogFilter::default()).unwrap();
    assert_eq!(slugs(&works), vec!["newest", "middle", "oldest"]);
    assert_eq!(works[0].author.name, "Ada Quill");
}

#[test]
fn limit_caps_the_listing() {
    let store = seeded();
    let filter = CatalogFilter { limit: Some(2), ..Default::default() };
    let works = public_helpers::list_works(&store.pool, &store.views, filter).unwrap();
    assert_eq!(slugs(&works), vec!["newest", "middle"]);
}

#[test]
fn language_and_type_filters_combine() {
    let store = seeded();

    let german = CatalogFilter { language: Some(Language::De), ..Default::default() };
    assert_eq!(slugs(&public_helpers::list_works(&store.pool, &store.views, german).unwrap()), vec!["newest"]);

    let tales = CatalogFilter { work_type: Some(WorkType::Tale), ..Default::default() };
    assert_eq!(slugs(&public_helpers::list_works(&store.pool, &store.views, tales).unwrap()), vec!["middle"]);

    let poems = public_helpers::list_poems(&store.pool, &store.views, CatalogFilter::default()).unwrap();
    assert_eq!(slugs(&poems), vec!["newest", "oldest"]);

    let russian_poems = CatalogFilter { language: Some(Language::Ru), ..Default::default() };
    assert!(public_helpers::list_poems(&store.pool, &store.views, russian_poems).unwrap().is_empty());
}

#[test]
fn featured_listing_falls_back_to_latest_when_nothing_is_featured() {
    let store = seeded();
    let featured = CatalogFilter { featured_only: true, limit: Some(2), ..Default::default() };

    let works = public_helpers::list_works(&store.pool, &store.views, featured).unwrap();
    assert_eq!(slugs(&works), vec!["newest", "middle"]);

    admin_helpers::set_featured(&store.pool, "oldest", true).unwrap();
    let works = public_helpers::list_works(&store.pool, &store.views, featured).unwrap();
    assert_eq!(slugs(&works), vec!["oldest"]);
    assert!(works[0].featured);
}

#[test]
fn featuring_an_unknown_work_is_not_found() {
    let store = seeded();
    assert!(matches!(
        admin_helpers::set_featured(&store.pool, "missing", true),
        Err(AdminHelperError::NotFound)
    ));
}

#[test]
fn view_counts_accumulate_and_show_in_listings() {
    let store = seeded();

    assert_eq!(public_helpers::increment_view_count(&store.pool, &store.views, "middle").unwrap(), 1);
    assert_eq!(public_helpers::increment_view_count(&store.pool, &store.views, "middle").unwrap(), 2);

    let works = public_helpers::list_works(&store.pool, &store.views, CatalogFilter::default()).unwrap();
    let counts: Vec<u64> = works.iter().map(|w| w.view_count).collect();
    assert_eq!(counts, vec![0, 2, 0]);

    let work = public_helpers::fetch_published_work(&store.pool, &store.views, "middle").unwrap();
    assert_eq!(work.work.summary.view_count, 2);
}

#[test]
fn concurrent_view_increments_are_not_lost() {
    let store = seeded();

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..50 {
                    public_helpers::increment_view_count(&store.pool, &store.views, "middle").unwrap();
                }
            });
        }
    });

    let work = public_helpers::fetch_published_work(&store.pool, &store.views, "middle").unwrap();
    assert_eq!(work.work.summary.view_count, 400);
}

#[test]
fn unknown_slugs_are_not_found() {
    let store = seeded();
    assert!(matches!(
        public_helpers::fetch_published_work(&store.pool, &store.views, "missing"),
        Err(CatalogError::NotFound)
    ));
    assert!(matches!(
        public_helpers::increment_view_count(&store.pool, &store.views, "missing"),
        Err(CatalogError::NotFound)
    ));
    assert!(matches!(
        public_helpers::fetch_author(&store.pool, &store.views, "nobody"),
        Err(CatalogError::NotFound)
    ));
}

#[test]
fn unpublished_works_are_hidden() {
    let store = seeded();
    {
        let conn = store.pool.get().unwrap();
        conn.execute("UPDATE works SET published = 0 WHERE slug = 'middle'", []).unwrap();
    }

    let works = public_helpers::list_works(&store.pool, &store.views, CatalogFilter::default()).unwrap();
    assert_eq!(slugs(&works), vec!["newest", "oldest"]);
    assert!(matches!(
        public_helpers::fetch_published_work(&store.pool, &store.views, "middle"),
        Err(CatalogError::NotFound)
    ));
    assert!(matches!(
        public_helpers::increment_view_count(&store.pool, &store.views, "middle"),
        Err(CatalogError::NotFound)
    ));
}

#[test]
fn author_page_lists_only_their_works() {
    let store = seeded();
    let author = public_helpers::fetch_author(&store.pool, &store.views, "ada-quill").unwrap();
    assert_eq!(author.author.name, "Ada Quill");
    assert_eq!(slugs(&author.works), vec!["newest", "oldest"]);

    let authors = public_helpers::list_authors(&store.pool).unwrap();
    assert_eq!(authors.len(), 2);
}

#[test]
fn default_vocabulary_is_seeded_and_extensible() {
    let store = store();
    assert_eq!(public_helpers::list_tags(&store.pool).unwrap().len(), 10);

    let suggestions = public_helpers::suggest_tags(&store.pool, "lieb", &[]).unwrap();
    assert_eq!(suggestions.iter().map(|t| t.slug.as_str()).collect::<Vec<_>>(), vec!["love"]);
    assert!(public_helpers::suggest_tags(&store.pool, "lieb", &["love".to_string()]).unwrap().is_empty());

    let request = NewTagRequest {
        slug: Some("sea".into()),
        name_en: Some("Sea".into()),
        name_de: Some("Meer".into()),
        name_ru: Some("Море".into()),
    };
    admin_helpers::add_tag(&store.pool, &request).unwrap();
    assert_eq!(public_helpers::list_tags(&store.pool).unwrap().len(), 11);
    assert!(matches!(
        admin_helpers::add_tag(&store.pool, &request),
        Err(AdminHelperError::Validation(_))
    ));
}
