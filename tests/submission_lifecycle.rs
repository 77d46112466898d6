mod common;

use common::{count_rows, poem_body, store, submit, work_slug};
use inkwell_backend::helper::public_helpers;
use inkwell_backend::helper::submission_helpers::{self, Decision, DecisionRequest, SubmissionError};
use inkwell_backend::models::rendering_config::{FontFamily, TextAlign};
use inkwell_backend::models::{SubmissionStatus, WorkType};
use serde_json::json;
use std::thread;

fn decision(submission_id: &str, action: &str) -> DecisionRequest {
    DecisionRequest {
        submission_id: Some(submission_id.to_string()),
        action: Some(action.to_string()),
        rendering_config: None,
    }
}

fn status_of(pool: &inkwell_backend::DbPool, id: &str) -> SubmissionStatus {
    submission_helpers::list_submissions(pool)
        .unwrap()
        .into_iter()
        .find(|s| s.submission.id == id)
        .map(|s| s.submission.status)
        .unwrap()
}

#[test]
fn approving_a_novel_publishes_its_chapters() {
    let store = store();
    let id = submit(
        &store.pool,
        json!({
            "title": "The Long Road",
            "authorName": "Ada Quill",
            "language": "en",
            "type": "NOVEL",
            "chapters": [
                { "title": "", "content": "It began in the rain." },
                { "title": "Ch2", "content": "It ended in the sun." }
            ],
            "submitterEmail": "ada@example.org",
        }),
    );

    let work_id = submission_helpers::approve_submission(&store.pool, &id, None).unwrap();
    let slug = work_slug(&store.pool, &work_id);
    let published = public_helpers::fetch_published_work(&store.pool, &store.views, &slug).unwrap();

    assert_eq!(published.work.summary.work_type, WorkType::Novel);
    assert_eq!(published.work.summary.content, None);
    assert_eq!(published.work.summary.excerpt.as_deref(), Some("It began in the rain...."));

    let chapters = &published.work.chapters;
    assert_eq!(chapters.len(), 2);
    assert_eq!((chapters[0].order, chapters[0].title.as_deref()), (1, Some("Chapter 1")));
    assert_eq!((chapters[1].order, chapters[1].title.as_deref()), (2, Some("Ch2")));
    assert_eq!(chapters[1].content, "It ended in the sun.");

    assert_eq!(status_of(&store.pool, &id), SubmissionStatus::Approved);
}

#[test]
fn approving_a_poem_keeps_its_text_verbatim() {
    let store = store();
    let id = submit(&store.pool, poem_body("Two Lines", "Ada Quill", "line1\nline2"));

    let work_id = submission_helpers::approve_submission(&store.pool, &id, None).unwrap();
    let slug = work_slug(&store.pool, &work_id);
    let published = public_helpers::fetch_published_work(&store.pool, &store.views, &slug).unwrap();

    assert_eq!(published.work.summary.content.as_deref(), Some("line1\nline2"));
    assert_eq!(published.work.summary.excerpt.as_deref(), Some("line1\nline2..."));
    assert!(published.work.chapters.is_empty());
    assert_eq!(published.resolved_style.text_align, TextAlign::Center);
}

#[test]
fn approval_stores_the_chosen_rendering_config() {
    let store = store();
    let id = submit(&store.pool, poem_body("Styled", "Ada Quill", "Some text."));

    let request = DecisionRequest {
        rendering_config: Some(json!({ "fontFamily": "fraktur", "dropCap": true })),
        ..decision(&id, "approve")
    };
    let Decision::Approved { work_id } = submission_helpers::decide_submission(&store.pool, request).unwrap() else {
        panic!("expected approval");
    };

    let slug = work_slug(&store.pool, &work_id);
    let published = public_helpers::fetch_published_work(&store.pool, &store.views, &slug).unwrap();
    assert_eq!(published.resolved_style.font_family, FontFamily::Fraktur);
    assert!(published.resolved_style.drop_cap);
}

#[test]
fn invalid_rendering_config_is_rejected_before_anything_changes() {
    let store = store();
    let id = submit(&store.pool, poem_body("Styled", "Ada Quill", "Some text."));

    let request = DecisionRequest {
        rendering_config: Some(json!({ "fontFamily": "comic-sans" })),
        ..decision(&id, "approve")
    };
    let result = submission_helpers::decide_submission(&store.pool, request);

    assert!(matches!(result, Err(SubmissionError::Validation(_))));
    assert_eq!(status_of(&store.pool, &id), SubmissionStatus::Pending);
    assert_eq!(count_rows(&store.pool, "works"), 0);
}

#[test]
fn concurrent_approvals_publish_exactly_once() {
    let store = store();
    let id = submit(&store.pool, poem_body("Race", "Ada Quill", "Only once."));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let pool = store.pool.clone();
            let id = id.clone();
            thread::spawn(move || submission_helpers::approve_submission(&pool, &id, None))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let approved = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(SubmissionError::AlreadyProcessed)))
        .count();
    assert_eq!((approved, conflicts), (1, 1));
    assert_eq!(count_rows(&store.pool, "works"), 1);
    assert_eq!(count_rows(&store.pool, "authors"), 1);
}

#[test]
fn failed_approval_leaves_nothing_behind() {
    let store = store();
    let id = submit(&store.pool, poem_body("Doomed", "Brand New Author", "Text."));
    {
        let conn = store.pool.get().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER refuse_works BEFORE INSERT ON works
             BEGIN SELECT RAISE(ABORT, 'works table is closed'); END;",
        )
        .unwrap();
    }

    let result = submission_helpers::approve_submission(&store.pool, &id, None);

    assert!(matches!(result, Err(SubmissionError::Persistence(_))), "{:?}", result);
    assert_eq!(count_rows(&store.pool, "authors"), 0);
    assert_eq!(count_rows(&store.pool, "works"), 0);
    assert_eq!(status_of(&store.pool, &id), SubmissionStatus::Pending);
}

#[test]
fn a_decided_submission_cannot_be_decided_again() {
    let store = store();
    let approved = submit(&store.pool, poem_body("First", "Ada Quill", "Text."));
    let rejected = submit(&store.pool, poem_body("Second", "Ada Quill", "Text."));

    submission_helpers::decide_submission(&store.pool, decision(&approved, "approve")).unwrap();
    assert_eq!(
        submission_helpers::decide_submission(&store.pool, decision(&rejected, "reject")).unwrap(),
        Decision::Rejected
    );

    for id in [&approved, &rejected] {
        for action in ["approve", "reject"] {
            let result = submission_helpers::decide_submission(&store.pool, decision(id, action));
            assert!(matches!(result, Err(SubmissionError::AlreadyProcessed)), "{} {}", action, id);
        }
    }
    assert_eq!(count_rows(&store.pool, "works"), 1);
    assert_eq!(status_of(&store.pool, &rejected), SubmissionStatus::Rejected);
}

#[test]
fn unknown_submission_is_not_found() {
    let store = store();
    for action in ["approve", "reject"] {
        let result = submission_helpers::decide_submission(&store.pool, decision("no-such-id", action));
        assert!(matches!(result, Err(SubmissionError::NotFound)));
    }
}

#[test]
fn malformed_decisions_are_validation_errors() {
    let store = store();
    let id = submit(&store.pool, poem_body("Poem", "Ada Quill", "Text."));

    let unknown_action = submission_helpers::decide_submission(&store.pool, decision(&id, "publish"));
    assert!(matches!(unknown_action, Err(SubmissionError::Validation(_))));

    let missing_id = DecisionRequest { submission_id: None, ..decision(&id, "approve") };
    assert!(matches!(
        submission_helpers::decide_submission(&store.pool, missing_id),
        Err(SubmissionError::Validation(_))
    ));
    assert_eq!(status_of(&store.pool, &id), SubmissionStatus::Pending);
}

#[test]
fn invalid_submissions_are_not_stored() {
    let store = store();
    let request = serde_json::from_value(json!({
        "title": "No Content",
        "authorName": "Ada Quill",
        "language": "en",
        "submitterEmail": "ada@example.org",
    }))
    .unwrap();

    let result = submission_helpers::submit(&store.pool, request);
    assert!(matches!(result, Err(SubmissionError::Validation(_))));
    assert_eq!(count_rows(&store.pool, "submissions"), 0);
    assert_eq!(count_rows(&store.pool, "users"), 0);
}

#[test]
fn only_known_tags_are_linked_on_approval() {
    let store = store();
    let mut body = poem_body("Tagged", "Ada Quill", "Text.");
    body["tags"] = json!("Liebe, made-up, love");
    let id = submit(&store.pool, body);

    let stored = submission_helpers::list_submissions(&store.pool).unwrap();
    assert_eq!(stored[0].submission.tags, vec!["love".to_string(), "made-up".to_string()]);

    let work_id = submission_helpers::approve_submission(&store.pool, &id, None).unwrap();
    let slug = work_slug(&store.pool, &work_id);
    let published = public_helpers::fetch_published_work(&store.pool, &store.views, &slug).unwrap();
    let linked: Vec<&str> = published.work.summary.tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(linked, vec!["love"]);
}

#[test]
fn submitters_and_authors_are_reused() {
    let store = store();
    let first = submit(&store.pool, poem_body("Herbsttag", "Rainer Maria Rilke", "Herr: es ist Zeit."));
    let second = submit(&store.pool, poem_body("Herbsttag", "Rainer Maria Rilke", "Der Sommer war sehr groß."));
    assert_eq!(count_rows(&store.pool, "users"), 1);

    let first_slug = work_slug(&store.pool, &submission_helpers::approve_submission(&store.pool, &first, None).unwrap());
    let second_slug =
        work_slug(&store.pool, &submission_helpers::approve_submission(&store.pool, &second, None).unwrap());

    assert_eq!(first_slug, "herbsttag");
    assert_ne!(second_slug, first_slug);
    assert!(second_slug.starts_with("herbsttag-"));

    let author = public_helpers::fetch_author(&store.pool, &store.views, "rainer-maria-rilke").unwrap();
    assert_eq!(author.works.len(), 2);
    assert_eq!(count_rows(&store.pool, "authors"), 1);
}

#[test]
fn submissions_are_listed_newest_first_with_submitter() {
    let store = store();
    let older = submit(&store.pool, poem_body("Older", "Ada Quill", "Text."));
    let newer = submit(&store.pool, poem_body("Newer", "Ada Quill", "Text."));

    let listed = submission_helpers::list_submissions(&store.pool).unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.submission.id.as_str()).collect();
    assert_eq!(ids, vec![newer.as_str(), older.as_str()]);
    assert_eq!(listed[0].submitter.email, "poet@example.org");
}
