//! Server-side composition of the reading page: which chapter to show, how
//! its text is segmented, and the typography it is shown in.

use crate::helper::i18n_helpers::Dictionaries;
use crate::helper::public_helpers::{CatalogError, PublishedWork};
use crate::helper::rendering_helpers::{self, Body, RenderParams, ResolvedStyle};
use crate::models::{AuthorRef, Language, WorkSummary, WorkType};
use serde::Serialize;
use tera::{Context, Tera};

#[derive(Debug, Clone, Serialize)]
pub struct TagLabel {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaderView {
    pub locale: Language,
    pub slug: String,
    pub title: String,
    pub work_type: WorkType,
    pub author: AuthorRef,
    pub tags: Vec<TagLabel>,
    pub view_count: u64,
    /// Chapter heading; only set for works read chapter by chapter.
    pub heading: Option<String>,
    /// `None` when there is no text yet.
    pub body: Option<Body>,
    pub chapter: usize,
    pub chapter_count: usize,
    pub previous_chapter: Option<usize>,
    pub next_chapter: Option<usize>,
    pub style: ResolvedStyle,
    pub params: RenderParams,
}

/// Builds the view for `chapter` (1-based, default 1). A chapter beyond the
/// work's last one is reported as missing.
pub fn compose_reader_view(
    published: &PublishedWork,
    locale: Language,
    dictionaries: &Dictionaries,
    chapter: Option<usize>,
) -> Result<ReaderView, CatalogError> {
    let work = &published.work;
    let summary = &work.summary;
    let style = published.resolved_style;
    let requested = chapter.unwrap_or(1);

    let chaptered = summary.work_type == WorkType::Novel && !work.chapters.is_empty();
    let chapter_count = if chaptered { work.chapters.len() } else { 1 };
    if requested == 0 || requested > chapter_count {
        return Err(CatalogError::NotFound);
    }

    let (heading, text) = if chaptered {
        let selected = &work.chapters[requested - 1];
        let heading = selected
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("{} {}", dictionaries.text(locale, "chapter"), selected.order));
        (Some(heading), selected.content.as_str())
    } else {
        (None, summary.content.as_deref().unwrap_or(""))
    };

    let body = if text.trim().is_empty() {
        None
    } else {
        Some(rendering_helpers::segment(summary.work_type, text, &style, requested == 1))
    };

    Ok(ReaderView {
        locale,
        slug: summary.slug.clone(),
        title: summary.title.clone(),
        work_type: summary.work_type,
        author: summary.author.clone(),
        tags: summary
            .tags
            .iter()
            .map(|t| TagLabel { slug: t.slug.clone(), name: t.name_for(locale).to_string() })
            .collect(),
        view_count: summary.view_count,
        heading,
        body,
        chapter: requested,
        chapter_count,
        previous_chapter: (requested > 1).then(|| requested - 1),
        next_chapter: (requested < chapter_count).then(|| requested + 1),
        style,
        params: published.render_params.clone(),
    })
}

pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("work.html", include_str!("../../templates/work.html")),
        ("works.html", include_str!("../../templates/works.html")),
    ])?;
    Ok(tera)
}

pub fn render_reader_page(tera: &Tera, view: &ReaderView, dictionaries: &Dictionaries) -> Result<String, tera::Error> {
    let mut ctx = Context::new();
    ctx.insert("locale", &view.locale);
    ctx.insert("view", view);
    ctx.insert("t", &dictionaries.for_locale(view.locale));
    tera.render("work.html", &ctx)
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingItem {
    pub slug: String,
    pub title: String,
    pub author_name: String,
    pub type_label: String,
    pub excerpt: Option<String>,
}

pub fn render_listing_page(
    tera: &Tera,
    works: &[WorkSummary],
    locale: Language,
    dictionaries: &Dictionaries,
) -> Result<String, tera::Error> {
    let items: Vec<ListingItem> = works
        .iter()
        .map(|w| ListingItem {
            slug: w.slug.clone(),
            title: w.title.clone(),
            author_name: w.author.name.clone(),
            type_label: dictionaries
                .text(locale, &format!("type_{}", w.work_type))
                .to_string(),
            excerpt: w.excerpt.clone(),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("locale", &locale);
    ctx.insert("works", &items);
    ctx.insert("t", &dictionaries.for_locale(locale));
    tera.render("works.html", &ctx)
}
