//! Turns a work's stored rendering config into concrete typography, and its
//! text into display blocks.

use crate::models::rendering_config::{FontFamily, Spacing, TextAlign, TextSize};
use crate::models::{RenderingConfig, WorkType};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Every field is decided; nothing is left for the template to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub font_family: FontFamily,
    pub text_align: TextAlign,
    pub font_size: TextSize,
    pub line_height: Spacing,
    pub letter_spacing: Spacing,
    pub drop_cap: bool,
    pub paragraph_spacing: Spacing,
    pub uppercase_header: bool,
    pub show_line_numbers: bool,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        ResolvedStyle {
            font_family: FontFamily::Playfair,
            text_align: TextAlign::Left,
            font_size: TextSize::Lg,
            line_height: Spacing::Relaxed,
            letter_spacing: Spacing::Normal,
            drop_cap: false,
            paragraph_spacing: Spacing::Normal,
            uppercase_header: false,
            show_line_numbers: false,
        }
    }
}

/// Global defaults, then the per-type defaults, then each stored field in turn.
pub fn resolve(work_type: WorkType, stored: Option<&RenderingConfig>) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();

    if work_type == WorkType::Poem {
        style.text_align = TextAlign::Center;
        style.line_height = Spacing::Loose;
    }

    let Some(config) = stored else {
        return style;
    };

    if let Some(v) = config.font_family {
        style.font_family = v;
    }
    if let Some(v) = config.text_align {
        style.text_align = v;
    }
    if let Some(v) = config.font_size {
        style.font_size = v;
    }
    if let Some(v) = config.line_height {
        style.line_height = v;
    }
    if let Some(v) = config.letter_spacing {
        style.letter_spacing = v;
    }
    if let Some(v) = config.drop_cap {
        style.drop_cap = v;
    }
    if let Some(v) = config.paragraph_spacing {
        style.paragraph_spacing = v;
    }
    if let Some(v) = config.uppercase_header {
        style.uppercase_header = v;
    }
    if let Some(v) = config.show_line_numbers {
        style.show_line_numbers = v;
    }
    style
}

/// CSS values for a resolved style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    pub font_stack: &'static str,
    pub text_align: &'static str,
    pub font_size: &'static str,
    pub line_height: &'static str,
    pub letter_spacing: &'static str,
    pub paragraph_spacing: &'static str,
    pub text_transform: &'static str,
}

fn font_stack(font: FontFamily) -> &'static str {
    match font {
        FontFamily::Playfair => "'Playfair Display', Georgia, serif",
        FontFamily::Inter => "'Inter', system-ui, sans-serif",
        FontFamily::Jetbrains => "'JetBrains Mono', ui-monospace, monospace",
        FontFamily::Fraktur => "'UnifrakturMaguntia', 'Playfair Display', serif",
    }
}

fn align_value(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Justify => "justify",
        TextAlign::Right => "right",
    }
}

fn size_value(size: TextSize) -> &'static str {
    match size {
        TextSize::Sm => "1rem",
        TextSize::Base => "1.125rem",
        TextSize::Lg => "1.25rem",
        TextSize::Xl => "1.5rem",
    }
}

fn line_height_value(spacing: Spacing) -> &'static str {
    match spacing {
        Spacing::Tight => "1.25",
        Spacing::Normal => "1.5",
        Spacing::Relaxed => "1.625",
        Spacing::Loose => "2",
    }
}

fn letter_spacing_value(spacing: Spacing) -> &'static str {
    match spacing {
        Spacing::Tight => "-0.025em",
        Spacing::Normal => "0em",
        Spacing::Relaxed => "0.025em",
        Spacing::Loose => "0.1em",
    }
}

fn paragraph_spacing_value(spacing: Spacing) -> &'static str {
    match spacing {
        Spacing::Tight => "0.5rem",
        Spacing::Normal => "1rem",
        Spacing::Relaxed => "1.5rem",
        Spacing::Loose => "2rem",
    }
}

impl ResolvedStyle {
    pub fn params(&self) -> RenderParams {
        RenderParams {
            font_stack: font_stack(self.font_family),
            text_align: align_value(self.text_align),
            font_size: size_value(self.font_size),
            line_height: line_height_value(self.line_height),
            letter_spacing: letter_spacing_value(self.letter_spacing),
            paragraph_spacing: paragraph_spacing_value(self.paragraph_spacing),
            text_transform: if self.uppercase_header { "uppercase" } else { "none" },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub text: String,
    pub drop_cap: bool,
}

/// Display blocks for one body of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Body {
    /// Poems: the text exactly as written, plus its lines for numbering.
    Verbatim { text: String, lines: Vec<String> },
    Paragraphs { paragraphs: Vec<Paragraph> },
}

fn paragraph_break() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid"))
}

/// Splits prose on blank lines. Paragraphs are trimmed and empty ones dropped.
pub fn split_paragraphs(content: &str) -> Vec<String> {
    paragraph_break()
        .split(content)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// `first_block` marks the first chapter of a work (or a work without chapters);
/// only there can the opening paragraph carry a drop cap.
pub fn segment(work_type: WorkType, content: &str, style: &ResolvedStyle, first_block: bool) -> Body {
    if work_type == WorkType::Poem {
        return Body::Verbatim {
            text: content.to_string(),
            lines: content.split('\n').map(str::to_string).collect(),
        };
    }

    let paragraphs = split_paragraphs(content)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Paragraph {
            text,
            drop_cap: style.drop_cap && first_block && i == 0,
        })
        .collect();
    Body::Paragraphs { paragraphs }
}
