//! GDD export as a PDF document.
//!
//! Lays the three GDD sections out as real text on A4 pages: a cover
//! header, an executive summary and the numbered Concept / Narrative /
//! Gameplay sections, with word wrap and page breaks.

use anyhow::Result;
use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};

use jamdoc_core::models::Project;

/// Cover metadata collected from the export dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverMeta {
    pub company: String,
    pub authors: String,
    pub version: String,
}

impl Default for CoverMeta {
    fn default() -> Self {
        Self {
            company: String::new(),
            authors: String::new(),
            version: "1.0.0".to_string(),
        }
    }
}

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 48.0;

const TITLE_SIZE: f32 = 22.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Render the project's GDD. Returns the finished PDF bytes.
pub fn render_gdd(project: &Project, meta: &CoverMeta) -> Result<Vec<u8>> {
    let mut w = PageWriter::new();

    let title = display_title(project);
    w.line(FONT_BOLD, TITLE_SIZE, title);
    if !meta.company.trim().is_empty() {
        w.line(FONT_REGULAR, BODY_SIZE, &format!("Company: {}", meta.company));
    }
    if !meta.authors.trim().is_empty() {
        w.line(FONT_REGULAR, BODY_SIZE, &format!("Authors: {}", meta.authors));
    }
    w.line(
        FONT_REGULAR,
        BODY_SIZE,
        &format!(
            "Version: {} - {}",
            meta.version,
            Utc::now().format("%Y-%m-%d")
        ),
    );

    let concept = &project.concept;
    w.heading("Executive summary");
    w.paragraph(&concept.premise);
    w.field("Differentiator", &concept.differentiator);
    w.field("Genres", &concept.genres.join(", "));

    w.heading("1. Concept");
    w.field("Title", &concept.title);
    w.field("Premise", &concept.premise);
    w.field("Differentiator", &concept.differentiator);
    w.field("Genres", &concept.genres.join(", "));
    w.field("Inspiration", &concept.inspiration);
    w.field("Target audience", &concept.target_audience);
    w.field("Platforms", &concept.platforms.join(", "));

    let narrative = &project.narrative;
    w.heading("2. Narrative");
    w.field("Setting", &narrative.setting);
    w.field("Main story", &narrative.main_story);
    w.field("Side stories", &narrative.side_stories);
    w.field("Protagonist", &narrative.protagonist);
    w.field("Key characters", &narrative.key_characters);
    w.field("Tone", &narrative.tone);
    w.field("Storytelling", &narrative.storytelling);

    let gameplay = &project.gameplay;
    w.heading("3. Gameplay");
    w.field("Main objective", &gameplay.main_objective);
    w.field("Core mechanics", &gameplay.core_mechanics);
    w.field("Controls", &gameplay.controls);
    w.field("Camera", &gameplay.camera);
    w.field("Progression", &gameplay.progression);
    w.field("World and levels", &gameplay.world_and_levels);
    w.field("AI", &gameplay.ai);
    w.field("Economy", &gameplay.economy);

    w.spacer(BODY_SIZE * 2.0);
    w.line(
        FONT_REGULAR,
        FOOTER_SIZE,
        &format!("Generated by JamDoc - version {}", meta.version),
    );

    build_document(w.finish())
}

/// Download name for the rendered GDD, derived from the project title.
pub fn gdd_file_name(project: &Project) -> String {
    let title = project.concept.title.trim();
    if title.is_empty() {
        return "project.pdf".to_string();
    }
    let base: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{base}.pdf")
}

fn display_title(project: &Project) -> &str {
    let title = project.concept.title.trim();
    if title.is_empty() {
        "Untitled project"
    } else {
        title
    }
}

/// Accumulates text operations, breaking to a new page when the cursor
/// reaches the bottom margin.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.ops);
        self.pages
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            self.break_page();
        }
    }

    fn spacer(&mut self, height: f32) {
        // Whitespace at the top of a fresh page is pointless.
        if self.y < PAGE_HEIGHT - MARGIN {
            self.y -= height;
        }
    }

    /// Emit one physical line of text at the current cursor.
    fn line(&mut self, font: &str, size: f32, text: &str) {
        let advance = size * 1.4;
        self.ensure_room(advance);
        self.y -= advance;
        if text.is_empty() {
            return;
        }
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![MARGIN.into(), self.y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn heading(&mut self, text: &str) {
        self.spacer(HEADING_SIZE);
        // Keep the heading attached to at least one body line.
        self.ensure_room(HEADING_SIZE * 1.4 + BODY_SIZE * 2.8);
        self.line(FONT_BOLD, HEADING_SIZE, text);
        self.spacer(4.0);
    }

    fn paragraph(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        for wrapped in wrap(text, max_chars(BODY_SIZE)) {
            self.line(FONT_REGULAR, BODY_SIZE, &wrapped);
        }
    }

    /// A labeled GDD field. Blank fields are left out of the document.
    fn field(&mut self, label: &str, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.paragraph(&format!("{label}: {value}"));
    }
}

fn max_chars(size: f32) -> usize {
    // Helvetica averages roughly half an em per glyph; close enough for a
    // wrap estimate on a fixed-width layout.
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    (usable / (size * 0.5)) as usize
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            if !current.is_empty() && current.chars().count() + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if current.is_empty() && word_len > max_chars {
                // Hard-split oversized tokens (data URLs and the like).
                let mut chars: Vec<char> = word.chars().collect();
                while chars.len() > max_chars {
                    lines.push(chars.drain(..max_chars).collect());
                }
                current = chars.into_iter().collect();
                continue;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

/// The built-in Type1 fonts are 8-bit; anything outside Latin-1 degrades
/// to a question mark.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 0x100 {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn build_document(page_ops: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for ops in page_ops {
        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
