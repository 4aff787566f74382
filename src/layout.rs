// Prescription document layout: time-of-day grouping, per-section layout,
// and page-break control. All drawing goes through RenderBackend, so the
// whole pass can be exercised against a recording surface in tests.

use std::collections::BTreeMap;

use crate::backend::{Color, FontWeight, Rect, RenderBackend};
use crate::error::AppError;
use crate::model::{
    format_date_display, id_suffix, ResolvedEntry, ResolvedPrescription, TimeOfDay,
};

// ============================================================================
// Constants
// ============================================================================

/// Margins in mm
const TOP_MARGIN_MM: f32 = 20.0;
const BOTTOM_MARGIN_MM: f32 = 15.0;

/// Section panel inset from the left and right page edges
const PANEL_MARGIN_MM: f32 = 15.0;

/// Where section layout starts on the first page, below the document header
const BODY_START_MM: f32 = 65.0;

/// Vertical allowance for a section's header label
const SECTION_HEADER_MM: f32 = 25.0;

/// Vertical allowance per medicine block, independent of its text
const MEDICINE_BLOCK_MM: f32 = 30.0;

/// Gap between consecutive sections
const SECTION_GAP_MM: f32 = 10.0;

/// Footer baseline above the page bottom
const FOOTER_OFFSET_MM: f32 = 10.0;

/// Indents for medicine lines inside a section
const NAME_INDENT_MM: f32 = 30.0;
const DETAIL_INDENT_MM: f32 = 34.0;

const SECTION_BORDER_WIDTH: f32 = 2.0;

/// Font sizes in points
const TITLE_FONT_SIZE: f32 = 28.0;
const SECTION_FONT_SIZE: f32 = 18.0;
const DATE_FONT_SIZE: f32 = 14.0;
const NAME_FONT_SIZE: f32 = 14.0;
const DOSAGE_FONT_SIZE: f32 = 12.0;
const MEAL_FONT_SIZE: f32 = 11.0;
const SMALL_FONT_SIZE: f32 = 10.0;

const HEADER_COLOR: Color = Color { r: 59, g: 130, b: 246 };
const MORNING_COLOR: Color = Color { r: 255, g: 193, b: 7 };
const AFTERNOON_COLOR: Color = Color { r: 255, g: 152, b: 0 };
const NIGHT_COLOR: Color = Color { r: 63, g: 81, b: 181 };
const MEAL_COLOR: Color = Color { r: 76, g: 175, b: 80 };
const TEXT_COLOR: Color = Color { r: 33, g: 33, b: 33 };
const MUTED_COLOR: Color = Color { r: 120, g: 120, b: 120 };
const DOSAGE_COLOR: Color = Color { r: 80, g: 80, b: 80 };
const FOOTER_COLOR: Color = Color { r: 150, g: 150, b: 150 };
const PANEL_COLOR: Color = Color { r: 245, g: 245, b: 245 };

const TITLE_TEXT: &str = "Medical Prescription";
const FOOTER_TEXT: &str = "Generated by Prescription Manager";

// ============================================================================
// Page-Break Controller
// ============================================================================

/// Vertical position on the current page, in mm from the top. One cursor per
/// render pass, threaded through each layout call and returned updated,
/// never held as ambient state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page: usize,
    pub y: f32,
}

impl LayoutCursor {
    pub fn new() -> Self {
        Self {
            page: 0,
            y: TOP_MARGIN_MM,
        }
    }

    fn next_page(self) -> Self {
        Self {
            page: self.page + 1,
            y: TOP_MARGIN_MM,
        }
    }
}

impl Default for LayoutCursor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Grouping Stage
// ============================================================================

/// Partition entries into time-of-day buckets, preserving entry order within
/// each bucket. An entry with N tags lands in N buckets. Tags with no entries
/// are absent from the map. An entry with an empty tag set is a contract
/// violation and fails the whole render.
pub fn group_by_time(
    entries: &[ResolvedEntry],
) -> Result<BTreeMap<TimeOfDay, Vec<&ResolvedEntry>>, AppError> {
    let mut buckets: BTreeMap<TimeOfDay, Vec<&ResolvedEntry>> = BTreeMap::new();

    for entry in entries {
        if entry.timing.is_empty() {
            return Err(AppError::ValidationError(format!(
                "entry \"{}\" has an empty time-of-day set",
                entry.name
            )));
        }
        for &time in &entry.timing {
            buckets.entry(time).or_default().push(entry);
        }
    }

    Ok(buckets)
}

// ============================================================================
// Section Layout Stage
// ============================================================================

/// Vertical extent of one section: header allowance plus a fixed allowance
/// per medicine. Independent of text length: equal medicine counts always
/// produce equal heights.
pub fn computed_section_height(medicine_count: usize) -> f32 {
    SECTION_HEADER_MM + medicine_count as f32 * MEDICINE_BLOCK_MM
}

fn section_color(time: TimeOfDay) -> Color {
    match time {
        TimeOfDay::Morning => MORNING_COLOR,
        TimeOfDay::Afternoon => AFTERNOON_COLOR,
        TimeOfDay::Night => NIGHT_COLOR,
    }
}

fn section_label(time: TimeOfDay) -> &'static str {
    match time {
        TimeOfDay::Morning => "MORNING",
        TimeOfDay::Afternoon => "AFTERNOON",
        TimeOfDay::Night => "NIGHT",
    }
}

/// Draw one time-of-day section at the cursor position: background panel,
/// colored border, header label, then one block per medicine.
fn draw_section<B: RenderBackend>(
    backend: &mut B,
    time: TimeOfDay,
    medicines: &[&ResolvedEntry],
    cursor: LayoutCursor,
) -> Result<LayoutCursor, AppError> {
    let height = computed_section_height(medicines.len());
    let color = section_color(time);
    let rect = Rect {
        x: PANEL_MARGIN_MM,
        y: cursor.y,
        width: backend.page_width() - 2.0 * PANEL_MARGIN_MM,
        height,
    };

    backend.draw_panel(rect, PANEL_COLOR)?;
    backend.draw_border(rect, color, SECTION_BORDER_WIDTH)?;
    backend.draw_text(
        section_label(time),
        PANEL_MARGIN_MM + 10.0,
        cursor.y + 13.0,
        SECTION_FONT_SIZE,
        FontWeight::Bold,
        color,
    )?;

    for (index, medicine) in medicines.iter().enumerate() {
        let block_top = cursor.y + SECTION_HEADER_MM + index as f32 * MEDICINE_BLOCK_MM;

        backend.draw_text(
            &medicine.name,
            NAME_INDENT_MM,
            block_top,
            NAME_FONT_SIZE,
            FontWeight::Bold,
            TEXT_COLOR,
        )?;
        backend.draw_text(
            &format!("Dosage: {}", medicine.dosage_line()),
            DETAIL_INDENT_MM,
            block_top + 10.0,
            DOSAGE_FONT_SIZE,
            FontWeight::Regular,
            DOSAGE_COLOR,
        )?;
        if let Some(label) = medicine.meal.label() {
            backend.draw_text(
                label,
                DETAIL_INDENT_MM,
                block_top + 18.0,
                MEAL_FONT_SIZE,
                FontWeight::Regular,
                MEAL_COLOR,
            )?;
        }
    }

    Ok(LayoutCursor {
        page: cursor.page,
        y: cursor.y + height + SECTION_GAP_MM,
    })
}

// ============================================================================
// Document Render Pass
// ============================================================================

fn draw_header<B: RenderBackend>(
    backend: &mut B,
    prescription: &ResolvedPrescription,
    cursor: LayoutCursor,
) -> Result<LayoutCursor, AppError> {
    backend.draw_text(
        TITLE_TEXT,
        backend.page_width() / 2.0 - 50.0,
        cursor.y + 5.0,
        TITLE_FONT_SIZE,
        FontWeight::Bold,
        HEADER_COLOR,
    )?;
    backend.draw_text(
        &format!("Date: {}", format_date_display(&prescription.created_at)),
        PANEL_MARGIN_MM + 5.0,
        cursor.y + 25.0,
        DATE_FONT_SIZE,
        FontWeight::Regular,
        TEXT_COLOR,
    )?;
    backend.draw_text(
        &format!("ID: {}", id_suffix(&prescription.id)),
        PANEL_MARGIN_MM + 5.0,
        cursor.y + 32.0,
        SMALL_FONT_SIZE,
        FontWeight::Regular,
        MUTED_COLOR,
    )?;

    Ok(LayoutCursor {
        page: cursor.page,
        y: BODY_START_MM,
    })
}

/// The footer is anchored to the bottom margin of whichever page is current
/// and is drawn without an overflow check; on a crowded last page it may sit
/// close to the final section.
fn draw_footer<B: RenderBackend>(backend: &mut B) -> Result<(), AppError> {
    backend.draw_text(
        FOOTER_TEXT,
        backend.page_width() / 2.0 - 28.0,
        backend.page_height() - FOOTER_OFFSET_MM,
        SMALL_FONT_SIZE,
        FontWeight::Regular,
        FOOTER_COLOR,
    )
}

/// Render one prescription to completion and finalize the backend session.
///
/// Sections are processed in the fixed morning/afternoon/night order. Before
/// each section, the page-break rule runs: if the section's computed height
/// does not fit above the bottom margin, a new page is started and the cursor
/// resets to the top margin. Pages are only ever appended. A prescription
/// with no medicines still produces a one-page document with header, date,
/// and footer.
pub fn render_document<B: RenderBackend>(
    prescription: &ResolvedPrescription,
    mut backend: B,
) -> Result<B::Artifact, AppError> {
    let buckets = group_by_time(&prescription.entries)?;

    let mut cursor = LayoutCursor::new();
    cursor = draw_header(&mut backend, prescription, cursor)?;

    let limit = backend.page_height() - BOTTOM_MARGIN_MM;
    for time in TimeOfDay::ALL {
        let medicines = match buckets.get(&time) {
            Some(medicines) => medicines,
            None => continue,
        };
        if cursor.y + computed_section_height(medicines.len()) > limit {
            backend.new_page()?;
            cursor = cursor.next_page();
        }
        cursor = draw_section(&mut backend, time, medicines, cursor)?;
    }

    draw_footer(&mut backend)?;
    backend.finalize()
}

// ============================================================================
// Tests
// ============================================================================
