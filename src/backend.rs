// Rendering backends. The layout engine draws through the RenderBackend
// trait; PdfBackend is the production implementation on printpdf.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Polygon, Rgb,
};
use std::io::BufWriter;

use crate::error::AppError;

/// A4 dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Rectangle in page coordinates: mm from the top-left corner, y growing
/// downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Minimal drawing surface consumed by the layout engine.
///
/// Coordinates are in mm from the top-left corner of the current page. Text
/// sizes are in points. A backend session is acquired once per render and
/// finalized exactly once; `finalize` takes the session by value. Any
/// renderer with these primitives is substitutable; tests use one that
/// records the instruction stream.
pub trait RenderBackend {
    type Artifact;

    fn page_width(&self) -> f32;
    fn page_height(&self) -> f32;
    fn draw_panel(&mut self, rect: Rect, fill: Color) -> Result<(), AppError>;
    fn draw_border(&mut self, rect: Rect, color: Color, width: f32) -> Result<(), AppError>;
    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Color,
    ) -> Result<(), AppError>;
    fn new_page(&mut self) -> Result<(), AppError>;
    fn finalize(self) -> Result<Self::Artifact, AppError>;
}

/// printpdf-backed drawing session producing the saved PDF bytes.
pub struct PdfBackend {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font_regular: IndirectFontRef,
    font_bold: IndirectFontRef,
}

impl PdfBackend {
    pub fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);

        let font_regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::PdfError(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::PdfError(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            font_regular,
            font_bold,
        })
    }

    /// printpdf measures y from the bottom-left corner.
    fn flip(&self, y: f32) -> f32 {
        PAGE_HEIGHT_MM - y
    }

    fn font(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.font_regular,
            FontWeight::Bold => &self.font_bold,
        }
    }

    fn corners(&self, rect: Rect) -> Vec<(Point, bool)> {
        let top = self.flip(rect.y);
        let bottom = self.flip(rect.y + rect.height);
        vec![
            (Point::new(Mm(rect.x), Mm(top)), false),
            (Point::new(Mm(rect.x + rect.width), Mm(top)), false),
            (Point::new(Mm(rect.x + rect.width), Mm(bottom)), false),
            (Point::new(Mm(rect.x), Mm(bottom)), false),
        ]
    }
}

fn pdf_color(color: Color) -> printpdf::Color {
    printpdf::Color::Rgb(Rgb::new(
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
        None,
    ))
}

impl RenderBackend for PdfBackend {
    type Artifact = Vec<u8>;

    fn page_width(&self) -> f32 {
        PAGE_WIDTH_MM
    }

    fn page_height(&self) -> f32 {
        PAGE_HEIGHT_MM
    }

    fn draw_panel(&mut self, rect: Rect, fill: Color) -> Result<(), AppError> {
        self.layer.set_fill_color(pdf_color(fill));
        self.layer.add_polygon(Polygon {
            rings: vec![self.corners(rect)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        Ok(())
    }

    fn draw_border(&mut self, rect: Rect, color: Color, width: f32) -> Result<(), AppError> {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(width);
        self.layer.add_line(Line {
            points: self.corners(rect),
            is_closed: true,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Color,
    ) -> Result<(), AppError> {
        self.layer.set_fill_color(pdf_color(color));
        self.layer
            .use_text(text, size, Mm(x), Mm(self.flip(y)), self.font(weight));
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), AppError> {
        let (page, layer) =
            self.doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        Ok(())
    }

    fn finalize(self) -> Result<Vec<u8>, AppError> {
        let mut bytes = Vec::new();
        {
            let mut writer = BufWriter::new(&mut bytes);
            self.doc
                .save(&mut writer)
                .map_err(|e| AppError::PdfError(e.to_string()))?;
        }
        Ok(bytes)
    }
}
