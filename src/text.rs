//! Placing text relative to an anchor point.
use crate::ArcStr;
use piet::{
    kurbo::{Affine, Point, Size, Vec2},
    Color, FontFamily, FontWeight, RenderContext, Text, TextLayout, TextLayoutBuilder,
};
use std::f64::consts::FRAC_PI_2;

/// Which point of the text box is placed at the anchor, horizontally.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Which point of the text box is placed at the anchor, vertically.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Colour, size and weight of some text.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f64,
    pub bold: bool,
}

impl TextStyle {
    pub const fn new(color: Color, size: f64) -> Self {
        TextStyle {
            color,
            size,
            bold: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Lay `text` out in this style.
    pub fn layout<RC: RenderContext>(
        &self,
        rc: &mut RC,
        text: ArcStr,
    ) -> Result<RC::TextLayout, piet::Error> {
        let builder = rc
            .text()
            .new_text_layout(text)
            .font(FontFamily::SANS_SERIF, self.size)
            .text_color(self.color);
        if self.bold {
            builder.default_attribute(FontWeight::BOLD).build()
        } else {
            builder.build()
        }
    }

    /// The size `text` takes up in this style.
    pub fn measure<RC: RenderContext>(&self, rc: &mut RC, text: ArcStr) -> Result<Size, piet::Error> {
        Ok(self.layout(rc, text)?.size())
    }
}

/// Where the top-left corner of a box of `size` goes, relative to the anchor.
fn align_offset(size: Size, h: HAlign, v: VAlign) -> Vec2 {
    let x = match h {
        HAlign::Left => 0.,
        HAlign::Center => -0.5 * size.width,
        HAlign::Right => -size.width,
    };
    let y = match v {
        VAlign::Top => 0.,
        VAlign::Center => -0.5 * size.height,
        VAlign::Bottom => -size.height,
    };
    Vec2::new(x, y)
}

/// Draw `text` with the point picked by `h` and `v` at `anchor`.
///
/// Rotated text reads from bottom to top, and is aligned as if the reader had turned their head.
pub fn draw_text<RC: RenderContext>(
    rc: &mut RC,
    text: ArcStr,
    anchor: Point,
    h: HAlign,
    v: VAlign,
    rotated: bool,
    style: &TextStyle,
) -> Result<(), piet::Error> {
    if text.is_empty() {
        return Ok(());
    }
    let layout = style.layout(rc, text)?;
    let offset = align_offset(layout.size(), h, v);
    if rotated {
        rc.with_save(|rc| {
            rc.transform(Affine::translate(anchor.to_vec2()) * Affine::rotate(-FRAC_PI_2));
            rc.draw_text(&layout, offset.to_point());
            Ok(())
        })
    } else {
        rc.draw_text(&layout, anchor + offset);
        Ok(())
    }
}
