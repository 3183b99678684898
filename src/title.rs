use crate::{
    text::{draw_text, HAlign, TextStyle, VAlign},
    theme, ArcStr,
};
use piet::{
    kurbo::{Point, Size},
    Color, RenderContext,
};

/// The title of a plot, drawn above the box.
#[derive(Debug, Clone)]
pub struct Title {
    dim: Size,
    /// Horizontal position, as a fraction of the box width.
    relative_pos: f64,
    offset: f64,
    text: ArcStr,
    align: HAlign,
    font: TextStyle,
}

impl Title {
    pub fn new(dim: Size) -> Self {
        Title {
            dim,
            relative_pos: 0.5,
            offset: 10.,
            text: "".into(),
            align: HAlign::Center,
            font: TextStyle::new(theme::TITLE_COLOR, theme::TITLE_FONT_SIZE).bold(),
        }
    }

    pub fn text(&self) -> &ArcStr {
        &self.text
    }

    /// Where the bottom of the title is anchored, in plot space.
    pub fn anchor(&self) -> Point {
        Point::new(
            self.relative_pos * self.dim.width,
            -self.offset - self.dim.height,
        )
    }

    pub fn set_dim(&mut self, dim: Size) {
        if dim.width > 0. && dim.height > 0. {
            self.dim = dim;
        }
    }

    pub fn set_relative_pos(&mut self, relative_pos: f64) {
        self.relative_pos = relative_pos;
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn set_text(&mut self, text: impl Into<ArcStr>) {
        self.text = text.into();
    }

    pub fn set_text_alignment(&mut self, align: HAlign) {
        self.align = align;
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.font.color = color;
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.font.bold = bold;
    }

    pub fn set_font_size(&mut self, size: f64) {
        if size > 0. {
            self.font.size = size;
        }
    }

    pub fn draw<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        draw_text(
            rc,
            self.text.clone(),
            self.anchor(),
            self.align,
            VAlign::Bottom,
            false,
            &self.font,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_above_the_box() {
        let mut title = Title::new(Size::new(300., 200.));
        assert_eq!(title.anchor(), Point::new(150., -210.));
        title.set_relative_pos(0.);
        title.set_dim(Size::new(-1., 5.));
        title.set_offset(0.);
        assert_eq!(title.anchor(), Point::new(0., -200.));
    }
}
