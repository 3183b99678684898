//! Default colours and sizes.
use piet::Color;

pub const FONT_COLOR: Color = Color::BLACK;
pub const FONT_SIZE: f64 = 11.;
pub const TITLE_FONT_SIZE: f64 = 13.;
pub const TITLE_COLOR: Color = Color::grey8(100);

pub const AXES_COLOR: Color = Color::BLACK;
pub const BACKGROUND_COLOR: Color = Color::WHITE;
pub const BOX_BG_COLOR: Color = Color::grey8(245);
pub const BOX_LINE_COLOR: Color = Color::grey8(210);
pub const GRID_COLOR: Color = Color::grey8(210);

pub const POINT_COLOR: Color = Color::rgba8(255, 0, 0, 150);
pub const POINT_SIZE: f64 = 7.;
pub const LINE_COLOR: Color = Color::rgba8(0, 0, 0, 150);
pub const LABEL_BG_COLOR: Color = Color::rgba8(255, 255, 255, 200);

pub const BAR_COLOR: Color = Color::rgb8(150, 150, 255);
pub const BAR_LINE_COLOR: Color = Color::rgb8(100, 100, 255);
pub const BAR_SEPARATION: f64 = 2.;
