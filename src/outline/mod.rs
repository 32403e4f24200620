pub mod source;

pub use source::{load_font_data, outlines, GlyphOutline};
