use crate::style::TextStyle;

/// One positioned word, ready for painting. `x`/`y` are document
/// coordinates of the word's top-left corner; the painter applies scroll
/// offset and viewport culling.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayItem {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub style: TextStyle,
}
