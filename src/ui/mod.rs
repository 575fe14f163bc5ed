pub mod canvas;
pub mod input;

pub use canvas::{Canvas, CanvasView};
