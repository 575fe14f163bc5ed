#![warn(clippy::all, rust_2018_idioms)]

pub mod alpha_shape;
mod app;
pub mod delaunay;
pub mod error;
pub mod models;
pub mod rendering;
pub mod ui;

pub use app::{demo_points, AlphaShapeApp, UiState};
pub use error::{EngineError, EngineResult};
