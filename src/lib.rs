#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod crop;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod filter;
pub mod grid;
pub mod id_generator;
pub mod loader;
pub mod renderer;
pub mod state;
pub mod transform;
pub mod util;

pub use config::{EditorConfig, SnapConfig};
pub use crop::TempCropData;
pub use document::{CanvasSize, Document};
pub use element::{CanvasElement, Element, ElementKind, ElementPatch};
pub use error::{CollageError, Result, TransitionError};
pub use export::{ExportMode, ExportOutput};
pub use filter::{FilterField, FilterSettings};
pub use grid::{GridLayout, GridMode, GridTemplate, GridZone};
pub use id_generator::ElementId;
pub use loader::DecodedImage;
pub use renderer::{RasterCompositor, RenderSurface};
pub use state::{DocumentSnapshot, EditorContext, EditorState};
pub use transform::{HandleTransform, ZOrderOp};
