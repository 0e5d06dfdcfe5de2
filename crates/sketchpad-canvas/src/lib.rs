//! Sketchpad Canvas - Drawing Surfaces
//!
//! This crate provides the drawing side of Sketchpad:
//! - Viewport: Real-world canvas sizes (inches) and presets
//! - Element: The drawing vocabulary recorded by scripts
//! - Surface: Freshly scoped drawing targets created per execution
//! - Svg: Markup serialization, preview and export documents
//! - Error: Error types for canvas operations
//!
//! ## Units
//!
//! A surface's logical coordinate space equals its viewport in inches, so a
//! 1-unit move is one inch. Pixel dimensions follow the fixed 96 DPI
//! convention (`inches * 96`).
//!
//! ## Usage
//!
//! ```ignore
//! use sketchpad_canvas::{Element, Style, SurfaceFactory, ViewportSize};
//!
//! let factory = SurfaceFactory::new();
//! let mut surface = factory.create(&ViewportSize::new(6.0, 6.0, "6x6"))?;
//! surface.draw(Element::circle(3.0, 3.0, 1.0, Style::default()));
//! let markup = surface.serialize();
//! surface.dispose();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod element;
pub mod error;
pub mod surface;
pub mod svg;
pub mod viewport;

// Re-export main types
pub use element::{Element, Style};
pub use error::{Error, Result};
pub use surface::{Surface, SurfaceBinding, SurfaceFactory};
pub use svg::{export_document, preview_document, SVG_NAMESPACE, XLINK_NAMESPACE};
pub use viewport::{ViewportSize, PIXELS_PER_INCH};
