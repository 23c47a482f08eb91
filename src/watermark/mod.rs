//! Watermark compositing.
//!
//! Renders one text layer and one image (logo) layer onto a raster canvas.
//! The same renderers serve the live preview and the full-resolution export;
//! only the canvas and the [`ScaleFactors`] between the spec's authoring
//! space and the canvas differ.
//!
//! # Features
//!
//! - **Text watermarks** with font family/size/style, colour, opacity,
//!   drop shadow, stroke pass and rotation about the anchor
//! - **Image watermarks** with proportional or stretched sizing and opacity
//! - **9-grid anchors** resolved against the measured text box
//! - **Coordinate mapping** between preview, original and export canvases
//!
//! # Spec Example
//!
//! ```yaml
//! text:
//!   text: "© 2025 Filigree"
//!   font: { family: "DejaVu Sans", point_size: 24, bold: true }
//!   color: "#ffffff"
//!   opacity: 80
//!   shadow: true
//!   rotation: 15
//! placement:
//!   anchor: bottom_right
//! image:
//!   path: /assets/logo.png
//!   width: 120
//!   height: 60
//!   opacity: 70
//! ```

pub mod compositor;
pub mod error;
pub mod font;
pub mod image_renderer;
pub mod mapper;
pub mod painter;
pub mod position;
pub mod spec;
pub mod text_renderer;

pub use compositor::{Compositor, LogoSource};
pub use error::WatermarkError;
pub use font::{default_font_dirs, FontBook, FontFace};
pub use image_renderer::{default_placement, load_logo, logo_box, render_image, DEFAULT_MARGIN};
pub use mapper::{scale_factors, FitMode, ReferenceSpace, ScaleFactors, Viewport};
pub use painter::{blend_pixels, Painter, Transform};
pub use position::{
    hit_rect, resolve_anchor, resolve_cell, text_bounds, Anchor, DragGesture, EDGE_PADDING_RATIO,
    HIT_SLOP,
};
pub use spec::{
    parse_hex_color, Color, FontDescriptor, ImageWatermarkSpec, Placement, TextWatermarkSpec,
    WatermarkSpec,
};
pub use text_renderer::{measure_text, render_text, text_box, GlyphMask, TextMetrics};
