//! Interactive preview session.
//!
//! Holds the source image, a copy fitted into the preview bounds and the
//! spec being edited. Spec changes and drag motion only mark the session
//! dirty; [`PreviewSession::tick`] renders the newest state at most once per
//! frame interval, and releasing a drag always renders the final state.
//!
//! Spec coordinates are pixels of the fitted preview canvas. Exports map
//! them with [`PreviewSession::reference_space`].

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::throttle::{RedrawThrottle, RefreshState};
use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::raster::RasterImage;
use crate::watermark::{
    hit_rect, load_logo, scale_factors, text_box, Anchor, Compositor, DragGesture, FitMode,
    LogoSource, Placement, ReferenceSpace, ScaleFactors, Viewport, WatermarkError, WatermarkSpec,
};

#[derive(Debug)]
/// Decoded logo for `path`; `None` when the file was missing.
struct CachedLogo {
    path: PathBuf,
    image: Option<RasterImage>,
}

#[derive(Debug)]
pub struct PreviewSession<'f> {
    compositor: Compositor<'f>,
    source: RasterImage,
    bounds: Size,
    canvas: RasterImage,
    spec: WatermarkSpec,
    throttle: RedrawThrottle<WatermarkSpec>,
    drag: Option<DragGesture>,
    logo: Option<CachedLogo>,
    frame: Option<RasterImage>,
}

/// `source` scaled (contain) into `bounds`.
fn fit_canvas(source: &RasterImage, bounds: Size) -> Result<RasterImage> {
    let fitted = source
        .size()
        .fit_within(bounds)
        .ok_or(WatermarkError::DegenerateSize {
            width: bounds.width,
            height: bounds.height,
        })?;
    if fitted == source.size() {
        return Ok(source.clone());
    }
    Ok(source.resized(fitted)?)
}

impl<'f> PreviewSession<'f> {
    pub fn new(
        compositor: Compositor<'f>,
        source: RasterImage,
        bounds: Size,
        spec: WatermarkSpec,
        frame_interval: Duration,
    ) -> Result<Self> {
        spec.validate()?;
        let canvas = fit_canvas(&source, bounds)?;
        debug!(source = %source.size(), preview = %canvas.size(), "Preview session opened");

        let mut throttle = RedrawThrottle::new(frame_interval);
        throttle.mark_dirty(spec.clone());

        Ok(Self {
            compositor,
            source,
            bounds,
            canvas,
            spec,
            throttle,
            drag: None,
            logo: None,
            frame: None,
        })
    }

    pub fn source(&self) -> &RasterImage {
        &self.source
    }

    /// The fitted preview canvas, without watermark.
    pub fn canvas(&self) -> &RasterImage {
        &self.canvas
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    /// Last rendered frame.
    pub fn frame(&self) -> Option<&RasterImage> {
        self.frame.as_ref()
    }

    pub fn state(&self) -> RefreshState {
        self.throttle.state()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.next_deadline()
    }

    /// The preview canvas as shown inside the bounds.
    pub fn viewport(&self) -> Result<Viewport> {
        Ok(Viewport::new(self.bounds, self.canvas.size())?)
    }

    /// Authoring space of this session's spec coordinates, for export.
    ///
    /// Pinned to the current canvas size, so sources with a different
    /// aspect ratio are mapped per axis.
    pub fn reference_space(&self) -> ReferenceSpace {
        ReferenceSpace::Fixed {
            size: self.canvas.size(),
        }
    }

    pub fn update_spec(&mut self, spec: WatermarkSpec) -> Result<()> {
        spec.validate()?;
        self.spec = spec;
        self.throttle.mark_dirty(self.spec.clone());
        Ok(())
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.spec.placement = Placement::Anchor(anchor);
        self.throttle.mark_dirty(self.spec.clone());
    }

    /// Swap the source image. Absolute positions are kept as-is.
    pub fn set_source(&mut self, source: RasterImage) -> Result<()> {
        self.canvas = fit_canvas(&source, self.bounds)?;
        self.source = source;
        self.drag = None;
        self.throttle.mark_dirty(self.spec.clone());
        Ok(())
    }

    /// Refit the canvas into new bounds, carrying absolute positions along.
    pub fn resize(&mut self, bounds: Size) -> Result<()> {
        let canvas = fit_canvas(&self.source, bounds)?;
        let factors = scale_factors(self.canvas.size(), canvas.size(), FitMode::Independent)?;
        debug!(from = %self.canvas.size(), to = %canvas.size(), "Preview resized");

        if let Placement::Absolute(point) = self.spec.placement {
            self.spec.placement = Placement::Absolute(factors.map_point(point));
        }
        if let Some(image) = self.spec.image.as_mut() {
            image.placement = image.placement.map(|p| factors.map_point(p));
        }

        self.bounds = bounds;
        self.canvas = canvas;
        self.drag = None;
        self.throttle.mark_dirty(self.spec.clone());
        Ok(())
    }

    /// Baseline-left text anchor on the preview canvas.
    pub fn text_anchor(&self) -> Result<Point> {
        Ok(self
            .compositor
            .text_anchor(self.canvas.size(), &self.spec, ScaleFactors::IDENTITY)?)
    }

    /// Whether a widget-space pointer is over the text watermark.
    pub fn hit_test(&self, pointer: Point) -> Result<bool> {
        if self.spec.text.is_empty() {
            return Ok(false);
        }
        let text = text_box(self.compositor.fonts(), &self.spec.text, 1.0)?;
        let rect = hit_rect(&self.viewport()?, self.text_anchor()?, text);
        Ok(rect.contains(pointer))
    }

    /// Start dragging if `pointer` is over the text. Returns whether it was.
    pub fn begin_drag(&mut self, pointer: Point) -> Result<bool> {
        if !self.hit_test(pointer)? {
            return Ok(false);
        }
        let anchor = self.text_anchor()?;
        debug!(x = anchor.x, y = anchor.y, "Drag started");
        self.drag = Some(DragGesture::begin(pointer, anchor));
        Ok(true)
    }

    /// Move the text with the pointer. Returns the new anchor while dragging.
    pub fn drag_to(&mut self, pointer: Point) -> Result<Option<Point>> {
        let Some(drag) = self.drag else {
            return Ok(None);
        };
        let anchor = drag.moved_to(pointer, self.viewport()?.widget_to_content());
        self.spec.placement = Placement::Absolute(anchor);
        self.throttle.mark_dirty(self.spec.clone());
        Ok(Some(anchor))
    }

    /// Release the drag and render the final position immediately.
    pub fn end_drag(&mut self, now: Instant) -> Result<Option<&RasterImage>> {
        if self.drag.take().is_none() {
            return Ok(None);
        }
        self.render_now(now)
    }

    /// Render the newest pending state if a frame interval has passed.
    pub fn tick(&mut self, now: Instant) -> Result<Option<&RasterImage>> {
        match self.throttle.poll(now) {
            Some(spec) => self.render(spec).map(Some),
            None => Ok(None),
        }
    }

    /// Render the pending state now, ignoring the frame interval.
    pub fn render_now(&mut self, now: Instant) -> Result<Option<&RasterImage>> {
        match self.throttle.flush(now) {
            Some(spec) => self.render(spec).map(Some),
            None => Ok(self.frame.as_ref()),
        }
    }

    fn render(&mut self, spec: WatermarkSpec) -> Result<&RasterImage> {
        let result = self.compose(&spec);
        self.throttle.finish();
        let frame = self.frame.insert(result?);
        Ok(frame)
    }

    fn compose(&mut self, spec: &WatermarkSpec) -> Result<RasterImage> {
        self.refresh_logo(spec)?;
        let logo = match &self.logo {
            Some(CachedLogo {
                image: Some(image), ..
            }) => LogoSource::Decoded(image),
            Some(CachedLogo { image: None, .. }) => LogoSource::Missing,
            None => LogoSource::Load,
        };
        Ok(self
            .compositor
            .compose_with_logo(&self.canvas, spec, ScaleFactors::IDENTITY, logo)?)
    }

    fn refresh_logo(&mut self, spec: &WatermarkSpec) -> Result<()> {
        let Some(image_spec) = &spec.image else {
            self.logo = None;
            return Ok(());
        };
        if matches!(&self.logo, Some(cached) if cached.path == image_spec.path) {
            return Ok(());
        }

        let image = match load_logo(image_spec) {
            Ok(image) => Some(image),
            Err(WatermarkError::MissingAsset(path)) => {
                warn!(path = %path.display(), "Logo missing, previewing without image watermark");
                None
            }
            Err(err) => return Err(err.into()),
        };
        self.logo = Some(CachedLogo {
            path: image_spec.path.clone(),
            image,
        });
        Ok(())
    }
}
