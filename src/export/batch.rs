//! Export pipeline: size, composite, encode, write.
//!
//! Batch exports run per file in parallel and never stop at the first
//! failure; every failure is collected into the [`BatchReport`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::{Entry, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::encoder::{export, ExportSettings};
use super::error::EncodeError;
use super::format::OutputFormat;
use super::naming::{targets_source_folder, NamingRule};
use super::sizing::{apply_sizing, SizingPolicy};
use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::error::{Error, Result};
use crate::raster::RasterImage;
use crate::watermark::{
    load_logo, Color, Compositor, LogoSource, ReferenceSpace, WatermarkError, WatermarkSpec,
};

/// Everything about an export except the source and the watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Flattening background for formats without alpha.
    #[serde(default = "Color::white")]
    pub background: Color,
    #[serde(default)]
    pub sizing: SizingPolicy,
    #[serde(default)]
    pub naming: NamingRule,
    /// Space the watermark spec's coordinates were authored in.
    #[serde(default = "default_reference")]
    pub reference: ReferenceSpace,
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_reference() -> ReferenceSpace {
    ReferenceSpace::Source
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: default_quality(),
            background: Color::white(),
            sizing: SizingPolicy::default(),
            naming: NamingRule::default(),
            reference: default_reference(),
        }
    }
}

/// Size `source` per the options and composite `spec` onto it.
///
/// The spec's coordinates are mapped from `options.reference` onto the
/// sized canvas, per axis.
pub fn render_for_export(
    compositor: &Compositor<'_>,
    source: &RasterImage,
    spec: &WatermarkSpec,
    options: &ExportOptions,
    logo: LogoSource<'_>,
) -> Result<RasterImage> {
    let sized = apply_sizing(source, &options.sizing)?;
    let factors = options.reference.factors_to(source.size(), sized.size())?;
    Ok(compositor.compose_with_logo(&sized, spec, factors, logo)?)
}

/// Render one source file and write it to `output`.
pub fn export_file(
    compositor: &Compositor<'_>,
    source: &Path,
    output: &Path,
    spec: &WatermarkSpec,
    options: &ExportOptions,
    logo: LogoSource<'_>,
) -> Result<PathBuf> {
    let image = RasterImage::open(source)?;
    let rendered = render_for_export(compositor, &image, spec, options, logo)?;
    let settings = ExportSettings::new(options.format, options.quality, output);
    export(&rendered, &settings, options.background)?;
    Ok(output.to_path_buf())
}

/// One source that could not be exported.
#[derive(Debug)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: Error,
}

/// Outcome of [`export_all`], in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub exported: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    /// Some source lives in the output folder, so outputs may replace inputs.
    pub writes_into_source_folder: bool,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.exported.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Output path for every source, in input order.
///
/// The first source to claim a path keeps it; later sources naming the same
/// file get [`EncodeError::OutputConflict`] instead of overwriting it.
fn plan_outputs(
    sources: &[PathBuf],
    output_dir: &Path,
    options: &ExportOptions,
) -> Vec<Result<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(sources.len());
    sources
        .iter()
        .map(|source| {
            let output = options
                .naming
                .output_path(source, output_dir, options.format)?;
            match claimed.entry(output.clone()) {
                Entry::Occupied(owner) => Err(EncodeError::OutputConflict {
                    path: output,
                    claimed_by: owner.get().to_path_buf(),
                }
                .into()),
                Entry::Vacant(slot) => {
                    slot.insert(source);
                    Ok(output)
                }
            }
        })
        .collect()
}

/// Export every source into `output_dir` using the options' naming rule.
///
/// Fails up front only for problems shared by all files (invalid naming
/// rule or sizing, undecodable logo). Per-file failures land in the report,
/// including sources whose output name is already taken by an earlier one.
pub fn export_all(
    compositor: &Compositor<'_>,
    sources: &[PathBuf],
    output_dir: &Path,
    spec: &WatermarkSpec,
    options: &ExportOptions,
) -> Result<BatchReport> {
    options.naming.validate()?;
    options.sizing.validate()?;
    spec.validate()?;

    let writes_into_source_folder = sources
        .iter()
        .any(|source| targets_source_folder(source, output_dir));
    if writes_into_source_folder {
        warn!(
            output_dir = %output_dir.display(),
            naming = %options.naming,
            "Exporting into a source folder; files may be overwritten"
        );
    }

    let decoded_logo = match &spec.image {
        Some(image_spec) => match load_logo(image_spec) {
            Ok(logo) => Some(logo),
            Err(WatermarkError::MissingAsset(path)) => {
                warn!(path = %path.display(), "Logo missing, exporting without image watermark");
                None
            }
            Err(err) => return Err(err.into()),
        },
        None => None,
    };
    let logo = match &decoded_logo {
        Some(decoded) => LogoSource::Decoded(decoded),
        None => LogoSource::Missing,
    };

    let planned = plan_outputs(sources, output_dir, options);
    let outcomes: Vec<(PathBuf, Result<PathBuf>)> = sources
        .par_iter()
        .zip(planned)
        .map(|(source, output)| {
            let outcome = output.and_then(|output| {
                export_file(compositor, source, &output, spec, options, logo)
            });
            (source.clone(), outcome)
        })
        .collect();

    let mut report = BatchReport {
        writes_into_source_folder,
        ..BatchReport::default()
    };
    for (source, outcome) in outcomes {
        match outcome {
            Ok(path) => report.exported.push(path),
            Err(error) => {
                warn!(source = %source.display(), error = %error, "Export failed");
                report.failures.push(BatchFailure { source, error });
            }
        }
    }

    info!(
        exported = report.exported.len(),
        failed = report.failures.len(),
        output_dir = %output_dir.display(),
        "Batch export finished"
    );
    Ok(report)
}
