use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use filigree::config::Config;
use filigree::export::{export_all, export_file, NamingRule, OutputFormat, SizingPolicy};
use filigree::raster::{is_supported_source, probe};
use filigree::templates::{TemplateError, TemplateRecord, TemplateStore};
use filigree::watermark::{
    Anchor, Compositor, LogoSource, Placement, ReferenceSpace, WatermarkSpec,
};

/// Filigree - text and logo watermarks for photos
#[derive(Parser, Debug)]
#[command(name = "filigree")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark one image
    Render {
        input: PathBuf,
        /// Output file; the extension picks the format
        output: PathBuf,
        #[command(flatten)]
        watermark: WatermarkArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Watermark many images into a folder
    Batch {
        /// Image files or folders
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output_dir: PathBuf,
        /// original, prefix[:TEXT] or suffix[:TEXT]
        #[arg(long)]
        naming: Option<NamingRule>,
        /// Output format (default from config)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Descend into sub-folders
        #[arg(short, long)]
        recursive: bool,
        #[command(flatten)]
        watermark: WatermarkArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show dimensions, format and size of images
    Info {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Manage saved templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(clap::Args, Debug)]
struct WatermarkArgs {
    /// Saved template to apply
    #[arg(short, long, conflicts_with = "last")]
    template: Option<String>,
    /// Apply the last used settings
    #[arg(long)]
    last: bool,
    /// Override the watermark text
    #[arg(long)]
    text: Option<String>,
    /// Override the position with a grid anchor (e.g. bottom_right)
    #[arg(long)]
    anchor: Option<Anchor>,
    /// Space absolute positions were authored in
    #[arg(long, value_enum, default_value_t = Space::Preview)]
    space: Space,
    /// Remember these settings as the last used ones
    #[arg(long)]
    remember: bool,
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// JPEG quality 1-100 (default from config)
    #[arg(short, long)]
    quality: Option<u8>,
    /// original, N%, WxH (fit inside) or WxH! (stretch)
    #[arg(long)]
    sizing: Option<SizingPolicy>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Space {
    /// Pixels of each source image
    Source,
    /// Pixels of the preview the template was made on
    Preview,
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// List saved templates
    List,
    /// Show one template as JSON
    Show { name: String },
    /// Save the default template, or the last used settings, under a name
    Save {
        name: String,
        #[arg(long)]
        from_last: bool,
    },
    Delete { name: String },
    Rename { old_name: String, new_name: String },
    /// Write all templates to a bundle file
    Export { file: PathBuf },
    /// Merge templates from a bundle file
    Import {
        file: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}

fn resolve_spec(store: &TemplateStore, args: &WatermarkArgs) -> anyhow::Result<WatermarkSpec> {
    let record = if let Some(name) = &args.template {
        store
            .load(name)?
            .ok_or_else(|| TemplateError::NotFound(name.clone()))?
    } else if args.last {
        store
            .load_last_settings()?
            .unwrap_or_else(TemplateRecord::default_template)
    } else {
        TemplateRecord::default_template()
    };

    let mut spec = record.to_spec()?;
    if let Some(text) = &args.text {
        spec.text.text = text.clone();
    }
    if let Some(anchor) = args.anchor {
        spec.placement = Placement::Anchor(anchor);
    }
    Ok(spec)
}

fn reference_space(config: &Config, space: Space) -> ReferenceSpace {
    match space {
        Space::Source => ReferenceSpace::Source,
        Space::Preview => ReferenceSpace::Preview {
            bounds: config.preview.bounds(),
        },
    }
}

fn collect_sources(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input).max_depth(if recursive { usize::MAX } else { 1 });
            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_supported_source(entry.path()) {
                    sources.push(entry.into_path());
                }
            }
        } else {
            sources.push(input.clone());
        }
    }
    sources.sort();
    sources.dedup();
    sources
}

fn run_templates(store: &TemplateStore, action: TemplateAction) -> anyhow::Result<()> {
    match action {
        TemplateAction::List => {
            let templates = store.load_all()?;
            if templates.is_empty() {
                println!("No templates in {}", store.templates_file().display());
            }
            for (name, record) in &templates {
                let info = record.info(name);
                println!(
                    "{:<24} {:<14} {} {}pt opacity {} rotation {} updated {}",
                    name,
                    info.watermark_position,
                    info.font_family,
                    info.font_size,
                    info.opacity,
                    info.rotation,
                    info.updated_time.as_deref().unwrap_or("-"),
                );
            }
        }
        TemplateAction::Show { name } => {
            let record = store
                .load(&name)?
                .ok_or(TemplateError::NotFound(name))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        TemplateAction::Save { name, from_last } => {
            let record = if from_last {
                store
                    .load_last_settings()?
                    .context("No last used settings saved yet")?
            } else {
                TemplateRecord::default_template()
            };
            store.save(&name, record)?;
            println!("Saved template '{}'", name.trim());
        }
        TemplateAction::Delete { name } => {
            if !store.delete(&name)? {
                bail!(TemplateError::NotFound(name));
            }
            println!("Deleted template '{}'", name);
        }
        TemplateAction::Rename { old_name, new_name } => {
            if !store.rename(&old_name, &new_name)? {
                bail!(TemplateError::NotFound(old_name));
            }
            println!("Renamed '{}' to '{}'", old_name, new_name);
        }
        TemplateAction::Export { file } => {
            let count = store.export(&file)?;
            println!("Exported {} templates to {}", count, file.display());
        }
        TemplateAction::Import { file, overwrite } => {
            let count = store.import(&file, overwrite)?;
            println!("Imported {} templates from {}", count, file.display());
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())
        .with_context(|| "Failed to load configuration".to_string())?;
    filigree::logging::init_subscriber(&config.logging)?;

    tracing::debug!(
        config_file = ?args.config,
        preview = %config.preview.bounds(),
        format = %config.export.format,
        "Configuration loaded"
    );

    let store = TemplateStore::from_config(&config.templates);

    match args.command {
        Command::Render {
            input,
            output,
            watermark,
            export,
        } => {
            let spec = resolve_spec(&store, &watermark)?;
            let mut options = config
                .export
                .to_options(reference_space(&config, watermark.space))?;
            options.format = OutputFormat::from_path(&output)?;
            options.quality = export.quality.unwrap_or(options.quality);
            options.sizing = export.sizing.unwrap_or(options.sizing);

            let fonts = config.fonts.font_book();
            let compositor = Compositor::new(&fonts);
            export_file(&compositor, &input, &output, &spec, &options, LogoSource::Load)
                .with_context(|| format!("Failed to watermark {}", input.display()))?;
            println!("{}", output.display());

            if watermark.remember {
                store.save_last_settings(TemplateRecord::from_spec(&spec))?;
            }
        }
        Command::Batch {
            inputs,
            output_dir,
            naming,
            format,
            recursive,
            watermark,
            export,
        } => {
            let spec = resolve_spec(&store, &watermark)?;
            let mut options = config
                .export
                .to_options(reference_space(&config, watermark.space))?;
            options.format = format.unwrap_or(options.format);
            options.naming = naming.unwrap_or(options.naming);
            options.quality = export.quality.unwrap_or(options.quality);
            options.sizing = export.sizing.unwrap_or(options.sizing);

            let sources = collect_sources(&inputs, recursive);
            if sources.is_empty() {
                bail!("No supported images found");
            }
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;

            let fonts = config.fonts.font_book();
            let compositor = Compositor::new(&fonts);
            let report = export_all(&compositor, &sources, &output_dir, &spec, &options)?;

            for path in &report.exported {
                println!("{}", path.display());
            }
            for failure in &report.failures {
                eprintln!("FAILED {}: {}", failure.source.display(), failure.error);
            }

            if watermark.remember {
                store.save_last_settings(TemplateRecord::from_spec(&spec))?;
            }
            if !report.is_success() {
                bail!(
                    "{} of {} exports failed",
                    report.failures.len(),
                    report.total()
                );
            }
        }
        Command::Info { inputs, json } => {
            for input in collect_sources(&inputs, false) {
                let info = probe(&input)?;
                if json {
                    println!("{}", serde_json::to_string(&info)?);
                } else {
                    println!(
                        "{}: {}x{} {} {} {:.2} KB",
                        info.file_name,
                        info.width,
                        info.height,
                        info.format.as_deref().unwrap_or("unknown"),
                        info.mode.as_str(),
                        info.size_kb
                    );
                }
            }
        }
        Command::Templates { action } => run_templates(&store, action)?,
    }

    Ok(())
}
