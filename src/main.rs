use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

use dicom_render_config::{
    LightingChannel, RenderConfigModel, RenderMode, RenderSettings, SortBy, VolumeLoader,
};

/// Apply viewer render settings and print the resulting frame description as JSON.
#[derive(Debug, Parser)]
#[command(author, about, version)]
struct Args {
    /// JSON file with stored render settings; flags below override it.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// ISO threshold for surface rendering, 1 to 255.
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i32>,

    /// Ambient coefficient, 0 to 10.
    #[arg(long, allow_negative_numbers = true)]
    ambient: Option<i32>,

    /// Diffuse coefficient, 0 to 10.
    #[arg(long, allow_negative_numbers = true)]
    diffuse: Option<i32>,

    /// Specular coefficient, 0 to 10.
    #[arg(long, allow_negative_numbers = true)]
    specular: Option<i32>,

    /// Do not redraw while controls are being dragged.
    #[arg(long)]
    no_real_time: bool,

    /// Directory holding the DICOM series (.dcm files).
    #[arg(long, value_name = "DIR")]
    dicom: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "image-position-patient")]
    sort_by: SortByArg,

    /// Write a classified PNG of the centre axial slice. Requires --dicom.
    #[arg(long, value_name = "FILE", requires = "dicom")]
    preview: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Surface,
    RayCast,
}

impl From<ModeArg> for RenderMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Surface => RenderMode::Surface,
            ModeArg::RayCast => RenderMode::RayCast,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortByArg {
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}

impl From<SortByArg> for SortBy {
    fn from(value: SortByArg) -> Self {
        match value {
            SortByArg::ImagePositionPatient => SortBy::ImagePositionPatient,
            SortByArg::TablePosition => SortBy::TablePosition,
            SortByArg::InstanceNumber => SortBy::InstanceNumber,
            SortByArg::None => SortBy::None,
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    use simplelog::LevelFilter::{Debug, Info, Off};
    simplelog::TermLogger::init(
        if args.verbose { Debug } else { Info },
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let model = build_model(&args)?;
    log::debug!(
        "{}, {}, {}, {}",
        model.threshold_label(),
        model.lighting_label(LightingChannel::Ambient),
        model.lighting_label(LightingChannel::Diffuse),
        model.lighting_label(LightingChannel::Specular),
    );

    if let Some(dir) = &args.dicom {
        let volume = VolumeLoader::load_from_directory(dir, args.sort_by.into())
            .with_context(|| format!("failed to load DICOM series from {}", dir.display()))?;
        if let Some((min, max)) = volume.scalar_range() {
            log::info!("scalar range {min} to {max}");
        }

        if let Some(path) = &args.preview {
            let image = volume
                .axial_preview(volume.dim().0 / 2, &model.volume_property())
                .context("volume has no axial slices")?;
            image
                .save(path)
                .with_context(|| format!("failed to write preview to {}", path.display()))?;
            log::info!("wrote preview to {}", path.display());
        }
    }

    println!("{}", serde_json::to_string_pretty(&model.frame())?);
    Ok(())
}

fn build_model(args: &Args) -> Result<RenderConfigModel, anyhow::Error> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings from {}", path.display()))?;
            serde_json::from_str::<RenderSettings>(&text)
                .with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => RenderSettings::default(),
    };

    if let Some(mode) = args.mode {
        settings.mode = mode.into();
    }
    settings.threshold = args.threshold.unwrap_or(settings.threshold);
    settings.ambient = args.ambient.unwrap_or(settings.ambient);
    settings.diffuse = args.diffuse.unwrap_or(settings.diffuse);
    settings.specular = args.specular.unwrap_or(settings.specular);
    if args.no_real_time {
        settings.real_time = false;
    }

    Ok(RenderConfigModel::from_settings(&settings)?)
}
