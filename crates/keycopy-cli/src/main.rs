//! keycopy CLI: decode key photos and cut printable blades.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use keycopy::{
    default_file_name, normalize_background, BladeBuilder, DecodeReport, KeyCode, KeyDecoder,
    KeyProfile, KeySurface, Mesh, StlWriter, ToolConfig,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "keycopy")]
#[command(about = "Read pin-tumbler key bitting from photos and build blade meshes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the bitting code from a key photo.
    Decode(CliDecodeArgs),

    /// Build the blade mesh for a code and write it as ASCII STL.
    Cut(CliCutArgs),

    /// Decode a photo, then cut the decoded code.
    Copy(CliCopyArgs),

    /// Print a validated key blank profile.
    ProfileInfo {
        /// Path to the key blank profile (JSON).
        #[arg(long)]
        profile: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliProfileArgs {
    /// Path to the key blank profile (JSON).
    #[arg(long)]
    profile: PathBuf,

    /// Optional tool config (JSON) overriding decoder, background and mesh tunables.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliDecodeArgs {
    /// Path to the key photo.
    #[arg(long)]
    image: PathBuf,

    #[command(flatten)]
    common: CliProfileArgs,

    /// Path to write the decode report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the normalized, squared-up photo.
    #[arg(long)]
    save_normalized: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliCutArgs {
    /// Bitting code, one digit per cylinder.
    #[arg(long)]
    code: String,

    #[command(flatten)]
    common: CliProfileArgs,

    #[command(flatten)]
    output: CliStlArgs,
}

#[derive(Debug, Clone, Args)]
struct CliCopyArgs {
    /// Path to the key photo.
    #[arg(long)]
    image: PathBuf,

    #[command(flatten)]
    common: CliProfileArgs,

    /// Path to write the decode report (JSON).
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(flatten)]
    output: CliStlArgs,
}

#[derive(Debug, Clone, Args)]
struct CliStlArgs {
    /// Shaft fragment (ASCII STL facets); defaults to the profile's shaftPath.
    #[arg(long)]
    shaft: Option<PathBuf>,

    /// Output STL path; defaults to <profileName>-<code>-<unix>.stl.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(args) => run_decode(&args),
        Commands::Cut(args) => run_cut(&args),
        Commands::Copy(args) => run_copy(&args),
        Commands::ProfileInfo { profile } => run_profile_info(&profile),
    }
}

fn load_inputs(args: &CliProfileArgs) -> CliResult<(KeyProfile, ToolConfig)> {
    let profile = KeyProfile::from_json_file(&args.profile).map_err(|e| -> CliError {
        format!("Failed to load profile {}: {}", args.profile.display(), e).into()
    })?;
    let config = match &args.config {
        Some(path) => ToolConfig::from_json_file(path).map_err(|e| -> CliError {
            format!("Failed to load config {}: {}", path.display(), e).into()
        })?,
        None => ToolConfig::default(),
    };
    Ok((profile, config))
}

// ── profile-info ──────────────────────────────────────────────────────

fn run_profile_info(path: &Path) -> CliResult<()> {
    let profile = KeyProfile::from_json_file(path)?;
    let levels = profile.depth_levels();

    println!("keycopy profile {}", path.display());
    println!("  name:            {} (id {})", profile.profile_name, profile.id);
    println!("  cylinders:       {}", profile.cylinder_count);
    println!(
        "  depth digits:    {}..={} ({} mm steps)",
        levels.first,
        levels.last(),
        profile.depth_spacing
    );
    println!("  MACS:            {}", profile.minimum_adjacent_cut_specification);
    println!(
        "  blade:           {} mm tall, {} mm thick, tip {} mm",
        profile.blade_height, profile.blade_width, profile.blade_tip_length
    );
    println!("  key length:      {} mm", profile.key_length);
    println!("  shaft:           {}", profile.shaft_path);
    println!("{}", serde_json::to_string_pretty(&profile)?);

    Ok(())
}

// ── decode ────────────────────────────────────────────────────────────

fn decode_photo(
    image: &Path,
    profile: &KeyProfile,
    config: &ToolConfig,
) -> CliResult<(DecodeReport, KeySurface)> {
    tracing::info!("Loading image: {}", image.display());
    let photo = KeySurface::open(image).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", image.display(), e).into()
    })?;

    let (surface, stats) = normalize_background(photo, &config.background)?;
    let decoder = KeyDecoder::new(profile.decode_profile(), config.decoder.clone());
    let (report, surface) = decoder.decode_keep_surface(surface, &stats)?;
    Ok((report, surface))
}

fn write_report(report: &DecodeReport, path: &Path) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

fn run_decode(args: &CliDecodeArgs) -> CliResult<()> {
    let (profile, config) = load_inputs(&args.common)?;
    let (report, surface) = decode_photo(&args.image, &profile, &config)?;

    println!("{}", report.code);

    if let Some(path) = &args.out {
        write_report(&report, path)?;
    }
    if let Some(path) = &args.save_normalized {
        surface.as_image().save(path)?;
        tracing::info!("Normalized photo written to {}", path.display());
    }
    Ok(())
}

// ── cut ───────────────────────────────────────────────────────────────

fn cut_code(
    code: &KeyCode,
    profile: &KeyProfile,
    config: &ToolConfig,
    profile_path: &Path,
    output: &CliStlArgs,
) -> CliResult<PathBuf> {
    let cut = profile.cut_profile(profile_path.parent());
    let mesh: Mesh = BladeBuilder::new(&cut)
        .with_limits(config.mesh.clone())
        .build(code)?;
    tracing::info!(code = %code, triangles = mesh.len(), "Blade built");

    let shaft = output.shaft.clone().unwrap_or_else(|| cut.shaft_path.clone());
    let out = match &output.out {
        Some(p) => p.clone(),
        None => {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
            PathBuf::from(default_file_name(&profile.profile_name, code, now))
        }
    };
    StlWriter::new(config.mesh.clone()).write_file(&mesh, &shaft, &out)?;
    Ok(out)
}

fn run_cut(args: &CliCutArgs) -> CliResult<()> {
    let (profile, config) = load_inputs(&args.common)?;
    let code: KeyCode = args.code.trim().parse()?;
    let out = cut_code(&code, &profile, &config, &args.common.profile, &args.output)?;
    println!("{}", out.display());
    Ok(())
}

// ── copy ──────────────────────────────────────────────────────────────

fn run_copy(args: &CliCopyArgs) -> CliResult<()> {
    let (profile, config) = load_inputs(&args.common)?;
    let (report, _) = decode_photo(&args.image, &profile, &config)?;
    tracing::info!(code = %report.code, mirrored = report.mirrored, "Decoded");

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }
    let out = cut_code(&report.code, &profile, &config, &args.common.profile, &args.output)?;
    println!("{} {}", report.code, out.display());
    Ok(())
}
