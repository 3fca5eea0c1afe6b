use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use virtual_stager::catalog::{RoomType, Style};
use virtual_stager::config::{ConfigOverrides, StagerConfig};
use virtual_stager::export::write_export;
use virtual_stager::storage::FileStore;
use virtual_stager::{
    ExportFormat, ExportResolution, GenerationClient, HasRecoverySuggestion, HouseProfileStore,
    StagingSession, Upload,
};

/// Stage empty rooms with furniture using a remote generation service.
#[derive(Parser, Debug)]
#[command(name = "stager")]
#[command(version)]
#[command(about = "🛋️  Virtual staging for room photos")]
#[command(long_about = "Upload a photo of an empty or partially furnished room, pick a room type and a decor style,
and get back a staged rendering. House profiles keep several rooms of one property consistent.")]
struct Cli {
    /// Base URL of the staging backend
    #[arg(long, global = true, help = "Staging backend base URL (env: STAGER_BACKEND_URL)")]
    backend_url: Option<String>,

    /// Directory holding persisted house profiles
    #[arg(long, global = true, help = "Profile storage directory (env: STAGER_DATA_DIR)")]
    data_dir: Option<PathBuf>,

    /// Explicit config file
    #[arg(long, global = true, help = "TOML config file (default: <config dir>/virtual-stager/config.toml)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the aspect-ratio label of an image
    Classify {
        /// Image file to inspect
        image: PathBuf,
    },
    /// Upload, stage and export a room photo
    Stage(StageArgs),
    /// Re-export a previously staged image
    Export(ExportArgs),
    /// Manage house profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Check that the staging backend is reachable
    Health,
}

#[derive(Args, Debug)]
struct StageArgs {
    /// Photo of the room to stage
    image: PathBuf,

    #[arg(short, long, value_enum, ignore_case = true, default_value_t = RoomType::Living)]
    room: RoomType,

    /// Decor style (locked to the profile's style when --profile is given)
    #[arg(short, long, value_enum, ignore_case = true)]
    style: Option<Style>,

    /// House profile id or name for multi-room continuity
    #[arg(short, long)]
    profile: Option<String>,

    /// Skip the scene-analysis report
    #[arg(long)]
    no_analysis: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Staged image to re-export
    image: PathBuf,

    #[arg(short, long, value_enum, ignore_case = true, default_value_t = RoomType::Living)]
    room: RoomType,

    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Style::Modern)]
    style: Style,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Png,
          help = "Export format: png (lossless, keeps transparency) or jpg (quality 95, white background)")]
    format: ExportFormat,

    #[arg(long, value_enum, default_value_t = ExportResolution::Original,
          help = "Export resolution: original or 4k (longest side 3840px)")]
    resolution: ExportResolution,

    #[arg(short, long, help = "Directory to write the export to (env: STAGER_OUTPUT_DIR)")]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Create a profile with the style's default design DNA
    Create {
        name: String,
        #[arg(short, long, value_enum, ignore_case = true, default_value_t = Style::Modern)]
        style: Style,
    },
    /// List stored profiles
    List,
    /// Delete a profile by id or name
    Delete { profile: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "virtual_stager=info,stager=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output_dir = match &cli.command {
        Command::Stage(a) => a.output.output_dir.clone(),
        Command::Export(a) => a.output.output_dir.clone(),
        _ => None,
    };
    let enable_analysis = match &cli.command {
        Command::Stage(a) if a.no_analysis => Some(false),
        _ => None,
    };
    let overrides = ConfigOverrides {
        backend_url: cli.backend_url.clone(),
        data_dir: cli.data_dir.clone(),
        output_dir,
        enable_analysis,
    };
    let config = StagerConfig::resolve(overrides, cli.config.as_deref())?;
    debug!(?config, "configuration resolved");

    match cli.command {
        Command::Classify { image } => classify(image),
        Command::Stage(args) => stage(&config, args).await,
        Command::Export(args) => export(&config, args),
        Command::Profile(cmd) => profile(&config, cmd),
        Command::Health => health(&config).await,
    }
}

fn classify(image: PathBuf) -> Result<()> {
    let upload = Upload::from_path(&image)?;
    println!(
        "{} ({}x{}) → {}",
        upload.name, upload.width, upload.height, upload.aspect_ratio
    );
    Ok(())
}

fn open_profiles(config: &StagerConfig) -> Result<HouseProfileStore<FileStore>> {
    let storage = FileStore::open(&config.data_dir)?;
    Ok(HouseProfileStore::load(storage)?)
}

async fn stage(config: &StagerConfig, args: StageArgs) -> Result<()> {
    let client = GenerationClient::new(&config.backend_url)?;
    let mut profiles = open_profiles(config)?;
    let mut session = StagingSession::new();

    session.load_upload(Upload::from_path(&args.image)?)?;
    session.set_room_type(args.room);
    session.set_analysis_enabled(config.enable_analysis);

    if let Some(query) = &args.profile {
        let id = profiles
            .find(query)
            .map(|p| p.id.clone())
            .with_context(|| format!("no house profile matches '{}'", query))?;
        session.select_profile(&mut profiles, &id)?;
    }
    if let Some(style) = args.style {
        session.set_style(&profiles, style)?;
    }

    if let Some(upload) = session.original() {
        info!(
            image = %upload.name,
            aspect_ratio = %upload.aspect_ratio,
            room_type = %session.room_type(),
            style = %session.style(),
            "staging"
        );
        println!(
            "Staging {} in {} style: {}",
            session.room_type().label(),
            session.style().label(),
            session.room_type().description()
        );
    }

    if let Err(e) = session.run_generation(&client, &mut profiles).await {
        eprintln!("✗ {}", session.phase());
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("  {}", hint);
        }
        bail!("generation failed");
    }

    if let Some(analysis) = session.analysis() {
        println!("{}", analysis.report());
    }

    let generated = session
        .generated()
        .context("generation completed without an image")?;
    let image = client.resolve_image(generated).await?;
    let path = write_export(
        &config.output_dir,
        &image.bytes,
        session.room_type(),
        session.style(),
        args.output.format,
        args.output.resolution,
    )?;
    println!("✓ Staged image written to {}", path.display());

    if let Some(profile) = profiles.active() {
        println!(
            "  House profile '{}': {} room(s) staged",
            profile.name, profile.rooms_staged
        );
    }
    Ok(())
}

fn export(config: &StagerConfig, args: ExportArgs) -> Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("reading {}", args.image.display()))?;
    let path = write_export(
        &config.output_dir,
        &bytes,
        args.room,
        args.style,
        args.output.format,
        args.output.resolution,
    )?;
    println!("✓ Exported to {}", path.display());
    Ok(())
}

fn profile(config: &StagerConfig, cmd: ProfileCommand) -> Result<()> {
    let mut profiles = open_profiles(config)?;
    match cmd {
        ProfileCommand::Create { name, style } => {
            let p = profiles.create(&name, style)?;
            println!("✓ Created '{}' ({})  id: {}", p.name, p.style.label(), p.id);
            let dna = &p.design_dna;
            println!("  Primary colors: {}", dna.primary_colors);
            println!("  Accent colors:  {}", dna.accent_colors);
            println!("  Wood tone:      {}", dna.wood_tone);
            println!("  Metal finish:   {}", dna.metal_finish);
            println!("  Textiles:       {}", dna.textile_style);
            println!("  Flooring:       {}", dna.flooring_note);
        }
        ProfileCommand::List => {
            if profiles.is_empty() {
                println!("No house profiles yet. Create one with: stager profile create <name> --style <style>");
            }
            for p in profiles.profiles() {
                println!(
                    "{}  {:<24} {:<18} {} room(s)  created {}",
                    p.id,
                    p.name,
                    p.style.label(),
                    p.rooms_staged,
                    p.created_at.format("%Y-%m-%d")
                );
            }
        }
        ProfileCommand::Delete { profile } => {
            let id = profiles
                .find(&profile)
                .map(|p| p.id.clone())
                .with_context(|| format!("no house profile matches '{}'", profile))?;
            let removed = profiles.delete(&id)?;
            println!("✓ Deleted '{}'", removed.name);
        }
    }
    Ok(())
}

async fn health(config: &StagerConfig) -> Result<()> {
    let client = GenerationClient::new(&config.backend_url)?;
    client.health().await?;
    println!("✓ {} is healthy", client.base_url());
    Ok(())
}
