use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use ringframe::{
    CpuSurface, FrameProfile, Session, StandardDecoder, compute_cover, load_overlay,
};

#[derive(Parser, Debug)]
#[command(name = "ringframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a photo into the circular frame and export a PNG.
    Compose(ComposeArgs),
    /// Print the cover-fit crop window for given dimensions as JSON.
    Cover(CoverArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input photo (JPEG, PNG, WebP; other raster formats best-effort).
    #[arg(long)]
    photo: PathBuf,

    /// Decorative frame drawn on top of the photo.
    #[arg(long, default_value = "assets/frame.png")]
    overlay: PathBuf,

    /// Output PNG path. Defaults to the profile's output name.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Frame profile JSON (canvas size, mask inset, overlay scale).
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Print the composite as a data URL instead of writing a file.
    #[arg(long)]
    data_url: bool,
}

#[derive(Parser, Debug)]
struct CoverArgs {
    #[arg(long)]
    src_width: f64,

    #[arg(long)]
    src_height: f64,

    /// Destination width.
    #[arg(long, default_value_t = 1080.0)]
    dst_width: f64,

    /// Destination height.
    #[arg(long, default_value_t = 1080.0)]
    dst_height: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Cover(args) => cmd_cover(args),
    }
}

fn read_profile(path: Option<&PathBuf>) -> anyhow::Result<FrameProfile> {
    let Some(path) = path else {
        return Ok(FrameProfile::default());
    };
    let f = File::open(path).with_context(|| format!("open profile '{}'", path.display()))?;
    let profile = FrameProfile::from_json_reader(BufReader::new(f))?;
    Ok(profile)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let profile = read_profile(args.profile.as_ref())?;
    let size = profile.canvas_size;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&profile.output_name));

    let mut session = Session::new(
        profile,
        Box::new(CpuSurface::new(size, size)?),
        Box::new(StandardDecoder),
    )?;

    // A missing frame asset is a deployment defect, not a reason to stop:
    // the composite proceeds photo-only.
    match load_overlay(&args.overlay, &StandardDecoder) {
        Ok(overlay) => session.install_overlay(overlay)?,
        Err(err) => tracing::warn!(
            overlay = %args.overlay.display(),
            %err,
            "overlay unavailable, compositing without it"
        ),
    }

    let bytes = std::fs::read(&args.photo)
        .with_context(|| format!("read photo '{}'", args.photo.display()))?;
    let ticket = session.begin_selection();
    session.complete_selection(ticket, &bytes)?;

    if args.data_url {
        println!("{}", session.export_png_data_url()?);
        return Ok(());
    }

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, session.export_png()?)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_cover(args: CoverArgs) -> anyhow::Result<()> {
    if args.src_width <= 0.0
        || args.src_height <= 0.0
        || args.dst_width <= 0.0
        || args.dst_height <= 0.0
    {
        anyhow::bail!("dimensions must be > 0");
    }
    let crop = compute_cover(args.src_width, args.src_height, args.dst_width, args.dst_height);
    println!("{}", serde_json::to_string_pretty(&crop)?);
    Ok(())
}
