use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use igcreator::{
    ArchiveOpts, BatchOpts, ContentDoc, ContentKind, ExportOpts, FontSource, Pacing, Session,
    Template, TemplateSlot, VideoFallback, Watermark,
};

#[derive(Parser, Debug)]
#[command(name = "igcreator", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a content JSON file and print a summary.
    Validate(ValidateArgs),
    /// Write the demo content JSON.
    Sample(SampleArgs),
    /// Render content and export it (requires `ffmpeg` on PATH for reels).
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input content JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input content JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory exported files are written to.
    #[arg(long)]
    out_dir: PathBuf,

    /// Background image for posts (1:1).
    #[arg(long)]
    post_template: Option<PathBuf>,

    /// Background image for reels (9:16).
    #[arg(long)]
    reel_template: Option<PathBuf>,

    /// Watermark text (max 50 characters).
    #[arg(long)]
    watermark: Option<String>,

    /// Font file; defaults to $IGCREATOR_FONT or a system sans-serif.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write a single zip archive instead of individual files.
    #[arg(long, default_value_t = false)]
    zip: bool,

    /// Export a still PNG when a single video capture fails.
    #[arg(long, default_value_t = false)]
    still_fallback: bool,

    /// Pause after every fifth item, in milliseconds.
    #[arg(long, default_value_t = 100)]
    pace_ms: u64,

    /// Export only the item with this id.
    #[arg(long)]
    only: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let doc = ContentDoc::from_path(&args.in_path)?;
    let videos = doc
        .records()
        .iter()
        .filter(|(_, r)| r.kind == ContentKind::Video)
        .count();
    println!(
        "ok: {} items ({} posts, {} videos)",
        doc.len(),
        doc.len() - videos,
        videos
    );
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, igcreator::sample_json_pretty())
        .with_context(|| format!("write sample '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let doc = ContentDoc::from_path(&args.in_path)?;
    if let Some(id) = args.only.as_deref()
        && doc.get(id).is_none()
    {
        anyhow::bail!("no item '{id}' in {}", args.in_path.display());
    }

    let opts = BatchOpts {
        post_template: args
            .post_template
            .as_deref()
            .map(|p| Template::from_path(TemplateSlot::Post, p))
            .transpose()?,
        reel_template: args
            .reel_template
            .as_deref()
            .map(|p| Template::from_path(TemplateSlot::Reel, p))
            .transpose()?,
        watermark: Watermark::from_option(args.watermark.as_deref())?,
        pacing: Pacing {
            pause: Duration::from_millis(args.pace_ms),
            ..Pacing::default()
        },
    };
    let font = match args.font {
        Some(p) => FontSource::File(p),
        None => FontSource::from_env_or_system(),
    };

    let mut session = Session::new(&font)?;
    session.generate_with_progress(doc, &opts, &mut |i, total, id| {
        eprintln!("rendering {}/{} {id}", i + 1, total);
    })?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    if args.zip {
        if let Some(only) = args.only.as_deref() {
            let ids: Vec<String> = session
                .items()
                .iter()
                .map(|i| i.id.clone())
                .filter(|id| id != only)
                .collect();
            for id in ids {
                session.remove(&id);
            }
        }
        let archive = session.export_all(&ArchiveOpts::default(), &mut |m| eprintln!("{m}"))?;
        let out = args.out_dir.join(&archive.filename);
        std::fs::write(&out, &archive.bytes)
            .with_context(|| format!("write archive '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
        return Ok(());
    }

    let export_opts = ExportOpts {
        video_fallback: if args.still_fallback {
            VideoFallback::StillFrame
        } else {
            VideoFallback::Fail
        },
        timestamp_ms: None,
    };
    let ids: Vec<String> = session
        .items()
        .iter()
        .map(|i| i.id.clone())
        .filter(|id| args.only.as_deref().is_none_or(|only| only == id))
        .collect();
    for id in ids {
        let file = session.export_item(&id, &export_opts, &mut |m| eprintln!("{id}: {m}"))?;
        let out = args.out_dir.join(&file.filename);
        std::fs::write(&out, &file.bytes)
            .with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
