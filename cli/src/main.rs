//! Command-line tooling for lightpath level files.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use lightpath_core::{
    Catalog, Coord2, Level, Mirror, PACK_SEPARATOR, Session, SessionConfig, format,
};

mod render;

#[derive(Parser, Debug)]
#[command(name = "lightpath", version, about = "Check and replay light-reflection puzzle levels")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate level files or `===`-separated packs
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Place mirrors on a level and show where the beam ends up
    Trace {
        file: PathBuf,
        /// Level name inside a pack, defaults to the first level
        #[arg(short, long)]
        level: Option<String>,
        /// Mirror to place, as `X,Y,/` or `X,Y,\`; repeatable
        #[arg(short, long = "mirror", value_name = "X,Y,M")]
        mirrors: Vec<MirrorArg>,
        /// Session settings in TOML
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the session snapshot as JSON instead of a drawing
        #[arg(long)]
        json: bool,
    },
    /// Print levels in canonical form
    Fmt { file: PathBuf },
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct MirrorArg {
    position: Coord2,
    mirror: Mirror,
}

impl FromStr for MirrorArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(3, ',').map(str::trim);
        let (Some(x), Some(y), Some(glyph)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected X,Y,MIRROR, got {value:?}"));
        };

        let x = x.parse().map_err(|_| format!("invalid x coordinate {x:?}"))?;
        let y = y.parse().map_err(|_| format!("invalid y coordinate {y:?}"))?;
        let mut chars = glyph.chars();
        let mirror = match (chars.next().and_then(Mirror::from_glyph), chars.next()) {
            (Some(mirror), None) => mirror,
            _ => return Err(format!("mirror must be '/' or '\\', got {glyph:?}")),
        };

        Ok(Self {
            position: (x, y),
            mirror,
        })
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Catalog::from_pack(&text))
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn select_level<'a>(catalog: &'a Catalog, name: Option<&str>) -> Result<&'a Level> {
    match name {
        Some(name) => catalog
            .find(name)
            .with_context(|| format!("no level named {name:?}")),
        None => catalog.get(0).context("no loadable level in file"),
    }
}

fn check(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for file in files {
        let catalog = load_catalog(file)?;
        for level in catalog.levels() {
            let (width, height) = level.size();
            println!(
                "ok     {}: {:?} ({}, {width}x{height}, {} mirrors)",
                file.display(),
                level.name(),
                level.difficulty(),
                level.max_mirrors()
            );
        }
        for failure in catalog.failures() {
            println!("error  {}#{}: {}", file.display(), failure.index, failure.error);
        }
        failed += catalog.failures().len();
    }

    if failed > 0 {
        bail!("{failed} level(s) failed to load");
    }
    Ok(())
}

fn run_trace(
    file: &Path,
    level: Option<&str>,
    mirrors: &[MirrorArg],
    config: Option<&Path>,
    json: bool,
) -> Result<()> {
    let catalog = load_catalog(file)?;
    let level = select_level(&catalog, level)?;
    let config = load_config(config)?;

    let mut session = Session::with_config(level.clone(), config)?;
    for arg in mirrors {
        let (x, y) = arg.position;
        session
            .place_mirror(arg.position, arg.mirror)
            .with_context(|| format!("placing {} at {x},{y}", arg.mirror.glyph()))?;
    }

    let snapshot = session.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render::render(&snapshot));
    }
    Ok(())
}

fn run_fmt(file: &Path) -> Result<()> {
    let catalog = load_catalog(file)?;
    if let Some(failure) = catalog.failures().first() {
        bail!("{}#{}: {}", file.display(), failure.index, failure.error);
    }

    let separator = format!("{PACK_SEPARATOR}\n");
    let texts: Vec<_> = catalog.levels().iter().map(format::write).collect();
    print!("{}", texts.join(separator.as_str()));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();
    log::debug!("{:?}", cli.command);

    match &cli.command {
        Command::Check { files } => check(files),
        Command::Trace {
            file,
            level,
            mirrors,
            config,
            json,
        } => run_trace(file, level.as_deref(), mirrors, config.as_deref(), *json),
        Command::Fmt { file } => run_fmt(file),
    }
}
