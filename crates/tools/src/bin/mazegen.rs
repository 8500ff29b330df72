use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use delve_core::{LevelConfig, LevelId, LevelStack, StackManifest};
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum Branch {
    Home,
    Dungeon,
    Volcano,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, value_enum, default_value_t = Branch::Dungeon)]
    branch: Branch,
    #[arg(short, long, default_value_t = 1)]
    depth: u8,
    /// TOML level config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Restore seed, config, and reset epochs from a saved manifest instead
    #[arg(short, long, conflicts_with_all = ["seed", "config"])]
    manifest: Option<PathBuf>,
    /// Write the stack manifest here after rendering
    #[arg(long)]
    save: Option<PathBuf>,
    /// Print the level summary as JSON instead of ASCII
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut stack = match &args.manifest {
        Some(path) => {
            let manifest = StackManifest::load(path)
                .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
            LevelStack::from_manifest(&manifest)
                .context("Manifest does not describe a valid stack")?
        }
        None => {
            let config = match &args.config {
                Some(path) => LevelConfig::load(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => LevelConfig::default(),
            };
            LevelStack::new(config, args.seed).context("Invalid level config")?
        }
    };

    let id = match args.branch {
        Branch::Home => LevelId::HOME,
        Branch::Dungeon => LevelId::dungeon(args.depth),
        Branch::Volcano => LevelId::volcano(args.depth),
    };
    let epoch = stack.epoch_of(id);
    let run_seed = stack.run_seed();
    let level = stack.level_at(id).with_context(|| format!("Failed to build {id:?}"))?;

    if args.json {
        let summary = serde_json::json!({
            "level": id,
            "run_seed": run_seed,
            "epoch": epoch,
            "width": level.width(),
            "height": level.height(),
            "entry": level.entry(),
            "down_stairs": level.down_stairs(),
            "fingerprint": format!("{:#018x}", level.fingerprint()),
            "rows": level.render_ascii().lines().collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", level.render_ascii());
        println!("{id:?} epoch {epoch} seed {run_seed}");
        println!("Fingerprint: {:#018x}", level.fingerprint());
    }

    if let Some(path) = &args.save {
        stack
            .manifest()
            .write_atomic(path)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
    }

    Ok(())
}
