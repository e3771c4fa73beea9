//! Patch management commands.
//!
//! Create, validate, list and print patch files.

use clap::{Args, Subcommand};
use lutsynth_config::{
    Patch, ValidationError, factory_patches, get_factory_patch, list_user_patches,
    resolve_patch, user_patches_dir,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PatchArgs {
    #[command(subcommand)]
    command: PatchCommand,
}

#[derive(Subcommand)]
enum PatchCommand {
    /// Write a starting patch file
    Init {
        /// Destination file
        file: PathBuf,

        /// Start from a factory patch instead of the power-on state
        #[arg(short, long)]
        factory: Option<String>,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },

    /// Validate a patch file
    Check {
        /// Patch file
        file: PathBuf,
    },

    /// List factory and user patches
    List,

    /// Print a patch as TOML
    Show {
        /// Factory name, user patch name or path
        name: String,
    },
}

pub fn run(args: PatchArgs) -> anyhow::Result<()> {
    match args.command {
        PatchCommand::Init {
            file,
            factory,
            force,
        } => init_patch(&file, factory.as_deref(), force),
        PatchCommand::Check { file } => check_patch(&file),
        PatchCommand::List => list_patches(),
        PatchCommand::Show { name } => show_patch(&name),
    }
}

fn init_patch(file: &Path, factory: Option<&str>, force: bool) -> anyhow::Result<()> {
    if file.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            file.display()
        );
    }

    let patch = match factory {
        Some(name) => get_factory_patch(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Factory patch '{}' not found. Use 'lutsynth patch list' to see available patches.",
                name
            )
        })?,
        None => Patch::default(),
    };

    patch.save(file)?;
    println!("Wrote patch '{}' to {}", patch.name, file.display());
    Ok(())
}

fn check_patch(file: &Path) -> anyhow::Result<()> {
    let patch = Patch::load(file)?;

    match patch.validate() {
        Ok(()) => {
            println!(
                "{}: ok ('{}', {} oscillator(s))",
                file.display(),
                patch.name,
                patch.oscillators.len()
            );
            Ok(())
        }
        Err(err) => {
            let errors = match err {
                ValidationError::Multiple(errors) => errors,
                single => vec![single],
            };
            println!("{}: {} problem(s)", file.display(), errors.len());
            for e in &errors {
                println!("  - {e}");
            }
            anyhow::bail!("patch '{}' is invalid", file.display())
        }
    }
}

fn list_patches() -> anyhow::Result<()> {
    println!("Factory Patches:");
    println!("================");
    for patch in factory_patches() {
        let desc = patch.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", patch.name, desc);
    }
    println!();

    println!("User Patches ({}):", user_patches_dir().display());
    println!("=============");
    let user_patches = list_user_patches();
    if user_patches.is_empty() {
        println!("  (none)");
        println!();
        println!("  Create one with: lutsynth patch init <file>\n");
        return Ok(());
    }
    for path in user_patches {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        match Patch::load(&path) {
            Ok(patch) => {
                let desc = patch.description.as_deref().unwrap_or("");
                println!("  {:20} - {}", name, desc);
            }
            Err(_) => println!("  {:20} - (error loading)", name),
        }
    }
    println!();
    Ok(())
}

fn show_patch(name: &str) -> anyhow::Result<()> {
    let patch = resolve_patch(name)?;
    print!("{}", patch.to_toml()?);
    Ok(())
}
