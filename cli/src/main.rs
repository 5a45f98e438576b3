use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use vff_core::FileStat;
use vff_filesystems::{VffFilesystem, VffOptions};

#[derive(Parser)]
#[command(name = "vff")]
#[command(about = "Inspect and extract VFF container images", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reject cluster chains longer than this
    #[arg(long, global = true)]
    max_chain: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show volume geometry and allocation counts
    Info {
        image: PathBuf,
    },
    /// List a directory (the root by default)
    Ls {
        image: PathBuf,
        #[arg(default_value = "")]
        path: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one entry
    Stat {
        image: PathBuf,
        path: String,
    },
    /// Print every entry in the volume
    Tree {
        image: PathBuf,
    },
    /// Copy a file out of the volume
    Extract {
        image: PathBuf,
        path: String,
        /// Destination (defaults to the entry name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_volume(image: &Path, options: &VffOptions) -> anyhow::Result<VffFilesystem> {
    debug!("Opening {} with {:?}", image.display(), options);
    VffFilesystem::open_path_with_options(image, options)
        .with_context(|| format!("Failed to load VFF image {}", image.display()))
}

fn print_stat(stat: &FileStat) {
    let kind = if stat.is_directory() { "dir" } else { "file" };
    let modified = stat
        .modified
        .map(|dt| dt.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{:<4} {:>10}  {:<19}  {}", kind, stat.size, modified, stat.name);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut options = VffOptions::new();
    if let Some(max) = cli.max_chain {
        options = options.max_chain_clusters(max);
    }

    match cli.command {
        Commands::Info { image } => {
            let fs = open_volume(&image, &options)?;
            let info = fs.info();
            println!("Image: {}", image.display());
            println!("  Byte order: {:?}-endian", info.endianness);
            println!("  Image size: {} bytes", info.image_size);
            println!("  Volume size: {} bytes", info.volume_size);
            println!("  Cluster size: {} bytes", info.cluster_size);
            println!("  Clusters: {}", info.cluster_count);
            println!("  Table size: {} bytes (x2)", info.table_size);
            println!("  Root directory at: {:#x}", info.root_offset);
            println!("  Data region at: {:#x}", info.data_offset);
            println!("  Used clusters: {}", info.used_clusters);
            println!("  Free clusters: {}", info.free_clusters);
            if info.bad_clusters > 0 || info.reserved_clusters > 0 {
                println!("  Bad clusters: {}", info.bad_clusters);
                println!("  Reserved clusters: {}", info.reserved_clusters);
            }
        }
        Commands::Ls { image, path, json } => {
            let fs = open_volume(&image, &options)?;
            let entries = fs
                .list_directory(&path)
                .with_context(|| format!("Failed to list '{}'", path))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("(empty)");
            } else {
                for entry in &entries {
                    print_stat(entry);
                }
            }
        }
        Commands::Stat { image, path } => {
            let fs = open_volume(&image, &options)?;
            let stat = fs
                .stat(&path)
                .with_context(|| format!("Failed to stat '{}'", path))?;
            print_stat(&stat);
        }
        Commands::Tree { image } => {
            let fs = open_volume(&image, &options)?;
            fs.walk("", |path, record| {
                let depth = path.matches('/').count();
                let suffix = if record.is_directory() { "/" } else { "" };
                println!("{}{}{}", "  ".repeat(depth), record.name(), suffix);
                Ok(())
            })
            .context("Failed to walk the volume")?;
        }
        Commands::Extract { image, path, output } => {
            let fs = open_volume(&image, &options)?;
            let handle = fs
                .open(&path)
                .with_context(|| format!("Failed to open '{}'", path))?;
            let stat = handle.stat();
            print_stat(&stat);

            if stat.is_directory() {
                bail!("'{}' is a directory; only files can be extracted", path);
            }

            let data = handle.read_all()?;
            let destination = output.unwrap_or_else(|| PathBuf::from(&stat.name));
            fs::write(&destination, &data)
                .with_context(|| format!("Failed to write {}", destination.display()))?;
            println!("Extracted {} bytes to {}", data.len(), destination.display());
        }
    }

    Ok(())
}
