use bindery::config::{self, BuildConfig};
use bindery::convert::{self, PandocConverter};
use bindery::imaging::RustBackend;
use bindery::{normalize, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Flags for the build command.
#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Skip downscaling, re-encoding and cover processing (orientation is still fixed)
    #[arg(long)]
    no_compress: bool,
}

#[derive(Parser)]
#[command(name = "bindery")]
#[command(about = "Prepare a Markdown manuscript and its images, then bind them into an EPUB")]
#[command(long_about = "\
Prepare a Markdown manuscript and its images, then bind them into an EPUB

Image files are renamed to safe names, rotated upright, downscaled and
re-encoded in place. The cover named in the metadata is resized, the image
references in the chapters are rewritten, and pandoc packages the result.

Project structure:

  book/
  ├── bindery.toml          # Optional config
  ├── metadata.yaml         # pandoc metadata (title, author, cover-image)
  ├── manuscript/           # Chapters, bound in filename order
  │   ├── 01-intro.md
  │   └── 02-chapter.md
  ├── assets/               # Images (.jpg, .jpeg, .png)
  │   └── photo (1).jpg     # → photo1.jpg
  └── output/
      └── output.epub

Files are modified in place. Keep the project under version control.

Run 'bindery gen-config' to generate a documented bindery.toml.")]
#[command(version)]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file [default: <root>/bindery.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: normalize → condition → cover → rewrite → convert
    Build(BuildArgs),
    /// Validate the project layout and show planned renames without changing anything
    Check,
    /// Print a stock bindery.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build(ref args) => {
            let mut config = load_config(&cli)?;
            if args.no_compress {
                config.images.compress = false;
            }

            let report = pipeline::build(
                &config,
                &cli.root,
                &RustBackend::new(),
                &PandocConverter,
                |event| {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                },
            )?;

            for line in output::format_warnings(&report.warnings()) {
                eprintln!("{}", line);
            }
        }
        Command::Check => {
            let config = load_config(&cli)?;
            let paths = config.paths(&cli.root);
            println!("==> Checking {}", cli.root.display());

            let plan = normalize::plan_renames(&paths.assets_dir)?;
            println!("Assets");
            for line in output::format_rename_plan(&plan) {
                println!("    {}", line);
            }

            let manuscripts = convert::collect_manuscripts(&paths.manuscript_dir)?;
            println!("Manuscripts");
            for path in &manuscripts {
                println!("    {}", path.display());
            }
            if manuscripts.is_empty() {
                println!("    (none)");
            }

            let has_metadata = paths.metadata_file.is_file();
            println!("Metadata");
            if has_metadata {
                println!("    {}", paths.metadata_file.display());
            } else {
                println!("    (missing: {})", paths.metadata_file.display());
            }

            for line in output::format_check_summary(manuscripts.len(), has_metadata) {
                println!("{}", line);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config named on the command line, or `<root>/bindery.toml` if present.
fn load_config(cli: &Cli) -> Result<BuildConfig, Box<dyn std::error::Error>> {
    let path = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        Some(path) => path.clone(),
        None => cli.root.join(config::CONFIG_FILE_NAME),
    };
    Ok(config::load_config(&path)?)
}
