use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use toot_archive::config::{self, ArchiveConfig};
use toot_archive::events::Reporter;
use toot_archive::{archive, output};
use tracing_subscriber::EnvFilter;

/// Overrides for individual `config.toml` keys.
#[derive(clap::Args, Clone, Default)]
struct Overrides {
    /// Mastodon export directory (outbox.json + media_attachments/)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Directory containing toot.html.j2
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Directory containing css/, fonts/ and img/
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// URL prefix stripped from status URLs (must end with `/`)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Path under the output directory where media is copied
    #[arg(long, global = true)]
    media_prefix: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut ArchiveConfig) {
        if let Some(input) = self.input {
            config.input_dir = input;
        }
        if let Some(templates) = self.templates {
            config.template_dir = templates;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(base_url) = self.base_url {
            config.base_prefix_url = base_url;
        }
        if let Some(media_prefix) = self.media_prefix {
            config.base_prefix_media = media_prefix;
        }
    }
}

#[derive(Parser)]
#[command(name = "toot-archive")]
#[command(about = "Static HTML archive of a Mastodon export")]
#[command(long_about = "\
Static HTML archive of a Mastodon export

Turns the outbox of a Mastodon account export into one HTML page per
original post, next to the export's media and your static assets.
Boosts are skipped.

Input layout:

  export/
  ├── outbox.json                  # ActivityStreams OrderedCollection
  └── media_attachments/           # copied to <output>/<media prefix>/
  templates/
  └── toot.html.j2                 # Jinja template, sees `toot`
  static/
  ├── css/  fonts/  img/           # copied to <output>/

Output:

  output/
  ├── css/ fonts/ img/
  ├── socialjuanluspace/media_attachments/
  └── astrojuanlu/110123.html      # one page per post

Existing output is merged into, never wiped. Set RUST_LOG=debug for a
per-post log.

Run 'toot-archive gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the archive
    Build,
    /// Validate the export and show what would be generated, without writing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            let config = resolve_config(&cli.config_dir, cli.overrides)?;
            let output_dir = config.output_dir.clone();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer_dir = output_dir.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_event(&event, &printer_dir);
                }
            });
            let result = {
                let reporter = Reporter::new(Some(tx));
                archive::generate(&config, &reporter)
            };
            printer
                .join()
                .map_err(|_| "output thread panicked")?;

            let summary = result?;
            output::print_summary(&summary, &output_dir);
        }
        Command::Check => {
            let config = resolve_config(&cli.config_dir, cli.overrides)?;
            println!("==> Checking {}", config.input_dir.display());
            let summary = archive::check(&config, &Reporter::silent())?;
            output::print_check_output(&summary, &config.output_dir);
            println!("==> Export is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `config.toml` from `config_dir` (or defaults), with command-line
/// overrides on top.
fn resolve_config(
    config_dir: &std::path::Path,
    overrides: Overrides,
) -> Result<ArchiveConfig, config::ConfigError> {
    let mut config = config::load_config(config_dir)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}
