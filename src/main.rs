use clap::{Parser, Subcommand};
use pressroom::{config, output, pipeline::Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pressroom")]
#[command(about = "Static site builder with a plugin chain")]
#[command(long_about = "\
Static site builder with a plugin chain

Pages, templates and assets are read from the project directory, passed
through the configured plugins, rendered (markdown and Tera templates) and
written to site/.

Project structure:

  project/
  ├── config.toml                  # Plugin list and options (optional)
  ├── pages/                       # Content: .md, .html, .xml, anything else copied
  │   ├── index.md
  │   └── blog/first-post.md       # → site/blog/first-post.html
  ├── templates/                   # Layouts, referenced by \"template\" in front-matter
  │   └── post.html
  ├── res/                         # Assets → site/res/, byte for byte
  └── plugins/                     # Executable plugins referenced by name

Front-matter is an optional JSON object at the top of a page, followed by a
blank line:

  {\"url\": \"/new/\", \"altUrl\": \"/old\", \"template\": \"post\"}

  # Moved

Run 'pressroom gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the pages, templates and resources of the project
    Scan,
    /// Run the full pipeline: scan → plugins → render → write site/
    Build,
    /// Run scan, plugins and render without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "pressroom=debug"
    } else if quiet {
        "warn"
    } else {
        "pressroom=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Scan => {
            let site = Pipeline::load(&cli.project)?.scan()?;
            output::print_scan_output(&site);
        }
        Command::Build => {
            let pipeline = Pipeline::load(&cli.project)?;
            let outcome = pipeline.build()?;
            output::print_build_output(&outcome.site, &outcome.report, pipeline.project_root());
        }
        Command::Check => {
            let site = Pipeline::load(&cli.project)?.transform()?;
            output::print_check_output(&site);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
