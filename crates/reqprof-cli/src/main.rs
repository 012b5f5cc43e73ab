use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use reqprof_cli::OutputFormat;
use reqprof_cli::commands;
use reqprof_cli::commands::input::InputArgs;
use reqprof_core::ErrorKind;
use reqprof_core::report::ReportOptions;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "reqprof")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Profile request trace logs: per-URL statistics, per-request detail, traffic over time",
    long_about = "reqprof merges one or more request trace logs (lines of the form \
                  'CODE PID REQID TIMESTAMP [PAYLOAD]'), reconstructs each request from its \
                  begin/input/output/end events, and reports on the result.\n\n\
                  Running reqprof with files and no subcommand prints the cumulative report.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    cumulative: CumulativeArgs,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Args)]
struct CumulativeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Sort by: url, hits, hangs, max, min, median, mean, total
    #[arg(long, value_name = "SPEC")]
    sort: Option<String>,

    #[command(flatten)]
    rows: RowArgs,
}

#[derive(Args)]
struct RowArgs {
    /// Only show the first N rows (0 shows all)
    #[arg(long, value_name = "N", default_value_t = 0)]
    top: usize,

    /// Do not cut rows to 78 columns
    #[arg(long)]
    verbose: bool,
}

impl RowArgs {
    fn options(&self) -> ReportOptions {
        ReportOptions {
            top: self.top,
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Per-URL elapsed-time statistics (the default report)
    Cumulative(CumulativeArgs),

    /// One line per request
    Detailed {
        #[command(flatten)]
        input: InputArgs,

        /// Sort by: start, win, wout, wend, total, endstage, isize, osize,
        /// httpcode, active, url
        #[arg(long, value_name = "SPEC")]
        sort: Option<String>,

        #[command(flatten)]
        rows: RowArgs,
    },

    /// Number of requests per time slice
    Timed {
        #[command(flatten)]
        input: InputArgs,

        /// Seconds per slice
        #[arg(long, value_name = "SECS", default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        resolution: u32,
    },

    /// Requests made around each hit on one URL
    Urlfocus {
        #[command(flatten)]
        input: InputArgs,

        /// URL to focus on
        #[arg(long)]
        url: String,

        /// Seconds to look before and after each hit
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        window: u32,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for reqprof.\n\n\
                            SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  \
                            bash: reqprof completion --shell bash >> ~/.bashrc\n  \
                            zsh:  reqprof completion --shell zsh > \"${fpath[1]}/_reqprof\"\n  \
                            fish: reqprof completion --shell fish > ~/.config/fish/completions/reqprof.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;

    match cli.command {
        None => {
            let CumulativeArgs { input, sort, rows } = cli.cumulative;
            commands::cumulative::execute(&input, sort.as_deref(), rows.options(), format)
        }
        Some(Commands::Cumulative(CumulativeArgs { input, sort, rows })) => {
            commands::cumulative::execute(&input, sort.as_deref(), rows.options(), format)
        }
        Some(Commands::Detailed { input, sort, rows }) => {
            commands::detailed::execute(&input, sort.as_deref(), rows.options(), format)
        }
        Some(Commands::Timed { input, resolution }) => {
            commands::timed::execute(&input, resolution, format)
        }
        Some(Commands::Urlfocus { input, url, window }) => {
            commands::urlfocus::execute(&input, &url, window, format)
        }
        Some(Commands::Completion { shell }) => {
            commands::completion::execute(shell, Cli::command())
        }
    }
}

/// Map a failure onto its exit behavior: one line for user mistakes, the full
/// chain plus usage for anything unexpected.
fn report_error(err: &anyhow::Error) -> ExitCode {
    let kind = err
        .downcast_ref::<reqprof_core::Error>()
        .map(reqprof_core::Error::kind);

    match kind {
        Some(ErrorKind::Configuration) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            ExitCode::from(2)
        }
        Some(ErrorKind::Decode | ErrorKind::Lifecycle) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
        Some(ErrorKind::Unrecoverable) | None => {
            eprintln!("{} {:?}", style("error:").red().bold(), err);
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if debug {
        EnvFilter::new("reqprof=debug,reqprof_cli=debug,reqprof_core=debug")
    } else {
        EnvFilter::try_from_env("REQPROF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
