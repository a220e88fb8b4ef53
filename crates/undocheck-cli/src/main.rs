use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use undocheck_cli::OutputFormat;
use undocheck_cli::commands::{self, verify::VerifyArgs};

#[derive(Parser)]
#[command(name = "undocheck")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "End-to-end check of a task journal's undo feature",
    long_about = "undocheck drives the app in Chrome: it adds a task, sends the undo shortcut, \
                  and verifies that an \"Undone\" notification appears and the task is gone. \
                  Screenshots are written on failure and on success."
)]
struct Cli {
    #[command(flatten)]
    verify: VerifyArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for the summary
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        return commands::completion::execute(shell, &mut Cli::command(), &mut std::io::stdout());
    }

    init_logging(cli.verbose);

    commands::verify::execute(&cli.verify, cli.format)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("undocheck_cli=debug,undocheck_core=debug,undocheck_browser=debug")
        } else {
            EnvFilter::new("undocheck_cli=info,undocheck_core=info,undocheck_browser=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
