use crate::{OutputFormat, output};
use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use undocheck_browser::{BrowserSession, ChromeFinder, ChromeLauncher, ProfileDir};
use undocheck_core::verifier::{
    DEFAULT_INPUT_ID, DEFAULT_TASK_TITLE, DEFAULT_TOAST_TEXT, DEFAULT_URL,
};
use undocheck_core::{
    KeyChord, PhaseOutcome, Report, ReportWriter, Scenario, ScreenshotSink, UndoVerifier,
    VerifyConfig,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ScenarioArg {
    /// Add a task, undo it, expect the toast and the task gone
    Undo,
    /// Undo while the editor has focus must do nothing
    FocusGuard,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Undo => Scenario::Undo,
            ScenarioArg::FocusGuard => Scenario::FocusGuard,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Address of the app under test
    #[arg(long, env = "UNDOCHECK_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Which check to run
    #[arg(long, env = "UNDOCHECK_SCENARIO", value_enum, default_value = "undo")]
    pub scenario: ScenarioArg,

    /// Title of the task created during the run
    #[arg(long, env = "UNDOCHECK_TASK_TITLE", default_value = DEFAULT_TASK_TITLE)]
    pub task_title: String,

    /// Element id of the task editor input
    #[arg(long, default_value = DEFAULT_INPUT_ID)]
    pub input_id: String,

    /// Text of the notification shown after an undo
    #[arg(long, default_value = DEFAULT_TOAST_TEXT)]
    pub toast_text: String,

    /// Undo shortcut, e.g. Control+z or Meta+z
    #[arg(long, env = "UNDOCHECK_UNDO_CHORD", default_value = "Control+z")]
    pub undo_chord: String,

    /// How long to wait for the app heading (ms)
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub load_timeout_ms: u64,

    /// Default timeout for visibility expectations (ms)
    #[arg(long, value_name = "MS", default_value_t = 5_000)]
    pub expect_timeout_ms: u64,

    /// How long to wait for the undo notification (ms)
    #[arg(long, value_name = "MS", default_value_t = 3_000)]
    pub toast_timeout_ms: u64,

    /// Pause between releasing focus and sending the shortcut (ms)
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub settle_ms: u64,

    /// Timeout for a single DevTools protocol command (ms)
    #[arg(long, value_name = "MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Directory for screenshots
    #[arg(long, env = "UNDOCHECK_SCREENSHOT_DIR", default_value = ".")]
    pub screenshot_dir: PathBuf,

    /// Also write the phase report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Path to Chrome/Chromium binary (auto-detected if not specified)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Persistent profile name, stored under ~/.undocheck/profiles (keeps logins)
    #[arg(long)]
    pub profile: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chrome sandbox (containers running as root)
    #[arg(long)]
    pub no_sandbox: bool,
}

impl VerifyArgs {
    /// Validate the arguments and turn them into a run configuration
    pub fn to_config(&self) -> Result<VerifyConfig> {
        let url = url::Url::parse(&self.url)
            .with_context(|| format!("Invalid URL '{}'", self.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Invalid URL '{}': only http and https are supported",
                self.url
            ));
        }

        let undo_chord: KeyChord = self.undo_chord.parse()?;

        if self.task_title.trim().is_empty() {
            return Err(anyhow!("Task title must not be empty"));
        }

        Ok(VerifyConfig {
            url: self.url.clone(),
            task_title: self.task_title.clone(),
            input_id: self.input_id.clone(),
            toast_text: self.toast_text.clone(),
            undo_chord,
            load_timeout: Duration::from_millis(self.load_timeout_ms),
            expect_timeout: Duration::from_millis(self.expect_timeout_ms),
            toast_timeout: Duration::from_millis(self.toast_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            ..VerifyConfig::default()
        })
    }
}

pub fn execute(args: &VerifyArgs, format: OutputFormat) -> Result<()> {
    let config = args.to_config()?;
    let pretty = format == OutputFormat::Pretty;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        if pretty {
            println!("🔍 Locating Chrome...");
        }
        let chrome_binary = ChromeFinder::new(args.chrome_path.clone()).find()?;
        if pretty {
            println!("✅ Found Chrome at: {}", chrome_binary.display());
        }

        let profile = match &args.profile {
            Some(name) => {
                let profile = ProfileDir::named(name)?;
                if pretty {
                    println!("📁 Using profile: {}", profile.path().display());
                }
                profile
            }
            None => ProfileDir::temporary()?,
        };

        if pretty {
            println!("🚀 Launching Chrome...");
        }
        let mut session = ChromeLauncher::new(chrome_binary, profile)
            .headed(args.headed)
            .sandbox(!args.no_sandbox)
            .request_timeout(Duration::from_millis(args.request_timeout_ms))
            .launch()
            .await?;

        let report = run_scenario(&mut session, config, args).await;

        // Closed on every path, whatever the report says
        if let Err(e) = session.close().await {
            tracing::warn!("Browser did not shut down cleanly: {}", e);
        }

        Ok::<Report, anyhow::Error>(report)
    });

    runtime.shutdown_timeout(Duration::from_millis(100));

    let report = result?;

    if let Some(path) = &args.report {
        ReportWriter::to_file(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    output::print_report(&report, format)?;
    ensure_passed(&report)
}

async fn run_scenario(
    session: &mut BrowserSession,
    config: VerifyConfig,
    args: &VerifyArgs,
) -> Report {
    let sink = ScreenshotSink::new(args.screenshot_dir.clone());
    let mut verifier = UndoVerifier::new(session, config, sink);
    verifier.run(args.scenario.into()).await
}

/// Turn the first failed phase into an error, which exits non-zero
pub fn ensure_passed(report: &Report) -> Result<()> {
    if report.passed() {
        return Ok(());
    }
    match report.first_failure() {
        Some(record) => match &record.outcome {
            PhaseOutcome::Failed { kind, detail } => Err(anyhow!(
                "{} in phase '{}': {}",
                kind,
                record.phase,
                detail
            )),
            _ => Err(anyhow!("Verification failed in phase '{}'", record.phase)),
        },
        None => Err(anyhow!("Verification did not run any phase")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use undocheck_core::{FailureKind, Phase, PhaseRecord};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: VerifyArgs,
    }

    fn parse(extra: &[&str]) -> VerifyArgs {
        let mut argv = vec!["undocheck"];
        argv.extend_from_slice(extra);
        TestCli::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_defaults_match_core_defaults() {
        let config = parse(&[]).to_config().unwrap();
        let defaults = VerifyConfig::default();

        assert_eq!(config.url, defaults.url);
        assert_eq!(config.task_title, defaults.task_title);
        assert_eq!(config.undo_chord, defaults.undo_chord);
        assert_eq!(config.load_timeout, defaults.load_timeout);
        assert_eq!(config.expect_timeout, defaults.expect_timeout);
        assert_eq!(config.toast_timeout, defaults.toast_timeout);
        assert_eq!(config.settle, defaults.settle);
        assert_eq!(config.heading_texts, defaults.heading_texts);
    }

    #[test]
    fn test_overrides_are_applied() {
        let args = parse(&[
            "--url",
            "http://127.0.0.1:4173",
            "--undo-chord",
            "Meta+z",
            "--toast-timeout-ms",
            "1500",
            "--scenario",
            "focus-guard",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(config.url, "http://127.0.0.1:4173");
        assert_eq!(config.undo_chord.to_string(), "Meta+z");
        assert_eq!(config.toast_timeout, Duration::from_millis(1500));
        assert_eq!(Scenario::from(args.scenario), Scenario::FocusGuard);
    }

    #[test]
    fn test_request_timeout_flag() {
        assert_eq!(parse(&[]).request_timeout_ms, 30_000);
        let args = parse(&["--request-timeout-ms", "5000"]);
        assert_eq!(args.request_timeout_ms, 5_000);
    }

    #[test]
    fn test_rejects_bad_url_and_chord() {
        let err = parse(&["--url", "localhost"]).to_config().unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));

        let err = parse(&["--url", "file:///tmp/index.html"]).to_config().unwrap_err();
        assert!(err.to_string().contains("only http and https"));

        let err = parse(&["--undo-chord", "Hyper+z"]).to_config().unwrap_err();
        assert!(err.to_string().contains("Invalid key chord"));
    }

    #[test]
    fn test_ensure_passed_names_failed_phase() {
        let report = Report {
            scenario: Scenario::Undo,
            url: DEFAULT_URL.to_string(),
            started_at: chrono::Utc::now(),
            duration_ms: 3200,
            phases: vec![
                PhaseRecord {
                    phase: Phase::Load,
                    outcome: PhaseOutcome::Passed,
                    duration_ms: 200,
                    screenshot: None,
                },
                PhaseRecord {
                    phase: Phase::Undo,
                    outcome: PhaseOutcome::Failed {
                        kind: FailureKind::UndoNotAcknowledged,
                        detail: "Timed out after 3000ms".to_string(),
                    },
                    duration_ms: 3000,
                    screenshot: None,
                },
            ],
            success_screenshot: None,
        };

        let err = ensure_passed(&report).unwrap_err().to_string();
        assert!(err.contains("UndoNotAcknowledgedFailure"));
        assert!(err.contains("'undo'"));
    }
}
