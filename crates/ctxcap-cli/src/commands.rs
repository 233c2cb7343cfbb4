use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::info;

use ctxcap_bridge::{BridgeOutcome, EdgeBridge, RecordingDispatcher};
use ctxcap_report::CaptureReport;
use ctxcap_session::{
    CaptureConfig, CaptureHandle, CaptureSession, ReportSink, StopOutcome, TracingSink,
    NO_DOCUMENTS_NOTICE,
};
use ctxcap_types::SourceId;

use crate::cli::*;
use crate::input;

/// Prints report text to standard output.
struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{}", text.trim_end());
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Capture(args) => cmd_capture(args, config, cli.format),
        Command::Bridge(args) => cmd_bridge(args, config, cli.format),
        Command::Config(_) => cmd_config(&config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CaptureConfig> {
    match path {
        Some(path) => {
            let config = CaptureConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(CaptureConfig::default()),
    }
}

/// Command-line flags take precedence over the configuration file.
fn apply_stop_args(mut config: CaptureConfig, args: StopArgs) -> CaptureConfig {
    if args.no_merge {
        config.stop.merge = false;
    }
    if args.case_sensitive {
        config.stop.case_sensitive = true;
    }
    config
}

fn sink_for(format: OutputFormat) -> Box<dyn ReportSink> {
    match format {
        OutputFormat::Text => Box::new(StdoutSink),
        OutputFormat::Json => Box::new(TracingSink),
    }
}

fn print_json(report: &CaptureReport) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(report).context("serializing report")?;
    println!("{text}");
    Ok(())
}

fn cmd_capture(args: CaptureArgs, config: CaptureConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = apply_stop_args(config, args.stop);
    let documents = input::read_documents(&args.input)?;

    let mut session = CaptureSession::with_sink(sink_for(format));
    session.start();
    for data in documents {
        session.add_document(data, SourceId::new());
    }

    match session.stop(config.stop) {
        StopOutcome::Reported(report) => {
            if format == OutputFormat::Json {
                print_json(&report)?;
            } else if report.has_conflicts() {
                eprintln!("{} merge conflicts found", "!".yellow().bold());
            }
        }
        StopOutcome::NoDocuments => {
            if format == OutputFormat::Json {
                println!("null");
            }
            eprintln!("{} {}", "!".yellow().bold(), NO_DOCUMENTS_NOTICE);
        }
        StopOutcome::NotCapturing => {}
    }
    Ok(())
}

fn cmd_bridge(args: BridgeArgs, config: CaptureConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = apply_stop_args(config, args.stop);
    let events = input::read_events(&args.input)?;

    let hub = RecordingDispatcher::new();
    let capture = CaptureHandle::with_sink(sink_for(format));
    let mut bridge = EdgeBridge::new(&config, capture, hub.clone());
    let text = format == OutputFormat::Text;

    for event in &events {
        match bridge.handle(event) {
            BridgeOutcome::Dispatched { request, captured } if text => {
                let note = if captured { "captured".green() } else { "not captured".dimmed() };
                println!("{} {} {} ({note})", "→".cyan(), event.kind, request);
            }
            BridgeOutcome::Ignored(reason) if text => {
                println!("{} {} {}: {reason}", "✗".red(), event.kind, event.id);
            }
            BridgeOutcome::CaptureStarted(started) if text => {
                let state = if started { "started".green() } else { "already active".yellow() };
                println!("{} capture {state}", "●".bold());
            }
            BridgeOutcome::CaptureStopped(StopOutcome::Reported(report)) if !text => {
                print_json(&report)?;
            }
            BridgeOutcome::CaptureStopped(StopOutcome::NotCapturing) if text => {
                println!("{} capture not active", "●".bold());
            }
            _ => {}
        }
    }

    if args.show_requests {
        for request in hub.requests() {
            let body = serde_json::to_string(&request).context("serializing request")?;
            println!("{body}");
        }
    }
    if bridge.capture().is_capturing() {
        eprintln!(
            "{} capture still active with {} buffered document(s)",
            "!".yellow().bold(),
            bridge.capture().buffered()
        );
    }
    Ok(())
}

fn cmd_config(config: &CaptureConfig, format: OutputFormat) -> anyhow::Result<()> {
    let text = match format {
        OutputFormat::Text => toml::to_string_pretty(config).context("rendering configuration")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).context("rendering configuration")?
        }
    };
    println!("{}", text.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_config() {
        let config = CaptureConfig::default();
        let merged = apply_stop_args(
            config.clone(),
            StopArgs {
                no_merge: true,
                case_sensitive: true,
            },
        );
        assert!(!merged.stop.merge);
        assert!(merged.stop.case_sensitive);

        assert_eq!(apply_stop_args(config.clone(), StopArgs::default()), config);
    }

    #[test]
    fn config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stop]\ncase_sensitive = true").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.stop.case_sensitive);
        assert_eq!(load_config(None).unwrap(), CaptureConfig::default());
    }

    #[test]
    fn bad_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "autostart = 3").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("loading configuration"));
    }
}
