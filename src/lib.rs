pub mod cli;
pub mod config;
pub mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::AnalyzerConfig;
use crate::pipeline::analysis::{AnalysisOutcome, Analyzer, GeminiClient, OutcomeKind};
use crate::pipeline::preparation::prepare_file;

/// Exit status per outcome: 0 when something displayable came back from the
/// analysis path, 1 for fatal service or setup errors.
pub fn exit_code_for(outcome: &AnalysisOutcome) -> u8 {
    match outcome.kind {
        OutcomeKind::Success | OutcomeKind::Blocked | OutcomeKind::Fallback => 0,
        OutcomeKind::FatalError(_) => 1,
    }
}

/// Binary entry point.
pub fn run() -> ExitCode {
    // Optional .env next to the working directory
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only the result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let mut config = match AnalyzerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };
    if let Some(lang) = cli.lang {
        config.language = lang.into();
    }
    tracing::info!(
        model = %config.model,
        lang = config.language.code(),
        max_attempts = config.retry.max_attempts(),
        "Configuration loaded"
    );

    let request = match prepare_file(&cli.file, cli.modality.map(Into::into)) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, file = %cli.file.display(), "Report preparation failed");
            eprintln!("{}", e.user_message(config.language));
            return ExitCode::from(2);
        }
    };

    let client = match GeminiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build inference client");
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    let analyzer = Analyzer::new(Box::new(client), config);
    let outcome = analyzer.analyze(&request);

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "Cannot serialize outcome");
                println!("{}", outcome.body);
            }
        }
    } else {
        println!("{}", outcome.body);
    }

    ExitCode::from(exit_code_for(&outcome))
}
