use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tenderwatch_app::{init_tracing, run_pipeline, Cli, EXIT_SCRAPE_FAILED, EXIT_STARTUP};
use tenderwatch_browser::{BrowserEngine, LaunchOptions};
use tenderwatch_core::AppConfig;
use tenderwatch_mail::{Delivery, Notifier, SmtpNotifier};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting tenderwatch v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_STARTUP)
        }
    }
}

/// Startup failures are returned as errors; the pipeline's own outcome is
/// mapped to an exit code.
async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config =
        AppConfig::load_with_env(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(report) = cli.report {
        config.output.report_path = report;
    }
    config.validate().context("invalid configuration")?;

    let notifier = build_notifier(&config, cli.no_notify);

    let options = LaunchOptions {
        headless: config.browser.headless,
        window_width: config.browser.window_width,
        window_height: config.browser.window_height,
        user_agent: config.browser.user_agent.clone(),
        page_load_timeout: config.browser.page_load_timeout(),
        extra_args: config.browser.extra_args.clone(),
        ..LaunchOptions::new(&config.output.download_dir)
    };
    let engine = BrowserEngine::launch(options)
        .await
        .context("failed to launch browser")?;

    let outcome = run_pipeline(
        &engine,
        &config,
        notifier.as_ref().map(|n| n as &dyn Notifier),
    )
    .await;

    if let Err(e) = engine.close().await {
        warn!("Browser did not shut down cleanly: {}", e);
    }

    Ok(match outcome {
        Ok(outcome) => {
            info!(
                "Run complete: report {}, notification {}",
                if outcome.report_written { "written" } else { "missing" },
                if outcome.notified { "sent" } else { "not sent" }
            );
            outcome.exit_code()
        }
        Err(_) => EXIT_SCRAPE_FAILED,
    })
}

fn build_notifier(config: &AppConfig, no_notify: bool) -> Option<SmtpNotifier> {
    if no_notify || !config.notification.enabled {
        info!("Notification delivery disabled");
        return None;
    }

    match Delivery::from_config(&config.notification) {
        Ok(delivery) => Some(SmtpNotifier::new(delivery)),
        Err(e) => {
            warn!("Notification delivery disabled: {}", e);
            None
        }
    }
}
