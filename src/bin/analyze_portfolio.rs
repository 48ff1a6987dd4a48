use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use portfolio_dashboard_lib::{http_controller, telemetry, DashboardConfig, UploadedFile};

/// Run one portfolio file through preview, analysis and (optionally) the
/// report email against the configured backend.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Portfolio file (CSV or XLSX)
    file: PathBuf,

    /// Email the result to the configured recipient
    #[arg(long)]
    notify: bool,

    /// Backend base URL, overrides DASHBOARD_API_URL
    #[arg(long, env = "DASHBOARD_API_URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();

    let mut config = DashboardConfig::from_env()?;
    if let Some(url) = args.api_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "portfolio.csv".to_string());

    let controller = http_controller(&config);

    if !controller.check_connection().await {
        println!("⚠️  Unable to connect to AI Analysis API at {}", config.base_url);
    }

    controller.select_file(UploadedFile::new(name, bytes));
    let preview = controller.preview();
    println!("📂 Preview: {} row(s)", preview.len());
    for row in preview.iter().take(5) {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|(h, v)| format!("{}={}", h, v.as_deref().unwrap_or("")))
            .collect();
        println!("   {}", cells.join(", "));
    }

    if let Err(e) = controller.submit().await {
        let message = controller.error().unwrap_or_else(|| e.to_string());
        anyhow::bail!("{} ({})", message, e);
    }

    let outcome = controller
        .outcome()
        .context("Analysis finished without a result")?;

    println!("\n{:<12} {}", "Total:", outcome.totals.total);
    println!("{:<12} {}", "Buy:", outcome.totals.buy);
    println!("{:<12} {}", "Hold:", outcome.totals.hold);
    println!("{:<12} {}", "Sell:", outcome.totals.sell);
    println!("{:<12} {}", "Confidence:", outcome.confidence.with_unit());
    println!("\n{}", outcome.mood_message());
    println!("\n🤖 {}", outcome.ai_summary());

    if args.notify {
        match controller.notify().await {
            Ok(_) => println!("\n📧 Report emailed to {}.", config.report_recipient),
            Err(e) => eprintln!("\n{} ({})", controller.error().unwrap_or_default(), e),
        }
    }

    Ok(())
}
