//! Main entry point for the rrd CLI

use anyhow::Result;
use clap::Parser;
use rrd::cli::args::Args;
use rrd::cli::output::OutputFormatter;
use rrd::core::{DownloadOptions, RedditDownloader};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let mut formatter = OutputFormatter::new(args.quiet || args.json);

    let mut options = DownloadOptions::default()
        .with_base_dir(&args.out)
        .with_request_timeout(args.timeout_duration())
        .with_merge_timeout(args.merge_timeout_duration())
        .with_ffmpeg_binary(&args.ffmpeg);
    if let Some(oauth) = args.oauth_config() {
        options = options.with_oauth(oauth);
    }
    let downloader = RedditDownloader::new(options);

    if args.check_auth {
        return check_auth(&downloader, &formatter).await;
    }

    // clap guarantees the URL is present past this point
    let url = args.url.clone().unwrap_or_default();
    info!("Starting download for {}", url);

    // Ctrl-C aborts in-flight downloads and lets temp cleanup run
    let cancel = downloader.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let start = Instant::now();
    formatter.info(&format!("Fetching {}", url));
    formatter.start_progress("Downloading...");
    let result = downloader.download(&url).await;
    formatter.finish_progress();

    match result {
        Ok(video_info) => {
            formatter.success(&format!("Done in {:.1?}", start.elapsed()));
            formatter.print_video_info(&video_info);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&video_info)?);
            }
            Ok(())
        }
        Err(e) => {
            formatter.error(&format!("Download failed: {}", e));
            std::process::exit(1);
        }
    }
}

async fn check_auth(downloader: &RedditDownloader, formatter: &OutputFormatter) -> Result<()> {
    let auth = downloader.token_manager();
    if !auth.is_configured() {
        formatter.error("No OAuth credentials configured");
        std::process::exit(1);
    }
    if auth.verify().await? {
        formatter.success("Credentials OK");
        Ok(())
    } else {
        formatter.error("Credentials rejected by Reddit");
        std::process::exit(1);
    }
}

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}
