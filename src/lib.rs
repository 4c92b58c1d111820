//! # rrd - Rust Reddit Downloader
//!
//! Resolves a Reddit post URL into a local video file with audio merged in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rrd::core::{DownloadOptions, RedditDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = RedditDownloader::new(DownloadOptions::default());
//!     let info = downloader
//!         .download("https://www.reddit.com/r/videos/comments/abc123/title/")
//!         .await?;
//!     println!("Saved: {:?}", info.file_path);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod download;
pub mod error;
pub mod platform;
pub mod utils;

// Re-export main types
pub use core::{DownloadOptions, RedditDownloader, VideoInfo};
pub use error::RrdError;

/// Result type alias for rrd operations
pub type Result<T> = std::result::Result<T, RrdError>;
