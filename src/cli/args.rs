//! Command line argument parsing

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// RRD - Rust Reddit Downloader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Reddit post URL (comments page or redd.it short link)
    #[arg(required_unless_present = "check_auth")]
    pub url: Option<String>,

    /// Base directory for the files/ and temp/ subdirectories
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Reddit OAuth application client ID
    #[arg(long, env = "REDDIT_CLIENT_ID", value_name = "ID")]
    pub client_id: Option<String>,

    /// Reddit OAuth application client secret
    #[arg(long, env = "REDDIT_CLIENT_SECRET", value_name = "SECRET")]
    pub client_secret: Option<String>,

    /// Reddit account username (switches to the password grant)
    #[arg(long, env = "REDDIT_USERNAME", value_name = "USER")]
    pub username: Option<String>,

    /// Reddit account password
    #[arg(long, env = "REDDIT_PASSWORD", value_name = "PASS")]
    pub password: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "30")]
    pub timeout: u64,

    /// ffmpeg merge timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "300")]
    pub merge_timeout: u64,

    /// ffmpeg binary to invoke
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// Print the result record as JSON instead of human-readable output
    #[arg(long)]
    pub json: bool,

    /// Verify the configured OAuth credentials and exit
    #[arg(long)]
    pub check_auth: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn merge_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.merge_timeout)
    }

    /// Build the OAuth config when enough credentials were supplied
    pub fn oauth_config(&self) -> Option<crate::platform::auth::OauthConfig> {
        let client_id = self.client_id.clone()?;
        let client_secret = self.client_secret.clone()?;
        Some(crate::platform::auth::OauthConfig {
            client_id,
            client_secret,
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}
