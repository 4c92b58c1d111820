//! Utility functions for rrd

pub mod filename;
pub mod url;

pub use filename::{output_filename, to_safe_title};
pub use url::{extract_post_id, is_reddit_url, public_json_endpoint};
