//! Core download pipeline

pub mod downloader;
pub mod session;
pub mod video_info;

pub use downloader::*;
pub use session::*;
pub use video_info::*;
