//! Reddit API client and media resolution

pub mod audio;
pub mod auth;
pub mod client;
pub mod manifest;
pub mod media;
pub mod post;

pub use audio::*;
pub use auth::*;
pub use client::*;
pub use manifest::*;
pub use media::*;
pub use post::*;
