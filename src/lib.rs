#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod archive;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod fetch;
pub mod html;
pub mod manifest;
pub mod models;
pub mod packer;
pub mod resources;

pub use archive::AppArchive;
pub use config::PackerConfig;
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use models::{AppRequest, PackedApp, ResourceEntry};
pub use packer::{OfflinePacker, ProcessedArchive};
