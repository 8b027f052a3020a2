use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use std::env;

use crate::models::capture::CaptureSource;

/// Which kind of host the gallery runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HostKind {
    /// Native host that can address files by URI.
    Native,
    /// Browser host that needs image data inlined.
    Web,
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: String,
    pub database_url: String,
    pub host: HostKind,
    pub display_origin: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Photo gallery state and persistence")]
pub struct Args {
    /// Directory holding photo payloads (overrides GALLERY_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Metadata database URL (overrides GALLERY_DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Host kind (overrides GALLERY_HOST)
    #[arg(long, value_enum, global = true)]
    pub host: Option<HostKind>,

    /// Origin used to rewrite file URIs on native hosts (overrides GALLERY_DISPLAY_ORIGIN)
    #[arg(long, global = true)]
    pub display_origin: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Capture an image file or URL into the gallery
    Take {
        /// Path or http(s) URL of the image
        image: String,
        #[arg(long, value_enum, default_value = "camera")]
        source: CaptureSource,
    },
    /// List the gallery, newest first
    List {
        /// Print the collection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a photo by locator
    Delete { locator: String },
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the command to run.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        // --- Environment fallback ---
        let env_data = env::var("GALLERY_DATA_DIR").unwrap_or_else(|_| "./data/photos".into());
        let env_db = env::var("GALLERY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/gallery.db?mode=rwc".into());
        let env_host = match env::var("GALLERY_HOST") {
            Ok(value) => HostKind::from_str(&value, true)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("parsing GALLERY_HOST value `{}`", value))?,
            Err(env::VarError::NotPresent) => HostKind::Native,
            Err(err) => return Err(err).context("reading GALLERY_HOST"),
        };
        let env_origin =
            env::var("GALLERY_DISPLAY_ORIGIN").unwrap_or_else(|_| "http://localhost".into());

        // --- Merge ---
        let cfg = Self {
            data_dir: args.data_dir.unwrap_or(env_data),
            database_url: args.database_url.unwrap_or(env_db),
            host: args.host.unwrap_or(env_host),
            display_origin: args.display_origin.unwrap_or(env_origin),
        };

        Ok((cfg, args.command))
    }

    pub fn is_native(&self) -> bool {
        self.host == HostKind::Native
    }
}
