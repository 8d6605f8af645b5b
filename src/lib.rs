//! # Botdeck (library root)
//!
//! This crate provides the core plumbing for the **botdeck** CLI and library:
//! - The dashboard REST API client with centralized bearer authorization
//!   and 401 handling (`api`).
//! - The persisted login credential and cached profile (`auth`).
//! - CLI parsing & commands (`commands`), configuration (`config`).
//! - The optimistic chat log, interactive mode, and typing reveal
//!   (`chat`, `reveal`).
//! - Knowledge-file intake screening (`knowledge`) and the wire models
//!   (`models`).
//!
//! In addition, this module exposes [`config_dir`], the per-platform
//! configuration directory where both the `config.yaml` and the credential
//! files live.
//!
//! ## Modules
//! - [`api`], [`auth`], [`chat`], [`commands`], [`config`], [`error`],
//!   [`knowledge`], [`models`], [`reveal`]

use directories::ProjectDirs;
use std::error::Error;

pub mod api;
pub mod auth;
pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod models;
pub mod reveal;

/// Return the per-platform configuration directory used by botdeck.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "awful-sec", "botdeck")`, so you get the right place on each OS
/// (e.g., `~/Library/Application Support/com.awful-sec.botdeck` on macOS).
///
/// The directory is **not** created by this function; callers that need it
/// should create it with `fs::create_dir_all` (the credential store does).
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be
/// determined (which is rare but possible in heavily sandboxed environments).
///
/// # Examples
/// ```rust
/// let cfg = botdeck::config_dir().expect("has a config dir");
/// println!("config at {}", cfg.display());
/// ```
pub fn config_dir() -> Result<std::path::PathBuf, Box<dyn Error>> {
    let proj_dirs = ProjectDirs::from("com", "awful-sec", "botdeck")
        .ok_or("Unable to determine config directory")?;
    let config_dir = proj_dirs.config_dir().to_path_buf();

    Ok(config_dir)
}
