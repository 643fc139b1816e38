//! # picker-cli
//!
//! Headless host for plan-picker-rs.
//!
//! This crate provides:
//! - `CliConfig`, file locations and options read from the environment
//! - `Session`, one picker bound to in-memory form fields and page location
//! - Replay of JSON-lines command scripts, printing a view per command
//!
//! ## Environment
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `PICKER_PRODUCT` | Product JSON file (default `config/product.json`) |
//! | `PICKER_CONFIG` | Picker TOML file (default key `main`, percent badges) |
//! | `PICKER_SCRIPT` | Command script (default stdin) |
//! | `PICKER_PAGE_URL` | Page URL for `selling_plan` sync |
//! | `PICKER_VARIANT` | Initial value of the form's variant id |
//! | `LOG_FORMAT` | `json` for JSON log lines |

pub mod config;
pub mod session;

pub use config::CliConfig;
pub use session::{ReplaySummary, Session};
