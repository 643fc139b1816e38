//! # Plan Picker
//!
//! Headless selling plan picker: loads a product, replays picker commands and
//! prints the derived view after each one.
//!
//! ## Usage
//!
//! ```bash
//! # Point at the product and an optional picker config
//! export PICKER_PRODUCT=config/product.json
//! export PICKER_CONFIG=config/picker.toml
//! export PICKER_VARIANT=40000000001
//!
//! # Replay commands from stdin
//! echo '{"type": "group_selected", "group_id": "g1"}' | plan-picker
//! ```

use picker_cli::{CliConfig, Session};
use std::fs::File;
use std::io::{self, BufReader};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::from_env();

    // Initialize logging; stdout carries the views
    tracing_subscriber::registry()
        .with(config.log_json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!config.log_json).then(|| fmt::layer().with_writer(io::stderr)))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let catalog = config.load_catalog()?;
    let picker_config = config.load_picker_config()?;
    info!("Picker key: {}", picker_config.key);
    info!("Discount format: {}", picker_config.discount_format);

    let mut session = Session::new(
        catalog,
        picker_config,
        config.variant_id.as_deref(),
        config.page_url.as_deref(),
    )?;

    let stdout = io::stdout();
    session.write_initial(stdout.lock())?;

    let summary = match &config.script_path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;
            session.replay(BufReader::new(file), stdout.lock())?
        }
        None => session.replay(io::stdin().lock(), stdout.lock())?,
    };

    info!(
        applied = summary.applied,
        failed = summary.failed,
        "Replay finished"
    );
    if let Some(url) = session.page_url() {
        info!("Page URL: {}", url);
    }

    Ok(())
}

fn print_banner() {
    eprintln!(
        r#"
  Plan Picker RS
  ━━━━━━━━━━━━━━━━━━━━━━━
  Selling plan picker replay
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
