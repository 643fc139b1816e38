//! # Replay Session
//!
//! One picker bound to in-memory host inputs. Scripts are JSON lines, one
//! command per line; blank lines and `#` comments are skipped:
//!
//! ```text
//! # subscribe, then switch to the 1kg bag
//! {"type": "group_selected", "group_id": "deliver"}
//! {"type": "variant_changed", "variant_id": 12}
//! ```
//!
//! Every processed line yields one JSON line on the output, either
//! `{"line": n, "view": {...}}` or `{"line": n, "error": "..."}`.

use picker_core::{
    selling_plan_param, Catalog, Command, FormField, HostBindings, InitialSelection,
    LoggingObserver, MemoryLocation, PickerConfig, PickerRegistry, PickerView,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub failed: usize,
}

#[derive(Serialize)]
struct Output<'a> {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<&'a PickerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// A picker running against in-memory form fields
pub struct Session {
    registry: PickerRegistry,
    key: String,
    selling_plan: FormField,
    location: Option<MemoryLocation>,
}

impl Session {
    pub fn new(
        catalog: Catalog,
        config: PickerConfig,
        variant_id: Option<&str>,
        page_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        let key = config.key.clone();
        let selling_plan = FormField::default();
        let mut bindings = HostBindings::new().with_selling_plan_field(selling_plan.clone());

        if let Some(variant_id) = variant_id {
            bindings = bindings.with_variant_source(FormField::new(variant_id));
        }

        let location = page_url.map(MemoryLocation::new);
        if let Some(location) = &location {
            let initial = match selling_plan_param(&location.get()) {
                Ok(plan) => plan.map(InitialSelection::SellingPlan).unwrap_or_default(),
                Err(e) => {
                    warn!(error = %e, "Ignoring selling_plan URL parameter");
                    InitialSelection::OneTime
                }
            };
            bindings = bindings
                .with_initial_selection(initial)
                .with_location(location.clone());
        }

        let mut registry = PickerRegistry::new(Rc::new(LoggingObserver));
        registry
            .register(config, Arc::new(catalog), bindings)
            .map_err(|e| anyhow::anyhow!("Failed to initialize picker '{}': {}", key, e))?;

        Ok(Self {
            registry,
            key,
            selling_plan,
            location,
        })
    }

    pub fn view(&self) -> anyhow::Result<&PickerView> {
        self.registry
            .get(&self.key)
            .map(|picker| picker.view())
            .ok_or_else(|| anyhow::anyhow!("Picker '{}' is not registered", self.key))
    }

    /// Current `selling_plan` form value
    pub fn selling_plan(&self) -> String {
        self.selling_plan.get()
    }

    /// Current page URL, if the session has one
    pub fn page_url(&self) -> Option<String> {
        self.location.as_ref().map(MemoryLocation::get)
    }

    /// Write the current view as line 0
    pub fn write_initial<W: Write>(&self, mut out: W) -> anyhow::Result<()> {
        let output = Output {
            line: 0,
            view: Some(self.view()?),
            error: None,
        };
        writeln!(out, "{}", serde_json::to_string(&output)?)?;
        Ok(())
    }

    /// Apply every command of `script`, writing one output line per command
    pub fn replay<R: BufRead, W: Write>(&mut self, script: R, mut out: W) -> anyhow::Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();

        for (index, line) in script.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let result = match serde_json::from_str::<Command>(trimmed) {
                Ok(command) => {
                    debug!(line = line_no, ?command, "Replaying command");
                    self.registry
                        .dispatch(&self.key, command)
                        .map_err(|e| e.to_string())
                }
                Err(e) => Err(format!("Invalid command: {}", e)),
            };

            let output = match result {
                Ok(view) => {
                    summary.applied += 1;
                    Output {
                        line: line_no,
                        view: Some(view),
                        error: None,
                    }
                }
                Err(error) => {
                    summary.failed += 1;
                    warn!(line = line_no, %error, "Command rejected");
                    Output {
                        line: line_no,
                        view: None,
                        error: Some(error),
                    }
                }
            };
            writeln!(out, "{}", serde_json::to_string(&output)?)?;
        }

        out.flush()?;
        Ok(summary)
    }
}
