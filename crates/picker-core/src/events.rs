//! # Lifecycle Notifications
//!
//! Pickers notify the embedding page when the module loads, when an instance
//! finishes its first derivation, and after every update.

use crate::view::PickerView;
use serde::Serialize;
use tracing::{debug, info};

/// Notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerEvent {
    /// Module available, once per page
    Loaded,
    /// Instance initialized, once per instance
    Init,
    /// Instance re-derived after a command
    Update,
}

impl PickerEvent {
    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            PickerEvent::Loaded => "plan-picker:loaded",
            PickerEvent::Init => "plan-picker:init",
            PickerEvent::Update => "plan-picker:update",
        }
    }
}

impl std::fmt::Display for PickerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives picker notifications.
///
/// Default methods only log; hosts override what they forward.
#[allow(unused_variables)]
pub trait PickerObserver {
    fn on_loaded(&self) {
        info!("Plan picker loaded");
    }

    fn on_init(&self, view: &PickerView) {
        info!(
            key = %view.key,
            variant_id = %view.variant_id,
            groups = view.groups.len(),
            "Plan picker initialized"
        );
    }

    fn on_update(&self, view: &PickerView) {
        debug!(
            key = %view.key,
            variant_id = %view.variant_id,
            selling_plan = %view.selling_plan_value(),
            "Plan picker updated"
        );
    }
}

/// Observer that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl PickerObserver for LoggingObserver {}

/// Route an event to the matching observer method
pub fn dispatch_event(observer: &dyn PickerObserver, event: PickerEvent, view: Option<&PickerView>) {
    match (event, view) {
        (PickerEvent::Loaded, _) => observer.on_loaded(),
        (PickerEvent::Init, Some(view)) => observer.on_init(view),
        (PickerEvent::Update, Some(view)) => observer.on_update(view),
        (event, None) => debug!(%event, "Dropping event without a view"),
    }
}
