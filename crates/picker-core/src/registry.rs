//! # Picker Registry
//!
//! Owns every picker on a page, addressed by its unique key.

use crate::catalog::Catalog;
use crate::config::PickerConfig;
use crate::error::{PickerError, PickerResult};
use crate::events::{dispatch_event, PickerEvent, PickerObserver};
use crate::host::HostBindings;
use crate::picker::PlanPicker;
use crate::selection::Command;
use crate::view::PickerView;
use std::rc::Rc;
use std::sync::Arc;
use tracing::info;

pub struct PickerRegistry {
    pickers: Vec<PlanPicker>,
    observer: Rc<dyn PickerObserver>,
}

impl PickerRegistry {
    /// Create an empty registry and announce `loaded`
    pub fn new(observer: Rc<dyn PickerObserver>) -> Self {
        dispatch_event(&*observer, PickerEvent::Loaded, None);
        Self {
            pickers: Vec::new(),
            observer,
        }
    }

    /// Build a picker and add it. Keys must be unique.
    pub fn register(
        &mut self,
        config: PickerConfig,
        catalog: Arc<Catalog>,
        bindings: HostBindings,
    ) -> PickerResult<&mut PlanPicker> {
        if self.contains(&config.key) {
            return Err(PickerError::DuplicateKey { key: config.key });
        }

        let picker = PlanPicker::new(config, catalog, bindings, Rc::clone(&self.observer))?;
        info!(key = %picker.key(), total = self.pickers.len() + 1, "Registered plan picker");
        self.pickers.push(picker);

        let index = self.pickers.len() - 1;
        Ok(&mut self.pickers[index])
    }

    /// Get a picker by key
    pub fn get(&self, key: &str) -> Option<&PlanPicker> {
        self.pickers.iter().find(|p| p.key() == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PlanPicker> {
        self.pickers.iter_mut().find(|p| p.key() == key)
    }

    /// Route a command to the picker registered under `key`
    pub fn dispatch(&mut self, key: &str, command: Command) -> PickerResult<&PickerView> {
        self.get_mut(key)
            .ok_or_else(|| PickerError::UnknownKey { key: key.to_string() })?
            .dispatch(command)
    }

    /// Remove a picker, e.g. when its section is unloaded
    pub fn remove(&mut self, key: &str) -> Option<PlanPicker> {
        let index = self.pickers.iter().position(|p| p.key() == key)?;
        Some(self.pickers.remove(index))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pickers.iter().map(|p| p.key())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanPicker> {
        self.pickers.iter()
    }

    pub fn len(&self) -> usize {
        self.pickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickers.is_empty()
    }
}

impl std::fmt::Debug for PickerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerRegistry")
            .field("pickers", &self.pickers)
            .finish_non_exhaustive()
    }
}
