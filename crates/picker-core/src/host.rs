//! # Host Capabilities
//!
//! What the embedding page lends a picker: where the current variant comes
//! from, the `selling_plan` form field to write, and the page location for
//! URL sync. Hosts implement these traits over their own platform (DOM,
//! headless script, tests).

use crate::error::{PickerError, PickerResult};
use crate::ids::VariantId;
use crate::selection::InitialSelection;
use std::cell::RefCell;
use std::rc::Rc;

/// Supplies the currently selected variant id
pub trait VariantSource {
    fn current_variant_id(&self) -> PickerResult<VariantId>;
}

/// Overrides: any closure returning a variant id is a variant source
impl<F> VariantSource for F
where
    F: Fn() -> PickerResult<VariantId>,
{
    fn current_variant_id(&self) -> PickerResult<VariantId> {
        self()
    }
}

/// The form field carrying the selected selling plan id
pub trait SellingPlanField {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
}

/// The page location, updated without navigating
pub trait PageLocation {
    fn href(&self) -> String;
    fn replace_href(&mut self, href: &str);
}

/// A shared, host-owned form field value.
///
/// Cloning yields another handle to the same value, so the host keeps one
/// handle and gives the other to the picker.
#[derive(Debug, Clone, Default)]
pub struct FormField {
    value: Rc<RefCell<String>>,
}

impl FormField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Rc::new(RefCell::new(value.into())),
        }
    }

    pub fn get(&self) -> String {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: impl Into<String>) {
        *self.value.borrow_mut() = value.into();
    }
}

/// Default variant source: the product form's `id` field
impl VariantSource for FormField {
    fn current_variant_id(&self) -> PickerResult<VariantId> {
        VariantId::parse(&self.get())
    }
}

impl SellingPlanField for FormField {
    fn value(&self) -> String {
        self.get()
    }

    fn set_value(&mut self, value: &str) {
        self.set(value);
    }
}

/// In-memory location for headless hosts and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    href: Rc<RefCell<String>>,
    replacements: Rc<RefCell<usize>>,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Rc::new(RefCell::new(href.into())),
            replacements: Rc::default(),
        }
    }

    pub fn get(&self) -> String {
        self.href.borrow().clone()
    }

    /// Number of history replacements so far
    pub fn replacements(&self) -> usize {
        *self.replacements.borrow()
    }
}

impl PageLocation for MemoryLocation {
    fn href(&self) -> String {
        self.get()
    }

    fn replace_href(&mut self, href: &str) {
        *self.href.borrow_mut() = href.to_string();
        *self.replacements.borrow_mut() += 1;
    }
}

/// Everything a picker borrows from its host
#[derive(Default)]
pub struct HostBindings {
    pub(crate) variant_source: Option<Box<dyn VariantSource>>,
    pub(crate) selling_plan_fields: Vec<Box<dyn SellingPlanField>>,
    pub(crate) location: Option<Box<dyn PageLocation>>,
    pub(crate) initial: InitialSelection,
}

impl HostBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: where the current variant id comes from
    pub fn with_variant_source(mut self, source: impl VariantSource + 'static) -> Self {
        self.variant_source = Some(Box::new(source));
        self
    }

    /// Builder: add a `selling_plan` field (the first one added wins)
    pub fn with_selling_plan_field(mut self, field: impl SellingPlanField + 'static) -> Self {
        self.selling_plan_fields.push(Box::new(field));
        self
    }

    /// Builder: page location used for `selling_plan` URL sync
    pub fn with_location(mut self, location: impl PageLocation + 'static) -> Self {
        self.location = Some(Box::new(location));
        self
    }

    /// Builder: selection already present on the page
    pub fn with_initial_selection(mut self, initial: InitialSelection) -> Self {
        self.initial = initial;
        self
    }

    pub(crate) fn take_selling_plan_field(&mut self) -> PickerResult<Box<dyn SellingPlanField>> {
        if self.selling_plan_fields.is_empty() {
            return Err(PickerError::Configuration(
                "No selling plan input element found".to_string(),
            ));
        }
        if self.selling_plan_fields.len() > 1 {
            tracing::warn!(
                count = self.selling_plan_fields.len(),
                "More than 1 selling plan input element found, using the first"
            );
        }
        Ok(self.selling_plan_fields.remove(0))
    }
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings")
            .field("variant_source", &self.variant_source.is_some())
            .field("selling_plan_fields", &self.selling_plan_fields.len())
            .field("location", &self.location.is_some())
            .field("initial", &self.initial)
            .finish()
    }
}
