//! # Plan Picker
//!
//! One picker instance: takes commands from the host, runs them through the
//! selection state machine, re-derives the view and writes it back out (form
//! field, URL) before notifying observers.
//!
//! A command either completes fully or leaves the previous state and view in
//! place; a failed command never breaks the next one.

use crate::catalog::Catalog;
use crate::config::PickerConfig;
use crate::error::{ErrorTier, PickerError, PickerResult};
use crate::events::{dispatch_event, PickerEvent, PickerObserver};
use crate::host::{HostBindings, PageLocation, SellingPlanField, VariantSource};
use crate::ids::VariantId;
use crate::location;
use crate::money::MoneyFormatter;
use crate::selection::{Command, Selection, SelectionState};
use crate::view::PickerView;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct PlanPicker {
    config: PickerConfig,
    catalog: Arc<Catalog>,
    money: MoneyFormatter,
    state: SelectionState,
    view: PickerView,
    variant_source: Option<Box<dyn VariantSource>>,
    selling_plan_field: Box<dyn SellingPlanField>,
    location: Option<Box<dyn PageLocation>>,
    main_product: bool,
    observer: Rc<dyn PickerObserver>,
}

impl PlanPicker {
    /// Build and initialize a picker. Emits `init` on success.
    pub fn new(
        config: PickerConfig,
        catalog: Arc<Catalog>,
        mut bindings: HostBindings,
        observer: Rc<dyn PickerObserver>,
    ) -> PickerResult<Self> {
        config.validate()?;
        let key = config.key.clone();
        let selling_plan_field = bindings.take_selling_plan_field()?;
        let money = MoneyFormatter::for_code(config.currency.as_deref());

        let main_product = config.main_product
            && bindings
                .location
                .as_ref()
                .is_some_and(|l| location::is_product_page(&l.href(), catalog.handle()));

        let variant_id = initial_variant_id(&key, &catalog, bindings.variant_source.as_deref())?;
        let state = SelectionState::new(&catalog, variant_id, bindings.initial.clone())?;
        let view = PickerView::derive(&key, &catalog, &state, config.discount_format, &money)?;

        if state.available().is_empty() {
            warn!(key = %key, variant_id = %variant_id, "No available selling plan groups");
        }

        let mut picker = Self {
            config,
            catalog,
            money,
            state,
            view,
            variant_source: bindings.variant_source.take(),
            selling_plan_field,
            location: bindings.location.take(),
            main_product,
            observer,
        };
        picker.write_outputs();

        info!(key = %key, main_product, "Plan picker ready");
        dispatch_event(&*picker.observer, PickerEvent::Init, Some(&picker.view));
        Ok(picker)
    }

    pub fn key(&self) -> &str {
        &self.config.key
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn view(&self) -> &PickerView {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        self.state.selection()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_main_product(&self) -> bool {
        self.main_product
    }

    /// Run one command to completion. Emits `update` on success.
    #[instrument(skip(self), fields(key = %self.config.key))]
    pub fn dispatch(&mut self, command: Command) -> PickerResult<&PickerView> {
        match self.transition(command) {
            Ok((state, view)) => {
                self.state = state;
                self.view = view;
                self.write_outputs();
                dispatch_event(&*self.observer, PickerEvent::Update, Some(&self.view));
                Ok(&self.view)
            }
            Err(err) => {
                match err.tier() {
                    ErrorTier::Structural => warn!(error = %err, "Command skipped"),
                    _ => error!(error = %err, "Command failed"),
                }
                Err(err)
            }
        }
    }

    /// Same as the `Refresh` command: re-read the variant and re-derive
    pub fn update(&mut self) -> PickerResult<&PickerView> {
        self.dispatch(Command::Refresh)
    }

    fn transition(&self, command: Command) -> PickerResult<(SelectionState, PickerView)> {
        let command = match command {
            Command::Refresh => Command::VariantChanged {
                variant_id: self.current_variant_id()?,
            },
            other => other,
        };
        debug!(?command, "Applying command");

        let mut next = self.state.clone();
        next.apply(&self.catalog, &command)?;
        let view = PickerView::derive(
            &self.config.key,
            &self.catalog,
            &next,
            self.config.discount_format,
            &self.money,
        )?;
        Ok((next, view))
    }

    fn current_variant_id(&self) -> PickerResult<VariantId> {
        match &self.variant_source {
            Some(source) => source.current_variant_id(),
            None => Err(PickerError::VariantSource(
                "no form and no variant supplier provided".to_string(),
            )),
        }
    }

    fn write_outputs(&mut self) {
        let value = self.view.selling_plan_value();
        self.selling_plan_field.set_value(&value);

        if !self.main_product {
            return;
        }
        let Some(page) = self.location.as_mut() else {
            return;
        };
        match location::with_selling_plan(&page.href(), self.view.selling_plan_id) {
            Ok(href) if href != page.href() => page.replace_href(&href),
            Ok(_) => {}
            Err(err) => warn!(key = %self.config.key, error = %err, "Could not sync selling plan to URL"),
        }
    }
}

impl std::fmt::Debug for PlanPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanPicker")
            .field("key", &self.config.key)
            .field("selection", self.state.selection())
            .field("main_product", &self.main_product)
            .finish_non_exhaustive()
    }
}

/// Variant the picker starts on. Without a variant source the widget still
/// runs, starting on the first variant.
fn initial_variant_id(
    key: &str,
    catalog: &Catalog,
    source: Option<&dyn VariantSource>,
) -> PickerResult<VariantId> {
    match source {
        Some(source) => {
            let variant_id = source.current_variant_id()?;
            catalog.variant(variant_id)?;
            Ok(variant_id)
        }
        None => {
            warn!(
                key,
                "Failed to get variant id. No form and no variant supplier provided, using first variant"
            );
            catalog
                .variants()
                .next()
                .map(|variant| variant.id)
                .ok_or_else(|| PickerError::InvalidCatalog("product has no variants".to_string()))
        }
    }
}
