//! # picker-wasm
//!
//! WebAssembly bindings for plan-picker-rs.
//!
//! This crate lets a storefront theme drive pickers from the browser:
//! - Registering a picker per product form (main product, quick-add, ...)
//! - Forwarding page events as commands
//! - Reading the derived view back for rendering
//!
//! Notifications are dispatched on `document` as `plan-picker:loaded`,
//! `plan-picker:init` and `plan-picker:update` custom events carrying the
//! view in `detail`.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmPickerRegistry } from 'plan-picker-wasm';
//!
//! await init();
//!
//! const pickers = new WasmPickerRegistry();
//! pickers.register('main', productJson, 'percent', { main_product: true, variant_id: '11' });
//!
//! radio.addEventListener('change', () => {
//!   const view = pickers.dispatch('main', { type: 'group_selected', group_id: radio.value });
//!   price.textContent = view.external_price;
//! });
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/picker-wasm --target web
//! ```

use picker_core::{
    selling_plan_param, Catalog, Command, FormField, HostBindings, InitialSelection, PageLocation,
    PickerConfig, PickerError, PickerEvent, PickerObserver, PickerRegistry, PickerResult,
    PickerView, VariantId, VariantSource,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit};

pub mod console;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Picker warnings and lookup errors go to the browser console
    console::init(tracing::Level::INFO);
}

/// Per-picker options passed to `register`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterOptions {
    /// Shop's active currency (ISO 4217)
    pub currency: Option<String>,
    /// Picker sits in the page's main product form
    pub main_product: bool,
    /// Initial value of the product form's `id` field
    pub variant_id: Option<String>,
}

impl RegisterOptions {
    fn from_js(options: JsValue) -> Result<Self, JsValue> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid picker options: {}", e)))
    }
}

/// Build the picker config from `register` arguments
fn picker_config(key: &str, discount_format: &str, options: &RegisterOptions) -> PickerResult<PickerConfig> {
    let mut config = PickerConfig::from_attributes(key, discount_format)?;
    if let Some(currency) = &options.currency {
        config = config.with_currency(currency.clone());
    }
    if options.main_product {
        config = config.as_main_product();
    }
    Ok(config)
}

/// Selection encoded in the page URL's `selling_plan` parameter
fn initial_selection(href: Option<&str>) -> InitialSelection {
    let Some(href) = href else {
        return InitialSelection::OneTime;
    };
    match selling_plan_param(href) {
        Ok(Some(plan_id)) => InitialSelection::SellingPlan(plan_id),
        Ok(None) => InitialSelection::OneTime,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring selling_plan URL parameter");
            InitialSelection::OneTime
        }
    }
}

fn to_js_error(err: PickerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Variant supplier function provided by the theme
struct JsVariantSupplier {
    supplier: js_sys::Function,
}

impl VariantSource for JsVariantSupplier {
    fn current_variant_id(&self) -> PickerResult<VariantId> {
        let value = self
            .supplier
            .call0(&JsValue::NULL)
            .map_err(|e| PickerError::VariantSource(format!("variant supplier threw {:?}", e)))?;

        if let Some(number) = value.as_f64() {
            return VariantId::from_f64(number);
        }
        match value.as_string() {
            Some(raw) => VariantId::parse(&raw),
            None => Err(PickerError::InvalidId {
                kind: "variant",
                value: format!("{:?}", value),
            }),
        }
    }
}

/// `window.location`, updated through `history.replaceState`
struct BrowserLocation {
    window: web_sys::Window,
}

impl BrowserLocation {
    fn current() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

impl PageLocation for BrowserLocation {
    fn href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn replace_href(&mut self, href: &str) {
        let replaced = self
            .window
            .history()
            .and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(href)));
        if let Err(e) = replaced {
            tracing::warn!(href, error = ?e, "Could not sync selling plan to URL");
        }
    }
}

/// Re-dispatches notifications as DOM custom events
struct DomObserver;

impl DomObserver {
    fn emit(&self, event: PickerEvent, view: Option<&PickerView>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let init = CustomEventInit::new();
        if let Some(view) = view {
            match to_js(view) {
                Ok(detail) => init.set_detail(&detail),
                Err(e) => tracing::error!(%event, error = ?e, "Could not serialize picker view"),
            }
        }

        let dispatched = CustomEvent::new_with_event_init_dict(event.name(), &init)
            .and_then(|custom| document.dispatch_event(&custom));
        if let Err(e) = dispatched {
            tracing::error!(%event, error = ?e, "Could not dispatch picker event");
        }
    }
}

impl PickerObserver for DomObserver {
    fn on_loaded(&self) {
        self.emit(PickerEvent::Loaded, None);
    }

    fn on_init(&self, view: &PickerView) {
        self.emit(PickerEvent::Init, Some(view));
    }

    fn on_update(&self, view: &PickerView) {
        self.emit(PickerEvent::Update, Some(view));
    }
}

/// Host-side handles of one registered picker
struct PickerInputs {
    variant: Option<FormField>,
    selling_plan: FormField,
}

/// All plan pickers on the page
#[wasm_bindgen]
pub struct WasmPickerRegistry {
    registry: PickerRegistry,
    inputs: HashMap<String, PickerInputs>,
}

#[wasm_bindgen]
impl WasmPickerRegistry {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            registry: PickerRegistry::new(Rc::new(DomObserver)),
            inputs: HashMap::new(),
        }
    }

    /// Register a picker and return its initial view.
    ///
    /// `variant_supplier` overrides the `variant_id` option as the source of
    /// the current variant.
    #[wasm_bindgen]
    pub fn register(
        &mut self,
        key: &str,
        product_json: &str,
        discount_format: &str,
        options: JsValue,
        variant_supplier: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let options = RegisterOptions::from_js(options)?;
        let config = picker_config(key, discount_format, &options).map_err(to_js_error)?;
        let catalog = Catalog::from_json(product_json).map_err(to_js_error)?;

        let selling_plan = FormField::default();
        let mut variant = None;
        let mut bindings = HostBindings::new().with_selling_plan_field(selling_plan.clone());

        match (variant_supplier, &options.variant_id) {
            (Some(supplier), _) => {
                bindings = bindings.with_variant_source(JsVariantSupplier { supplier });
            }
            (None, Some(raw)) => {
                let field = FormField::new(raw.clone());
                bindings = bindings.with_variant_source(field.clone());
                variant = Some(field);
            }
            (None, None) => {}
        }

        if let Some(location) = BrowserLocation::current() {
            let href = location.href();
            bindings = bindings
                .with_initial_selection(initial_selection(Some(&href)))
                .with_location(location);
        }

        let picker = self
            .registry
            .register(config, Arc::new(catalog), bindings)
            .map_err(to_js_error)?;
        let view = to_js(picker.view())?;

        self.inputs.insert(
            key.to_string(),
            PickerInputs {
                variant,
                selling_plan,
            },
        );
        Ok(view)
    }

    /// Apply a command (`{ type: "group_selected", group_id: "..." }`) and
    /// return the new view
    #[wasm_bindgen]
    pub fn dispatch(&mut self, key: &str, command: JsValue) -> Result<JsValue, JsValue> {
        let command: Command = serde_wasm_bindgen::from_value(command)
            .map_err(|e| JsValue::from_str(&format!("Invalid command: {}", e)))?;
        self.dispatch_command(key, command)
    }

    /// Set the product form's variant id and re-derive
    #[wasm_bindgen]
    pub fn set_variant(&mut self, key: &str, variant_id: &str) -> Result<JsValue, JsValue> {
        match self.inputs.get(key).and_then(|inputs| inputs.variant.as_ref()) {
            Some(field) => field.set(variant_id),
            None => {
                let variant_id = VariantId::parse(variant_id).map_err(to_js_error)?;
                return self.dispatch_command(key, Command::VariantChanged { variant_id });
            }
        }
        self.update(key)
    }

    /// Re-read the current variant and re-derive
    #[wasm_bindgen]
    pub fn update(&mut self, key: &str) -> Result<JsValue, JsValue> {
        self.dispatch_command(key, Command::Refresh)
    }

    /// Current view of a picker
    #[wasm_bindgen]
    pub fn view(&self, key: &str) -> Result<JsValue, JsValue> {
        let picker = self
            .registry
            .get(key)
            .ok_or_else(|| to_js_error(PickerError::UnknownKey { key: key.to_string() }))?;
        to_js(picker.view())
    }

    /// Value the picker wrote to its `selling_plan` field
    #[wasm_bindgen]
    pub fn selling_plan(&self, key: &str) -> Option<String> {
        self.inputs.get(key).map(|inputs| inputs.selling_plan.get())
    }

    /// Drop a picker (e.g. a closed quick-add modal)
    #[wasm_bindgen]
    pub fn remove(&mut self, key: &str) -> bool {
        self.inputs.remove(key);
        self.registry.remove(key).is_some()
    }

    /// Registered keys in registration order
    #[wasm_bindgen]
    pub fn keys(&self) -> js_sys::Array {
        self.registry.keys().map(JsValue::from_str).collect()
    }

    fn dispatch_command(&mut self, key: &str, command: Command) -> Result<JsValue, JsValue> {
        let view = self.registry.dispatch(key, command).map_err(to_js_error)?;
        to_js(view)
    }
}

impl Default for WasmPickerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use picker_core::{DiscountFormat, SellingPlanId};

    #[test]
    fn test_register_options_defaults() {
        let options: RegisterOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.main_product);
        assert_eq!(options.currency, None);

        let options: RegisterOptions =
            serde_json::from_str(r#"{"currency": "EUR", "main_product": true, "variant_id": "11"}"#).unwrap();
        assert_eq!(options.variant_id.as_deref(), Some("11"));
    }

    #[test]
    fn test_picker_config() {
        let options = RegisterOptions {
            currency: Some("GBP".to_string()),
            main_product: true,
            variant_id: None,
        };
        let config = picker_config("main", "absolute", &options).unwrap();

        assert_eq!(config.discount_format, DiscountFormat::Absolute);
        assert_eq!(config.currency.as_deref(), Some("GBP"));
        assert!(config.main_product);

        assert!(picker_config("main", "percentage", &options).is_err());
        assert!(picker_config("", "percent", &options).is_err());
    }

    #[test]
    fn test_initial_selection_from_url() {
        assert_eq!(
            initial_selection(Some("https://shop.test/products/tea?selling_plan=42")),
            InitialSelection::SellingPlan(SellingPlanId(42))
        );
        assert_eq!(
            initial_selection(Some("https://shop.test/products/tea?selling_plan=x")),
            InitialSelection::OneTime
        );
        assert_eq!(initial_selection(None), InitialSelection::OneTime);
    }
}
