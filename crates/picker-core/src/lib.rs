//! # picker-core
//!
//! Selling plan picker for storefront product pages.
//!
//! This crate provides:
//! - `Catalog` for the product snapshot (variants, selling plan groups, allocations)
//! - `SelectionState` and `Command`, the one-time/subscription state machine
//! - `Availability` and `resolve_plan` for per-variant group availability
//! - `Discount` and `PriceProjection` for savings badges and displayed prices
//! - `PlanPicker` and `PickerRegistry` binding it all to a host page
//! - `PickerError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use picker_core::{Catalog, Command, FormField, HostBindings, LoggingObserver, PickerConfig, PickerRegistry};
//!
//! let catalog = Arc::new(Catalog::from_json(&product_json)?);
//! let mut registry = PickerRegistry::new(Rc::new(LoggingObserver));
//!
//! let selling_plan = FormField::default();
//! registry.register(
//!     PickerConfig::from_attributes("main", "percent")?,
//!     catalog,
//!     HostBindings::new()
//!         .with_variant_source(FormField::new("40000000001"))
//!         .with_selling_plan_field(selling_plan.clone()),
//! )?;
//!
//! // Shopper picks a subscription group
//! let view = registry.dispatch("main", Command::GroupSelected { group_id: "g1".into() })?;
//! println!("{} {}", view.external_price, selling_plan.get());
//! ```

pub mod availability;
pub mod catalog;
pub mod config;
pub mod discount;
pub mod error;
pub mod events;
pub mod host;
pub mod ids;
pub mod location;
pub mod money;
pub mod picker;
pub mod pricing;
pub mod registry;
pub mod selection;
pub mod view;

// Re-exports for convenience
pub use availability::{resolve_plan, Availability, Reselection};
pub use catalog::{
    AdjustmentKind, Catalog, PriceAdjustment, Product, SellingPlan, SellingPlanAllocation,
    SellingPlanGroup, Variant,
};
pub use config::PickerConfig;
pub use discount::{Discount, DiscountFormat};
pub use error::{ErrorTier, PickerError, PickerResult};
pub use events::{dispatch_event, LoggingObserver, PickerEvent, PickerObserver};
pub use host::{FormField, HostBindings, MemoryLocation, PageLocation, SellingPlanField, VariantSource};
pub use ids::{SellingPlanGroupId, SellingPlanId, VariantId};
pub use location::{is_product_page, selling_plan_param, with_selling_plan, SELLING_PLAN_PARAM};
pub use money::{Currency, MoneyFormatter};
pub use picker::PlanPicker;
pub use pricing::{DisplayPrice, GroupPrice, PriceProjection, EXTERNAL_PRICE_PREFIX};
pub use registry::PickerRegistry;
pub use selection::{Command, InitialSelection, Selection, SelectionState};
pub use view::{GroupView, OneTimeView, PickerView};
