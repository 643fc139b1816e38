//! # Picker View
//!
//! Everything the page renders for one picker, derived from the selection
//! state in a single pass. The view is replaced wholesale on every update and
//! carried by `init`/`update` notifications.

use crate::availability::Availability;
use crate::catalog::Catalog;
use crate::discount::{Discount, DiscountFormat};
use crate::error::{PickerError, PickerResult};
use crate::ids::{SellingPlanGroupId, SellingPlanId, VariantId};
use crate::money::MoneyFormatter;
use crate::pricing::{DisplayPrice, PriceProjection};
use crate::selection::{Selection, SelectionState};
use serde::Serialize;

/// One subscription row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub group_id: SellingPlanGroupId,
    pub name: String,
    /// Plan shown by this group's plan picker
    pub plan_id: SellingPlanId,
    pub plan_name: String,
    pub price: DisplayPrice,
    pub discount: Discount,
    pub selected: bool,
}

/// The one-time row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneTimeView {
    pub price: DisplayPrice,
    pub selected: bool,
}

/// Derived output of a picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerView {
    pub key: String,
    pub variant_id: VariantId,
    pub selection: Selection,
    pub selling_plan_id: Option<SellingPlanId>,
    pub available_group_ids: Availability,
    pub one_time: OneTimeView,
    pub groups: Vec<GroupView>,
    pub is_subscription: bool,
    pub external_price: String,
    /// `properties[Discount]` line item property; `None` disables the field
    pub discount_property: Option<String>,
}

impl PickerView {
    pub fn derive(
        key: &str,
        catalog: &Catalog,
        state: &SelectionState,
        format: DiscountFormat,
        money: &MoneyFormatter,
    ) -> PickerResult<Self> {
        let variant = catalog.variant(state.variant_id())?;
        let prices = PriceProjection::project(catalog, variant, state, money)?;
        let selection = state.selection().clone();

        let mut groups = Vec::with_capacity(prices.groups.len());
        for group_price in prices.groups {
            let group = catalog.group(&group_price.group_id)?;
            let plan = group
                .plan(group_price.plan_id)
                .ok_or(PickerError::PlanNotFound {
                    plan_id: group_price.plan_id.get(),
                })?;
            let discount = plan
                .price_adjustment()
                .map(|adjustment| Discount::calculate(variant.price, adjustment, format, money))
                .unwrap_or_default();

            groups.push(GroupView {
                selected: selection.group_id() == Some(&group.id),
                group_id: group_price.group_id,
                name: group.display_name().unwrap_or_default().to_string(),
                plan_id: plan.id,
                plan_name: plan.name.clone(),
                price: group_price.price,
                discount,
            });
        }

        let discount_property = groups
            .iter()
            .find(|g| g.selected)
            .map(|g| g.discount.text.clone())
            .filter(|text| !text.is_empty());

        Ok(Self {
            key: key.to_string(),
            variant_id: variant.id,
            selling_plan_id: selection.plan_id(),
            one_time: OneTimeView {
                price: prices.one_time,
                selected: !selection.is_subscription(),
            },
            selection,
            available_group_ids: state.available().clone(),
            groups,
            is_subscription: prices.is_subscription,
            external_price: prices.external_price,
            discount_property,
        })
    }

    pub fn group(&self, group_id: &SellingPlanGroupId) -> Option<&GroupView> {
        self.groups.iter().find(|g| &g.group_id == group_id)
    }

    pub fn selected_group(&self) -> Option<&GroupView> {
        self.groups.iter().find(|g| g.selected)
    }

    /// Value for the `selling_plan` form field ("" for one-time)
    pub fn selling_plan_value(&self) -> String {
        self.selling_plan_id
            .map(|id| id.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PriceAdjustment, Product, SellingPlan, SellingPlanGroup, Variant};
    use crate::selection::{Command, InitialSelection};

    fn catalog() -> Catalog {
        Catalog::new(
            Product::new("candle")
                .with_variant(
                    Variant::new(1, 2000)
                        .with_allocation("save", 10, 1700)
                        .with_allocation("plain", 20, 2000),
                )
                .with_group(
                    SellingPlanGroup::new("save", "Subscribe & save")
                        .with_plan(SellingPlan::new(10, "Monthly", PriceAdjustment::percentage(15.0))),
                )
                .with_group(
                    SellingPlanGroup::new("plain", "Subscribe")
                        .with_plan(SellingPlan::new(20, "Monthly", PriceAdjustment::percentage(0.0))),
                ),
        )
        .unwrap()
    }

    fn derive(state: &SelectionState, format: DiscountFormat) -> PickerView {
        PickerView::derive("main", &catalog(), state, format, &MoneyFormatter::default()).unwrap()
    }

    #[test]
    fn test_one_time_view() {
        let catalog = catalog();
        let state = SelectionState::new(&catalog, VariantId(1), InitialSelection::OneTime).unwrap();
        let view = derive(&state, DiscountFormat::Percent);

        assert!(view.one_time.selected);
        assert_eq!(view.one_time.price.formatted, "$20.00");
        assert_eq!(view.selling_plan_value(), "");
        assert_eq!(view.discount_property, None);
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.group(&"save".into()).unwrap().discount.text, "15%");
        assert!(view.selected_group().is_none());
    }

    #[test]
    fn test_subscription_view() {
        let catalog = catalog();
        let mut state = SelectionState::new(&catalog, VariantId(1), InitialSelection::OneTime).unwrap();
        state
            .apply(&catalog, &Command::GroupSelected { group_id: "save".into() })
            .unwrap();
        let view = derive(&state, DiscountFormat::Absolute);

        let selected = view.selected_group().unwrap();
        assert_eq!(selected.name, "Subscribe & save");
        assert_eq!(selected.plan_name, "Monthly");
        assert_eq!(selected.discount.text, "$3.00");
        assert_eq!(view.selling_plan_value(), "10");
        assert_eq!(view.discount_property.as_deref(), Some("$3.00"));
        assert_eq!(view.external_price, "- $17.00");
        assert!(!view.one_time.selected);
    }

    #[test]
    fn test_discount_property_disabled_without_discount() {
        let catalog = catalog();
        let mut state = SelectionState::new(&catalog, VariantId(1), InitialSelection::OneTime).unwrap();
        state
            .apply(&catalog, &Command::GroupSelected { group_id: "plain".into() })
            .unwrap();
        let view = derive(&state, DiscountFormat::Percent);

        assert!(view.is_subscription);
        assert_eq!(view.discount_property, None);
    }

    #[test]
    fn test_view_serializes_for_hosts() {
        let catalog = catalog();
        let state = SelectionState::new(&catalog, VariantId(1), InitialSelection::Group("save".into())).unwrap();
        let json = serde_json::to_value(derive(&state, DiscountFormat::Percent)).unwrap();

        assert_eq!(json["selection"]["mode"], "subscription");
        assert_eq!(json["selection"]["group_id"], "save");
        assert_eq!(json["selling_plan_id"], 10);
        assert_eq!(json["available_group_ids"][1], "plain");
    }
}
