//! # Price Projector
//!
//! Display prices for the one-time option and for each available selling
//! plan group, plus the price mirrored into the theme's external price slot.

use crate::catalog::{Catalog, Variant};
use crate::error::{PickerError, PickerResult};
use crate::ids::{SellingPlanGroupId, SellingPlanId};
use crate::money::MoneyFormatter;
use crate::selection::{Selection, SelectionState};
use serde::Serialize;

/// Prefix of the external price display
pub const EXTERNAL_PRICE_PREFIX: &str = "- ";

/// Amount in minor units with its formatted form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPrice {
    pub amount: i64,
    pub formatted: String,
}

impl DisplayPrice {
    pub fn new(amount: i64, money: &MoneyFormatter) -> Self {
        Self {
            amount,
            formatted: money.format(amount),
        }
    }
}

/// Subscription price of one group under its displayed plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPrice {
    pub group_id: SellingPlanGroupId,
    pub plan_id: SellingPlanId,
    pub price: DisplayPrice,
}

/// All prices the picker shows for the current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceProjection {
    pub one_time: DisplayPrice,
    pub groups: Vec<GroupPrice>,
    pub is_subscription: bool,
    /// Text for the theme's external price element
    pub external_price: String,
}

impl PriceProjection {
    pub fn project(
        catalog: &Catalog,
        variant: &Variant,
        state: &SelectionState,
        money: &MoneyFormatter,
    ) -> PickerResult<Self> {
        let groups = state
            .group_plans()
            .into_iter()
            .map(|(group_id, plan_id)| {
                let allocation = variant.allocation(group_id, plan_id).ok_or(PickerError::AllocationNotFound {
                    variant_id: variant.id.get(),
                    plan_id: plan_id.get(),
                })?;
                Ok(GroupPrice {
                    group_id: group_id.clone(),
                    plan_id,
                    price: DisplayPrice::new(allocation.price, money),
                })
            })
            .collect::<PickerResult<Vec<_>>>()?;

        let one_time = DisplayPrice::new(variant.price, money);
        let selection = state.selection();
        let is_subscription = selection.is_subscription();

        let shown = match selection {
            Selection::Subscription { group_id, plan_id } => {
                money.format(catalog.allocation(variant.id, group_id, *plan_id)?.price)
            }
            Selection::OneTime => one_time.formatted.clone(),
        };
        let external_price = format!("{EXTERNAL_PRICE_PREFIX}{shown}");

        Ok(Self {
            one_time,
            groups,
            is_subscription,
            external_price,
        })
    }

    pub fn group(&self, group_id: &SellingPlanGroupId) -> Option<&GroupPrice> {
        self.groups.iter().find(|g| &g.group_id == group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PriceAdjustment, Product, SellingPlan, SellingPlanGroup};
    use crate::ids::VariantId;
    use crate::selection::{Command, InitialSelection};

    fn catalog() -> Catalog {
        Catalog::new(
            Product::new("soap")
                .with_variant(
                    Variant::new(5, 2000)
                        .with_allocation("g", 1, 1700)
                        .with_allocation("g", 2, 1500)
                        .with_allocation("h", 3, 1900),
                )
                .with_group(
                    SellingPlanGroup::new("g", "Deliver every")
                        .with_plan(SellingPlan::new(1, "1 month", PriceAdjustment::percentage(15.0)))
                        .with_plan(SellingPlan::new(2, "3 months", PriceAdjustment::price(1500))),
                )
                .with_group(
                    SellingPlanGroup::new("h", "Gift")
                        .with_plan(SellingPlan::new(3, "1 month", PriceAdjustment::fixed_amount(100))),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_one_time_projection() {
        let catalog = catalog();
        let variant = catalog.variant(VariantId(5)).unwrap();
        let state = SelectionState::new(&catalog, VariantId(5), InitialSelection::OneTime).unwrap();

        let prices = PriceProjection::project(&catalog, variant, &state, &MoneyFormatter::default()).unwrap();

        assert_eq!(prices.one_time.formatted, "$20.00");
        assert!(!prices.is_subscription);
        assert_eq!(prices.external_price, "- $20.00");
        assert_eq!(prices.groups.len(), 2);
        assert_eq!(prices.group(&"g".into()).unwrap().price.formatted, "$17.00");
        assert_eq!(prices.group(&"h".into()).unwrap().price.amount, 1900);
    }

    #[test]
    fn test_subscription_projection_follows_displayed_plan() {
        let catalog = catalog();
        let variant = catalog.variant(VariantId(5)).unwrap();
        let mut state = SelectionState::new(&catalog, VariantId(5), InitialSelection::OneTime).unwrap();
        state
            .apply(
                &catalog,
                &Command::PlanChanged {
                    group_id: "g".into(),
                    plan_id: SellingPlanId(2),
                },
            )
            .unwrap();

        let prices = PriceProjection::project(&catalog, variant, &state, &MoneyFormatter::default()).unwrap();

        assert!(prices.is_subscription);
        assert_eq!(prices.group(&"g".into()).unwrap().price.formatted, "$15.00");
        assert_eq!(prices.external_price, "- $15.00");
    }

    #[test]
    fn test_groups_sharing_a_plan_id_keep_their_own_price() {
        let catalog = Catalog::new(
            Product::new("candle")
                .with_variant(
                    Variant::new(1, 2000)
                        .with_allocation("a", 1, 1800)
                        .with_allocation("b", 1, 1200),
                )
                .with_group(
                    SellingPlanGroup::new("a", "Deliver every")
                        .with_plan(SellingPlan::new(1, "Monthly", PriceAdjustment::percentage(10.0))),
                )
                .with_group(
                    SellingPlanGroup::new("b", "Prepaid")
                        .with_plan(SellingPlan::new(1, "Monthly", PriceAdjustment::price(1200))),
                ),
        )
        .unwrap();
        let variant = catalog.variant(VariantId(1)).unwrap();
        let mut state = SelectionState::new(&catalog, VariantId(1), InitialSelection::OneTime).unwrap();
        state
            .apply(&catalog, &Command::GroupSelected { group_id: "b".into() })
            .unwrap();

        let prices = PriceProjection::project(&catalog, variant, &state, &MoneyFormatter::default()).unwrap();

        assert_eq!(prices.group(&"a".into()).unwrap().price.amount, 1800);
        assert_eq!(prices.group(&"b".into()).unwrap().price.amount, 1200);
        assert_eq!(prices.external_price, "- $12.00");
    }
}
