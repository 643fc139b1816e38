//! # Catalog Model
//!
//! Read-only view over a product's variants, selling plan groups, selling
//! plans and price adjustments. Deserialized from the storefront's product JSON.

use crate::error::{PickerError, PickerResult};
use crate::ids::{SellingPlanGroupId, SellingPlanId, VariantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a selling plan adjusts the variant price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// `value` is percentage points off
    Percentage,
    /// `value` is an amount off, in minor units
    FixedAmount,
    /// `value` is the target price, in minor units
    Price,
}

/// Price adjustment rule of a selling plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    #[serde(rename = "value_type")]
    pub kind: AdjustmentKind,
    pub value: f64,
}

impl PriceAdjustment {
    pub fn percentage(value: f64) -> Self {
        Self {
            kind: AdjustmentKind::Percentage,
            value,
        }
    }

    pub fn fixed_amount(value: i64) -> Self {
        Self {
            kind: AdjustmentKind::FixedAmount,
            value: value as f64,
        }
    }

    pub fn price(value: i64) -> Self {
        Self {
            kind: AdjustmentKind::Price,
            value: value as f64,
        }
    }
}

/// A single subscription option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPlan {
    pub id: SellingPlanId,
    pub name: String,
    #[serde(default)]
    pub price_adjustments: Vec<PriceAdjustment>,
}

impl SellingPlan {
    pub fn new(id: u64, name: impl Into<String>, adjustment: PriceAdjustment) -> Self {
        Self {
            id: SellingPlanId(id),
            name: name.into(),
            price_adjustments: vec![adjustment],
        }
    }

    /// The adjustment that is applied (only the first one counts)
    pub fn price_adjustment(&self) -> Option<&PriceAdjustment> {
        self.price_adjustments.first()
    }
}

/// A named collection of mutually exclusive selling plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPlanGroup {
    pub id: SellingPlanGroupId,
    /// Empty or missing name marks an internal group
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub selling_plans: Vec<SellingPlan>,
}

impl SellingPlanGroup {
    pub fn new(id: &str, name: impl Into<String>) -> Self {
        Self {
            id: SellingPlanGroupId::new(id),
            name: Some(name.into()),
            selling_plans: Vec::new(),
        }
    }

    /// Builder: add a plan
    pub fn with_plan(mut self, plan: SellingPlan) -> Self {
        self.selling_plans.push(plan);
        self
    }

    /// Display name, `None` for hidden groups
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether shoppers may pick this group
    pub fn is_visible(&self) -> bool {
        self.display_name().is_some()
    }

    pub fn plan(&self, plan_id: SellingPlanId) -> Option<&SellingPlan> {
        self.selling_plans.iter().find(|p| p.id == plan_id)
    }

    pub fn plan_by_name(&self, name: &str) -> Option<&SellingPlan> {
        self.selling_plans.iter().find(|p| p.name == name)
    }
}

/// Subscription price of a variant under one selling plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellingPlanAllocation {
    pub selling_plan_group_id: SellingPlanGroupId,
    pub selling_plan_id: SellingPlanId,
    /// Price in minor units
    pub price: i64,
}

/// A purchasable product variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub title: String,
    /// One-time price in minor units
    pub price: i64,
    #[serde(default)]
    pub selling_plan_allocations: Vec<SellingPlanAllocation>,
}

impl Variant {
    pub fn new(id: u64, price: i64) -> Self {
        Self {
            id: VariantId(id),
            title: String::new(),
            price,
            selling_plan_allocations: Vec::new(),
        }
    }

    /// Builder: allocate a plan to this variant
    pub fn with_allocation(mut self, group_id: &str, plan_id: u64, price: i64) -> Self {
        self.selling_plan_allocations.push(SellingPlanAllocation {
            selling_plan_group_id: SellingPlanGroupId::new(group_id),
            selling_plan_id: SellingPlanId(plan_id),
            price,
        });
        self
    }

    /// Allocation for a plan of a group; plan ids are only unique within their group
    pub fn allocation(
        &self,
        group_id: &SellingPlanGroupId,
        plan_id: SellingPlanId,
    ) -> Option<&SellingPlanAllocation> {
        self.selling_plan_allocations
            .iter()
            .find(|a| a.selling_plan_id == plan_id && &a.selling_plan_group_id == group_id)
    }
}

/// Product JSON as rendered into the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub selling_plan_groups: Vec<SellingPlanGroup>,
}

impl Product {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    /// Builder: add a variant
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Builder: add a selling plan group
    pub fn with_group(mut self, group: SellingPlanGroup) -> Self {
        self.selling_plan_groups.push(group);
        self
    }
}

/// Validated, immutable catalog for one product
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    product: Product,
}

impl Catalog {
    /// Validate a product and wrap it
    pub fn new(product: Product) -> PickerResult<Self> {
        if product.variants.is_empty() {
            return Err(PickerError::InvalidCatalog(
                "product has no variants".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for variant in &product.variants {
            if !seen.insert(variant.id) {
                return Err(PickerError::InvalidCatalog(format!(
                    "duplicate variant id {}",
                    variant.id
                )));
            }
        }

        for group in &product.selling_plan_groups {
            if let Some(plan) = group
                .selling_plans
                .iter()
                .find(|p| p.price_adjustments.is_empty())
            {
                return Err(PickerError::InvalidCatalog(format!(
                    "selling plan {} in group '{}' has no price adjustments",
                    plan.id, group.id
                )));
            }
        }

        for variant in &product.variants {
            for allocation in &variant.selling_plan_allocations {
                let group = product
                    .selling_plan_groups
                    .iter()
                    .find(|g| g.id == allocation.selling_plan_group_id)
                    .ok_or_else(|| {
                        PickerError::InvalidCatalog(format!(
                            "variant {} references unknown selling plan group '{}'",
                            variant.id, allocation.selling_plan_group_id
                        ))
                    })?;
                if group.plan(allocation.selling_plan_id).is_none() {
                    return Err(PickerError::InvalidCatalog(format!(
                        "variant {} allocates plan {} outside group '{}'",
                        variant.id, allocation.selling_plan_id, group.id
                    )));
                }
            }
        }

        Ok(Self { product })
    }

    /// Parse and validate product JSON
    pub fn from_json(json: &str) -> PickerResult<Self> {
        let product: Product = serde_json::from_str(json)?;
        Self::new(product)
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn handle(&self) -> &str {
        &self.product.handle
    }

    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.product.variants.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = &SellingPlanGroup> {
        self.product.selling_plan_groups.iter()
    }

    pub fn variant(&self, variant_id: VariantId) -> PickerResult<&Variant> {
        self.product
            .variants
            .iter()
            .find(|v| v.id == variant_id)
            .ok_or(PickerError::VariantNotFound {
                variant_id: variant_id.get(),
            })
    }

    pub fn group(&self, group_id: &SellingPlanGroupId) -> PickerResult<&SellingPlanGroup> {
        self.product
            .selling_plan_groups
            .iter()
            .find(|g| &g.id == group_id)
            .ok_or_else(|| PickerError::GroupNotFound {
                group_id: group_id.to_string(),
            })
    }

    pub fn plan(
        &self,
        group_id: &SellingPlanGroupId,
        plan_id: SellingPlanId,
    ) -> PickerResult<&SellingPlan> {
        self.group(group_id)?
            .plan(plan_id)
            .ok_or(PickerError::PlanNotFound {
                plan_id: plan_id.get(),
            })
    }

    /// Find a plan in any group
    pub fn find_plan(&self, plan_id: SellingPlanId) -> Option<(&SellingPlanGroup, &SellingPlan)> {
        self.product
            .selling_plan_groups
            .iter()
            .find_map(|g| g.plan(plan_id).map(|p| (g, p)))
    }

    pub fn allocation(
        &self,
        variant_id: VariantId,
        group_id: &SellingPlanGroupId,
        plan_id: SellingPlanId,
    ) -> PickerResult<&SellingPlanAllocation> {
        self.variant(variant_id)?
            .allocation(group_id, plan_id)
            .ok_or(PickerError::AllocationNotFound {
                variant_id: variant_id.get(),
                plan_id: plan_id.get(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "id": 8001,
        "handle": "house-blend",
        "title": "House Blend",
        "requires_selling_plan": false,
        "variants": [
            {
                "id": 11,
                "title": "250g",
                "price": 2000,
                "selling_plan_allocations": [
                    { "selling_plan_group_id": "g1", "selling_plan_id": 101, "price": 1700, "compare_at_price": 2000 }
                ]
            }
        ],
        "selling_plan_groups": [
            {
                "id": "g1",
                "name": "Deliver every",
                "selling_plans": [
                    { "id": 101, "name": "1 month", "price_adjustments": [{ "value_type": "percentage", "value": 15 }] }
                ]
            },
            { "id": "internal", "name": null, "selling_plans": [] }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(PRODUCT_JSON).unwrap();

        assert_eq!(catalog.handle(), "house-blend");
        let variant = catalog.variant(VariantId(11)).unwrap();
        assert_eq!(variant.price, 2000);

        let plan = catalog.plan(&"g1".into(), SellingPlanId(101)).unwrap();
        assert_eq!(plan.name, "1 month");
        assert_eq!(
            plan.price_adjustment(),
            Some(&PriceAdjustment::percentage(15.0))
        );

        let allocation = catalog.allocation(VariantId(11), &"g1".into(), SellingPlanId(101)).unwrap();
        assert_eq!(allocation.price, 1700);

        assert!(!catalog.group(&"internal".into()).unwrap().is_visible());
    }

    #[test]
    fn test_lookup_errors() {
        let catalog = Catalog::from_json(PRODUCT_JSON).unwrap();

        assert_eq!(
            catalog.variant(VariantId(99)).unwrap_err(),
            PickerError::VariantNotFound { variant_id: 99 }
        );
        assert!(matches!(
            catalog.group(&"nope".into()),
            Err(PickerError::GroupNotFound { .. })
        ));
        assert!(matches!(
            catalog.plan(&"g1".into(), SellingPlanId(5)),
            Err(PickerError::PlanNotFound { plan_id: 5 })
        ));
        assert!(matches!(
            catalog.allocation(VariantId(11), &"g1".into(), SellingPlanId(5)),
            Err(PickerError::AllocationNotFound { .. })
        ));
    }

    #[test]
    fn test_allocation_is_keyed_by_group_and_plan() {
        let variant = Variant::new(1, 2000)
            .with_allocation("a", 1, 1800)
            .with_allocation("b", 1, 1200);

        assert_eq!(variant.allocation(&"a".into(), SellingPlanId(1)).unwrap().price, 1800);
        assert_eq!(variant.allocation(&"b".into(), SellingPlanId(1)).unwrap().price, 1200);
        assert!(variant.allocation(&"c".into(), SellingPlanId(1)).is_none());

        let catalog = Catalog::from_json(PRODUCT_JSON).unwrap();
        assert!(matches!(
            catalog.allocation(VariantId(11), &"internal".into(), SellingPlanId(101)),
            Err(PickerError::AllocationNotFound { .. })
        ));
    }

    #[test]
    fn test_find_plan() {
        let catalog = Catalog::from_json(PRODUCT_JSON).unwrap();
        let (group, plan) = catalog.find_plan(SellingPlanId(101)).unwrap();
        assert_eq!(group.id.as_str(), "g1");
        assert_eq!(plan.id, SellingPlanId(101));
        assert!(catalog.find_plan(SellingPlanId(1)).is_none());
    }

    #[test]
    fn test_validation() {
        let duplicate = Product::new("p")
            .with_variant(Variant::new(1, 100))
            .with_variant(Variant::new(1, 200));
        assert!(matches!(
            Catalog::new(duplicate),
            Err(PickerError::InvalidCatalog(_))
        ));

        let dangling = Product::new("p").with_variant(Variant::new(1, 100).with_allocation("ghost", 1, 90));
        assert!(Catalog::new(dangling).is_err());

        let stray_plan = Product::new("p")
            .with_variant(Variant::new(1, 100).with_allocation("g", 2, 90))
            .with_group(
                SellingPlanGroup::new("g", "Deliver every")
                    .with_plan(SellingPlan::new(1, "Monthly", PriceAdjustment::percentage(10.0))),
            );
        assert!(Catalog::new(stray_plan).is_err());

        let mut group = SellingPlanGroup::new("g", "Deliver every")
            .with_plan(SellingPlan::new(1, "Monthly", PriceAdjustment::percentage(10.0)));
        group.selling_plans[0].price_adjustments.clear();
        let no_adjustment = Product::new("p")
            .with_variant(Variant::new(1, 100))
            .with_group(group);
        assert!(Catalog::new(no_adjustment).is_err());

        assert!(Catalog::new(Product::new("empty")).is_err());
    }

    #[test]
    fn test_hidden_group_names() {
        let mut group = SellingPlanGroup::new("g", "");
        assert!(!group.is_visible());
        group.name = None;
        assert!(!group.is_visible());
        group.name = Some("Subscribe".into());
        assert_eq!(group.display_name(), Some("Subscribe"));
    }
}
