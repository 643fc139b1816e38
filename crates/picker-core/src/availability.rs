//! # Availability Resolver
//!
//! Decides which selling plan groups a shopper may choose for a variant, and
//! where a selection lands when its group disappears after a variant change.

use crate::catalog::{Catalog, Variant};
use crate::ids::{SellingPlanGroupId, SellingPlanId};
use serde::Serialize;

/// Ordered set of selectable group ids for one variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Availability {
    group_ids: Vec<SellingPlanGroupId>,
}

impl Availability {
    /// Named groups referenced by the variant's allocations, in first-seen order
    pub fn for_variant(catalog: &Catalog, variant: &Variant) -> Self {
        let mut group_ids: Vec<SellingPlanGroupId> = Vec::new();
        for allocation in &variant.selling_plan_allocations {
            let group_id = &allocation.selling_plan_group_id;
            if group_ids.contains(group_id) {
                continue;
            }
            let visible = catalog
                .group(group_id)
                .map(|group| group.is_visible())
                .unwrap_or(false);
            if visible {
                group_ids.push(group_id.clone());
            }
        }
        Self { group_ids }
    }

    pub fn group_ids(&self) -> &[SellingPlanGroupId] {
        &self.group_ids
    }

    pub fn contains(&self, group_id: &SellingPlanGroupId) -> bool {
        self.group_ids.contains(group_id)
    }

    pub fn first(&self) -> Option<&SellingPlanGroupId> {
        self.group_ids.first()
    }

    pub fn is_empty(&self) -> bool {
        self.group_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.group_ids.len()
    }

    /// Where a subscription on `current` lands under this availability
    pub fn reselect(&self, current: &SellingPlanGroupId) -> Reselection {
        if self.contains(current) {
            Reselection::Keep
        } else {
            match self.first() {
                Some(first) => Reselection::Group(first.clone()),
                None => Reselection::OneTime,
            }
        }
    }
}

/// Outcome of re-checking a subscription against fresh availability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reselection {
    /// Current group is still offered
    Keep,
    /// Move to this group (first available in order)
    Group(SellingPlanGroupId),
    /// Nothing is offered any more
    OneTime,
}

/// Plan that backs `group_id` for `variant`.
///
/// `preferred` wins when the variant has an allocation for it; otherwise the
/// first plan of the group, in group order, that the variant is allocated to.
pub fn resolve_plan(
    catalog: &Catalog,
    variant: &Variant,
    group_id: &SellingPlanGroupId,
    preferred: Option<SellingPlanId>,
) -> Option<SellingPlanId> {
    let group = catalog.group(group_id).ok()?;
    let allocated = |plan_id: SellingPlanId| {
        variant
            .selling_plan_allocations
            .iter()
            .any(|a| a.selling_plan_id == plan_id && &a.selling_plan_group_id == group_id)
    };

    preferred
        .filter(|plan_id| group.plan(*plan_id).is_some() && allocated(*plan_id))
        .or_else(|| {
            group
                .selling_plans
                .iter()
                .map(|plan| plan.id)
                .find(|plan_id| allocated(*plan_id))
        })
}
