//! # Selector State
//!
//! The selection state machine: which variant is active, whether the shopper
//! buys once or subscribes, and which plan each group's plan picker shows.
//!
//! ```text
//!            GroupSelected / PlanChanged / SubscriptionSelected
//!   OneTime ───────────────────────────────────────────────▶ Subscription(g, p)
//!      ▲                                                          │
//!      └──────────── OneTimeSelected / no groups left ────────────┘
//! ```
//!
//! Every command ends with [`SelectionState::resolve`], which re-checks the
//! selection against the variant's availability and applies the fallback.

use crate::availability::{resolve_plan, Availability, Reselection};
use crate::catalog::Catalog;
use crate::error::{PickerError, PickerResult};
use crate::ids::{SellingPlanGroupId, SellingPlanId, VariantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What the shopper is buying
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Selection {
    OneTime,
    Subscription {
        group_id: SellingPlanGroupId,
        plan_id: SellingPlanId,
    },
}

impl Selection {
    pub fn is_subscription(&self) -> bool {
        matches!(self, Selection::Subscription { .. })
    }

    pub fn group_id(&self) -> Option<&SellingPlanGroupId> {
        match self {
            Selection::Subscription { group_id, .. } => Some(group_id),
            Selection::OneTime => None,
        }
    }

    pub fn plan_id(&self) -> Option<SellingPlanId> {
        match self {
            Selection::Subscription { plan_id, .. } => Some(*plan_id),
            Selection::OneTime => None,
        }
    }
}

/// Input commands, adapted by the host from page events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// The product form switched to another variant
    VariantChanged { variant_id: VariantId },
    /// A group's radio was checked
    GroupSelected { group_id: SellingPlanGroupId },
    /// The one-time radio was checked
    OneTimeSelected,
    /// Back to subscribing, without naming a group
    SubscriptionSelected,
    /// A group's plan picker changed value
    PlanChanged {
        group_id: SellingPlanGroupId,
        plan_id: SellingPlanId,
    },
    /// Re-read the variant from the host and re-derive everything
    Refresh,
}

/// Selection present on the page before the picker starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum InitialSelection {
    #[default]
    OneTime,
    Group(SellingPlanGroupId),
    SellingPlan(SellingPlanId),
}

/// Mutable selection state of one picker instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    variant_id: VariantId,
    selection: Selection,
    available: Availability,
    /// Plan currently shown by each group's plan picker
    displayed: BTreeMap<SellingPlanGroupId, SellingPlanId>,
    /// Group to return to on `SubscriptionSelected`
    last_group: Option<SellingPlanGroupId>,
}

impl SelectionState {
    /// Build the initial state for a variant and the page's current selection
    pub fn new(
        catalog: &Catalog,
        variant_id: VariantId,
        initial: InitialSelection,
    ) -> PickerResult<Self> {
        catalog.variant(variant_id)?;

        let displayed = catalog
            .groups()
            .filter_map(|group| group.selling_plans.first().map(|plan| (group.id.clone(), plan.id)))
            .collect();

        let mut state = Self {
            variant_id,
            selection: Selection::OneTime,
            available: Availability::default(),
            displayed,
            last_group: None,
        };

        match initial {
            InitialSelection::OneTime => {}
            InitialSelection::Group(group_id) => match catalog.group(&group_id) {
                Ok(_) => state.selection = state.subscription_on(catalog, group_id)?,
                Err(err) => warn!(error = %err, "Initial selling plan group not in catalog, starting one-time"),
            },
            InitialSelection::SellingPlan(plan_id) => match catalog.find_plan(plan_id) {
                Some((group, plan)) => {
                    state.displayed.insert(group.id.clone(), plan.id);
                    state.selection = Selection::Subscription {
                        group_id: group.id.clone(),
                        plan_id: plan.id,
                    };
                }
                None => warn!(%plan_id, "Initial selling plan not in catalog, starting one-time"),
            },
        }

        state.resolve(catalog)?;
        Ok(state)
    }

    pub fn variant_id(&self) -> VariantId {
        self.variant_id
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn available(&self) -> &Availability {
        &self.available
    }

    /// Plan shown by a group's plan picker
    pub fn displayed_plan(&self, group_id: &SellingPlanGroupId) -> Option<SellingPlanId> {
        self.displayed.get(group_id).copied()
    }

    /// (group, displayed plan) for every available group, in availability order
    pub fn group_plans(&self) -> Vec<(&SellingPlanGroupId, SellingPlanId)> {
        self.available
            .group_ids()
            .iter()
            .filter_map(|group_id| self.displayed_plan(group_id).map(|plan| (group_id, plan)))
            .collect()
    }

    /// Apply one command. On error the caller discards this state.
    pub fn apply(&mut self, catalog: &Catalog, command: &Command) -> PickerResult<()> {
        match command {
            Command::VariantChanged { variant_id } => {
                catalog.variant(*variant_id)?;
                self.variant_id = *variant_id;
            }
            Command::GroupSelected { group_id } => {
                catalog.group(group_id)?;
                self.ensure_available(group_id)?;
                self.selection = self.subscription_on(catalog, group_id.clone())?;
            }
            Command::OneTimeSelected => {
                self.selection = Selection::OneTime;
            }
            Command::SubscriptionSelected => {
                let target = self
                    .last_group
                    .as_ref()
                    .filter(|group_id| self.available.contains(group_id))
                    .or_else(|| self.available.first())
                    .cloned();
                match target {
                    Some(group_id) => {
                        self.selection = self.subscription_on(catalog, group_id)?;
                    }
                    None => warn!(
                        variant_id = %self.variant_id,
                        "No selling plan groups available, staying one-time"
                    ),
                }
            }
            Command::PlanChanged { group_id, plan_id } => {
                let plan = catalog.plan(group_id, *plan_id)?;
                self.ensure_available(group_id)?;
                catalog.allocation(self.variant_id, group_id, *plan_id)?;

                self.displayed.insert(group_id.clone(), *plan_id);
                self.sync_plan_name(catalog, group_id, &plan.name);
                self.selection = Selection::Subscription {
                    group_id: group_id.clone(),
                    plan_id: *plan_id,
                };
            }
            Command::Refresh => {}
        }

        self.resolve(catalog)
    }

    /// Re-check availability, apply the fallback policy and pin every group's
    /// displayed plan to one the variant is allocated to.
    pub fn resolve(&mut self, catalog: &Catalog) -> PickerResult<()> {
        let variant = catalog.variant(self.variant_id)?;
        self.available = Availability::for_variant(catalog, variant);

        for group_id in self.available.group_ids() {
            let current = self.displayed.get(group_id).copied();
            let plan_id = resolve_plan(catalog, variant, group_id, current).ok_or_else(|| {
                PickerError::AllocationNotFound {
                    variant_id: variant.id.get(),
                    plan_id: current.map(SellingPlanId::get).unwrap_or_default(),
                }
            })?;
            self.displayed.insert(group_id.clone(), plan_id);
        }

        if let Some(group_id) = self.selection.group_id().cloned() {
            match self.available.reselect(&group_id) {
                Reselection::Keep => {}
                Reselection::Group(fallback) => {
                    debug!(from = %group_id, to = %fallback, "Selected group no longer available");
                    self.selection = self.subscription_on(catalog, fallback)?;
                }
                Reselection::OneTime => {
                    debug!(from = %group_id, "No groups available, falling back to one-time");
                    self.selection = Selection::OneTime;
                }
            }
        }

        if let Selection::Subscription { group_id, plan_id } = &mut self.selection {
            if let Some(displayed) = self.displayed.get(group_id) {
                *plan_id = *displayed;
            }
            self.last_group = Some(group_id.clone());
        }

        Ok(())
    }

    fn ensure_available(&self, group_id: &SellingPlanGroupId) -> PickerResult<()> {
        if self.available.contains(group_id) {
            Ok(())
        } else {
            Err(PickerError::GroupUnavailable {
                group_id: group_id.to_string(),
            })
        }
    }

    fn subscription_on(
        &self,
        catalog: &Catalog,
        group_id: SellingPlanGroupId,
    ) -> PickerResult<Selection> {
        let group = catalog.group(&group_id)?;
        let plan_id = self
            .displayed_plan(&group_id)
            .or_else(|| group.selling_plans.first().map(|plan| plan.id))
            .ok_or_else(|| PickerError::GroupNotFound {
                group_id: group_id.to_string(),
            })?;
        Ok(Selection::Subscription { group_id, plan_id })
    }

    /// Keep duplicate plan pickers (mobile/desktop, per-group selects) on the
    /// same plan name.
    fn sync_plan_name(&mut self, catalog: &Catalog, source: &SellingPlanGroupId, name: &str) {
        for group in catalog.groups() {
            if &group.id == source {
                continue;
            }
            if let Some(plan) = group.plan_by_name(name) {
                self.displayed.insert(group.id.clone(), plan.id);
            }
        }
    }
}
