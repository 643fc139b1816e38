//! # URL Sync
//!
//! The main product's picker mirrors its selling plan into the page URL's
//! `selling_plan` query parameter, so a reload or shared link keeps the
//! selection.

use crate::error::{PickerError, PickerResult};
use crate::ids::SellingPlanId;
use url::Url;

/// Query parameter holding the selected selling plan
pub const SELLING_PLAN_PARAM: &str = "selling_plan";

fn parse(href: &str) -> PickerResult<Url> {
    Url::parse(href).map_err(|_| PickerError::InvalidUrl(href.to_string()))
}

/// Rewrite `href` so `selling_plan` carries `plan`, or drop it for one-time.
///
/// Other query parameters keep their order; an existing `selling_plan` is
/// replaced in place.
pub fn with_selling_plan(href: &str, plan: Option<SellingPlanId>) -> PickerResult<String> {
    let mut url = parse(href)?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, value) in url.query_pairs() {
        if key == SELLING_PLAN_PARAM {
            if let (Some(plan), false) = (plan, replaced) {
                pairs.push((key.into_owned(), plan.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if let (Some(plan), false) = (plan, replaced) {
        pairs.push((SELLING_PLAN_PARAM.to_string(), plan.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    Ok(url.into())
}

/// `selling_plan` parameter of `href`, if present and well-formed
pub fn selling_plan_param(href: &str) -> PickerResult<Option<SellingPlanId>> {
    let url = parse(href)?;
    let value = url
        .query_pairs()
        .find(|(key, _)| key == SELLING_PLAN_PARAM)
        .map(|(_, value)| value.into_owned());

    match value {
        Some(value) if !value.is_empty() => SellingPlanId::parse(&value).map(Some),
        _ => Ok(None),
    }
}

/// Whether the page at `href` is the product page of `handle`
/// (its last path segment is the handle).
pub fn is_product_page(href: &str, handle: &str) -> bool {
    let Ok(url) = parse(href) else {
        return false;
    };
    !handle.is_empty()
        && url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .is_some_and(|last| last == handle)
}
