//! Field-level checks shared by the entity modules.
//!
//! Every check appends to a [`FieldErrors`] so one pass reports all problems
//! of a payload.

use geo::{Coord, MultiPolygon};
use rust_decimal::Decimal;
use validator::ValidateEmail;

use crate::errors::FieldErrors;

pub const NAME_MAX_LEN: usize = 250;
pub const ADDRESS_MAX_LEN: usize = 250;
pub const PHONE_MAX_LEN: usize = 10;
pub const COST_SCALE: u32 = 2;
/// NUMERIC(10,2) leaves 8 digits before the point.
pub const COST_MAX_INTEGER_DIGITS: u32 = 8;

pub fn check_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.add(field, "this field is required");
    } else if value.chars().count() > max_len {
        errors.add(field, format!("must be at most {max_len} characters"));
    }
}

pub fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if !value.validate_email() {
        errors.add(field, "enter a valid email address");
    }
}

/// Returns the cost rescaled to exactly two decimal places when valid.
pub fn check_cost(errors: &mut FieldErrors, field: &str, cost: Decimal) -> Option<Decimal> {
    if cost < Decimal::ZERO {
        errors.add(field, "must not be negative");
        return None;
    }
    let normalized = cost.normalize();
    if normalized.scale() > COST_SCALE {
        errors.add(field, format!("must have at most {COST_SCALE} decimal places"));
        return None;
    }
    let limit = Decimal::from(10u64.pow(COST_MAX_INTEGER_DIGITS));
    if normalized >= limit {
        errors.add(field, format!("must have at most {COST_MAX_INTEGER_DIGITS} digits before the decimal point"));
        return None;
    }
    let mut fixed = normalized;
    fixed.rescale(COST_SCALE);
    Some(fixed)
}

fn coord_in_range(c: &Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite() && (-180.0..=180.0).contains(&c.x) && (-90.0..=90.0).contains(&c.y)
}

pub fn check_mpoly(errors: &mut FieldErrors, field: &str, mpoly: &MultiPolygon<f64>) {
    if mpoly.0.is_empty() {
        errors.add(field, "must contain at least one polygon");
        return;
    }
    for (idx, polygon) in mpoly.0.iter().enumerate() {
        let mut distinct: Vec<Coord<f64>> = Vec::new();
        for c in polygon.exterior().coords() {
            if !distinct.contains(c) {
                distinct.push(*c);
            }
        }
        if distinct.len() < 3 {
            errors.add(field, format!("polygon {idx}: exterior ring needs at least 3 distinct vertices"));
        }
        let all_in_range = polygon
            .exterior()
            .coords()
            .chain(polygon.interiors().iter().flat_map(|ring| ring.coords()))
            .all(coord_in_range);
        if !all_in_range {
            errors.add(field, format!("polygon {idx}: coordinates must be finite lon/lat degrees"));
        }
    }
}
