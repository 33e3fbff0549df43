//! Pure derivation rules applied to fetched ride collections. No I/O.

use crate::services::profile_service::Gender;
use crate::services::ride_service::{Ride, VehicleType};

/// Peak iff the parsed time falls in [8:00, 10:00] or [17:00, 20:00], with
/// the boundary minute 0 inclusive. Malformed strings are not peak.
pub fn is_peak_hour(time_str: &str) -> bool {
    let Some((hour, minute)) = parse_clock_12h(time_str) else {
        return false;
    };
    let morning = hour >= 8 && (hour < 10 || (hour == 10 && minute == 0));
    let evening = hour >= 17 && (hour < 20 || (hour == 20 && minute == 0));
    morning || evening
}

// Ride times are free-text 12-hour clock strings ("8:30 AM", "Leaves 5:15pm").
// Kept dependency-free: scan for the first h:mm and the meridiem after it.
fn parse_clock_12h(input: &str) -> Option<(u32, u32)> {
    let bytes = input.as_bytes();
    let colon = input.find(':')?;

    let mut start = colon;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == colon {
        return None;
    }
    let hour: u32 = input[start..colon].parse().ok()?;

    let rest = &input[colon + 1..];
    let minute_digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if minute_digits == 0 {
        return None;
    }
    let minute: u32 = rest[..minute_digits].parse().ok()?;

    let tail = rest[minute_digits..].trim_start();
    let meridiem = tail.get(..2)?;
    let hour = match meridiem.to_ascii_uppercase().as_str() {
        "AM" => {
            if hour == 12 {
                0
            } else {
                hour
            }
        }
        "PM" => {
            if hour == 12 {
                12
            } else {
                hour + 12
            }
        }
        _ => return None,
    };

    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Workplace and circle name match when either contains the other,
/// case-insensitively ("DLF IT Park" matches "DLF IT Park, Chennai"). An
/// unset workplace matches nothing.
pub fn is_vicinity_match(workplace: &str, circle_name: &str) -> bool {
    if workplace.is_empty() {
        return false;
    }
    let workplace = workplace.to_lowercase();
    let circle = circle_name.to_lowercase();
    workplace.contains(&circle) || circle.contains(&workplace)
}

pub fn vicinity_match_count(rides: &[Ride], workplace: &str) -> usize {
    rides
        .iter()
        .filter(|r| is_vicinity_match(workplace, &r.circle_name))
        .count()
}

#[derive(Debug, Clone, Default)]
pub struct RideFilters {
    pub vehicle_type: Option<VehicleType>,
    pub women_only: bool,
    pub same_vicinity: bool,
}

/// Sequential narrowing passes over the fetched collection. Vehicle and
/// women-only are plain intersections; the vicinity pass falls back to the
/// un-narrowed set when it would empty the result, so riders still see
/// something bookable.
pub fn apply_ride_filters(rides: &[Ride], filters: &RideFilters, workplace: &str) -> Vec<Ride> {
    let mut result: Vec<Ride> = rides.to_vec();

    if let Some(vehicle) = filters.vehicle_type {
        result.retain(|r| r.vehicle_type == vehicle);
    }

    if filters.women_only {
        result.retain(|r| r.driver_gender == Gender::Female);
    }

    if filters.same_vicinity {
        let matches: Vec<Ride> = result
            .iter()
            .filter(|r| is_vicinity_match(workplace, &r.circle_name))
            .cloned()
            .collect();
        if !matches.is_empty() {
            result = matches;
        }
    }

    result
}
