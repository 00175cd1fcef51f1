use chrono::{NaiveTime, Timelike};
use tracing::{debug, warn};

use super::super::domain::{JourneyLeg, ServiceRecord};
use super::policy::Verdict;
use crate::performance::{DayClass, PerformanceLookup, ServiceQuery, TimeWindow};

const MINUTES_PER_DAY: f64 = 1440.0;
/// A negative delay beyond this is taken as an arrival after midnight.
/// Differences larger than half a day mean the arrival crossed midnight.
const MIDNIGHT_WRAP_THRESHOLD: f64 = 720.0;

/// Find the scheduled service the ticket refers to and fetch its calling points.
pub(crate) async fn resolve_service<L>(
    lookup: &L,
    leg: &JourneyLeg,
) -> Result<ServiceRecord, Verdict>
where
    L: PerformanceLookup,
{
    let query = ServiceQuery {
        from_crs: leg.departure_crs.clone(),
        to_crs: leg.arrival_crs.clone(),
        window: TimeWindow::around(leg.departure.hour()),
        date: leg.date,
        days: DayClass::for_date(leg.date),
    };

    let services = lookup.find_services(&query).await.map_err(|error| {
        warn!(error = %error, from = %leg.departure_crs, to = %leg.arrival_crs, "service search failed");
        Verdict::UpstreamUnavailable {
            reason: error.to_string(),
        }
    })?;

    if services.is_empty() {
        return Err(Verdict::NoServices);
    }

    let departure = leg.departure_hhmm();
    let Some(matched) = services
        .iter()
        .find(|service| service.scheduled_departure == departure)
    else {
        debug!(departure = %departure, candidates = services.len(), "no service at ticket time");
        return Err(Verdict::NoMatchingService {
            departure_time: leg.departure.format("%H:%M").to_string(),
        });
    };

    let Some(rid) = matched.primary_rid() else {
        return Err(Verdict::NoDelayData);
    };

    let detail = lookup.service_detail(rid).await.map_err(|error| {
        warn!(error = %error, rid = %rid, "service detail lookup failed");
        Verdict::UpstreamUnavailable {
            reason: error.to_string(),
        }
    })?;

    let origin = detail.location(&leg.departure_crs);
    let destination = detail.location(&leg.arrival_crs);
    let toc_code = if detail.toc_code.is_empty() {
        matched.toc_code.clone()
    } else {
        detail.toc_code.clone()
    };

    Ok(ServiceRecord {
        rid: rid.to_string(),
        toc_code,
        scheduled_departure: origin.and_then(|timing| timing.scheduled_departure.clone()),
        actual_departure: origin.and_then(|timing| timing.actual_departure.clone()),
        scheduled_arrival: destination.and_then(|timing| timing.scheduled_arrival.clone()),
        actual_arrival: destination.and_then(|timing| timing.actual_arrival.clone()),
    })
}

/// Minutes between two "HHMM" times, truncated to one decimal place.
///
/// Returns `None` when either side is absent or malformed.
pub fn arrival_delay(scheduled: Option<&str>, actual: Option<&str>) -> Option<f64> {
    let scheduled = parse_hhmm(scheduled?)?;
    let actual = parse_hhmm(actual?)?;

    let mut minutes = (actual - scheduled).num_seconds() as f64 / 60.0;
    if minutes < -MIDNIGHT_WRAP_THRESHOLD {
        minutes += MINUTES_PER_DAY;
    } else if minutes > MIDNIGHT_WRAP_THRESHOLD {
        minutes -= MINUTES_PER_DAY;
    }
    Some((minutes * 10.0).trunc() / 10.0)
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.len() != 4 || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_is_difference_in_minutes() {
        assert_eq!(arrival_delay(Some("1000"), Some("1047")), Some(47.0));
        assert_eq!(arrival_delay(Some("1000"), Some("0958")), Some(-2.0));
        assert_eq!(arrival_delay(Some("1000"), Some("1000")), Some(0.0));
    }

    #[test]
    fn arrivals_after_midnight_wrap_forward() {
        assert_eq!(arrival_delay(Some("2350"), Some("0015")), Some(25.0));
    }

    #[test]
    fn early_arrivals_before_midnight_wrap_backward() {
        assert_eq!(arrival_delay(Some("0005"), Some("2358")), Some(-7.0));
        assert_eq!(arrival_delay(Some("0010"), Some("2359")), Some(-11.0));
    }

    #[test]
    fn missing_or_malformed_times_yield_none() {
        assert_eq!(arrival_delay(None, Some("1047")), None);
        assert_eq!(arrival_delay(Some("1000"), None), None);
        assert_eq!(arrival_delay(Some("10:00"), Some("1047")), None);
        assert_eq!(arrival_delay(Some("1000"), Some("2561")), None);
        assert_eq!(arrival_delay(Some(""), Some("")), None);
    }
}
