use chrono::{NaiveDate, NaiveTime};

use super::super::domain::{Endpoint, JourneyLeg, RawSegment, TicketFormat, ValidationError};
use super::policy::{Verdict, CLAIM_WINDOW_DAYS};

/// Date format printed on UK rail tickets, e.g. "10 Jul 2025".
const TICKET_DATE_FORMAT: &str = "%d %b %Y";
const DEPARTURE_TIME_FORMAT: &str = "%H:%M";

/// Result of the checks that run before any network lookup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Screening {
    Settled(Verdict),
    Proceed(JourneyLeg),
}

/// Format gate, age gate and field parsing, in that order.
pub(crate) fn screen_segment(segment: &RawSegment, today: NaiveDate) -> Screening {
    if segment.ticket_format == TicketFormat::Paper {
        return Screening::Settled(Verdict::BlockedPaper);
    }

    let date = match parse_ticket_date(segment.ticket_date.as_deref()) {
        Ok(date) => date,
        Err(error) => return Screening::Settled(invalid(error)),
    };

    let days_old = (today - date).num_days();
    if days_old > CLAIM_WINDOW_DAYS {
        return Screening::Settled(Verdict::TooOld { days_old });
    }

    match journey_leg(segment, date) {
        Ok(leg) => Screening::Proceed(leg),
        Err(error) => Screening::Settled(invalid(error)),
    }
}

fn journey_leg(segment: &RawSegment, date: NaiveDate) -> Result<JourneyLeg, ValidationError> {
    segment.validate_endpoints()?;
    let departure = parse_departure_time(segment.departure_time.as_deref())?;
    let departure_crs = crs_code(segment.departure_crs.as_deref())
        .ok_or(ValidationError::MissingCrs(Endpoint::Departure))?;
    let arrival_crs = crs_code(segment.arrival_crs.as_deref())
        .ok_or(ValidationError::MissingCrs(Endpoint::Arrival))?;

    Ok(JourneyLeg {
        date,
        departure,
        departure_crs,
        arrival_crs,
    })
}

fn invalid(error: ValidationError) -> Verdict {
    Verdict::InvalidTicket {
        reason: error.to_string(),
    }
}

fn parse_ticket_date(value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    NaiveDate::parse_from_str(raw, TICKET_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

fn parse_departure_time(value: Option<&str>) -> Result<NaiveTime, ValidationError> {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingTime);
    }
    NaiveTime::parse_from_str(raw, DEPARTURE_TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTime(raw.to_string()))
}

fn crs_code(value: Option<&str>) -> Option<String> {
    let code = value.map(str::trim).unwrap_or_default();
    if code.is_empty() {
        None
    } else {
        Some(code.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    fn segment() -> RawSegment {
        RawSegment {
            ticket_date: Some("12 Oct 2026".to_string()),
            departure_time: Some("9:05".to_string()),
            departure_crs: Some(" bth ".to_string()),
            arrival_crs: Some("PAD".to_string()),
            ..RawSegment::default()
        }
    }

    #[test]
    fn paper_tickets_short_circuit_before_parsing() {
        let paper = RawSegment {
            ticket_format: TicketFormat::Paper,
            ticket_date: Some("not a date".to_string()),
            ..RawSegment::default()
        };
        assert_eq!(
            screen_segment(&paper, today()),
            Screening::Settled(Verdict::BlockedPaper)
        );
    }

    #[test]
    fn twenty_eight_days_is_still_inside_the_window() {
        let mut edge = segment();
        edge.ticket_date = Some("20 Sep 2026".to_string());
        assert!(matches!(
            screen_segment(&edge, today()),
            Screening::Proceed(_)
        ));

        edge.ticket_date = Some("19 Sep 2026".to_string());
        assert_eq!(
            screen_segment(&edge, today()),
            Screening::Settled(Verdict::TooOld { days_old: 29 })
        );
    }

    #[test]
    fn future_dates_pass_the_age_gate() {
        let mut ahead = segment();
        ahead.ticket_date = Some("25 Oct 2026".to_string());
        assert!(matches!(
            screen_segment(&ahead, today()),
            Screening::Proceed(_)
        ));
    }

    #[test]
    fn codes_are_normalized_and_time_is_parsed() {
        match screen_segment(&segment(), today()) {
            Screening::Proceed(leg) => {
                assert_eq!(leg.departure_crs, "BTH");
                assert_eq!(leg.departure_hhmm(), "0905");
            }
            other => panic!("expected leg, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_fields_are_invalid_tickets() {
        let mut bad_date = segment();
        bad_date.ticket_date = Some("2026-10-12".to_string());
        assert_eq!(
            screen_segment(&bad_date, today()),
            Screening::Settled(Verdict::InvalidTicket {
                reason: "ticket date '2026-10-12' is not in DD Mon YYYY form".to_string()
            })
        );

        let mut no_crs = segment();
        no_crs.arrival_crs = None;
        no_crs.arrival_station = Some("London Paddington".to_string());
        assert_eq!(
            screen_segment(&no_crs, today()),
            Screening::Settled(Verdict::InvalidTicket {
                reason: "arrival station code is missing".to_string()
            })
        );

        let mut bad_time = segment();
        bad_time.departure_time = Some("quarter past".to_string());
        assert!(matches!(
            screen_segment(&bad_time, today()),
            Screening::Settled(Verdict::InvalidTicket { .. })
        ));
    }
}
