use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Percentage string the source tables use for "no compensation in this bracket".
pub const ZERO_PERCENT: &str = "0%";
/// Percentage reported when the operator has no row in the compensation table.
pub const UNKNOWN_PERCENTAGE: &str = "Unknown";

/// Minimum used for operators missing from the compensation table.
const DEFAULT_MINIMUM_DELAY: u32 = 15;
/// Sentinel minimum for operators with a zero percentage in every bracket.
pub const NO_COMPENSATION_MINUTES: u32 = 999;

/// The four fixed Delay Repay brackets, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayBracket {
    Minutes15To29,
    Minutes30To59,
    Minutes60To119,
    Minutes120Plus,
}

impl DelayBracket {
    pub const ALL: [DelayBracket; 4] = [
        DelayBracket::Minutes15To29,
        DelayBracket::Minutes30To59,
        DelayBracket::Minutes60To119,
        DelayBracket::Minutes120Plus,
    ];

    pub const fn lower_bound(self) -> u32 {
        match self {
            DelayBracket::Minutes15To29 => 15,
            DelayBracket::Minutes30To59 => 30,
            DelayBracket::Minutes60To119 => 60,
            DelayBracket::Minutes120Plus => 120,
        }
    }

    /// Column header used by the compensation CSV.
    pub const fn column(self) -> &'static str {
        match self {
            DelayBracket::Minutes15To29 => "15 - 29 Mins",
            DelayBracket::Minutes30To59 => "30 - 59 Mins",
            DelayBracket::Minutes60To119 => "60 - 119 Mins",
            DelayBracket::Minutes120Plus => "120 + Mins",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DelayBracket::Minutes15To29 => "15-29",
            DelayBracket::Minutes30To59 => "30-59",
            DelayBracket::Minutes60To119 => "60-119",
            DelayBracket::Minutes120Plus => "120+",
        }
    }

    /// Bracket containing `delay_minutes`, or `None` below 15 minutes.
    pub fn for_delay(delay_minutes: f64) -> Option<Self> {
        if delay_minutes >= 120.0 {
            Some(DelayBracket::Minutes120Plus)
        } else if delay_minutes >= 60.0 {
            Some(DelayBracket::Minutes60To119)
        } else if delay_minutes >= 30.0 {
            Some(DelayBracket::Minutes30To59)
        } else if delay_minutes >= 15.0 {
            Some(DelayBracket::Minutes15To29)
        } else {
            None
        }
    }
}

/// Smallest delay an operator pays out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumDelay {
    Minutes(u32),
    NoCompensation,
}

impl MinimumDelay {
    pub const fn as_minutes(self) -> u32 {
        match self {
            MinimumDelay::Minutes(minutes) => minutes,
            MinimumDelay::NoCompensation => NO_COMPENSATION_MINUTES,
        }
    }

    pub fn admits(self, delay_minutes: f64) -> bool {
        match self {
            MinimumDelay::Minutes(minutes) => delay_minutes >= f64::from(minutes),
            MinimumDelay::NoCompensation => false,
        }
    }
}

/// Percentages an operator pays for each bracket, as written in the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationRow {
    pub minutes_15_to_29: String,
    pub minutes_30_to_59: String,
    pub minutes_60_to_119: String,
    pub minutes_120_plus: String,
}

impl CompensationRow {
    pub fn percentage(&self, bracket: DelayBracket) -> &str {
        match bracket {
            DelayBracket::Minutes15To29 => &self.minutes_15_to_29,
            DelayBracket::Minutes30To59 => &self.minutes_30_to_59,
            DelayBracket::Minutes60To119 => &self.minutes_60_to_119,
            DelayBracket::Minutes120Plus => &self.minutes_120_plus,
        }
    }

    /// First bracket, in ascending order, that is not literally `0%`.
    ///
    /// A blank cell is not `0%` and therefore counts as paying; callers are
    /// warned about blank cells when the table is loaded.
    pub fn minimum_delay(&self) -> MinimumDelay {
        DelayBracket::ALL
            .into_iter()
            .find(|bracket| self.percentage(*bracket) != ZERO_PERCENT)
            .map(|bracket| MinimumDelay::Minutes(bracket.lower_bound()))
            .unwrap_or(MinimumDelay::NoCompensation)
    }
}

/// Operator display name to bracket percentages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationTable {
    rows: BTreeMap<String, CompensationRow>,
}

impl CompensationTable {
    pub fn new(rows: BTreeMap<String, CompensationRow>) -> Self {
        Self { rows }
    }

    pub fn row(&self, operator: &str) -> Option<&CompensationRow> {
        self.rows.get(operator)
    }

    pub fn minimum_delay(&self, operator: &str) -> MinimumDelay {
        self.row(operator)
            .map(CompensationRow::minimum_delay)
            .unwrap_or(MinimumDelay::Minutes(DEFAULT_MINIMUM_DELAY))
    }

    /// Percentage for the bracket containing `delay_minutes`.
    ///
    /// Returns [`ZERO_PERCENT`] below the 15 minute floor and
    /// [`UNKNOWN_PERCENTAGE`] for operators without a row.
    pub fn percentage_for(&self, operator: &str, delay_minutes: f64) -> String {
        let Some(bracket) = DelayBracket::for_delay(delay_minutes) else {
            return ZERO_PERCENT.to_string();
        };

        match self.row(operator) {
            Some(row) => row.percentage(bracket).to_string(),
            None => UNKNOWN_PERCENTAGE.to_string(),
        }
    }

    pub fn operators(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
