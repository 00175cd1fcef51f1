use super::compensation::{CompensationRow, DelayBracket};
use super::normalizer::{normalize_code, normalize_name};
use super::ReferenceDataError;
use serde::Deserialize;
use std::io::Read;

pub(crate) const TOC_CODE_COLUMN: &str = "Tok code";
pub(crate) const COMPANY_NAME_COLUMN: &str = "Company Name";

#[derive(Debug)]
pub(crate) struct OperatorRecord {
    pub(crate) code: String,
    pub(crate) name: String,
}

#[derive(Debug)]
pub(crate) struct CompensationRecord {
    pub(crate) operator: String,
    pub(crate) row: CompensationRow,
}

pub(crate) fn parse_operator_codes<R: Read>(
    reader: R,
) -> Result<Vec<OperatorRecord>, ReferenceDataError> {
    let mut csv_reader = csv_reader(reader);
    require_columns(
        &mut csv_reader,
        "operator codes",
        &[TOC_CODE_COLUMN, COMPANY_NAME_COLUMN],
    )?;

    let mut records = Vec::new();
    for record in csv_reader.deserialize::<OperatorRow>() {
        let row = record?;
        records.push(OperatorRecord {
            code: normalize_code(&row.code),
            name: normalize_name(&row.company_name),
        });
    }

    Ok(records)
}

pub(crate) fn parse_compensation<R: Read>(
    reader: R,
) -> Result<Vec<CompensationRecord>, ReferenceDataError> {
    let mut csv_reader = csv_reader(reader);
    let mut required = vec![COMPANY_NAME_COLUMN];
    required.extend(DelayBracket::ALL.iter().map(|bracket| bracket.column()));
    require_columns(&mut csv_reader, "compensation", &required)?;

    let mut records = Vec::new();
    for record in csv_reader.deserialize::<CompensationCsvRow>() {
        let row = record?;
        records.push(CompensationRecord {
            operator: normalize_name(&row.company_name),
            row: CompensationRow {
                minutes_15_to_29: row.minutes_15_to_29.trim().to_string(),
                minutes_30_to_59: row.minutes_30_to_59.trim().to_string(),
                minutes_60_to_119: row.minutes_60_to_119.trim().to_string(),
                minutes_120_plus: row.minutes_120_plus.trim().to_string(),
            },
        });
    }

    Ok(records)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn require_columns<R: Read>(
    csv_reader: &mut csv::Reader<R>,
    table: &'static str,
    required: &[&'static str],
) -> Result<(), ReferenceDataError> {
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_name)
        .collect();

    for column in required {
        if !headers.iter().any(|header| header == column) {
            return Err(ReferenceDataError::MissingColumn { table, column });
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct OperatorRow {
    #[serde(rename = "Tok code", default)]
    code: String,
    #[serde(rename = "Company Name", default)]
    company_name: String,
}

#[derive(Debug, Deserialize)]
struct CompensationCsvRow {
    #[serde(rename = "Company Name")]
    company_name: String,
    #[serde(rename = "15 - 29 Mins", default)]
    minutes_15_to_29: String,
    #[serde(rename = "30 - 59 Mins", default)]
    minutes_30_to_59: String,
    #[serde(rename = "60 - 119 Mins", default)]
    minutes_60_to_119: String,
    #[serde(rename = "120 + Mins", default)]
    minutes_120_plus: String,
}
