//! Static operator and compensation tables used by the eligibility engine.

mod compensation;
mod normalizer;
mod parser;

pub use compensation::{
    CompensationRow, CompensationTable, DelayBracket, MinimumDelay, NO_COMPENSATION_MINUTES,
    UNKNOWN_PERCENTAGE, ZERO_PERCENT,
};

use crate::config::ReferenceConfig;
use normalizer::{is_placeholder_code, normalize_code};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Operator name reported when a TOC code has no entry in the code table.
pub const UNKNOWN_OPERATOR: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("failed to open reference table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid reference CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Short TOC code (e.g. `XC`) to operator display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorCodeTable {
    names: BTreeMap<String, String>,
}

impl OperatorCodeTable {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names.get(&normalize_code(code)).map(String::as_str)
    }

    /// Display name for `code`, falling back to [`UNKNOWN_OPERATOR`].
    pub fn resolve(&self, code: &str) -> &str {
        self.name_for(code).unwrap_or(UNKNOWN_OPERATOR)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Both reference tables, loaded once and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub operators: OperatorCodeTable,
    pub compensation: CompensationTable,
}

impl ReferenceData {
    pub fn new(operators: OperatorCodeTable, compensation: CompensationTable) -> Self {
        Self {
            operators,
            compensation,
        }
    }

    pub fn load(config: &ReferenceConfig) -> Result<Self, ReferenceDataError> {
        let operators = load_operator_codes(&config.operator_codes)?;
        let compensation = load_compensation_table(&config.compensation)?;
        info!(
            operators = operators.len(),
            compensation_rows = compensation.len(),
            "reference data loaded"
        );
        Ok(Self::new(operators, compensation))
    }
}

pub fn load_operator_codes<P: AsRef<Path>>(
    path: P,
) -> Result<OperatorCodeTable, ReferenceDataError> {
    operator_codes_from_reader(open(path.as_ref())?)
}

pub fn load_compensation_table<P: AsRef<Path>>(
    path: P,
) -> Result<CompensationTable, ReferenceDataError> {
    compensation_table_from_reader(open(path.as_ref())?)
}

pub fn operator_codes_from_reader<R: Read>(
    reader: R,
) -> Result<OperatorCodeTable, ReferenceDataError> {
    let mut names = BTreeMap::new();
    for record in parser::parse_operator_codes(reader)? {
        if is_placeholder_code(&record.code) {
            continue;
        }
        names.insert(record.code, record.name);
    }
    Ok(OperatorCodeTable::new(names))
}

pub fn compensation_table_from_reader<R: Read>(
    reader: R,
) -> Result<CompensationTable, ReferenceDataError> {
    let mut rows = BTreeMap::new();
    for record in parser::parse_compensation(reader)? {
        for bracket in DelayBracket::ALL {
            if record.row.percentage(bracket).is_empty() {
                warn!(
                    operator = %record.operator,
                    bracket = bracket.label(),
                    "blank compensation cell; bracket will be treated as paying"
                );
            }
        }
        rows.insert(record.operator, record.row);
    }
    Ok(CompensationTable::new(rows))
}

fn open(path: &Path) -> Result<File, ReferenceDataError> {
    File::open(path).map_err(|source| ReferenceDataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
