//! IDEB/SAEB reference tables
//!
//! Two flat files back the IDEB report:
//! - municipality table (comma-separated), one row per municipality/indicator/year
//! - state table (semicolon-separated), one row per state/indicator/year
//!
//! Both are read with Polars as all-text frames, column names are normalized
//! (trim + lowercase, `valor` -> `valor_numerico`) and every row becomes a
//! typed [`IdebRecord`]. National figures are not stored anywhere: they are
//! derived by grouping the state table on (indicator, year, segment).

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;

use crate::territory::{Scope, TerritoryCode};
use crate::utils::text::fold_diacritics;

/// One normalized reference-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct IdebRecord {
    pub ibge_code: Option<String>,
    pub uf: Option<String>,
    pub municipality: Option<String>,
    /// `municipal` or `estadual`.
    pub sphere: Option<String>,
    /// Normalized segment: `anos iniciais`, `anos finais`, `ensino medio`.
    pub segment: String,
    pub indicator: Option<String>,
    pub year: Option<i64>,
    /// Absent when the source cell is not numeric.
    pub value: Option<f64>,
}

impl IdebRecord {
    pub fn is(&self, indicator: &str, segment: &str) -> bool {
        self.indicator.as_deref() == Some(indicator) && self.segment == segment
    }
}

/// Descriptive statistics over all states for one (indicator, year, segment).
#[derive(Debug, Clone, PartialEq)]
pub struct NationalStat {
    pub indicator: String,
    pub year: i64,
    pub segment: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: i64,
}

/// Reference rows relevant to one territory.
#[derive(Debug, Clone)]
pub struct TerritoryView<'a> {
    /// Rows of the territory itself (state-table rows for a state code).
    pub primary: Vec<&'a IdebRecord>,
    /// Rows of the enclosing state; empty for state codes.
    pub state: Vec<&'a IdebRecord>,
    pub national: &'a [NationalStat],
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    municipal: Vec<IdebRecord>,
    state: Vec<IdebRecord>,
    national: Vec<NationalStat>,
}

/// Normalize segment text: case, diacritics and the typos found in the source tables.
pub fn normalize_segment(raw: &str) -> String {
    let mut s = fold_diacritics(&raw.trim().to_lowercase());
    if s.contains("medio") && !s.contains("ensino") {
        s = s.replace("medio", "ensino medio");
    }
    for (typo, fixed) in [
        ("ano iniciais", "anos iniciais"),
        ("anos inicias", "anos iniciais"),
        ("ano finais", "anos finais"),
    ] {
        s = s.replace(typo, fixed);
    }
    s.trim().to_string()
}

/// Parse a numeric cell; decimal commas are accepted.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn read_text_frame(path: &Path, separator: u8) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_encoding(CsvEncoding::LossyUtf8),
        )
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to load reference table: {}", path.display()))
}

/// Normalized column name -> name as it appears in the file.
fn column_index(df: &DataFrame) -> FxHashMap<String, String> {
    let mut index = FxHashMap::default();
    for name in df.get_column_names() {
        let original = name.to_string();
        index.insert(original.trim().to_lowercase(), original);
    }
    if !index.contains_key("valor_numerico") {
        if let Some(original) = index.get("valor").cloned() {
            index.insert("valor_numerico".to_string(), original);
        }
    }
    index
}

fn text_cells(df: &DataFrame, index: &FxHashMap<String, String>, key: &str) -> Result<Vec<Option<String>>> {
    let Some(original) = index.get(key) else {
        return Ok(vec![None; df.height()]);
    };
    let values = df
        .column(original)
        .with_context(|| format!("Column '{}' not found", original))?
        .str()
        .with_context(|| format!("Column '{}' is not string type", original))?;

    Ok(values
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect())
}

/// Convert an all-text frame into typed records.
fn records_from_frame(df: &DataFrame) -> Result<Vec<IdebRecord>> {
    let index = column_index(df);
    let codes = text_cells(df, &index, "codigo_ibge")?;
    let ufs = text_cells(df, &index, "indicador_uf")?;
    let names = text_cells(df, &index, "indicador_municipio")?;
    let spheres = text_cells(df, &index, "esfera")?;
    let segments = text_cells(df, &index, "segmento")?;
    let indicators = text_cells(df, &index, "indicador_tipo_nome")?;
    let years = text_cells(df, &index, "ano")?;
    let values = text_cells(df, &index, "valor_numerico")?;

    let records = (0..df.height())
        .map(|i| IdebRecord {
            ibge_code: codes[i].clone(),
            uf: ufs[i].clone(),
            municipality: names[i].clone(),
            sphere: spheres[i].as_deref().map(|s| s.to_lowercase()),
            segment: segments[i].as_deref().map(normalize_segment).unwrap_or_default(),
            indicator: indicators[i].clone(),
            year: years[i].as_deref().and_then(parse_number).map(|y| y as i64),
            value: values[i].as_deref().and_then(parse_number),
        })
        .collect();

    Ok(records)
}

/// Group state rows on (indicator, year, segment) and describe the values.
pub fn national_stats(state_rows: &[IdebRecord]) -> Result<Vec<NationalStat>> {
    let keyed: Vec<&IdebRecord> = state_rows
        .iter()
        .filter(|r| r.indicator.is_some() && r.year.is_some())
        .collect();
    if keyed.is_empty() {
        return Ok(Vec::new());
    }

    let indicators: Vec<String> = keyed.iter().map(|r| r.indicator.clone().unwrap_or_default()).collect();
    let years: Vec<i64> = keyed.iter().map(|r| r.year.unwrap_or_default()).collect();
    let segments: Vec<String> = keyed.iter().map(|r| r.segment.clone()).collect();
    let values: Vec<Option<f64>> = keyed.iter().map(|r| r.value).collect();

    let frame = df! {
        "indicador_tipo_nome" => indicators,
        "ano" => years,
        "segmento" => segments,
        "valor_numerico" => values,
    }
    .context("Failed to build state value frame")?;

    let grouped = frame
        .lazy()
        .group_by([col("indicador_tipo_nome"), col("ano"), col("segmento")])
        .agg([
            col("valor_numerico").mean().alias("mean"),
            col("valor_numerico").median().alias("median"),
            col("valor_numerico").std(1).alias("std"),
            col("valor_numerico").min().alias("min"),
            col("valor_numerico").max().alias("max"),
            col("valor_numerico").count().cast(DataType::Int64).alias("count"),
        ])
        .sort(
            ["indicador_tipo_nome", "segmento", "ano"],
            SortMultipleOptions::default(),
        )
        .collect()
        .context("Failed to aggregate national statistics")?;

    let indicator = grouped.column("indicador_tipo_nome")?.str()?;
    let year = grouped.column("ano")?.i64()?;
    let segment = grouped.column("segmento")?.str()?;
    let mean = grouped.column("mean")?.f64()?;
    let median = grouped.column("median")?.f64()?;
    let std = grouped.column("std")?.f64()?;
    let min = grouped.column("min")?.f64()?;
    let max = grouped.column("max")?.f64()?;
    let count = grouped.column("count")?.i64()?;

    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

    Ok((0..grouped.height())
        .map(|i| NationalStat {
            indicator: indicator.get(i).unwrap_or_default().to_string(),
            year: year.get(i).unwrap_or_default(),
            segment: segment.get(i).unwrap_or_default().to_string(),
            mean: finite(mean.get(i)),
            median: finite(median.get(i)),
            std: finite(std.get(i)),
            min: finite(min.get(i)),
            max: finite(max.get(i)),
            count: count.get(i).unwrap_or_default(),
        })
        .collect())
}

impl ReferenceTables {
    /// Load both tables. `Ok(None)` when either file does not exist.
    pub fn load(municipal_path: &Path, state_path: &Path) -> Result<Option<Self>> {
        if !municipal_path.exists() || !state_path.exists() {
            tracing::info!(
                "Reference tables not found ({}, {})",
                municipal_path.display(),
                state_path.display()
            );
            return Ok(None);
        }

        let municipal = records_from_frame(&read_text_frame(municipal_path, b',')?)?;
        let state = records_from_frame(&read_text_frame(state_path, b';')?)?;
        let tables = Self::from_records(municipal, state)?;

        tracing::info!(
            "Loaded reference tables: {} municipal rows, {} state rows, {} national groups",
            tables.municipal.len(),
            tables.state.len(),
            tables.national.len()
        );
        Ok(Some(tables))
    }

    pub fn from_records(municipal: Vec<IdebRecord>, state: Vec<IdebRecord>) -> Result<Self> {
        let national = national_stats(&state)?;
        Ok(Self { municipal, state, national })
    }

    pub fn national(&self) -> &[NationalStat] {
        &self.national
    }

    /// Municipality name and state abbreviation from the municipality table.
    pub fn municipality_label(&self, code: &str) -> Option<(String, String)> {
        self.municipal
            .iter()
            .find(|r| r.ibge_code.as_deref() == Some(code))
            .map(|r| {
                (
                    r.municipality.clone().unwrap_or_else(|| format!("IBGE_{}", code)),
                    r.uf.clone().unwrap_or_else(|| "??".to_string()),
                )
            })
    }

    /// Rows relevant to `code`; `None` when the territory has no primary rows.
    pub fn view(&self, code: &TerritoryCode) -> Option<TerritoryView<'_>> {
        match code.scope() {
            Scope::State(uf) => {
                let abbrev = uf?.abbrev;
                let primary: Vec<&IdebRecord> = self
                    .state
                    .iter()
                    .filter(|r| r.uf.as_deref() == Some(abbrev))
                    .collect();
                if primary.is_empty() {
                    return None;
                }
                Some(TerritoryView { primary, state: Vec::new(), national: &self.national })
            }
            Scope::Municipality => {
                let primary: Vec<&IdebRecord> = self
                    .municipal
                    .iter()
                    .filter(|r| r.ibge_code.as_deref() == Some(code.as_str()))
                    .collect();
                let first = primary.first()?;
                let state = match first.uf.as_deref() {
                    Some(abbrev) => self
                        .state
                        .iter()
                        .filter(|r| r.uf.as_deref() == Some(abbrev))
                        .collect(),
                    None => Vec::new(),
                };
                Some(TerritoryView { primary, state, national: &self.national })
            }
        }
    }
}
