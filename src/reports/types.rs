//! Shared data types for report generation.
//!
//! JSON field names are part of the public contract (HTTP API and the
//! structured summary consumed downstream) and stay in Portuguese.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::sources::Cycle;
use crate::utils::text::slug;

/// The five text reports, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReportKind {
    #[serde(rename = "aprendizado")]
    Learning,
    #[serde(rename = "infra")]
    Infrastructure,
    #[serde(rename = "censo")]
    Census,
    #[serde(rename = "ideb")]
    Ideb,
    #[serde(rename = "taxa_rendimento")]
    PassRates,
}

pub const REPORT_KINDS: [ReportKind; 5] = [
    ReportKind::Learning,
    ReportKind::Infrastructure,
    ReportKind::Census,
    ReportKind::Ideb,
    ReportKind::PassRates,
];

impl ReportKind {
    /// Stable key used in JSON, file names and the `tipo` query parameter.
    pub fn key(self) -> &'static str {
        match self {
            ReportKind::Learning => "aprendizado",
            ReportKind::Infrastructure => "infra",
            ReportKind::Census => "censo",
            ReportKind::Ideb => "ideb",
            ReportKind::PassRates => "taxa_rendimento",
        }
    }

    /// Case-insensitive lookup by key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        REPORT_KINDS.iter().copied().find(|k| k.key() == key)
    }

    pub fn keys() -> Vec<&'static str> {
        REPORT_KINDS.iter().map(|k| k.key()).collect()
    }
}

// ============================================================================
// Structured summary
// ============================================================================

/// Level percentages (keys `adequado`, `avancado`, ...) for one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectLevels {
    #[serde(rename = "entidade")]
    pub entity: BTreeMap<&'static str, f64>,
    #[serde(rename = "brasil")]
    pub brazil: BTreeMap<&'static str, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningSummary {
    #[serde(rename = "ano")]
    pub year: i32,
    /// Subject display name -> levels.
    #[serde(rename = "disciplinas")]
    pub subjects: BTreeMap<&'static str, SubjectLevels>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CensusSummary {
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "qtd_escolas")]
    pub schools: Option<i64>,
    /// Stage label -> enrollment.
    #[serde(rename = "matriculas")]
    pub enrollment: BTreeMap<&'static str, i64>,
    #[serde(rename = "total_matriculas")]
    pub total_enrollment: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfraSummary {
    #[serde(rename = "ano")]
    pub year: i32,
    /// Item label -> lowercase entity (`municipio`, `estado`, `brasil`) -> percentage.
    #[serde(rename = "indicadores")]
    pub indicators: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatesSummary {
    #[serde(rename = "nome")]
    pub name: &'static str,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "aprovacao_pct")]
    pub approval_pct: Option<f64>,
    #[serde(rename = "reprovacao_pct")]
    pub failure_pct: Option<f64>,
    #[serde(rename = "abandono_pct")]
    pub dropout_pct: Option<f64>,
}

/// Compact numeric view of the data behind the reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredSummary {
    #[serde(rename = "entidade")]
    pub entity: String,
    pub uf: String,
    #[serde(rename = "tipo")]
    pub kind: &'static str,
    #[serde(rename = "aprendizado", skip_serializing_if = "Option::is_none")]
    pub learning: Option<BTreeMap<Cycle, LearningSummary>>,
    #[serde(rename = "censo", skip_serializing_if = "Option::is_none")]
    pub census: Option<CensusSummary>,
    #[serde(rename = "infra", skip_serializing_if = "Option::is_none")]
    pub infrastructure: Option<InfraSummary>,
    #[serde(rename = "taxa_rendimento", skip_serializing_if = "Option::is_none")]
    pub pass_rates: Option<BTreeMap<Cycle, RatesSummary>>,
}

// ============================================================================
// Bundle
// ============================================================================

/// Result of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    #[serde(rename = "municipio")]
    pub entity: String,
    pub uf: String,
    pub ibge: String,
    #[serde(rename = "tipo")]
    pub kind: &'static str,
    #[serde(rename = "relatorios")]
    pub reports: BTreeMap<ReportKind, String>,
    #[serde(rename = "dados")]
    pub summary: StructuredSummary,
}

impl ReportBundle {
    pub fn report(&self, kind: ReportKind) -> Option<&str> {
        self.reports.get(&kind).map(String::as_str)
    }

    /// `<slug>_<kind>.txt`
    pub fn file_name(&self, kind: ReportKind) -> String {
        format!("{}_{}.txt", slug(&self.entity), kind.key())
    }

    /// Write every report under `dir` (created if needed).
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let mut written = Vec::with_capacity(self.reports.len());
        for (kind, text) in &self.reports {
            let path = dir.join(self.file_name(*kind));
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}
