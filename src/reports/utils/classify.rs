//! Classification tiers and trend math used by the report sections.

use super::format::as_percent;
use crate::sources::RateKind;

// ============================================================================
// Proficiency (share of students at adequate level)
// ============================================================================

pub const PROFICIENCY_GOOD: f64 = 70.0;
pub const PROFICIENCY_INTERMEDIATE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proficiency {
    Good,
    Intermediate,
    Critical,
    Unknown,
}

impl Proficiency {
    pub fn classify(adequate: Option<f64>) -> Self {
        match adequate.map(as_percent) {
            None => Proficiency::Unknown,
            Some(p) if p >= PROFICIENCY_GOOD => Proficiency::Good,
            Some(p) if p >= PROFICIENCY_INTERMEDIATE => Proficiency::Intermediate,
            Some(_) => Proficiency::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Proficiency::Good => "Bom desempenho",
            Proficiency::Intermediate => "Desempenho intermediário",
            Proficiency::Critical => "Desempenho crítico - oportunidade de atuação",
            Proficiency::Unknown => "Dados não disponíveis",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Proficiency::Good => "✅",
            Proficiency::Intermediate => "⚠️",
            Proficiency::Critical => "🔴",
            Proficiency::Unknown => "⚪",
        }
    }
}

// ============================================================================
// Pass rates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTier {
    Excellent,
    Good,
    Regular,
    Critical,
    NoData,
}

impl RateTier {
    /// Approval is better when high; failure and dropout when low.
    pub fn classify(value: Option<f64>, kind: RateKind) -> Self {
        let Some(v) = value.map(as_percent) else {
            return RateTier::NoData;
        };
        let (excellent, good, regular) = match kind {
            RateKind::Approval => {
                return if v >= 98.0 {
                    RateTier::Excellent
                } else if v >= 95.0 {
                    RateTier::Good
                } else if v >= 90.0 {
                    RateTier::Regular
                } else {
                    RateTier::Critical
                };
            }
            RateKind::Failure => (1.0, 3.0, 5.0),
            RateKind::Dropout => (0.5, 1.5, 3.0),
        };
        if v <= excellent {
            RateTier::Excellent
        } else if v <= good {
            RateTier::Good
        } else if v <= regular {
            RateTier::Regular
        } else {
            RateTier::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RateTier::Excellent => "Excelente",
            RateTier::Good => "Bom",
            RateTier::Regular => "Regular",
            RateTier::Critical => "Crítico",
            RateTier::NoData => "Sem dados",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            RateTier::Excellent => "✅",
            RateTier::Good => "🟢",
            RateTier::Regular => "🟡",
            RateTier::Critical => "🔴",
            RateTier::NoData => "⚪",
        }
    }
}

// ============================================================================
// Trend
// ============================================================================

/// Linear trend in points per year.
///
/// Least-squares slope over (year, value); when every year is the same the
/// regression is undefined and the endpoint slope is used, and 0 when that
/// is undefined too.
pub fn trend_slope(years: &[f64], values: &[f64]) -> f64 {
    let n = years.len().min(values.len());
    if n < 2 {
        return 0.0;
    }
    let (years, values) = (&years[..n], &values[..n]);

    let mean_x = years.iter().sum::<f64>() / n as f64;
    let mean_y = values.iter().sum::<f64>() / n as f64;
    let sxx: f64 = years.iter().map(|x| (x - mean_x).powi(2)).sum();
    let sxy: f64 = years
        .iter()
        .zip(values)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    if sxx > 0.0 {
        return sxy / sxx;
    }

    let dx = years[n - 1] - years[0];
    if dx == 0.0 {
        0.0
    } else {
        (values[n - 1] - values[0]) / dx
    }
}
