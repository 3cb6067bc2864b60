//! Text formatting shared by every report.
//!
//! Values from the statistics API are ambiguous between a 0-1 fraction and
//! an already-scaled percentage. Anything with |v| <= 1.01 is treated as a
//! fraction. Point differences are computed between normalized values.

use chrono::Local;

pub const LINE: &str = "================================================================================";
pub const SUBLINE: &str = "--------------------------------------------------------------------------------";
pub const STARS: &str = "********************************************************************************";
/// 40-char rule used inside the IDEB report.
pub const SHORT_RULE: &str = "----------------------------------------";

pub const NO_DATA: &str = "sem dados";
pub const NOT_AVAILABLE: &str = "N/D";

pub const DEFAULT_SOURCE: &str = "QEdu (qedu.org.br)";

/// Scale a fraction to a percentage; values above 1.01 are already percentages.
pub fn as_percent(v: f64) -> f64 {
    if v.abs() <= 1.01 {
        v * 100.0
    } else {
        v
    }
}

/// `0.655` and `65.5` both render as `65.5%`.
pub fn pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.1}%", as_percent(v)),
        None => NO_DATA.to_string(),
    }
}

/// Signed point difference between two values, normalized first.
pub fn pp_diff(a: f64, b: f64, decimals: usize) -> String {
    format!("{:+.*}pp", decimals, as_percent(a) - as_percent(b))
}

/// Point difference when both sides exist, empty otherwise.
pub fn pp_diff_opt(a: Option<f64>, b: Option<f64>, decimals: usize) -> String {
    match (a, b) {
        (Some(a), Some(b)) => pp_diff(a, b, decimals),
        _ => String::new(),
    }
}

/// Point difference with the `sem dados` sentinel when a side is missing.
pub fn pp_or_no_data(a: Option<f64>, b: Option<f64>, decimals: usize) -> String {
    match (a, b) {
        (Some(a), Some(b)) => pp_diff(a, b, decimals),
        _ => NO_DATA.to_string(),
    }
}

/// Two-decimal value or `N/D`.
pub fn val(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Integer with comma thousands separators: 12345 -> "12,345".
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn timestamp() -> String {
    Local::now().format("%d/%m/%Y %H:%M").to_string()
}

/// Standard report header.
#[derive(Debug, Clone, Default)]
pub struct Header<'a> {
    title: &'a str,
    territory: &'a str,
    network: Option<&'a str>,
    cycle: Option<&'a str>,
    year: Option<String>,
    period: Option<String>,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str, territory: &'a str) -> Self {
        Self { title, territory, ..Default::default() }
    }

    pub fn network(mut self, network: &'a str) -> Self {
        self.network = Some(network);
        self
    }

    pub fn cycle(mut self, cycle: &'a str) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn year(mut self, year: impl ToString) -> Self {
        self.year = Some(year.to_string());
        self
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn render(&self) -> String {
        let mut out = format!("{LINE}\n{}\n{LINE}\n\n", self.title);
        out += &format!("📍 Território: {}\n", self.territory);
        if let Some(network) = self.network {
            out += &format!("🏫 Rede: {}\n", network);
        }
        if let Some(cycle) = self.cycle {
            out += &format!("📚 Ciclo: {}\n", cycle);
        }
        if let Some(year) = &self.year {
            out += &format!("📅 Ano de referência: {}\n", year);
        }
        if let Some(period) = &self.period {
            out += &format!("📅 Período histórico: {}\n", period);
        }
        out += &format!("📅 Gerado em: {}\n", timestamp());
        out
    }
}

pub fn footer(source: &str) -> String {
    format!("\n\n{LINE}\nFonte: {source}\n{LINE}\n")
}

/// Banner between numbered report parts.
pub fn part_banner(title: &str) -> String {
    format!("{STARS}\n{title}\n{STARS}\n")
}

/// Minimal report used when a category has no data at all.
pub fn no_data_report(header: Header<'_>, message: &str, source: &str) -> String {
    format!("{}\n  ⚠️ {}\n{}", header.render(), message, footer(source))
}

/// Round to two decimals, as used by the structured summary.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
