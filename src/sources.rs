//! Statistics API sources with year fallback
//!
//! Each data category is requested for the newest candidate year first and
//! walks backwards until the API returns a non-empty payload:
//! - census, infrastructure, pass rates: current year and the 5 before it
//! - SAEB proficiency: the odd-year biennial sequence (5 editions)
//!
//! Payloads are exposed as small typed views so the report sections never
//! touch raw JSON.

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::fetch::Fetcher;
use crate::territory::TerritoryCode;
use crate::utils::json::*;

/// Years tried by the census / infrastructure / pass-rate resolvers.
pub const FALLBACK_WINDOW: usize = 6;

/// SAEB editions tried by the learning resolver.
pub const SAEB_EDITIONS: usize = 5;

/// `[current, current-1, ..., current-n+1]`
pub fn candidate_years(current: i32, n: usize) -> Vec<i32> {
    (0..n as i32).map(|i| current - i).collect()
}

/// SAEB runs in odd years: newest odd year not after `current`, stepping back by 2.
pub fn saeb_years(current: i32) -> Vec<i32> {
    let newest = if current.rem_euclid(2) == 1 { current } else { current - 1 };
    (0..SAEB_EDITIONS as i32).map(|i| newest - 2 * i).collect()
}

// ============================================================================
// Dimensions
// ============================================================================

/// School cycle (segment) as identified by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Cycle {
    #[serde(rename = "AI")]
    EarlyYears,
    #[serde(rename = "AF")]
    LaterYears,
    #[serde(rename = "EM")]
    Secondary,
}

pub const CYCLES: [Cycle; 3] = [Cycle::EarlyYears, Cycle::LaterYears, Cycle::Secondary];

impl Cycle {
    pub fn id(self) -> &'static str {
        match self {
            Cycle::EarlyYears => "AI",
            Cycle::LaterYears => "AF",
            Cycle::Secondary => "EM",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cycle::EarlyYears => "Anos Iniciais (1º ao 5º)",
            Cycle::LaterYears => "Anos Finais (6º ao 9º)",
            Cycle::Secondary => "Ensino Médio",
        }
    }

    /// Long label used in the learning report header.
    pub fn label(self) -> &'static str {
        match self {
            Cycle::EarlyYears => "Anos Iniciais do Ensino Fundamental (1º ao 5º)",
            Cycle::LaterYears => "Anos Finais do Ensino Fundamental (6º ao 9º)",
            Cycle::Secondary => "Ensino Médio",
        }
    }
}

/// School network ("dependência administrativa").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    All,
    Federal,
    State,
    Municipal,
    Private,
    Public,
}

impl Network {
    pub fn id(self) -> u8 {
        match self {
            Network::All => 0,
            Network::Federal => 1,
            Network::State => 2,
            Network::Municipal => 3,
            Network::Private => 4,
            Network::Public => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::All => "Todas as redes",
            Network::Federal => "Federal",
            Network::State => "Estadual",
            Network::Municipal => "Municipal",
            Network::Private => "Privada",
            Network::Public => "Pública",
        }
    }
}

/// SAEB subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Portuguese,
    Mathematics,
}

pub const SUBJECTS: [Subject; 2] = [Subject::Portuguese, Subject::Mathematics];

impl Subject {
    pub fn key(self) -> &'static str {
        match self {
            Subject::Portuguese => "lp",
            Subject::Mathematics => "mt",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subject::Portuguese => "Língua Portuguesa",
            Subject::Mathematics => "Matemática",
        }
    }
}

/// SAEB proficiency level, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Adequate,
    Advanced,
    Proficient,
    Basic,
    Insufficient,
}

pub const LEVELS: [Level; 5] = [
    Level::Adequate,
    Level::Advanced,
    Level::Proficient,
    Level::Basic,
    Level::Insufficient,
];

impl Level {
    pub fn key(self) -> &'static str {
        match self {
            Level::Adequate => "adequado",
            Level::Advanced => "avancado",
            Level::Proficient => "proficiente",
            Level::Basic => "basico",
            Level::Insufficient => "insuficiente",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Adequate => "Adequado (Proficiente + Avançado)",
            Level::Advanced => "Avançado",
            Level::Proficient => "Proficiente",
            Level::Basic => "Básico",
            Level::Insufficient => "Insuficiente",
        }
    }
}

// ============================================================================
// Payload views
// ============================================================================

/// `censo` object of the enrollment endpoint for the resolved year.
#[derive(Debug, Clone)]
pub struct CensusSnapshot {
    pub year: i32,
    record: Value,
}

impl CensusSnapshot {
    pub fn new(year: i32, record: Value) -> Self {
        Self { year, record }
    }

    pub fn count(&self, field: &str) -> Option<i64> {
        get_i64(&self.record, field)
    }

    pub fn territory_name(&self) -> Option<&str> {
        self.record.get("territorio").and_then(|t| get_str(t, "nome"))
    }

    pub fn parent_abbrev(&self) -> Option<&str> {
        self.record
            .get("territorio")
            .and_then(|t| t.get("parent"))
            .and_then(|p| get_str(p, "sigla"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfraValue {
    pub entity: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfraItem {
    pub label: String,
    pub values: Vec<InfraValue>,
}

impl InfraItem {
    /// Value reported for `entity` ("Municipio", "Estado", "Brasil"); the last entry wins.
    pub fn value_for(&self, entity: &str) -> Option<f64> {
        self.values
            .iter()
            .rev()
            .find(|v| v.entity == entity)
            .and_then(|v| v.value)
    }
}

/// Infrastructure comparison, items flattened across sections.
#[derive(Debug, Clone)]
pub struct InfraSnapshot {
    pub year: i32,
    pub items: Vec<InfraItem>,
}

impl InfraSnapshot {
    fn from_sections(sections: &[Value], year: i32) -> Self {
        let items = sections
            .iter()
            .filter_map(|s| s.get("items").and_then(|i| i.as_array()))
            .flatten()
            .map(|item| InfraItem {
                label: get_str(item, "label").unwrap_or_default().to_string(),
                values: item
                    .get("values")
                    .and_then(|v| v.as_array())
                    .map(|vals| {
                        vals.iter()
                            .map(|v| InfraValue {
                                entity: get_str(v, "entidade").unwrap_or_default().to_string(),
                                value: get_f64(v, "value"),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();
        Self { year, items }
    }
}

/// One SAEB record (a territory in a given year).
#[derive(Debug, Clone)]
pub struct LearningRecord {
    pub year: i32,
    fields: Value,
}

impl LearningRecord {
    pub fn new(fields: Value) -> Self {
        let year = get_i64(&fields, "ano").unwrap_or(0) as i32;
        Self { year, fields }
    }

    /// Share of students at `level`; adequate falls back to proficient + advanced.
    pub fn level(&self, subject: Subject, level: Level) -> Option<f64> {
        let key = |l: Level| format!("{}_{}", subject.key(), l.key());
        if level != Level::Adequate {
            return get_f64(&self.fields, &key(level));
        }
        if let Some(v) = get_f64(&self.fields, &key(Level::Adequate)) {
            return Some(v);
        }
        let proficient = get_f64(&self.fields, &key(Level::Proficient));
        let advanced = get_f64(&self.fields, &key(Level::Advanced));
        if proficient.is_none() && advanced.is_none() {
            return None;
        }
        Some(proficient.unwrap_or(0.0) + advanced.unwrap_or(0.0))
    }

    pub fn adequate(&self, subject: Subject) -> Option<f64> {
        self.level(subject, Level::Adequate)
    }

    fn territory_field(&self, key: &str) -> Option<&Value> {
        self.fields.get("territorio").and_then(|t| t.get(key))
    }
}

/// SAEB records split by territory, each list sorted by year.
#[derive(Debug, Clone, Default)]
pub struct LearningGroups {
    pub entity: Vec<LearningRecord>,
    /// Similar municipalities / state comparison group.
    pub peers: Vec<LearningRecord>,
    pub brazil: Vec<LearningRecord>,
}

/// IBGE id the API uses for Brazil in learning comparisons.
const BRAZIL_TERRITORY_ID: i64 = 7;

impl LearningGroups {
    pub fn split(payload: &Value, code: &str) -> Self {
        let mut groups = Self::default();
        let Some(outer) = payload.as_array() else {
            return groups;
        };

        for record in outer.iter().filter_map(|g| g.as_array()).flatten() {
            if !record.is_object() {
                continue;
            }
            let record = LearningRecord::new(record.clone());
            let id = record.territory_field("ibge_id");
            let parent = record.territory_field("parent_id").and_then(as_i64);

            if id.and_then(id_string).as_deref() == Some(code) {
                groups.entity.push(record);
            } else if id.and_then(|v| v.as_i64()) == Some(BRAZIL_TERRITORY_ID) {
                groups.brazil.push(record);
            } else if parent.map_or(false, |p| p <= 27) {
                groups.peers.push(record);
            }
        }

        for list in [&mut groups.entity, &mut groups.peers, &mut groups.brazil] {
            list.sort_by_key(|r| r.year);
        }
        groups
    }
}

/// Records compared in the learning report for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct LearningReference<'a> {
    pub entity: &'a LearningRecord,
    pub peers: Option<&'a LearningRecord>,
    pub brazil: Option<&'a LearningRecord>,
}

/// Record for `year`, else the newest one.
fn at_year_or_latest(records: &[LearningRecord], year: i32) -> Option<&LearningRecord> {
    records.iter().rev().find(|r| r.year == year).or_else(|| records.last())
}

impl LearningGroups {
    /// Entity record of the newest SAEB edition in `editions` (newest first),
    /// falling back to the latest record, plus the comparison records of that year.
    pub fn reference(&self, editions: &[i32]) -> Option<LearningReference<'_>> {
        let latest = self.entity.last()?;
        let entity = editions
            .iter()
            .find_map(|year| self.entity.iter().rev().find(|r| r.year == *year))
            .unwrap_or(latest);
        Some(LearningReference {
            entity,
            peers: at_year_or_latest(&self.peers, entity.year),
            brazil: at_year_or_latest(&self.brazil, entity.year),
        })
    }

    /// Entity record for `year` (the last one when repeated).
    pub fn entity_at(&self, year: i32) -> Option<&LearningRecord> {
        self.entity.iter().rev().find(|r| r.year == year)
    }
}

/// Approval / failure / dropout for one territory-year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateRecord {
    pub year: Option<i32>,
    pub approval: Option<f64>,
    pub failure: Option<f64>,
    pub dropout: Option<f64>,
    pub territory_name: Option<String>,
    pub territory_abbrev: Option<String>,
}

impl RateRecord {
    fn from_value(reg: &Value) -> Self {
        let inner = reg.get("rendimento").filter(|v| v.is_object()).unwrap_or(reg);
        let territory = inner.get("territorio");
        Self {
            year: get_i64(reg, "ano").or_else(|| get_i64(inner, "ano")).map(|y| y as i32),
            approval: get_f64(inner, "aprovados"),
            failure: get_f64(inner, "reprovados"),
            dropout: get_f64(inner, "abandonos"),
            territory_name: territory.and_then(|t| get_str(t, "nome")).map(str::to_string),
            territory_abbrev: territory.and_then(|t| get_str(t, "sigla")).map(str::to_string),
        }
    }

    pub fn rate(&self, kind: RateKind) -> Option<f64> {
        match kind {
            RateKind::Approval => self.approval,
            RateKind::Failure => self.failure,
            RateKind::Dropout => self.dropout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Approval,
    Failure,
    Dropout,
}

pub const RATE_KINDS: [RateKind; 3] = [RateKind::Approval, RateKind::Failure, RateKind::Dropout];

impl RateKind {
    pub fn label(self) -> &'static str {
        match self {
            RateKind::Approval => "Aprovação",
            RateKind::Failure => "Reprovação",
            RateKind::Dropout => "Abandono",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateScope {
    Entity,
    State,
    Brazil,
}

/// Pass-rate comparison with the `entidade`/`parent` keys normalized.
#[derive(Debug, Clone, Default)]
pub struct RatesSnapshot {
    /// Most recent year present in the records (falls back to the requested year).
    pub year: i32,
    pub entity: Vec<RateRecord>,
    pub state: Vec<RateRecord>,
    pub brazil: Vec<RateRecord>,
}

impl RatesSnapshot {
    /// Whether the raw comparison payload carries any territory data.
    pub fn has_data(raw: &Value) -> bool {
        has_truthy(raw, "entidade") || has_truthy(raw, "municipio") || has_truthy(raw, "brasil")
    }

    pub fn from_value(raw: &Value, requested_year: i32) -> Self {
        let list = |primary: &str, alias: &str| -> Vec<RateRecord> {
            [primary, alias]
                .iter()
                .filter_map(|k| raw.get(*k))
                .find(|v| truthy(v))
                .and_then(|v| v.as_array())
                .map(|regs| regs.iter().filter(|r| r.is_object()).map(RateRecord::from_value).collect())
                .unwrap_or_default()
        };

        let mut snapshot = Self {
            year: requested_year,
            entity: list("entidade", "municipio"),
            state: list("parent", "estado"),
            brazil: list("brasil", "brasil"),
        };

        let newest = [&snapshot.entity, &snapshot.state, &snapshot.brazil]
            .iter()
            .flat_map(|regs| regs.iter())
            .filter_map(|r| r.year)
            .max()
            .unwrap_or(0);
        if newest > 0 {
            snapshot.year = newest;
        }
        snapshot
    }

    pub fn records(&self, scope: RateScope) -> &[RateRecord] {
        match scope {
            RateScope::Entity => &self.entity,
            RateScope::State => &self.state,
            RateScope::Brazil => &self.brazil,
        }
    }

    /// Latest record by year; on ties the later entry wins.
    pub fn latest(&self, scope: RateScope) -> Option<&RateRecord> {
        self.records(scope)
            .iter()
            .fold(None, |best: Option<&RateRecord>, r| match best {
                Some(b) if r.year.unwrap_or(0) < b.year.unwrap_or(0) => Some(b),
                _ => Some(r),
            })
    }

    /// State display name taken from the first state record.
    pub fn state_name(&self) -> String {
        self.state
            .first()
            .map(|r| r.territory_name.clone().unwrap_or_else(|| "Estado".to_string()))
            .unwrap_or_else(|| "Estado".to_string())
    }

    /// Distinct entity years, ascending.
    pub fn entity_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.entity.iter().filter_map(|r| r.year).filter(|y| *y != 0).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

// ============================================================================
// Resolvers
// ============================================================================

/// Year-fallback access to the statistics API for one territory.
pub struct Sources<'a> {
    fetcher: &'a Fetcher,
    base_url: &'a str,
    code: &'a TerritoryCode,
    reference_year: i32,
}

impl<'a> Sources<'a> {
    pub fn new(fetcher: &'a Fetcher, base_url: &'a str, code: &'a TerritoryCode, reference_year: i32) -> Self {
        Self { fetcher, base_url, code, reference_year }
    }

    pub fn code(&self) -> &TerritoryCode {
        self.code
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    fn years(&self) -> Vec<i32> {
        candidate_years(self.reference_year, FALLBACK_WINDOW)
    }

    /// Enrollment census, newest year with a non-empty `censo` object.
    pub fn census(&self, network: Network) -> Option<CensusSnapshot> {
        let url = format!("{}/censo/territorios/matriculas", self.base_url);
        for year in self.years() {
            let params = [
                ("ibge_id", self.code.to_string()),
                ("ano", year.to_string()),
                ("dependencia_id", network.id().to_string()),
                ("localizacao_id", "0".to_string()),
                ("oferta_id", "0".to_string()),
            ];
            let Some(raw) = self.fetcher.get_json(&url, &params) else {
                continue;
            };
            if let Some(censo) = raw.get("censo").filter(|c| truthy(c)) {
                tracing::debug!("Census for {} resolved to {}", self.code, year);
                return Some(CensusSnapshot::new(year, censo.clone()));
            }
        }
        None
    }

    /// Infrastructure comparison, newest year where some item has values.
    pub fn infrastructure(&self, network: Network) -> Option<InfraSnapshot> {
        let url = format!("{}/infra/{}/comparativo", self.base_url, self.code);
        for year in self.years() {
            let params = [
                ("dependencia_id", network.id().to_string()),
                ("ano", year.to_string()),
            ];
            let Some(raw) = self.fetcher.get_json(&url, &params) else {
                continue;
            };
            let Some(sections) = raw.as_array() else {
                continue;
            };
            let has_values = sections
                .iter()
                .filter_map(|s| s.get("items").and_then(|i| i.as_array()))
                .flatten()
                .any(|item| has_truthy(item, "values"));
            if has_values {
                tracing::debug!("Infrastructure for {} resolved to {}", self.code, year);
                return Some(InfraSnapshot::from_sections(sections, year));
            }
        }
        None
    }

    /// Latest SAEB comparison for a cycle (the endpoint returns every edition).
    pub fn learning(&self, network: Network, cycle: Cycle) -> LearningGroups {
        let url = format!("{}/aprendizado/{}/ultimos-comparativo", self.base_url, self.code);
        let params = [
            ("dependencia_id", network.id().to_string()),
            ("ciclo_id", cycle.id().to_string()),
        ];
        self.fetcher
            .get_json(&url, &params)
            .map(|raw| LearningGroups::split(&raw, self.code.as_str()))
            .unwrap_or_default()
    }

    /// Raw pass-rate comparison for one year (memoized, no fallback).
    pub fn pass_rates_raw(&self, cycle: Cycle, network: Network, year: i32) -> Option<Rc<Value>> {
        let url = format!(
            "{}/taxa-rendimento/taxa-rendimento/{}/comparacao",
            self.base_url, self.code
        );
        let params = [
            ("dependencia_id", network.id().to_string()),
            ("ano", year.to_string()),
            ("ciclo_id", cycle.id().to_string()),
            ("localizacao_id", "0".to_string()),
        ];
        self.fetcher.get_json(&url, &params)
    }

    /// Pass rates for all networks, newest year with territory data.
    pub fn pass_rates(&self, cycle: Cycle) -> Option<RatesSnapshot> {
        for year in self.years() {
            let Some(raw) = self.pass_rates_raw(cycle, Network::All, year) else {
                continue;
            };
            if RatesSnapshot::has_data(&raw) {
                let snapshot = RatesSnapshot::from_value(&raw, year);
                tracing::debug!(
                    "Pass rates {} for {} resolved to {} (data year {})",
                    cycle.id(),
                    self.code,
                    year,
                    snapshot.year
                );
                return Some(snapshot);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_years() {
        assert_eq!(candidate_years(2026, 6), vec![2026, 2025, 2024, 2023, 2022, 2021]);
    }

    #[test]
    fn test_saeb_years_are_odd() {
        assert_eq!(saeb_years(2026), vec![2025, 2023, 2021, 2019, 2017]);
        assert_eq!(saeb_years(2025), vec![2025, 2023, 2021, 2019, 2017]);
    }

    #[test]
    fn test_adequate_falls_back_to_sum() {
        let rec = LearningRecord::new(json!({"ano": 2023, "lp_proficiente": 0.3, "lp_avancado": 0.1, "mt_adequado": 0.5}));
        assert!((rec.adequate(Subject::Portuguese).unwrap() - 0.4).abs() < 1e-9);
        assert_eq!(rec.adequate(Subject::Mathematics), Some(0.5));

        let empty = LearningRecord::new(json!({"ano": 2023}));
        assert_eq!(empty.adequate(Subject::Portuguese), None);

        let partial = LearningRecord::new(json!({"lp_avancado": 0.2}));
        assert_eq!(partial.adequate(Subject::Portuguese), Some(0.2));
    }

    #[test]
    fn test_learning_split_by_territory() {
        let payload = json!([
            [
                {"ano": 2023, "territorio": {"ibge_id": 2304400, "parent_id": 23}},
                {"ano": 2021, "territorio": {"ibge_id": "2304400", "parent_id": 23}}
            ],
            [{"ano": 2023, "territorio": {"ibge_id": 7}}],
            [{"ano": 2023, "territorio": {"ibge_id": 9999, "parent_id": 23}}],
            [{"ano": 2023, "territorio": {"ibge_id": 8888, "parent_id": 99}}]
        ]);
        let groups = LearningGroups::split(&payload, "2304400");
        assert_eq!(groups.entity.len(), 2);
        assert_eq!(groups.entity[0].year, 2021);
        assert_eq!(groups.brazil.len(), 1);
        assert_eq!(groups.peers.len(), 1);
    }

    #[test]
    fn test_learning_reference_prefers_saeb_edition() {
        let payload = json!([[
            {"ano": 2021, "territorio": {"ibge_id": 2304400}},
            {"ano": 2023, "territorio": {"ibge_id": 2304400}},
            {"ano": 2024, "territorio": {"ibge_id": 2304400}},
            {"ano": 2021, "territorio": {"ibge_id": 7}},
            {"ano": 2023, "territorio": {"ibge_id": 7}}
        ]]);
        let groups = LearningGroups::split(&payload, "2304400");
        let reference = groups.reference(&saeb_years(2026)).unwrap();
        assert_eq!(reference.entity.year, 2023);
        assert_eq!(reference.brazil.unwrap().year, 2023);
        assert!(reference.peers.is_none());

        let fallback = groups.reference(&[2019]).unwrap();
        assert_eq!(fallback.entity.year, 2024);
        assert_eq!(fallback.brazil.unwrap().year, 2023);

        assert!(LearningGroups::default().reference(&[2023]).is_none());
    }

    #[test]
    fn test_rates_snapshot_normalizes_keys_and_year() {
        let raw = json!({
            "entidade": [
                {"ano": 2022, "rendimento": {"aprovados": 0.95, "reprovados": 0.03, "abandonos": 0.02,
                    "territorio": {"nome": "Fortaleza"}}},
                {"ano": 2023, "rendimento": {"aprovados": 0.97, "reprovados": 0.02, "abandonos": 0.01}}
            ],
            "parent": [{"ano": 2023, "rendimento": {"aprovados": 0.96, "territorio": {"nome": "Ceará", "sigla": "CE"}}}],
            "brasil": []
        });
        assert!(RatesSnapshot::has_data(&raw));
        let snap = RatesSnapshot::from_value(&raw, 2026);
        assert_eq!(snap.year, 2023);
        assert_eq!(snap.entity.len(), 2);
        assert_eq!(snap.latest(RateScope::Entity).unwrap().approval, Some(0.97));
        assert_eq!(snap.state_name(), "Ceará");
        assert!(snap.latest(RateScope::Brazil).is_none());
        assert_eq!(snap.entity_years(), vec![2022, 2023]);
    }

    #[test]
    fn test_rates_without_data() {
        assert!(!RatesSnapshot::has_data(&json!({"entidade": [], "brasil": null})));
    }

    #[test]
    fn test_infra_value_last_entry_wins() {
        let item = InfraItem {
            label: "Internet".to_string(),
            values: vec![
                InfraValue { entity: "Municipio".into(), value: Some(0.5) },
                InfraValue { entity: "Municipio".into(), value: Some(0.7) },
                InfraValue { entity: "Brasil".into(), value: None },
            ],
        };
        assert_eq!(item.value_for("Municipio"), Some(0.7));
        assert_eq!(item.value_for("Brasil"), None);
        assert_eq!(item.value_for("Estado"), None);
    }
}
