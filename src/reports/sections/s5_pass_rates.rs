//! S5: Pass rates (approval, failure, dropout)
//!
//! All networks, one comparison per cycle. The most recent entity record of
//! each cycle drives the stage table and the diagnosis; the first cycle with
//! data drives the comparison and the historical tables.

use crate::entity::Entity;
use crate::reports::utils::*;
use crate::sources::{Cycle, RateKind, RateRecord, RateScope, RatesSnapshot, Sources, CYCLES, RATE_KINDS};

const TITLE: &str = "RELATÓRIO DE TAXAS DE RENDIMENTO - DADOS QEDU";
const SOURCE: &str = "QEdu - Taxas de Rendimento / INEP (qedu.org.br)";

/// Part 3 shows at most this many years when the history is longer than [`LONG_HISTORY`].
const RECENT_YEARS: usize = 3;
const LONG_HISTORY: usize = 5;

const FAILURE_ALERT: f64 = 5.0;
const DROPOUT_ALERT: f64 = 3.0;
const APPROVAL_HIGHLIGHT: f64 = 98.0;

/// Differences inside this band (in points) count as equal.
const EQUAL_BAND: f64 = 0.005;

/// One cycle's snapshot and its latest entity record.
struct Stage {
    cycle: Cycle,
    snapshot: RatesSnapshot,
}

impl Stage {
    fn latest(&self) -> Option<&RateRecord> {
        self.snapshot.latest(RateScope::Entity)
    }

    fn rate(&self, kind: RateKind) -> Option<f64> {
        self.latest().and_then(|r| r.rate(kind))
    }
}

/// Whether a positive point difference is an improvement for this rate.
fn higher_is_better(kind: RateKind) -> bool {
    kind == RateKind::Approval
}

fn point_diff(a: f64, b: f64) -> f64 {
    as_percent(a) - as_percent(b)
}

fn comparison_word(kind: RateKind, dpp: f64) -> &'static str {
    let dpp = if higher_is_better(kind) { dpp } else { -dpp };
    match (higher_is_better(kind), dpp) {
        (true, d) if d > EQUAL_BAND => "✅ acima",
        (true, d) if d < -EQUAL_BAND => "🔴 abaixo",
        (false, d) if d > EQUAL_BAND => "✅ melhor",
        (false, d) if d < -EQUAL_BAND => "🔴 pior",
        _ => "➡️ igual",
    }
}

fn evolution_word(kind: RateKind, dpp: f64) -> &'static str {
    let dpp = if higher_is_better(kind) { dpp } else { -dpp };
    if dpp > EQUAL_BAND {
        "📈 Melhora"
    } else if dpp < -EQUAL_BAND {
        "📉 Piora"
    } else {
        "➡️ Estável"
    }
}

/// Years for the history table: the latest few when the series is long.
fn history_years(mut years: Vec<i32>) -> Vec<i32> {
    if years.len() > LONG_HISTORY {
        years.drain(..years.len() - RECENT_YEARS);
    }
    years
}

pub fn generate(sources: &Sources, entity: &Entity) -> String {
    let name = entity.name.as_str();
    let stages: Vec<Stage> = CYCLES
        .iter()
        .filter_map(|&cycle| sources.pass_rates(cycle).map(|snapshot| Stage { cycle, snapshot }))
        .collect();

    let Some(year) = stages.iter().map(|s| s.snapshot.year).max().filter(|y| *y > 0) else {
        return no_data_report(Header::new(TITLE, name), "Sem dados.", DEFAULT_SOURCE);
    };
    let stage_for = |cycle: Cycle| stages.iter().find(|s| s.cycle == cycle);

    let mut all_years: Vec<i32> = stages.iter().flat_map(|s| s.snapshot.entity_years()).collect();
    all_years.sort_unstable();
    all_years.dedup();
    let period = match (all_years.first(), all_years.last()) {
        (Some(first), Some(last)) if all_years.len() >= 2 => format!("{} a {}", first, last),
        _ => year.to_string(),
    };

    let mut out = Header::new(TITLE, name).year(year).period(period.clone()).render();
    out += "\n";

    // Part 1: rates per stage
    out += &format!("\n{}\n", part_banner("PARTE 1: TAXAS DE RENDIMENTO POR ETAPA"));
    out += &format!("{:>28} {:>10} {:>11} {:>9}\n", "Etapa", "Aprovação", "Reprovação", "Abandono");
    for cycle in CYCLES {
        match stage_for(cycle).filter(|s| s.rate(RateKind::Approval).is_some()) {
            Some(stage) => {
                out += &format!(
                    "{:>28} {:>10} {:>11} {:>9}\n",
                    cycle.name(),
                    pct(stage.rate(RateKind::Approval)),
                    pct(stage.rate(RateKind::Failure)),
                    pct(stage.rate(RateKind::Dropout))
                );
            }
            None => {
                out += &format!("{:>28} {:>10} {:>11} {:>9}\n", cycle.name(), NO_DATA, NO_DATA, NO_DATA);
            }
        }
    }

    // Part 2: comparison for the first stage with data
    let lead = stages.first();
    let state_name = lead.map(|s| s.snapshot.state_name()).unwrap_or_else(|| "Estado".to_string());

    out += &format!(
        "\n\n{}\n",
        part_banner(&format!("PARTE 2: COMPARATIVO {} - MUNICÍPIO vs ESTADO vs BRASIL", year))
    );
    if let Some(stage) = lead {
        out += &comparison_table(&stage.snapshot);
    }

    // Part 3: history
    out += &format!("\n\n{}\n", part_banner(&format!("PARTE 3: EVOLUÇÃO HISTÓRICA ({})", period)));
    for stage in &stages {
        let years = history_years(stage.snapshot.entity_years());
        if years.len() < 2 {
            continue;
        }
        out += &history_table(&stage.snapshot, &years, &state_name);
        break;
    }

    // Qualitative analysis
    out += &format!("\n\n{LINE}\nANÁLISE QUALITATIVA - TAXAS DE RENDIMENTO\n{LINE}\n");
    out += &format!("\n{SUBLINE}\n📊 DIAGNÓSTICO POR ETAPA DE ENSINO\n{SUBLINE}\n");

    let mut alerts: Vec<String> = Vec::new();
    let mut highlights: Vec<String> = Vec::new();

    for cycle in CYCLES {
        let Some(stage) = stage_for(cycle).filter(|s| s.rate(RateKind::Approval).is_some()) else {
            out += &format!("\n   📌 {}: sem dados disponíveis\n", cycle.name().to_uppercase());
            continue;
        };

        out += &format!("\n   📌 {}\n\n", cycle.name().to_uppercase());
        for kind in RATE_KINDS {
            let value = stage.rate(kind);
            let tier = RateTier::classify(value, kind);
            out += &format!("      {} {}: {} - {}\n", tier.emoji(), kind.label(), pct(value), tier.label());
        }

        let as_pct = |kind: RateKind| stage.rate(kind).map(as_percent).unwrap_or(0.0);
        let failure = as_pct(RateKind::Failure);
        let dropout = as_pct(RateKind::Dropout);
        let approval = as_pct(RateKind::Approval);
        if failure > FAILURE_ALERT {
            alerts.push(format!("{}: Alta reprovação ({:.1}%)", cycle.name(), failure));
        }
        if dropout > DROPOUT_ALERT {
            alerts.push(format!("{}: Alto abandono ({:.1}%)", cycle.name(), dropout));
        }
        if approval >= APPROVAL_HIGHLIGHT {
            highlights.push(format!("{}: Excelente aprovação ({:.1}%)", cycle.name(), approval));
        }
    }

    out += &format!(
        "\n{SUBLINE}\n📈 COMPARATIVO {}: {} vs {} vs BRASIL\n{SUBLINE}\n",
        year,
        name.to_uppercase(),
        state_name.to_uppercase()
    );
    if let Some(stage) = stages.iter().find(|s| s.latest().is_some()) {
        out += &comparison_lines(&stage.snapshot, name, &state_name);
    }

    if let Some(stage) = lead {
        out += &evolution_lines(&stage.snapshot, &period);
    }

    if !alerts.is_empty() {
        out += &format!("\n{SUBLINE}\n🚨 ALERTAS\n{SUBLINE}\n\n");
        for alert in &alerts {
            out += &format!("   ⚠️ {}\n", alert);
        }
    }

    if !highlights.is_empty() {
        out += &format!("\n{SUBLINE}\n🌟 DESTAQUES POSITIVOS\n{SUBLINE}\n\n");
        for highlight in &highlights {
            out += &format!("   ✅ {}\n", highlight);
        }
    }

    out += &format!("\n{SUBLINE}\n💡 CONCLUSÃO E RECOMENDAÇÕES\n{SUBLINE}\n\n");
    out += &conclusion(name, alerts.len());

    out += &footer(SOURCE);
    out
}

fn comparison_table(snapshot: &RatesSnapshot) -> String {
    let Some(entity) = snapshot.latest(RateScope::Entity) else {
        return String::new();
    };
    let state = snapshot.latest(RateScope::State);
    let brazil = snapshot.latest(RateScope::Brazil);

    let mut out = format!(
        "{:>10} {:>10} {:>7} {:>7} {:>10} {:>10}\n",
        "Indicador", "Município", "Estado", "Brasil", "vs Estado", "vs Brasil"
    );
    for kind in RATE_KINDS {
        let vm = entity.rate(kind);
        let ve = state.and_then(|r| r.rate(kind));
        let vb = brazil.and_then(|r| r.rate(kind));
        out += &format!(
            "{:>10} {:>10} {:>7} {:>7} {:>10} {:>10}\n",
            kind.label(),
            pct(vm),
            pct(ve),
            pct(vb),
            pp_or_no_data(vm, ve, 2),
            pp_or_no_data(vm, vb, 2)
        );
    }
    out
}

fn history_table(snapshot: &RatesSnapshot, years: &[i32], state_name: &str) -> String {
    let year_columns: String = years.iter().map(|y| format!("{:>6}", y)).collect();
    let mut out = format!("{:>10} {:>10} {} {:>10}\n", "Indicador", "Entidade", year_columns, "Variação");

    for kind in RATE_KINDS {
        for (scope, label) in [
            (RateScope::Entity, "Município"),
            (RateScope::State, state_name),
            (RateScope::Brazil, "Brasil"),
        ] {
            let records = snapshot.records(scope);
            // Later records win for repeated years.
            let value_at = |year: i32| {
                records
                    .iter()
                    .rev()
                    .find(|r| r.year == Some(year))
                    .and_then(|r| r.rate(kind))
            };
            let values: Vec<Option<f64>> = years.iter().map(|y| value_at(*y)).collect();
            let cells: String = values.iter().map(|v| format!("{:>6}", pct(*v))).collect();

            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let variation = match (present.first(), present.last()) {
                (Some(first), Some(last)) => pp_diff(*last, *first, 2),
                _ => String::new(),
            };
            out += &format!("{:>10} {:>10} {} {:>10}\n", kind.label(), label, cells, variation);
        }
    }
    out
}

fn comparison_lines(snapshot: &RatesSnapshot, name: &str, state_name: &str) -> String {
    let Some(entity) = snapshot.latest(RateScope::Entity) else {
        return String::new();
    };
    let state = snapshot.latest(RateScope::State);
    let brazil = snapshot.latest(RateScope::Brazil);

    let mut out = String::new();
    for kind in RATE_KINDS {
        let vm = entity.rate(kind);
        let ve = state.and_then(|r| r.rate(kind));
        let vb = brazil.and_then(|r| r.rate(kind));

        out += &format!("\n   {}:\n", kind.label());
        out += &format!("      • {}: {}\n", name, pct(vm));
        if ve.is_some() {
            out += &format!("      • {}: {}\n", state_name, pct(ve));
        }
        if vb.is_some() {
            out += &format!("      • Brasil: {}\n", pct(vb));
        }

        for (other, target) in [(ve, "do estado"), (vb, "do Brasil")] {
            if let (Some(m), Some(o)) = (vm, other) {
                let dpp = point_diff(m, o);
                out += &format!("      → {} {} ({:+.2}pp)\n", comparison_word(kind, dpp), target, dpp);
            }
        }
    }
    out
}

fn evolution_lines(snapshot: &RatesSnapshot, period: &str) -> String {
    let mut records: Vec<&RateRecord> = snapshot.records(RateScope::Entity).iter().collect();
    if records.len() < 2 {
        return String::new();
    }
    records.sort_by_key(|r| r.year.unwrap_or(0));
    let (first, last) = (records[0], records[records.len() - 1]);

    let mut out = format!("\n{SUBLINE}\n📅 EVOLUÇÃO TEMPORAL ({})\n{SUBLINE}\n", period);
    for kind in RATE_KINDS {
        let (Some(a), Some(b)) = (first.rate(kind), last.rate(kind)) else {
            continue;
        };
        let dpp = point_diff(b, a);
        if kind == RateKind::Approval {
            out += "\n";
        }
        out += &format!(
            "   {}: {} → {} ({:+.2}pp) {}\n",
            kind.label(),
            pct(Some(a)),
            pct(Some(b)),
            dpp,
            evolution_word(kind, dpp)
        );
    }
    out
}

fn conclusion(name: &str, alerts: usize) -> String {
    match alerts {
        0 => format!(
            "   ✅ {name} apresenta EXCELENTES taxas de rendimento escolar.\n\
             \x20  O fluxo escolar está saudável, com baixa reprovação e abandono.\n\n\
             \x20  💼 Abordagem comercial: Focar em soluções de EXCELÊNCIA\n\
             \x20  e enriquecimento curricular para manter os bons indicadores.\n"
        ),
        1 | 2 => format!(
            "   ⚠️ {name} apresenta BOAS taxas, com pontos de atenção.\n\n\
             \x20  💼 Abordagem: soluções direcionadas para etapas problemáticas.\n"
        ),
        _ => format!(
            "   🔴 {name} apresenta DESAFIOS no fluxo escolar.\n\n\
             \x20  💼 Abordagem: RECUPERAÇÃO e reforço escolar. Grande potencial de mercado.\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> RatesSnapshot {
        RatesSnapshot::from_value(
            &json!({
                "entidade": [
                    {"ano": 2022, "aprovados": 0.95, "reprovados": 0.04, "abandonos": 0.01},
                    {"ano": 2023, "aprovados": 0.97, "reprovados": 0.02, "abandonos": 0.01},
                ],
                "parent": [
                    {"ano": 2023, "rendimento": {"aprovados": 96.0, "reprovados": 3.0, "abandonos": 1.0,
                        "territorio": {"nome": "Ceará", "sigla": "CE"}}},
                ],
                "brasil": [
                    {"ano": 2023, "aprovados": 0.94, "reprovados": 0.04, "abandonos": 0.02},
                ],
            }),
            2024,
        )
    }

    #[test]
    fn test_history_years_keep_latest_three_of_long_series() {
        assert_eq!(history_years(vec![2017, 2018, 2019, 2020, 2021, 2022]), vec![2020, 2021, 2022]);
        assert_eq!(history_years(vec![2019, 2020, 2021, 2022, 2023]).len(), 5);
    }

    #[test]
    fn test_comparison_words() {
        assert_eq!(comparison_word(RateKind::Approval, 1.0), "✅ acima");
        assert_eq!(comparison_word(RateKind::Approval, -1.0), "🔴 abaixo");
        assert_eq!(comparison_word(RateKind::Failure, -1.0), "✅ melhor");
        assert_eq!(comparison_word(RateKind::Dropout, 1.0), "🔴 pior");
        assert_eq!(comparison_word(RateKind::Dropout, 0.001), "➡️ igual");
        assert_eq!(evolution_word(RateKind::Failure, -2.0), "📈 Melhora");
        assert_eq!(evolution_word(RateKind::Approval, -2.0), "📉 Piora");
    }

    #[test]
    fn test_comparison_table_normalizes_each_side() {
        let table = comparison_table(&snapshot());
        let row = format!(
            "{:>10} {:>10} {:>7} {:>7} {:>10} {:>10}\n",
            "Aprovação", "97.0%", "96.0%", "94.0%", "+1.00pp", "+3.00pp"
        );
        assert!(table.contains(&row), "{}", table);
    }

    #[test]
    fn test_comparison_lines_use_state_name() {
        let text = comparison_lines(&snapshot(), "Sobral", "Ceará");
        assert!(text.contains("      • Ceará: 96.0%\n"));
        assert!(text.contains("      → ✅ acima do estado (+1.00pp)\n"));
        assert!(text.contains("      → ✅ melhor do Brasil (-2.00pp)\n"));
    }

    #[test]
    fn test_history_table_marks_missing_years() {
        let text = history_table(&snapshot(), &[2022, 2023], "Ceará");
        let state_row = format!("{:>10} {:>10} {:>6}{:>6} {:>10}\n", "Aprovação", "Ceará", NO_DATA, "96.0%", "+0.00pp");
        assert!(text.contains(&state_row), "{}", text);
    }

    #[test]
    fn test_evolution_lines() {
        let text = evolution_lines(&snapshot(), "2022 a 2023");
        assert!(text.contains("\n   Aprovação: 95.0% → 97.0% (+2.00pp) 📈 Melhora\n"));
        assert!(text.contains("   Reprovação: 4.0% → 2.0% (-2.00pp) 📈 Melhora\n"));
        assert!(text.contains("   Abandono: 1.0% → 1.0% (+0.00pp) ➡️ Estável\n"));
    }

    #[test]
    fn test_conclusion_by_alert_count() {
        assert!(conclusion("X", 0).contains("EXCELENTES"));
        assert!(conclusion("X", 2).contains("BOAS taxas"));
        assert!(conclusion("X", 3).contains("DESAFIOS"));
    }
}
