//! S4: IDEB history
//!
//! Built from the reference tables rather than the statistics API. The
//! municipal sphere covers the three segments; the state sphere only
//! secondary education, since municipalities have no IDEB of their own there.
//! Each IDEB year is compared against the enclosing state and the national
//! mean/median derived from the state table.

use rustc_hash::FxHashMap;

use crate::data::{IdebRecord, NationalStat, ReferenceTables, TerritoryView};
use crate::entity::Entity;
use crate::reports::utils::*;
use crate::territory::TerritoryCode;

const TITLE: &str = "RELATÓRIO DE ANÁLISE IDEB";
const SOURCE: &str = "IDEB/SAEB - INEP/MEC";
const INDICATOR: &str = "IDEB";

static SEGMENTS: [&str; 3] = ["anos iniciais", "anos finais", "ensino medio"];
const SECONDARY: &str = "ensino medio";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sphere {
    Municipal,
    State,
}

impl Sphere {
    fn key(self) -> &'static str {
        match self {
            Sphere::Municipal => "municipal",
            Sphere::State => "estadual",
        }
    }

    fn segments(self) -> &'static [&'static str] {
        match self {
            Sphere::Municipal => &SEGMENTS,
            Sphere::State => &SEGMENTS[2..],
        }
    }

    fn display(self, segment: &str) -> String {
        if self == Sphere::State && segment == SECONDARY {
            return "ENSINO MEDIO (REDE ESTADUAL)".to_string();
        }
        segment.to_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SegmentStats {
    variation: f64,
    trend: f64,
    max: f64,
    min: f64,
    vs_state: Option<f64>,
    vs_brazil: Option<f64>,
}

#[derive(Debug, Clone)]
struct SegmentInsights {
    label: String,
    lines: Vec<String>,
    stats: SegmentStats,
}

/// IDEB rows for one segment, sorted by year; rows without a year are dropped.
fn ideb_rows<'a>(rows: &[&'a IdebRecord], sphere: Option<Sphere>, segment: &str) -> Vec<&'a IdebRecord> {
    let mut picked: Vec<&IdebRecord> = rows
        .iter()
        .copied()
        .filter(|r| sphere.map_or(true, |s| r.sphere.as_deref() == Some(s.key())))
        .filter(|r| r.is(INDICATOR, segment) && r.year.is_some())
        .collect();
    picked.sort_by_key(|r| r.year);
    picked
}

fn national_rows<'a>(national: &'a [NationalStat], segment: &str) -> Vec<&'a NationalStat> {
    national
        .iter()
        .filter(|s| s.indicator == INDICATOR && s.segment == segment)
        .collect()
}

/// Mean of the differences over every (primary, reference) pair sharing a year.
fn mean_paired_diff<T>(
    primary: &[&IdebRecord],
    reference: &[T],
    year_of: impl Fn(&T) -> i64,
    value_of: impl Fn(&T) -> Option<f64>,
) -> Option<f64> {
    let (year_of, value_of) = (&year_of, &value_of);
    let diffs: Vec<f64> = primary
        .iter()
        .flat_map(|p| {
            reference
                .iter()
                .filter(move |r| p.year == Some(year_of(*r)))
                .filter_map(move |r| Some(p.value? - value_of(r)?))
        })
        .collect();
    if diffs.is_empty() {
        None
    } else {
        Some(diffs.iter().sum::<f64>() / diffs.len() as f64)
    }
}

fn signed(a: Option<f64>, b: Option<f64>) -> String {
    match (a, b) {
        (Some(a), Some(b)) => format!("{:+.2}", a - b),
        _ => String::new(),
    }
}

pub fn generate(code: &TerritoryCode, entity: &Entity, tables: Option<&ReferenceTables>) -> String {
    let Some(view) = tables.and_then(|t| t.view(code)) else {
        return no_data_report(Header::new(TITLE, &entity.name), "Sem dados IDEB disponíveis.", SOURCE);
    };

    let mut out = format!("{LINE}\n{TITLE}\nGerado em: {}\n{LINE}\n", timestamp());
    out += &format!("\n📍 ESCOPO DA ANÁLISE\n{SHORT_RULE}\n");
    out += &format!("Município: {}\nEstado: {}\n", entity.name, entity.uf);
    out += "Comparativo: Município vs Estado vs Brasil\n";
    out += "Nota: Ensino Médio usa dados da rede estadual (não há IDEB municipal para EM)\n";

    for sphere in [Sphere::Municipal, Sphere::State] {
        out += &sphere_block(sphere, &view);
    }

    out += &format!("\n{LINE}\nFim do Relatório\n");
    out
}

fn sphere_block(sphere: Sphere, view: &TerritoryView) -> String {
    let has_data = sphere
        .segments()
        .iter()
        .any(|seg| !ideb_rows(&view.primary, Some(sphere), seg).is_empty());
    if !has_data {
        return String::new();
    }

    let mut out = format!("\n📊 HISTÓRICO IDEB POR SEGMENTO\n{SHORT_RULE}\n");
    let mut insights: Vec<SegmentInsights> = Vec::new();

    for segment in sphere.segments() {
        let rows = ideb_rows(&view.primary, Some(sphere), segment);
        if rows.is_empty() {
            continue;
        }
        let label = sphere.display(segment);
        let state_rows = ideb_rows(&view.state, None, segment);
        let national = national_rows(view.national, segment);

        out += &format!("\n▶ {}\n{SUBLINE}\n", label);
        out += &history_table(sphere, &rows, &state_rows, &national);

        if let Some(found) = segment_insights(sphere, &label, &rows, &state_rows, &national) {
            insights.push(found);
        }
    }

    if insights.is_empty() {
        return out;
    }

    out += &format!("\n\n💡 INSIGHTS E OBSERVAÇÕES\n{LINE}\n");
    for found in &insights {
        out += &format!("\n▶ {}\n{SHORT_RULE}\n", found.label);
        for line in &found.lines {
            out += line;
            out += "\n";
        }
    }

    out += &format!("\n\n📈 ESTATÍSTICAS ADICIONAIS\n{LINE}\n");
    for found in &insights {
        let stats = &found.stats;
        out += &format!("\n▶ {}\n{SHORT_RULE}\n", found.label);
        out += &format!("  • Variação total (%): {:.2}\n", stats.variation);
        out += &format!("  • Tendência (pts/ano): {:.2}\n", stats.trend);
        if let Some(d) = stats.vs_state {
            out += &format!("  • Município vs Estado: {:.2}\n", d);
        }
        if let Some(d) = stats.vs_brazil {
            out += &format!("  • Município vs Brasil: {:.2}\n", d);
        }
        out += &format!("  • Maior valor: {:.2}\n", stats.max);
        out += &format!("  • Menor valor: {:.2}\n", stats.min);
    }
    out
}

fn history_table(
    sphere: Sphere,
    rows: &[&IdebRecord],
    state_rows: &[&IdebRecord],
    national: &[&NationalStat],
) -> String {
    let mut out = match sphere {
        Sphere::Municipal => format!(
            "{:<8} {:<12} {:<12} {:<12} {:<12} {:<12}\n",
            "Ano", "Município", "Estado", "Brasil(M)", "vs Estado", "vs Brasil"
        ),
        Sphere::State => format!(
            "{:<8} {:<12} {:<12} {:<12} {:<12} {:<12}\n",
            "Ano", "Estado", "Brasil(M)", "Brasil(Md)", "vs Média", "vs Mediana"
        ),
    };
    out += SUBLINE;
    out += "\n";

    for row in rows {
        let year = row.year.unwrap_or_default();
        let value = row.value;
        let national_row = national.iter().find(|s| s.year == year);
        let brazil_mean = national_row.and_then(|s| s.mean);

        out += &match sphere {
            Sphere::Municipal => {
                let state_value = state_rows.iter().find(|r| r.year == Some(year)).and_then(|r| r.value);
                format!(
                    "{:<8} {:<12} {:<12} {:<12} {:<12} {:<12}\n",
                    year,
                    val(value),
                    val(state_value),
                    val(brazil_mean),
                    signed(value, state_value),
                    signed(value, brazil_mean)
                )
            }
            Sphere::State => {
                let brazil_median = national_row.and_then(|s| s.median);
                format!(
                    "{:<8} {:<12} {:<12} {:<12} {:<12} {:<12}\n",
                    year,
                    val(value),
                    val(brazil_mean),
                    val(brazil_median),
                    signed(value, brazil_mean),
                    signed(value, brazil_median)
                )
            }
        };
    }
    out
}

/// Insight lines and summary statistics; `None` with fewer than two positive values.
fn segment_insights(
    sphere: Sphere,
    label: &str,
    rows: &[&IdebRecord],
    state_rows: &[&IdebRecord],
    national: &[&NationalStat],
) -> Option<SegmentInsights> {
    let clean: Vec<(i64, f64)> = rows
        .iter()
        .filter_map(|r| Some((r.year?, r.value?)))
        .filter(|(_, v)| *v > 0.0)
        .collect();
    if clean.len() < 2 {
        return None;
    }

    let years: Vec<f64> = clean.iter().map(|(y, _)| *y as f64).collect();
    let values: Vec<f64> = clean.iter().map(|(_, v)| *v).collect();
    let first = values[0];
    let last = values[values.len() - 1];
    let variation = if first != 0.0 { (last - first) / first * 100.0 } else { 0.0 };
    let trend = trend_slope(&years, &values);

    let vs_state = match sphere {
        Sphere::Municipal => mean_paired_diff(rows, state_rows, |r| r.year.unwrap_or_default(), |r| r.value),
        Sphere::State => None,
    };
    let vs_brazil = mean_paired_diff(rows, national, |s| s.year, |s| s.mean);

    let mut lines = Vec::new();

    if let Some(d) = vs_state {
        lines.push(if d > 0.3 {
            format!("  ✅ Município supera média estadual em {:.2} pontos", d)
        } else if d < -0.3 {
            format!("  ⚠️ Município está {:.2} pontos abaixo do estado", d.abs())
        } else {
            format!("  ➡️ Município próximo do estado ({:+.2} pontos)", d)
        });
    }

    match sphere {
        Sphere::Municipal => {
            if let Some(d) = vs_brazil {
                if d > 0.3 {
                    lines.push(format!("  ✅ Município supera média nacional em {:.2} pontos", d));
                } else if d < -0.3 {
                    lines.push(format!("  ⚠️ Município está {:.2} pontos abaixo da média nacional", d.abs()));
                }
            }
        }
        Sphere::State => {
            if let Some(d) = vs_brazil.filter(|d| *d > 0.3) {
                lines.push(format!("  ✅ Supera média nacional em {:.2} pontos", d));
            }
            let vs_median = mean_paired_diff(rows, national, |s| s.year, |s| s.median);
            if let Some(d) = vs_median.filter(|d| *d > 0.3) {
                lines.push(format!("  ✅ Supera mediana nacional em {:.2} pontos", d));
            }
        }
    }

    lines.push(if trend > 0.05 {
        format!("  📈 Tendência de crescimento (+{:.3}/ano)", trend)
    } else if trend < -0.05 {
        format!("  📉 Tendência de queda ({:.3}/ano)", trend)
    } else {
        format!("  ➡️ Tendência estável ({:+.3}/ano)", trend)
    });

    if variation > 20.0 {
        lines.push(format!("  🚀 Crescimento expressivo de {:.1}% no período", variation));
    } else if variation < -10.0 {
        lines.push(format!("  🔻 Queda de {:.1}% no período", variation.abs()));
    }

    // Later rows win for repeated years.
    let by_year: FxHashMap<i64, f64> = clean.iter().copied().collect();
    if let (Some(before), Some(during)) = (by_year.get(&2019), by_year.get(&2021)) {
        let d = during - before;
        if d < -0.3 {
            lines.push(format!("  🦠 Impacto da pandemia detectado ({:+.1} pontos 2019→2021)", d));
        } else if d > 0.3 {
            lines.push(format!("  💪 Resiliência na pandemia (crescimento de {:.1} pontos 2019→2021)", d));
        }
    }
    if let (Some(during), Some(after)) = (by_year.get(&2021), by_year.get(&2023)) {
        let d = after - during;
        if d > 0.2 {
            lines.push(format!("  🔄 {} : Recuperação pós-pandemia (+{:.1} pontos 2021→2023)", label, d));
        } else if d < -0.2 {
            lines.push(format!("  ⚠️ {} : Continuidade de queda pós-pandemia ({:+.1} pontos 2021→2023)", label, d));
        }
    }

    Some(SegmentInsights {
        label: label.to_string(),
        lines,
        stats: SegmentStats {
            variation,
            trend,
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            vs_state,
            vs_brazil,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: Option<&str>, sphere: &str, segment: &str, year: i64, value: Option<f64>) -> IdebRecord {
        IdebRecord {
            ibge_code: code.map(str::to_string),
            uf: Some("CE".to_string()),
            municipality: code.map(|_| "Sobral".to_string()),
            sphere: Some(sphere.to_string()),
            segment: segment.to_string(),
            indicator: Some(INDICATOR.to_string()),
            year: Some(year),
            value,
        }
    }

    fn tables() -> ReferenceTables {
        let code = Some("2312908");
        let municipal = vec![
            record(code, "municipal", "anos iniciais", 2019, Some(6.0)),
            record(code, "municipal", "anos iniciais", 2021, Some(5.5)),
            record(code, "municipal", "anos iniciais", 2023, Some(6.5)),
            record(code, "municipal", "anos finais", 2021, None),
            record(code, "estadual", "ensino medio", 2021, Some(4.0)),
            record(code, "estadual", "ensino medio", 2023, Some(4.4)),
        ];
        let state = vec![
            record(None, "estadual", "anos iniciais", 2019, Some(5.0)),
            record(None, "estadual", "anos iniciais", 2021, Some(5.0)),
            record(None, "estadual", "anos iniciais", 2023, Some(5.2)),
            record(None, "estadual", "ensino medio", 2021, Some(3.8)),
            record(None, "estadual", "ensino medio", 2023, Some(4.0)),
        ];
        ReferenceTables::from_records(municipal, state).unwrap()
    }

    fn entity() -> Entity {
        Entity { name: "Sobral".to_string(), uf: "CE".to_string() }
    }

    #[test]
    fn test_missing_tables_render_no_data() {
        let code = TerritoryCode::parse("2312908").unwrap();
        let text = generate(&code, &entity(), None);
        assert!(text.contains("⚠️ Sem dados IDEB disponíveis."));
        assert!(text.contains("Fonte: IDEB/SAEB - INEP/MEC"));
    }

    #[test]
    fn test_report_covers_both_spheres() {
        let code = TerritoryCode::parse("2312908").unwrap();
        let text = generate(&code, &entity(), Some(&tables()));

        assert!(text.starts_with(&format!("{LINE}\nRELATÓRIO DE ANÁLISE IDEB\nGerado em: ")));
        assert!(text.contains("Município: Sobral\nEstado: CE\n"));
        assert!(text.contains("\n▶ ANOS INICIAIS\n"));
        assert!(text.contains("\n▶ ANOS FINAIS\n"));
        assert!(text.contains("\n▶ ENSINO MEDIO (REDE ESTADUAL)\n"));
        assert_eq!(text.matches("📊 HISTÓRICO IDEB POR SEGMENTO").count(), 2);
        assert!(text.contains("  🦠 Impacto da pandemia detectado (-0.5 pontos 2019→2021)"));
        assert!(text.contains("  🔄 ANOS INICIAIS : Recuperação pós-pandemia (+1.0 pontos 2021→2023)"));
        assert!(text.ends_with(&format!("\n{LINE}\nFim do Relatório\n")));
    }

    #[test]
    fn test_history_row_shows_missing_values_as_not_available() {
        let code = TerritoryCode::parse("2312908").unwrap();
        let text = generate(&code, &entity(), Some(&tables()));
        let row = format!("{:<8} {:<12} {:<12} {:<12} {:<12} {:<12}\n", 2021, "N/D", "N/D", "N/D", "", "");
        assert!(text.contains(&row));

        let row = format!("{:<8} {:<12} {:<12} {:<12} {:<12} {:<12}\n", 2023, "6.50", "5.20", "5.20", "+1.30", "+1.30");
        assert!(text.contains(&row));
    }

    #[test]
    fn test_segment_insights_need_two_positive_values() {
        let one = record(Some("1"), "municipal", "anos finais", 2021, Some(4.0));
        let zero = record(Some("1"), "municipal", "anos finais", 2023, Some(0.0));
        assert!(segment_insights(Sphere::Municipal, "ANOS FINAIS", &[&one, &zero], &[], &[]).is_none());
    }

    #[test]
    fn test_segment_insights_against_state() {
        let rows = [
            record(Some("1"), "municipal", "anos iniciais", 2019, Some(6.0)),
            record(Some("1"), "municipal", "anos iniciais", 2023, Some(7.5)),
        ];
        let state = [
            record(None, "estadual", "anos iniciais", 2019, Some(5.0)),
            record(None, "estadual", "anos iniciais", 2023, Some(5.5)),
        ];
        let rows: Vec<&IdebRecord> = rows.iter().collect();
        let state: Vec<&IdebRecord> = state.iter().collect();

        let found = segment_insights(Sphere::Municipal, "ANOS INICIAIS", &rows, &state, &[]).unwrap();
        assert_eq!(found.lines[0], "  ✅ Município supera média estadual em 1.50 pontos");
        assert!(found.lines.iter().any(|l| l.starts_with("  🚀 Crescimento expressivo de 25.0%")));
        assert_eq!(found.stats.vs_state, Some(1.5));
        assert_eq!(found.stats.vs_brazil, None);
        assert_eq!(found.stats.max, 7.5);
        assert_eq!(found.stats.min, 6.0);
    }
}
