//! S2: School infrastructure
//!
//! Municipal network comparison against the state and Brazil. For state
//! codes the API has no `Municipio` entries, so the `Estado` values become
//! the primary column and the state comparison is dropped.

use crate::entity::Entity;
use crate::reports::utils::*;
use crate::sources::{InfraItem, Network, Sources};

const TITLE: &str = "RELATÓRIO DE INFRAESTRUTURA ESCOLAR - DADOS QEDU";

/// Items shown when present; otherwise the first [`MAX_FALLBACK_ITEMS`] are used.
pub const RELEVANT_ITEMS: &[&str] = &[
    "Biblioteca*",
    "Láb. Informática",
    "Láb. Ciências",
    "Sala de Leitura",
    "Quadra de Esportes",
    "Internet",
    "Banda Larga",
];

const MAX_FALLBACK_ITEMS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    label: String,
    primary: f64,
    state: Option<f64>,
    brazil: Option<f64>,
}

fn rows(items: &[InfraItem]) -> Vec<Row> {
    let with_values = || items.iter().filter(|i| !i.values.is_empty());

    let municipal: Vec<Row> = with_values()
        .filter_map(|item| {
            Some(Row {
                label: item.label.clone(),
                primary: item.value_for("Municipio")?,
                state: item.value_for("Estado"),
                brazil: item.value_for("Brasil"),
            })
        })
        .collect();
    if !municipal.is_empty() {
        return municipal;
    }

    with_values()
        .filter_map(|item| {
            Some(Row {
                label: item.label.clone(),
                primary: item.value_for("Estado")?,
                state: None,
                brazil: item.value_for("Brasil"),
            })
        })
        .collect()
}

fn relevant(rows: Vec<Row>) -> Vec<Row> {
    let picked: Vec<Row> = rows
        .iter()
        .filter(|r| RELEVANT_ITEMS.contains(&r.label.as_str()))
        .cloned()
        .collect();
    if picked.is_empty() {
        rows.into_iter().take(MAX_FALLBACK_ITEMS).collect()
    } else {
        picked
    }
}

fn below(a: f64, b: f64) -> bool {
    as_percent(a) < as_percent(b)
}

pub fn generate(sources: &Sources, entity: &Entity) -> String {
    let name = entity.name.as_str();
    let Some(snapshot) = sources.infrastructure(Network::Municipal) else {
        return no_data_report(Header::new(TITLE, name).year(NOT_AVAILABLE), "Sem dados.", DEFAULT_SOURCE);
    };

    let mut out = Header::new(TITLE, name)
        .network(Network::Municipal.name())
        .year(snapshot.year)
        .render();

    let items = relevant(rows(&snapshot.items));

    // Part 1: table
    out += &format!("\n\nPARTE 1: TABELA COMPARATIVA\n{SUBLINE}\n\n");
    out += &format!(
        "{:>20} {:>10} {:>7} {:>7} {:>10} {:>10}\n",
        "Indicador", "Município", "Estado", "Brasil", "vs Brasil", "vs Estado"
    );
    for row in &items {
        out += &format!(
            "{:>20} {:>10} {:>7} {:>7} {:>10} {:>10}\n",
            row.label,
            pct(Some(row.primary)),
            pct(row.state),
            pct(row.brazil),
            pp_diff_opt(Some(row.primary), row.brazil, 1),
            pp_diff_opt(Some(row.primary), row.state, 1)
        );
    }

    // Panorama
    out += &format!("\n\n\n{LINE}\nPANORAMA COMPARATIVO - ANÁLISE QUALITATIVA\n{LINE}\n");
    out += &format!("\n📊 Análise comparativa de {} em relação ao Estado e Brasil\n", name);

    let mut below_brazil: Vec<&Row> = items
        .iter()
        .filter(|r| r.brazil.map_or(false, |b| below(r.primary, b)))
        .collect();
    let below_state: Vec<&Row> = items
        .iter()
        .filter(|r| {
            r.brazil.map_or(false, |b| !below(r.primary, b))
                && r.state.map_or(false, |s| below(r.primary, s))
        })
        .collect();
    let above: Vec<&Row> = items
        .iter()
        .filter(|r| !below_brazil.contains(r) && !below_state.contains(r))
        .collect();

    below_brazil.sort_by(|a, b| {
        let gap = |r: &Row| as_percent(r.primary) - r.brazil.map(as_percent).unwrap_or_default();
        gap(a).total_cmp(&gap(b))
    });

    let values_line = |r: &Row| {
        format!(
            "      Município: {} | Estado: {} | Brasil: {}\n",
            pct(Some(r.primary)),
            pct(r.state),
            pct(r.brazil)
        )
    };

    out += &format!("\n{SUBLINE}\n🔴 INDICADORES ABAIXO DA MÉDIA NACIONAL (BRASIL)\n{SUBLINE}\n\n");
    if below_brazil.is_empty() {
        out += "   ✅ Nenhum indicador abaixo da média nacional.\n";
    }
    for row in &below_brazil {
        out += &format!("\n   ❌ {}\n", row.label);
        out += &values_line(row);
        out += &format!("      → {} vs Brasil\n", pp_or_no_data(Some(row.primary), row.brazil, 1));
    }

    out += &format!("\n{SUBLINE}\n🟡 INDICADORES ABAIXO DA MÉDIA ESTADUAL (mas acima do Brasil)\n{SUBLINE}\n\n");
    if below_state.is_empty() {
        out += "   ✅ Nenhum indicador abaixo da média estadual (que esteja acima da nacional).\n";
    }
    for row in &below_state {
        out += &format!("\n   ⚠️ {}\n", row.label);
        out += &values_line(row);
    }

    out += &format!("\n{SUBLINE}\n🟢 INDICADORES ACIMA DAS MÉDIAS ESTADUAL E NACIONAL\n{SUBLINE}\n\n");
    for row in &above {
        out += &format!("   ✅ {}\n", row.label);
        out += &values_line(row);
        out += &format!(
            "      → {} vs Brasil | {} vs Estado\n\n",
            pp_or_no_data(Some(row.primary), row.brazil, 1),
            pp_or_no_data(Some(row.primary), row.state, 1)
        );
    }

    // Summary
    out += &format!("{LINE}\n📋 RESUMO DO PANORAMA\n{LINE}\n\n");
    out += &format!("   Total de indicadores analisados: {}\n\n", items.len());
    out += &format!("   🔴 Abaixo do Brasil:           {} indicador(es)\n", below_brazil.len());
    out += &format!("   🟡 Abaixo do Estado:           {} indicador(es)\n", below_state.len());
    out += &format!("   🟢 Acima de ambos:             {} indicador(es)\n", above.len());

    out += &format!("\n{SUBLINE}\n💬 CONCLUSÃO\n{SUBLINE}\n\n");
    out += &conclusion(name, below_brazil.len(), below_state.len());

    out += &footer(DEFAULT_SOURCE);
    out
}

fn conclusion(name: &str, below_brazil: usize, below_state: usize) -> String {
    match (below_brazil, below_state) {
        (0, 0) => format!(
            "   {name} apresenta EXCELENTE infraestrutura escolar nos indicadores\n\
             \x20  analisados, estando ACIMA das médias estadual e nacional em todos os itens.\n\n\
             \x20  💡 Recomendação: Focar em soluções de ATUALIZAÇÃO e MODERNIZAÇÃO,\n\
             \x20  já que a infraestrutura básica está bem estabelecida.\n"
        ),
        (0, _) => format!(
            "   {name} apresenta BOA infraestrutura, acima da média nacional,\n\
             \x20  mas com oportunidade de alcançar o patamar estadual em alguns itens.\n\n\
             \x20  💡 Recomendação: Focar em equiparar ao patamar estadual.\n"
        ),
        (n, _) if n <= 2 => format!(
            "   {name} apresenta infraestrutura PARCIALMENTE adequada,\n\
             \x20  com {n} indicador(es) abaixo da média nacional.\n\n\
             \x20  💡 Recomendação: oportunidade de melhoria rápida.\n"
        ),
        (n, _) => format!(
            "   {name} apresenta DÉFICIT significativo de infraestrutura,\n\
             \x20  com {n} indicadores abaixo da média nacional.\n\n\
             \x20  💡 Recomendação: Priorizar INFRAESTRUTURA BÁSICA — grande potencial de mercado.\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InfraValue;

    fn item(label: &str, values: &[(&str, Option<f64>)]) -> InfraItem {
        InfraItem {
            label: label.to_string(),
            values: values
                .iter()
                .map(|(e, v)| InfraValue { entity: e.to_string(), value: *v })
                .collect(),
        }
    }

    #[test]
    fn test_rows_prefer_municipal_values() {
        let items = vec![
            item("Internet", &[("Municipio", Some(0.8)), ("Estado", Some(0.9)), ("Brasil", Some(0.85))]),
            item("Piscina", &[]),
        ];
        let rows = rows(&items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, Some(0.9));
    }

    #[test]
    fn test_rows_fall_back_to_state_values() {
        let items = vec![item("Internet", &[("Estado", Some(0.9)), ("Brasil", Some(0.85))])];
        let rows = rows(&items);
        assert_eq!(rows[0].primary, 0.9);
        assert_eq!(rows[0].state, None);
        assert_eq!(rows[0].brazil, Some(0.85));
    }

    #[test]
    fn test_relevant_filter_and_fallback() {
        let relevant_rows = relevant(rows(&[
            item("Internet", &[("Municipio", Some(0.8))]),
            item("Piscina", &[("Municipio", Some(0.1))]),
        ]));
        assert_eq!(relevant_rows.len(), 1);
        assert_eq!(relevant_rows[0].label, "Internet");

        let many: Vec<InfraItem> = (0..12)
            .map(|i| item(&format!("Item {}", i), &[("Municipio", Some(0.5))]))
            .collect();
        assert_eq!(relevant(rows(&many)).len(), MAX_FALLBACK_ITEMS);
    }

    #[test]
    fn test_conclusion_tiers() {
        assert!(conclusion("X", 0, 0).contains("EXCELENTE"));
        assert!(conclusion("X", 0, 1).contains("BOA infraestrutura"));
        assert!(conclusion("X", 2, 0).contains("PARCIALMENTE"));
        assert!(conclusion("X", 3, 0).contains("DÉFICIT"));
        assert!(conclusion("X", 3, 0).starts_with("   X apresenta"));
        assert!(conclusion("X", 3, 0).contains("\n   com 3 indicadores"));
    }
}
