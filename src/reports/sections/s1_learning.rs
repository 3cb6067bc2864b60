//! S1: Learning (SAEB proficiency)
//!
//! Public network (all public schools), one block per cycle with entity
//! records:
//! - Part 1: level shares per SAEB edition, first-to-last variation
//! - Part 2: latest edition against similar municipalities (or the state) and Brazil
//! - Part 3: diagnosis, opportunities, pandemic impact, comparison and
//!   commercial conclusion

use crate::entity::Entity;
use crate::reports::utils::*;
use crate::sources::{
    saeb_years, Cycle, LearningGroups, LearningReference, Level, Network, Sources, Subject, CYCLES,
    LEVELS, SUBJECTS,
};

const TITLE: &str = "RELATÓRIO COMPLETO DE APRENDIZADO - DADOS QEDU";
const NETWORK_LABEL: &str = "Pública (todas as redes)";

/// Below this adequate share a subject is flagged as an opportunity.
const CRITICAL_ADEQUATE: f64 = 50.0;

pub fn generate(sources: &Sources, entity: &Entity) -> String {
    let editions = saeb_years(sources.reference_year());
    let mut out = String::new();

    for cycle in CYCLES {
        let groups = sources.learning(Network::Public, cycle);
        if let Some(reference) = groups.reference(&editions) {
            out += &cycle_block(&entity.name, cycle, &groups, &reference);
        }
    }

    if out.is_empty() {
        return no_data_report(
            Header::new(TITLE, &entity.name),
            "Sem dados de aprendizado disponíveis.",
            DEFAULT_SOURCE,
        );
    }
    out
}

fn level_cell(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:>6.1}%", as_percent(v)),
        None => format!("{:>7}", NOT_AVAILABLE),
    }
}

fn less_than(a: f64, b: f64) -> bool {
    as_percent(a) < as_percent(b)
}

fn cycle_block(name: &str, cycle: Cycle, groups: &LearningGroups, reference: &LearningReference) -> String {
    let records = &groups.entity;
    let first_year = records.first().map(|r| r.year).unwrap_or(reference.entity.year);
    let last_year = records.last().map(|r| r.year).unwrap_or(reference.entity.year);

    let mut out = Header::new(TITLE, name)
        .network(NETWORK_LABEL)
        .cycle(cycle.label())
        .render();
    out += "\n";

    // Part 1: temporal evolution
    out += &format!("\n{}\n", part_banner("PARTE 1: EVOLUÇÃO TEMPORAL DOS INDICADORES"));
    let year_columns: String = records.iter().map(|r| format!("{:>7}", r.year)).collect();
    out += &format!("{:>18} {:>40} {} {:>10}\n", "Disciplina", "Nível", year_columns, "Variação");

    for subject in SUBJECTS {
        for level in LEVELS {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.level(subject, level)).collect();
            let cells: String = values.iter().map(|v| level_cell(*v)).collect();
            let variation = match (values.first(), values.last()) {
                (Some(Some(first)), Some(Some(last))) if values.len() >= 2 => pp_diff(*last, *first, 2),
                _ => String::new(),
            };
            out += &format!("{:>18} {:>40} {} {:>10}\n", subject.name(), level.label(), cells, variation);
        }
    }

    // Part 2: comparison
    out += &format!("\n\n{}", part_banner("PARTE 2: COMPARATIVO COM MUNICÍPIOS SEMELHANTES E BRASIL"));
    let peers_header = if reference.peers.is_some() { "Municípios semelhantes" } else { "Estado" };

    out += "\nRESUMO - % de Alunos com Aprendizado Adequado:\n\n";
    out += &format!(
        "{:>18} {:>10} {:>23} {:>7} {:>15} {:>10}\n",
        "Disciplina", "Município", peers_header, "Brasil", "vs Semelhantes", "vs Brasil"
    );
    for subject in SUBJECTS {
        let vm = reference.entity.adequate(subject);
        let vs = reference.peers.and_then(|r| r.adequate(subject));
        let vb = reference.brazil.and_then(|r| r.adequate(subject));
        out += &format!(
            "{:>18} {:>10} {:>23} {:>7} {:>15} {:>10}\n",
            subject.name(),
            pct(vm),
            pct(vs),
            pct(vb),
            pp_diff_opt(vm, vs, 1),
            pp_diff_opt(vm, vb, 1)
        );
    }

    out += "\n\nDETALHAMENTO POR NÍVEL:\n\n";
    out += &format!(
        "{:>18} {:>40} {:>10} {:>23} {:>7} {:>15} {:>10}\n",
        "Disciplina", "Nível", "Município", peers_header, "Brasil", "vs Semelhantes", "vs Brasil"
    );
    for subject in SUBJECTS {
        for level in LEVELS {
            let vm = reference.entity.level(subject, level);
            let vs = reference.peers.and_then(|r| r.level(subject, level));
            let vb = reference.brazil.and_then(|r| r.level(subject, level));
            out += &format!(
                "{:>18} {:>40} {:>10} {:>23} {:>7} {:>15} {:>10}\n",
                subject.name(),
                level.label(),
                pct(vm),
                pct(vs),
                pct(vb),
                pp_diff_opt(vm, vs, 1),
                pp_diff_opt(vm, vb, 1)
            );
        }
    }

    // Part 3: qualitative analysis
    out += &format!("\n\n{}", part_banner("PARTE 3: ANÁLISE QUALITATIVA"));
    out += &format!("\n{LINE}\nANÁLISE QUALITATIVA - EVOLUÇÃO DO APRENDIZADO\n{LINE}\n");
    out += &format!("\n📍 Território: {}\n🏫 Rede: {}\n", name, NETWORK_LABEL);
    out += &format!("📚 Ciclo: {}\n", cycle.label());
    out += &format!("📅 Período analisado: {} a {}\n", first_year, last_year);
    out += &format!("\n{SUBLINE}\nDIAGNÓSTICO ATUAL POR DISCIPLINA\n{SUBLINE}\n");

    let mut critical_alerts = 0;
    let mut below_brazil_count = 0;
    let mut opportunities: Vec<(Subject, f64, Option<f64>)> = Vec::new();

    for subject in SUBJECTS {
        let current = reference.entity;
        let adequate = current.adequate(subject);
        let tier = Proficiency::classify(adequate);

        let advanced = current.level(subject, Level::Advanced);
        let proficient = current.level(subject, Level::Proficient);
        let basic = current.level(subject, Level::Basic);
        let insufficient = current.level(subject, Level::Insufficient);
        let inadequate = match (basic, insufficient) {
            (None, None) => None,
            (b, i) => Some(b.unwrap_or(0.0) + i.unwrap_or(0.0)),
        };

        out += &format!("\n📘 {}\n\n", subject.name().to_uppercase());
        out += &format!("   {} Situação atual: {}\n", tier.emoji(), tier.label());
        out += &format!("   • Alunos com aprendizado adequado: {}\n", pct(adequate));
        out += &format!("      - Avançado: {}\n", pct(advanced));
        out += &format!("      - Proficiente: {}\n", pct(proficient));
        out += &format!("   • Alunos com aprendizado inadequado: {}\n", pct(inadequate));
        out += &format!("      - Básico: {}\n", pct(basic));
        out += &format!("      - Insuficiente: {}\n", pct(insufficient));

        let first_adequate = records.first().and_then(|r| r.adequate(subject));
        if let (Some(now), Some(before)) = (adequate, first_adequate) {
            let variation = as_percent(now) - as_percent(before);
            let trend = if variation > 0.0 {
                "📈 Melhora"
            } else if variation < 0.0 {
                "📉 Piora"
            } else {
                "➡️ Estável"
            };
            out += &format!(
                "   • Evolução ({}-{}): {} ({:+.1}pp)\n",
                first_year, reference.entity.year, trend, variation
            );
        }

        if let Some(a) = adequate {
            if as_percent(a) < CRITICAL_ADEQUATE {
                critical_alerts += 1;
                opportunities.push((subject, a, insufficient));
            }
            if let Some(b) = reference.brazil.and_then(|r| r.adequate(subject)) {
                if less_than(a, b) {
                    below_brazil_count += 1;
                }
            }
        }
    }

    out += &format!("\n{SUBLINE}\n🎯 OPORTUNIDADES IDENTIFICADAS\n{SUBLINE}\n");
    if opportunities.is_empty() {
        out += "\n   ✅ Sem oportunidades críticas identificadas.\n";
    }
    for (subject, adequate, insufficient) in &opportunities {
        out += &format!(
            "\n   🔴 {}: Apenas {} com aprendizado adequado\n",
            subject.name(),
            pct(Some(*adequate))
        );
        out += &format!("      → {} em nível insuficiente\n", pct(*insufficient));
        out += "      → Potencial para: reforço escolar, materiais de nivelamento\n";
    }

    if let (Some(r19), Some(r21), Some(r23)) = (
        groups.entity_at(2019),
        groups.entity_at(2021),
        groups.entity_at(2023),
    ) {
        out += &format!("\n{SUBLINE}\n📉 IMPACTO DA PANDEMIA E RECUPERAÇÃO\n{SUBLINE}\n");
        for subject in SUBJECTS {
            let (Some(a19), Some(a21), Some(a23)) =
                (r19.adequate(subject), r21.adequate(subject), r23.adequate(subject))
            else {
                continue;
            };
            let (p19, p21, p23) = (as_percent(a19), as_percent(a21), as_percent(a23));
            let balance = p23 - p19;
            out += &format!("\n   📘 {}:\n", subject.name());
            out += &format!("      • 2019→2021 (pandemia): {:+.1}pp\n", p21 - p19);
            out += &format!("      • 2021→2023 (recuperação): {:+.1}pp\n", p23 - p21);
            out += &format!("      • Saldo total (2019→2023): {:+.1}pp\n", balance);
            if p23 >= p19 {
                out += "      ✅ RECUPEROU o patamar pré-pandemia\n";
            } else {
                out += &format!("      ⚠️ Ainda {:.1}pp ABAIXO do nível pré-pandemia\n", balance.abs());
            }
        }
    }

    out += &comparison_block(name, reference);

    // Conclusion
    let below_peers_count = SUBJECTS
        .iter()
        .filter(|s| matches!(categorize(reference, **s), Some(Category::BelowPeers { .. })))
        .count();

    out += &format!("\n{LINE}\n💡 CONCLUSÃO E RECOMENDAÇÕES PARA ABORDAGEM COMERCIAL\n{LINE}\n");
    out += &format!("\n📍 {}\n", name.to_uppercase());
    if critical_alerts > 0 || below_brazil_count > 0 {
        out += "   🔴 SITUAÇÃO: CRÍTICA\n";
        out += "   POTENCIAL DE MERCADO: ALTO\n";
        out += "   → Recomendação: reforço escolar, recuperação, materiais de nivelamento\n";
    } else if below_peers_count > 0 {
        out += "   🟡 SITUAÇÃO: ATENÇÃO\n";
        out += "   POTENCIAL DE MERCADO: MÉDIO-ALTO\n";
        out += "   → Recomendação: soluções para alcançar patamar de municípios semelhantes\n";
    } else {
        out += "   🟢 SITUAÇÃO: POSITIVA\n";
        out += "   POTENCIAL DE MERCADO: MÉDIO\n";
        out += "   → Recomendação: soluções de excelência e enriquecimento curricular\n";
    }

    out += &footer(DEFAULT_SOURCE);
    out
}

/// Where a subject's adequate share sits against Brazil and the peer group.
enum Category {
    BelowBrazil { entity: f64, brazil: f64 },
    BelowPeers { entity: f64, peers: f64 },
    Above { entity: f64, peers: Option<f64>, brazil: Option<f64> },
}

fn categorize(reference: &LearningReference, subject: Subject) -> Option<Category> {
    let entity = reference.entity.adequate(subject)?;
    let peers = reference.peers.and_then(|r| r.adequate(subject));
    let brazil = reference.brazil.and_then(|r| r.adequate(subject));

    Some(match (brazil, peers) {
        (Some(b), _) if less_than(entity, b) => Category::BelowBrazil { entity, brazil: b },
        (_, Some(p)) if less_than(entity, p) => Category::BelowPeers { entity, peers: p },
        _ => Category::Above { entity, peers, brazil },
    })
}

fn comparison_block(name: &str, reference: &LearningReference) -> String {
    let mut below_brazil = Vec::new();
    let mut below_peers = Vec::new();
    let mut above = Vec::new();
    for subject in SUBJECTS {
        match categorize(reference, subject) {
            Some(Category::BelowBrazil { entity, brazil }) => below_brazil.push((subject, entity, brazil)),
            Some(Category::BelowPeers { entity, peers }) => below_peers.push((subject, entity, peers)),
            Some(Category::Above { entity, peers, brazil }) => above.push((subject, entity, peers, brazil)),
            None => {}
        }
    }

    let mut out = format!("\n{LINE}\nANÁLISE QUALITATIVA - COMPARATIVO COM SEMELHANTES E BRASIL\n{LINE}\n");
    out += &format!("\n📊 Comparação de {} com municípios semelhantes e média nacional\n", name);

    out += &format!("\n{SUBLINE}\n🔴 ABAIXO DA MÉDIA NACIONAL (BRASIL)\n{SUBLINE}\n");
    if below_brazil.is_empty() {
        out += "   ✅ Nenhum indicador abaixo da média nacional.\n";
    }
    for (subject, entity, brazil) in &below_brazil {
        out += &format!("\n   ❌ {} - Adequado\n", subject.name());
        out += &format!(
            "      Município: {} | Brasil: {} → {}\n",
            pct(Some(*entity)),
            pct(Some(*brazil)),
            pp_diff(*entity, *brazil, 1)
        );
    }

    out += &format!("\n{SUBLINE}\n🟡 ABAIXO DE MUNICÍPIOS SEMELHANTES (mas acima do Brasil)\n{SUBLINE}\n");
    for (subject, entity, peers) in &below_peers {
        out += &format!("\n   ⚠️ {} - Adequado\n", subject.name());
        out += &format!(
            "      Município: {} | Semelhantes: {} → {}\n",
            pct(Some(*entity)),
            pct(Some(*peers)),
            pp_diff(*entity, *peers, 1)
        );
    }

    out += &format!("\n{SUBLINE}\n🟢 ACIMA DAS MÉDIAS (Semelhantes e Brasil)\n{SUBLINE}\n");
    for (subject, entity, peers, brazil) in &above {
        out += &format!("\n   ✅ {} - Adequado\n", subject.name());
        out += &format!(
            "      Município: {} | Semelhantes: {} | Brasil: {}\n",
            pct(Some(*entity)),
            pct(*peers),
            pct(*brazil)
        );
        out += &format!(
            "      → {} vs Brasil | {} vs Semelhantes\n",
            pp_or_no_data(Some(*entity), *brazil, 1),
            pp_or_no_data(Some(*entity), *peers, 1)
        );
    }

    out += &format!("\n{LINE}\n📋 RESUMO COMPARATIVO\n{LINE}\n\n");
    out += &format!("   🔴 Abaixo do Brasil:          {} disciplina(s)\n", below_brazil.len());
    out += &format!("   🟡 Abaixo de Semelhantes:     {} disciplina(s)\n", below_peers.len());
    out += &format!("   🟢 Acima de ambos:            {} disciplina(s)\n", above.len());
    out
}
