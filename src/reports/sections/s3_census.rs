//! S3: School census (enrollment)
//!
//! Municipal network, urban and rural together. Enrollment by stage and by
//! grade, followed by a qualitative overview and commercial insights per
//! stage group.

use crate::entity::Entity;
use crate::reports::utils::*;
use crate::sources::{CensusSnapshot, Network, Sources};

const TITLE: &str = "RELATÓRIO DO CENSO ESCOLAR - DADOS QEDU";
const SOURCE: &str = "QEdu - Censo Escolar (qedu.org.br)";
const LOCATION: &str = "Urbana e Rural (todas)";

/// Enrollment fields by stage, in report order.
pub const STAGE_FIELDS: &[(&str, &str)] = &[
    ("matriculas_creche", "Creche"),
    ("matriculas_pre_escolar", "Pré-Escola"),
    ("matriculas_anos_iniciais", "Anos Iniciais (1º ao 5º)"),
    ("matriculas_anos_finais", "Anos Finais (6º ao 9º)"),
    ("matriculas_ensino_medio", "Ensino Médio"),
    ("matriculas_eja", "EJA"),
    ("matriculas_educacao_especial", "Educação Especial"),
];

/// Enrollment fields by grade: (field, grade, cycle).
const GRADE_FIELDS: &[(&str, &str, &str)] = &[
    ("matriculas_1ano", "1º Ano", "Anos Iniciais"),
    ("matriculas_2ano", "2º Ano", "Anos Iniciais"),
    ("matriculas_3ano", "3º Ano", "Anos Iniciais"),
    ("matriculas_4ano", "4º Ano", "Anos Iniciais"),
    ("matriculas_5ano", "5º Ano", "Anos Iniciais"),
    ("matriculas_6ano", "6º Ano", "Anos Finais"),
    ("matriculas_7ano", "7º Ano", "Anos Finais"),
    ("matriculas_8ano", "8º Ano", "Anos Finais"),
    ("matriculas_9ano", "9º Ano", "Anos Finais"),
];

/// Stages present in the census record, with their enrollment.
pub fn stage_enrollment(census: &CensusSnapshot) -> Vec<(&'static str, i64)> {
    STAGE_FIELDS
        .iter()
        .filter_map(|(field, label)| census.count(field).map(|v| (*label, v)))
        .collect()
}

fn ratio(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub fn generate(sources: &Sources, entity: &Entity) -> String {
    let name = entity.name.as_str();
    let Some(census) = sources.census(Network::Municipal) else {
        return no_data_report(Header::new(TITLE, name), "Sem dados.", DEFAULT_SOURCE);
    };

    let schools = census.count("qtd_escolas").unwrap_or(0);
    let stages = stage_enrollment(&census);
    let total: i64 = stages.iter().map(|(_, v)| v).sum();
    let per_school = ratio(total, schools);
    let network = Network::Municipal.name();

    let mut out = Header::new(TITLE, name).render();
    out += "\n";

    // Part 1: overview
    out += &format!("\n{}\n", part_banner("PARTE 1: RESUMO GERAL"));
    out += &format!("{:>25} {:>22}\n", "Indicador", "Valor");
    out += &format!("{:>25} {:>22}\n", "Número de Escolas", thousands(schools));
    out += &format!("{:>25} {:>22}\n", "Total de Matrículas", thousands(total));
    out += &format!("{:>25} {:>22.1}\n", "Média de Alunos por Escola", per_school);
    out += &format!("{:>25} {:>22}\n", "Rede", network);
    out += &format!("{:>25} {:>22}\n", "Localização", LOCATION);
    out += &format!("{:>25} {:>22}\n", "Ano de Referência", census.year);

    // Part 2: by stage
    out += &format!("\n\n{}\n", part_banner("PARTE 2: MATRÍCULAS POR ETAPA DE ENSINO"));
    out += &format!(
        "{:>25} {:>11} {:>11} {:>17}\n",
        "Etapa de Ensino", "Matrículas", "% do Total", "Média por Escola"
    );
    for (label, v) in &stages {
        out += &format!(
            "{:>25} {:>11} {:>10.1}% {:>17.1}\n",
            label,
            thousands(*v),
            ratio(*v, total) * 100.0,
            ratio(*v, schools)
        );
    }
    out += &format!("{:>25} {:>11} {:>11} {:>17.1}\n", "TOTAL", thousands(total), "100%", per_school);

    // Part 3: by grade
    out += &format!("\n\n{}\n", part_banner("PARTE 3: MATRÍCULAS POR SÉRIE/ANO"));
    out += &format!("{:>15} {:>10} {:>11}\n", "Ciclo", "Série/Ano", "Matrículas");
    let mut subtotals: Vec<(&str, i64)> = Vec::new();
    for (field, grade, cycle) in GRADE_FIELDS {
        let Some(v) = census.count(field) else {
            continue;
        };
        out += &format!("{:>15} {:>10} {:>11}\n", cycle, grade, thousands(v));
        match subtotals.iter_mut().find(|(c, _)| c == cycle) {
            Some((_, sum)) => *sum += v,
            None => subtotals.push((*cycle, v)),
        }
    }
    for (cycle, sum) in &subtotals {
        out += &format!("{:>15} {:>10} {:>11}\n", cycle, "Subtotal", thousands(*sum));
    }

    // Qualitative analysis
    out += &format!("\n\n{LINE}\nANÁLISE QUALITATIVA - CENSO ESCOLAR\n{LINE}\n");
    out += &format!("\n📍 Território: {}\n🏫 Rede: {}\n", name, network);
    out += &format!("📍 Localização: {}\n", LOCATION);
    out += &format!("📅 Ano de referência: {}\n", census.year);

    out += &format!("\n{SUBLINE}\n📊 VISÃO GERAL\n{SUBLINE}\n\n");
    out += &format!("   • Total de Escolas: {}\n", thousands(schools));
    out += &format!("   • Total de Matrículas: {}\n", thousands(total));
    out += &format!("   • Média de alunos por escola: {:.1}\n", per_school);

    out += &format!("\n{SUBLINE}\n📚 DISTRIBUIÇÃO POR ETAPA DE ENSINO\n{SUBLINE}\n\n");
    let mut by_size = stages.clone();
    by_size.sort_by(|a, b| b.1.cmp(&a.1));
    for (label, v) in &by_size {
        out += &format!(
            "   • {}: {} matrículas ({:.1}%)\n",
            label,
            thousands(*v),
            ratio(*v, total) * 100.0
        );
    }
    // First stage wins on ties.
    let largest = stages
        .iter()
        .fold(None, |best: Option<&(&str, i64)>, s| match best {
            Some(b) if b.1 >= s.1 => Some(b),
            _ => Some(s),
        });
    if let Some((label, v)) = largest {
        out += &format!("\n   📌 Maior concentração: {}\n", label);
        out += &format!("      com {} matrículas\n", thousands(*v));
    }

    out += &format!("\n{SUBLINE}\n💡 INSIGHTS PARA ABORDAGEM COMERCIAL\n{SUBLINE}\n\n");
    out += &insights(&census);

    out += &footer(SOURCE);
    out
}

fn insights(census: &CensusSnapshot) -> String {
    let count = |field: &str| census.count(field).unwrap_or(0);
    let preschool = census
        .count("matriculas_pre_escolar")
        .filter(|v| *v != 0)
        .or_else(|| census.count("matriculas_pre_escola"))
        .unwrap_or(0);

    let early_childhood = count("matriculas_creche") + preschool;
    let early_years = count("matriculas_anos_iniciais");
    let later_years = count("matriculas_anos_finais");
    let elementary = early_years + later_years;
    let secondary = count("matriculas_ensino_medio");
    let adult = count("matriculas_eja");
    let special = count("matriculas_educacao_especial");

    let mut out = String::new();
    if early_childhood != 0 {
        out += &format!("   👶 EDUCAÇÃO INFANTIL: {} matrículas\n", thousands(early_childhood));
        out += "      → Potencial para: materiais lúdicos, livros infantis, brinquedos educativos\n\n";
    }
    if elementary != 0 {
        out += &format!("   📖 ENSINO FUNDAMENTAL: {} matrículas\n", thousands(elementary));
        out += &format!("      • Anos Iniciais: {}\n", thousands(early_years));
        out += &format!("      • Anos Finais: {}\n", thousands(later_years));
        out += "      → Potencial para: livros didáticos, paradidáticos, materiais de alfabetização\n\n";
    }
    if secondary != 0 {
        out += &format!("   🎓 ENSINO MÉDIO: {} matrículas\n", thousands(secondary));
        out += "      → Potencial para: materiais preparatórios ENEM/vestibular, livros técnicos\n\n";
    }
    if adult != 0 {
        out += &format!("   📚 EJA: {} matrículas\n", thousands(adult));
        out += "      → Potencial para: materiais específicos para jovens e adultos\n\n";
    }
    if special != 0 {
        out += &format!("   ♿ EDUCAÇÃO ESPECIAL: {} matrículas\n", thousands(special));
        out += "      → Potencial para: materiais adaptados, recursos de acessibilidade\n\n";
    }
    out
}
