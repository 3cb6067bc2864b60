//! Structured (numeric) summary of the data behind the text reports.
//!
//! Runs after the renderers on the same `Sources`, so every request it makes
//! is already in the fetch cache. Percentages are normalized and rounded to
//! two decimals; missing values are left out rather than reported as zero.

use std::collections::BTreeMap;

use crate::entity::Entity;
use crate::reports::sections::s3_census::stage_enrollment;
use crate::reports::types::{
    CensusSummary, InfraSummary, LearningSummary, RatesSummary, StructuredSummary, SubjectLevels,
};
use crate::reports::utils::{as_percent, round2};
use crate::sources::{
    saeb_years, Cycle, LearningRecord, Network, RateKind, RateScope, Sources, Subject, CYCLES, LEVELS,
    SUBJECTS,
};

fn normalized(v: f64) -> f64 {
    round2(as_percent(v))
}

fn non_empty<V>(by_cycle: BTreeMap<Cycle, V>) -> Option<BTreeMap<Cycle, V>> {
    if by_cycle.is_empty() {
        None
    } else {
        Some(by_cycle)
    }
}

pub fn collect(sources: &Sources, entity: &Entity) -> StructuredSummary {
    StructuredSummary {
        entity: entity.name.clone(),
        uf: entity.uf.clone(),
        kind: sources.code().kind_label(),
        learning: non_empty(learning(sources)),
        census: census(sources),
        infrastructure: infrastructure(sources),
        pass_rates: non_empty(pass_rates(sources)),
    }
}

fn levels(record: &LearningRecord, subject: Subject) -> BTreeMap<&'static str, f64> {
    LEVELS
        .iter()
        .filter_map(|level| record.level(subject, *level).map(|v| (level.key(), normalized(v))))
        .collect()
}

/// Same records the learning report compares: newest SAEB edition, year-matched Brazil.
fn learning(sources: &Sources) -> BTreeMap<Cycle, LearningSummary> {
    let editions = saeb_years(sources.reference_year());
    let mut out = BTreeMap::new();
    for cycle in CYCLES {
        let groups = sources.learning(Network::Public, cycle);
        let Some(reference) = groups.reference(&editions) else {
            continue;
        };

        let subjects = SUBJECTS
            .iter()
            .map(|subject| {
                let levels_of = SubjectLevels {
                    entity: levels(reference.entity, *subject),
                    brazil: reference.brazil.map(|b| levels(b, *subject)).unwrap_or_default(),
                };
                (subject.name(), levels_of)
            })
            .collect();

        out.insert(cycle, LearningSummary { year: reference.entity.year, subjects });
    }
    out
}

fn census(sources: &Sources) -> Option<CensusSummary> {
    let census = sources.census(Network::Municipal)?;
    let enrollment: BTreeMap<&'static str, i64> = stage_enrollment(&census).into_iter().collect();
    let total_enrollment = enrollment.values().sum();
    Some(CensusSummary {
        year: census.year,
        schools: census.count("qtd_escolas"),
        enrollment,
        total_enrollment,
    })
}

fn infrastructure(sources: &Sources) -> Option<InfraSummary> {
    let snapshot = sources.infrastructure(Network::Municipal)?;
    let mut indicators: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for item in &snapshot.items {
        for value in &item.values {
            let Some(v) = value.value else {
                continue;
            };
            indicators
                .entry(item.label.clone())
                .or_default()
                .insert(value.entity.to_lowercase(), normalized(v));
        }
    }
    Some(InfraSummary { year: snapshot.year, indicators })
}

fn pass_rates(sources: &Sources) -> BTreeMap<Cycle, RatesSummary> {
    let mut out = BTreeMap::new();
    for cycle in CYCLES {
        let Some(snapshot) = sources.pass_rates(cycle) else {
            continue;
        };
        let Some(latest) = snapshot.latest(RateScope::Entity) else {
            continue;
        };
        let rate = |kind: RateKind| latest.rate(kind).map(normalized);
        out.insert(
            cycle,
            RatesSummary {
                name: cycle.name(),
                year: snapshot.year,
                approval_pct: rate(RateKind::Approval),
                failure_pct: rate(RateKind::Failure),
                dropout_pct: rate(RateKind::Dropout),
            },
        );
    }
    out
}
