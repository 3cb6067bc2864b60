//! Report Generator
//!
//! Main entry point for a generation run. Orchestrates the five report
//! sections (S1-S5) and the structured summary for one territory code.
//!
//! Public API (consumed by api_server.rs and generate_reports.rs):
//! - ReportGenerator::new(settings) -> Self
//! - ReportGenerator::resolve_entity(code) -> Entity
//! - ReportGenerator::generate(code) -> Result<ReportBundle>

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::data::ReferenceTables;
use crate::entity::{self, Entity};
use crate::fetch::{Fetcher, HttpTransport, Transport};
use crate::reports::sections::{s1_learning, s2_infrastructure, s3_census, s4_ideb, s5_pass_rates};
use crate::reports::structured;
use crate::reports::types::{ReportBundle, ReportKind, REPORT_KINDS};
use crate::sources::Sources;
use crate::territory::TerritoryCode;

/// Generates report bundles. Cheap to share: every run builds its own fetch cache.
pub struct ReportGenerator {
    settings: Settings,
    transport: Arc<dyn Transport>,
}

impl ReportGenerator {
    /// Generator backed by the HTTP statistics API.
    pub fn new(settings: Settings) -> Self {
        let transport = Arc::new(HttpTransport::new(settings.timeout));
        Self::with_transport(settings, transport)
    }

    pub fn with_transport(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self { settings, transport }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn fetcher(&self) -> Fetcher {
        let fetcher = Fetcher::new(Arc::clone(&self.transport), self.settings.retry);
        fetcher.clear();
        fetcher
    }

    /// Reference tables, read once per run.
    fn load_tables(&self) -> Result<Option<ReferenceTables>> {
        let tables = ReferenceTables::load(&self.settings.municipal_table, &self.settings.state_table);
        if let Err(e) = &tables {
            tracing::warn!("Failed to load reference tables: {:#}", e);
        }
        tables
    }

    /// Display name and state abbreviation only (no reports).
    pub fn resolve_entity(&self, code: &TerritoryCode) -> Entity {
        let fetcher = self.fetcher();
        let sources = self.sources(&fetcher, code);
        let tables = self.load_tables().ok().flatten();
        entity::resolve(&sources, tables.as_ref())
    }

    fn sources<'a>(&'a self, fetcher: &'a Fetcher, code: &'a TerritoryCode) -> Sources<'a> {
        Sources::new(fetcher, &self.settings.base_url, code, self.settings.reference_year)
    }

    /// Run all five reports and the structured summary for `code`.
    ///
    /// A failing report is replaced by an inline error message; only a
    /// failure to persist the files aborts the run.
    pub fn generate(&self, code: &TerritoryCode) -> Result<ReportBundle> {
        let fetcher = self.fetcher();
        let sources = self.sources(&fetcher, code);

        let tables = self.load_tables();
        let loaded = tables.as_ref().ok().and_then(Option::as_ref);

        let entity = entity::resolve(&sources, loaded);
        tracing::info!("Generating reports for {} ({} - {})", code, entity.name, entity.uf);

        let mut reports = BTreeMap::new();
        for kind in REPORT_KINDS {
            let text = match isolate(|| render(kind, &sources, &entity, &tables)) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Report {} failed for {}: {:#}", kind.key(), code, e);
                    format!("❌ Erro ao gerar {}: {}", kind.key(), e)
                }
            };
            reports.insert(kind, text);
        }

        let summary = structured::collect(&sources, &entity);
        tracing::info!(
            "Finished {} ({} reports, {} cached requests)",
            code,
            reports.len(),
            fetcher.cached_entries()
        );

        let bundle = ReportBundle {
            entity: entity.name,
            uf: entity.uf,
            ibge: code.to_string(),
            kind: code.kind_label(),
            reports,
            summary,
        };

        if let Some(dir) = &self.settings.output_dir {
            let dir = dir.join(code.as_str());
            let written = bundle
                .write_to(&dir)
                .with_context(|| format!("Failed to persist reports for {}", code))?;
            tracing::info!("Wrote {} files to {}", written.len(), dir.display());
        }

        Ok(bundle)
    }
}

/// Render one report. The IDEB report fails when the tables could not be read.
fn render(
    kind: ReportKind,
    sources: &Sources,
    entity: &Entity,
    tables: &Result<Option<ReferenceTables>>,
) -> Result<String> {
    Ok(match kind {
        ReportKind::Learning => s1_learning::generate(sources, entity),
        ReportKind::Infrastructure => s2_infrastructure::generate(sources, entity),
        ReportKind::Census => s3_census::generate(sources, entity),
        ReportKind::Ideb => match tables {
            Ok(tables) => s4_ideb::generate(sources.code(), entity, tables.as_ref()),
            Err(e) => anyhow::bail!("{:#}", e),
        },
        ReportKind::PassRates => s5_pass_rates::generate(sources, entity),
    })
}

/// Run one report, turning a panic into an error.
fn isolate<F>(render: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            Err(anyhow::anyhow!(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use serde_json::Value;
    use std::time::Duration;

    struct Offline;

    impl Transport for Offline {
        fn get_json(&self, url: &str, _params: &[(String, String)]) -> Result<Value, FetchError> {
            Err(FetchError::Transport { url: url.to_string(), message: "offline".to_string() })
        }
    }

    fn settings() -> Settings {
        let mut settings = Settings::from_lookup(|_| None);
        settings.municipal_table = "/nonexistent/mun.csv".into();
        settings.state_table = "/nonexistent/uf.csv".into();
        settings.retry.attempts = 1;
        settings.retry.backoff = Duration::ZERO;
        settings.reference_year = 2024;
        settings
    }

    #[test]
    fn test_offline_run_still_yields_five_reports() {
        let generator = ReportGenerator::with_transport(settings(), Arc::new(Offline));
        let code = TerritoryCode::parse("2304400").unwrap();
        let bundle = generator.generate(&code).unwrap();

        assert_eq!(bundle.entity, "IBGE_2304400");
        assert_eq!(bundle.uf, "??");
        assert_eq!(bundle.kind, "municipio");
        assert_eq!(bundle.reports.len(), 5);
        for kind in REPORT_KINDS {
            assert!(bundle.report(kind).unwrap().contains("⚠️"), "{:?}", kind);
        }
        assert!(bundle.summary.census.is_none());
    }

    #[test]
    fn test_output_dir_receives_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings();
        settings.output_dir = Some(dir.path().to_path_buf());

        let generator = ReportGenerator::with_transport(settings, Arc::new(Offline));
        let code = TerritoryCode::parse("23").unwrap();
        let bundle = generator.generate(&code).unwrap();

        assert_eq!(bundle.entity, "Ceará");
        assert_eq!(bundle.kind, "estado");
        assert!(dir.path().join("23").join("Ceara_censo.txt").exists());
    }

    #[test]
    fn test_failed_table_load_fails_only_ideb() {
        let fetcher = Fetcher::new(Arc::new(Offline), settings().retry);
        let code = TerritoryCode::parse("2304400").unwrap();
        let sources = Sources::new(&fetcher, "http://api", &code, 2024);
        let entity = Entity::fallback(&code);
        let tables: Result<Option<ReferenceTables>> = Err(anyhow::anyhow!("bad table"));

        let err = render(ReportKind::Ideb, &sources, &entity, &tables).unwrap_err();
        assert_eq!(err.to_string(), "bad table");
        assert!(render(ReportKind::Census, &sources, &entity, &tables).is_ok());
    }

    #[test]
    fn test_missing_tables_render_ideb_placeholder() {
        let fetcher = Fetcher::new(Arc::new(Offline), settings().retry);
        let code = TerritoryCode::parse("2304400").unwrap();
        let sources = Sources::new(&fetcher, "http://api", &code, 2024);
        let text = render(ReportKind::Ideb, &sources, &Entity::fallback(&code), &Ok(None)).unwrap();
        assert!(text.contains("Sem dados IDEB"));
    }

    #[test]
    fn test_isolate_turns_panics_into_errors() {
        let err = isolate(|| panic!("boom")).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(isolate(|| Ok("ok".to_string())).unwrap(), "ok");
    }
}
