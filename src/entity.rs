//! Display name and state abbreviation for a territory code.
//!
//! Lookup order:
//! 1. built-in federative-unit table (state codes)
//! 2. pass-rate comparison (`entidade[0]` / `parent[0]` territories), AI then AF
//! 3. enrollment census for the public network
//! 4. municipality reference table
//! 5. `IBGE_<code>` / `??`

use serde_json::Value;

use crate::data::ReferenceTables;
use crate::sources::{candidate_years, Cycle, Network, Sources, FALLBACK_WINDOW};
use crate::territory::TerritoryCode;
use crate::utils::json::*;

pub const UNKNOWN_UF: &str = "??";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub uf: String,
}

impl Entity {
    fn new(name: impl Into<String>, uf: impl Into<String>) -> Self {
        Self { name: name.into(), uf: uf.into() }
    }

    pub fn fallback(code: &TerritoryCode) -> Self {
        Self::new(format!("IBGE_{}", code), UNKNOWN_UF)
    }
}

/// `territorio` of the first record in `raw[key]` (or its `rendimento` wrapper).
fn first_territory<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let list = keys.iter().filter_map(|k| raw.get(*k)).find(|v| truthy(v))?;
    let first = list.as_array()?.first()?;
    let inner = first.get("rendimento").filter(|v| v.is_object()).unwrap_or(first);
    inner.get("territorio")
}

fn from_pass_rates(sources: &Sources) -> Option<Entity> {
    let years = candidate_years(sources.reference_year(), FALLBACK_WINDOW);
    for cycle in [Cycle::EarlyYears, Cycle::LaterYears] {
        for &year in &years {
            let Some(raw) = sources.pass_rates_raw(cycle, Network::All, year).filter(|r| truthy(r)) else {
                continue;
            };
            let name = first_territory(&raw, &["entidade", "municipio"])
                .and_then(|t| get_str(t, "nome"))
                .filter(|n| !n.is_empty());
            if let Some(name) = name {
                let uf = first_territory(&raw, &["parent", "estado"])
                    .and_then(|t| get_str(t, "sigla"))
                    .unwrap_or(UNKNOWN_UF);
                return Some(Entity::new(name, uf));
            }
            // Answered without a name: older years will not have one either.
            break;
        }
    }
    None
}

fn from_census(sources: &Sources) -> Option<Entity> {
    let census = sources.census(Network::Public)?;
    let name = census.territory_name().filter(|n| !n.is_empty())?;
    Some(Entity::new(name, census.parent_abbrev().unwrap_or(UNKNOWN_UF)))
}

fn from_reference_table(code: &TerritoryCode, tables: Option<&ReferenceTables>) -> Option<Entity> {
    let (name, uf) = tables?.municipality_label(code.as_str())?;
    Some(Entity::new(name, uf))
}

/// Resolve the display name and UF for the territory behind `sources`.
pub fn resolve(sources: &Sources, tables: Option<&ReferenceTables>) -> Entity {
    let code = sources.code();
    if let Some(uf) = code.federative_unit() {
        return Entity::new(uf.name, uf.abbrev);
    }

    let entity = from_pass_rates(sources)
        .or_else(|| from_census(sources))
        .or_else(|| from_reference_table(code, tables))
        .unwrap_or_else(|| Entity::fallback(code));

    tracing::debug!("Resolved {} to {} ({})", code, entity.name, entity.uf);
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::data::IdebRecord;
    use crate::fetch::{FetchError, Fetcher, Transport};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    /// Answers every URL containing `needle` with `body`; everything else fails.
    struct OneRoute {
        needle: &'static str,
        body: Value,
    }

    impl Transport for OneRoute {
        fn get_json(&self, url: &str, _params: &[(String, String)]) -> Result<Value, FetchError> {
            if url.contains(self.needle) {
                Ok(self.body.clone())
            } else {
                Err(FetchError::Status { url: url.to_string(), status: 404 })
            }
        }
    }

    fn fetcher(transport: OneRoute) -> Fetcher {
        Fetcher::new(Arc::new(transport), RetryPolicy { attempts: 1, backoff: Duration::ZERO })
    }

    #[test]
    fn test_state_code_uses_builtin_table() {
        let f = fetcher(OneRoute { needle: "nothing", body: json!({}) });
        let code = TerritoryCode::parse("23").unwrap();
        let sources = Sources::new(&f, "http://api", &code, 2026);
        let entity = resolve(&sources, None);
        assert_eq!(entity, Entity::new("Ceará", "CE"));
        assert_eq!(f.cached_entries(), 0);
    }

    #[test]
    fn test_name_from_pass_rates() {
        let f = fetcher(OneRoute {
            needle: "taxa-rendimento",
            body: json!({
                "entidade": [{"rendimento": {"territorio": {"nome": "Fortaleza"}}}],
                "parent": [{"rendimento": {"territorio": {"sigla": "CE"}}}]
            }),
        });
        let code = TerritoryCode::parse("2304400").unwrap();
        let sources = Sources::new(&f, "http://api", &code, 2026);
        assert_eq!(resolve(&sources, None), Entity::new("Fortaleza", "CE"));
    }

    #[test]
    fn test_name_from_census() {
        let f = fetcher(OneRoute {
            needle: "censo",
            body: json!({"censo": {"territorio": {"nome": "Sobral", "parent": {"sigla": "CE"}}}}),
        });
        let code = TerritoryCode::parse("2312908").unwrap();
        let sources = Sources::new(&f, "http://api", &code, 2026);
        assert_eq!(resolve(&sources, None), Entity::new("Sobral", "CE"));
    }

    #[test]
    fn test_fallback_name() {
        let f = fetcher(OneRoute { needle: "nothing", body: json!({}) });
        let code = TerritoryCode::parse("1100015").unwrap();
        let sources = Sources::new(&f, "http://api", &code, 2026);
        assert_eq!(resolve(&sources, None), Entity::new("IBGE_1100015", "??"));
    }

    #[test]
    fn test_name_from_loaded_reference_table() {
        let row = IdebRecord {
            ibge_code: Some("2312908".to_string()),
            uf: Some("CE".to_string()),
            municipality: Some("Sobral".to_string()),
            sphere: Some("municipal".to_string()),
            segment: "anos iniciais".to_string(),
            indicator: Some("IDEB".to_string()),
            year: Some(2023),
            value: Some(8.2),
        };
        let tables = ReferenceTables::from_records(vec![row], Vec::new()).unwrap();

        let f = fetcher(OneRoute { needle: "nothing", body: json!({}) });
        let code = TerritoryCode::parse("2312908").unwrap();
        let sources = Sources::new(&f, "http://api", &code, 2026);
        assert_eq!(resolve(&sources, Some(&tables)), Entity::new("Sobral", "CE"));

        let other = TerritoryCode::parse("1100015").unwrap();
        let sources = Sources::new(&f, "http://api", &other, 2026);
        assert_eq!(resolve(&sources, Some(&tables)), Entity::new("IBGE_1100015", "??"));
    }
}
