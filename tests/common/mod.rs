// Shared fixtures for the integration tests: a scripted in-memory transport
// standing in for the statistics API, plus settings that never touch disk
// or the network.

#![allow(dead_code)]

use qedu_reports::{FetchError, RetryPolicy, Settings, Transport};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One canned answer: URL suffix plus the parameters that must match.
struct Route {
    suffix: String,
    params: Vec<(String, String)>,
    body: Value,
}

/// Serves canned payloads; unmatched requests fail with 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    calls: AtomicUsize,
    log: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `body` for URLs ending in `suffix` whose parameters include all of `params`.
    pub fn route(mut self, suffix: &str, params: &[(&str, &str)], body: Value) -> Self {
        self.routes.push(Route {
            suffix: suffix.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body,
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.log.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push((url.to_string(), params.to_vec()));

        self.routes
            .iter()
            .find(|r| url.ends_with(&r.suffix) && r.params.iter().all(|p| params.contains(p)))
            .map(|r| r.body.clone())
            .ok_or_else(|| FetchError::Status { url: url.to_string(), status: 404 })
    }
}

/// Settings pinned to 2024, one attempt per request, tables under `data_dir`.
pub fn test_settings(data_dir: &Path) -> Settings {
    let mut settings = Settings::from_lookup(|_| None);
    settings.base_url = "http://qedu.test/api/v1".to_string();
    settings.municipal_table = data_dir.join("ideb_municipios.csv");
    settings.state_table = data_dir.join("ideb_estados.csv");
    settings.output_dir = None;
    settings.retry = RetryPolicy { attempts: 1, backoff: Duration::ZERO };
    settings.reference_year = 2024;
    settings
}

// ============================================================================
// Canned payloads for Sobral (CE), IBGE 2312908
// ============================================================================

pub const SOBRAL: &str = "2312908";

pub fn census_payload() -> Value {
    json!({
        "censo": {
            "territorio": {"nome": "Sobral", "parent": {"sigla": "CE"}},
            "qtd_escolas": 120,
            "matriculas_creche": 3000,
            "matriculas_pre_escolar": 4000,
            "matriculas_anos_iniciais": 12000,
            "matriculas_anos_finais": 9000,
            "matriculas_eja": 1000,
            "matriculas_1ano": 2500,
            "matriculas_6ano": 2300
        }
    })
}

pub fn pass_rates_payload(year: i64) -> Value {
    json!({
        "entidade": [
            {"ano": year, "rendimento": {
                "aprovados": 0.962, "reprovados": 0.031, "abandonos": 0.007,
                "territorio": {"nome": "Sobral", "sigla": "Sobral"}
            }},
            {"ano": year - 1, "rendimento": {
                "aprovados": 0.951, "reprovados": 0.04, "abandonos": 0.009,
                "territorio": {"nome": "Sobral", "sigla": "Sobral"}
            }}
        ],
        "parent": [
            {"ano": year, "rendimento": {
                "aprovados": 0.93, "reprovados": 0.05, "abandonos": 0.02,
                "territorio": {"nome": "Ceará", "sigla": "CE"}
            }}
        ],
        "brasil": [
            {"ano": year, "rendimento": {
                "aprovados": 0.92, "reprovados": 0.06, "abandonos": 0.02,
                "territorio": {"nome": "Brasil", "sigla": "BR"}
            }}
        ]
    })
}

pub fn infra_payload() -> Value {
    json!([
        {"items": [
            {"label": "Internet", "values": [
                {"entidade": "Municipio", "value": 0.85},
                {"entidade": "Estado", "value": 0.78},
                {"entidade": "Brasil", "value": 0.81}
            ]},
            {"label": "Biblioteca", "values": [
                {"entidade": "Municipio", "value": 42.0},
                {"entidade": "Estado", "value": 35.5},
                {"entidade": "Brasil", "value": null}
            ]}
        ]}
    ])
}

pub fn learning_payload() -> Value {
    json!([
        [
            {"ano": 2023, "lp_adequado": 0.71, "mt_adequado": 0.62,
             "lp_insuficiente": 0.05, "lp_basico": 0.24, "lp_proficiente": 0.45, "lp_avancado": 0.26,
             "territorio": {"ibge_id": 2312908, "parent_id": 23}},
            {"ano": 2021, "lp_adequado": 0.66, "mt_adequado": 0.55,
             "territorio": {"ibge_id": 2312908, "parent_id": 23}}
        ],
        [
            {"ano": 2023, "lp_adequado": 0.52, "mt_adequado": 0.41,
             "territorio": {"ibge_id": 7}}
        ]
    ])
}

/// Transport with every endpoint populated; pass rates and census only for 2023.
pub fn sobral_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .route("/censo/territorios/matriculas", &[("ibge_id", SOBRAL), ("ano", "2023")], census_payload())
        .route(&format!("/infra/{}/comparativo", SOBRAL), &[("ano", "2023")], infra_payload())
        .route(&format!("/aprendizado/{}/ultimos-comparativo", SOBRAL), &[], learning_payload())
        .route(
            &format!("/taxa-rendimento/taxa-rendimento/{}/comparacao", SOBRAL),
            &[("ano", "2023")],
            pass_rates_payload(2023),
        )
}

/// Minimal IDEB tables for Sobral and two states.
pub fn write_reference_tables(dir: &Path) {
    let mun = "Codigo_IBGE,indicador_municipio,indicador_uf,esfera,segmento,indicador_tipo_nome,ano,valor\n\
               2312908,Sobral,CE,municipal,Anos Iniciais,IDEB,2019,7.9\n\
               2312908,Sobral,CE,municipal,Anos Iniciais,IDEB,2021,7.6\n\
               2312908,Sobral,CE,municipal,Anos Iniciais,IDEB,2023,8.2\n\
               2312908,Sobral,CE,municipal,Anos Finais,IDEB,2021,-\n";
    let uf = "indicador_uf;esfera;segmento;indicador_tipo_nome;ano;valor_numerico\n\
              CE;estadual;anos iniciais;IDEB;2019;6,3\n\
              CE;estadual;anos iniciais;IDEB;2021;6,0\n\
              CE;estadual;anos iniciais;IDEB;2023;6,4\n\
              SP;estadual;anos iniciais;IDEB;2019;6,5\n\
              SP;estadual;anos iniciais;IDEB;2021;6,2\n\
              SP;estadual;anos iniciais;IDEB;2023;6,3\n\
              CE;estadual;medio;IDEB;2023;4,4\n";
    std::fs::write(dir.join("ideb_municipios.csv"), mun).unwrap();
    std::fs::write(dir.join("ideb_estados.csv"), uf).unwrap();
}
