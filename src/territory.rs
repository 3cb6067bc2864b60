//! Territory codes and scope resolution
//!
//! An IBGE code is either a 2-digit federative unit (state) or a 7-digit
//! municipality. The code is validated once at the boundary and carries its
//! resolved [`Scope`] from then on.

use std::fmt;
use thiserror::Error;

/// Federative unit (state) from the IBGE code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FederativeUnit {
    pub code: &'static str,
    pub name: &'static str,
    pub abbrev: &'static str,
}

pub const FEDERATIVE_UNITS: &[FederativeUnit] = &[
    FederativeUnit { code: "11", name: "Rondônia", abbrev: "RO" },
    FederativeUnit { code: "12", name: "Acre", abbrev: "AC" },
    FederativeUnit { code: "13", name: "Amazonas", abbrev: "AM" },
    FederativeUnit { code: "14", name: "Roraima", abbrev: "RR" },
    FederativeUnit { code: "15", name: "Pará", abbrev: "PA" },
    FederativeUnit { code: "16", name: "Amapá", abbrev: "AP" },
    FederativeUnit { code: "17", name: "Tocantins", abbrev: "TO" },
    FederativeUnit { code: "21", name: "Maranhão", abbrev: "MA" },
    FederativeUnit { code: "22", name: "Piauí", abbrev: "PI" },
    FederativeUnit { code: "23", name: "Ceará", abbrev: "CE" },
    FederativeUnit { code: "24", name: "Rio Grande do Norte", abbrev: "RN" },
    FederativeUnit { code: "25", name: "Paraíba", abbrev: "PB" },
    FederativeUnit { code: "26", name: "Pernambuco", abbrev: "PE" },
    FederativeUnit { code: "27", name: "Alagoas", abbrev: "AL" },
    FederativeUnit { code: "28", name: "Sergipe", abbrev: "SE" },
    FederativeUnit { code: "29", name: "Bahia", abbrev: "BA" },
    FederativeUnit { code: "31", name: "Minas Gerais", abbrev: "MG" },
    FederativeUnit { code: "32", name: "Espírito Santo", abbrev: "ES" },
    FederativeUnit { code: "33", name: "Rio de Janeiro", abbrev: "RJ" },
    FederativeUnit { code: "35", name: "São Paulo", abbrev: "SP" },
    FederativeUnit { code: "41", name: "Paraná", abbrev: "PR" },
    FederativeUnit { code: "42", name: "Santa Catarina", abbrev: "SC" },
    FederativeUnit { code: "43", name: "Rio Grande do Sul", abbrev: "RS" },
    FederativeUnit { code: "50", name: "Mato Grosso do Sul", abbrev: "MS" },
    FederativeUnit { code: "51", name: "Mato Grosso", abbrev: "MT" },
    FederativeUnit { code: "52", name: "Goiás", abbrev: "GO" },
    FederativeUnit { code: "53", name: "Distrito Federal", abbrev: "DF" },
];

/// Look up a federative unit by its 2-digit IBGE code.
pub fn federative_unit(code: &str) -> Option<&'static FederativeUnit> {
    FEDERATIVE_UNITS.iter().find(|uf| uf.code == code)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerritoryError {
    #[error("Código IBGE inválido: '{0}'. Use 7 dígitos (município) ou 2 dígitos (estado).")]
    Malformed(String),
}

/// Which kind of territory a code addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// 2-digit code. `None` when the code is well-formed but not in the UF table.
    State(Option<&'static FederativeUnit>),
    Municipality,
}

/// Validated IBGE code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryCode {
    code: String,
    scope: Scope,
}

impl TerritoryCode {
    /// Validate a raw code. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, TerritoryError> {
        let code = raw.trim();
        let all_digits = !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit());
        if !all_digits {
            return Err(TerritoryError::Malformed(code.to_string()));
        }

        let scope = match code.len() {
            2 => Scope::State(federative_unit(code)),
            7 => Scope::Municipality,
            _ => return Err(TerritoryError::Malformed(code.to_string())),
        };

        Ok(Self { code: code.to_string(), scope })
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_state(&self) -> bool {
        matches!(self.scope, Scope::State(_))
    }

    /// Federative unit for state codes (None for municipalities and unknown states).
    pub fn federative_unit(&self) -> Option<&'static FederativeUnit> {
        match self.scope {
            Scope::State(uf) => uf,
            Scope::Municipality => None,
        }
    }

    /// Territory type label used in the JSON bundle.
    pub fn kind_label(&self) -> &'static str {
        if self.is_state() {
            "estado"
        } else {
            "municipio"
        }
    }
}

impl fmt::Display for TerritoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
