use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::values::UnknownState;

// --- States ---

/// The 27 Brazilian federative units. Serialized as the upper-case UF code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

impl State {
    pub const ALL: [State; 27] = [
        State::AC,
        State::AL,
        State::AP,
        State::AM,
        State::BA,
        State::CE,
        State::DF,
        State::ES,
        State::GO,
        State::MA,
        State::MT,
        State::MS,
        State::MG,
        State::PA,
        State::PB,
        State::PR,
        State::PE,
        State::PI,
        State::RJ,
        State::RN,
        State::RS,
        State::RO,
        State::RR,
        State::SC,
        State::SP,
        State::SE,
        State::TO,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            State::AC => "AC",
            State::AL => "AL",
            State::AP => "AP",
            State::AM => "AM",
            State::BA => "BA",
            State::CE => "CE",
            State::DF => "DF",
            State::ES => "ES",
            State::GO => "GO",
            State::MA => "MA",
            State::MT => "MT",
            State::MS => "MS",
            State::MG => "MG",
            State::PA => "PA",
            State::PB => "PB",
            State::PR => "PR",
            State::PE => "PE",
            State::PI => "PI",
            State::RJ => "RJ",
            State::RN => "RN",
            State::RS => "RS",
            State::RO => "RO",
            State::RR => "RR",
            State::SC => "SC",
            State::SP => "SP",
            State::SE => "SE",
            State::TO => "TO",
        }
    }

    /// Full name of the federative unit, for log lines and reports.
    pub fn name(&self) -> &'static str {
        match self {
            State::AC => "Acre",
            State::AL => "Alagoas",
            State::AP => "Amapá",
            State::AM => "Amazonas",
            State::BA => "Bahia",
            State::CE => "Ceará",
            State::DF => "Distrito Federal",
            State::ES => "Espírito Santo",
            State::GO => "Goiás",
            State::MA => "Maranhão",
            State::MT => "Mato Grosso",
            State::MS => "Mato Grosso do Sul",
            State::MG => "Minas Gerais",
            State::PA => "Pará",
            State::PB => "Paraíba",
            State::PR => "Paraná",
            State::PE => "Pernambuco",
            State::PI => "Piauí",
            State::RJ => "Rio de Janeiro",
            State::RN => "Rio Grande do Norte",
            State::RS => "Rio Grande do Sul",
            State::RO => "Rondônia",
            State::RR => "Roraima",
            State::SC => "Santa Catarina",
            State::SP => "São Paulo",
            State::SE => "Sergipe",
            State::TO => "Tocantins",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == code)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

// --- Output vocabulary ---

/// Value of the `place_type` output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    City,
    State,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::City => "city",
            PlaceType::State => "state",
        }
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The shapes of data a source publishes. A source declares the qualities
/// it expects to deliver; a report exposes the qualities it actually holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportQuality {
    /// Per-county case and death counts
    CountyBulletins,
    /// Counts not attributable to a county (imported or unknown origin)
    UndefinedOrImportedCases,
    /// Only the state-wide total is published
    OnlyTotal,
}

impl std::fmt::Display for ReportQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportQuality::CountyBulletins => write!(f, "county_bulletins"),
            ReportQuality::UndefinedOrImportedCases => write!(f, "undefined_or_imported_cases"),
            ReportQuality::OnlyTotal => write!(f, "only_total"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_parses_case_insensitively() {
        assert_eq!("pr".parse::<State>().unwrap(), State::PR);
        assert_eq!(" SP ".parse::<State>().unwrap(), State::SP);
        assert!("XX".parse::<State>().is_err());
    }

    #[test]
    fn every_state_round_trips_through_its_code() {
        for state in State::ALL {
            assert_eq!(state.as_str().parse::<State>().unwrap(), state);
        }
    }

    #[test]
    fn state_serializes_as_uf_code() {
        assert_eq!(serde_json::to_string(&State::PB).unwrap(), "\"PB\"");
        let parsed: State = serde_json::from_str("\"RS\"").unwrap();
        assert_eq!(parsed, State::RS);
    }

    #[test]
    fn place_type_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&PlaceType::City).unwrap(), "\"city\"");
        assert_eq!(serde_json::to_string(&PlaceType::State).unwrap(), "\"state\"");
    }
}
