use crate::utils::error::{Result, StatsError};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Symptom level a passenger is experiencing. Severities never move back
/// down in this model, there is no recovery transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymptomSeverity {
    NotInfected,
    Mild,
    Severe,
    Critical,
}

impl SymptomSeverity {
    pub const ALL: [SymptomSeverity; 4] = [
        SymptomSeverity::NotInfected,
        SymptomSeverity::Mild,
        SymptomSeverity::Severe,
        SymptomSeverity::Critical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SymptomSeverity::NotInfected => "Not Infected",
            SymptomSeverity::Mild => "Mild",
            SymptomSeverity::Severe => "Severe",
            SymptomSeverity::Critical => "Critical",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            SymptomSeverity::NotInfected => "N",
            SymptomSeverity::Mild => "M",
            SymptomSeverity::Severe => "S",
            SymptomSeverity::Critical => "C",
        }
    }

    /// Matches either the display name or the one-letter abbreviation.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name() == value || s.abbreviation() == value)
    }

    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }

    pub fn is_infected(&self) -> bool {
        *self != SymptomSeverity::NotInfected
    }
}

impl fmt::Display for SymptomSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn passenger_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("static regex is valid"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    passenger_id: String,
    name: String,
    symptom_severity: SymptomSeverity,
    initial_symptom_arrival: Option<NaiveDateTime>,
    contacts: Vec<String>,
}

impl Passenger {
    /// 建立乘客並檢查症狀等級與發病時間是否一致
    pub fn new(
        passenger_id: impl Into<String>,
        name: impl Into<String>,
        symptom_severity: SymptomSeverity,
        initial_symptom_arrival: Option<NaiveDateTime>,
    ) -> Result<Self> {
        let passenger_id = passenger_id.into();
        let name = name.into();

        if !passenger_id_pattern().is_match(&passenger_id) {
            return Err(StatsError::InvalidPassengerError {
                message: format!("Invalid Id '{}'", passenger_id),
            });
        }
        if name.trim().is_empty() {
            return Err(StatsError::InvalidPassengerError {
                message: format!("Passenger {} has no name", passenger_id),
            });
        }
        match (symptom_severity.is_infected(), initial_symptom_arrival) {
            (false, Some(_)) => {
                return Err(StatsError::InvalidPassengerError {
                    message: "A Not Infected Passenger should not have an Initial Symptom Date"
                        .to_string(),
                })
            }
            (true, None) => {
                return Err(StatsError::InvalidPassengerError {
                    message: "Must specify initial Symptom Date".to_string(),
                })
            }
            _ => {}
        }

        Ok(Self {
            passenger_id,
            name: name.trim().to_string(),
            symptom_severity,
            initial_symptom_arrival,
            contacts: Vec::new(),
        })
    }

    pub fn passenger_id(&self) -> &str {
        &self.passenger_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symptom_severity(&self) -> SymptomSeverity {
        self.symptom_severity
    }

    pub fn initial_symptom_arrival(&self) -> Option<NaiveDateTime> {
        self.initial_symptom_arrival
    }

    /// Calendar day of the first symptoms, only for infected passengers.
    pub fn infection_date(&self) -> Option<NaiveDate> {
        if !self.symptom_severity.is_infected() {
            return None;
        }
        self.initial_symptom_arrival.map(|arrival| arrival.date())
    }

    pub fn contacts(&self) -> &[String] {
        &self.contacts
    }

    pub fn set_contacts(&mut self, contacts: Vec<String>) {
        self.contacts = contacts;
    }

    pub fn with_contacts<I, T>(mut self, contacts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.contacts = contacts.into_iter().map(Into::into).collect();
        self
    }
}

/// 可安全回傳給前端的乘客資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerSummary {
    pub passenger_id: String,
    pub name: String,
    pub symptom_severity: SymptomSeverity,
    pub initial_symptom_date: Option<NaiveDateTime>,
}

impl From<&Passenger> for PassengerSummary {
    fn from(p: &Passenger) -> Self {
        Self {
            passenger_id: p.passenger_id.clone(),
            name: p.name.clone(),
            symptom_severity: p.symptom_severity,
            initial_symptom_date: p.initial_symptom_arrival,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactTrace {
    pub passenger_id: String,
    pub depth: u32,
    pub levels: BTreeMap<u32, Vec<PassengerSummary>>,
}

/// Everything the presentation layer reads, in one serializable bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub passenger_count: usize,
    pub new_infections_per_day: BTreeMap<NaiveDate, usize>,
    pub total_infections_per_day: BTreeMap<NaiveDate, usize>,
    pub dates: Vec<NaiveDate>,
    pub not_infected: Vec<usize>,
    pub mild: Vec<usize>,
    pub severe: Vec<usize>,
    pub critical: Vec<usize>,
    pub r_naught: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_trace: Option<ContactTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(SymptomSeverity::parse("M"), Some(SymptomSeverity::Mild));
        assert_eq!(SymptomSeverity::parse(" Critical "), Some(SymptomSeverity::Critical));
        assert_eq!(SymptomSeverity::parse("Not Infected"), Some(SymptomSeverity::NotInfected));
        assert_eq!(SymptomSeverity::parse("mild"), None);
        assert_eq!(
            SymptomSeverity::all_names(),
            vec!["Not Infected", "Mild", "Severe", "Critical"]
        );
    }

    #[test]
    fn test_passenger_validation() {
        assert!(Passenger::new("3b9c8a7e", "Doe, John", SymptomSeverity::Mild, Some(at("2020-02-13 08:00:00"))).is_ok());
        assert!(Passenger::new("3b9c8a7e", "Doe, John", SymptomSeverity::NotInfected, None).is_ok());

        // id 只能是英數字
        assert!(Passenger::new("3b-9c", "Doe", SymptomSeverity::NotInfected, None).is_err());
        assert!(Passenger::new("", "Doe", SymptomSeverity::NotInfected, None).is_err());
        assert!(Passenger::new("abc", "  ", SymptomSeverity::NotInfected, None).is_err());
        assert!(Passenger::new("abc", "Doe", SymptomSeverity::Severe, None).is_err());
        assert!(Passenger::new("abc", "Doe", SymptomSeverity::NotInfected, Some(at("2020-02-13 08:00:00"))).is_err());
    }

    #[test]
    fn test_infection_date_ignores_time_of_day() {
        let p = Passenger::new("a1", "Doe", SymptomSeverity::Critical, Some(at("2020-02-13 23:59:59"))).unwrap();
        assert_eq!(p.infection_date(), NaiveDate::from_ymd_opt(2020, 2, 13));

        let healthy = Passenger::new("a2", "Roe", SymptomSeverity::NotInfected, None).unwrap();
        assert_eq!(healthy.infection_date(), None);
    }

    #[test]
    fn test_severity_serializes_as_constant_name() {
        let json = serde_json::to_string(&SymptomSeverity::NotInfected).unwrap();
        assert_eq!(json, "\"NOT_INFECTED\"");
    }
}
