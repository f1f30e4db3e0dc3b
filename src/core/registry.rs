use crate::domain::model::{ImportSummary, Passenger, SymptomSeverity};
use crate::domain::ports::PassengerSource;
use crate::utils::error::{Result, StatsError};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};

pub const SYMPTOM_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// In-memory passenger store, keyed by passenger id.
#[derive(Debug, Clone, Default)]
pub struct PassengerRegistry {
    passengers: BTreeMap<String, Passenger>,
}

impl PassengerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_passengers(passengers: impl IntoIterator<Item = Passenger>) -> Self {
        Self {
            passengers: passengers
                .into_iter()
                .map(|p| (p.passenger_id().to_string(), p))
                .collect(),
        }
    }

    pub fn get(&self, passenger_id: &str) -> Option<&Passenger> {
        self.passengers.get(passenger_id)
    }

    pub fn contains(&self, passenger_id: &str) -> bool {
        self.passengers.contains_key(passenger_id)
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn into_passengers(self) -> Vec<Passenger> {
        self.passengers.into_values().collect()
    }

    /// 刪除所有乘客
    pub fn clear(&mut self) {
        tracing::info!("🗑️ Deleting {} passengers", self.passengers.len());
        self.passengers.clear();
    }

    /// Passenger id to display name.
    pub fn passenger_names(&self) -> BTreeMap<String, String> {
        self.passengers
            .values()
            .map(|p| (p.passenger_id().to_string(), p.name().to_string()))
            .collect()
    }

    /// Imports rows of `id,"Last, First",severity[,yyyy/MM/dd HH:mm:ss]`.
    ///
    /// Ids already known (or repeated within the upload) are skipped. A single
    /// malformed row rejects the whole upload and leaves the registry untouched.
    pub fn import_passengers(&mut self, csv_text: &str) -> Result<ImportSummary> {
        if csv_text.trim().is_empty() || !csv_text.contains(',') {
            return Err(StatsError::ImportError {
                line: 0,
                message: "Empty or invalid passenger file".to_string(),
            });
        }

        let mut reader = csv_reader(csv_text);
        let mut summary = ImportSummary::default();
        let mut seen = HashSet::new();
        let mut new_passengers = Vec::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            if record.iter().all(str::is_empty) {
                continue;
            }
            if record.len() < 3 || record.len() > 4 {
                return Err(StatsError::ImportError {
                    line,
                    message: format!("Expected 3 or 4 fields, found {}", record.len()),
                });
            }

            let id = &record[0];
            if self.contains(id) || !seen.insert(id.to_string()) {
                tracing::debug!("Skipping duplicate passenger {}", id);
                summary.skipped += 1;
                continue;
            }

            let severity = SymptomSeverity::parse(&record[2]).ok_or_else(|| StatsError::ImportError {
                line,
                message: format!("Unknown symptom severity '{}'", &record[2]),
            })?;

            // 未感染者的日期欄位不使用
            let arrival = if severity.is_infected() {
                let raw = record.get(3).unwrap_or_default();
                let parsed = NaiveDateTime::parse_from_str(raw, SYMPTOM_DATE_FORMAT).map_err(|e| {
                    StatsError::ImportError {
                        line,
                        message: format!("Invalid symptom date '{}': {}", raw, e),
                    }
                })?;
                Some(parsed)
            } else {
                None
            };

            let passenger = Passenger::new(id, &record[1], severity, arrival).map_err(|e| {
                StatsError::ImportError {
                    line,
                    message: e.to_string(),
                }
            })?;
            new_passengers.push(passenger);
            summary.added += 1;
        }

        if summary.added == 0 {
            if summary.skipped > 0 {
                return Err(StatsError::AllDuplicatesError {
                    skipped: summary.skipped,
                });
            }
            return Err(StatsError::ImportError {
                line: 0,
                message: "No passengers found in upload".to_string(),
            });
        }

        for passenger in new_passengers {
            self.passengers
                .insert(passenger.passenger_id().to_string(), passenger);
        }

        tracing::info!(
            "📥 Imported {} passengers ({} duplicates skipped)",
            summary.added,
            summary.skipped
        );
        Ok(summary)
    }

    /// Imports rows of `rootId,contactId,contactId,...`, replacing each root's
    /// contact list. Every id must be known and a contact may appear only once
    /// per row, otherwise nothing is changed.
    pub fn import_contacts(&mut self, csv_text: &str) -> Result<usize> {
        if csv_text.trim().is_empty() || !csv_text.contains(',') {
            return Err(StatsError::ImportError {
                line: 0,
                message: "Empty or invalid contacts file".to_string(),
            });
        }

        // 上傳檔案可能是 JSON 字串：去掉引號，轉義過的 \r\n 還原成換行
        let normalized = csv_text.replace('"', "").replace("\\r\\n", "\n");
        let mut reader = csv_reader(&normalized);
        let mut updates: Vec<(String, Vec<String>)> = Vec::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let ids: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
            let Some((root, contacts)) = ids.split_first() else {
                continue;
            };

            if !self.contains(root) {
                return Err(StatsError::ImportError {
                    line,
                    message: format!("Unknown passenger id '{}'", root),
                });
            }

            let mut seen = HashSet::new();
            for contact in contacts {
                if !self.contains(contact) {
                    return Err(StatsError::ImportError {
                        line,
                        message: format!("Unknown contact id '{}'", contact),
                    });
                }
                if !seen.insert(*contact) {
                    return Err(StatsError::ImportError {
                        line,
                        message: format!("Contact '{}' listed twice for '{}'", contact, root),
                    });
                }
            }

            updates.push((
                root.to_string(),
                contacts.iter().map(|c| c.to_string()).collect(),
            ));
        }

        let tracked = updates.len();
        for (root, contacts) in updates {
            if let Some(passenger) = self.passengers.get_mut(&root) {
                passenger.set_contacts(contacts);
            }
        }

        tracing::info!("📥 Imported contact lists for {} passengers", tracked);
        Ok(tracked)
    }
}

impl PassengerSource for PassengerRegistry {
    fn passengers(&self) -> Vec<Passenger> {
        self.passengers.values().cloned().collect()
    }
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}
