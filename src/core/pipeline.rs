use crate::core::contacts::contacts_by_depth;
use crate::core::registry::PassengerRegistry;
use crate::core::statistics::{calculate_r_naught, PassengerStatistics};
use crate::core::{ConfigProvider, Passenger, Pipeline, StatisticsReport, Storage};
use crate::domain::model::ContactTrace;
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::is_http_source;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const JSON_REPORT: &str = "statistics.json";
pub const DAILY_CSV: &str = "daily_infections.csv";
pub const SEVERITY_CSV: &str = "severity_breakdown.csv";
pub const CONTACTS_CSV: &str = "contact_trace.csv";

#[derive(Serialize)]
struct DailyRow {
    date: NaiveDate,
    new_infections: usize,
    total_infections: usize,
}

#[derive(Serialize)]
struct SeverityRow {
    date: NaiveDate,
    not_infected: usize,
    mild: usize,
    severe: usize,
    critical: usize,
}

#[derive(Serialize)]
struct ContactRow<'a> {
    level: u32,
    passenger_id: &'a str,
    name: &'a str,
    symptom_severity: &'static str,
}

pub struct StatisticsPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> StatisticsPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 依來源類型讀取 CSV 內容：HTTP(S) 端點或本地檔案
    async fn read_source(&self, source: &str) -> Result<String> {
        if is_http_source(source) {
            tracing::debug!("Making HTTP request to: {}", source);
            let response = self
                .client
                .get(source)
                .timeout(self.config.request_timeout())
                .send()
                .await?;

            tracing::debug!("HTTP response status: {}", response.status());
            if !response.status().is_success() {
                return Err(StatsError::HttpStatusError {
                    url: source.to_string(),
                    status: response.status().as_u16(),
                });
            }
            return Ok(response.text().await?);
        }

        tracing::debug!("Reading file: {}", source);
        let bytes = self.storage.read_file(source).await?;
        String::from_utf8(bytes).map_err(|e| StatsError::ImportError {
            line: 0,
            message: format!("{} is not valid UTF-8: {}", source, e),
        })
    }

    fn render_artifacts(&self, report: &StatisticsReport) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut artifacts = Vec::new();

        for format in self.config.output_formats() {
            match format.as_str() {
                "json" => {
                    artifacts.push((JSON_REPORT, serde_json::to_vec_pretty(report)?));
                }
                "csv" => {
                    artifacts.push((DAILY_CSV, daily_csv(report)?));
                    artifacts.push((SEVERITY_CSV, severity_csv(report)?));
                    if let Some(trace) = &report.contact_trace {
                        artifacts.push((CONTACTS_CSV, contacts_csv(trace)?));
                    }
                }
                other => {
                    return Err(StatsError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            }
        }

        Ok(artifacts)
    }
}

fn finish_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| StatsError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

fn daily_csv(report: &StatisticsReport) -> Result<Vec<u8>> {
    finish_csv(report.new_infections_per_day.iter().map(|(date, new)| DailyRow {
        date: *date,
        new_infections: *new,
        total_infections: report.total_infections_per_day.get(date).copied().unwrap_or(0),
    }))
}

fn severity_csv(report: &StatisticsReport) -> Result<Vec<u8>> {
    finish_csv(report.dates.iter().enumerate().map(|(i, date)| SeverityRow {
        date: *date,
        not_infected: report.not_infected[i],
        mild: report.mild[i],
        severe: report.severe[i],
        critical: report.critical[i],
    }))
}

fn contacts_csv(trace: &ContactTrace) -> Result<Vec<u8>> {
    finish_csv(trace.levels.iter().flat_map(|(level, passengers)| {
        passengers.iter().map(move |p| ContactRow {
            level: *level,
            passenger_id: &p.passenger_id,
            name: &p.name,
            symptom_severity: p.symptom_severity.name(),
        })
    }))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for StatisticsPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Passenger>> {
        // 每次執行都建立新的 registry，不保留上次的資料
        let mut registry = PassengerRegistry::new();

        let passengers_csv = self.read_source(self.config.passengers_source()).await?;
        registry.import_passengers(&passengers_csv)?;

        if let Some(contacts_source) = self.config.contacts_source() {
            let contacts_csv = self.read_source(contacts_source).await?;
            registry.import_contacts(&contacts_csv)?;
        }

        Ok(registry.into_passengers())
    }

    async fn transform(&self, passengers: Vec<Passenger>) -> Result<StatisticsReport> {
        if passengers.is_empty() {
            return Err(StatsError::EmptyDatasetError);
        }

        let stats = PassengerStatistics::from_passengers(&passengers);
        let r_naught = calculate_r_naught(&passengers);

        let contact_trace = match self.config.contact_trace() {
            Some(request) => {
                let levels = contacts_by_depth(&passengers, &request.passenger_id, request.depth)?;
                Some(ContactTrace {
                    passenger_id: request.passenger_id,
                    depth: request.depth,
                    levels,
                })
            }
            None => None,
        };

        let severity = stats.severity().clone();
        Ok(StatisticsReport {
            passenger_count: stats.passenger_count(),
            new_infections_per_day: stats.new_infections_per_day().clone(),
            total_infections_per_day: stats.total_infections_per_day().clone(),
            dates: severity.dates,
            not_infected: severity.not_infected,
            mild: severity.mild,
            severe: severity.severe,
            critical: severity.critical,
            r_naught,
            contact_trace,
        })
    }

    async fn load(&self, report: StatisticsReport) -> Result<String> {
        let artifacts = self.render_artifacts(&report)?;
        let output_dir = Path::new(self.config.output_path());

        if let Some(archive_name) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", artifacts.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &artifacts {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            let archive_path = output_dir.join(archive_name).to_string_lossy().into_owned();
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&archive_path, &zip_data).await?;
            return Ok(archive_path);
        }

        let mut written = Vec::with_capacity(artifacts.len());
        for (name, data) in &artifacts {
            let path = output_dir.join(name).to_string_lossy().into_owned();
            self.storage.write_file(&path, data).await?;
            tracing::debug!("Wrote {} ({} bytes)", path, data.len());
            written.push(path);
        }

        Ok(written.join(", "))
    }
}
