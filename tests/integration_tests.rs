use anyhow::Result;
use httpmock::prelude::*;
use outbreak_stats::{CliConfig, LocalStorage, StatisticsPipeline, StatsEngine, StatsError, TomlConfig};
use std::path::Path;
use tempfile::TempDir;

const PASSENGERS: &str = r#"3b9c8a7e,"Doe, John",M,2020/02/13 08:15:00
3b9c8a7f,"Roe, Jane",M,2020/02/14 10:00:00
3b9c8a80,"Poe, Edgar",S,2020/02/14 11:30:00
3b9c8a81,"Moe, Ann",M,2020/02/17 07:45:00
3b9c8a82,"Lee, Sam",C,2020/02/17 09:00:00
3b9c8a83,"Kim, Jo",S,2020/02/17 22:10:00
3b9c8a84,"Fox, Al",M,2020/02/17 23:59:59
3b9c8a85,"Day, Bo",N
3b9c8a86,"Ray, Cy",N
"#;

const CONTACTS: &str = "3b9c8a7e,3b9c8a7f,3b9c8a80\n3b9c8a80,3b9c8a81,3b9c8a85\n3b9c8a81,3b9c8a86\n";

fn cli_config(passengers: String, output_path: &str) -> CliConfig {
    CliConfig {
        passengers,
        contacts: None,
        output_path: output_path.to_string(),
        output_formats: vec!["json".to_string(), "csv".to_string()],
        archive: None,
        trace: None,
        trace_depth: 1,
        timeout_seconds: 5,
        verbose: false,
    }
}

#[tokio::test]
async fn test_end_to_end_with_local_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let passengers_path = temp_dir.path().join("passengers.csv");
    let contacts_path = temp_dir.path().join("contacts.csv");
    tokio::fs::write(&passengers_path, PASSENGERS).await?;
    tokio::fs::write(&contacts_path, CONTACTS).await?;

    let output_dir = temp_dir.path().join("output");
    let mut config = cli_config(
        passengers_path.to_string_lossy().into_owned(),
        output_dir.to_str().unwrap(),
    );
    config.contacts = Some(contacts_path.to_string_lossy().into_owned());
    config.trace = Some("3b9c8a7e".to_string());
    config.trace_depth = 3;

    let pipeline = StatisticsPipeline::new(LocalStorage::default(), config);
    let engine = StatsEngine::new(pipeline);
    engine.run().await?;

    let json: serde_json::Value =
        serde_json::from_slice(&tokio::fs::read(output_dir.join("statistics.json")).await?)?;

    // 02-13 到 02-17，中間兩天補 0
    let daily = json["newInfectionsPerDay"].as_object().unwrap();
    let counts: Vec<i64> = daily.values().map(|v| v.as_i64().unwrap()).collect();
    assert_eq!(daily.len(), 5);
    assert_eq!(counts, vec![1, 2, 0, 0, 4]);
    assert_eq!(json["totalInfectionsPerDay"]["2020-02-17"], 7);
    assert_eq!(json["passengerCount"], 9);
    assert_eq!(json["notInfected"], serde_json::json!([8, 6, 6, 6, 2]));
    assert_eq!(json["mild"], serde_json::json!([1, 2, 2, 2, 4]));
    assert_eq!(json["severe"], serde_json::json!([0, 1, 1, 1, 2]));
    assert_eq!(json["critical"], serde_json::json!([0, 0, 0, 0, 1]));
    // 高峰 02-17：(2/1 + 0/2 + 0/1 + 4/1) / 4
    assert_eq!(json["rNaught"], 1.5);

    let trace = &json["contactTrace"]["levels"];
    assert_eq!(trace["1"].as_array().unwrap().len(), 2);
    assert_eq!(trace["2"].as_array().unwrap().len(), 2);
    assert_eq!(trace["3"][0]["passengerId"], "3b9c8a86");

    let severity_csv = tokio::fs::read_to_string(output_dir.join("severity_breakdown.csv")).await?;
    let lines: Vec<&str> = severity_csv.lines().collect();
    assert_eq!(lines[0], "date,not_infected,mild,severe,critical");
    assert_eq!(lines[5], "2020-02-17,2,4,2,1");
    assert!(output_dir.join("contact_trace.csv").exists());

    Ok(())
}

#[tokio::test]
async fn test_end_to_end_with_http_source_and_archive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/diseasecontrol/passengers.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(PASSENGERS);
    });

    let mut config = cli_config(server.url("/diseasecontrol/passengers.csv"), &output_path);
    config.archive = Some("report.zip".to_string());

    let pipeline = StatisticsPipeline::new(LocalStorage::default(), config);
    let output_file_path = StatsEngine::new(pipeline).run().await?;

    api_mock.assert();
    assert!(output_file_path.ends_with("report.zip"));

    let zip_data = std::fs::read(Path::new(&output_path).join("report.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 3);

    let mut daily_csv = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("daily_infections.csv")?, &mut daily_csv)?;
    assert!(daily_csv.starts_with("date,new_infections,total_infections"));
    assert!(daily_csv.contains("2020-02-15,0,3"));

    Ok(())
}

#[tokio::test]
async fn test_no_infections_yields_empty_series_and_sentinel() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let passengers_path = temp_dir.path().join("healthy.csv");
    tokio::fs::write(&passengers_path, "a1,\"Doe, A\",N\na2,\"Doe, B\",N\n").await?;

    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let mut config = cli_config(passengers_path.to_string_lossy().into_owned(), &output_path);
    config.output_formats = vec!["json".to_string()];

    let pipeline = StatisticsPipeline::new(LocalStorage::default(), config);
    StatsEngine::new(pipeline).run().await?;

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("statistics.json"))?)?;
    assert!(json["newInfectionsPerDay"].as_object().unwrap().is_empty());
    assert!(json["dates"].as_array().unwrap().is_empty());
    assert!(json["notInfected"].as_array().unwrap().is_empty());
    assert_eq!(json["rNaught"], -1.0);
    assert!(json.get("contactTrace").is_none());

    Ok(())
}

#[tokio::test]
async fn test_missing_source_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let config = cli_config(
        temp_dir.path().join("nope.csv").to_string_lossy().into_owned(),
        &output_path,
    );

    let pipeline = StatisticsPipeline::new(LocalStorage::default(), config);
    let err = StatsEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, StatsError::IoError(_)));
}

#[tokio::test]
async fn test_unknown_trace_root_fails() {
    let temp_dir = TempDir::new().unwrap();
    let passengers_path = temp_dir.path().join("passengers.csv");
    std::fs::write(&passengers_path, PASSENGERS).unwrap();

    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let mut config = cli_config(passengers_path.to_string_lossy().into_owned(), &output_path);
    config.trace = Some("ghost".to_string());

    let pipeline = StatisticsPipeline::new(LocalStorage::default(), config);
    let err = StatsEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, StatsError::UnknownPassengerError { .. }));
}

#[tokio::test]
async fn test_toml_config_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");
    tokio::fs::write(format!("{}/passengers.csv", temp_path), PASSENGERS).await?;

    let config_content = format!(
        r#"
[report]
name = "toml-e2e"

[source]
passengers = "{0}/passengers.csv"

[load]
output_path = "{0}/out"
output_formats = ["csv"]
"#,
        temp_path
    );
    let config_path = format!("{}/outbreak-stats.toml", temp_path);
    tokio::fs::write(&config_path, config_content).await?;

    let config = TomlConfig::from_file(&config_path)?;
    let pipeline = StatisticsPipeline::new(LocalStorage::default(), config);
    StatsEngine::new(pipeline).run().await?;

    let out = Path::new(&temp_path).join("out");
    assert!(out.join("daily_infections.csv").exists());
    assert!(out.join("severity_breakdown.csv").exists());
    assert!(!out.join("statistics.json").exists());

    Ok(())
}
