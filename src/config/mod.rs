pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::core::{ConfigProvider, TraceRequest};
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_non_empty_string, validate_output_formats, validate_path,
        validate_positive_number, validate_range, validate_source, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "outbreak-stats")]
    #[command(about = "Infection statistics, R0 estimation and contact tracing for passenger data")]
    pub struct CliConfig {
        /// Passenger CSV: a local file or an http(s) endpoint
        #[arg(long)]
        pub passengers: String,

        /// Optional contact list CSV: a local file or an http(s) endpoint
        #[arg(long)]
        pub contacts: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_values = ["json", "csv"])]
        pub output_formats: Vec<String>,

        /// Pack all report files into this ZIP archive
        #[arg(long)]
        pub archive: Option<String>,

        /// Passenger id to start a contact search from
        #[arg(long)]
        pub trace: Option<String>,

        #[arg(long, default_value = "1")]
        pub trace_depth: u32,

        #[arg(long, default_value = "30")]
        pub timeout_seconds: u64,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl ConfigProvider for CliConfig {
        fn passengers_source(&self) -> &str {
            &self.passengers
        }

        fn contacts_source(&self) -> Option<&str> {
            self.contacts.as_deref()
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }

        fn contact_trace(&self) -> Option<TraceRequest> {
            self.trace.as_ref().map(|id| TraceRequest {
                passenger_id: id.clone(),
                depth: self.trace_depth,
            })
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_seconds)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_source("passengers", &self.passengers)?;
            if let Some(contacts) = &self.contacts {
                validate_source("contacts", contacts)?;
            }
            validate_path("output_path", &self.output_path)?;
            validate_output_formats("output_formats", &self.output_formats)?;
            if let Some(archive) = &self.archive {
                validate_non_empty_string("archive", archive)?;
            }
            if let Some(trace) = &self.trace {
                validate_non_empty_string("trace", trace)?;
                validate_positive_number("trace_depth", self.trace_depth as usize, 1)?;
            }
            validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
            Ok(())
        }
    }

}
