pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use self::core::{
    contacts::contacts_by_depth,
    etl::StatsEngine,
    pipeline::StatisticsPipeline,
    registry::PassengerRegistry,
    statistics::{calculate_r_naught, PassengerStatistics, SeverityBreakdown, R_NAUGHT_UNDEFINED},
};
pub use domain::model::{Passenger, PassengerSummary, StatisticsReport, SymptomSeverity};
pub use domain::ports::PassengerSource;
pub use utils::error::{Result, StatsError};
