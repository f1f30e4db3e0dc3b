pub mod contacts;
pub mod etl;
pub mod pipeline;
pub mod registry;
pub mod statistics;

pub use crate::domain::model::{Passenger, StatisticsReport, SymptomSeverity};
pub use crate::domain::ports::{ConfigProvider, PassengerSource, Pipeline, Storage, TraceRequest};
pub use crate::utils::error::Result;
