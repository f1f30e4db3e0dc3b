use crate::domain::model::{Passenger, StatisticsReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 乘客資料的提供者，統計模組只透過這個介面取得資料
pub trait PassengerSource {
    fn passengers(&self) -> Vec<Passenger>;
}

impl PassengerSource for [Passenger] {
    fn passengers(&self) -> Vec<Passenger> {
        self.to_vec()
    }
}

impl PassengerSource for Vec<Passenger> {
    fn passengers(&self) -> Vec<Passenger> {
        self.clone()
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRequest {
    pub passenger_id: String,
    pub depth: u32,
}

pub trait ConfigProvider: Send + Sync {
    fn passengers_source(&self) -> &str;
    fn contacts_source(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn archive_name(&self) -> Option<&str>;
    fn contact_trace(&self) -> Option<TraceRequest>;
    fn request_timeout(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Passenger>>;
    async fn transform(&self, passengers: Vec<Passenger>) -> Result<StatisticsReport>;
    async fn load(&self, report: StatisticsReport) -> Result<String>;
}
