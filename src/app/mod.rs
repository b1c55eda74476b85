pub mod calc;
pub mod caption;
pub mod classifier;
pub mod enrich;
pub mod portfolio;
pub mod report;

pub use classifier::{CategorySource, EtfClassifier};
pub use report::{ChartOptions, ReportConfig, ReportOutput, run};
