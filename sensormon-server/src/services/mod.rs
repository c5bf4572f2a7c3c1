mod audit_service;
mod dashboard_service;
mod evaluator;
mod gate_service;
mod ingest_service;
mod parser;
mod scheduler_service;
mod transport;

pub use audit_service::*;
pub use dashboard_service::*;
pub use evaluator::*;
pub use gate_service::*;
pub use ingest_service::*;
pub use parser::*;
pub use scheduler_service::*;
pub use transport::*;
