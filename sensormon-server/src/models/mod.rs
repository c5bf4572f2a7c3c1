mod audit;
mod equipment;
mod reading;
mod stats;

pub use audit::{AuditChannel, AuditEvent};
pub use equipment::EquipmentState;
pub use reading::{Reading, ReadingRecord, ReadingTable, format_clock, format_timestamp, local_now};
pub use stats::{AggregateStats, RecentWindow};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;
}
