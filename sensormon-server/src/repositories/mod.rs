mod reading;

pub use reading::{ReadingRepository, ReadingStore};
