mod dashboard_handle;

pub use dashboard_handle::*;
