mod tcp;

pub use tcp::*;
