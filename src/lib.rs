mod admission;
mod builder;
mod metrics;
mod sketch;

pub use admission::{Admittor, AlwaysAdmit, TinyLfu};
pub use builder::TinyLfuBuilder;
pub use metrics::stats::Metrics;
pub use sketch::count_min::CountMinSketch;
pub use sketch::frequency::FrequencySketch;
