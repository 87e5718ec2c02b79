pub mod channel;
pub mod collection;
pub mod error;
pub mod timed_value;
pub mod workload;

pub use self::{
    channel::{Channel, Channels},
    collection::WorkloadCollection,
    error::StatisticsError,
    timed_value::TimedValue,
    workload::Workload,
};
