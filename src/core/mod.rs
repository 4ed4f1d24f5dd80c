pub mod attributes;
pub mod filter;
pub mod recurrence;
pub mod request;
pub mod search;
pub mod sort;
pub mod task;
