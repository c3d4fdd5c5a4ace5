/// CSV export of dispatch and schedule results.
pub mod export;
