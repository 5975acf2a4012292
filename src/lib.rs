pub mod accuracy;
pub mod award;
pub mod config;
pub mod history;
pub mod ledger;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod rookie;
pub mod scoring;
pub mod snapshot;
