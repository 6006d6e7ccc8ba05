pub mod context;
pub mod draft;
pub mod outlet;
pub mod prompt;
pub mod request;
pub mod research;
pub mod review;
pub mod state;
pub mod workflow;
