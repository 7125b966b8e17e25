pub mod audit;
pub mod handlers;
pub mod repository;
pub mod requests;
pub mod resume;
pub mod sync;
pub mod workflow;
