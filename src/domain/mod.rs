pub mod models;
pub mod operation;
