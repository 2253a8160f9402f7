pub mod errors;
pub mod notes;
