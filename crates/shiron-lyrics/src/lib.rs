pub mod clean;
pub mod genius;
