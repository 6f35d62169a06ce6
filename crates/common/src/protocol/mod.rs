pub mod assist;
pub mod endpoints;
pub mod history;
