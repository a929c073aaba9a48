pub mod digest;
pub mod insights;
pub mod list;
pub mod setup;
pub mod summary;
pub mod ui;
pub mod upcoming;
