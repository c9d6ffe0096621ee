pub mod list;
pub mod render;
pub mod setup;
pub mod summary;
pub mod ui;
