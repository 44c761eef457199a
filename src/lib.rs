pub mod app;
pub mod cli;
pub mod display;
pub mod logging;
pub mod realm;
pub mod settings;
pub mod store;
pub mod types;
pub mod ui;
pub mod ui_state;
pub mod window;
