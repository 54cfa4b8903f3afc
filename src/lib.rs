pub mod audio;
pub mod config;
pub mod event;
pub mod http;
pub mod model;
pub mod services;
pub mod store;
pub mod ui;
pub mod util;
