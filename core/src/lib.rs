pub mod badge;
pub mod config;
pub mod export;
pub mod page;
pub mod progress;
pub mod record;
pub mod view;

pub mod error;
