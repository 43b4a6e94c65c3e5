pub mod bundle;
pub mod config;
pub mod discover;
pub mod dispatch;
pub mod run;
