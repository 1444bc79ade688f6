pub mod config;
pub mod python;
pub mod run;
