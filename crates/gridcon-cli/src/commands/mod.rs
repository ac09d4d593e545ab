pub mod config;
pub mod epc;
pub mod size;
