//! Integration test modules for effechain

mod chain;
mod faults;
mod presets;
mod routing;
mod scenarios;
