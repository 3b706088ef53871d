// AppStart - core/mod.rs
//
// Core logic layer: data model, sink fan-out, locale resolution,
// scheduler configuration.
// Must NOT depend on: ui, platform, app, or direct file I/O.

pub mod locale;
pub mod model;
pub mod redact;
pub mod registry;
pub mod scheduler;
