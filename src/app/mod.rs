// AppStart - app/mod.rs
//
// Application layer: startup orchestration, concrete log sinks, host
// collaborators (lifecycle, remote config, analytics).
// Dependencies: core, platform, ui, util.

pub mod analytics;
pub mod bootstrap;
pub mod lifecycle;
pub mod remote_config;
pub mod sinks;
