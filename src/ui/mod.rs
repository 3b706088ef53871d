// AppStart - ui/mod.rs
//
// UI-facing startup hooks. Rendering itself belongs to the host toolkit.
// Dependencies: core (read-only models), util.
// Must NOT depend on: platform, app, direct I/O.

pub mod theme;
