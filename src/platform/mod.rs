// AppStart - platform/mod.rs
//
// Platform abstraction layer: directories, config and preference files,
// device locale, log file rotation.
// Dependencies: core, util, standard library, directories crate.
// Must NOT depend on: app, ui.

pub mod config;
pub mod prefs;
pub mod rotating_file;
pub mod system_locale;
