// AppStart - lib.rs
//
// Library entry point. The binary in `main.rs` is a thin host shim that
// builds the collaborators and calls `app::bootstrap::initialize`.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
