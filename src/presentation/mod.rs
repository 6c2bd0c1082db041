/// Presentation layer
///
/// - `cli`: argument parsing and command handlers
/// - `ui`: terminal formatting shared by the commands
pub mod cli;
pub mod ui;
