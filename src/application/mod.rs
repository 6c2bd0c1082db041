/// Application layer
///
/// Orchestrates provider clients and local git operations:
/// - `services`: multi-provider aggregation and repository lookup
/// - `use_cases`: the list and clone workflows behind the CLI commands
pub mod services;
pub mod use_cases;

pub use services::MultiProviderService;
