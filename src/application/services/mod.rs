pub mod multi_provider;

pub use multi_provider::{AggregateResult, MultiProviderService, ProviderFailure, ProviderTree};
