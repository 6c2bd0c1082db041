pub mod full_path;
pub mod provider_type;

pub use full_path::{validate_full_path, FullPathError};
pub use provider_type::{ProviderType, ProviderTypeError};
