use anyhow::Result;

/// Crate version plus build metadata injected by `build.rs`
pub fn version_string() -> String {
    format!(
        "gitstuff version {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_DATE")
    )
}

/// Handler for the version command
pub struct VersionCommand;

impl VersionCommand {
    pub fn execute(&self) -> Result<()> {
        println!("{}", version_string());
        tracing::debug!(build_target = env!("BUILD_TARGET"), "Build metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_names_the_crate_version() {
        let version = version_string();
        assert!(version.starts_with(&format!("gitstuff version {}", env!("CARGO_PKG_VERSION"))));
    }
}
