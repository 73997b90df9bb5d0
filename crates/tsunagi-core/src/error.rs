use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid profile: {0}")]
    Profile(String),

    #[error("profile set parse failed: {0}")]
    ProfileSet(#[from] toml::de::Error),
}
