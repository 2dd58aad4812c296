//! Error types for the rolo-yaml document codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("document root is not a key-value mapping")]
  NotAMapping,

  #[error(transparent)]
  Core(#[from] rolo_core::Error),

  #[error("YAML syntax error: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
