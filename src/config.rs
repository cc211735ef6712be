use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Any serializable settings struct round-trips through RON
pub trait Config: Send + Sync {
    fn config(&self) -> Result<String>;
    fn load_config(&mut self, config: &str) -> Result<()>;
}

impl<T: Serialize + DeserializeOwned + Send + Sync> Config for T {
    fn config(&self) -> Result<String> {
        ron::to_string(self).context("Failed to serialize config")
    }

    fn load_config(&mut self, config: &str) -> Result<()> {
        *self = ron::from_str(config).context(format!("Failed to load config {}", config))?;
        Ok(())
    }
}

/// How tensors are rendered by `Tensor::display_with`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Digits after the decimal point, `None` prints elements as they are
    pub precision: Option<usize>,
    /// Prefix each matrix block of a rank 3+ tensor with its leading index
    pub label_blocks: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions { precision: None, label_blocks: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_options_roundtrip() {
        let opts = PrintOptions { precision: Some(3), label_blocks: false };
        let s = opts.config().unwrap();
        let mut loaded = PrintOptions::default();
        loaded.load_config(&s).unwrap();
        assert_eq!(loaded, opts);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let mut opts = PrintOptions { precision: Some(2), label_blocks: false };
        opts.load_config("(precision: Some(4))").unwrap();
        assert_eq!(opts, PrintOptions { precision: Some(4), label_blocks: true });
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut opts = PrintOptions::default();
        let err = opts.load_config("(precision: \"four\")").unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
        assert_eq!(opts, PrintOptions::default());
    }
}
