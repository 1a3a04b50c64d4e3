use anyhow::Result;
use common::{Config, ConfigLoader};
use serde::{Deserialize, Serialize};

use super::layout::LayoutVersion;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodingOptions {
    pub layout: LayoutVersion,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            layout: LayoutVersion::BINARY,
        }
    }
}

impl Config for EncodingOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let layout = match config.get("layout").and_then(|v| v.as_string()) {
            Some(layout) => layout.parse()?,
            None => LayoutVersion::BINARY,
        };

        Ok(Self { layout })
    }
}
