use std::path::PathBuf;

use crate::context::Config;

#[derive(Debug, clap::Parser)]
pub struct Cli {
    /// AWS region of the Bedrock runtime, overrides the config file and AWS_REGION
    #[arg(short, long)]
    pub region: Option<String>,

    /// Directory generated images are saved to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Custom Bedrock runtime endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl Cli {
    fn has_overrides(&self) -> bool {
        self.region.is_some() || self.output_dir.is_some() || self.endpoint.is_some()
    }

    /// Applies the flags on top of the loaded config. Without a config file and without
    /// flags, `None` is returned, so the first-start message is still shown.
    pub fn apply(self, config: Option<Config>) -> Option<Config> {
        if config.is_none() && !self.has_overrides() {
            return None;
        }

        let mut config = config.unwrap_or_default();
        if let Some(region) = self.region {
            config.region = Some(region);
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = Some(endpoint);
        }
        Some(config)
    }
}
