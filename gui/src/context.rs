use std::path::PathBuf;

use color_eyre::Result;
use engine::{
    ClientBox,
    client::{BedrockClient, ClientConfig},
    image_store::DEFAULT_OUTPUT_DIR,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Falls back to AWS_REGION, then us-east-1
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::from_env()
            .with_region(self.region.clone())
            .with_endpoint(self.endpoint.clone())
    }
}

pub struct Context {
    pub config: Config,
    client: Option<BedrockClient>,
}

impl Context {
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Creates the client on first use, so that a bad endpoint is reported as a normal error
    pub fn client(&mut self) -> Result<ClientBox> {
        let client = match &self.client {
            Some(c) => c.clone(),
            None => {
                let c = BedrockClient::new(&self.config.client_config())?;
                self.client = Some(c.clone());
                c
            }
        };
        Ok(Box::new(client))
    }

    /// Has to be called after the config changed
    pub fn reset_client(&mut self) {
        self.client = None;
    }
}
