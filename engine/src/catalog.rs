use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, Display, Serialize, Deserialize, Hash, PartialEq, Eq, EnumIter, Default,
)]
pub enum Family {
    #[default]
    Chat,
    Image,
}

impl Family {
    pub fn models(self) -> impl Iterator<Item = ModelSpec> {
        CATALOG.iter().copied().filter(move |m| m.family == self)
    }

    pub fn first_model(self) -> Option<ModelSpec> {
        self.models().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelSpec {
    pub display_name: &'static str,
    pub model_id: &'static str,
    pub family: Family,
}

impl ModelSpec {
    const fn chat(display_name: &'static str, model_id: &'static str) -> Self {
        Self {
            display_name,
            model_id,
            family: Family::Chat,
        }
    }

    const fn image(display_name: &'static str, model_id: &'static str) -> Self {
        Self {
            display_name,
            model_id,
            family: Family::Image,
        }
    }

    /// The part of the model id after the last `.`, e.g. `titan-image-generator-v2:0`
    pub fn short_name(&self) -> &'static str {
        self.model_id
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(self.model_id)
    }
}

/// Shown in pick lists, so it has to be the display name only
impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name)
    }
}

pub static CATALOG: &[ModelSpec] = &[
    ModelSpec::chat(
        "Amazon Titan Text G1 - Express",
        "amazon.titan-text-express-v1",
    ),
    ModelSpec::chat("Meta Llama 3 70B Instruct", "meta.llama3-70b-instruct-v1:0"),
    ModelSpec::chat("Mistral Mixtral 8x7B", "mistral.mixtral-8x7b-instruct-v0:1"),
    ModelSpec::chat("Cohere Command R", "cohere.command-r-v1:0"),
    ModelSpec::chat("AI21 Jamba 1.5 Large", "ai21.jamba-1-5-large-v1:0"),
    ModelSpec::image("Stable Diffusion XL", "stability.stable-diffusion-xl-v1"),
    ModelSpec::image(
        "Amazon Titan Image Generator",
        "amazon.titan-image-generator-v2:0",
    ),
];

pub fn by_id(model_id: &str) -> Option<ModelSpec> {
    CATALOG.iter().copied().find(|m| m.model_id == model_id)
}

pub fn by_name(family: Family, display_name: &str) -> Option<ModelSpec> {
    family.models().find(|m| m.display_name == display_name)
}

/// Accepts either a model id or a display name from any family
pub fn lookup(id_or_name: &str) -> Option<ModelSpec> {
    by_id(id_or_name).or_else(|| {
        CATALOG
            .iter()
            .copied()
            .find(|m| m.display_name.eq_ignore_ascii_case(id_or_name))
    })
}
