//! # Request adapter
//!
//! Maps a Bedrock model id to the JSON body its `InvokeModel` endpoint expects, and
//! maps the raw response body back to either generated text or decoded image bytes.
//!
//! Every supported model has one entry in [`ADAPTERS`]. The generation parameters in
//! the body builders are fixed per model and must not be changed, the providers reject
//! or silently clamp other shapes.
//!
//! Chat extraction never fails on a missing field: it yields [`NO_RESPONSE`] instead.
//! Image extraction fails with [`Error::MalformedResponse`] when there is no image.
//! A body that isn't JSON at all is [`Error::InvalidJson`] for either family.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::debug;
use serde_json::{Value, json};

use crate::error::{Error, Result};

/// Substituted when a chat response doesn't contain text at the expected path
pub const NO_RESPONSE: &str = "No response";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPayload {
    Text(String),
    Image(Vec<u8>),
}

/// A serialized body ready to be handed to an `InferenceClient`
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub model_id: String,
    pub body: Vec<u8>,
}

impl RequestDescriptor {
    pub fn new(model_id: &str, prompt: &str) -> Result<Self> {
        Ok(Self {
            model_id: model_id.to_string(),
            body: build_request_body(model_id, prompt)?,
        })
    }
}

enum Extractor {
    /// Returns the generated text, `None` means the sentinel is used
    Text(fn(&Value) -> Option<&str>),
    /// Returns the base64 encoded image
    Image(fn(&Value) -> Result<&str, &'static str>),
}

struct Adapter {
    model_id: &'static str,
    build_body: fn(&str) -> Value,
    extract: Extractor,
}

static ADAPTERS: &[Adapter] = &[
    Adapter {
        model_id: "amazon.titan-text-express-v1",
        build_body: titan_text_body,
        extract: Extractor::Text(titan_text_output),
    },
    Adapter {
        model_id: "meta.llama3-70b-instruct-v1:0",
        build_body: llama3_body,
        extract: Extractor::Text(llama3_output),
    },
    Adapter {
        model_id: "mistral.mixtral-8x7b-instruct-v0:1",
        build_body: mixtral_body,
        extract: Extractor::Text(outputs_text),
    },
    Adapter {
        model_id: "cohere.command-r-v1:0",
        build_body: command_r_body,
        extract: Extractor::Text(command_r_output),
    },
    Adapter {
        model_id: "ai21.jamba-1-5-large-v1:0",
        build_body: jamba_body,
        extract: Extractor::Text(jamba_output),
    },
    Adapter {
        model_id: "stability.stable-diffusion-xl-v1",
        build_body: sdxl_body,
        extract: Extractor::Image(sdxl_artifact),
    },
    Adapter {
        model_id: "amazon.titan-image-generator-v2:0",
        build_body: titan_image_body,
        extract: Extractor::Image(titan_image),
    },
];

fn adapter(model_id: &str) -> Result<&'static Adapter> {
    ADAPTERS
        .iter()
        .find(|a| a.model_id == model_id)
        .ok_or_else(|| Error::UnsupportedModel(model_id.to_string()))
}

pub fn is_supported(model_id: &str) -> bool {
    adapter(model_id).is_ok()
}

pub fn build_request_body(model_id: &str, prompt: &str) -> Result<Vec<u8>> {
    let body = (adapter(model_id)?.build_body)(prompt);
    let body = body.to_string();
    debug!("Request body for {model_id}: {body}");
    Ok(body.into_bytes())
}

pub fn extract_result(model_id: &str, raw_body: &[u8]) -> Result<ResultPayload> {
    let adapter = adapter(model_id)?;
    let response: Value = serde_json::from_slice(raw_body)
        .map_err(|source| Error::InvalidJson {
            model_id: model_id.to_string(),
            source,
        })?;

    match adapter.extract {
        Extractor::Text(extract) => Ok(ResultPayload::Text(
            extract(&response).unwrap_or(NO_RESPONSE).to_string(),
        )),
        Extractor::Image(extract) => {
            let encoded = extract(&response).map_err(|reason| Error::malformed(model_id, reason))?;
            let bytes = BASE64
                .decode(encoded.trim())
                .map_err(|e| Error::malformed(model_id, format!("invalid base64 image: {e}")))?;
            Ok(ResultPayload::Image(bytes))
        }
    }
}

fn titan_text_body(prompt: &str) -> Value {
    json!({
        "inputText": prompt,
        "textGenerationConfig": {
            "maxTokenCount": 8192,
            "stopSequences": [],
            "temperature": 0.7,
            "topP": 0.9,
        },
    })
}

fn llama3_body(prompt: &str) -> Value {
    json!({
        "prompt": prompt,
        "max_gen_len": 512,
        "temperature": 0.5,
        "top_p": 0.9,
    })
}

fn mixtral_body(prompt: &str) -> Value {
    json!({
        "prompt": format!("<s>[INST] {prompt} [/INST]"),
        "max_tokens": 512,
        "temperature": 0.5,
        "top_p": 0.9,
    })
}

fn command_r_body(prompt: &str) -> Value {
    json!({
        "message": prompt,
        "chat_history": [],
        "max_tokens": 512,
        "temperature": 0.5,
    })
}

fn jamba_body(prompt: &str) -> Value {
    json!({
        "messages": [{ "role": "user", "content": prompt }],
        "max_tokens": 1000,
        "temperature": 0.7,
        "top_p": 0.9,
    })
}

fn sdxl_body(prompt: &str) -> Value {
    json!({
        "text_prompts": [{ "text": prompt, "weight": 1 }],
        "cfg_scale": 10,
        "seed": 0,
        "steps": 50,
        "width": 512,
        "height": 512,
    })
}

fn titan_image_body(prompt: &str) -> Value {
    json!({
        "textToImageParams": { "text": prompt },
        "taskType": "TEXT_IMAGE",
        "imageGenerationConfig": {
            "cfgScale": 8,
            "seed": 42,
            "quality": "standard",
            "width": 1024,
            "height": 1024,
            "numberOfImages": 1,
        },
    })
}

fn titan_text_output(response: &Value) -> Option<&str> {
    response["results"][0]["outputText"].as_str()
}

fn llama3_output(response: &Value) -> Option<&str> {
    response["generation"].as_str()
}

fn outputs_text(response: &Value) -> Option<&str> {
    response["outputs"][0]["text"].as_str()
}

fn command_r_output(response: &Value) -> Option<&str> {
    response["text"].as_str()
}

/// Jamba answers in the chat-completions shape, older deployments used `outputs`
fn jamba_output(response: &Value) -> Option<&str> {
    outputs_text(response).or_else(|| response["choices"][0]["message"]["content"].as_str())
}

fn sdxl_artifact(response: &Value) -> Result<&str, &'static str> {
    let artifacts = response["artifacts"]
        .as_array()
        .ok_or("missing artifacts array")?;
    artifacts
        .first()
        .ok_or("no artifacts in response")?
        .get("base64")
        .and_then(Value::as_str)
        .ok_or("artifact has no base64 field")
}

fn titan_image(response: &Value) -> Result<&str, &'static str> {
    let image = response["images"]
        .as_array()
        .and_then(|images| images.first())
        .ok_or("No image data found in response")?
        .as_str()
        .ok_or("image entry is not a string")?;

    // data URI, e.g. `data:image/png;base64,iVBOR...`
    Ok(image.split_once(',').map_or(image, |(_, data)| data))
}
