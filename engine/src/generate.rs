use log::{debug, info};

use crate::{
    adapter::{self, RequestDescriptor, ResultPayload},
    catalog::ModelSpec,
    client::InferenceClient,
    error::Result,
};

/// Builds the request for `model`, sends it and extracts the result from the response
pub async fn generate<C>(client: &C, model: &ModelSpec, prompt: &str) -> Result<ResultPayload>
where
    C: InferenceClient + ?Sized,
{
    let request = RequestDescriptor::new(model.model_id, prompt)?;
    info!("Invoking {} ({})", model.display_name, model.model_id);

    let raw = client.invoke(request).await?;
    debug!("{} responded with {} bytes", model.model_id, raw.len());

    adapter::extract_result(model.model_id, &raw)
}
