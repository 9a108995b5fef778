use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use engine::{
    Family, ModelSpec, ResultPayload, adapter, catalog,
    client::{BedrockClient, ClientConfig},
    generate,
    image_store::{self, DEFAULT_OUTPUT_DIR},
};
use strum::IntoEnumIterator;

#[derive(clap::Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Lists the available models
    List,
    /// Prints the request body that would be sent
    Body(ModelArgs),
    /// Sends the prompt and prints the text or saves the image
    Run {
        #[command(flatten)]
        model: ModelArgs,
        /// Defaults to AWS_REGION
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Model id or display name
    model: String,
    prompt: String,
}

impl ModelArgs {
    fn model(&self) -> Result<ModelSpec> {
        catalog::lookup(&self.model).ok_or_else(|| {
            eyre!(
                "Unknown model '{}', see the `list` command for available models",
                self.model
            )
        })
    }

    fn prompt(&self) -> Result<&str> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            Err(eyre!("Please enter a prompt."))
        } else {
            Ok(prompt)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;

    match Cli::parse().command {
        Command::List => {
            for family in Family::iter() {
                println!("# {family}");
                for m in family.models() {
                    println!("{:<35} {}", m.display_name, m.model_id);
                }
            }
        }

        Command::Body(args) => {
            let body = adapter::build_request_body(args.model()?.model_id, args.prompt()?)?;
            println!("{}", String::from_utf8_lossy(&body));
        }

        Command::Run {
            model,
            region,
            endpoint,
            output_dir,
        } => {
            let model_spec = model.model()?;
            let config = ClientConfig::from_env()
                .with_region(region)
                .with_endpoint(endpoint);
            let client = BedrockClient::new(&config)?;

            match generate(&client, &model_spec, model.prompt()?).await? {
                ResultPayload::Text(text) => println!("{text}"),
                ResultPayload::Image(bytes) => {
                    let saved = image_store::save_image(&output_dir, &model_spec, &bytes)?;
                    print!("{saved}");
                }
            }
        }
    }

    Ok(())
}
