use std::path::{Path, PathBuf};

use color_eyre::Result;
use engine::{client::DEFAULT_REGION, image_store::DEFAULT_OUTPUT_DIR};
use iced::{
    Length,
    widget::{button, column, row, space, text, text_input},
};
use log::info;

use crate::{
    TryIntoExt, bold_text, config_path,
    context::{Config, Context},
    elem_list, form_container, load_config_at,
    message::{UiMessage, ui_messages::OptionsMenu as MyMessage},
    save_ron_file,
    state::{State, Step},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fields {
    region: String,
    output_dir: String,
}

impl Fields {
    fn from_config(config: &Config) -> Self {
        Self {
            region: config.region.clone().unwrap_or_default(),
            output_dir: config.output_dir.display().to_string(),
        }
    }

    /// Writes the fields that differ from `before` into `config`. Blank fields fall back
    /// to the defaults.
    fn apply_changes(&self, before: &Fields, config: &mut Config) {
        if self.region != before.region {
            let region = self.region.trim();
            config.region = (!region.is_empty()).then(|| region.to_string());
        }
        if self.output_dir != before.output_dir {
            let dir = self.output_dir.trim();
            config.output_dir =
                PathBuf::from(if dir.is_empty() { DEFAULT_OUTPUT_DIR } else { dir });
        }
    }
}

/// Only the edits are written, launch flags merged into the running config stay out of
/// the file
fn save_changes(path: &Path, before: &Fields, after: &Fields) -> Result<()> {
    let mut saved = load_config_at(path)?.unwrap_or_default();
    after.apply_changes(before, &mut saved);
    save_ron_file(path, &saved)?;
    info!("Saved config to {}", path.display());
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OptionsMenu {
    parent: Box<dyn State>,
    opened_with: Fields,
    fields: Fields,
}

impl OptionsMenu {
    pub fn new(parent: Box<dyn State>, ctx: &Context) -> Self {
        let fields = Fields::from_config(&ctx.config);
        Self {
            parent,
            opened_with: fields.clone(),
            fields,
        }
    }
}

impl State for OptionsMenu {
    fn update(&mut self, event: UiMessage, ctx: &mut Context) -> Result<Step> {
        use MyMessage::*;

        match event.try_into_ex()? {
            RegionChanged(val) => {
                self.fields.region = val;
                Step::stay()
            }

            OutputDirChanged(val) => {
                self.fields.output_dir = val;
                Step::stay()
            }

            Ok => {
                if self.fields != self.opened_with {
                    self.fields
                        .apply_changes(&self.opened_with, &mut ctx.config);
                    ctx.reset_client();
                    save_changes(&config_path()?, &self.opened_with, &self.fields)?;
                }
                Step::goto(self.parent.clone())
            }

            Cancel => Step::goto(self.parent.clone()),
        }
    }

    fn view<'a>(&'a self, _ctx: &'a Context) -> iced::Element<'a, UiMessage> {
        let items = elem_list![
            bold_text("Options").width(Length::Fill).center(),
            space().height(20),
            text("AWS Region"),
            text_input(
                &format!("{DEFAULT_REGION} (or AWS_REGION)"),
                &self.fields.region
            )
            .on_input(|s| MyMessage::RegionChanged(s).into())
            .width(Length::Fill),
            space().height(20),
            text("Image Output Directory"),
            text_input(DEFAULT_OUTPUT_DIR, &self.fields.output_dir)
                .on_input(|s| MyMessage::OutputDirChanged(s).into())
                .width(Length::Fill),
            space().height(20),
            text(
                "Credentials are taken from the AWS_BEARER_TOKEN_BEDROCK environment variable."
            ),
            space().height(30),
            row![
                button("Ok").on_press(MyMessage::Ok.into()),
                button("Cancel").on_press(MyMessage::Cancel.into()),
            ]
            .spacing(10),
        ];

        form_container(column(items).spacing(12).width(Length::Fill)).into()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::load_ron_file;

    fn edited(region: &str, output_dir: &str) -> Fields {
        Fields {
            region: region.into(),
            output_dir: output_dir.into(),
        }
    }

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let mut config = Config {
            region: Some("eu-west-1".into()),
            output_dir: PathBuf::from("imgs"),
            ..Default::default()
        };
        let before = Fields::from_config(&config);
        edited("   ", "").apply_changes(&before, &mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn fields_are_trimmed() {
        let mut config = Config::default();
        let before = Fields::from_config(&config);
        edited(" ap-south-1 ", " out ").apply_changes(&before, &mut config);
        assert_eq!(config.region.as_deref(), Some("ap-south-1"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn launch_flags_are_not_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ron");
        fs::write(&path, r#"(region: Some("us-west-2"))"#).unwrap();

        // as if started with --region eu-west-1 --endpoint http://localhost:4566
        let running = Config {
            region: Some("eu-west-1".into()),
            endpoint: Some("http://localhost:4566".into()),
            ..Default::default()
        };
        let before = Fields::from_config(&running);
        let after = edited("eu-west-1", "renders");
        save_changes(&path, &before, &after).unwrap();

        let saved: Config = load_ron_file(&path).unwrap();
        assert_eq!(saved.region.as_deref(), Some("us-west-2"));
        assert_eq!(saved.endpoint, None);
        assert_eq!(saved.output_dir, PathBuf::from("renders"));
    }

    #[test]
    fn first_save_creates_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ron");
        let before = Fields::from_config(&Config::default());
        save_changes(&path, &before, &edited("ca-central-1", "generated_images"))
            .unwrap();

        let saved: Config = load_ron_file(&path).unwrap();
        assert_eq!(saved.region.as_deref(), Some("ca-central-1"));
        assert_eq!(saved.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }
}
