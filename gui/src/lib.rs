use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use engine::client::ClientConfig;
use iced::{
    Element, Font, Length, Task,
    font::{self},
    widget::{container, text},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    context::{Config, Context},
    message::UiMessage,
    state::{Form, MessageBox, State},
};

pub mod cli;
pub mod context;
pub mod message;
pub mod state;

pub const APP_NAME: &str = "AWS Bedrock Model Interface";
const CONFIG_FILE_NAME: &str = "bedrock_studio.ron";

pub struct Gui {
    state: Box<dyn State>,
    ctx: Context,
}

impl Gui {
    pub fn new(mb_config: Option<Config>) -> Self {
        let first_start = mb_config.is_none();
        let ctx = Context::from_config(mb_config.unwrap_or_default());

        let no_token = ClientConfig::from_env().bearer_token.is_none();
        let state: Box<dyn State> = if first_start && no_token {
            Box::new(MessageBox::info(
                Box::new(Form::new()),
                "Welcome",
                indoc::indoc! {"
                    Requests are authenticated with a Bedrock API key taken from the
                    AWS_BEARER_TOKEN_BEDROCK environment variable, which is not set. Without it,
                    every request will be rejected by AWS.

                    The region is read from AWS_REGION and can be changed under Options.
                    Generated images are saved to the generated_images directory.
                "},
            ))
        } else {
            Box::new(Form::new())
        };

        Gui { state, ctx }
    }

    pub fn update(&mut self, message: UiMessage) -> Task<UiMessage> {
        match self.try_update(message) {
            Ok(task) => task,
            Err(e) => {
                let dialog = MessageBox::error(self.state.clone(), "Error", &format!("{e:?}"));
                self.state = Box::new(dialog);
                Task::none()
            }
        }
    }

    fn try_update(&mut self, message: UiMessage) -> Result<Task<UiMessage>> {
        let step = self.state.update(message, &mut self.ctx)?;
        if let Some(next) = step.next {
            self.state = next;
        }
        Ok(step.task.unwrap_or(Task::none()))
    }

    pub fn view(&self) -> Element<'_, UiMessage> {
        self.state.view(&self.ctx)
    }
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    ron::from_str(&src).wrap_err_with(|| format!("Couldn't parse {}", path.display()))
}

pub fn save_ron_file<T: Serialize>(path: &Path, x: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(path, ron::to_string(x)?)?)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join(CONFIG_FILE_NAME))
}

pub fn load_config() -> Result<Option<Config>> {
    load_config_at(&config_path()?)
}

pub fn load_config_at(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        Ok(None)
    } else {
        load_ron_file(path).map(Some)
    }
}

macro_rules! elem_list {
    ($($elems:expr),+ $(,)?) => {
        [$(iced::Element::from($elems)),*]
    };
}
pub(crate) use elem_list;

fn bold_text<'a>(t: impl text::IntoFragment<'a>) -> iced::widget::Text<'a> {
    iced::widget::text(t).font(bold_default_font())
}

fn bold_default_font() -> Font {
    Font {
        weight: font::Weight::Bold,
        ..Font::DEFAULT
    }
}

fn form_container<'a, T: Send + 'static>(
    elem: impl Into<Element<'a, T>>,
) -> container::Container<'a, T> {
    container(
        container(elem)
            .padding(20)
            .max_width(800)
            .height(Length::Fill),
    )
    .center_x(Length::Fill)
}

pub trait TryIntoExt<T> {
    fn try_into_ex(self) -> color_eyre::Result<T>;
}

impl<T, Target, E> TryIntoExt<Target> for T
where
    T: TryInto<Target, Error = E>,
    T: fmt::Debug,
    T: Clone,
    E: std::error::Error + Send + Sync + 'static,
{
    fn try_into_ex(self) -> color_eyre::Result<Target> {
        self.clone()
            .try_into()
            .with_context(|| format!("{self:#?}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn config_round_trips_through_ron() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let cfg = Config {
            region: Some("eu-central-1".into()),
            endpoint: None,
            output_dir: PathBuf::from("/tmp/images"),
        };

        save_ron_file(&path, &cfg).unwrap();
        let loaded: Config = load_ron_file(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"(region: Some("us-west-2"))"#).unwrap();

        let loaded: Config = load_ron_file(&path).unwrap();
        assert_eq!(loaded.region.as_deref(), Some("us-west-2"));
        assert_eq!(loaded.output_dir, Config::default().output_dir);
    }
}
