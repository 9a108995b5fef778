use std::path::PathBuf;

use color_eyre::Result;
use engine::{
    ClientBox, Family, ModelSpec, ResultPayload, catalog,
    image_store::{self, SavedImage},
};
use iced::{
    Element, Length, Task,
    widget::{
        button, column, pick_list, row, space, text, text_editor,
        text_editor::{Action, Motion},
    },
};
use log::error;
use strum::IntoEnumIterator;

use crate::{
    TryIntoExt, bold_text,
    context::Context,
    form_container,
    message::{UiMessage, ui_messages::Form as MyMessage},
    state::{MessageBox, OptionsMenu, State, Step},
};

const EMPTY_PROMPT: &str = "Please enter a prompt.";
const INVALID_SELECTION: &str = "Invalid model selection.";

#[derive(Debug, Clone)]
pub enum Generated {
    Text(String),
    Image(SavedImage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request itself failed
    Api,
    /// The response arrived but no image could be decoded or saved
    Image,
}

#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    fn image(message: String) -> Self {
        Self {
            kind: FailureKind::Image,
            message,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FailureKind::Api => "API Error",
            FailureKind::Image => "Image Error",
        }
    }

    pub fn dialog_text(&self) -> String {
        match self.kind {
            FailureKind::Api => format!("Request failed: {}", self.message),
            FailureKind::Image => format!("Failed to process image: {}", self.message),
        }
    }

    pub fn output_line(&self) -> String {
        match self.kind {
            FailureKind::Api => format!("Error: {}", self.message),
            FailureKind::Image => format!("Image processing error: {}", self.message),
        }
    }
}

/// Only a response without usable image data is an image failure, a body that isn't even
/// JSON is reported like any other failed request
impl From<engine::Error> for Failure {
    fn from(e: engine::Error) -> Self {
        let kind = match e {
            engine::Error::MalformedResponse { .. } => FailureKind::Image,
            engine::Error::InvalidJson { .. }
            | engine::Error::UnsupportedModel(_)
            | engine::Error::Transport(_) => FailureKind::Api,
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

/// The single form of the application: model selection, prompt and output
#[derive(Debug, Clone)]
pub struct Form {
    family: Family,
    model: Option<ModelSpec>,
    prompt: text_editor::Content,
    output: String,
    output_view: text_editor::Content,
    busy: bool,
}

impl Form {
    pub fn new() -> Self {
        Self {
            family: Family::default(),
            model: Family::default().first_model(),
            prompt: text_editor::Content::default(),
            output: String::new(),
            output_view: text_editor::Content::default(),
            busy: false,
        }
    }

    fn append_output(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
        self.output_view = text_editor::Content::with_text(&self.output);
        self.output_view.perform(Action::Move(Motion::DocumentEnd));
    }

    fn clear_output(&mut self) {
        self.output.clear();
        self.output_view = text_editor::Content::default();
    }

    fn start_generation(&mut self, ctx: &mut Context) -> Result<Step> {
        if self.busy {
            return Step::stay();
        }

        let prompt = self.prompt.text();
        let (model, prompt) = match validate_selection(self.family, self.model, &prompt) {
            Ok(x) => x,
            Err(msg) => {
                self.append_output(msg);
                return Step::stay();
            }
        };

        let client = ctx.client()?;
        let output_dir = ctx.config.output_dir.clone();
        self.busy = true;

        Step::run(Task::perform(
            run_generation(client, model, prompt.to_string(), output_dir),
            |res| MyMessage::GenerationFinished(res).into(),
        ))
    }

    fn finish_generation(&mut self, result: Result<Generated, Failure>) -> Result<Step> {
        self.busy = false;
        match result {
            Ok(Generated::Text(t)) => {
                self.append_output(&t);
                Step::stay()
            }
            Ok(Generated::Image(saved)) => {
                self.append_output(&saved.to_string());
                Step::stay()
            }
            Err(failure) => {
                error!("{}: {}", failure.title(), failure.message);
                self.append_output(&failure.output_line());
                Step::goto(Box::new(MessageBox::error(
                    Box::new(self.clone()),
                    failure.title(),
                    &failure.dialog_text(),
                )))
            }
        }
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the model and the trimmed prompt, or the message to print instead
fn validate_selection(
    family: Family,
    model: Option<ModelSpec>,
    prompt: &str,
) -> Result<(ModelSpec, &str), &'static str> {
    let model = model
        .filter(|m| catalog::by_name(family, m.display_name).as_ref() == Some(m))
        .ok_or(INVALID_SELECTION)?;

    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(EMPTY_PROMPT);
    }
    Ok((model, prompt))
}

async fn run_generation(
    client: ClientBox,
    model: ModelSpec,
    prompt: String,
    output_dir: PathBuf,
) -> Result<Generated, Failure> {
    match engine::generate(&*client, &model, &prompt).await? {
        ResultPayload::Text(t) => Ok(Generated::Text(t)),
        ResultPayload::Image(bytes) => image_store::save_image(&output_dir, &model, &bytes)
            .map(Generated::Image)
            .map_err(|e| Failure::image(format!("{e:#}"))),
    }
}

impl State for Form {
    fn update(&mut self, event: UiMessage, ctx: &mut Context) -> Result<Step> {
        use MyMessage::*;

        match event.try_into_ex()? {
            SelectFamily(family) => {
                if family != self.family {
                    self.family = family;
                    self.model = family.first_model();
                }
                Step::stay()
            }

            SelectModel(model) => {
                self.model = Some(model);
                Step::stay()
            }

            PromptAction(action) => {
                self.prompt.perform(action);
                Step::stay()
            }

            OutputAction(action) => {
                if !matches!(action, Action::Edit(_)) {
                    self.output_view.perform(action);
                }
                Step::stay()
            }

            Generate => self.start_generation(ctx),
            GenerationFinished(result) => self.finish_generation(result),

            ClearOutput => {
                self.clear_output();
                Step::stay()
            }

            OpenOptions => Step::goto(Box::new(OptionsMenu::new(Box::new(self.clone()), ctx))),
        }
    }

    fn view<'a>(&'a self, _ctx: &'a Context) -> Element<'a, UiMessage> {
        let models: Vec<ModelSpec> = self.family.models().collect();
        let idle_msg = |m: MyMessage| -> Option<UiMessage> { (!self.busy).then(|| m.into()) };

        form_container(
            column![
                bold_text("AWS Bedrock Model Interface").size(20),
                text("Select Model Type:"),
                pick_list(Family::iter().collect::<Vec<_>>(), Some(self.family), |f| {
                    MyMessage::SelectFamily(f).into()
                }),
                text("Select Model:"),
                pick_list(models, self.model, |m| MyMessage::SelectModel(m).into()),
                text("Enter Prompt:"),
                text_editor(&self.prompt)
                    .placeholder("Describe what you want...")
                    .height(120)
                    .on_action(|a| MyMessage::PromptAction(a).into()),
                row![
                    button(if self.busy { "Generating..." } else { "Generate" })
                        .on_press_maybe(idle_msg(MyMessage::Generate)),
                    button("Clear Output").on_press(MyMessage::ClearOutput.into()),
                    space().width(Length::Fill),
                    button("Options").on_press_maybe(idle_msg(MyMessage::OpenOptions)),
                ]
                .spacing(10),
                text("Output:"),
                text_editor(&self.output_view)
                    .height(Length::Fill)
                    .on_action(|a| MyMessage::OutputAction(a).into()),
            ]
            .spacing(10)
            .width(Length::Fill)
            .height(Length::Fill),
        )
        .into()
    }
}

#[cfg(test)]
mod tests {
    use engine::{TransportError, adapter::extract_result, client::BedrockApiError};

    use super::*;
    use crate::context::Config;

    fn context() -> Context {
        Context::from_config(Config::default())
    }

    fn with_prompt(prompt: &str) -> Form {
        Form {
            prompt: text_editor::Content::with_text(prompt),
            ..Form::new()
        }
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let model = Family::Chat.first_model();
        assert_eq!(
            validate_selection(Family::Chat, model, "  \n\t "),
            Err(EMPTY_PROMPT)
        );
    }

    #[test]
    fn model_must_belong_to_family() {
        let chat_model = Family::Chat.first_model();
        assert_eq!(
            validate_selection(Family::Image, chat_model, "a cat"),
            Err(INVALID_SELECTION)
        );
        assert_eq!(
            validate_selection(Family::Image, None, "a cat"),
            Err(INVALID_SELECTION)
        );
    }

    #[test]
    fn prompt_is_trimmed() {
        let model = Family::Image.first_model();
        let (m, prompt) = validate_selection(Family::Image, model, "  a cat \n").unwrap();
        assert_eq!(Some(m), model);
        assert_eq!(prompt, "a cat");
    }

    #[test]
    fn failures_are_classified() {
        let api: Failure = engine::Error::Transport(TransportError::Service(
            BedrockApiError::from_type("AccessDeniedException", "no access"),
        ))
        .into();
        assert_eq!(api.title(), "API Error");
        assert!(api.output_line().starts_with("Error: Access denied"));

        let image: Failure = extract_result("amazon.titan-image-generator-v2:0", br#"{"images":[]}"#)
            .unwrap_err()
            .into();
        assert_eq!(image.title(), "Image Error");
        assert!(image.dialog_text().starts_with("Failed to process image:"));
        assert!(
            image
                .output_line()
                .ends_with("No image data found in response")
        );
    }

    #[test]
    fn non_json_body_is_an_api_error() {
        for model_id in [
            "meta.llama3-70b-instruct-v1:0",
            "stability.stable-diffusion-xl-v1",
        ] {
            let failure: Failure = extract_result(model_id, b"<html>").unwrap_err().into();
            assert_eq!(failure.title(), "API Error", "{model_id}");
            assert!(failure.output_line().starts_with("Error: "), "{model_id}");
        }
    }

    #[test]
    fn text_result_is_appended_with_newline() {
        let mut form = Form::new();
        form.busy = true;
        form.finish_generation(Ok(Generated::Text("first".into())))
            .unwrap();
        form.finish_generation(Ok(Generated::Text("second".into())))
            .unwrap();
        assert_eq!(form.output, "first\nsecond\n");
        assert!(!form.busy);
    }

    #[test]
    fn saved_image_report_is_followed_by_blank_line() {
        let mut form = Form::new();
        let step = form
            .finish_generation(Ok(Generated::Image(SavedImage {
                path: PathBuf::from("/tmp/generated_images/foo.png"),
                size: 3,
            })))
            .unwrap();
        assert!(step.next.is_none());
        assert!(form.output.starts_with("✔ Image successfully saved:\n"));
        assert!(
            form.output
                .ends_with("  Path: /tmp/generated_images/foo.png\n\n")
        );
    }

    #[test]
    fn failure_is_logged_to_output_and_shown_in_dialog() {
        let mut form = Form::new();
        form.busy = true;
        let failure = Failure::from(
            extract_result("meta.llama3-70b-instruct-v1:0", b"<html>").unwrap_err(),
        );
        let step = form.finish_generation(Err(failure)).unwrap();

        assert!(!form.busy);
        assert!(form.output.starts_with("Error: Response from meta.llama3"));
        assert!(form.output.ends_with('\n'));

        let next = format!("{:?}", step.next.unwrap());
        assert!(next.starts_with("MessageBox"), "{next}");
        assert!(next.contains(r#"title: "API Error""#), "{next}");
        assert!(next.contains("tone: Error"), "{next}");
    }

    #[test]
    fn generate_is_ignored_while_busy() {
        let mut ctx = context();
        let mut form = with_prompt("a cat");

        let first = form.update(MyMessage::Generate.into(), &mut ctx).unwrap();
        assert!(first.task.is_some());
        assert!(form.busy);

        let second = form.update(MyMessage::Generate.into(), &mut ctx).unwrap();
        assert!(second.task.is_none());
        assert!(second.next.is_none());
        assert_eq!(form.output, "");
    }

    #[test]
    fn invalid_input_is_reported_in_output() {
        let mut ctx = context();
        let mut form = with_prompt("   ");
        let step = form.update(MyMessage::Generate.into(), &mut ctx).unwrap();
        assert!(step.task.is_none());
        assert!(!form.busy);
        assert_eq!(form.output, "Please enter a prompt.\n");
    }

    #[test]
    fn changing_family_selects_its_first_model() {
        let mut ctx = context();
        let mut form = Form::new();
        let titan = catalog::by_id("amazon.titan-image-generator-v2:0").unwrap();

        form.update(MyMessage::SelectFamily(Family::Image).into(), &mut ctx)
            .unwrap();
        assert_eq!(form.model, Family::Image.first_model());

        form.update(MyMessage::SelectModel(titan).into(), &mut ctx)
            .unwrap();
        form.update(MyMessage::SelectFamily(Family::Image).into(), &mut ctx)
            .unwrap();
        assert_eq!(form.model, Some(titan));

        form.update(MyMessage::SelectFamily(Family::Chat).into(), &mut ctx)
            .unwrap();
        assert_eq!(form.model, Family::Chat.first_model());
    }
}
