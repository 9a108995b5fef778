use color_eyre::Result;
use iced::{
    Border, Color, Element, Length,
    widget::{button, column, container, space, stack, text_editor, text_editor::Action},
};

use crate::{
    TryIntoExt, bold_text,
    context::Context,
    message::{UiMessage, ui_messages::MessageBox as MyMessage},
    state::{State, Step},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Error,
}

impl Tone {
    fn title_color(self) -> Color {
        match self {
            Tone::Info => Color::BLACK,
            Tone::Error => Color::from_rgb(0.75, 0.1, 0.1),
        }
    }
}

/// A title and a read-only text shown over the dimmed screen it was opened from. The text
/// lives in an editor, so that error messages can be selected and copied.
#[derive(Debug, Clone)]
pub struct MessageBox {
    parent: Box<dyn State>,
    tone: Tone,
    title: String,
    body: text_editor::Content,
}

impl MessageBox {
    pub fn info(parent: Box<dyn State>, title: impl Into<String>, body: &str) -> Self {
        Self::new(parent, Tone::Info, title.into(), body)
    }

    pub fn error(parent: Box<dyn State>, title: impl Into<String>, body: &str) -> Self {
        Self::new(parent, Tone::Error, title.into(), body)
    }

    fn new(parent: Box<dyn State>, tone: Tone, title: String, body: &str) -> Self {
        Self {
            parent,
            tone,
            title,
            body: text_editor::Content::with_text(body),
        }
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> String {
        self.body.text()
    }
}

impl State for MessageBox {
    fn update(&mut self, event: UiMessage, _ctx: &mut Context) -> Result<Step> {
        use MyMessage::*;

        match event.try_into_ex()? {
            Close => Step::goto(self.parent.clone()),
            BodyAction(a) => {
                if !matches!(a, Action::Edit(_)) {
                    self.body.perform(a);
                }
                Step::stay()
            }
        }
    }

    fn view<'a>(&'a self, ctx: &'a Context) -> Element<'a, UiMessage> {
        let dialog = container(
            column![
                bold_text(&self.title)
                    .size(20)
                    .color(self.tone.title_color()),
                container(
                    text_editor(&self.body)
                        .height(Length::Shrink)
                        .on_action(|a| MyMessage::BodyAction(a).into())
                )
                .max_height(400)
                .style(|_theme| container::background(Color::from_rgb(0.95, 0.95, 0.95)))
                .padding(10),
                container(button("Ok").on_press(MyMessage::Close.into())).align_right(Length::Fill)
            ]
            .spacing(10),
        )
        .padding(20)
        .max_width(600)
        .style(|_theme| container::background(Color::WHITE).border(Border::default().rounded(10)));

        let dim = container(space())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::background(Color::from_rgba(0., 0., 0., 0.2)));

        stack![
            self.parent.view(ctx),
            dim,
            container(dialog).center(Length::Fill)
        ]
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Config, state::Form};

    fn error_box() -> MessageBox {
        MessageBox::error(Box::new(Form::new()), "API Error", "Request failed: boom")
    }

    #[test]
    fn ok_returns_to_parent() {
        let mut ctx = Context::from_config(Config::default());
        let step = error_box()
            .update(MyMessage::Close.into(), &mut ctx)
            .unwrap();
        let next = format!("{:?}", step.next.unwrap());
        assert!(next.starts_with("Form"), "{next}");
    }

    #[test]
    fn body_is_read_only() {
        let mut ctx = Context::from_config(Config::default());
        let mut dialog = error_box();
        let step = dialog
            .update(
                MyMessage::BodyAction(Action::Edit(text_editor::Edit::Insert('x'))).into(),
                &mut ctx,
            )
            .unwrap();
        assert!(step.next.is_none());
        assert_eq!(dialog.body().trim_end(), "Request failed: boom");
        assert_eq!(dialog.tone(), Tone::Error);
    }
}
