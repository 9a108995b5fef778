use derive_more::{From, TryInto};

#[derive(Debug, Clone, From, TryInto)]
pub enum UiMessage {
    Form(ui_messages::Form),
    MessageBox(ui_messages::MessageBox),
    OptionsMenu(ui_messages::OptionsMenu),
}

pub mod ui_messages {
    use engine::{Family, ModelSpec};
    use iced::widget::text_editor;

    use crate::state::form::{Failure, Generated};

    #[derive(Debug, Clone)]
    pub enum Form {
        SelectFamily(Family),
        SelectModel(ModelSpec),
        PromptAction(text_editor::Action),
        OutputAction(text_editor::Action),
        Generate,
        GenerationFinished(Result<Generated, Failure>),
        ClearOutput,
        OpenOptions,
    }

    #[derive(Debug, Clone)]
    pub enum MessageBox {
        Close,
        BodyAction(text_editor::Action),
    }

    #[derive(Debug, Clone)]
    pub enum OptionsMenu {
        RegionChanged(String),
        OutputDirChanged(String),
        Ok,
        Cancel,
    }
}
