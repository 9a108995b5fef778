//! The screens of the application. Exactly one state is active at a time, and handling a
//! message may replace it. Overlays like the [`MessageBox`] keep the screen they were opened
//! from and return to it when they close.

use std::fmt;

use color_eyre::Result;
use iced::{Element, Task};

use crate::{context::Context, message::UiMessage};

pub mod form;
pub mod message_box;
pub mod options_menu;

pub use form::Form;
pub use message_box::{MessageBox, Tone};
pub use options_menu::OptionsMenu;

pub trait State: BoxClone + fmt::Debug {
    fn update(&mut self, event: UiMessage, ctx: &mut Context) -> Result<Step>;
    fn view<'a>(&'a self, ctx: &'a Context) -> Element<'a, UiMessage>;
}

pub trait BoxClone {
    fn box_clone(&self) -> Box<dyn State>;
}

impl<T: State + Clone + 'static> BoxClone for T {
    fn box_clone(&self) -> Box<dyn State> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn State> {
    fn clone(&self) -> Self {
        (**self).box_clone()
    }
}

/// What happens after a state handled a message
#[derive(Default)]
pub struct Step {
    pub task: Option<Task<UiMessage>>,
    pub next: Option<Box<dyn State>>,
}

impl Step {
    pub fn stay() -> Result<Self> {
        Ok(Self::default())
    }

    pub fn run(task: Task<UiMessage>) -> Result<Self> {
        Ok(Self {
            task: Some(task),
            next: None,
        })
    }

    pub fn goto(next: Box<dyn State>) -> Result<Self> {
        Ok(Self {
            task: None,
            next: Some(next),
        })
    }
}
