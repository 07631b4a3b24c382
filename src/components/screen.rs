use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

/// A rendered prompt: MarkdownV2 text plus its inline keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

impl Screen {
    pub fn new(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, InlineKeyboardMarkup::default())
    }

    /// Callback data of every button, row by row.
    pub fn callback_data(&self) -> Vec<String> {
        self.keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Button labels in display order.
    pub fn labels(&self) -> Vec<String> {
        self.keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| button.text.clone())
            .collect()
    }
}

/// Something to send back to the chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Screen(Screen),
    /// Plain text message.
    Notice(String),
    /// Short popup answer to a button press.
    Toast(String),
    /// PNG with a MarkdownV2 caption.
    Photo {
        png: Vec<u8>,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
}

impl Reply {
    pub fn notice(text: impl Into<String>) -> Self {
        Reply::Notice(text.into())
    }

    pub fn toast(text: impl Into<String>) -> Self {
        Reply::Toast(text.into())
    }

    pub fn as_screen(&self) -> Option<&Screen> {
        match self {
            Reply::Screen(screen) => Some(screen),
            _ => None,
        }
    }
}

impl From<Screen> for Reply {
    fn from(screen: Screen) -> Self {
        Reply::Screen(screen)
    }
}
