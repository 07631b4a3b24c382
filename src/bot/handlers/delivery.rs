use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::debug;

use crate::components::Reply;
use crate::constants::CHART_PACING;

/// Pull the first popup out of `replies` to answer a button press with.
pub fn take_toast(replies: &mut Vec<Reply>) -> Option<String> {
    let index = replies.iter().position(|r| matches!(r, Reply::Toast(_)))?;
    match replies.remove(index) {
        Reply::Toast(text) => Some(text),
        _ => None,
    }
}

/// Send replies in order. Consecutive charts are paced.
pub async fn deliver(bot: &Bot, chat: ChatId, replies: Vec<Reply>) -> ResponseResult<()> {
    let mut photos_sent = 0usize;

    for reply in replies {
        match reply {
            Reply::Screen(screen) => {
                let mut request = bot
                    .send_message(chat, screen.text)
                    .parse_mode(ParseMode::MarkdownV2);
                if !screen.keyboard.inline_keyboard.is_empty() {
                    request = request.reply_markup(screen.keyboard);
                }
                request.await?;
            }
            // Toasts left over here have no button press to answer
            Reply::Notice(text) | Reply::Toast(text) => {
                bot.send_message(chat, text).await?;
            }
            Reply::Photo { png, caption, keyboard } => {
                if photos_sent > 0 {
                    tokio::time::sleep(CHART_PACING).await;
                }
                let mut request = bot
                    .send_photo(chat, InputFile::memory(png).file_name("chart.png"))
                    .caption(caption)
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(keyboard);
                }
                request.await?;
                photos_sent += 1;
            }
        }
    }

    if photos_sent > 0 {
        debug!("Sent {} charts to chat {}", photos_sent, chat);
    }
    Ok(())
}
