pub mod callback;
pub mod command;
pub mod delivery;
pub mod menu;
pub mod text;

pub use callback::CallbackHandler;
pub use command::CommandHandler;
pub use delivery::deliver;
pub use menu::{Menu, MenuCreator};
pub use text::TextMessageHandler;
