use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Open the main menu")]
    Start,

    #[command(description = "Manage your watchlists")]
    Watchlist,

    #[command(description = "Chart a coin")]
    Analysis,

    #[command(description = "Manage your alerts")]
    Alerts,

    #[command(description = "Discover trending coins")]
    Discover,

    #[command(description = "Add a coin to a watchlist")]
    AddCoin,

    #[command(description = "Create a new alert")]
    AddAlert,

    #[command(description = "Show this help")]
    Help,

    #[command(description = "Cancel the current operation")]
    Cancel,
}
