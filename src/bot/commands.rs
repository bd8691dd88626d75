use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "register and show the welcome message")]
    Start,
    #[command(description = "show usage")]
    Help,
    #[command(description = "search recordings by title")]
    Search(String),
    #[command(description = "show recent recordings")]
    List,
    #[command(description = "allow a Telegram user to upload (admin only)")]
    AddUploader(String),
}

pub const WELCOME_MESSAGE: &str = "🎓 <b>Zoom Recordings Bot</b>

Send me a Zoom recording link with its passcode and I'll download and store it for you!

<b>Commands:</b>
/search [query] - Search for recordings
/list - Show recent recordings
/help - Show this help message

<b>For uploaders:</b> just paste the Zoom share link with details";

pub const HELP_MESSAGE: &str = "<b>How to use:</b>

📤 <b>Upload (authorized users only):</b>
Just paste your Zoom recording details like:
<pre>Ammar
Date: May 27, 2025 05:35 AM
Duration: 00:59:54
https://us06web.zoom.us/rec/share/...
Passcode: 1I?N7@?L</pre>

🔍 <b>Search:</b>
/search arabic grammar
/search may 2025

📋 <b>List recent:</b>
/list

The bot will automatically download and store recordings for easy access!";

pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a search query!";
pub const UNAUTHORIZED_MESSAGE: &str = "❌ Unauthorized";
pub const ADD_UPLOADER_USAGE: &str = "Usage: /adduploader <telegram id>";

/// Parses the argument of `/adduploader`.
pub fn parse_principal_id(arg: &str) -> Option<i64> {
    arg.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "zoombot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/list", "zoombot").unwrap(), Command::List);
        assert_eq!(
            Command::parse("/search arabic grammar", "zoombot").unwrap(),
            Command::Search("arabic grammar".to_string())
        );
        assert_eq!(
            Command::parse("/adduploader 12345", "zoombot").unwrap(),
            Command::AddUploader("12345".to_string())
        );
    }

    #[test]
    fn test_unknown_command_does_not_parse() {
        assert!(Command::parse("/delete 3", "zoombot").is_err());
        assert!(Command::parse("Math Class", "zoombot").is_err());
    }

    #[test]
    fn test_parse_principal_id() {
        assert_eq!(parse_principal_id(" 12345 "), Some(12345));
        assert_eq!(parse_principal_id("abc"), None);
        assert_eq!(parse_principal_id(""), None);
    }
}
