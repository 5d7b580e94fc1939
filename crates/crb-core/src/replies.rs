//! Fixed texts sent back to users.

pub const SEND_TEXT_PROMPT: &str = "Please send a text message.";

pub const FORWARDED: &str = "Your message has been sent to the channel!";

pub const GENERIC_FAILURE: &str =
    "Sorry, there was an error sending your message. Please try again.";

/// Default `/start` greeting (overridable with `WELCOME_TEXT`).
pub const DEFAULT_WELCOME: &str = "Hi! Welcome to ROC Angel & Mortal! If there is any issues with the bot \n\
Please contact @zhonggruii\n\
We hope you have fun but here are some rules:\n\
1. Please make a reasonable challenge i.e nothing dangerous or illegal\n\
2. Please issue a challenge based on your mortal's tolerance level\n\
3. Please be respectful and dont use profanities\n\
4. Please dont spam the bot\n\
5. Please indicate your mortal @ at the start of the message\n\
i.e @zhonggruii Please bark 3 times\n\
If you have doubts about whether your challenge is okay, ask your RA or HH\n\n\
Send a message to get started!";

pub fn unknown_command(name: &str) -> String {
    format!("Unknown command: /{name}")
}
