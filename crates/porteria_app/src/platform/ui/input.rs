use porteria_core::Msg;

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Send(Vec<Msg>),
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  url <api url>     save the directory API URL
  token <token>     set the token field
  check [token]     check the token field (or the given token)
  scan              scan a QR code from the camera into the token field
  stop              stop the running scan
  help              show this help
  quit              exit";

pub fn parse_line(line: &str) -> UiCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest),
        None => (trimmed, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "" => UiCommand::Send(Vec::new()),
        "url" => UiCommand::Send(vec![Msg::SaveApiUrlClicked(rest.to_string())]),
        "token" => UiCommand::Send(vec![Msg::TokenInputChanged(rest.to_string())]),
        "check" if rest.trim().is_empty() => UiCommand::Send(vec![Msg::CheckTokenClicked]),
        "check" => UiCommand::Send(vec![
            Msg::TokenInputChanged(rest.to_string()),
            Msg::CheckTokenClicked,
        ]),
        "scan" => UiCommand::Send(vec![Msg::ScanClicked]),
        "stop" => UiCommand::Send(vec![Msg::ScanCancelClicked]),
        "help" | "?" => UiCommand::Help,
        "quit" | "exit" => UiCommand::Quit,
        _ => UiCommand::Unknown(trimmed.to_string()),
    }
}
