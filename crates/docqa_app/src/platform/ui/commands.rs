use std::path::PathBuf;

use docqa_core::{DocumentId, Msg};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  upload <path>        upload a local file
  select <id>          toggle a document in the selection
  ask <question>       ask across the selection (or everything)
  summarize            summarize the single selected document
  delete <id>          delete a document (asks for confirmation)
  reset                wipe every document and index (asks for confirmation)
  yes | no             answer the pending confirmation
  key set <key>        set the generation API key
  key clear            clear the generation API key
  dismiss <id>         dismiss a notice
  refresh              refresh documents and health now
  show                 print the full session view
  help                 this text
  quit                 end the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Dispatch(Msg),
    /// Re-print everything, not just what changed.
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a document id")]
    BadDocumentId(String),
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let msg = match word.to_ascii_lowercase().as_str() {
        "upload" => Msg::UploadRequested {
            path: PathBuf::from(required("upload", rest)?),
        },
        "select" | "toggle" => Msg::SelectionToggled(document_id("select", rest)?),
        "ask" => Msg::QuestionSubmitted(required("ask", rest)?.to_string()),
        "summarize" | "summary" => Msg::SummarizeClicked,
        "delete" | "rm" => Msg::DeleteClicked(document_id("delete", rest)?),
        "reset" => Msg::ResetClicked,
        "yes" | "y" => Msg::ConfirmationAnswered(true),
        "no" | "n" => Msg::ConfirmationAnswered(false),
        "key" => parse_key(rest)?,
        "dismiss" => Msg::NoticeDismissed(required("dismiss", rest)?.to_string()),
        "refresh" => Msg::RefreshTick,
        "show" | "ls" => return Ok(ConsoleCommand::Show),
        "help" | "?" => return Ok(ConsoleCommand::Help),
        "quit" | "exit" => return Ok(ConsoleCommand::Quit),
        _ => return Err(ParseError::Unknown(word.to_string())),
    };
    Ok(ConsoleCommand::Dispatch(msg))
}

fn parse_key(rest: &str) -> Result<Msg, ParseError> {
    let (action, key) = match rest.split_once(char::is_whitespace) {
        Some((action, key)) => (action, key.trim()),
        None => (rest, ""),
    };
    match action {
        // The core rejects a blank key with a notice.
        "set" => Ok(Msg::CredentialSubmitted(key.to_string())),
        "clear" => Ok(Msg::CredentialClearRequested),
        _ => Err(ParseError::MissingArgument("key set|clear")),
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn document_id(command: &'static str, rest: &str) -> Result<DocumentId, ParseError> {
    let raw = required(command, rest)?;
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| ParseError::BadDocumentId(raw.to_string()))
}
