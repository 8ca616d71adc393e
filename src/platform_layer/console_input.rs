/*
 * Translates lines typed on the console into `AppEvent`s. Each line names one
 * user gesture on the form (a click, a key press, typed text, a dropped file)
 * followed by its arguments, e.g. `select account <id>` or `type tags <text>`.
 */
use super::types::{AppEvent, ClickRegion, DisplayClickTarget, FieldKind, KeyCode};
use std::path::PathBuf;

pub const HELP_TEXT: &str = "\
Commands:
  file <path>              choose the CSV file to convert
  drop <path>              drop a file onto the form (only .csv accepted)
  click <field> [chip]     click a display (field: account | tags)
  focus <field>            focus a display
  type <field> <text>      type or paste text into a display being edited
  blur <field>             leave a display
  enter <field>            press Enter in a display
  set <field> [text]       change the raw field value directly
  remove <field> <id>      remove a chip
  select <field> <id>      click a dropdown row
  check <id> | uncheck <id>  toggle a tag checkbox
  edit <field> <id>        edit the alias of a history entry
  delete <field> <id>      delete a history entry
  paste <field>            paste identifiers from the clipboard
  alias [text]             save the alias dialog
  cancel                   cancel the alias dialog
  outside [account|tags|overlay]  click outside
  esc                      press Escape
  export | import          back up or restore identifiers
  submit                   convert the selected file
  reload                   reload the form from storage
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Event(AppEvent),
    Help,
    Empty,
}

fn parse_field(word: Option<&str>) -> Result<FieldKind, String> {
    match word {
        Some("account") | Some("accounts") => Ok(FieldKind::Account),
        Some("tag") | Some("tags") => Ok(FieldKind::Tags),
        Some(other) => Err(format!("Unknown field '{other}', expected 'account' or 'tags'.")),
        None => Err("Missing field, expected 'account' or 'tags'.".to_string()),
    }
}

fn required(value: &str, what: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("Missing {what}."))
    } else {
        Ok(value.to_string())
    }
}

// Splits "<field> <rest of line>" keeping the rest verbatim (apart from trimming).
fn split_field(rest: &str) -> Result<(FieldKind, String), String> {
    let (field_word, remainder) = match rest.split_once(char::is_whitespace) {
        Some((word, remainder)) => (word, remainder.trim()),
        None => (rest, ""),
    };
    let field_word = (!field_word.is_empty()).then_some(field_word);
    Ok((parse_field(field_word)?, remainder.to_string()))
}

pub fn parse_input_line(line: &str) -> Result<ConsoleInput, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleInput::Empty);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let event = match command {
        "help" | "?" => return Ok(ConsoleInput::Help),
        "quit" | "exit" => AppEvent::QuitRequested,
        "reload" | "title" => AppEvent::TitleClicked,
        "file" => AppEvent::FileChosen {
            path: PathBuf::from(required(rest, "file path")?),
        },
        "drop" => AppEvent::FileDropped {
            path: PathBuf::from(required(rest, "file path")?),
        },
        "click" => {
            let (field, remainder) = split_field(rest)?;
            let target = match remainder.as_str() {
                "" => DisplayClickTarget::Background,
                "chip" => DisplayClickTarget::Chip,
                other => return Err(format!("Unknown click target '{other}'.")),
            };
            AppEvent::DisplayClicked { field, target }
        }
        "focus" => AppEvent::DisplayFocused {
            field: split_field(rest)?.0,
        },
        "type" => {
            let (field, text) = split_field(rest)?;
            AppEvent::DisplayTextInput { field, text }
        }
        "blur" => AppEvent::DisplayBlurred {
            field: split_field(rest)?.0,
        },
        "enter" => AppEvent::DisplayKeyPressed {
            field: split_field(rest)?.0,
            key: KeyCode::Enter,
        },
        "set" => {
            let (field, text) = split_field(rest)?;
            AppEvent::RawFieldChanged { field, text }
        }
        "remove" => {
            let (field, id) = split_field(rest)?;
            AppEvent::ChipRemoveClicked {
                field,
                id: required(&id, "identifier")?,
            }
        }
        "select" => {
            let (field, id) = split_field(rest)?;
            AppEvent::DropdownRowClicked {
                field,
                id: required(&id, "identifier")?,
            }
        }
        "check" | "uncheck" => AppEvent::TagCheckboxToggled {
            id: required(rest, "identifier")?,
            checked: command == "check",
        },
        "edit" => {
            let (field, id) = split_field(rest)?;
            AppEvent::DropdownEditClicked {
                field,
                id: required(&id, "identifier")?,
            }
        }
        "delete" => {
            let (field, id) = split_field(rest)?;
            AppEvent::DropdownDeleteClicked {
                field,
                id: required(&id, "identifier")?,
            }
        }
        "paste" => AppEvent::PasteClicked {
            field: split_field(rest)?.0,
        },
        "alias" => AppEvent::AliasModalSaveClicked {
            text: rest.to_string(),
        },
        "cancel" => AppEvent::AliasModalCancelClicked,
        "outside" => {
            let region = match rest {
                "" => ClickRegion::Elsewhere,
                "account" => ClickRegion::AccountGroup,
                "tags" => ClickRegion::TagGroup,
                "overlay" => ClickRegion::ModalOverlay,
                other => return Err(format!("Unknown region '{other}'.")),
            };
            AppEvent::OutsideClicked { region }
        }
        "esc" | "escape" => AppEvent::KeyPressed {
            key: KeyCode::Escape,
        },
        "export" => AppEvent::ExportBackupClicked,
        "import" => AppEvent::ImportBackupClicked,
        "submit" | "convert" => AppEvent::SubmitClicked,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(ConsoleInput::Event(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> AppEvent {
        match parse_input_line(line) {
            Ok(ConsoleInput::Event(event)) => event,
            other => panic!("Expected an event for '{line}', got {other:?}"),
        }
    }

    #[test]
    fn test_blank_and_help_lines() {
        assert_eq!(parse_input_line("   "), Ok(ConsoleInput::Empty));
        assert_eq!(parse_input_line("help"), Ok(ConsoleInput::Help));
    }

    #[test]
    fn test_text_arguments_keep_inner_spaces() {
        assert_eq!(
            event("type tags  see 550e8400-e29b-41d4-a716-446655440000 here "),
            AppEvent::DisplayTextInput {
                field: FieldKind::Tags,
                text: "see 550e8400-e29b-41d4-a716-446655440000 here".to_string()
            }
        );
        assert_eq!(
            event("alias My Broker"),
            AppEvent::AliasModalSaveClicked {
                text: "My Broker".to_string()
            }
        );
        assert_eq!(
            event("set account"),
            AppEvent::RawFieldChanged {
                field: FieldKind::Account,
                text: String::new()
            }
        );
    }

    #[test]
    fn test_click_targets_and_regions() {
        assert_eq!(
            event("click tags chip"),
            AppEvent::DisplayClicked {
                field: FieldKind::Tags,
                target: DisplayClickTarget::Chip
            }
        );
        assert_eq!(
            event("click account"),
            AppEvent::DisplayClicked {
                field: FieldKind::Account,
                target: DisplayClickTarget::Background
            }
        );
        assert_eq!(
            event("outside overlay"),
            AppEvent::OutsideClicked {
                region: ClickRegion::ModalOverlay
            }
        );
        assert_eq!(
            event("esc"),
            AppEvent::KeyPressed {
                key: KeyCode::Escape
            }
        );
    }

    #[test]
    fn test_checkbox_commands() {
        assert_eq!(
            event("uncheck abc"),
            AppEvent::TagCheckboxToggled {
                id: "abc".to_string(),
                checked: false
            }
        );
    }

    #[test]
    fn test_errors_for_bad_input() {
        assert!(parse_input_line("frobnicate").is_err());
        assert!(parse_input_line("select planets x").is_err());
        assert!(parse_input_line("select account").is_err());
        assert!(parse_input_line("file").is_err());
        assert!(parse_input_line("paste").is_err());
    }
}
