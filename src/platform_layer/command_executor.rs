/*
 * This module is responsible for executing `PlatformCommand`s on the console
 * surface. Render commands are written out as text; dialog commands prompt for
 * a path on the input stream and report the answer back as a follow-up
 * `AppEvent`, the way a native file dialog would complete.
 */

use super::error::Result as PlatformResult;
use super::types::{
    AppEvent, ControlId, DisplayDescriptor, DropdownDescriptor, FieldKind, MessageSeverity,
    PlatformCommand,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CommandOutcome {
    Done,
    FollowUp(AppEvent),
    Quit,
}

fn severity_tag(severity: MessageSeverity) -> &'static str {
    match severity {
        MessageSeverity::None => "",
        MessageSeverity::Information => "[info] ",
        MessageSeverity::Success => "[ok] ",
        MessageSeverity::Warning => "[warn] ",
        MessageSeverity::Error => "[error] ",
    }
}

pub(crate) fn format_display(field: FieldKind, display: &DisplayDescriptor) -> String {
    if display.is_empty {
        let mode = if display.is_editing {
            "editing"
        } else {
            "click to edit"
        };
        return format!("{}: (empty, {mode})", field.label());
    }
    let chips: Vec<String> = display
        .chips
        .iter()
        .map(|chip| format!("[{} ×]", chip.label))
        .collect();
    format!("{}: {}", field.label(), chips.join(" "))
}

pub(crate) fn format_dropdown(field: FieldKind, dropdown: &DropdownDescriptor) -> Vec<String> {
    let mode = if dropdown.multi_select {
        " (check/uncheck to select)"
    } else {
        ""
    };
    let mut lines = vec![format!("{} history{mode}:", field.label())];
    if dropdown.rows.is_empty() {
        lines.push(format!("  {}", dropdown.empty_text));
        return lines;
    }
    for (index, row) in dropdown.rows.iter().enumerate() {
        let checkbox = match row.checked {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        lines.push(format!(
            "  {:>2}. {checkbox}{}  {}  (edit | del)",
            index + 1,
            row.label,
            row.id
        ));
    }
    lines
}

fn control_name(control_id: ControlId) -> String {
    format!("control #{}", control_id.raw())
}

// Asks for a path on the input stream. "cancel" or end of input cancels; an
// empty answer takes `default` when there is one.
fn prompt_for_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: Option<&str>,
) -> PlatformResult<Option<PathBuf>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(None);
    }
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("cancel") {
        Ok(None)
    } else if answer.is_empty() {
        Ok(default.map(PathBuf::from))
    } else {
        Ok(Some(PathBuf::from(answer)))
    }
}

pub(crate) fn execute_command<R: BufRead, W: Write>(
    command: PlatformCommand,
    input: &mut R,
    output: &mut W,
) -> PlatformResult<CommandOutcome> {
    log::trace!("CommandExecutor: Executing {command:?}");
    match command {
        PlatformCommand::SetStatus { text, severity } => {
            if !text.is_empty() {
                writeln!(output, "{}{text}", severity_tag(severity))?;
            }
        }
        PlatformCommand::SetFieldValue { field, text } => {
            log::debug!("CommandExecutor: Field {} = '{text}'", field.label());
        }
        PlatformCommand::RenderDisplay { field, display } => {
            writeln!(output, "{}", format_display(field, &display))?;
        }
        PlatformCommand::ShowDropdown { field, dropdown } => {
            for line in format_dropdown(field, &dropdown) {
                writeln!(output, "{line}")?;
            }
        }
        PlatformCommand::HideDropdown { field } => {
            log::debug!("CommandExecutor: {} dropdown hidden", field.label());
        }
        PlatformCommand::ShowAliasModal {
            title,
            id,
            initial_text,
        } => {
            writeln!(output, "== {title} ==")?;
            writeln!(output, "  {id}")?;
            writeln!(
                output,
                "  current: '{initial_text}'  (alias <text> to save, cancel to close)"
            )?;
        }
        PlatformCommand::HideAliasModal => {
            log::debug!("CommandExecutor: Alias dialog hidden");
        }
        PlatformCommand::SetFileLabel { text } => {
            writeln!(output, "file: {text}")?;
        }
        PlatformCommand::SetControlEnabled {
            control_id,
            enabled,
        } => {
            log::debug!(
                "CommandExecutor: {} enabled = {enabled}",
                control_name(control_id)
            );
        }
        PlatformCommand::ShowSaveFileDialog {
            title,
            default_filename,
            filter_spec,
        } => {
            let prompt = format!("{title} [{filter_spec}] (default {default_filename}): ");
            let result = match prompt_for_path(input, output, &prompt, Some(&default_filename))? {
                Some(path) => Some(path),
                None => {
                    writeln!(output, "Save cancelled.")?;
                    None
                }
            };
            return Ok(CommandOutcome::FollowUp(AppEvent::FileSaveDialogCompleted {
                result,
            }));
        }
        PlatformCommand::ShowOpenFileDialog { title, filter_spec } => {
            let prompt = format!("{title} [{filter_spec}]: ");
            let result = prompt_for_path(input, output, &prompt, None)?;
            return Ok(CommandOutcome::FollowUp(AppEvent::FileOpenDialogCompleted {
                result,
            }));
        }
        PlatformCommand::QuitApplication => return Ok(CommandOutcome::Quit),
    }
    Ok(CommandOutcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform_layer::types::{ChipDescriptor, DropdownRowDescriptor};
    use std::io::Cursor;

    fn run(command: PlatformCommand, input: &str) -> (CommandOutcome, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let outcome = execute_command(command, &mut input, &mut output).unwrap();
        (outcome, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_status_is_tagged_by_severity() {
        let (outcome, text) = run(
            PlatformCommand::SetStatus {
                text: "✗ disk full".to_string(),
                severity: MessageSeverity::Error,
            },
            "",
        );
        assert_eq!(outcome, CommandOutcome::Done);
        assert_eq!(text, "[error] ✗ disk full\n");
    }

    #[test]
    fn test_display_rendering() {
        let display = DisplayDescriptor {
            chips: vec![
                ChipDescriptor {
                    id: "a".into(),
                    label: "Growth".into(),
                },
                ChipDescriptor {
                    id: "b".into(),
                    label: "6ba7…30c8".into(),
                },
            ],
            is_empty: false,
            is_editing: false,
        };
        assert_eq!(
            format_display(FieldKind::Tags, &display),
            "tags: [Growth ×] [6ba7…30c8 ×]"
        );
        let empty = DisplayDescriptor {
            chips: vec![],
            is_empty: true,
            is_editing: true,
        };
        assert_eq!(
            format_display(FieldKind::Account, &empty),
            "account: (empty, editing)"
        );
    }

    #[test]
    fn test_dropdown_rendering_with_and_without_rows() {
        let dropdown = DropdownDescriptor {
            rows: vec![DropdownRowDescriptor {
                id: "id-1".into(),
                label: "Main".into(),
                checked: Some(true),
            }],
            empty_text: "No tags yet".into(),
            multi_select: true,
        };
        assert_eq!(
            format_dropdown(FieldKind::Tags, &dropdown),
            vec![
                "tags history (check/uncheck to select):".to_string(),
                "   1. [x] Main  id-1  (edit | del)".to_string()
            ]
        );
        let empty = DropdownDescriptor {
            rows: vec![],
            empty_text: "No history yet".into(),
            multi_select: false,
        };
        assert_eq!(
            format_dropdown(FieldKind::Account, &empty),
            vec!["account history:".to_string(), "  No history yet".to_string()]
        );
    }

    #[test]
    fn test_save_dialog_reports_chosen_path() {
        let (outcome, _) = run(
            PlatformCommand::ShowSaveFileDialog {
                title: "Save backup".into(),
                default_filename: "b.json".into(),
                filter_spec: "*.json".into(),
            },
            "/tmp/backup.json\n",
        );
        assert_eq!(
            outcome,
            CommandOutcome::FollowUp(AppEvent::FileSaveDialogCompleted {
                result: Some(PathBuf::from("/tmp/backup.json"))
            })
        );
    }

    #[test]
    fn test_open_dialog_cancel_and_eof() {
        let open = || PlatformCommand::ShowOpenFileDialog {
            title: "Import".into(),
            filter_spec: "*.json".into(),
        };
        let cancelled = AppEvent::FileOpenDialogCompleted { result: None };
        assert_eq!(run(open(), "cancel\n").0, CommandOutcome::FollowUp(cancelled.clone()));
        assert_eq!(run(open(), "\n").0, CommandOutcome::FollowUp(cancelled.clone()));
        assert_eq!(run(open(), "").0, CommandOutcome::FollowUp(cancelled));
    }

    #[test]
    fn test_save_dialog_empty_answer_takes_default() {
        let (outcome, _) = run(
            PlatformCommand::ShowSaveFileDialog {
                title: "Save backup".into(),
                default_filename: "b.json".into(),
                filter_spec: "*.json".into(),
            },
            "\n",
        );
        assert_eq!(
            outcome,
            CommandOutcome::FollowUp(AppEvent::FileSaveDialogCompleted {
                result: Some(PathBuf::from("b.json"))
            })
        );
    }

    #[test]
    fn test_quit_command() {
        assert_eq!(
            run(PlatformCommand::QuitApplication, "").0,
            CommandOutcome::Quit
        );
    }
}
