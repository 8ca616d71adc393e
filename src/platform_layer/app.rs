use super::command_executor::{self, CommandOutcome};
use super::console_input::{self, ConsoleInput};
use super::error::{PlatformError, Result as PlatformResult};
use super::types::{AppEvent, PlatformEventHandler};

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

/// The primary interface to the platform abstraction layer.
///
/// The console surface reads one user gesture per input line, hands the
/// resulting `AppEvent` to the application logic, then drains and executes
/// the queued `PlatformCommand`s before reading the next line. Commands that
/// complete asynchronously on a native toolkit (file dialogs) produce
/// follow-up events that are handled before any further input is read.
pub struct PlatformInterface {
    app_name: String,
}

impl PlatformInterface {
    pub fn new(app_name: String) -> PlatformResult<Self> {
        log::debug!("Platform: Creating console platform for '{app_name}'.");
        Ok(PlatformInterface { app_name })
    }

    /// Runs the event loop on stdin/stdout until the user quits or input ends.
    pub fn run(&self, event_handler: Arc<Mutex<dyn PlatformEventHandler>>) -> PlatformResult<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with_io(event_handler, &mut stdin.lock(), &mut stdout.lock())
    }

    pub(crate) fn run_with_io<R: BufRead, W: Write>(
        &self,
        event_handler: Arc<Mutex<dyn PlatformEventHandler>>,
        input: &mut R,
        output: &mut W,
    ) -> PlatformResult<()> {
        writeln!(output, "{} (type 'help' for commands)", self.app_name)?;
        let mut quit = self.dispatch(
            &event_handler,
            AppEvent::MainWindowUISetupComplete,
            input,
            output,
        )?;

        let mut line = String::new();
        while !quit {
            write!(output, "> ")?;
            output.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                log::debug!("Platform: End of input, leaving the event loop.");
                break;
            }
            match console_input::parse_input_line(&line) {
                Ok(ConsoleInput::Event(event)) => {
                    quit = self.dispatch(&event_handler, event, input, output)?;
                }
                Ok(ConsoleInput::Help) => writeln!(output, "{}", console_input::HELP_TEXT)?,
                Ok(ConsoleInput::Empty) => {}
                Err(message) => writeln!(output, "{message}")?,
            }
        }

        Self::lock(&event_handler)?.on_quit();
        log::debug!("Platform: Event loop exited.");
        Ok(())
    }

    fn lock(
        event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
    ) -> PlatformResult<std::sync::MutexGuard<'_, dyn PlatformEventHandler + 'static>> {
        event_handler.lock().map_err(|_| {
            PlatformError::OperationFailed("Event handler mutex was poisoned".to_string())
        })
    }

    /// Handles `event` and every follow-up event its commands produce.
    /// Returns true once a `QuitApplication` command has been executed.
    fn dispatch<R: BufRead, W: Write>(
        &self,
        event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
        event: AppEvent,
        input: &mut R,
        output: &mut W,
    ) -> PlatformResult<bool> {
        let mut pending_events = VecDeque::from([event]);
        while let Some(event) = pending_events.pop_front() {
            log::trace!("Platform: Dispatching {event:?}");
            let commands: Vec<_> = {
                let mut handler = Self::lock(event_handler)?;
                handler.handle_event(event);
                std::iter::from_fn(|| handler.try_dequeue_command()).collect()
            };
            for command in commands {
                match command_executor::execute_command(command, input, output)? {
                    CommandOutcome::Done => {}
                    CommandOutcome::FollowUp(follow_up) => pending_events.push_back(follow_up),
                    CommandOutcome::Quit => return Ok(true),
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform_layer::types::{MessageSeverity, PlatformCommand};
    use std::io::Cursor;

    #[derive(Default)]
    struct RecordingHandler {
        events: Vec<AppEvent>,
        queue: VecDeque<PlatformCommand>,
        quit_called: bool,
    }

    impl PlatformEventHandler for RecordingHandler {
        fn handle_event(&mut self, event: AppEvent) {
            match &event {
                AppEvent::ExportBackupClicked => {
                    self.queue.push_back(PlatformCommand::ShowSaveFileDialog {
                        title: "Save".into(),
                        default_filename: "x.json".into(),
                        filter_spec: "*.json".into(),
                    })
                }
                AppEvent::QuitRequested => self.queue.push_back(PlatformCommand::QuitApplication),
                _ => self.queue.push_back(PlatformCommand::SetStatus {
                    text: format!("got {event:?}"),
                    severity: MessageSeverity::Information,
                }),
            }
            self.events.push(event);
        }

        fn on_quit(&mut self) {
            self.quit_called = true;
        }

        fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
            self.queue.pop_front()
        }
    }

    fn run_script(script: &str) -> (Arc<Mutex<RecordingHandler>>, String) {
        let handler = Arc::new(Mutex::new(RecordingHandler::default()));
        let platform = PlatformInterface::new("Test".to_string()).unwrap();
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        platform
            .run_with_io(handler.clone(), &mut input, &mut output)
            .unwrap();
        (handler, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_loop_dispatches_setup_then_input_until_quit() {
        let (handler, output) = run_script("submit\nbogus\nquit\nsubmit\n");

        let handler = handler.lock().unwrap();
        assert_eq!(
            handler.events,
            vec![
                AppEvent::MainWindowUISetupComplete,
                AppEvent::SubmitClicked,
                AppEvent::QuitRequested
            ]
        );
        assert!(handler.quit_called);
        assert!(output.contains("Unknown command 'bogus'"));
        assert!(output.contains("[info] got SubmitClicked"));
    }

    #[test]
    fn test_dialog_answers_become_follow_up_events() {
        let (handler, _) = run_script("export\n/tmp/out.json\n");

        let handler = handler.lock().unwrap();
        assert_eq!(
            handler.events[1..],
            [
                AppEvent::ExportBackupClicked,
                AppEvent::FileSaveDialogCompleted {
                    result: Some("/tmp/out.json".into())
                }
            ]
        );
    }

    #[test]
    fn test_end_of_input_ends_loop() {
        let (handler, _) = run_script("");
        assert!(handler.lock().unwrap().quit_called);
    }
}
