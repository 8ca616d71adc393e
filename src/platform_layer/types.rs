/*
 * This module defines core data types used for communication between the
 * application logic and the platform layer: identifiers for controls and form
 * fields, descriptors of what to render (chips, dropdowns), platform-agnostic
 * event types (`AppEvent`), commands for the platform layer (`PlatformCommand`),
 * severity levels for status messages (`MessageSeverity`), and the
 * `PlatformEventHandler` trait that the application logic must implement.
 */

use std::path::PathBuf;

// A logical identifier for a control, mapped by the platform layer to whatever
// native element represents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(i32);

impl ControlId {
    pub const fn new(raw: i32) -> Self {
        ControlId(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

// The two identifier fields of the form, each with its chip display and
// history dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Account,
    Tags,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Account => "account",
            FieldKind::Tags => "tags",
        }
    }
}

// Where inside a chip display a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayClickTarget {
    Chip,
    Background,
}

// The region of the form that received a click outside of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    AccountGroup,
    TagGroup,
    ModalOverlay,
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Enter,
    Escape,
}

// --- Render Descriptors ---

// One selected identifier, shown as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipDescriptor {
    pub id: String,
    pub label: String,
}

// The full content of one chip display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDescriptor {
    pub chips: Vec<ChipDescriptor>,
    pub is_empty: bool,
    pub is_editing: bool,
}

/*
 * One row of a history dropdown. `checked` is `Some` only for multi-select
 * dropdowns, where each row carries a checkbox.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownRowDescriptor {
    pub id: String,
    pub label: String,
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownDescriptor {
    pub rows: Vec<DropdownRowDescriptor>,
    // Shown instead of rows when there are none.
    pub empty_text: String,
    pub multi_select: bool,
}

// --- Events from Platform to App Logic ---

/*
 * Represents platform-agnostic UI events.
 *
 * The platform layer translates user input into these types and sends them
 * to the application logic layer for handling.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // Signals that the form is ready to be populated.
    MainWindowUISetupComplete,
    // The title was clicked; the form reloads its state from storage.
    TitleClicked,
    FileChosen {
        path: PathBuf,
    },
    FileDropped {
        path: PathBuf,
    },
    DisplayClicked {
        field: FieldKind,
        target: DisplayClickTarget,
    },
    DisplayFocused {
        field: FieldKind,
    },
    // Free text typed or pasted into a display in edit mode.
    DisplayTextInput {
        field: FieldKind,
        text: String,
    },
    DisplayBlurred {
        field: FieldKind,
    },
    DisplayKeyPressed {
        field: FieldKind,
        key: KeyCode,
    },
    // The raw (hidden) form value was changed directly.
    RawFieldChanged {
        field: FieldKind,
        text: String,
    },
    ChipRemoveClicked {
        field: FieldKind,
        id: String,
    },
    DropdownRowClicked {
        field: FieldKind,
        id: String,
    },
    TagCheckboxToggled {
        id: String,
        checked: bool,
    },
    DropdownEditClicked {
        field: FieldKind,
        id: String,
    },
    DropdownDeleteClicked {
        field: FieldKind,
        id: String,
    },
    PasteClicked {
        field: FieldKind,
    },
    AliasModalSaveClicked {
        text: String,
    },
    AliasModalCancelClicked,
    OutsideClicked {
        region: ClickRegion,
    },
    // A key pressed with no particular display focused.
    KeyPressed {
        key: KeyCode,
    },
    ExportBackupClicked,
    ImportBackupClicked,
    // Signals the result of a "Save File" dialog.
    FileSaveDialogCompleted {
        result: Option<PathBuf>,
    },
    // Signals the result of an "Open File" dialog.
    FileOpenDialogCompleted {
        result: Option<PathBuf>,
    },
    SubmitClicked,
    QuitRequested,
}

// Defines the severity of a status message.
// Ordered from least to most severe for comparison. `None` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    None,
    Information,
    Success,
    Warning,
    Error,
}

/*
 * Represents platform-agnostic commands sent from the application logic to the
 * platform layer, instructing it to update what the user sees.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCommand {
    SetStatus {
        text: String,
        severity: MessageSeverity,
    },
    // Sets the raw value of a form field.
    SetFieldValue {
        field: FieldKind,
        text: String,
    },
    RenderDisplay {
        field: FieldKind,
        display: DisplayDescriptor,
    },
    ShowDropdown {
        field: FieldKind,
        dropdown: DropdownDescriptor,
    },
    HideDropdown {
        field: FieldKind,
    },
    ShowAliasModal {
        title: String,
        id: String,
        initial_text: String,
    },
    HideAliasModal,
    SetFileLabel {
        text: String,
    },
    SetControlEnabled {
        control_id: ControlId,
        enabled: bool,
    },
    ShowSaveFileDialog {
        title: String,
        default_filename: String,
        filter_spec: String,
    },
    ShowOpenFileDialog {
        title: String,
        filter_spec: String,
    },
    QuitApplication,
}

// --- Trait for App Logic to Handle Events ---

// A trait to be implemented by the application logic layer to handle UI events.
//
// The platform layer calls methods on this trait to notify the application
// logic about user interactions.
pub trait PlatformEventHandler: Send + Sync + 'static {
    // Called by the platform layer for each event. The implementor handles the
    // event and enqueues `PlatformCommand`s for the platform layer to execute.
    fn handle_event(&mut self, event: AppEvent);

    // Called by the platform layer when the application is about to exit its main loop.
    fn on_quit(&mut self) {}

    // Attempts to dequeue a single `PlatformCommand` from the internal queue.
    // This is called by the platform layer's run loop.
    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
