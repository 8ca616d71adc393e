pub mod app;
pub(crate) mod command_executor;
pub mod console_input;
pub mod error;
pub mod types;
pub use app::PlatformInterface;
pub use error::{PlatformError, Result as PlatformResult};
pub use types::{
    AppEvent, ChipDescriptor, ControlId, DisplayDescriptor, DropdownDescriptor,
    DropdownRowDescriptor, FieldKind, MessageSeverity, PlatformCommand, PlatformEventHandler,
};
