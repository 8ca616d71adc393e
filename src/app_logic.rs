/*
 * This module provides the application logic layer, centered around
 * `FormLogic`, which acts as the Presenter/Controller of the conversion form.
 * It also includes `FormUiState` for the transient UI state of the form and
 * the pure render functions that turn selections and history into display
 * descriptors. Unit tests for `FormLogic` are in `handler_tests.rs`.
 */
pub mod form_ui_state;
pub mod handler;
pub mod render;
pub mod ui_constants;


pub use form_ui_state::FormUiState;
pub use handler::FormLogic;
