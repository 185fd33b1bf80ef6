//! Menu-driven navigation for Atlas.
//!
//! The [`Navigator`] presents a main menu of sections (Travel, Resume, Home)
//! and runs the workflow behind each sub-menu action. Workflows compose the
//! entity repository, the media pipeline and the external collaborators, and
//! every question they ask goes through a [`Prompter`].
//!
//! # Selection Points
//!
//! Numbered lists accept a number in range plus control tokens:
//!
//! - `<` -- retry the current step with the same parents
//! - `/` -- abandon the workflow and return to the main menu
//! - `*` -- apply to every listed item, where offered
//!
//! Anything else is rejected and asked again; rejected input never changes
//! state.

pub mod editor;
pub mod error;
pub mod import;
pub mod menu;
pub mod navigator;
pub mod preload;
pub mod prompt;
pub mod rank;
pub mod selection;

pub use editor::{edit_entity, fill_entity};
pub use error::{NavError, NavResult};
pub use import::{ImportReport, PhotoImporter};
pub use menu::{MenuAction, Operation, Section};
pub use navigator::{Collaborators, Navigator, Outcome};
pub use preload::AlbumPreload;
pub use prompt::{ask_text, choose, Prompter, ScriptedPrompter};
pub use rank::{rank_albums, token_set_similarity, SUGGESTION_LIMIT};
pub use selection::{
    parse_selection, parse_text, Controls, Flow, InputRejection, Selection, TextInput,
};
