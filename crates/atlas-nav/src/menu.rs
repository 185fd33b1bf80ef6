//! The menu tree: a main menu of sections, each an ordered list of actions.

use atlas_types::ResumeKind;

/// Every workflow the operator can start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    AddDestination,
    AddPlace,
    AddAlbum,
    AddPhotos,
    SetAlbumCover,
    EditDestination,
    EditPlace,
    DeleteDestination,
    DeletePlace,
    AddResumeEntry(ResumeKind),
    UpdateHomePhotos,
}

/// One entry of a sub-menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuAction {
    pub label: &'static str,
    pub operation: Operation,
    /// Whether the workflow waits on remote collaborators.
    pub suspending: bool,
}

impl MenuAction {
    const fn new(label: &'static str, operation: Operation, suspending: bool) -> Self {
        Self {
            label,
            operation,
            suspending,
        }
    }
}

const TRAVEL_ACTIONS: &[MenuAction] = &[
    MenuAction::new("Add Destination", Operation::AddDestination, true),
    MenuAction::new("Add Place", Operation::AddPlace, true),
    MenuAction::new("Add Album", Operation::AddAlbum, true),
    MenuAction::new("Add Photos", Operation::AddPhotos, true),
    MenuAction::new("Set Album Cover", Operation::SetAlbumCover, false),
    MenuAction::new("Edit Destination", Operation::EditDestination, false),
    MenuAction::new("Edit Place", Operation::EditPlace, false),
    MenuAction::new("Delete Destination", Operation::DeleteDestination, false),
    MenuAction::new("Delete Place", Operation::DeletePlace, false),
];

const RESUME_ACTIONS: &[MenuAction] = &[
    MenuAction::new("Add Job", Operation::AddResumeEntry(ResumeKind::Job), true),
    MenuAction::new(
        "Add Education",
        Operation::AddResumeEntry(ResumeKind::Education),
        true,
    ),
    MenuAction::new("Add Skill", Operation::AddResumeEntry(ResumeKind::Skill), true),
];

const HOME_ACTIONS: &[MenuAction] = &[MenuAction::new(
    "Update Home Photos",
    Operation::UpdateHomePhotos,
    true,
)];

/// Entries of the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Travel,
    Resume,
    Home,
}

impl Section {
    /// Main menu order.
    pub const ALL: [Section; 3] = [Section::Travel, Section::Resume, Section::Home];

    pub fn label(self) -> &'static str {
        match self {
            Self::Travel => "Travel",
            Self::Resume => "Resume",
            Self::Home => "Home",
        }
    }

    pub fn actions(self) -> &'static [MenuAction] {
        match self {
            Self::Travel => TRAVEL_ACTIONS,
            Self::Resume => RESUME_ACTIONS,
            Self::Home => HOME_ACTIONS,
        }
    }
}

/// Lines of a numbered menu. `0` is always the way out.
pub fn render<'a>(labels: impl IntoIterator<Item = &'a str>, exit_label: &str) -> Vec<String> {
    let mut lines: Vec<String> = labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| format!("{}. {}", i + 1, label))
        .collect();
    lines.push(format!("0. {exit_label}"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_is_reachable_once() {
        let operations: Vec<Operation> = Section::ALL
            .iter()
            .flat_map(|s| s.actions().iter().map(|a| a.operation))
            .collect();
        assert_eq!(operations.len(), 13);
        for (i, op) in operations.iter().enumerate() {
            assert!(!operations[i + 1..].contains(op), "{op:?} listed twice");
        }
    }

    #[test]
    fn local_edits_do_not_suspend() {
        let edit = TRAVEL_ACTIONS
            .iter()
            .find(|a| a.operation == Operation::EditPlace)
            .unwrap();
        assert!(!edit.suspending);
        assert!(HOME_ACTIONS[0].suspending);
    }

    #[test]
    fn render_numbers_from_one_and_ends_with_exit() {
        let lines = render(["Travel", "Resume"], "To Exit");
        assert_eq!(lines, vec!["1. Travel", "2. Resume", "0. To Exit"]);
    }
}
