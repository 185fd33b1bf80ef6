//! Parsing of operator input at selection points.
//!
//! A selection point offers numbered options plus up to three control
//! tokens. Parsing never fails: anything that is not an acceptable choice
//! comes back as [`Selection::Rejected`] with the reason, and the caller
//! re-prompts.

use std::fmt;

/// Token that retries the current step.
pub const BACK_TOKEN: &str = "<";
/// Token that abandons the workflow and returns to the main menu.
pub const MAIN_MENU_TOKEN: &str = "/";
/// Token that applies the step to every listed item.
pub const ALL_TOKEN: &str = "*";

/// Why an input was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputRejection {
    /// An integer outside the offered range.
    OutOfRange,
    /// Neither an integer nor a control token.
    Invalid,
    /// A control token this selection point does not accept.
    Forbidden,
}

impl fmt::Display for InputRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => f.write_str("Input is out of range"),
            Self::Invalid => f.write_str("Invalid input"),
            Self::Forbidden => f.write_str("That option is not available here"),
        }
    }
}

/// Parsed input at a selection point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The number the operator entered, within range.
    Item(usize),
    Back,
    MainMenu,
    All,
    Rejected(InputRejection),
}

/// Control tokens accepted at a selection point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub back: bool,
    pub main_menu: bool,
    pub all: bool,
}

impl Controls {
    /// Numbers only.
    pub const NONE: Self = Self {
        back: false,
        main_menu: false,
        all: false,
    };

    /// `<` and `/`.
    pub const NAVIGATION: Self = Self {
        back: true,
        main_menu: true,
        all: false,
    };

    /// `<`, `/` and `*`.
    pub const WITH_ALL: Self = Self {
        back: true,
        main_menu: true,
        all: true,
    };

    /// Hint listing the accepted tokens, e.g. `"< back, / main menu"`.
    pub fn hint(&self) -> String {
        let mut parts = Vec::new();
        if self.back {
            parts.push(format!("{BACK_TOKEN} back"));
        }
        if self.main_menu {
            parts.push(format!("{MAIN_MENU_TOKEN} main menu"));
        }
        if self.all {
            parts.push(format!("{ALL_TOKEN} all"));
        }
        parts.join(", ")
    }
}

/// Parse `input` against the inclusive range `[min, max]`.
pub fn parse_selection(input: &str, min: usize, max: usize, controls: Controls) -> Selection {
    let input = input.trim();
    let control = match input {
        BACK_TOKEN => Some((controls.back, Selection::Back)),
        MAIN_MENU_TOKEN => Some((controls.main_menu, Selection::MainMenu)),
        ALL_TOKEN => Some((controls.all, Selection::All)),
        _ => None,
    };
    if let Some((allowed, selection)) = control {
        return if allowed {
            selection
        } else {
            Selection::Rejected(InputRejection::Forbidden)
        };
    }

    match input.parse::<i64>() {
        Ok(n) if n >= 0 && (min..=max).contains(&(n as usize)) => Selection::Item(n as usize),
        Ok(_) => Selection::Rejected(InputRejection::OutOfRange),
        Err(_) if is_integer_literal(input) => Selection::Rejected(InputRejection::OutOfRange),
        Err(_) => Selection::Rejected(InputRejection::Invalid),
    }
}

/// Digits with an optional sign, too large for `i64`.
fn is_integer_literal(input: &str) -> bool {
    let digits = input.strip_prefix(['-', '+']).unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parsed free-text input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextInput {
    Text(String),
    Back,
    MainMenu,
}

/// Interpret free text: the bare `<` and `/` tokens navigate, anything else
/// is text (trimmed).
pub fn parse_text(input: &str) -> TextInput {
    match input.trim() {
        BACK_TOKEN => TextInput::Back,
        MAIN_MENU_TOKEN => TextInput::MainMenu,
        text => TextInput::Text(text.to_string()),
    }
}

/// Outcome of a step the operator can back out of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow<T> {
    Proceed(T),
    Back,
    MainMenu,
}

/// Parse a yes/no answer. Anything other than `y`/`yes` is no.
pub fn parse_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
