//! Keyboard shortcut labels used by the footer.

pub const OPEN: &str = "Enter";
pub const NAVIGATE: &str = "↑/↓";
pub const DELETE: &str = "Ctrl-K";
pub const COPY: &str = "Ctrl-X";
pub const CLEAR_QUERY: &str = "Ctrl-U";
pub const QUIT: &str = "Ctrl-D/Esc";
pub const QUIT_COMMAND: &str = ":q";
