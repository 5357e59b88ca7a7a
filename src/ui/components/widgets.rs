use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::components::theme::ThemePalette;
use crate::ui::selection::is_local_command;
use crate::ui::session::SessionState;

pub fn query_bar(query: &str, palette: ThemePalette, state: SessionState) -> Paragraph<'static> {
    let local = is_local_command(query);

    let (title_text, title_style) = if local {
        (
            "▸ Command (Enter runs, :q quits)".to_string(),
            Style::default()
                .fg(palette.accent_alt)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        let label = match state {
            SessionState::Searching => "Search · …",
            SessionState::Idle | SessionState::Displaying => "Search",
        };
        (label.to_string(), palette.title())
    };

    let text_style = if local {
        Style::default().fg(palette.accent_alt)
    } else {
        Style::default().fg(palette.accent)
    };

    let cursor = "▎";
    let line = Line::from(vec![
        Span::styled("> ", palette.hint_style()),
        Span::styled(format!("{query}{cursor}"), text_style),
    ]);

    // No wrapping so the cursor at the end stays visible on long queries.
    Paragraph::new(line)
        .block(
            Block::default()
                .title(Span::styled(title_text, title_style))
                .borders(Borders::ALL)
                .border_style(palette.border_focus_style()),
        )
        .alignment(Alignment::Left)
}
