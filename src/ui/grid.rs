use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::sequencer::{Pattern, Voice, NUM_VOICES};

/// Grid cursor state
pub struct GridState {
    pub cursor_voice: usize,
    pub cursor_step: usize,
}

impl GridState {
    pub fn new() -> Self {
        Self {
            cursor_voice: 0,
            cursor_step: 0,
        }
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32, beats: usize) {
        self.cursor_step = ((self.cursor_step as i32 + dx).rem_euclid(beats as i32)) as usize;
        self.cursor_voice =
            ((self.cursor_voice as i32 + dy).rem_euclid(NUM_VOICES as i32)) as usize;
    }

    /// Keep the cursor inside a cycle that just shrank.
    pub fn clamp_to(&mut self, beats: usize) {
        if self.cursor_step >= beats {
            self.cursor_step = beats - 1;
        }
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the step grid: one row per voice, one column per step of the
/// current cycle, with cursor and playhead highlights.
pub fn render_grid(
    frame: &mut Frame,
    area: Rect,
    pattern: &Pattern,
    grid_state: &GridState,
    current_step: Option<usize>,
    beats: usize,
) {
    let block = Block::default()
        .title(Span::styled(" Pattern ", Style::default().fg(Color::Cyan)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_width = 6u16;
    let available_width = inner.width.saturating_sub(label_width);
    let cell_width = (available_width / beats as u16).max(2);
    let cell_height = (inner.height / NUM_VOICES as u16).max(1);

    for (row, voice) in Voice::ALL.into_iter().enumerate() {
        let row_y = inner.y + (row as u16 * cell_height);
        if row_y >= inner.y + inner.height {
            break;
        }

        let label = format!("{:>5} ", voice.name());
        let label_style = if row == grid_state.cursor_voice {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Cyan)
        };
        frame.render_widget(
            Paragraph::new(label).style(label_style),
            Rect::new(inner.x, row_y, label_width, 1),
        );

        for step in 0..beats {
            let step_x = inner.x + label_width + (step as u16 * cell_width);
            if step_x >= inner.x + inner.width {
                break;
            }

            let is_active = pattern.get(voice, step);
            let is_cursor = row == grid_state.cursor_voice && step == grid_state.cursor_step;
            let is_playhead = current_step == Some(step);

            let (symbol, style) = if is_cursor {
                ("[]", Style::default().fg(Color::Yellow).bold())
            } else if is_active && is_playhead {
                ("##", Style::default().fg(Color::Black).bg(Color::Green))
            } else if is_active {
                ("##", Style::default().fg(Color::Green))
            } else if is_playhead {
                ("..", Style::default().fg(Color::Black).bg(Color::DarkGray))
            } else {
                ("..", Style::default().fg(Color::DarkGray))
            };

            // Clip the cell to the block interior so a partial cell on a
            // narrow terminal never spills onto the border.
            let width = cell_width.min(2).min(inner.right().saturating_sub(step_x));
            frame.render_widget(
                Paragraph::new(symbol).style(style),
                Rect::new(step_x, row_y, width, 1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_within_the_cycle() {
        let mut grid = GridState::new();
        grid.move_cursor(-1, 0, 8);
        assert_eq!(grid.cursor_step, 7);
        grid.move_cursor(1, 0, 8);
        assert_eq!(grid.cursor_step, 0);
        grid.move_cursor(0, -1, 8);
        assert_eq!(grid.cursor_voice, NUM_VOICES - 1);
    }

    #[test]
    fn cursor_clamps_when_the_cycle_shrinks() {
        let mut grid = GridState::new();
        grid.move_cursor(10, 0, 16);
        grid.clamp_to(4);
        assert_eq!(grid.cursor_step, 3);
    }

    #[test]
    fn narrow_terminal_keeps_cells_off_the_border() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        // 25 columns: 6 for labels leaves 19, so the 2-wide cell at step
        // 8 starts on the last interior column.
        let backend = TestBackend::new(25, 7);
        let mut terminal = Terminal::new(backend).unwrap();
        let pattern = Pattern::basic_beat();
        terminal
            .draw(|frame| {
                render_grid(
                    frame,
                    frame.area(),
                    &pattern,
                    &GridState::new(),
                    Some(8),
                    16,
                );
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        for y in 1..=NUM_VOICES as u16 {
            let cell = buffer.cell((24, y)).unwrap();
            assert_eq!(cell.symbol(), "│", "border broken at row {y}");
        }
    }
}
