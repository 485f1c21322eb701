/// Rendering layer: all terminal I/O lives here.
///
/// [`TerminalView`] is the game's [`Presentation`].  It keeps the dialog and
/// banner state the engine asks for and, on every redraw, scales the panel's
/// pixel coordinates onto whatever terminal it is given.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use alien_intruders::collaborators::{Dialog, Presentation};
use alien_intruders::entities::Sprite;
use alien_intruders::geometry::Panel;
use alien_intruders::records::ScoreboardEntry;
use alien_intruders::session::Session;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_WAVE: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ALIEN: Color = Color::Green;
const C_ALIEN_KAMIKAZI: Color = Color::Red;
const C_LASER: Color = Color::Cyan;
const C_MISSILE: Color = Color::Magenta;
const C_EXPLOSION: Color = Color::Yellow;
const C_MESSAGE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

const CONTROLS_HINT: &str = "← → / A D : Move   SPACE : Shoot   ESC : Menu";

// ── Panel → terminal mapping ──────────────────────────────────────────────────

/// The playfield occupies rows 2..rows-2 and columns 1..cols-1; row 0 is the
/// HUD and the last row the controls hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Viewport {
    cols: u16,
    rows: u16,
    panel: Panel,
}

impl Viewport {
    fn inner_width(&self) -> i64 {
        i64::from(self.cols.saturating_sub(2)).max(1)
    }

    fn inner_height(&self) -> i64 {
        i64::from(self.rows.saturating_sub(4)).max(1)
    }

    /// Terminal cell for a panel point, or `None` when it is off the field.
    fn cell(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if x < 0 || y < 0 || x >= self.panel.width || y >= self.panel.height {
            return None;
        }
        let col = 1 + i64::from(x) * self.inner_width() / i64::from(self.panel.width.max(1));
        let row = 2 + i64::from(y) * self.inner_height() / i64::from(self.panel.height.max(1));
        Some((u16::try_from(col).ok()?, u16::try_from(row).ok()?))
    }
}

// ── View ──────────────────────────────────────────────────────────────────────

pub struct TerminalView<W: Write> {
    out: W,
    option_showing: bool,
    victory_showing: bool,
    dialog: Option<Dialog>,
    message: Option<String>,
    // Presentation calls cannot fail, so the first I/O error waits here
    error: Option<io::Error>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        TerminalView {
            out,
            option_showing: false,
            victory_showing: false,
            dialog: None,
            message: None,
            error: None,
        }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// The end-of-run dialog currently on screen, if any.
    pub fn dialog(&self) -> Option<Dialog> {
        self.dialog
    }

    /// Surfaces an I/O error swallowed during a redraw.
    pub fn take_error(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Render one complete frame.
    fn render(&mut self, session: Option<&Session>) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let out = &mut self.out;
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        let Some(session) = session else {
            draw_centered(out, cols, rows / 2, "Loading…", C_MESSAGE)?;
            out.queue(style::ResetColor)?;
            return out.flush();
        };

        let view = Viewport {
            cols,
            rows,
            panel: *session.panel(),
        };
        draw_border(out, cols, rows)?;
        draw_hud(out, session, cols)?;
        draw_actors(out, session, &view)?;

        out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(CONTROLS_HINT))?;

        if let Some(text) = &self.message {
            draw_centered(out, cols, rows / 2, text, C_MESSAGE)?;
        } else if self.victory_showing && self.dialog.is_none() {
            draw_centered(out, cols, rows / 2, "★  WAVE CLEARED  ★", C_HUD_SCORE)?;
        }
        if let Some(dialog) = self.dialog {
            draw_dialog(out, dialog, session.score(), cols, rows)?;
        }

        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
        out.flush()
    }

    pub fn draw_menu(&mut self, player_name: &str) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let out = &mut self.out;
        let cy = rows / 2;
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        draw_centered(out, cols, cy.saturating_sub(5), "★  ALIEN  INTRUDERS  ★", Color::Cyan)?;
        draw_centered(out, cols, cy.saturating_sub(3), &format!("Pilot: {player_name}"), Color::Yellow)?;

        let options: &[(&str, &str, Color)] = &[
            ("ENTER", "Play", Color::Green),
            ("S", "Scoreboard", Color::Yellow),
            ("Q", "Quit", Color::Red),
        ];
        let left = (cols / 2).saturating_sub(9);
        for (i, (key, label, color)) in options.iter().enumerate() {
            out.queue(cursor::MoveTo(left, cy.saturating_sub(1) + i as u16))?;
            out.queue(style::SetForegroundColor(Color::DarkGrey))?;
            out.queue(Print(format!("[{key:^5}] ")))?;
            out.queue(style::SetForegroundColor(*color))?;
            out.queue(Print(*label))?;
        }

        draw_centered(out, cols, cy + 4, CONTROLS_HINT, C_HINT)?;
        out.queue(style::ResetColor)?;
        out.flush()
    }

    pub fn draw_scoreboard(&mut self, scores: &[ScoreboardEntry]) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let out = &mut self.out;
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        draw_centered(out, cols, 1, "SCOREBOARD", Color::Cyan)?;

        let visible = usize::from(rows.saturating_sub(6));
        if scores.is_empty() {
            draw_centered(out, cols, 3, "No finished games yet", C_HINT)?;
        }
        for (i, line) in scoreboard_lines(scores).iter().take(visible).enumerate() {
            let colour = if i == 0 { Color::Yellow } else { Color::White };
            draw_centered(out, cols, 3 + i as u16, line, colour)?;
        }

        draw_centered(out, cols, rows.saturating_sub(2), "Press any key", C_HINT)?;
        out.queue(style::ResetColor)?;
        out.flush()
    }
}

/// One formatted row per entry, best first.
pub fn scoreboard_lines(scores: &[ScoreboardEntry]) -> Vec<String> {
    scores
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{:>3}. {:<16} {:>7}  {:>5}s",
                i + 1,
                entry.player_name,
                entry.score,
                entry.game_time_elapsed
            )
        })
        .collect()
}

impl<W: Write> Presentation for TerminalView<W> {
    fn is_option_showing(&self) -> bool {
        self.option_showing
    }

    fn set_option_showing(&mut self, showing: bool) {
        self.option_showing = showing;
        if !showing {
            self.dialog = None;
        }
    }

    fn is_victory_showing(&self) -> bool {
        self.victory_showing
    }

    fn set_victory_showing(&mut self, showing: bool) {
        self.victory_showing = showing;
    }

    fn show_option_dialog(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
    }

    fn show_victory(&mut self) {
        self.victory_showing = true;
    }

    fn show_message(&mut self, text: &str) {
        self.message = Some(text.to_string());
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn request_redraw(&mut self, session: Option<&Session>) {
        if let Err(e) = self.render(session) {
            self.error.get_or_insert(e);
        }
    }
}

// ── Frame pieces ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> io::Result<()> {
    let w = usize::from(cols);
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, session: &Session, cols: u16) -> io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}", session.score())))?;

    let wave = session.wave();
    let wave_str = format!("[ WAVE {} ]", wave.wave);
    let wx = (cols / 2).saturating_sub(wave_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(&wave_str))?;

    let living = format!("Aliens:{:>3}", session.formation().living_count());
    let rx = cols.saturating_sub(living.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_ALIEN))?;
    out.queue(Print(&living))?;
    Ok(())
}

fn draw_actors<W: Write>(out: &mut W, session: &Session, view: &Viewport) -> io::Result<()> {
    for alien in session.formation().aliens() {
        if let Some(missile) = alien.fired_missile().filter(|m| !m.is_dead()) {
            draw_glyph(out, view, missile.body().x, missile.body().y, "↓", C_MISSILE)?;
        }
    }
    for alien in session.formation().living() {
        let (glyph, colour) = if alien.is_kamikazi_mode() {
            ("(◎)", C_ALIEN_KAMIKAZI)
        } else {
            ("«▼»", C_ALIEN)
        };
        draw_glyph(out, view, alien.x(), alien.y(), glyph, colour)?;
    }

    let ship = session.spaceship();
    if let Some(laser) = ship.laser().filter(|l| !l.is_dead()) {
        draw_glyph(out, view, laser.body().x, laser.body().y, "║", C_LASER)?;
    }
    if !ship.is_dead() {
        draw_glyph(out, view, ship.x() + 20, ship.y(), "▲", C_PLAYER)?;
        draw_glyph(out, view, ship.x(), ship.y() + 20, "/█\\", C_PLAYER)?;
    }

    for explosion in session.explosions() {
        let glyph = if explosion.frames % 2 == 0 { "✶" } else { "*" };
        draw_glyph(out, view, explosion.x, explosion.y, glyph, C_EXPLOSION)?;
    }
    Ok(())
}

fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: i32,
    y: i32,
    glyph: &str,
    colour: Color,
) -> io::Result<()> {
    if let Some((col, row)) = view.cell(x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(colour))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_centered<W: Write>(out: &mut W, cols: u16, row: u16, text: &str, colour: Color) -> io::Result<()> {
    let col = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Dialog overlay ────────────────────────────────────────────────────────────

fn draw_dialog<W: Write>(out: &mut W, dialog: Dialog, score: u32, cols: u16, rows: u16) -> io::Result<()> {
    let colour = match dialog {
        Dialog::Defeat => Color::Red,
        Dialog::FinalVictory => Color::Yellow,
    };
    let title = format!("║ {:^28} ║", dialog.title());
    let lines = [
        format!("╔{}╗", "═".repeat(30)),
        title,
        format!("╚{}╝", "═".repeat(30)),
    ];
    let start = (rows / 2).saturating_sub(3);
    for (i, line) in lines.iter().enumerate() {
        draw_centered(out, cols, start + i as u16, line, colour)?;
    }
    draw_centered(out, cols, start + 3, dialog.message(), Color::White)?;
    draw_centered(out, cols, start + 4, &format!("Final Score: {score:>7}"), C_HUD_SCORE)?;
    draw_centered(
        out,
        cols,
        start + 5,
        "P - Play Again   M - Main Menu   Q - Exit",
        Color::White,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            cols: 122,
            rows: 79,
            panel: Panel::default(),
        }
    }

    #[test]
    fn panel_origin_maps_inside_the_border() {
        assert_eq!(viewport().cell(0, 0), Some((1, 2)));
    }

    #[test]
    fn panel_far_corner_stays_inside_the_border() {
        let view = viewport();
        let (col, row) = view.cell(1199, 749).unwrap();
        assert!(col < view.cols - 1);
        assert!(row < view.rows - 2);
    }

    #[test]
    fn off_panel_points_are_not_drawn() {
        let view = viewport();
        assert_eq!(view.cell(-1, 10), None);
        assert_eq!(view.cell(10, 750), None);
    }

    #[test]
    fn scoreboard_lines_are_ranked() {
        let scores = vec![
            ScoreboardEntry {
                player_name: "ace".into(),
                score: 900,
                game_time_elapsed: 61,
            },
            ScoreboardEntry {
                player_name: "rookie".into(),
                score: 100,
                game_time_elapsed: 12,
            },
        ];
        let lines = scoreboard_lines(&scores);
        assert!(lines[0].starts_with("  1. ace"));
        assert!(lines[1].contains("rookie"));
    }
}
