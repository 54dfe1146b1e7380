use std::fmt;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// The 64x32 monochrome pixel grid the interpreter draws into. It knows
/// nothing about sprites or registers; coordinates wrap around both edges.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Box<[bool]>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: vec![false; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: bool) {
        self.pixels[Self::index(x, y)] = value;
    }

    pub fn is_clear(&self) -> bool {
        self.pixels.iter().all(|p| !*p)
    }

    /// coordinates of every lit pixel, row by row
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, lit)| **lit)
            .map(|(i, _)| (i % SCREEN_WIDTH, i / SCREEN_WIDTH))
    }

    fn index(x: usize, y: usize) -> usize {
        x % SCREEN_WIDTH + (y % SCREEN_HEIGHT) * SCREEN_WIDTH
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// renders the grid as text, '@' for a lit pixel, one line per row
impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.pixels.chunks(SCREEN_WIDTH).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for lit in row {
                f.write_str(if *lit { "@" } else { " " })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameBuffer {{ lit: {} }}", self.lit_pixels().count())
    }
}

/// Display is used by the host to put a frame on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// present one frame
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of each lit pixel; canvas y grows upwards
    fn points(&self, frame: &FrameBuffer) -> Vec<(f64, f64)> {
        frame
            .lit_pixels()
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    title: String,
}

impl MonoTermDisplay {
    pub fn new(title: &str) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT),
            title: title.to_string(),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let coords = self.resolution.points(frame);
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let title = self.title.as_str();

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was shown
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub last_frame: Option<FrameBuffer>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clear() {
        let fb = FrameBuffer::new();
        assert!(fb.is_clear());
        assert_eq!(fb.lit_pixels().count(), 0);
    }

    #[test]
    fn test_set_and_get_pixel() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, true);
        assert!(fb.get_pixel(0, 0));
        fb.set_pixel(0, 0, false);
        assert!(!fb.get_pixel(0, 0));
    }

    #[test]
    fn test_row_major_layout() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(5, 2, true);
        assert_eq!(fb.pixels.iter().position(|p| *p), Some(5 + 2 * 64));
        assert_eq!(fb.lit_pixels().collect::<Vec<_>>(), vec![(5, 2)]);
    }

    #[test]
    fn test_coordinates_wrap() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(64, 32, true);
        assert!(fb.get_pixel(0, 0));
        fb.set_pixel(67, 33, true);
        assert!(fb.get_pixel(3, 1));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(10, 10, true);
        fb.set_pixel(63, 31, true);
        fb.clear();
        assert!(fb.is_clear());
    }

    #[test]
    fn test_text_rendering() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, true);
        fb.set_pixel(63, 31, true);
        let text = fb.to_string();
        let rows: Vec<&str> = text.split('\n').collect();
        assert_eq!(rows.len(), SCREEN_HEIGHT);
        assert!(rows.iter().all(|r| r.chars().count() == SCREEN_WIDTH));
        assert!(rows[0].starts_with('@'));
        assert!(rows[31].ends_with('@'));
        assert_eq!(text.matches('@').count(), 2);
    }

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_points_flip_y() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::new();
        fb.set_pixel(3, 4, true);
        assert_eq!(r.points(&fb), vec![(3.0, -4.0)]);
    }

    #[test]
    fn test_dummy_display_records_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let mut fb = FrameBuffer::new();
        d.draw(&fb)?;
        fb.set_pixel(1, 1, true);
        d.draw(&fb)?;
        assert_eq!(d.frames_drawn, 2);
        assert_eq!(d.last_frame, Some(fb));
        Ok(())
    }

    #[test]
    #[ignore]
    // NB. figure out how to stop rendering during tests
    fn test_term_display_draws() -> Result<(), io::Error> {
        let mut d = MonoTermDisplay::new("CHIP-8")?;
        d.draw(&FrameBuffer::new())
    }
}
