use crate::fish::FishView;
use crate::motion::Size;
use crate::tank::Tank;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg,
        }
    }
}

#[derive(Clone, Copy)]
struct Palette {
    sky: Color,
    surface: Color,
    water_hi: Color,
    water_mid: Color,
    water_low: Color,
    sand: Color,
    hud: Color,
    fish_a: Color,
    fish_b: Color,
    resting: Color,
    bubble: Color,
}

const PALETTE: Palette = Palette {
    sky: Color::AnsiValue(16),
    surface: Color::AnsiValue(159),
    water_hi: Color::AnsiValue(31),
    water_mid: Color::AnsiValue(25),
    water_low: Color::AnsiValue(18),
    sand: Color::AnsiValue(180),
    hud: Color::AnsiValue(159),
    fish_a: Color::AnsiValue(229),
    fish_b: Color::AnsiValue(215),
    resting: Color::AnsiValue(246),
    bubble: Color::AnsiValue(255),
};

/// Terminal cell size in tank pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Metrics {
    pub(crate) cell_w: i32,
    pub(crate) cell_h: i32,
}

impl Metrics {
    pub(crate) fn tank_px(&self, cols: u16, rows: u16) -> (i32, i32) {
        (i32::from(cols) * self.cell_w, i32::from(rows) * self.cell_h)
    }

    pub(crate) fn to_cell(&self, x: i32, y: i32) -> (i32, i32) {
        (x.div_euclid(self.cell_w), y.div_euclid(self.cell_h))
    }

    /// Pixel at the middle of a terminal cell, for hit testing clicks.
    pub(crate) fn cell_center(&self, col: u16, row: u16) -> (i32, i32) {
        (
            i32::from(col) * self.cell_w + self.cell_w / 2,
            i32::from(row) * self.cell_h + self.cell_h / 2,
        )
    }
}

/// `><label>` facing right, `<label><` facing left.
pub(crate) fn sprite(label: &str, flipped: bool) -> String {
    if flipped {
        format!("<{label}><")
    } else {
        format!("><{label}>")
    }
}

pub(crate) fn sprite_size(label: &str, metrics: Metrics) -> Size {
    let cells = sprite(label, false).chars().count() as i32;
    Size {
        width: cells * metrics.cell_w,
        height: metrics.cell_h,
    }
}

pub(crate) struct Renderer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    front: Vec<Cell>,
    back: Vec<Cell>,
    pub(crate) full_redraw: bool,
    last_fg: Color,
    last_bg: Color,
}

impl Renderer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        let n = (w as usize) * (h as usize);
        Self {
            w,
            h,
            front: vec![Cell::blank(PALETTE.sky); n],
            back: vec![Cell::blank(PALETTE.sky); n],
            full_redraw: true,
            last_fg: Color::Reset,
            last_bg: PALETTE.sky,
        }
    }

    pub(crate) fn resize(&mut self, w: u16, h: u16) {
        *self = Self::new(w, h);
    }

    #[inline]
    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    #[cfg(test)]
    pub(crate) fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.back[self.idx(x, y)])
    }

    fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 || x >= i32::from(self.w) || y >= i32::from(self.h) {
            return;
        }
        let i = self.idx(x as u16, y as u16);
        self.back[i] = cell;
    }

    /// Writes text over the existing background colors.
    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let px = x + i as i32;
            if px < 0 || y < 0 || px >= i32::from(self.w) || y >= i32::from(self.h) {
                continue;
            }
            let bg = self.back[self.idx(px as u16, y as u16)].bg;
            self.put(px, y, Cell { ch, fg, bg });
        }
    }

    /// Sends the cells that changed since the last flush. The cursor is only
    /// moved when the next changed cell does not follow the previous one.
    pub(crate) fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;

        let width = usize::from(self.w);
        let mut next: Option<usize> = None;
        for (i, (front, &back)) in self.front.iter_mut().zip(&self.back).enumerate() {
            if !self.full_redraw && *front == back {
                continue;
            }

            if next != Some(i) || i % width == 0 {
                queue!(out, cursor::MoveTo((i % width) as u16, (i / width) as u16))?;
            }
            if back.bg != self.last_bg {
                queue!(out, SetBackgroundColor(back.bg))?;
                self.last_bg = back.bg;
            }
            if back.fg != self.last_fg {
                queue!(out, SetForegroundColor(back.fg))?;
                self.last_fg = back.fg;
            }
            queue!(out, Print(back.ch))?;

            *front = back;
            next = Some(i + 1);
        }
        self.full_redraw = false;

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}

/// Overlay state owned by the app, not the tank.
pub(crate) struct Hud {
    pub(crate) show_hud: bool,
    pub(crate) show_help: bool,
    pub(crate) fps: f32,
}

/// Paints one frame into the back buffer. `t` is seconds since start.
pub(crate) fn render_frame(renderer: &mut Renderer, tank: &Tank, metrics: Metrics, t: f32, hud: &Hud) {
    let (_, surface_row) = metrics.to_cell(0, tank.water_line());
    draw_water(renderer, surface_row, t);

    for i in tank.stacking_order() {
        let view = tank.fish()[i].view();
        let color = if !view.swimming {
            PALETTE.resting
        } else if i % 2 == 0 {
            PALETTE.fish_a
        } else {
            PALETTE.fish_b
        };
        draw_fish(renderer, &view, metrics, color);
    }

    if hud.show_hud && renderer.h >= 2 {
        draw_hud(renderer, tank, hud.fps);
    }
    if hud.show_help {
        draw_help(renderer);
    }
}

fn draw_water(renderer: &mut Renderer, surface_row: i32, t: f32) {
    let w = i32::from(renderer.w);
    let h = i32::from(renderer.h);
    let depth = (h - surface_row).max(1) as f32;

    for y in 0..h {
        for x in 0..w {
            let cell = if y < surface_row {
                Cell::blank(PALETTE.sky)
            } else if y == surface_row {
                let phase = (x as f32 * 0.35 + t * 2.2).sin();
                Cell {
                    ch: if phase > 0.4 { '≈' } else { '~' },
                    fg: PALETTE.surface,
                    bg: PALETTE.water_hi,
                }
            } else if y == h - 1 {
                Cell {
                    ch: '░',
                    fg: PALETTE.sand,
                    bg: PALETTE.water_low,
                }
            } else {
                let d = (y - surface_row) as f32 / depth;
                let bg = if d < 0.33 {
                    PALETTE.water_hi
                } else if d < 0.66 {
                    PALETTE.water_mid
                } else {
                    PALETTE.water_low
                };
                Cell::blank(bg)
            };
            renderer.put(x, y, cell);
        }
    }
}

fn draw_fish(renderer: &mut Renderer, view: &FishView, metrics: Metrics, color: Color) {
    let (col, row) = metrics.to_cell(view.x, view.y);
    let body = sprite(&view.label, view.scale_x < 0.0);
    renderer.put_str(col, row, &body, color);

    if let Some(text) = &view.bubble {
        draw_bubble(renderer, col, row, text);
    }
}

fn draw_bubble(renderer: &mut Renderer, col: i32, row: i32, text: &str) {
    let inner = text.chars().count() + 2;
    let top = format!("╭{}╮", "─".repeat(inner));
    let mid = format!("│ {text} │");
    let bottom = format!("╰─┬{}╯", "─".repeat(inner.saturating_sub(2)));

    for (dy, line) in [top, mid, bottom].iter().enumerate() {
        let y = row - 3 + dy as i32;
        for (i, ch) in line.chars().enumerate() {
            renderer.put(
                col + i as i32,
                y,
                Cell {
                    ch,
                    fg: PALETTE.sky,
                    bg: PALETTE.bubble,
                },
            );
        }
    }
}

fn draw_hud(renderer: &mut Renderer, tank: &Tank, fps: f32) {
    let line = format!(
        "  Fishtank  | fish: {}  | swimming: {}  | {:.0} fps  ",
        tank.fish().len(),
        tank.swimming_count(),
        fps
    );
    let hint = "  keys: Q quit  1-9/click toggle fish  + add fish  H hud  ? help  ";

    for (y, text) in [line.as_str(), hint].into_iter().enumerate() {
        let y = y as i32;
        for x in 0..i32::from(renderer.w) {
            renderer.put(x, y, Cell::blank(PALETTE.sky));
        }
        renderer.put_str(0, y, text, PALETTE.hud);
    }
}

fn draw_help(renderer: &mut Renderer) {
    let w = i32::from(renderer.w);
    let h = i32::from(renderer.h);

    let lines = [
        "Fishtank",
        "",
        "Q / Esc: quit",
        "1-9: toggle that fish",
        "Click: toggle the fish under the cursor",
        "+: add a fish",
        "H: toggle HUD",
        "?: toggle this help",
    ];

    // Narrow terminals get a box as wide as they allow.
    let max_w = (w - 2).max(1);
    let box_w = ((w as f32 * 0.6) as i32).clamp(44.min(max_w), max_w);
    let box_h = (lines.len() as i32 + 2).min(h - 2).max(3);
    let x0 = (w - box_w) / 2;
    let y0 = (h - box_h) / 2;

    for y in 0..box_h {
        for x in 0..box_w {
            let right = box_w - 1;
            let bottom = box_h - 1;
            let ch = match (x, y) {
                (0, 0) => '┌',
                (x, 0) if x == right => '┐',
                (0, y) if y == bottom => '└',
                (x, y) if x == right && y == bottom => '┘',
                (_, y) if y == 0 || y == bottom => '─',
                (x, _) if x == 0 || x == right => '│',
                _ => ' ',
            };
            renderer.put(
                x0 + x,
                y0 + y,
                Cell {
                    ch,
                    fg: PALETTE.hud,
                    bg: PALETTE.sky,
                },
            );
        }
    }

    for (row, s) in lines.iter().enumerate() {
        let y = y0 + 1 + row as i32;
        if y >= y0 + box_h - 1 {
            break;
        }
        let text: String = s.chars().take((box_w - 4).max(0) as usize).collect();
        renderer.put_str(x0 + 2, y, &text, PALETTE.hud);
    }
}

/// Raw mode, alternate screen and mouse capture for as long as it lives.
pub(crate) struct TerminalGuard;

impl TerminalGuard {
    pub(crate) fn enter() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        queue!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            EnableMouseCapture,
            cursor::Hide
        )?;
        out.flush()?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if let Err(err) = queue!(
            out,
            EndSynchronizedUpdate,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        ) {
            tracing::error!(?err, "failed to restore terminal");
        }
        let _ = out.flush();
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
    }
}
