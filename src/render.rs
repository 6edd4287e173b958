use crate::config::{DisplayMode, Settings};
use crate::display::DisplayState;
use crate::model::{Activity, Button, BUTTON_COUNT};
use crate::sim::Control;
use crate::sprites::{Bitmap, SIZE};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const CASE_BG: Color = Color::Rgb {
    r: 160,
    g: 178,
    b: 129,
};
const INK: Color = Color::Rgb { r: 10, g: 12, b: 6 };
const UNLIT: Color = Color::Rgb {
    r: 156,
    g: 170,
    b: 125,
};
const BUTTON_RED: Color = Color::Rgb {
    r: 200,
    g: 33,
    b: 44,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Screen layout
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rect {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) w: u16,
    pub(crate) h: u16,
}

impl Rect {
    pub(crate) fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }
}

const MARGIN: u16 = 2;
const LABEL_W: u16 = 7;
const BUTTON_W: u16 = 6;
const BUTTON_H: u16 = 3;
const DEBUG_W: u16 = 24;

/// Where each part of the device sits on screen. Clicks are resolved
/// against the same rectangles the frame is drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) toolbar: Rect,
    pub(crate) lcd: Rect,
    pub(crate) buttons: [Rect; 3],
    pub(crate) debug: Option<Rect>,
    pub(crate) help_row: u16,
    pub(crate) mode: DisplayMode,
}

impl Layout {
    pub(crate) fn new(cols: u16, rows: u16, mode: DisplayMode) -> Self {
        let size = SIZE as u16;
        // half blocks hold 1x2 pixels per cell, braille 2x4
        let (lcd_w, lcd_h) = match mode {
            DisplayMode::HalfBlock => (size, size / 2),
            DisplayMode::Braille => (size / 2, size / 4),
        };
        let toolbar = Rect {
            x: MARGIN,
            y: 2,
            w: LABEL_W * BUTTON_COUNT as u16,
            h: 1,
        };
        let lcd = Rect {
            x: MARGIN + 1,
            y: 4,
            w: lcd_w,
            h: lcd_h,
        };

        let span = (lcd_w + 2).max(BUTTON_W * 3 + 4);
        let gap = (span - BUTTON_W * 3) / 2;
        let button_y = lcd.y + lcd.h + 2;
        let buttons = [0u16, 1, 2].map(|i| Rect {
            x: MARGIN + i * (BUTTON_W + gap),
            y: button_y,
            w: BUTTON_W,
            h: BUTTON_H,
        });

        let debug_x = MARGIN + span.max(toolbar.w) + 3;
        let debug = (debug_x + DEBUG_W <= cols).then_some(Rect {
            x: debug_x,
            y: 3,
            w: DEBUG_W,
            h: 10,
        });

        Self {
            toolbar,
            lcd,
            buttons,
            debug,
            help_row: rows.saturating_sub(1),
            mode,
        }
    }

    pub(crate) fn button_at(&self, col: u16, row: u16) -> Option<Control> {
        let controls = [Control::Prev, Control::Activate, Control::Next];
        self.buttons
            .iter()
            .zip(controls)
            .find(|(zone, _)| zone.contains(col, row))
            .map(|(_, c)| c)
    }
}

/* -----------------------------
   LCD encoding
------------------------------ */

fn half_block(top: bool, bottom: bool, enable_color: bool) -> Cell {
    if enable_color {
        let ink = |on: bool| if on { INK } else { UNLIT };
        return Cell {
            ch: '▀',
            fg: ink(top),
            bg: ink(bottom),
        };
    }
    let ch = match (top, bottom) {
        (false, false) => ' ',
        (true, false) => '▀',
        (false, true) => '▄',
        (true, true) => '█',
    };
    Cell {
        ch,
        fg: Color::White,
        bg: Color::Black,
    }
}

fn braille_bit(dx: usize, dy: usize) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

fn braille_char(lcd: &Bitmap, cx: usize, cy: usize) -> char {
    let mut mask: u8 = 0;
    for dy in 0..4 {
        for dx in 0..2 {
            if lcd.get(cx * 2 + dx, cy * 4 + dy) {
                mask |= braille_bit(dx, dy);
            }
        }
    }
    char::from_u32(0x2800 + u32::from(mask)).unwrap_or(' ')
}

pub(crate) fn lcd_to_cells(buf: &mut CellBuffer, area: Rect, lcd: &Bitmap, enable_color: bool, mode: DisplayMode) {
    for cy in 0..area.h {
        for cx in 0..area.w {
            let (x, y) = (cx as usize, cy as usize);
            let cell = match mode {
                DisplayMode::HalfBlock => half_block(lcd.get(x, y * 2), lcd.get(x, y * 2 + 1), enable_color),
                DisplayMode::Braille => {
                    let (fg, bg) = if enable_color {
                        (INK, UNLIT)
                    } else {
                        (Color::White, Color::Black)
                    };
                    Cell {
                        ch: braille_char(lcd, x, y),
                        fg,
                        bg,
                    }
                }
            };
            buf.set(area.x + cx, area.y + cy, cell);
        }
    }
}

/* -----------------------------
   Device chrome (text + buttons)
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn draw_box(buf: &mut CellBuffer, r: Rect, fg: Color, bg: Color) {
    if r.w < 2 || r.h < 2 {
        return;
    }
    let right = r.x + r.w - 1;
    let bottom = r.y + r.h - 1;
    for x in r.x..=right {
        let (top_ch, bottom_ch) = if x == r.x {
            ('╭', '╰')
        } else if x == right {
            ('╮', '╯')
        } else {
            ('─', '─')
        };
        buf.set(x, r.y, Cell { ch: top_ch, fg, bg });
        buf.set(x, bottom, Cell { ch: bottom_ch, fg, bg });
    }
    for y in r.y + 1..bottom {
        buf.set(r.x, y, Cell { ch: '│', fg, bg });
        buf.set(right, y, Cell { ch: '│', fg, bg });
    }
}

fn button_label(b: Button) -> &'static str {
    match b {
        Button::Feed => "FEED",
        Button::Clean => "CLEAN",
        Button::Stats => "STATS",
        Button::Sleep => "SLEEP",
    }
}

fn activity_label(a: Activity) -> &'static str {
    match a {
        Activity::Idle => "idle",
        Activity::Eating => "eating",
        Activity::Cleaning => "cleaning",
        Activity::Sleeping => "asleep",
        Activity::Dead => "passed on",
    }
}

pub(crate) fn draw_screen(buf: &mut CellBuffer, layout: &Layout, ds: &DisplayState, settings: &Settings) {
    let bg = Color::Black;
    let fg = Color::White;
    let hi = Color::Yellow;

    let title = format!(
        "bitgotchi  |  {}  |  {}",
        ds.pet.stage,
        activity_label(ds.activity)
    );
    draw_text(buf, 1, 0, &title, fg, bg);

    for i in 0..BUTTON_COUNT {
        let label = format!("{:^w$}", button_label(Button::from_index(i)), w = LABEL_W as usize);
        let (f, b) = if i == ds.selected_button {
            (Color::Black, hi)
        } else {
            (fg, bg)
        };
        let x = layout.toolbar.x + i as u16 * LABEL_W;
        draw_text(buf, x, layout.toolbar.y, &label, f, b);
    }

    let frame = Rect {
        x: layout.lcd.x - 1,
        y: layout.lcd.y - 1,
        w: layout.lcd.w + 2,
        h: layout.lcd.h + 2,
    };
    let case = if settings.enable_color { CASE_BG } else { fg };
    draw_box(buf, frame, case, bg);
    lcd_to_cells(buf, layout.lcd, &ds.lcd, settings.enable_color, layout.mode);

    let knob = if settings.enable_color { BUTTON_RED } else { fg };
    for (zone, glyph) in layout.buttons.iter().zip(["◀", "●", "▶"]) {
        draw_box(buf, *zone, knob, bg);
        draw_text(buf, zone.x + zone.w / 2 - 1, zone.y + 1, glyph, knob, bg);
    }

    if settings.show_debug {
        if let Some(area) = layout.debug {
            draw_debug(buf, area, ds, fg, bg);
        }
    }

    let help = "←/a prev | ↓/s/enter select | →/d next | click buttons | q quit";
    draw_text(buf, 1, layout.help_row, help, fg, bg);
}

fn draw_debug(buf: &mut CellBuffer, area: Rect, ds: &DisplayState, fg: Color, bg: Color) {
    let pet = &ds.pet;
    let mut lines = vec![
        "DEBUG".to_string(),
        format!("AGE       {:>6}", pet.age),
        format!("HUNGER    {:>6}", pet.hunger),
        format!("ENERGY    {:>6}", pet.energy),
        format!("WASTE     {:>6}", pet.waste),
        format!("HAPPINESS {:>6}", pet.happiness),
        format!("OFFSET    {:>6}", ds.offset),
        format!("LIT       {:>6}", ds.lcd.count()),
    ];
    if ds.stats_mode {
        lines.push(format!("{}", ds.stats_page));
        lines.push(format!("BAR       {:>6}", ds.bar));
    }
    for (i, line) in lines.iter().take(area.h as usize).enumerate() {
        draw_text(buf, area.x, area.y + i as u16, line, fg, bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{compose, Snapshot};
    use crate::model::{AnimKey, AnimationState, PetState, Rules, Stage, UiState};
    use crate::sprites::SpriteSheet;

    fn row_text(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).map(|x| buf.cells[buf.idx(x, y)].ch).collect()
    }

    fn display(ui: UiState) -> DisplayState {
        let rules = Rules::default();
        let mut pet = PetState::hatchling(&rules);
        pet.stage = Stage::Child;
        let mut anim = AnimationState::new();
        anim.current = AnimKey::idle(Stage::Child);
        let snap = Snapshot {
            pet,
            activity: Activity::Idle,
            overlay: None,
            anim,
            ui,
        };
        compose(&snap, &rules, &SpriteSheet::builtin().unwrap()).unwrap()
    }

    #[test]
    fn half_blocks_pack_two_pixels() {
        assert_eq!(half_block(true, true, false).ch, '█');
        assert_eq!(half_block(false, true, false).ch, '▄');
        let c = half_block(true, false, true);
        assert_eq!((c.ch, c.fg, c.bg), ('▀', INK, UNLIT));
    }

    #[test]
    fn braille_packs_eight_pixels() {
        let mut lcd = Bitmap::blank();
        assert_eq!(braille_char(&lcd, 0, 0), '\u{2800}');
        lcd.fill_rect(0, 0, 2, 4, true);
        assert_eq!(braille_char(&lcd, 0, 0), '\u{28FF}');
        lcd = Bitmap::blank();
        lcd.set(3, 5, true);
        assert_eq!(braille_char(&lcd, 1, 1), '\u{2810}');
    }

    #[test]
    fn lcd_covers_every_pixel() {
        for mode in [DisplayMode::HalfBlock, DisplayMode::Braille] {
            let layout = Layout::new(80, 30, mode);
            let mut lcd = Bitmap::blank();
            lcd.set(SIZE - 1, SIZE - 1, true);
            let mut buf = CellBuffer::new(80, 30);
            lcd_to_cells(&mut buf, layout.lcd, &lcd, false, mode);
            let corner = buf.cells[buf.idx(layout.lcd.x + layout.lcd.w - 1, layout.lcd.y + layout.lcd.h - 1)];
            assert_ne!(corner.ch, ' ');
            assert_ne!(corner.ch, '\u{2800}');
        }
    }

    #[test]
    fn buttons_sit_below_the_lcd_without_overlap() {
        for mode in [DisplayMode::HalfBlock, DisplayMode::Braille] {
            let layout = Layout::new(80, 30, mode);
            let [a, b, c] = layout.buttons;
            assert!(a.y > layout.lcd.y + layout.lcd.h);
            assert!(a.x + a.w <= b.x && b.x + b.w <= c.x);
            assert_eq!(layout.button_at(b.x, b.y), Some(Control::Activate));
            assert_eq!(layout.button_at(b.x + b.w, b.y), None);
        }
    }

    #[test]
    fn narrow_terminal_drops_the_debug_panel() {
        assert!(Layout::new(80, 30, DisplayMode::HalfBlock).debug.is_some());
        assert!(Layout::new(40, 30, DisplayMode::HalfBlock).debug.is_none());
    }

    #[test]
    fn screen_shows_toolbar_and_debug_values() {
        let layout = Layout::new(80, 30, DisplayMode::HalfBlock);
        let mut buf = CellBuffer::new(80, 30);
        let ui = UiState {
            selected_button: 2,
            ..UiState::default()
        };
        let ds = display(ui);
        draw_screen(&mut buf, &layout, &ds, &Settings::default());

        assert!(row_text(&buf, 0).contains("child"));
        let toolbar = row_text(&buf, layout.toolbar.y);
        for label in ["FEED", "CLEAN", "STATS", "SLEEP"] {
            assert!(toolbar.contains(label));
        }
        let stats_x = layout.toolbar.x + 2 * LABEL_W;
        assert_eq!(buf.cells[buf.idx(stats_x, layout.toolbar.y)].bg, Color::Yellow);

        let Some(debug) = layout.debug else {
            panic!("debug panel should fit");
        };
        assert!(row_text(&buf, debug.y + 1).contains("AGE"));
    }

    #[test]
    fn stats_mode_lists_the_page_in_debug() {
        let layout = Layout::new(80, 30, DisplayMode::HalfBlock);
        let mut buf = CellBuffer::new(80, 30);
        let ui = UiState {
            stats_mode: true,
            ..UiState::default()
        };
        draw_screen(&mut buf, &layout, &display(ui), &Settings::default());
        let text: String = (0..buf.h).map(|y| row_text(&buf, y)).collect();
        assert!(text.contains("DISPLAY_HUNGER"));
    }
}
