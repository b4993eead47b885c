//! Live night map
//!
//! Equirectangular braille world map with the published night overlay. The
//! map is the host of the refresh scheduler: it starts it when the view opens
//! and stops it when the view closes.

use crate::config::WatchConfig;
use crate::geo::{GeoPoint, Instant};
use crate::help::render_help_overlay;
use crate::locate;
use crate::overlay::OverlaySnapshot;
use crate::scheduler::{Clock, RefreshScheduler, SchedulerState, SystemClock, TickOutcome};
use crate::solar::{SolarPosition, SpaSun};
use crate::terminal::Terminal;
use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use crossterm::style::Color;
use crossterm::terminal::size;

const HELP: &str = "\
NIGHT MAP
─────────────────
r      Refresh now
p      Pause/resume refresh
?      Toggle help
q/Esc  Quit";

/// Coarse coastlines, (lon, lat) degrees.
const COASTLINES: &[&[(f64, f64)]] = &[
    // North America
    &[
        (-90.5, 69.5), (-94.7, 58.9), (-79.9, 51.2), (-64.6, 60.3), (-55.8, 53.3),
        (-65.1, 49.2), (-59.8, 45.9), (-76.3, 39.2), (-81.3, 31.4), (-80.4, 25.2),
        (-84.1, 30.1), (-97.1, 27.8), (-95.9, 18.8), (-87.1, 21.5), (-83.4, 15.3),
        (-82.2, 9.0), (-80.9, 7.2), (-105.0, 19.3), (-113.1, 31.2), (-124.4, 40.3),
        (-122.8, 49.0), (-134.1, 58.1), (-150.6, 61.3), (-164.8, 54.4), (-166.1, 61.5),
        (-168.1, 65.7), (-156.6, 71.4), (-108.9, 67.4), (-90.5, 69.5),
    ],
    // South America
    &[
        (-74.9, 11.1), (-61.9, 10.7), (-50.4, -0.1), (-34.7, -7.3), (-40.9, -21.9),
        (-53.8, -34.4), (-65.1, -41.1), (-71.0, -53.8), (-75.6, -46.6), (-70.4, -18.3),
        (-81.4, -4.7), (-77.1, 3.8), (-74.9, 11.1),
    ],
    // Europe
    &[
        (-9.4, 43.0), (-8.9, 36.9), (-5.9, 36.0), (8.9, 44.4), (15.7, 37.9),
        (18.5, 40.2), (13.9, 45.6), (23.2, 36.4), (28.8, 41.1), (39.1, 47.3),
        (41.6, 41.5), (31.3, 70.5), (19.2, 69.8), (5.9, 62.6), (5.7, 58.6),
        (10.4, 59.5), (8.1, 53.5), (-4.6, 48.7), (-1.9, 43.4), (-9.4, 43.0),
    ],
    // Africa
    &[
        (32.4, 29.9), (42.7, 11.7), (51.0, 10.6), (39.2, -4.7), (40.8, -14.7),
        (35.5, -24.1), (28.2, -32.8), (19.6, -34.8), (11.8, -18.1), (13.7, -10.7),
        (9.4, 3.7), (4.3, 6.3), (-8.0, 4.4), (-17.6, 14.7), (-9.6, 30.0),
        (10.0, 37.0), (32.4, 29.9),
    ],
    // Asia
    &[
        (107.0, 77.0), (131.3, 70.8), (178.6, 69.4), (163.5, 59.9), (156.8, 51.0),
        (135.1, 54.7), (127.5, 39.8), (121.6, 40.9), (121.7, 28.2), (105.9, 19.8),
        (109.3, 13.4), (105.2, 8.6), (100.1, 13.4), (104.2, 1.3), (91.4, 22.8),
        (80.3, 15.9), (77.5, 8.0), (72.6, 21.4), (56.4, 26.4), (43.5, 12.6),
        (39.1, 21.3), (33.8, 69.3), (68.5, 68.1), (74.7, 72.8), (107.0, 77.0),
    ],
    // Australia
    &[
        (143.6, -13.8), (153.1, -26.1), (150.0, -37.4), (140.6, -38.0), (131.3, -31.5),
        (115.0, -34.2), (114.1, -21.8), (125.7, -14.2), (132.4, -11.1), (136.5, -11.9),
        (140.2, -17.7), (142.1, -11.0), (143.6, -13.8),
    ],
    // Greenland
    &[
        (-27.1, 83.5), (-12.2, 81.3), (-21.7, 76.6), (-26.4, 70.2), (-39.8, 65.5),
        (-43.4, 60.1), (-51.6, 63.6), (-54.7, 69.6), (-58.6, 75.5), (-73.3, 78.0),
        (-62.7, 81.8), (-27.1, 83.5),
    ],
    // Antarctica coast
    &[
        (-180.0, -84.5), (-158.4, -76.9), (-74.9, -73.9), (-58.6, -64.2), (-60.8, -73.7),
        (-28.5, -80.3), (-6.9, -70.9), (54.5, -65.8), (88.0, -66.2), (135.1, -65.3),
        (171.2, -71.7), (180.0, -84.5),
    ],
];

/// Braille dot bits, indexed [row][col] within a 2×4 cell.
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Empty,
    Coast,
    Terminator,
    Sun,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapCell {
    pub dots: u8,
    pub layer: Layer,
    pub night: bool,
}

impl MapCell {
    fn glyph(&self) -> char {
        if self.dots != 0 {
            char::from_u32(0x2800 + u32::from(self.dots)).unwrap_or(' ')
        } else if self.night {
            '·'
        } else {
            ' '
        }
    }

    fn color(&self) -> (Color, bool) {
        match (self.layer, self.night) {
            (Layer::Home, _) => (Color::Red, true),
            (Layer::Sun, _) => (Color::White, true),
            (Layer::Terminator, _) => (Color::Yellow, true),
            (Layer::Coast, false) => (Color::Green, false),
            (Layer::Coast, true) => (Color::DarkCyan, false),
            (Layer::Empty, true) => (Color::DarkBlue, false),
            (Layer::Empty, false) => (Color::Reset, false),
        }
    }
}

/// One rasterized map frame, `width × height` terminal cells.
pub struct MapFrame {
    width: usize,
    height: usize,
    cells: Vec<MapCell>,
}

impl MapFrame {
    pub fn render(
        snapshot: &OverlaySnapshot,
        width: usize,
        height: usize,
        sun: Option<GeoPoint>,
        home: Option<GeoPoint>,
    ) -> Self {
        let mut frame = Self {
            width,
            height,
            cells: vec![
                MapCell {
                    dots: 0,
                    layer: Layer::Empty,
                    night: false,
                };
                width * height
            ],
        };
        if width == 0 || height == 0 {
            return frame;
        }

        for cy in 0..height {
            for cx in 0..width {
                let center = frame.cell_center(cx, cy);
                frame.cells[cy * width + cx].night = snapshot.is_night(center);
            }
        }

        for coast in COASTLINES {
            for pair in coast.windows(2) {
                frame.line(pair[0], pair[1], Layer::Coast);
            }
        }

        let pole = snapshot.dark_hemisphere().pole_latitude();
        for edge in snapshot.polygon().ring().windows(2) {
            let (a, b) = (edge[0], edge[1]);
            // skip the cap edges, keep the terminator itself
            if a.lat() == pole || b.lat() == pole {
                continue;
            }
            frame.line((a.lon(), a.lat()), (b.lon(), b.lat()), Layer::Terminator);
        }

        if let Some(sun) = sun {
            frame.mark(sun, Layer::Sun);
        }
        if let Some(home) = home {
            frame.mark(home, Layer::Home);
        }

        frame
    }

    /// Small plus sign centred on `point`.
    fn mark(&mut self, point: GeoPoint, layer: Layer) {
        let (dx, dy) = self.project(point.lon(), point.lat());
        for (ox, oy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            self.plot(dx + ox, dy + oy, layer);
        }
    }

    fn dot_size(&self) -> (i64, i64) {
        (self.width as i64 * 2, self.height as i64 * 4)
    }

    /// Dot coordinates of (lon, lat), clamped onto the map.
    fn project(&self, lon: f64, lat: f64) -> (i64, i64) {
        let (w, h) = self.dot_size();
        if w == 0 || h == 0 {
            return (0, 0);
        }
        let x = ((lon + 180.0) / 360.0 * w as f64).floor() as i64;
        let y = ((90.0 - lat) / 180.0 * h as f64).floor() as i64;
        (x.clamp(0, w - 1), y.clamp(0, h - 1))
    }

    fn cell_center(&self, cx: usize, cy: usize) -> GeoPoint {
        let lon = (cx as f64 + 0.5) / self.width as f64 * 360.0 - 180.0;
        let lat = 90.0 - (cy as f64 + 0.5) / self.height as f64 * 180.0;
        GeoPoint::new(lon, lat).unwrap_or(GeoPoint::ORIGIN)
    }

    fn plot(&mut self, dx: i64, dy: i64, layer: Layer) {
        let (w, h) = self.dot_size();
        if dx < 0 || dy < 0 || dx >= w || dy >= h {
            return;
        }
        let (cx, cy) = ((dx / 2) as usize, (dy / 4) as usize);
        let cell = &mut self.cells[cy * self.width + cx];
        cell.dots |= DOT_BITS[(dy % 4) as usize][(dx % 2) as usize];
        cell.layer = cell.layer.max(layer);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), layer: Layer) {
        let (x0, y0) = self.project(from.0, from.1);
        let (x1, y1) = self.project(to.0, to.1);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 as f64 + (x1 - x0) as f64 * t;
            let y = y0 as f64 + (y1 - y0) as f64 * t;
            self.plot(x.round() as i64, y.round() as i64, layer);
        }
    }

    fn paint(&self, term: &mut Terminal, top: i32) {
        for cy in 0..self.height {
            for cx in 0..self.width {
                let cell = &self.cells[cy * self.width + cx];
                let (color, bold) = cell.color();
                term.set(cx as i32, top + cy as i32, cell.glyph(), Some(color), bold);
            }
        }
    }
}

/// Last refresh outcome worth showing in the status line.
fn outcome_note(outcome: TickOutcome) -> Option<String> {
    match outcome {
        TickOutcome::Published | TickOutcome::Skipped => None,
        TickOutcome::Kept(e) if e.is_upstream() => Some(format!("stale overlay, sun unavailable: {e}")),
        TickOutcome::Kept(e) => Some(format!("stale overlay: {e}")),
    }
}

struct Status<'a> {
    sun: Option<GeoPoint>,
    home: Option<GeoPoint>,
    note: Option<&'a str>,
}

fn status_line<S: SolarPosition, C: Clock>(
    scheduler: &RefreshScheduler<S, C>,
    status: &Status<'_>,
) -> String {
    let now = Instant::now();
    let mut parts = vec![format!("UTC {}", now.datetime().format("%H:%M:%S"))];

    match scheduler.snapshot() {
        Some(snap) => {
            parts.push(format!("overlay {}", snap.instant()));
            parts.push(format!("dark pole: {}", snap.dark_hemisphere()));
            if let Some(sun) = status.sun {
                parts.push(format!("sun over {}", sun.format_hud()));
            }
            if let Some(home) = status.home {
                let side = if snap.is_night(home) { "night" } else { "day" };
                parts.push(format!(
                    "home {} {} ({})",
                    home.format_hud(),
                    now.local_solar_time(home.lon()).format("%H:%M"),
                    side
                ));
            }
        }
        None => parts.push("no overlay".to_string()),
    }

    match (scheduler.state(), scheduler.next_due()) {
        (SchedulerState::Armed, Some(due)) => {
            let left = due.saturating_duration_since(std::time::Instant::now());
            parts.push(format!(
                "refresh in {}s/{}s",
                left.as_secs(),
                scheduler.period().as_secs()
            ));
        }
        _ => parts.push("paused".to_string()),
    }

    if let Some(note) = status.note {
        parts.push(note.to_string());
    }

    parts.join("  │  ")
}

fn event_loop<C: Clock>(
    term: &mut Terminal,
    scheduler: &mut RefreshScheduler<SpaSun, C>,
    config: &WatchConfig,
    home: Option<GeoPoint>,
) -> Result<()> {
    let (mut w, mut h) = term.size();
    let mut show_help = false;
    let mut note: Option<String> = None;

    loop {
        if let Some((code, _)) = term.check_key()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => {
                    if let Some(trigger) = scheduler.trigger() {
                        note = outcome_note(scheduler.fire(trigger));
                    }
                }
                KeyCode::Char('p') => match scheduler.state() {
                    SchedulerState::Armed => scheduler.stop(),
                    SchedulerState::Stopped => {
                        note = scheduler.start(Instant::now()).err().map(|e| e.to_string());
                    }
                },
                KeyCode::Char('?') => show_help = !show_help,
                _ => {}
            }
        }

        if let Ok((new_w, new_h)) = size() {
            if new_w != w || new_h != h {
                w = new_w;
                h = new_h;
                term.resize(w, h);
                term.clear_screen()?;
            }
        }

        if let Some(outcome) = scheduler.poll(std::time::Instant::now()) {
            note = outcome_note(outcome);
        }

        let sun = match scheduler.snapshot() {
            Some(snap) => SpaSun.subsolar_point(snap.instant()).ok(),
            None => None,
        };

        term.clear();
        let map_h = (h as usize).saturating_sub(1);
        if let Some(snap) = scheduler.snapshot() {
            MapFrame::render(&snap, w as usize, map_h, sun, home).paint(term, 0);
        }
        let status = Status {
            sun,
            home,
            note: note.as_deref(),
        };
        term.set_str(0, map_h as i32, &status_line(scheduler, &status), Some(Color::DarkGrey), false);

        if show_help {
            render_help_overlay(term, w, h, HELP);
        }

        term.present()?;
        term.sleep(config.time_step);
    }

    Ok(())
}

pub fn run(config: WatchConfig) -> Result<()> {
    let home = config.home.or_else(|| {
        if config.locate {
            locate::current_location().map(|found| found.point)
        } else {
            None
        }
    });

    let mut scheduler: RefreshScheduler<SpaSun, SystemClock> =
        RefreshScheduler::new(SpaSun, &config.engine)?;
    let mut term = Terminal::new(true).context("cannot open terminal")?;

    scheduler.start(Instant::now())?;
    let result = event_loop(&mut term, &mut scheduler, &config, home);
    scheduler.stop();

    result.context("terminal error")
}
