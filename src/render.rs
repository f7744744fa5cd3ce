use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::io::{self, Write};

use crate::platform::Screen;
use crate::sim::consts::{FIELD_HEIGHT, FIELD_WIDTH, FLOOR_Y, OBSTACLE_WIDTH};
use crate::sim::{Mode, Obstacle, ObstacleKind, Particle, Player, Snapshot};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    fn to_crossterm(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const SKY_TOP: Rgb = Rgb(135, 206, 235);
const SKY_BOT: Rgb = Rgb(240, 232, 216);
const MOUNTAIN: Rgb = Rgb(61, 90, 128);
const MOUNTAIN_DARK: Rgb = Rgb(41, 61, 90);
const BAMBOO: Rgb = Rgb(106, 168, 79);
const BAMBOO_DARK: Rgb = Rgb(74, 125, 58);
const BAMBOO_LIGHT: Rgb = Rgb(139, 195, 74);
const TORII: Rgb = Rgb(226, 59, 43);
const TORII_BEAM: Rgb = Rgb(198, 40, 40);
const TORII_DARK: Rgb = Rgb(139, 0, 0);
const STEEL: Rgb = Rgb(44, 44, 44);
const STEEL_EDGE: Rgb = Rgb(102, 102, 102);
const SPARK: Rgb = Rgb(106, 168, 79);
const GOLD: Rgb = Rgb(255, 215, 0);
const PAPER: Rgb = Rgb(243, 233, 214);
const NIGHT: Rgb = Rgb(26, 38, 69);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const CLOUD: Rgb = Rgb(255, 255, 255);
const SAKURA: Rgb = Rgb(255, 183, 197);

const PETAL_COUNT: usize = 15;

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    /// Mix `c` over the existing pixel with `alpha` in 0..=1.
    fn blend(&mut self, x: i32, y: i32, c: Rgb, alpha: f64) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            let under = self.get(x as usize, y as usize);
            let t = (alpha.clamp(0.0, 1.0) * 256.0) as u16;
            self.set(x, y, Rgb::lerp(under, c, t));
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn flush_to(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if bg != Some(bot) {
                    queue!(out, style::SetBackgroundColor(bot.to_crossterm()))?;
                    bg = Some(bot);
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                    continue;
                }
                if fg != Some(top) {
                    queue!(out, style::SetForegroundColor(top.to_crossterm()))?;
                    fg = Some(top);
                }
                queue!(out, style::Print('\u{2580}'))?; // ▀
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

/// Draw `n` centred on `cx`, each font pixel `scale` buffer pixels wide.
fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb, scale: i32) {
    let s = n.to_string();
    let advance = 4 * scale;
    let start_x = cx - (s.len() as i32 * advance - scale) / 2;
    for (i, ch) in s.bytes().enumerate() {
        let glyph = &DIGITS[(ch - b'0') as usize];
        let gx = start_x + i as i32 * advance;
        for row in 0..5 {
            for col in 0..3 {
                if glyph[row * 3 + col] == 1 {
                    let px = gx + col as i32 * scale;
                    let py = y + row as i32 * scale;
                    buf.fill_rect(px + 1, py + 1, scale, scale, SHADOW);
                    buf.fill_rect(px, py, scale, scale, fg);
                }
            }
        }
    }
}

// ── Sakura petals ───────────────────────────────────────────────────────────

/// Background petal, in field units. Uses the screen's own generator, not the
/// world's.
#[derive(Debug, Clone, PartialEq)]
struct Petal {
    x: f64,
    y: f64,
    size: f64,
    speed: f64,
    drift: f64,
}

impl Petal {
    fn scatter(rng: &mut Pcg32) -> Self {
        Self {
            x: rng.random::<f64>() * FIELD_WIDTH,
            y: rng.random::<f64>() * FIELD_HEIGHT,
            size: rng.random::<f64>() * 4.0 + 2.0,
            speed: rng.random::<f64>() * 0.5 + 0.3,
            drift: rng.random::<f64>() * 0.5 - 0.25,
        }
    }

    fn fall(&mut self, rng: &mut Pcg32) {
        self.y += self.speed;
        self.x += self.drift;
        if self.y > FIELD_HEIGHT {
            self.y = -10.0;
            self.x = rng.random::<f64>() * FIELD_WIDTH;
        }
        if self.x < -10.0 {
            self.x = FIELD_WIDTH + 10.0;
        } else if self.x > FIELD_WIDTH + 10.0 {
            self.x = -10.0;
        }
    }
}

// ── Terminal screen ─────────────────────────────────────────────────────────

/// Draws the 480x640 playfield stretched over the whole terminal.
pub struct TerminalScreen<W: Write> {
    out: W,
    buf: PixelBuf,
    score: u32,
    high_score: u32,
    /// Parallax scroll position of the mountains, in field units.
    scenery: f64,
    clouds: f64,
    petals: Vec<Petal>,
    rng: Pcg32,
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        let mut rng = Pcg32::seed_from_u64(0x5a4b);
        let petals = (0..PETAL_COUNT).map(|_| Petal::scatter(&mut rng)).collect();
        Self {
            out,
            buf: PixelBuf::new(cols as usize, rows as usize * 2),
            score: 0,
            high_score: 0,
            scenery: 0.0,
            clouds: 0.0,
            petals,
            rng,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buf.resize(cols as usize, rows as usize * 2);
    }

    pub fn buffer(&self) -> &PixelBuf {
        &self.buf
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.score, self.high_score)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Compose a frame into the pixel buffer without writing it out.
    pub fn compose(&mut self, snap: &Snapshot<'_>) {
        self.scenery = (self.scenery + 0.2) % FIELD_WIDTH;
        self.clouds += 0.4;
        if self.clouds > FIELD_WIDTH + 100.0 {
            self.clouds = -100.0;
        }
        // Petals hang still outside a run
        if snap.mode == Mode::Playing {
            for petal in &mut self.petals {
                petal.fall(&mut self.rng);
            }
        }

        let view = View::new(&self.buf);
        let buf = &mut self.buf;

        view.sky(buf);
        view.mountains(buf, self.scenery);
        view.mountains(buf, self.scenery - FIELD_WIDTH);
        for (dx, y) in [(0.0, 80.0), (250.0, 120.0), (-200.0, 160.0)] {
            view.cloud(buf, self.clouds + dx, y);
        }
        for petal in &self.petals {
            view.disc(buf, petal.x, petal.y, petal.size, SAKURA);
        }
        view.ground(buf);
        for o in snap.obstacles {
            view.obstacle(buf, o);
        }
        for p in snap.particles {
            view.particle(buf, p);
        }
        view.shuriken(buf, snap.player, snap.frame);

        let digit = view.digit_scale();
        if snap.mode != Mode::Start {
            draw_number(buf, view.pw / 2, digit * 2, self.score, WHITE, digit);
        }
        draw_number(buf, view.pw - 8 * digit, digit * 2, self.high_score, GOLD, digit.max(2) - 1);

        match snap.mode {
            Mode::Start => view.title(buf),
            Mode::GameOver if snap.summary_visible => {
                view.summary(buf, snap.score, snap.high_score)
            }
            _ => {}
        }
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        self.compose(snapshot);
        self.buf.flush_to(&mut self.out)
    }

    fn show_scores(&mut self, score: u32, high_score: u32) {
        self.score = score;
        self.high_score = high_score;
    }
}

// ── Field-to-buffer drawing ─────────────────────────────────────────────────

/// Maps playfield coordinates onto the current buffer size.
struct View {
    pw: i32,
    ph: i32,
    sx: f64,
    sy: f64,
}

impl View {
    fn new(buf: &PixelBuf) -> Self {
        let pw = buf.width() as i32;
        let ph = buf.height() as i32;
        Self {
            pw,
            ph,
            sx: pw as f64 / FIELD_WIDTH,
            sy: ph as f64 / FIELD_HEIGHT,
        }
    }

    fn x(&self, fx: f64) -> i32 {
        (fx * self.sx).floor() as i32
    }

    fn y(&self, fy: f64) -> i32 {
        (fy * self.sy).floor() as i32
    }

    /// Fill a rectangle given in field units.
    fn rect(&self, buf: &mut PixelBuf, fx: f64, fy: f64, fw: f64, fh: f64, c: Rgb) {
        if fw <= 0.0 || fh <= 0.0 {
            return;
        }
        let x0 = self.x(fx);
        let y0 = self.y(fy);
        let w = (self.x(fx + fw) - x0).max(1);
        let h = (self.y(fy + fh) - y0).max(1);
        buf.fill_rect(x0, y0, w, h, c);
    }

    fn digit_scale(&self) -> i32 {
        (self.ph / 48).max(1)
    }

    fn sky(&self, buf: &mut PixelBuf) {
        let floor = self.y(FLOOR_Y).max(1);
        for y in 0..floor {
            let t = (y as u32 * 256 / floor as u32) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in 0..self.pw {
                buf.set(x, y, c);
            }
        }
    }

    /// Two overlapping triangular peaks starting at `offset`.
    fn mountains(&self, buf: &mut PixelBuf, offset: f64) {
        let base = FIELD_HEIGHT - 200.0;
        for x in 0..self.pw {
            let fx = x as f64 / self.sx;
            for (left, peak, c) in [(0.0, 200.0, MOUNTAIN), (200.0, 150.0, MOUNTAIN_DARK)] {
                let half = 150.0;
                let d = (fx - (offset + left + half)).abs();
                if d >= half {
                    continue;
                }
                let top = base - peak * (1.0 - d / half);
                for y in self.y(top)..self.y(base) {
                    buf.set(x, y, c);
                }
            }
        }
    }

    /// Three overlapping puffs at 60% opacity, blended once per pixel.
    fn cloud(&self, buf: &mut PixelBuf, fx: f64, fy: f64) {
        let puffs = [(fx, 20.0), (fx + 25.0, 25.0), (fx + 50.0, 20.0)];
        for py in self.y(fy - 25.0)..=self.y(fy + 25.0) {
            for px in self.x(fx - 20.0)..=self.x(fx + 70.0) {
                let x = (px as f64 + 0.5) / self.sx;
                let y = (py as f64 + 0.5) / self.sy;
                if puffs.iter().any(|&(cx, r)| (x - cx).hypot(y - fy) <= r) {
                    buf.blend(px, py, CLOUD, 0.6);
                }
            }
        }
    }

    fn disc(&self, buf: &mut PixelBuf, fx: f64, fy: f64, r: f64, c: Rgb) {
        for py in self.y(fy - r)..=self.y(fy + r) {
            for px in self.x(fx - r)..=self.x(fx + r) {
                let x = (px as f64 + 0.5) / self.sx;
                let y = (py as f64 + 0.5) / self.sy;
                if (x - fx).hypot(y - fy) <= r {
                    buf.set(px, py, c);
                }
            }
        }
        // Keep tiny petals visible on small terminals
        buf.set(self.x(fx), self.y(fy), c);
    }

    fn ground(&self, buf: &mut PixelBuf) {
        self.rect(buf, 0.0, FLOOR_Y, FIELD_WIDTH, FIELD_HEIGHT - FLOOR_Y, BAMBOO);
        let mut x = 0.0;
        while x < FIELD_WIDTH {
            self.rect(buf, x, FLOOR_Y, 3.0, 60.0, BAMBOO_DARK);
            x += 30.0;
        }
        let mut x = 0.0;
        while x < FIELD_WIDTH {
            self.rect(buf, x, FLOOR_Y + 30.0, 2.0, 30.0, BAMBOO_DARK);
            x += 15.0;
        }
    }

    fn obstacle(&self, buf: &mut PixelBuf, o: &Obstacle) {
        match o.kind {
            ObstacleKind::Bamboo => {
                self.pole(buf, o.x, 0.0, o.top_height);
                self.pole(buf, o.x, o.bottom_y, FLOOR_Y - o.bottom_y);
            }
            ObstacleKind::Torii => {
                self.rect(buf, o.x + 5.0, 0.0, 15.0, o.top_height, TORII);
                self.rect(buf, o.x + 40.0, 0.0, 15.0, o.top_height, TORII);
                self.rect(buf, o.x, o.top_height - 20.0, OBSTACLE_WIDTH, 20.0, TORII_BEAM);
                self.rect(buf, o.x, o.top_height - 30.0, OBSTACLE_WIDTH, 8.0, TORII_DARK);

                self.rect(buf, o.x, o.bottom_y, OBSTACLE_WIDTH, 20.0, TORII_BEAM);
                let legs = FLOOR_Y - o.bottom_y - 20.0;
                self.rect(buf, o.x + 5.0, o.bottom_y + 20.0, 15.0, legs, TORII);
                self.rect(buf, o.x + 40.0, o.bottom_y + 20.0, 15.0, legs, TORII);
            }
        }
    }

    fn pole(&self, buf: &mut PixelBuf, x: f64, y: f64, h: f64) {
        self.rect(buf, x, y, OBSTACLE_WIDTH, h, BAMBOO_DARK);
        self.rect(buf, x + 8.0, y + 4.0, OBSTACLE_WIDTH - 16.0, h - 8.0, BAMBOO_LIGHT);
        let mut seg = y;
        while seg < y + h {
            self.rect(buf, x, seg, OBSTACLE_WIDTH, 3.0, BAMBOO_DARK);
            seg += 40.0;
        }
    }

    fn particle(&self, buf: &mut PixelBuf, p: &Particle) {
        let x0 = self.x(p.x);
        let y0 = self.y(p.y);
        let w = self.x(p.x + p.size) - x0;
        let h = self.y(p.y + p.size) - y0;
        for dy in 0..h.max(1) {
            for dx in 0..w.max(1) {
                buf.blend(x0 + dx, y0 + dy, SPARK, p.fade());
            }
        }
    }

    /// Four-pointed star spun by the frame counter, tilted by the player's
    /// rotation.
    fn shuriken(&self, buf: &mut PixelBuf, player: &Player, frame: u64) {
        let (cx, cy) = player.center();
        let spin = FRAC_PI_2 * ((frame / 5) % 4) as f64;
        let angle = player.rotation + spin;
        let tip = 16.0;
        let inner = 6.0;

        let x0 = self.x(cx - tip);
        let x1 = self.x(cx + tip);
        let y0 = self.y(cy - tip);
        let y1 = self.y(cy + tip);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = (px as f64 + 0.5) / self.sx - cx;
                let dy = (py as f64 + 0.5) / self.sy - cy;
                let r = dx.hypot(dy);
                if r <= 4.0 {
                    buf.set(px, py, TORII);
                    continue;
                }
                // Angular distance to the nearest tip, 0 at a tip, 1 midway
                let theta = (dy.atan2(dx) - angle).rem_euclid(FRAC_PI_2);
                let off = (theta - FRAC_PI_4).abs() / FRAC_PI_4;
                let edge = inner + (tip - inner) * (off * off);
                if r <= edge - 1.5 {
                    buf.set(px, py, STEEL);
                } else if r <= edge {
                    buf.set(px, py, STEEL_EDGE);
                }
            }
        }
    }

    fn title(&self, buf: &mut PixelBuf) {
        let cx = self.pw / 2;
        let cy = self.ph / 4;
        let text = "SHURIKEN";
        let char_w = (self.pw / 14).max(3);
        let char_h = (self.ph / 12).max(4);
        let sx = cx - text.len() as i32 * char_w / 2;
        for i in 0..text.len() as i32 {
            let bx = sx + i * char_w;
            buf.fill_rect(bx, cy, char_w - 1, char_h, NIGHT);
            buf.fill_rect(bx, cy, char_w - 1, 1, TORII);
        }

        // "press space" hint as a row of blocks
        let sub_y = cy + char_h + 4;
        let msg = "SPACE TO THROW";
        let msg_x = cx - msg.len() as i32 * 2;
        for (i, ch) in msg.chars().enumerate() {
            if ch != ' ' {
                buf.fill_rect(msg_x + i as i32 * 4, sub_y, 3, 3, WHITE);
            }
        }
    }

    fn summary(&self, buf: &mut PixelBuf, score: u32, high_score: u32) {
        for y in 0..self.ph {
            for x in 0..self.pw {
                let c = buf.get(x as usize, y as usize);
                buf.set(x, y, Rgb(c.0 / 2, c.1 / 2, c.2 / 2));
            }
        }

        let cx = self.pw / 2;
        let cy = self.ph / 2;
        let digit = self.digit_scale();
        let panel_w = (self.pw / 2).max(30);
        let panel_h = 16 * digit + 8;
        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;
        buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        buf.fill_rect(px, py, panel_w, panel_h, NIGHT);
        buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PAPER);

        draw_number(buf, cx, py + 2 * digit, score, NIGHT, digit);
        draw_number(buf, cx, py + 9 * digit, high_score, GOLD, digit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::World;

    #[test]
    fn test_render_writes_frame() {
        let mut screen = TerminalScreen::new(Vec::new(), 40, 20);
        let world = World::new(3, 0);
        screen.render(&world.snapshot()).unwrap();
        let out = String::from_utf8_lossy(screen.writer());
        // 20 rows of cells joined by 19 line breaks
        assert_eq!(out.matches("\r\n").count(), 19);
    }

    #[test]
    fn test_player_is_drawn() {
        let mut screen = TerminalScreen::new(Vec::new(), 48, 32);
        let world = World::new(3, 0);
        screen.compose(&world.snapshot());

        let view = View::new(screen.buffer());
        let (cx, cy) = world.player.center();
        let c = screen.buffer().get(view.x(cx) as usize, view.y(cy) as usize);
        assert_eq!(c, TORII);
    }

    #[test]
    fn test_scores_pushed() {
        let mut screen = TerminalScreen::new(Vec::new(), 10, 10);
        screen.show_scores(4, 12);
        assert_eq!(screen.scores(), (4, 12));
    }

    #[test]
    fn test_petals_drift_only_while_playing() {
        let mut screen = TerminalScreen::new(Vec::new(), 48, 32);
        let mut world = World::new(3, 0);
        let scattered = screen.petals.clone();
        assert_eq!(scattered.len(), PETAL_COUNT);

        screen.compose(&world.snapshot());
        assert_eq!(screen.petals, scattered);

        world.flap();
        screen.compose(&world.snapshot());
        assert!(screen.petals.iter().zip(&scattered).all(|(p, q)| p.y > q.y || p.y == -10.0));
        assert!(screen.clouds > 0.0);
    }

    #[test]
    fn test_blend_ends() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(0, 0, Rgb(0, 0, 0));
        buf.blend(0, 0, WHITE, 0.0);
        assert_eq!(buf.get(0, 0), Rgb(0, 0, 0));
        buf.blend(0, 0, WHITE, 1.0);
        assert_eq!(buf.get(0, 0), WHITE);
    }
}
