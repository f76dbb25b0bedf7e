// Scatter: glyph particles that drift outward from the silhouette into the
// margin around the grid. The particle set is the only state that survives
// from one frame to the next, so it is passed to the compositor explicitly.

use crate::entropy::Entropy;
use crate::pattern::Pattern;
use crate::settings::Settings;
use crate::shape::ShapeMask;
use crate::types::GridSize;

/// Upper bound on live particles.
pub const MAX_PARTICLES: usize = 600;
/// Margin (cells) at scatterDistance = 100.
pub const MAX_MARGIN: usize = 20;

const MAX_SPAWN_PER_FRAME: f32 = 12.0;
const SPAWN_ATTEMPTS: usize = 8;
const JITTER: f32 = 0.35;

/// One scatter glyph. Position is in grid space; the margin extends it on
/// every side.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Frames remaining.
    pub life: u32,
    pub ch: char,
}

/// Scatter margin in cells for these settings (0 when scatter is off).
pub fn scatter_margin(settings: &Settings) -> usize {
    if !settings.scatter {
        return 0;
    }
    let d = (settings.scatter_distance / 100.0).clamp(0.0, 1.0);
    (d * MAX_MARGIN as f32).ceil() as usize
}

#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self { particles: Vec::with_capacity(MAX_PARTICLES) }
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance one frame: move and age every particle, drop the dead and the
    /// ones that left the extended canvas, then spawn this frame's budget.
    pub fn step(
        &mut self,
        settings: &Settings,
        grid: GridSize,
        mask: &ShapeMask,
        pattern: &Pattern,
        entropy: &mut dyn Entropy,
    ) {
        if !settings.scatter {
            self.particles.clear();
            return;
        }

        let m = scatter_margin(settings) as f32;
        let (w, h) = (grid.width as f32, grid.height as f32);
        self.particles.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.life = p.life.saturating_sub(1);
            p.life > 0 && p.x >= -m && p.x < w + m && p.y >= -m && p.y < h + m
        });

        self.spawn(settings, grid, mask, pattern, entropy);
    }

    fn spawn(
        &mut self,
        settings: &Settings,
        grid: GridSize,
        mask: &ShapeMask,
        pattern: &Pattern,
        entropy: &mut dyn Entropy,
    ) {
        let glyphs = pattern.visible();
        if glyphs.is_empty() {
            return;
        }
        let amount = settings.scatter_amount / 100.0;
        let distance = settings.scatter_distance / 100.0;

        let want = amount * MAX_SPAWN_PER_FRAME;
        let mut budget = want.floor() as usize;
        if entropy.chance(want.fract()) {
            budget += 1;
        }

        let (w, h) = (grid.width as f32, grid.height as f32);
        let (cx, cy) = (w / 2.0, h / 2.0);

        for _ in 0..budget {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let Some((x, y)) = (0..SPAWN_ATTEMPTS).find_map(|_| {
                let x = entropy.range(0.0, w);
                let y = entropy.range(0.0, h);
                (!mask.is_inside(x.floor() as i32, y.floor() as i32)).then_some((x, y))
            }) else {
                continue;
            };

            let (dx, dy) = (x - cx, y - cy);
            let len = (dx * dx + dy * dy).sqrt();
            let (mut ux, mut uy) = if len > 1e-3 {
                (dx / len, dy / len)
            } else {
                let a = entropy.range(0.0, std::f32::consts::TAU);
                (a.cos(), a.sin())
            };
            ux += entropy.range(-JITTER, JITTER);
            uy += entropy.range(-JITTER, JITTER);
            let norm = (ux * ux + uy * uy).sqrt().max(1e-3);

            let speed = (0.15 + 0.5 * distance + 0.25 * amount) * entropy.range(0.6, 1.2);
            let life = (entropy.range(8.0, 24.0) * (0.5 + distance + 0.5 * amount)).round().max(1.0);

            self.particles.push(Particle {
                x,
                y,
                vx: ux / norm * speed,
                vy: uy / norm * speed,
                life: life as u32,
                ch: glyphs[entropy.index(glyphs.len())],
            });
        }
    }

    /// Paint live particles onto the extended canvas (`canvas_w` columns,
    /// grid plus `margin` on every side). Particles inside the silhouette
    /// are hidden this frame.
    pub fn overlay(&self, canvas_w: usize, canvas_h: usize, margin: usize, mask: &ShapeMask, out: &mut [Option<char>]) {
        out.fill(None);
        let m = margin as i32;
        for p in &self.particles {
            let (gx, gy) = (p.x.round() as i32, p.y.round() as i32);
            if mask.is_inside(gx, gy) {
                continue;
            }
            let (ci, cj) = (gx + m, gy + m);
            if ci < 0 || cj < 0 || ci as usize >= canvas_w || cj as usize >= canvas_h {
                continue;
            }
            out[cj as usize * canvas_w + ci as usize] = Some(p.ch);
        }
    }
}
