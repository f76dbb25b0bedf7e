// Randomness for glitch, density and scatter: one injectable interface so tests
// can script every draw.

/// Source of uniform draws and coherent noise for the compositor.
pub trait Entropy {
    /// Uniform in [0,1).
    fn uniform(&mut self) -> f32;

    /// Smooth 3-D noise in [0,1). Equal inputs give equal outputs within a run.
    fn noise(&self, x: f32, y: f32, z: f32) -> f32;

    /// Uniform in [min,max).
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.uniform()
    }

    /// Uniform integer in [0,n). Returns 0 when n == 0.
    fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.uniform() * n as f32) as usize).min(n - 1)
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.uniform() < p
    }
}

// ----------------------------- xorshift (no external crate) -----------------------------

/// Deterministic xorshift32 RNG for lightweight randomness.
#[derive(Clone, Debug)]
pub struct Rng32 {
    state: u32,
}

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        // Xorshift, fast and good enough for visual noise
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / ((1u32 << 24) as f32)
    }
}

// ----------------------------- value noise ---------------------------------------------

const PERM_SIZE: usize = 256;
const OCTAVES: usize = 4;
const FALLOFF: f32 = 0.5;

/// Lattice value noise with a few octaves, normalized to [0,1).
#[derive(Clone, Debug)]
pub struct ValueNoise {
    perm: [u8; PERM_SIZE * 2],
    values: [f32; PERM_SIZE],
}

impl ValueNoise {
    pub fn new(seed: u32) -> Self {
        let mut rng = Rng32::from_seed(seed ^ 0x9E37_79B9);
        let mut values = [0.0f32; PERM_SIZE];
        for v in &mut values {
            *v = rng.next_f32();
        }

        // Fisher-Yates over 0..256, then doubled so lookups never wrap.
        let mut base = [0u8; PERM_SIZE];
        for (i, p) in base.iter_mut().enumerate() {
            *p = i as u8;
        }
        for i in (1..PERM_SIZE).rev() {
            let j = (rng.next_u32() as usize) % (i + 1);
            base.swap(i, j);
        }
        let mut perm = [0u8; PERM_SIZE * 2];
        for i in 0..PERM_SIZE * 2 {
            perm[i] = base[i % PERM_SIZE];
        }

        Self { perm, values }
    }

    #[inline]
    fn lattice(&self, x: i32, y: i32, z: i32) -> f32 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        let zi = (z & 255) as usize;
        let h = self.perm[self.perm[self.perm[xi] as usize + yi] as usize + zi];
        self.values[h as usize]
    }

    fn octave(&self, x: f32, y: f32, z: f32) -> f32 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return 0.5;
        }
        let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
        let (tx, ty, tz) = (smooth(x - x0), smooth(y - y0), smooth(z - z0));
        // The lattice repeats every 256 cells; wrap before the integer cast.
        let wrap = |v: f32| v.rem_euclid(PERM_SIZE as f32) as i32;
        let (x0, y0, z0) = (wrap(x0), wrap(y0), wrap(z0));

        let c000 = self.lattice(x0, y0, z0);
        let c100 = self.lattice(x0 + 1, y0, z0);
        let c010 = self.lattice(x0, y0 + 1, z0);
        let c110 = self.lattice(x0 + 1, y0 + 1, z0);
        let c001 = self.lattice(x0, y0, z0 + 1);
        let c101 = self.lattice(x0 + 1, y0, z0 + 1);
        let c011 = self.lattice(x0, y0 + 1, z0 + 1);
        let c111 = self.lattice(x0 + 1, y0 + 1, z0 + 1);

        let x00 = lerp(c000, c100, tx);
        let x10 = lerp(c010, c110, tx);
        let x01 = lerp(c001, c101, tx);
        let x11 = lerp(c011, c111, tx);
        lerp(lerp(x00, x10, ty), lerp(x01, x11, ty), tz)
    }

    /// Sum of octaves, normalized back into [0,1).
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return 0.5;
        }
        let mut amp = 0.5;
        let mut freq = 1.0;
        let mut total = 0.0;
        let mut norm = 0.0;
        for _ in 0..OCTAVES {
            total += self.octave(x * freq, y * freq, z * freq) * amp;
            norm += amp;
            amp *= FALLOFF;
            freq *= 2.0;
        }
        (total / norm).clamp(0.0, 0.999_999)
    }
}

#[inline]
fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ----------------------------- default generator ----------------------------------------

/// Default `Entropy`: xorshift uniforms plus seeded value noise.
#[derive(Clone, Debug)]
pub struct XorShiftEntropy {
    rng: Rng32,
    noise: ValueNoise,
}

impl XorShiftEntropy {
    pub fn from_seed(seed: u32) -> Self {
        Self { rng: Rng32::from_seed(seed), noise: ValueNoise::new(seed) }
    }
}

impl Default for XorShiftEntropy {
    fn default() -> Self {
        Self::from_seed(0xC0FFEE)
    }
}

impl Entropy for XorShiftEntropy {
    #[inline]
    fn uniform(&mut self) -> f32 {
        self.rng.next_f32()
    }

    #[inline]
    fn noise(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.sample(x, y, z)
    }
}

/// Replays a fixed list of uniform draws (cycling) and a constant noise value.
#[derive(Clone, Debug)]
pub struct ScriptedEntropy {
    draws: Vec<f32>,
    cursor: usize,
    noise: f32,
}

impl ScriptedEntropy {
    pub fn new(draws: Vec<f32>, noise: f32) -> Self {
        let draws = if draws.is_empty() { vec![0.0] } else { draws };
        Self { draws, cursor: 0, noise }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value], value)
    }

    /// Number of uniform draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Entropy for ScriptedEntropy {
    fn uniform(&mut self) -> f32 {
        let v = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        v.clamp(0.0, 0.999_999)
    }

    fn noise(&self, _x: f32, _y: f32, _z: f32) -> f32 {
        self.noise
    }
}
