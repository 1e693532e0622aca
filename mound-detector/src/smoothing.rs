use pcd_core::raster::ElevationRaster;

use crate::error::MoundError;

/// How samples beyond the raster edge are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Edge sample repeated: `a a | a b c d | d d`.
    #[default]
    Nearest,
    /// Mirrored including the edge sample: `b a | a b c d | d c`.
    Reflect,
}

impl BorderMode {
    /// Maps a possibly out-of-range index into `0..len`. `len` must be non-zero.
    pub fn map_index(self, i: isize, len: usize) -> usize {
        let n = len as isize;
        match self {
            Self::Nearest => i.clamp(0, n - 1) as usize,
            Self::Reflect => {
                let period = 2 * n;
                let r = i.rem_euclid(period);
                if r < n {
                    r as usize
                } else {
                    (period - 1 - r) as usize
                }
            }
        }
    }
}

/// Normalized 1D Gaussian, radius `⌊4σ + 0.5⌋`.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5).floor() as isize;
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-((x * x) as f64) / two_sigma2).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur.
///
/// Output keeps the shape and transform of the input. NaN cells stay NaN and
/// are left out of their neighbours' sums, with the remaining weights
/// renormalized, so the result never leaves the input's value range.
#[derive(Debug, Clone)]
pub struct Smoother {
    sigma: f64,
    border: BorderMode,
    kernel: Vec<f64>,
}

impl Smoother {
    pub fn new(sigma: f64) -> Result<Self, MoundError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(MoundError::InvalidConfig(format!(
                "sigma must be finite and positive, got {sigma}"
            )));
        }
        Ok(Self {
            sigma,
            border: BorderMode::default(),
            kernel: gaussian_kernel(sigma),
        })
    }

    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn border(&self) -> BorderMode {
        self.border
    }

    pub fn radius(&self) -> usize {
        self.kernel.len() / 2
    }

    pub fn smooth(&self, raster: &ElevationRaster) -> Result<ElevationRaster, MoundError> {
        let (nrow, ncol) = (raster.nrow(), raster.ncol());
        if raster.is_empty() {
            return Ok(raster.clone());
        }

        let src = raster.data();
        let mut rows_pass = vec![f64::NAN; src.len()];
        for r in 0..nrow {
            let line = &src[r * ncol..(r + 1) * ncol];
            self.convolve_line(|c| line[c], ncol, &mut rows_pass[r * ncol..(r + 1) * ncol]);
        }

        let mut out = vec![f64::NAN; src.len()];
        let mut column = vec![f64::NAN; nrow];
        for c in 0..ncol {
            self.convolve_line(|r| rows_pass[r * ncol + c], nrow, &mut column);
            for (r, v) in column.iter().enumerate() {
                out[r * ncol + c] = *v;
            }
        }

        // cells that were NaN stay NaN even if their neighbourhood had data
        for (o, s) in out.iter_mut().zip(src) {
            if s.is_nan() {
                *o = f64::NAN;
            }
        }

        Ok(raster.with_values(out)?)
    }

    fn convolve_line<F: Fn(usize) -> f64>(&self, sample: F, len: usize, out: &mut [f64]) {
        let radius = self.radius() as isize;
        for (i, o) in out.iter_mut().enumerate().take(len) {
            let mut acc = 0.0;
            let mut weight = 0.0;
            for (k, &w) in self.kernel.iter().enumerate() {
                let idx = self.border.map_index(i as isize + k as isize - radius, len);
                let v = sample(idx);
                if v.is_finite() {
                    acc += w * v;
                    weight += w;
                }
            }
            *o = if weight > 0.0 { acc / weight } else { f64::NAN };
        }
    }
}
