//! Fixed-length single-cycle sample tables with fractional lookup.

use core::fmt;
use core::ops::Index;
use libm::floorf;

/// Number of samples in one table period.
pub const TABLE_SIZE: usize = 872;

/// One period of a waveform, exactly [`TABLE_SIZE`] samples long.
///
/// Tables are built on the control thread and shared with the renderer
/// behind an `Arc`; the renderer only ever reads them.
#[derive(Clone, PartialEq)]
pub struct Wavetable {
    samples: Box<[f32; TABLE_SIZE]>,
}

impl Wavetable {
    /// Create a silent table.
    pub fn new() -> Self {
        Self {
            samples: Box::new([0.0; TABLE_SIZE]),
        }
    }

    /// Build a table by evaluating `f` at every index.
    pub fn from_fn(f: impl FnMut(usize) -> f32) -> Self {
        let mut table = Self::new();
        table.fill_with(f);
        table
    }

    /// Overwrite every sample with `f(index)`.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize) -> f32) {
        for (i, sample) in self.samples.iter_mut().enumerate() {
            *sample = f(i);
        }
    }

    /// Table length, always [`TABLE_SIZE`].
    #[inline]
    pub const fn len(&self) -> usize {
        TABLE_SIZE
    }

    /// Tables are never empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Raw samples.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.samples[..]
    }

    /// Linearly interpolated read at a fractional table position.
    ///
    /// The integer part wraps modulo [`TABLE_SIZE`], so any finite index
    /// (including negative ones) lands inside the period. Grid positions
    /// return the stored sample exactly.
    #[inline]
    pub fn sample_at(&self, index: f32) -> f32 {
        sample_at(&self.samples[..], index)
    }
}

impl Default for Wavetable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Wavetable {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.samples[index]
    }
}

impl fmt::Debug for Wavetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = self
            .samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        f.debug_struct("Wavetable")
            .field("len", &TABLE_SIZE)
            .field("min", &min)
            .field("max", &max)
            .finish()
    }
}

/// Linear interpolation into an arbitrary single-cycle table.
///
/// Returns 0.0 for an empty table or a non-finite index.
#[inline]
pub fn sample_at(table: &[f32], index: f32) -> f32 {
    let len = table.len();
    if len == 0 || !index.is_finite() {
        return 0.0;
    }

    let whole = floorf(index);
    let frac = index - whole;
    let i = (whole as i64).rem_euclid(len as i64) as usize;
    let next = if i + 1 == len { 0 } else { i + 1 };

    let a = table[i];
    let b = table[next];
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Wavetable {
        Wavetable::from_fn(|i| i as f32 / TABLE_SIZE as f32)
    }

    #[test]
    fn test_new_is_silent() {
        let table = Wavetable::new();
        assert_eq!(table.len(), TABLE_SIZE);
        assert!(table.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_grid_points_are_exact() {
        let table = ramp();
        for i in 0..TABLE_SIZE {
            assert_eq!(
                table.sample_at(i as f32),
                table[i],
                "grid read at {} should be exact",
                i
            );
        }
    }

    #[test]
    fn test_midpoint_interpolation() {
        let table = Wavetable::from_fn(|i| if i == 10 { 1.0 } else { 0.0 });
        assert!((table.sample_at(9.5) - 0.5).abs() < 1e-6);
        assert!((table.sample_at(10.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_last_index_interpolates_towards_first() {
        let table = Wavetable::from_fn(|i| if i == 0 { 1.0 } else { 0.0 });
        let value = table.sample_at((TABLE_SIZE - 1) as f32 + 0.5);
        assert!((value - 0.5).abs() < 1e-6, "wrap blend was {}", value);
    }

    #[test]
    fn test_index_wraps_modulo_table_size() {
        let table = ramp();
        for &x in &[0.0f32, 3.5, 100.25, 871.75] {
            let a = table.sample_at(x);
            assert_eq!(a, table.sample_at(x + TABLE_SIZE as f32));
            assert_eq!(a, table.sample_at(x + 2.0 * TABLE_SIZE as f32));
            assert_eq!(a, table.sample_at(x - TABLE_SIZE as f32));
        }
    }

    #[test]
    fn test_non_finite_index_reads_zero() {
        let table = Wavetable::from_fn(|_| 1.0);
        assert_eq!(table.sample_at(f32::NAN), 0.0);
        assert_eq!(table.sample_at(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_free_function_on_short_slice() {
        let table = [0.0f32, 1.0, 0.0, -1.0];
        assert_eq!(sample_at(&table, 1.0), 1.0);
        assert!((sample_at(&table, 3.5) - -0.5).abs() < 1e-6);
        assert_eq!(sample_at(&[], 1.0), 0.0);
    }
}
