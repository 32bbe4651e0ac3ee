//! Row bands for the tile-parallel renderer.
//!
//! Divides the image into horizontal bands of whole rows, one per worker.
//! Bands are disjoint and together cover every row exactly once.

/// A contiguous range of pixel rows, `y` counted from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// First row of the band
    pub y_start: u32,
    /// One past the last row
    pub y_end: u32,
    /// Worker index
    pub index: usize,
}

impl Band {
    pub fn new(y_start: u32, y_end: u32, index: usize) -> Self {
        Self { y_start, y_end, index }
    }

    /// Number of rows in this band.
    pub fn rows(&self) -> u32 {
        self.y_end - self.y_start
    }

    /// Memory row range of the band in a top-down buffer of `height` rows.
    pub fn memory_rows(&self, height: u32) -> std::ops::Range<u32> {
        (height - self.y_end)..(height - self.y_start)
    }
}

/// Split `height` rows into at most `workers` non-empty bands of near equal
/// size, ordered by `y_start`.
pub fn generate_bands(height: u32, workers: usize) -> Vec<Band> {
    let count = (workers.max(1) as u64).min(height as u64);
    (0..count)
        .map(|i| {
            let start = (i * height as u64 / count) as u32;
            let end = ((i + 1) * height as u64 / count) as u32;
            Band::new(start, end, i as usize)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(bands: &[Band], height: u32) {
        let mut next = 0;
        for band in bands {
            assert_eq!(band.y_start, next);
            assert!(band.rows() > 0);
            next = band.y_end;
        }
        assert_eq!(next, height);
    }

    #[test]
    fn test_generate_bands_exact_fit() {
        let bands = generate_bands(480, 8);
        assert_eq!(bands.len(), 8);
        assert!(bands.iter().all(|b| b.rows() == 60));
        assert_covers(&bands, 480);
    }

    #[test]
    fn test_generate_bands_remainder() {
        let bands = generate_bands(100, 7);
        assert_eq!(bands.len(), 7);
        assert_covers(&bands, 100);
        let (min, max) = bands
            .iter()
            .fold((u32::MAX, 0), |(lo, hi), b| (lo.min(b.rows()), hi.max(b.rows())));
        assert!(max - min <= 1);
    }

    #[test]
    fn test_more_workers_than_rows() {
        let bands = generate_bands(3, 16);
        assert_eq!(bands.len(), 3);
        assert_covers(&bands, 3);
        assert!(generate_bands(0, 4).is_empty());
    }

    #[test]
    fn test_memory_rows_are_flipped() {
        let band = Band::new(0, 10, 0);
        assert_eq!(band.memory_rows(100), 90..100);
    }
}
