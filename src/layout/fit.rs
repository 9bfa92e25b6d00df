//! Largest font size at which a line fits the display box

/// Smallest font size the search will go down to
pub const DEFAULT_MIN_FONT_SIZE: u32 = 5;

/// Size of a laid-out text block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

impl TextExtent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width <= width as f32 && self.height <= height as f32
    }
}

/// Measures text laid out with word wrap inside a pixel box
pub trait TextMeasure: Send + Sync {
    /// Extent of `text` at `size` pixels, wrapped to `bounds.0` pixels wide.
    ///
    /// `bounds.1` is the available height; implementations may use it to stop
    /// laying out early but must still report the full height.
    fn measure(&self, text: &str, size: u32, bounds: (u32, u32)) -> TextExtent;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, u32, (u32, u32)) -> TextExtent + Send + Sync,
{
    fn measure(&self, text: &str, size: u32, bounds: (u32, u32)) -> TextExtent {
        self(text, size, bounds)
    }
}

/// Initial font size derived from the display width
pub fn initial_font_size(display_width: u32, divisor: u32) -> u32 {
    display_width / divisor.max(1)
}

/// Search downward from `initial_size` for the first size whose wrapped layout
/// fits `target_width` x `target_height`.
///
/// Stops at `minimum_size` even if that still overflows; the overflow is
/// accepted and the text may be clipped. An `initial_size` below the minimum
/// is raised to it.
pub fn fit_font<M: TextMeasure + ?Sized>(
    line: &str,
    target_width: u32,
    target_height: u32,
    initial_size: u32,
    minimum_size: u32,
    measure: &M,
) -> u32 {
    let bounds = (target_width, target_height);
    let mut size = initial_size.max(minimum_size);

    while size > minimum_size && !measure.measure(line, size, bounds).fits(target_width, target_height)
    {
        size -= 1;
    }

    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Every character is `size` wide on one row, no wrapping
    fn mono(text: &str, size: u32, _bounds: (u32, u32)) -> TextExtent {
        TextExtent::new((text.chars().count() as u32 * size) as f32, size as f32)
    }

    #[test]
    fn test_initial_size_fits() {
        assert_eq!(fit_font("abc", 1000, 1000, 100, 5, &mono), 100);
    }

    #[test]
    fn test_shrinks_until_fit() {
        // 10 chars must fit 250 px: size 25
        assert_eq!(fit_font("0123456789", 250, 1000, 100, 5, &mono), 25);
    }

    #[test]
    fn test_height_limits_too() {
        assert_eq!(fit_font("a", 1000, 40, 100, 5, &mono), 40);
    }

    #[test]
    fn test_overflow_returns_minimum() {
        assert_eq!(fit_font("0123456789", 10, 10, 100, 5, &mono), 5);
    }

    #[test]
    fn test_initial_below_minimum() {
        assert_eq!(fit_font("a", 1, 1, 3, 5, &mono), 5);
    }

    #[test]
    fn test_monotonic_in_width() {
        let text = "Seigneur, prends pitié";
        let mut previous = u32::MAX;
        for width in (50..2000).rev().step_by(37) {
            let size = fit_font(text, width, 500, 120, 5, &mono);
            assert!(size <= previous);
            assert!((5..=120).contains(&size));
            previous = size;
        }
    }

    #[test]
    fn test_measurement_calls_bounded() {
        let calls = AtomicUsize::new(0);
        let counting = |text: &str, size: u32, bounds: (u32, u32)| {
            calls.fetch_add(1, Ordering::Relaxed);
            mono(text, size, bounds)
        };
        fit_font("0123456789", 1, 1, 60, 5, &counting);
        assert_eq!(calls.load(Ordering::Relaxed), 55);
    }

    #[test]
    fn test_initial_font_size() {
        assert_eq!(initial_font_size(1920, 18), 106);
        assert_eq!(initial_font_size(1920, 0), 1920);
    }
}
