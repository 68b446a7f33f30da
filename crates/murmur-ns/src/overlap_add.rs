//! Overlap-add reconstruction.

use crate::config::HopStrategy;

/// Accumulates inverse-transformed frames into the output signal.
///
/// With [`HopStrategy::HalfFrame`] the first half of frame `k` is added to
/// the stored second half of frame `k - 1` and written at `k * hop`; frame 0
/// is written as is. The second half of the last frame is never flushed, so
/// output past `(last + 1) * hop` stays zero.
///
/// With [`HopStrategy::FullFrame`] each frame is written whole at `k * N`.
#[derive(Debug, Clone)]
pub struct OverlapAdd {
    strategy: HopStrategy,
    frame_size: usize,
    hop: usize,
    output: Vec<f64>,
    overlap: Vec<f64>,
    frames_accumulated: usize,
}

impl OverlapAdd {
    /// Creates an accumulator for an output of `output_len` samples.
    ///
    /// # Panics
    ///
    /// Panics if `frame_size` is zero or, for [`HopStrategy::HalfFrame`], odd.
    pub fn new(frame_size: usize, strategy: HopStrategy, output_len: usize) -> Self {
        assert!(frame_size > 0, "frame size must be non-zero");
        assert!(
            strategy == HopStrategy::FullFrame || frame_size % 2 == 0,
            "half-frame overlap needs an even frame size, got {frame_size}"
        );
        let hop = strategy.hop(frame_size);
        let overlap_len = match strategy {
            HopStrategy::HalfFrame => hop,
            HopStrategy::FullFrame => 0,
        };
        Self {
            strategy,
            frame_size,
            hop,
            output: vec![0.0; output_len],
            overlap: vec![0.0; overlap_len],
            frames_accumulated: 0,
        }
    }

    /// Hop length in samples.
    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of frames accumulated so far.
    pub fn frames_accumulated(&self) -> usize {
        self.frames_accumulated
    }

    /// Adds the next reconstructed frame. Frames must arrive in order.
    ///
    /// # Panics
    ///
    /// Panics if `frame.len() != N` or the frame's output region lies past
    /// the end of the output buffer.
    pub fn accumulate(&mut self, frame: &[f64]) {
        assert_eq!(frame.len(), self.frame_size, "reconstructed frame length");
        let k = self.frames_accumulated;
        let offset = k * self.hop;

        match self.strategy {
            HopStrategy::HalfFrame => {
                let out = &mut self.output[offset..offset + self.hop];
                if k == 0 {
                    out.copy_from_slice(&frame[..self.hop]);
                } else {
                    for ((o, &x), &prev) in out.iter_mut().zip(&frame[..self.hop]).zip(&self.overlap)
                    {
                        *o = x + prev;
                    }
                }
                self.overlap.copy_from_slice(&frame[self.hop..]);
            }
            HopStrategy::FullFrame => {
                self.output[offset..offset + self.frame_size].copy_from_slice(frame);
            }
        }

        self.frames_accumulated += 1;
    }

    /// Output signal accumulated so far.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Consumes the accumulator, returning the output signal.
    pub fn into_output(self) -> Vec<f64> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_copied_without_addition() {
        let mut ola = OverlapAdd::new(4, HopStrategy::HalfFrame, 8);
        ola.accumulate(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ola.output(), &[1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(ola.frames_accumulated(), 1);
    }

    #[test]
    fn later_frames_add_previous_tail() {
        let mut ola = OverlapAdd::new(4, HopStrategy::HalfFrame, 8);
        ola.accumulate(&[1.0, 2.0, 3.0, 4.0]);
        ola.accumulate(&[10.0, 20.0, 30.0, 40.0]);
        ola.accumulate(&[100.0, 200.0, 300.0, 400.0]);
        assert_eq!(
            ola.into_output(),
            vec![1.0, 2.0, 13.0, 24.0, 130.0, 240.0, 0.0, 0.0]
        );
    }

    #[test]
    fn full_frame_writes_back_to_back() {
        let mut ola = OverlapAdd::new(3, HopStrategy::FullFrame, 7);
        assert_eq!(ola.hop(), 3);
        ola.accumulate(&[1.0, 2.0, 3.0]);
        ola.accumulate(&[4.0, 5.0, 6.0]);
        assert_eq!(ola.output(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0]);
    }

    #[test]
    fn constant_frames_with_complementary_windows_are_flat() {
        let n = 8;
        let window = murmur_common_audio::window::hann(n);
        let mut ola = OverlapAdd::new(n, HopStrategy::HalfFrame, 4 * n);
        let frame: Vec<f64> = window.iter().map(|&w| f64::from(w)).collect();
        for _ in 0..7 {
            ola.accumulate(&frame);
        }
        // Interior samples see two complementary window halves.
        let written = 7 * ola.hop();
        for (i, &y) in ola.output()[n / 2..written].iter().enumerate() {
            assert!((y - 1.0).abs() < 1e-6, "sample {}: {y}", i + n / 2);
        }
    }

    #[test]
    #[should_panic(expected = "even frame size")]
    fn half_frame_rejects_odd_size() {
        let _ = OverlapAdd::new(5, HopStrategy::HalfFrame, 10);
    }

    #[test]
    #[should_panic]
    fn rejects_frame_past_output_end() {
        let mut ola = OverlapAdd::new(4, HopStrategy::FullFrame, 6);
        ola.accumulate(&[0.0; 4]);
        ola.accumulate(&[0.0; 4]);
    }
}
