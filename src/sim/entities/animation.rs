//! Horizontal frame-strip animation bookkeeping

use crate::sim::transform::Rect;

/// Equal-sized frames laid out left to right in one texture row
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStrip {
    frame_width: f32,
    frame_height: f32,
    num_frames: usize,
    duration: f32,
    repeating: bool,
    current: usize,
    elapsed: f32,
}

impl FrameStrip {
    pub fn new(frame_width: f32, frame_height: f32, num_frames: usize, duration: f32, repeating: bool) -> Self {
        Self {
            frame_width,
            frame_height,
            num_frames: num_frames.max(1),
            duration,
            repeating,
            current: 0,
            elapsed: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.duration <= 0.0 || self.is_finished() {
            return;
        }
        let per_frame = self.duration / self.num_frames as f32;
        self.elapsed += dt;
        while self.elapsed >= per_frame {
            self.elapsed -= per_frame;
            if self.current + 1 < self.num_frames {
                self.current += 1;
            } else if self.repeating {
                self.current = 0;
            } else {
                self.elapsed = 0.0;
                break;
            }
        }
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Source rectangle of the current frame
    pub fn frame_rect(&self) -> Rect {
        Rect::new(
            self.current as f32 * self.frame_width,
            0.0,
            self.frame_width,
            self.frame_height,
        )
    }

    /// Non-repeating strips stop on their last frame
    pub fn is_finished(&self) -> bool {
        !self.repeating && self.current + 1 >= self.num_frames
    }

    pub fn restart(&mut self) {
        self.current = 0;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeating_strip_wraps() {
        let mut strip = FrameStrip::new(48.0, 32.0, 8, 0.5, true);
        strip.update(0.5 / 8.0 * 3.5);
        assert_eq!(strip.current_frame(), 3);
        assert_eq!(strip.frame_rect(), Rect::new(144.0, 0.0, 48.0, 32.0));
        strip.update(0.5 / 8.0 * 5.0);
        assert_eq!(strip.current_frame(), 0);
    }

    #[test]
    fn test_one_shot_strip_holds_last_frame() {
        let mut strip = FrameStrip::new(48.0, 32.0, 11, 1.5, false);
        strip.update(10.0);
        assert_eq!(strip.current_frame(), 10);
        assert!(strip.is_finished());
        strip.restart();
        assert_eq!(strip.current_frame(), 0);
    }
}
