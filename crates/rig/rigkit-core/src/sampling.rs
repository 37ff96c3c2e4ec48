//! Keyframe track sampling.
//!
//! Model:
//! - A track is a list of keyframes with strictly increasing times (validated at load).
//! - At or before the first key: the first key's value (no backward extrapolation).
//! - Between keys: linear interpolation on the first segment whose right key is later than `t`.
//! - At or after the last key: the last key's value (no forward extrapolation, no looping).
//! - An empty track yields `None`; callers leave the driven value untouched.

use crate::data::Keyframe;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Segment {
    /// Use the key at this index as-is.
    Hold(usize),
    /// Blend keys `i` and `i + 1` by `ratio` in [0, 1).
    Lerp { i: usize, ratio: f32 },
}

fn find_segment(frames: &[Keyframe], t: f32) -> Option<Segment> {
    let first = frames.first()?;
    if t <= first.time {
        return Some(Segment::Hold(0));
    }
    // Linear scan; tracks are short.
    for (i, pair) in frames.windows(2).enumerate() {
        let (f0, f1) = (&pair[0], &pair[1]);
        if t < f1.time {
            let ratio = (t - f0.time) / (f1.time - f0.time);
            return Some(Segment::Lerp { i, ratio });
        }
    }
    Some(Segment::Hold(frames.len() - 1))
}

#[inline]
fn lerp(a: f32, b: f32, ratio: f32) -> f32 {
    a + (b - a) * ratio
}

/// Sample a translate track at time `t` (seconds).
pub fn sample_translate(frames: &[Keyframe], t: f32) -> Option<(f32, f32)> {
    Some(match find_segment(frames, t)? {
        Segment::Hold(i) => (frames[i].x, frames[i].y),
        Segment::Lerp { i, ratio } => {
            let (f0, f1) = (&frames[i], &frames[i + 1]);
            (lerp(f0.x, f1.x, ratio), lerp(f0.y, f1.y, ratio))
        }
    })
}

/// Sample a rotate track at time `t` (seconds). Degrees.
pub fn sample_rotate(frames: &[Keyframe], t: f32) -> Option<f32> {
    Some(match find_segment(frames, t)? {
        Segment::Hold(i) => frames[i].value,
        Segment::Lerp { i, ratio } => lerp(frames[i].value, frames[i + 1].value, ratio),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_lookup_edges() {
        let frames = [
            Keyframe::rotate(1.0, 0.0),
            Keyframe::rotate(2.0, 0.0),
            Keyframe::rotate(4.0, 0.0),
        ];
        assert_eq!(find_segment(&[], 1.0), None);
        assert_eq!(find_segment(&frames, 0.0), Some(Segment::Hold(0)));
        assert_eq!(find_segment(&frames, 1.0), Some(Segment::Hold(0)));
        assert_eq!(
            find_segment(&frames, 1.5),
            Some(Segment::Lerp { i: 0, ratio: 0.5 })
        );
        // Exactly on an interior key starts the next segment.
        assert_eq!(
            find_segment(&frames, 2.0),
            Some(Segment::Lerp { i: 1, ratio: 0.0 })
        );
        assert_eq!(find_segment(&frames, 4.0), Some(Segment::Hold(2)));
        assert_eq!(find_segment(&frames, 9.0), Some(Segment::Hold(2)));
    }

    #[test]
    fn single_key_always_holds() {
        let frames = [Keyframe::translate(0.5, 3.0, 4.0)];
        assert_eq!(sample_translate(&frames, 0.0), Some((3.0, 4.0)));
        assert_eq!(sample_translate(&frames, 100.0), Some((3.0, 4.0)));
    }

    #[test]
    fn rotate_interpolates_value() {
        let frames = [Keyframe::rotate(0.0, -10.0), Keyframe::rotate(2.0, 30.0)];
        assert_eq!(sample_rotate(&frames, 0.5), Some(0.0));
        assert_eq!(sample_rotate(&frames, 3.0), Some(30.0));
        assert_eq!(sample_rotate(&[], 3.0), None);
    }
}
