//! Sample-accurate parameter automation
//!
//! A value is described by a short list of linear segments, each with a
//! start/end value and a start/end frame. Segments are contiguous and ordered
//! by start frame; a new ramp always begins where the previous one ends.
//! Storage is a fixed array so scheduling never allocates.

/// Pending segments kept per automated value
pub const MAX_SEGMENTS: usize = 4;

/// One linear piece of an automation curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start_value: f64,
    pub end_value: f64,
    pub start_frame: u64,
    pub end_frame: u64,
}

impl Segment {
    const EMPTY: Segment = Segment {
        start_value: 0.0,
        end_value: 0.0,
        start_frame: 0,
        end_frame: 0,
    };

    /// Value at `frame`, assuming `frame >= start_frame`
    pub fn value_at(&self, frame: u64) -> f64 {
        if frame >= self.end_frame || self.end_frame <= self.start_frame {
            return self.end_value;
        }
        if frame <= self.start_frame {
            return self.start_value;
        }
        let span = (self.end_frame - self.start_frame) as f64;
        let t = (frame - self.start_frame) as f64 / span;
        self.start_value + (self.end_value - self.start_value) * t
    }
}

/// An automated value driven by scheduled linear segments
#[derive(Debug, Clone)]
pub struct Automation {
    segments: [Segment; MAX_SEGMENTS],
    len: usize,
    /// Value before the first pending segment starts
    base: f64,
}

impl Automation {
    pub fn new(value: f64) -> Self {
        Self {
            segments: [Segment::EMPTY; MAX_SEGMENTS],
            len: 0,
            base: value,
        }
    }

    /// Pending segments, oldest first
    pub fn segments(&self) -> &[Segment] {
        &self.segments[..self.len]
    }

    /// Value at `frame`
    pub fn value_at(&self, frame: u64) -> f64 {
        let mut value = self.base;
        for segment in self.segments() {
            if frame < segment.start_frame {
                break;
            }
            value = segment.value_at(frame);
        }
        value
    }

    /// Value once every pending segment has completed
    pub fn target(&self) -> f64 {
        self.segments().last().map_or(self.base, |s| s.end_value)
    }

    /// True once `frame` is past the end of the last segment
    pub fn is_settled(&self, frame: u64) -> bool {
        self.segments().last().map_or(true, |s| frame >= s.end_frame)
    }

    /// Jump to `value` at `frame`
    pub fn set_value_at(&mut self, value: f64, frame: u64) {
        self.push(Segment {
            start_value: value,
            end_value: value,
            start_frame: frame,
            end_frame: frame,
        });
    }

    /// Ramp linearly to `value`, arriving at `end_frame`.
    ///
    /// The ramp starts where the last scheduled segment ends, or at `now`
    /// from the held value if nothing is scheduled.
    pub fn linear_ramp_to(&mut self, value: f64, end_frame: u64, now: u64) {
        let (start_value, start_frame) = match self.segments().last() {
            Some(last) => (last.end_value, last.end_frame),
            None => (self.base, now),
        };
        self.push(Segment {
            start_value,
            end_value: value,
            start_frame,
            end_frame: end_frame.max(start_frame),
        });
    }

    /// Drop every pending segment, holding the value current at `frame`
    pub fn cancel_and_hold(&mut self, frame: u64) {
        self.base = self.value_at(frame);
        self.len = 0;
    }

    /// Fold segments that finished at or before `frame` into the held value
    pub fn advance(&mut self, frame: u64) {
        let mut done = 0;
        while done < self.len && self.segments[done].end_frame <= frame {
            let next_started = self
                .segments
                .get(done + 1)
                .filter(|_| done + 1 < self.len)
                .map_or(true, |next| next.start_frame <= frame);
            if !next_started {
                break;
            }
            self.base = self.segments[done].end_value;
            done += 1;
        }
        if done > 0 {
            self.segments.copy_within(done..self.len, 0);
            self.len -= done;
        }
    }

    fn push(&mut self, segment: Segment) {
        if self.len == MAX_SEGMENTS {
            // Oldest segment is folded into the held value to make room
            self.base = self.segments[0].end_value;
            self.segments.copy_within(1..MAX_SEGMENTS, 0);
            self.len -= 1;
        }
        self.segments[self.len] = segment;
        self.len += 1;
    }
}
