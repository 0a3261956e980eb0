//! Logical tags
//!
//! A tag is a discrete instant of logical time: a nanosecond timestamp plus a
//! microstep that orders multiple rounds of execution at the same timestamp.
//! Tags are totally ordered, first by time and then by microstep.

use std::fmt;

/// A discrete instant of logical time.
///
/// Ordering is lexicographic: time first, then microstep. Two reactions
/// triggered at the same `Tag` belong to the same round of execution; the
/// scheduler drains every reaction at the current tag before advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    /// Logical time in nanoseconds since the start of execution.
    pub time: i64,
    /// Microstep within `time`.
    pub microstep: u32,
}

impl Tag {
    /// A tag earlier than every other tag.
    pub const NEVER: Tag = Tag {
        time: i64::MIN,
        microstep: 0,
    };

    /// A tag later than every other tag.
    pub const FOREVER: Tag = Tag {
        time: i64::MAX,
        microstep: u32::MAX,
    };

    /// The origin of logical time.
    pub const ZERO: Tag = Tag {
        time: 0,
        microstep: 0,
    };

    /// Create a tag from a time in nanoseconds and a microstep.
    #[must_use]
    pub const fn new(time: i64, microstep: u32) -> Self {
        Self { time, microstep }
    }

    /// The tag one microstep later at the same logical time.
    #[must_use]
    pub const fn next_microstep(self) -> Self {
        Self {
            time: self.time,
            microstep: self.microstep + 1,
        }
    }

    /// The tag at `time`, microstep zero.
    #[must_use]
    pub const fn at(time: i64) -> Self {
        Self { time, microstep: 0 }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.time, self.microstep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_time_then_microstep() {
        assert!(Tag::new(0, 0) < Tag::new(0, 1));
        assert!(Tag::new(0, 5) < Tag::new(1, 0));
        assert!(Tag::new(3, 0) > Tag::new(2, 9));
        assert_eq!(Tag::new(7, 2), Tag::new(7, 2));
    }

    #[test]
    fn sentinels_bound_all_tags() {
        let tags = [Tag::ZERO, Tag::new(-5, 0), Tag::new(1_000_000, 42)];
        for tag in tags {
            assert!(Tag::NEVER < tag);
            assert!(tag < Tag::FOREVER);
        }
    }

    #[test]
    fn microstep_advance() {
        let tag = Tag::at(100);
        assert_eq!(tag.next_microstep(), Tag::new(100, 1));
        assert_eq!(tag.next_microstep().time, tag.time);
    }
}
