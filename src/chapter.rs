use std::fmt;

use crate::{ErrorKind, Time};

/// A chapter start marker supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterMarker {
    /// The title of the chapter. Must not be empty.
    pub title: String,
    /// The start of the chapter on the primary track's timeline.
    pub start: Time,
    /// Optional JPEG encoded thumbnail for the chapter.
    pub thumbnail: Option<Vec<u8>>,
}

impl ChapterMarker {
    /// Creates a chapter marker without a thumbnail.
    pub fn new(title: impl Into<String>, start: Time) -> Self {
        Self { title: title.into(), start, thumbnail: None }
    }

    /// Attaches JPEG encoded thumbnail data to the marker.
    pub fn with_thumbnail(mut self, jpeg: impl Into<Vec<u8>>) -> Self {
        self.thumbnail = Some(jpeg.into());
        self
    }
}

/// A chapter with its computed position on the timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterInterval {
    /// The chapter title.
    pub title: String,
    /// The start of the chapter on the primary track's timeline.
    pub start: Time,
    /// Always strictly positive.
    pub duration: Time,
    /// The index of the marker this interval was computed from, in the caller's order.
    pub marker_index: usize,
}

impl ChapterInterval {
    /// Returns the end of the interval.
    pub fn end(&self) -> Time {
        // both operands were produced in the planning timescale
        Time::new(self.start.value + self.duration.value, self.start.timescale)
    }
}

impl fmt::Display for ChapterInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.3}s, +{:.3}s)",
            self.title,
            self.start.as_secs_f64(),
            self.duration.as_secs_f64()
        )
    }
}

/// Partitions the timeline into one interval per marker.
///
/// Markers are sorted by start time, keeping the caller's order for equal start times. Each
/// interval lasts until the next marker starts, the last one until `total`. All intervals are
/// expressed in the least common timescale of the markers and `total`, so they are contiguous
/// and sum up exactly to `total - first.start`.
///
/// A chapter that would end up with a zero or negative duration, because two markers share a
/// start time or a marker lies at or beyond `total`, fails the whole plan with
/// [`ErrorKind::InvalidDuration`]. Nothing is clamped.
pub fn plan_intervals(markers: &[ChapterMarker], total: Time) -> crate::Result<Vec<ChapterInterval>> {
    if markers.is_empty() {
        return Err(crate::Error::new(ErrorKind::InvalidDuration, "No chapter markers supplied"));
    }
    if !total.is_positive() {
        return Err(crate::Error::new(
            ErrorKind::InvalidDuration,
            format!("Total duration {total} is not positive"),
        ));
    }
    if let Some(i) = markers.iter().position(|m| m.title.is_empty()) {
        return Err(crate::Error::new(
            ErrorKind::SampleConstructionFailed,
            format!("Chapter marker {i} has an empty title"),
        ));
    }
    if let Some(i) = markers.iter().position(|m| m.start.is_negative()) {
        return Err(crate::Error::new(
            ErrorKind::InvalidDuration,
            format!("Chapter marker {i} starts before zero at {}", markers[i].start),
        ));
    }

    let timescale = markers
        .iter()
        .map(|m| m.start.timescale)
        .fold(total.timescale, Time::common_timescale);
    let rescale = |t: Time| {
        t.rescale(timescale).ok_or_else(|| {
            crate::Error::new(
                ErrorKind::InvalidDuration,
                format!("Time {t} overflows when converted to timescale {timescale}"),
            )
        })
    };

    let mut order: Vec<usize> = (0..markers.len()).collect();
    // stable, ties keep the caller's order
    order.sort_by(|&a, &b| markers[a].start.cmp(&markers[b].start));

    let total = rescale(total)?;
    let mut intervals = Vec::with_capacity(markers.len());
    for (i, &idx) in order.iter().enumerate() {
        let marker = &markers[idx];
        let start = rescale(marker.start)?;
        let end = match order.get(i + 1) {
            Some(&next) => rescale(markers[next].start)?,
            None => total,
        };

        let duration = end.value - start.value;
        if duration <= 0 {
            return Err(crate::Error::new(
                ErrorKind::InvalidDuration,
                format!(
                    "Chapter '{}' starting at {:.3}s would last {:.3}s",
                    marker.title,
                    start.as_secs_f64(),
                    Time::new(duration, timescale).as_secs_f64(),
                ),
            ));
        }

        intervals.push(ChapterInterval {
            title: marker.title.clone(),
            start,
            duration: Time::new(duration, timescale),
            marker_index: idx,
        });
    }

    Ok(intervals)
}

#[cfg(test)]
mod test {
    use super::*;

    fn secs(s: f64) -> Time {
        Time::from_secs_f64(s, 1000)
    }

    #[test]
    fn three_chapters() {
        let markers = [
            ChapterMarker::new("Intro", secs(0.0)),
            ChapterMarker::new("Setup", secs(42.5)),
            ChapterMarker::new("Demo", secs(120.0)),
        ];
        let intervals = plan_intervals(&markers, Time::from_secs(150)).unwrap();

        let expected = [("Intro", 0.0, 42.5), ("Setup", 42.5, 77.5), ("Demo", 120.0, 30.0)];
        assert_eq!(intervals.len(), expected.len());
        for (i, (title, start, duration)) in intervals.iter().zip(expected) {
            assert_eq!(i.title, title);
            assert_eq!(i.start, secs(start));
            assert_eq!(i.duration, secs(duration));
        }
    }

    #[test]
    fn single_chapter_spans_everything() {
        let markers = [ChapterMarker::new("Only", Time::from_secs(0))];
        let intervals = plan_intervals(&markers, Time::from_secs(10)).unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, Time::from_secs(0));
        assert_eq!(intervals[0].duration, Time::from_secs(10));
    }

    #[test]
    fn duplicate_start_fails() {
        let markers = [
            ChapterMarker::new("A", Time::from_secs(0)),
            ChapterMarker::new("B", Time::from_secs(0)),
        ];
        let err = plan_intervals(&markers, Time::from_secs(10)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidDuration));
    }

    #[test]
    fn marker_at_total_fails() {
        let markers = [
            ChapterMarker::new("A", Time::from_secs(0)),
            ChapterMarker::new("B", Time::from_secs(10)),
        ];
        let err = plan_intervals(&markers, Time::from_secs(10)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidDuration));
    }

    #[test]
    fn unsorted_markers_are_sorted() {
        let markers = [
            ChapterMarker::new("C", Time::from_secs(8)),
            ChapterMarker::new("A", Time::from_secs(0)),
            ChapterMarker::new("B", Time::new(3, 2)),
        ];
        let intervals = plan_intervals(&markers, Time::from_secs(10)).unwrap();
        let titles: Vec<_> = intervals.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert_eq!(intervals[1].marker_index, 2);
        assert_eq!(intervals[1].duration, Time::new(13, 2));
    }

    #[test]
    fn contiguous_and_exact_sum() {
        let markers: Vec<_> = [0, 333, 1000, 1001, 7919]
            .iter()
            .map(|&ms| ChapterMarker::new(format!("{ms}"), Time::new(ms * 3, 3000)))
            .collect();
        let total = Time::new(10_007, 600);
        let intervals = plan_intervals(&markers, total).unwrap();

        for pair in intervals.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start);
        }
        assert_eq!(intervals.last().unwrap().end(), total);

        let sum: i64 = intervals.iter().map(|i| i.duration.value).sum();
        let expected = total.checked_sub(markers[0].start).unwrap();
        assert_eq!(Time::new(sum, intervals[0].duration.timescale), expected);
        assert!(intervals.iter().all(|i| i.duration.is_positive()));
    }

    #[test]
    fn empty_input() {
        let err = plan_intervals(&[], Time::from_secs(1)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidDuration));

        let err = plan_intervals(&[ChapterMarker::new("", Time::from_secs(0))], Time::from_secs(1))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SampleConstructionFailed));
    }
}
