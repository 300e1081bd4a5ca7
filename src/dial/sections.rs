use crate::geometry::normalize_degrees;
use derive_more::{Deref, Display, From, Into};

/// One-indexed snap bucket; the bucket sitting at 0 degrees is reported as the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Deref, From, Into)]
pub struct Section(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    count: u32,
}

impl Sections {
    /// A non-positive count disables snapping.
    pub fn new(count: i64) -> Option<Self> {
        u32::try_from(count)
            .ok()
            .filter(|&c| c > 0)
            .map(|count| Self { count })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn angle_per_section(&self) -> f64 {
        360.0 / self.count as f64
    }

    /// Rounds `angle` to the nearest bucket boundary. An excess of exactly half a
    /// bucket rounds down; rounding up past the last boundary wraps to 0.
    pub fn snap(&self, angle: f64) -> (f64, Section) {
        let step = self.angle_per_section();
        let angle = normalize_degrees(angle);

        let lower = (angle / step).floor();
        let excess = angle - lower * step;
        let bucket = if excess > step / 2.0 { lower + 1.0 } else { lower };
        let bucket = (bucket as u64 % self.count as u64) as u32;

        // index the bucket's midpoint so the floor rule can't land one bucket low
        (bucket as f64 * step, self.index_of(bucket as f64 * step + step / 2.0))
    }

    /// Bucket index of an arbitrary angle, folded into `1..=count`.
    pub fn index_of(&self, angle: f64) -> Section {
        let raw = (angle * self.count as f64 / 360.0).floor() as i64;
        let bucket = raw.rem_euclid(self.count as i64) as u32;
        self.section_for_bucket(bucket)
    }

    fn section_for_bucket(&self, bucket: u32) -> Section {
        if bucket == 0 {
            Section(self.count)
        } else {
            Section(bucket)
        }
    }
}
