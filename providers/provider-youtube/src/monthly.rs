//! Monthly rollup of uploads.

use channel_metrics_core::{month_key, MonthlyBucket, VideoRecord};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashSet};

/// Group videos by publish month and sum video and view counts per month.
///
/// The result is sorted ascending by month key with one bucket per month
/// that had at least one upload; empty months are not filled in. Videos
/// are counted once per ID, and videos published before `window_start`
/// (a `YYYY-MM` key) are ignored.
pub fn aggregate_monthly(videos: &[VideoRecord], window_start: Option<&str>) -> Vec<MonthlyBucket> {
    let mut seen = HashSet::new();
    let mut buckets: BTreeMap<String, MonthlyBucket> = BTreeMap::new();

    for video in videos {
        if !seen.insert(video.id.as_str()) {
            continue;
        }

        let key = MonthlyBucket::key_for(&video.published_at);
        if window_start.is_some_and(|start| key.as_str() < start) {
            continue;
        }

        let bucket = buckets
            .entry(key)
            .or_insert_with_key(|key| MonthlyBucket::new(key.clone(), 0, 0));
        bucket.video_count += 1;
        bucket.views = bucket.views.saturating_add(video.view_count);
    }

    buckets.into_values().collect()
}

/// First month of a window of `months` months ending with the month of `now`.
///
/// Returns `None` for a zero-length window, meaning "no lower bound".
pub fn window_start(now: &DateTime<Utc>, months: u32) -> Option<String> {
    if months == 0 {
        return None;
    }
    let index = now.year() * 12 + now.month0() as i32 - (months as i32 - 1);
    Some(month_key(index.div_euclid(12), index.rem_euclid(12) as u32 + 1))
}
