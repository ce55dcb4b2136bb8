//! # provider-synthetic
//!
//! Synthetic channel profiles for demos and for batches where the YouTube API
//! is unusable.
//!
//! Any string can be turned into a complete [`ChannelRecord`]. The popularity
//! tier, titles and series shape are derived from a seed computed from the
//! input's character codes, so the same input always lands in the same tier.
//! How magnitudes are varied on top of that is chosen with [`MagnitudeMode`]:
//!
//! - [`MagnitudeMode::Seeded`] - fully reproducible for a given input and reference time
//! - [`MagnitudeMode::CosmeticRandom`] - magnitudes re-rolled on every call

use async_trait::async_trait;
use channel_metrics_core::prelude::*;
use chrono::{DateTime, Datelike, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Length of the generated monthly series.
pub const MONTHLY_SERIES_LEN: usize = 24;

/// Number of generated recent uploads.
pub const RECENT_VIDEO_COUNT: usize = 10;

const COUNTRIES: [&str; 10] = ["US", "UK", "CA", "AU", "IN", "JP", "BR", "DE", "FR", "ES"];

/// How magnitudes are varied around the seed-derived values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MagnitudeMode {
    /// Variation drawn from an RNG seeded by the input; same input, same output.
    #[default]
    Seeded,
    /// Variation drawn from the thread RNG; a different look every run.
    CosmeticRandom,
}

/// Popularity bucket that selects plausible value ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopularityTier {
    VeryPopular,
    Popular,
    Medium,
    Small,
}

/// `(min, max)` pairs for one tier.
struct TierRanges {
    subscribers: (u64, u64),
    views_per_subscriber: (u64, u64),
    videos: (u64, u64),
    monthly_videos: (u64, u64),
    monthly_views: (u64, u64),
}

impl PopularityTier {
    /// Top decile is very popular, the next 20% popular, the next 30% medium.
    pub fn from_seed(seed: u64) -> Self {
        match seed % 100 {
            91..=99 => PopularityTier::VeryPopular,
            71..=90 => PopularityTier::Popular,
            41..=70 => PopularityTier::Medium,
            _ => PopularityTier::Small,
        }
    }

    pub fn for_identifier(identifier: &str) -> Self {
        Self::from_seed(seed_for(identifier))
    }

    fn ranges(&self) -> TierRanges {
        match self {
            PopularityTier::VeryPopular => TierRanges {
                subscribers: (10_000_000, 50_000_000),
                views_per_subscriber: (40, 100),
                videos: (500, 5_000),
                monthly_videos: (10, 30),
                monthly_views: (1_000_000, 5_000_000),
            },
            PopularityTier::Popular => TierRanges {
                subscribers: (1_000_000, 10_000_000),
                views_per_subscriber: (30, 80),
                videos: (300, 2_000),
                monthly_videos: (5, 20),
                monthly_views: (200_000, 1_000_000),
            },
            PopularityTier::Medium => TierRanges {
                subscribers: (100_000, 1_000_000),
                views_per_subscriber: (20, 50),
                videos: (100, 1_000),
                monthly_videos: (3, 15),
                monthly_views: (50_000, 200_000),
            },
            PopularityTier::Small => TierRanges {
                subscribers: (1_000, 100_000),
                views_per_subscriber: (10, 30),
                videos: (50, 500),
                monthly_videos: (1, 8),
                monthly_views: (5_000, 50_000),
            },
        }
    }

    /// Subscriber counts a generated profile of this tier can have.
    pub fn subscriber_bounds(&self) -> (u64, u64) {
        let (min, max) = self.ranges().subscribers;
        (jittered_floor(min), jittered_ceiling(max))
    }
}

/// Sum of the input's UTF-16 code units.
pub fn seed_for(identifier: &str) -> u64 {
    identifier.encode_utf16().map(u64::from).sum()
}

/// Position `seed` within `[min, max)` by its last two decimal digits.
fn scale(seed: u64, min: u64, max: u64) -> u64 {
    (seed % 100) * (max - min) / 100 + min
}

const JITTER: f64 = 0.1;

fn jitter(rng: &mut dyn RngCore, value: u64, spread: f64) -> u64 {
    (value as f64 * rng.gen_range(1.0 - spread..=1.0 + spread)).round() as u64
}

fn jittered_floor(value: u64) -> u64 {
    (value as f64 * (1.0 - JITTER)).floor() as u64
}

fn jittered_ceiling(value: u64) -> u64 {
    (value as f64 * (1.0 + JITTER)).ceil() as u64
}

/// `(year, zero-based month)` of the month `offset` months before `now`.
fn months_back(now: &DateTime<Utc>, offset: usize) -> (i32, u32) {
    let index = now.year() * 12 + now.month0() as i32 - offset as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32)
}

/// A generated record together with the tier it was drawn from.
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    pub tier: PopularityTier,
    pub record: ChannelRecord,
}

/// Generates complete channel records from arbitrary strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGenerator {
    mode: MagnitudeMode,
}

impl SyntheticGenerator {
    pub fn new(mode: MagnitudeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MagnitudeMode {
        self.mode
    }

    fn rng(&self, seed: u64) -> Box<dyn RngCore> {
        match self.mode {
            MagnitudeMode::Seeded => Box::new(StdRng::seed_from_u64(seed)),
            MagnitudeMode::CosmeticRandom => Box::new(rand::thread_rng()),
        }
    }

    /// Generate a record as of now.
    pub fn generate(&self, identifier: &str) -> ChannelRecord {
        self.generate_at(identifier, Utc::now()).record
    }

    /// Generate one record per identifier, in input order.
    pub fn generate_all(&self, identifiers: &[String]) -> Vec<ChannelRecord> {
        let now = Utc::now();
        identifiers
            .iter()
            .map(|identifier| self.generate_at(identifier, now).record)
            .collect()
    }

    /// Generate a profile with `now` as the reference time for all dates.
    pub fn generate_at(&self, identifier: &str, now: DateTime<Utc>) -> SyntheticProfile {
        let name = display_name(identifier);
        let seed = seed_for(identifier);
        let tier = PopularityTier::from_seed(seed);
        let ranges = tier.ranges();
        let mut rng = self.rng(seed);

        let (min, max) = ranges.subscribers;
        let subscriber_count = jitter(rng.as_mut(), scale(seed, min, max), JITTER);
        let (min, max) = ranges.views_per_subscriber;
        let view_count = jitter(
            rng.as_mut(),
            subscriber_count * scale(seed, min, max),
            JITTER,
        );
        let (min, max) = ranges.videos;
        let video_count = jitter(rng.as_mut(), scale(seed, min, max), JITTER);

        let channel_id = format!("UC{}", seed_for(&name));
        let recent_videos =
            recent_videos(rng.as_mut(), &name, &channel_id, seed, subscriber_count, now);
        let monthly_performance = self.monthly_series(seed, tier, now);

        debug!("Generated synthetic {:?} profile for {:?}", tier, identifier);

        SyntheticProfile {
            tier,
            record: ChannelRecord {
                id: ChannelId::new(channel_id.clone()),
                description: format!(
                    "This is {}'s YouTube channel, featuring videos about {} and {}.",
                    name,
                    if seed % 2 == 0 { "entertainment" } else { "education" },
                    if seed % 3 == 0 { "lifestyle" } else { "technology" },
                ),
                custom_url: format!(
                    "@{}",
                    name.to_lowercase()
                        .split_whitespace()
                        .collect::<String>()
                ),
                thumbnail_url: format!("https://picsum.photos/seed/{}/400/400", channel_id),
                title: name,
                subscriber_count,
                view_count,
                video_count,
                country: COUNTRIES[(seed % 10) as usize].to_string(),
                verified: is_verified(subscriber_count),
                created_at: Some(now - Duration::days(365 * scale(seed, 1, 10) as i64)),
                recent_videos,
                monthly_performance,
            },
        }
    }

    /// 24 months of activity, most recent month first.
    ///
    /// Each month gets its own sub-seed from the base seed and the calendar
    /// month, decays with age, and gets an oscillation plus occasional spikes.
    fn monthly_series(&self, seed: u64, tier: PopularityTier, now: DateTime<Utc>) -> Vec<MonthlyBucket> {
        let ranges = tier.ranges();

        (0..MONTHLY_SERIES_LEN)
            .map(|offset| {
                let (year, month0) = months_back(&now, offset);
                let month_seed = seed + u64::from(month0) * year.max(0) as u64;
                let mut rng = self.rng(month_seed);

                let age = (1.0 - offset as f64 * 0.02).max(0.5);
                let variation = 0.8 + (month_seed % 100) as f64 / 100.0 * 0.4;
                let wave = 1.0 + 0.1 * (offset as f64 * 0.9 + (seed % 7) as f64).sin();
                let spike = if rng.gen_bool(0.1) {
                    rng.gen_range(1.4..2.2)
                } else {
                    1.0
                };

                let (min, max) = ranges.monthly_videos;
                let videos = scale(month_seed, min, max) as f64 * age * variation;
                let (min, max) = ranges.monthly_views;
                let views = scale(month_seed, min, max) as f64 * age * variation * wave * spike;

                MonthlyBucket::new(
                    month_key(year, month0 + 1),
                    jitter(rng.as_mut(), videos.floor() as u64, JITTER).max(1),
                    jitter(rng.as_mut(), views.floor() as u64, JITTER).max(100),
                )
            })
            .collect()
    }
}

/// Identifier with URL prefixes and handle markers removed.
fn display_name(identifier: &str) -> String {
    let cleaned = clean_identifier(identifier);
    if !cleaned.is_empty() {
        return cleaned;
    }
    match identifier.trim() {
        "" => "Unknown Channel".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn video_titles(name: &str, seed: u64) -> [String; RECENT_VIDEO_COUNT] {
    let pick = |cond: bool, a: &str, b: &str| if cond { a.to_string() } else { b.to_string() };
    [
        format!("{}'s Amazing Adventure", name),
        format!(
            "How to Master {} in 10 Days",
            pick(seed % 10 == 0, "Programming", "Cooking")
        ),
        format!(
            "My {} Routine Revealed",
            pick(seed % 2 == 0, "Morning", "Evening")
        ),
        format!(
            "{}: New {} Model",
            pick(seed % 3 == 0, "Unboxing", "Review"),
            pick(seed % 2 == 0, "iPhone", "Samsung")
        ),
        format!(
            "{} Reacts to {}",
            name,
            pick(seed % 2 == 0, "Viral Videos", "Fan Comments")
        ),
        format!(
            "{}'s {} Session",
            name,
            pick(seed % 2 == 0, "Q&A", "Behind the Scenes")
        ),
        format!(
            "Top 10 {} for {}",
            pick(seed % 2 == 0, "Tips", "Tricks"),
            pick(seed % 3 == 0, "Success", "Happiness")
        ),
        format!(
            "Why I {} {}",
            pick(seed % 2 == 0, "Left", "Joined"),
            pick(seed % 3 == 0, "YouTube", "Social Media")
        ),
        format!(
            "The Truth About {} on YouTube",
            pick(seed % 2 == 0, "Fame", "Money")
        ),
        format!(
            "My {} Video Got {}M Views",
            pick(seed % 2 == 0, "First", "Last"),
            scale(seed, 1, 10)
        ),
    ]
}

fn recent_videos(
    rng: &mut dyn RngCore,
    name: &str,
    channel_id: &str,
    seed: u64,
    subscriber_count: u64,
    now: DateTime<Utc>,
) -> Vec<VideoRecord> {
    let views_per_video = subscriber_count * scale(seed, 5, 30) / 100;
    let like_percent = scale(seed, 5, 20);
    let comment_percent = scale(seed, 1, 5);
    let spacing_days = scale(seed, 1, 30) as i64;

    video_titles(name, seed)
        .into_iter()
        .enumerate()
        .map(|(i, title)| {
            let view_count = jitter(&mut *rng, views_per_video, 0.25);
            VideoRecord {
                id: format!("video_{}_{}", i, seed % 1000),
                title,
                published_at: now - Duration::days(i as i64 * spacing_days),
                thumbnail_url: format!("https://picsum.photos/seed/{}_{}/640/360", channel_id, i),
                view_count,
                like_count: view_count * like_percent / 100,
                comment_count: view_count * comment_percent / 100,
            }
        })
        .collect()
}

/// Fallback entry point: one synthetic record per identifier. Never fails.
pub fn generate_channels(identifiers: &[String], mode: MagnitudeMode) -> Vec<ChannelRecord> {
    SyntheticGenerator::new(mode).generate_all(identifiers)
}

/// [`ChannelSource`] that always succeeds with synthetic data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider {
    generator: SyntheticGenerator,
}

impl SyntheticProvider {
    pub fn new(mode: MagnitudeMode) -> Self {
        Self {
            generator: SyntheticGenerator::new(mode),
        }
    }

    pub fn generator(&self) -> &SyntheticGenerator {
        &self.generator
    }
}

#[async_trait]
impl ChannelSource for SyntheticProvider {
    fn id(&self) -> &'static str {
        "synthetic"
    }

    fn name(&self) -> &'static str {
        "Synthetic Data"
    }

    async fn analyze(&self, identifiers: &[String]) -> Result<BatchReport> {
        Ok(BatchReport {
            channels: self.generator.generate_all(identifiers),
            skipped: vec![],
        })
    }
}
