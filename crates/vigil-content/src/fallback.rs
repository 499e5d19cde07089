//! Deterministic fallback bodies.

use chrono::{Datelike, NaiveDate};

/// Rotating pool of short devotional lines. Selection is keyed by the date
/// alone, so every caller resolves the same body for the same day.
pub struct FallbackPool;

const POOL: [&str; 12] = [
    "Be still before the Lord and wait patiently for him. Your hour of prayer is near — come with an open heart.",
    "The prayer of a righteous person is powerful and effective. Thank you for standing in the gap today.",
    "Devote yourselves to prayer, being watchful and thankful. Your slot is a link in an unbroken chain.",
    "Cast all your anxiety on him because he cares for you. Bring today's burdens to your appointed hour.",
    "Pray continually, give thanks in all circumstances. Your faithfulness keeps the vigil alive.",
    "Call to me and I will answer you, and will tell you great and hidden things. Expect much from this hour.",
    "Do not be anxious about anything, but in every situation present your requests to God.",
    "Watch and pray so that you will not fall into temptation. The body is weak, but you are not alone.",
    "Let us then approach God's throne of grace with confidence. Your hour has been set apart for this.",
    "If two of you agree on earth about anything they ask, it will be done. Others pray alongside you today.",
    "In the morning, Lord, you hear my voice; in the morning I lay my requests before you and wait expectantly.",
    "The Lord is near to all who call on him in truth. Step into your hour with expectation.",
];

impl FallbackPool {
    /// Body for the given date. Always non-empty and well under any
    /// channel's length ceiling.
    pub fn body_for(date: NaiveDate) -> &'static str {
        let idx = date.num_days_from_ce().rem_euclid(POOL.len() as i32) as usize;
        POOL[idx]
    }
}
