//! Synthetic user rows. Every field is a pure function of the row's offset.

use std::ops::Range;

use chrono::{Days, NaiveDate};
use serde::Serialize;

pub const STATE_COUNT: u64 = 50;
pub const COUNTRY_COUNT: u64 = 200;

const BIRTH_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1950, 1, 1) {
    Some(date) => date,
    None => panic!("invalid birth epoch"),
};
/// Days between 1950-01-01 and 2000-01-01.
const BIRTH_SPAN_DAYS: u64 = 18_262;

const STREETS: &[&str] = &["Main St", "Oak Ave", "Pine Rd", "Maple Dr", "Cedar Ln", "Elm St", "Lakeview Blvd", "Hillcrest Way"];

const CITIES: &[&str] =
    &["Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton", "Fairview", "Salem", "Madison", "Georgetown"];

const ACCOUNT_TYPES: &[&str] = &["free", "basic", "premium"];

const AIRPORTS: &[&str] =
    &["ATL", "LAX", "ORD", "DFW", "DEN", "JFK", "SFO", "SEA", "LAS", "MCO", "EWR", "CLT", "PHX", "IAH", "MIA", "BOS"];

/// One generated `users` row, minus the auto-incremented key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SyntheticRecord {
    #[serde(skip)]
    pub offset: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub city: &'static str,
    pub state_id: i32,
    pub zip: String,
    pub country_id: i32,
    pub account_type: &'static str,
    pub closest_airport: &'static str,
}

impl SyntheticRecord {
    /// Derives the record at `offset`. Calling this twice with the same offset yields equal records.
    pub fn at(offset: u64) -> Self {
        Self {
            offset,
            name: format!("User_{}", offset),
            email: format!("user{}@example.com", offset),
            password: format!("pw_{:016x}", mix64(offset)),
            date_of_birth: BIRTH_EPOCH + Days::new(offset % BIRTH_SPAN_DAYS),
            address: format!("{} {}", 1 + offset % 9_999, pick(STREETS, offset)),
            city: pick(CITIES, offset),
            state_id: (offset % STATE_COUNT) as i32,
            zip: format!("{:05}", offset % 100_000),
            country_id: (offset % COUNTRY_COUNT) as i32,
            account_type: pick(ACCOUNT_TYPES, offset),
            closest_airport: pick(AIRPORTS, offset),
        }
    }

    /// Materializes every record in the half-open offset range.
    pub fn batch(offsets: Range<u64>) -> Vec<Self> { offsets.map(Self::at).collect() }
}

fn pick(values: &'static [&'static str], offset: u64) -> &'static str { values[(offset % values.len() as u64) as usize] }

/// splitmix64 finalizer
fn mix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
