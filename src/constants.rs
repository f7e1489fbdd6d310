use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const DEFAULT_CONTACT_TO_EMAIL: &str = "sannidhishetty9@gmail.com";
pub const DEFAULT_RESEND_FROM_EMAIL: &str = "onboarding@resend.dev";
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

pub const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit:contact";
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u64 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 10 * 60;

pub const MAX_DETAIL_CHARS: usize = 1000;
