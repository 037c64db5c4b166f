//! Short-code allocator (spec §4.H): generation + uniqueness check +
//! adaptive-length backoff + collision metric.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::domain::entities::NewLink;
use crate::domain::repositories::{InsertOutcome, LinkStore};
use crate::error::AppError;

const INITIAL_LENGTH: usize = 6;
const MAX_RETRIES: u32 = 10;
const BASE_RETRY_DELAY: Duration = Duration::from_millis(10);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);
const LENGTH_GROW_EVERY: u32 = 3;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

static CUSTOM_ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,20}$").unwrap());

/// Process-local, monotonically non-decreasing count of duplicate-key
/// collisions observed during allocation (spec §4.H, §9). Reported by the
/// authoring service's `/api/url/metrics/collisions` endpoint.
pub struct ShortCodeAllocator<S: LinkStore> {
    store: Arc<S>,
    collision_count: AtomicU64,
}

impl<S: LinkStore> ShortCodeAllocator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, collision_count: AtomicU64::new(0) }
    }

    /// Read-only accessor for the process-local collision counter.
    pub fn collision_count(&self) -> u64 {
        self.collision_count.load(Ordering::Relaxed)
    }

    /// Allocates a globally unique short code by inserting `template` with a
    /// freshly generated code on each attempt, per spec §4.H's algorithm.
    /// `template` carries every `NewLink` field except `short_code`, which
    /// this function fills in before each insert attempt.
    pub async fn allocate(&self, mut template: NewLink) -> Result<crate::domain::entities::Link, AppError> {
        let mut length = INITIAL_LENGTH;

        for attempt in 0..MAX_RETRIES {
            metrics::counter!("allocator_attempts_total").increment(1);

            let code = generate_code(attempt, length);
            template.short_code = code.clone();
            template.custom_alias = None;

            match self.store.insert(template.clone()).await? {
                InsertOutcome::Inserted(link) => {
                    if attempt > 0 {
                        self.collision_count.fetch_add(attempt as u64, Ordering::Relaxed);
                    }
                    return Ok(link);
                }
                InsertOutcome::DuplicateKey => {
                    metrics::counter!("allocator_collisions_total").increment(1);

                    let next_attempt = attempt + 1;
                    if next_attempt % LENGTH_GROW_EVERY == 0 {
                        length += 1;
                    }
                    if next_attempt < MAX_RETRIES {
                        tokio::time::sleep(backoff_delay(next_attempt)).await;
                    }
                }
            }
        }

        Err(AppError::invalid_input("Unable to allocate a unique short code"))
    }

    /// Reserves a caller-supplied alias instead of generating one. Does not
    /// consult the cycling strategies at all (spec §4.H).
    pub async fn allocate_custom_alias(
        &self,
        alias: &str,
        mut template: NewLink,
    ) -> Result<crate::domain::entities::Link, AppError> {
        validate_custom_alias(alias)?;

        template.short_code = alias.to_string();
        template.custom_alias = Some(alias.to_string());

        match self.store.insert(template).await? {
            InsertOutcome::Inserted(link) => Ok(link),
            InsertOutcome::DuplicateKey => Err(AppError::custom_alias_taken(alias)),
        }
    }
}

/// Validates a custom alias against spec §4.H's pattern. Uniqueness is left
/// to the store's insert.
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if !CUSTOM_ALIAS_PATTERN.is_match(alias) {
        return Err(AppError::invalid_format(
            "Custom alias must be 3-20 characters from [A-Za-z0-9_-]",
        ));
    }
    Ok(())
}

/// Generates a candidate code using the strategy selected by
/// `attempt mod 4` (spec §4.H).
fn generate_code(attempt: u32, length: usize) -> String {
    match attempt % 4 {
        0 | 3 => random_alphabet_string(length),
        1 => uuid_sha256_strategy(length),
        2 => time_base36_strategy(length),
        _ => unreachable!(),
    }
}

/// Strategy 0/3: samples `length` characters from the 62-symbol alphabet
/// using rejection sampling over cryptographically secure bytes, so every
/// symbol has equal probability.
fn random_alphabet_string(length: usize) -> String {
    let mut rng = rand::rng();
    let mut out = String::with_capacity(length);
    // 248 = 4 * 62, the largest multiple of 62 that fits in a byte; bytes at
    // or above it are rejected to avoid modulo bias.
    const REJECTION_CEILING: u8 = 248;

    while out.len() < length {
        let byte: u8 = rng.random();
        if byte >= REJECTION_CEILING {
            continue;
        }
        out.push(ALPHABET[(byte % 62) as usize] as char);
    }
    out
}

/// Strategy 1: UUIDv4 -> SHA-256 -> base64url, truncated to `length`.
fn uuid_sha256_strategy(length: usize) -> String {
    let uuid = Uuid::new_v4();
    let digest = Sha256::digest(uuid.as_bytes());
    let encoded = base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, digest);
    encoded.chars().take(length).collect()
}

/// Strategy 2: current time in base36 concatenated with a random 62-symbol
/// suffix; the last `length` characters are taken.
fn time_base36_strategy(length: usize) -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u128;
    let time_part = to_base36(millis);
    let suffix = random_alphabet_string(length);
    let combined = format!("{time_part}{suffix}");
    let start = combined.len().saturating_sub(length);
    combined[start..].to_string()
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap()
}

/// `delay = min(baseRetryDelay * 2^attempt + U(0, 0.5*baseRetryDelay*2^attempt), maxRetryDelay)`
/// (spec §4.H).
fn backoff_delay(attempt: u32) -> Duration {
    let base_millis = BASE_RETRY_DELAY.as_millis() as f64;
    let exp = base_millis * 2f64.powi(attempt as i32);
    let jitter = rand::rng().random_range(0.0..=(0.5 * exp));
    let delay_millis = (exp + jitter).min(MAX_RETRY_DELAY.as_millis() as f64);
    Duration::from_millis(delay_millis as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LinkMetadata;
    use crate::domain::repositories::MockLinkStore;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;

    fn sample_link(code: &str) -> crate::domain::entities::Link {
        crate::domain::entities::Link {
            id: 1,
            short_code: code.to_string(),
            original_url: "https://example.com/".to_string(),
            custom_alias: None,
            owner_id: 7,
            click_count: 0,
            expires_at: None,
            is_active: true,
            deleted_at: None,
            title: None,
            description: None,
            metadata: LinkMetadata {
                domain: "example.com".to_string(),
                protocol: "https".to_string(),
                path: "/".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_template() -> NewLink {
        NewLink {
            short_code: String::new(),
            original_url: "https://example.com/".to_string(),
            custom_alias: None,
            owner_id: 7,
            expires_at: None,
            title: None,
            description: None,
            metadata: LinkMetadata {
                domain: "example.com".to_string(),
                protocol: "https".to_string(),
                path: "/".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_custom_alias_accepts_valid() {
        assert!(validate_custom_alias("my-link_1").is_ok());
    }

    #[test]
    fn test_validate_custom_alias_rejects_too_short() {
        assert!(validate_custom_alias("ab").is_err());
    }

    #[test]
    fn test_validate_custom_alias_rejects_invalid_chars() {
        assert!(validate_custom_alias("bad alias!").is_err());
    }

    #[test]
    fn test_random_alphabet_string_length() {
        assert_eq!(random_alphabet_string(10).len(), 10);
    }

    #[test]
    fn test_random_alphabet_string_only_valid_chars() {
        let s = random_alphabet_string(50);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_to_base36_zero() {
        assert_eq!(to_base36(0), "0");
    }

    #[test]
    fn test_to_base36_known_value() {
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_backoff_delay_bounded_by_max() {
        for attempt in 0..20 {
            assert!(backoff_delay(attempt) <= MAX_RETRY_DELAY);
        }
    }

    #[tokio::test]
    async fn test_allocate_succeeds_on_first_attempt() {
        let mut mock = MockLinkStore::new();
        mock.expect_insert()
            .times(1)
            .returning(|new_link| Ok(InsertOutcome::Inserted(sample_link(&new_link.short_code))));

        let allocator = ShortCodeAllocator::new(Arc::new(mock));
        let result = allocator.allocate(sample_template()).await;
        assert!(result.is_ok());
        assert_eq!(allocator.collision_count(), 0);
    }

    #[tokio::test]
    async fn test_allocate_rejects_nine_then_accepts_tenth() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        let mut mock = MockLinkStore::new();
        mock.expect_insert().times(10).returning(move |new_link| {
            let n = attempts_clone.fetch_add(1, Ordering::SeqCst);
            if n < 9 {
                Ok(InsertOutcome::DuplicateKey)
            } else {
                Ok(InsertOutcome::Inserted(sample_link(&new_link.short_code)))
            }
        });

        let allocator = ShortCodeAllocator::new(Arc::new(mock));
        let result = allocator.allocate(sample_template()).await;
        assert!(result.is_ok());
        assert_eq!(allocator.collision_count(), 9);
    }

    #[tokio::test]
    async fn test_allocate_fails_after_max_retries() {
        let mut mock = MockLinkStore::new();
        mock.expect_insert()
            .times(10)
            .returning(|_| Ok(InsertOutcome::DuplicateKey));

        let allocator = ShortCodeAllocator::new(Arc::new(mock));
        let result = allocator.allocate(sample_template()).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_allocate_custom_alias_success() {
        let mut mock = MockLinkStore::new();
        mock.expect_insert()
            .times(1)
            .returning(|new_link| Ok(InsertOutcome::Inserted(sample_link(&new_link.short_code))));

        let allocator = ShortCodeAllocator::new(Arc::new(mock));
        let result = allocator.allocate_custom_alias("mylink", sample_template()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_allocate_custom_alias_duplicate_maps_to_custom_alias_taken() {
        let mut mock = MockLinkStore::new();
        mock.expect_insert().times(1).returning(|_| Ok(InsertOutcome::DuplicateKey));

        let allocator = ShortCodeAllocator::new(Arc::new(mock));
        let result = allocator.allocate_custom_alias("mylink", sample_template()).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            crate::error::ErrorKind::CustomAliasTaken
        );
    }

    #[tokio::test]
    async fn test_allocate_custom_alias_invalid_format_never_calls_store() {
        let mut mock = MockLinkStore::new();
        mock.expect_insert().times(0);

        let allocator = ShortCodeAllocator::new(Arc::new(mock));
        let result = allocator.allocate_custom_alias("x", sample_template()).await;
        assert!(result.is_err());
    }
}
