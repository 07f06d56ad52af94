//! Shared test doubles
//!
//! - `FakeCache`: in-memory cache with a manual clock for TTL tests
//! - `FakeProvider`: canned provider bodies with call counting

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use geolocator::cache::LocationCache;
use geolocator::errors::{GeolocatorError, Result};
use geolocator::services::{GeoProvider, LookupService};

pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub const GOOGLE_DNS_BODY: &str = r#"{
    "ip": "8.8.8.8",
    "type": "ipv4",
    "continent_code": "NA",
    "continent_name": "North America",
    "country_code": "US",
    "country_name": "United States",
    "region_code": "CA",
    "region_name": "California",
    "city": "Mountain View",
    "zip": "94043",
    "latitude": 37.419158935546875,
    "longitude": -122.07540893554688,
    "location": {
        "geoname_id": 5375480,
        "capital": "Washington D.C.",
        "languages": [{"code": "en", "name": "English", "native": "English"}],
        "country_flag": "https://assets.ipstack.com/flags/us.svg",
        "country_flag_emoji": "🇺🇸",
        "country_flag_emoji_unicode": "U+1F1FA U+1F1F8",
        "calling_code": "1",
        "is_eu": false
    }
}"#;

pub const INVALID_KEY_BODY: &str = r#"{
    "success": false,
    "error": {
        "code": 101,
        "type": "invalid_access_key",
        "info": "You have not supplied a valid API Access Key."
    }
}"#;

/// Seconds since an arbitrary epoch, advanced by hand
#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

pub struct FakeCache {
    entries: RwLock<HashMap<String, (String, u64)>>,
    pub clock: Arc<ManualClock>,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FakeCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock: Arc::new(ManualClock::default()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Raw stored value, ignoring expiry
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).map(|(v, _)| v.clone())
    }

    pub async fn put_raw(&self, key: &str, value: &str) {
        let expires_at = self.clock.now() + TTL.as_secs();
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl LocationCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GeolocatorError::cache("connection reset"));
        }

        let now = self.clock.now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GeolocatorError::cache("read-only replica"));
        }

        let expires_at = self.clock.now() + ttl.as_secs();
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct FakeProvider {
    responses: RwLock<HashMap<String, Result<String>>>,
    default: Result<String>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    /// Every IP answers with `body`
    pub fn answering(body: &str) -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default: Ok(body.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: GeolocatorError) -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn respond_for(&self, ip: &str, response: Result<String>) {
        self.responses
            .write()
            .await
            .insert(ip.to_string(), response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoProvider for FakeProvider {
    async fn fetch(&self, ip: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.read().await.get(ip) {
            Some(response) => response.clone(),
            None => self.default.clone(),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub fn lookup_service(cache: Arc<FakeCache>, provider: Arc<FakeProvider>) -> LookupService {
    LookupService::new(cache, provider, TTL)
}
