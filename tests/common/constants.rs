//! Shared constants for end-to-end tests
//!
//! When the fake catalog or the test credentials change, update only this file.

// ============================================================================
// Test Credentials
// ============================================================================

pub const CLIENT_ID: &str = "test-client-id";

pub const CLIENT_SECRET: &str = "test-client-secret";

/// `Basic` credentials the fake accounts service expects for the pair above.
pub const CLIENT_BASIC_AUTH: &str = "Basic dGVzdC1jbGllbnQtaWQ6dGVzdC1jbGllbnQtc2VjcmV0";

pub const REFRESH_TOKEN: &str = "test-refresh-token";

/// A user token the fake API accepts without going through the accounts service.
pub const STATIC_ACCESS_TOKEN: &str = "static-user-token";

// ============================================================================
// Fake Catalog
// ============================================================================

/// Genres ["Jazz", "Fusion"]
pub const JAZZ_ARTIST_ID: &str = "123";

/// Genres ["rock", "classic rock"]
pub const ROCK_ARTIST_ID: &str = "456";

/// Genres ["hip hop"], which has no preset of its own
pub const SPACED_GENRE_ARTIST_ID: &str = "654";

/// No genres at all
pub const NO_GENRES_ARTIST_ID: &str = "789";

/// Not in the catalog, answered with 404
pub const MISSING_ARTIST_ID: &str = "000";

/// Answered with 500
pub const FAILING_ARTIST_ID: &str = "500";

/// Answered with 429
pub const RATE_LIMITED_ARTIST_ID: &str = "429";

// ============================================================================
// Expected Presets
// ============================================================================

pub const JAZZ_GAINS: [i8; 10] = [2, 1, 0, 1, 2, -1, -2, -1, 1, 2];

pub const ROCK_GAINS: [i8; 10] = [4, 3, 2, 0, -1, -1, 2, 3, 3, 4];

pub const FLAT_GAINS: [i8; 10] = [0; 10];

// ============================================================================
// Timing
// ============================================================================

/// Upper bound for anything a test waits on
pub const WAIT_TIMEOUT_MS: u64 = 5000;

/// Player poll interval used by agent tests
pub const PLAYER_POLL_INTERVAL_MS: u64 = 10;
