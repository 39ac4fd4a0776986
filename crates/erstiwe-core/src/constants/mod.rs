// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Field bounds, token generation parameters, env var names and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Maximum stored lengths of registrant fields (in characters)
///
/// Values beyond these bounds are clipped, never rejected.
pub mod field_limits {
    /// Email address
    pub const EMAIL: usize = 45;
    /// First name
    pub const FIRST_NAME: usize = 45;
    /// Last name
    pub const LAST_NAME: usize = 45;
    /// Combined address (street, post code, city)
    pub const ADDRESS: usize = 200;
    /// Mobile phone number
    pub const PHONE: usize = 20;
    /// Free-text comment
    pub const COMMENT: usize = 500;
}

/// Token generation parameters
pub mod tokens {
    /// Alphabet of generated tokens (base-36, lowercase)
    pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    /// Length of a generated register or email token
    pub const LENGTH: usize = 8;
    /// Default K in the K·count candidate ceiling of one generation round
    pub const DEFAULT_RETRY_FACTOR: usize = 10;
    /// Rounds of collision replacement against persisted tokens before giving up
    pub const MAX_COLLISION_ROUNDS: usize = 5;
    /// Default maximum size of a single token batch
    pub const DEFAULT_BATCH_LIMIT: usize = 500;
}

/// Token state column values
pub mod token_states {
    /// Token not yet used for registration
    pub const FREE: &str = "free";
    /// Token used by a registrant
    pub const REGISTERED: &str = "registered";
    /// Registrant gave the slot back
    pub const OPTED_OUT: &str = "opted_out";
}

/// Database defaults
pub mod database {
    /// Default `SQLite` database location
    pub const DEFAULT_URL: &str = "sqlite:./data/erstiwe.db";
    /// Default connection pool size
    pub const DEFAULT_POOL_SIZE: u32 = 10;
    /// Default connection acquire timeout in seconds
    pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
    /// Default per-query timeout in seconds
    pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;
    /// Default `SQLite` busy timeout in milliseconds
    pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
    /// Retries for transactions failing on a locked database
    pub const TRANSACTION_RETRIES: u32 = 3;
    /// Upper bound on bound parameters per collision lookup
    pub const LOOKUP_CHUNK_SIZE: usize = 500;
}

/// Notification defaults
pub mod notifications {
    /// Default webhook request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
}

/// Export defaults
pub mod export {
    /// Default file name prefix of exported snapshots
    pub const DEFAULT_PREFIX: &str = "erstiwe";
    /// Suffix of the registrant snapshot
    pub const ATTENDEES: &str = "attendees";
    /// Suffix of the waitlist snapshot
    pub const WAITING_LIST: &str = "waitinglist";
    /// Suffix of the successor snapshot
    pub const SUCCESSORS: &str = "successors";
}

/// Service identification
pub mod service_names {
    /// Service name used in structured logs
    pub const ERSTIWE_REGISTRATION: &str = "erstiwe-registration";
}

/// Environment variable names
pub mod env_config {
    /// Current event year
    pub const EVENT_YEAR: &str = "EVENT_YEAR";
    /// Maximum tokens per batch
    pub const TOKEN_BATCH_LIMIT: &str = "TOKEN_BATCH_LIMIT";
    /// Candidate ceiling factor for token generation
    pub const TOKEN_RETRY_FACTOR: &str = "TOKEN_RETRY_FACTOR";
    /// Database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Connection pool size
    pub const DB_POOL_SIZE: &str = "DB_POOL_SIZE";
    /// Connection acquire timeout
    pub const DB_ACQUIRE_TIMEOUT_SECS: &str = "DB_ACQUIRE_TIMEOUT_SECS";
    /// Per-query timeout
    pub const DB_QUERY_TIMEOUT_SECS: &str = "DB_QUERY_TIMEOUT_SECS";
    /// `SQLite` busy timeout
    pub const DB_BUSY_TIMEOUT_MS: &str = "DB_BUSY_TIMEOUT_MS";
    /// Notification webhook endpoint
    pub const NOTIFY_WEBHOOK_URL: &str = "NOTIFY_WEBHOOK_URL";
    /// Notification request timeout
    pub const NOTIFY_TIMEOUT_SECS: &str = "NOTIFY_TIMEOUT_SECS";
    /// Export directory
    pub const EXPORT_DIR: &str = "EXPORT_DIR";
    /// Export file name prefix
    pub const EXPORT_PREFIX: &str = "EXPORT_PREFIX";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}
