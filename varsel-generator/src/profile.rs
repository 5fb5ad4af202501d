//! Workload profile: the fixed tables the producer draws from.
//!
//! The status table is weighted by repetition toward 2xx with a long tail
//! of 4xx/5xx, so error conditions stay rare enough to read as incidents.

use rand::seq::IndexedRandom;
use rand::Rng;

/// Endpoints and the HTTP methods valid for each.
pub const ENDPOINTS: &[(&str, &[&str])] = &[
    ("/api/v1/users", &["GET", "POST"]),
    ("/api/v1/login", &["POST"]),
    ("/api/v1/orders", &["GET", "POST"]),
    ("/health", &["GET"]),
    ("/", &["GET"]),
];

/// Status codes, weighted by repetition.
pub const WEIGHTED_STATUS_CODES: &[u16] = &[200, 200, 200, 200, 201, 400, 401, 403, 404, 500];

/// Keywords occasionally appended to messages, and the vocabulary the
/// classifier scans for.
pub const ERROR_KEYWORDS: &[&str] = &["error", "failed", "exception", "critical"];

const FIRST_NAMES: &[&str] = &[
    "anna", "bjorn", "clara", "david", "elin", "felix", "greta", "henrik", "ida", "jonas", "karin",
    "lars", "maja", "nils", "oskar", "petra", "rut", "sven", "tove", "ulf",
];

const LAST_NAMES: &[&str] = &[
    "andersson", "berg", "dahl", "ek", "forss", "gran", "holm", "lind", "nyman", "strom",
];

/// One synthetic user identity.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub username: String,
    pub ip: String,
}

/// The fixed user pool a generator draws from.
#[derive(Debug, Clone)]
pub struct WorkloadProfile {
    users: Vec<UserProfile>,
}

impl WorkloadProfile {
    /// Synthesizes a pool of `user_count` username/IP pairs.
    pub fn synthesize(user_count: usize) -> Self {
        let mut rng = rand::rng();
        let users = (0..user_count)
            .map(|_| {
                let first = FIRST_NAMES.choose(&mut rng).expect("non-empty name table");
                let last = LAST_NAMES.choose(&mut rng).expect("non-empty name table");
                UserProfile {
                    username: format!("{}_{}{}", first, last, rng.random_range(10..100)),
                    ip: synthesize_public_ip(&mut rng),
                }
            })
            .collect();
        Self { users }
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }
}

/// Draws a plausible public unicast IPv4 address.
fn synthesize_public_ip<R: Rng>(rng: &mut R) -> String {
    // First octet avoids private (10), loopback (127) and multicast ranges.
    let first = loop {
        let octet = rng.random_range(11..=223);
        if octet != 127 && octet != 172 && octet != 192 {
            break octet;
        }
    };
    format!(
        "{}.{}.{}.{}",
        first,
        rng.random_range(0..=255),
        rng.random_range(0..=255),
        rng.random_range(1..=254)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_requested_pool_size() {
        let profile = WorkloadProfile::synthesize(20);
        assert_eq!(profile.users().len(), 20);
    }

    #[test]
    fn users_have_plausible_shape() {
        let profile = WorkloadProfile::synthesize(5);
        for user in profile.users() {
            assert!(user.username.contains('_'));
            assert_eq!(user.ip.split('.').count(), 4);
        }
    }

    #[test]
    fn every_endpoint_has_a_method() {
        for (endpoint, methods) in ENDPOINTS {
            assert!(!methods.is_empty(), "no methods for {endpoint}");
        }
    }

    #[test]
    fn status_table_is_weighted_toward_success() {
        let successes = WEIGHTED_STATUS_CODES.iter().filter(|s| **s < 400).count();
        let server_errors = WEIGHTED_STATUS_CODES.iter().filter(|s| **s >= 500).count();
        assert!(successes >= WEIGHTED_STATUS_CODES.len() / 2);
        assert!(server_errors * 5 <= WEIGHTED_STATUS_CODES.len());
    }
}
