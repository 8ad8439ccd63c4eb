//! Display identity assignment for joined connections.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of a display identity.
const IDENTITY_LEN: usize = 8;

/// Produce a fresh display identity: 8 alphanumeric characters from the
/// thread-local generator. Identities are cosmetic attribution labels only;
/// collisions are tolerated, not retried.
pub fn assign() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(IDENTITY_LEN)
        .map(char::from)
        .collect()
}
