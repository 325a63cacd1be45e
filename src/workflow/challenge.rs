//! Security Challenge Protocol
//!
//! One-time-password sessions gating transfer submission. A session binds
//! to a single draft identity; editing the draft strands the session. The
//! secret and the comparison live on this side of the trust boundary - a
//! client only ever submits a code and receives an opaque result.
//!
//! # Safety Invariants
//!
//! 1. **Single-use**: an accepted session can never accept again
//! 2. **Atomic decrement**: concurrent verifies serialize behind the
//!    session lock, so attempts are never lost to a race
//! 3. **Trusted clock**: expiry is checked against a monotonic `Instant`
//!    supplied by the coordinator, never user time
//! 4. **Constant-time compare**: code comparison leaks no timing signal

use std::fmt;
use std::sync::Mutex;
use std::time::Instant;

use rand::Rng;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::config::ChallengeConfig;

use super::draft::DraftIdentity;

/// Required OTP length; shorter or longer input is rejected before any
/// server attempt is consumed.
pub const CODE_LEN: usize = 6;

/// Outcome of one `verify` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyResult {
    /// Code matched; session is now consumed
    Accepted,
    /// Wrong code, malformed code, or stale draft identity
    Rejected,
    /// No attempts remain; session must be reissued
    Exhausted,
    /// Session lapsed before a correct code arrived
    Expired,
    /// Session already accepted once; it will never accept again
    AlreadyUsed,
}

impl VerifyResult {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerifyResult::Accepted)
    }

    /// Terminal results require a fresh `issue`, not another attempt
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VerifyResult::Exhausted | VerifyResult::Expired | VerifyResult::AlreadyUsed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyResult::Accepted => "ACCEPTED",
            VerifyResult::Rejected => "REJECTED",
            VerifyResult::Exhausted => "EXHAUSTED",
            VerifyResult::Expired => "EXPIRED",
            VerifyResult::AlreadyUsed => "ALREADY_USED",
        }
    }
}

impl fmt::Display for VerifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable session state, serialized behind the lock
#[derive(Debug)]
struct SessionState {
    attempts_remaining: u8,
    consumed: bool,
}

/// One outstanding OTP challenge bound to exactly one draft identity.
///
/// Created when the user confirms the reviewed draft; dead on success,
/// exhaustion, expiry, or cancel. Reissuing resets attempts and expiry by
/// replacing the session object outright.
pub struct ChallengeSession {
    code: String,
    bound: DraftIdentity,
    issued_at: Instant,
    expires_at: Instant,
    state: Mutex<SessionState>,
}

impl ChallengeSession {
    /// Issue a fresh session with a random 6-digit code.
    pub fn issue(bound: DraftIdentity, config: &ChallengeConfig) -> Self {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
        Self::with_code(code, bound, config)
    }

    /// Build a session with a known code (deterministic tests, demo).
    pub fn with_code(code: String, bound: DraftIdentity, config: &ChallengeConfig) -> Self {
        debug_assert_eq!(code.len(), CODE_LEN);
        let now = Instant::now();
        debug!(bound = %bound, ttl_secs = config.ttl_secs, "challenge issued");
        Self {
            code,
            bound,
            issued_at: now,
            expires_at: now + config.ttl(),
            state: Mutex::new(SessionState {
                attempts_remaining: config.max_attempts,
                consumed: false,
            }),
        }
    }

    /// The secret, for the delivery channel only (SMS/app push in a real
    /// deployment). Never echo this back to the submitting client.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bound(&self) -> DraftIdentity {
        self.bound
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    pub fn attempts_remaining(&self) -> u8 {
        self.state.lock().unwrap().attempts_remaining
    }

    pub fn is_consumed(&self) -> bool {
        self.state.lock().unwrap().consumed
    }

    /// Verify a submitted code against this session at time `now`.
    ///
    /// Check order matters:
    /// 1. Malformed code: rejected without consuming an attempt
    /// 2. Stale draft identity: rejected without consuming an attempt
    /// 3. Expired: reported without consuming an attempt
    /// 4. Already accepted once: never re-accepts
    /// 5. No attempts left: exhausted regardless of code correctness
    /// 6. Constant-time compare; mismatch consumes one attempt and is
    ///    reported as `Rejected` even when it consumes the last one - the
    ///    *next* call reports `Exhausted`
    pub fn verify(&self, submitted: &str, current: DraftIdentity, now: Instant) -> VerifyResult {
        if submitted.len() != CODE_LEN {
            debug!(bound = %self.bound, "code length gate rejected submission");
            return VerifyResult::Rejected;
        }

        if current != self.bound {
            warn!(
                bound = %self.bound,
                current = %current,
                "verify against stale draft identity rejected"
            );
            return VerifyResult::Rejected;
        }

        if self.is_expired(now) {
            return VerifyResult::Expired;
        }

        let mut state = self.state.lock().unwrap();

        if state.consumed {
            return VerifyResult::AlreadyUsed;
        }

        if state.attempts_remaining == 0 {
            return VerifyResult::Exhausted;
        }

        if bool::from(self.code.as_bytes().ct_eq(submitted.as_bytes())) {
            state.consumed = true;
            VerifyResult::Accepted
        } else {
            state.attempts_remaining -= 1;
            debug!(
                bound = %self.bound,
                attempts_remaining = state.attempts_remaining,
                "wrong code"
            );
            VerifyResult::Rejected
        }
    }

    /// Verify against the trusted monotonic clock.
    pub fn verify_now(&self, submitted: &str, current: DraftIdentity) -> VerifyResult {
        self.verify(submitted, current, Instant::now())
    }
}

impl fmt::Debug for ChallengeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The code stays out of Debug output on purpose
        f.debug_struct("ChallengeSession")
            .field("bound", &self.bound)
            .field("attempts_remaining", &self.attempts_remaining())
            .field("consumed", &self.is_consumed())
            .finish()
    }
}
