//! Typed ID definitions for all domain entities.
//!
//! ```rust,ignore
//! use review_core::common::{ReviewId, TranscriptId};
//!
//! // Incompatible types - the compiler prevents mixing them up
//! let review_id: ReviewId = ReviewId::new();
//! let transcript_id: TranscriptId = TranscriptId::new();
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (reviewers, admins, evaluators).
pub struct User;

/// Marker type for Transcript entities (documents under review).
pub struct Transcript;

/// Marker type for Review entities (one claim episode over a transcript).
pub struct Review;

/// Marker type for Wallet entities (one per user, balance in sats).
pub struct Wallet;

/// Marker type for Transaction entities (ledger rows).
pub struct Transaction;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Transcript entities.
pub type TranscriptId = Id<Transcript>;

/// Typed ID for Review entities.
pub type ReviewId = Id<Review>;

/// Typed ID for Wallet entities.
pub type WalletId = Id<Wallet>;

/// Typed ID for Transaction entities.
pub type TransactionId = Id<Transaction>;
