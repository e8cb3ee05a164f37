//! # Invoice Numbers
//!
//! Human-readable invoice numbers for new sales.
//!
//! ## Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout:              INV/0125/4821                                   │
//! │  Manual, auto-numbered: INV/M/0125/4822                                 │
//! │  Manual, supplied:      whatever the admin typed (trimmed)              │
//! │                              │    │                                     │
//! │                              │    └── last 4 digits of a monotonic      │
//! │                              │        millisecond clock reading         │
//! │                              └─────── MMYY in the business UTC offset   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numbers are not guaranteed unique here. The store's unique constraint is
//! the only authority, and a collision surfaces as a conflict to the caller.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for numbering and default dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Which creation path a number is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceKind {
    Checkout,
    Manual,
}

/// Generates invoice numbers from a monotonic millisecond tick.
///
/// Two calls in the same millisecond still get different ticks, so numbers
/// handed out by one process only repeat after 10 000 calls within a month.
pub struct InvoiceNumberGenerator {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    last_tick: AtomicI64,
}

impl InvoiceNumberGenerator {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        InvoiceNumberGenerator {
            clock,
            offset,
            last_tick: AtomicI64::new(0),
        }
    }

    /// Current instant according to the generator's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The business UTC offset used for MMYY.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// next = max(now_ms, last + 1)
    fn next_tick(&self) -> i64 {
        let now_ms = self.clock.now().timestamp_millis();
        let mut last = self.last_tick.load(Ordering::Relaxed);
        loop {
            let next = now_ms.max(last.saturating_add(1));
            match self.last_tick.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }

    /// Renders a number for `kind`, taking month and year from `reference`.
    pub fn generate(&self, kind: InvoiceKind, reference: DateTime<Utc>) -> String {
        let mmyy = reference.with_timezone(&self.offset).format("%m%y");
        let seq = self.next_tick().rem_euclid(10_000);
        match kind {
            InvoiceKind::Checkout => format!("INV/{}/{:04}", mmyy, seq),
            InvoiceKind::Manual => format!("INV/M/{}/{:04}", mmyy, seq),
        }
    }

    /// Number for a customer checkout happening now.
    pub fn checkout(&self) -> String {
        self.generate(InvoiceKind::Checkout, self.now())
    }

    /// Number for a manual invoice.
    ///
    /// `supplied` must already be trimmed and length-checked; when present it
    /// is returned unchanged.
    pub fn manual(&self, supplied: Option<String>, transaction_date: DateTime<Utc>) -> String {
        match supplied {
            Some(number) => number,
            None => self.generate(InvoiceKind::Manual, transaction_date),
        }
    }
}

impl std::fmt::Debug for InvoiceNumberGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceNumberGenerator")
            .field("offset", &self.offset)
            .field("last_tick", &self.last_tick.load(Ordering::Relaxed))
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
