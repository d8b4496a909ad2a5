// SPDX-License-Identifier: MPL-2.0
//! Core toast data structures.
//!
//! This module defines the `Toast` struct and `Kind` enum used throughout
//! the notification store.

use std::time::Duration;
use tokio::time::Instant;

/// Unique identifier for a toast.
///
/// Ids are allocated by the owning [`ToastStore`](crate::ToastStore),
/// strictly increase over the store's lifetime, and are never reused even
/// after the toast is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToastId(u64);

impl ToastId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of this id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Kind tag determining visual styling.
///
/// The tag is opaque to the store: it affects presentation only, never
/// lifetime or ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// Operation completed successfully.
    Success,
    /// Something went wrong.
    Error,
    /// Warning that doesn't block operation.
    Warning,
    /// Informational message.
    #[default]
    Info,
}

impl Kind {
    /// Returns the lowercase tag name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Success => "success",
            Kind::Error => "error",
            Kind::Warning => "warning",
            Kind::Info => "info",
        }
    }
}

/// Unrecognized tags fall back to [`Kind::Info`].
impl From<&str> for Kind {
    fn from(tag: &str) -> Self {
        match tag {
            "success" => Kind::Success,
            "error" => Kind::Error,
            "warning" => Kind::Warning,
            _ => Kind::Info,
        }
    }
}

/// A single notification instance.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Unique identifier for this toast.
    id: ToastId,
    /// Display text, opaque to the store (not validated or sanitized).
    message: String,
    /// Kind tag (affects presentation only).
    kind: Kind,
    /// Requested lifetime; `None` means persistent (never auto-expires).
    duration: Option<Duration>,
    /// When this toast was created.
    created_at: Instant,
    /// Cached time left before expiry, recomputed on each tick.
    remaining: Duration,
}

impl Toast {
    /// Creates a toast at `now`. A zero `duration` is normalized to
    /// persistent, matching the "non-positive means never auto-expire"
    /// contract.
    pub(crate) fn new(
        id: ToastId,
        message: String,
        kind: Kind,
        duration: Option<Duration>,
        now: Instant,
    ) -> Self {
        let duration = duration.filter(|d| !d.is_zero());
        Self {
            id,
            message,
            kind,
            duration,
            created_at: now,
            remaining: duration.unwrap_or(Duration::ZERO),
        }
    }

    /// Returns the toast's unique ID.
    #[must_use]
    pub fn id(&self) -> ToastId {
        self.id
    }

    /// Returns the display text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the kind tag.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the requested lifetime, or `None` for a persistent toast.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Returns when this toast was created.
    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Returns the cached time left before expiry, as of the last tick.
    ///
    /// Zero for persistent toasts, whose countdown never runs.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Returns whether this toast is exempt from automatic expiry.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.duration.is_none()
    }

    /// Returns the percentage of lifetime left, in `[0, 100]`.
    ///
    /// Persistent toasts always read `100` (shown as full). An expired but
    /// not yet swept toast reads `0`.
    #[must_use]
    pub fn time_left_percentage(&self) -> f32 {
        match self.duration {
            None => 100.0,
            Some(total) => {
                (self.remaining.as_secs_f32() / total.as_secs_f32() * 100.0).clamp(0.0, 100.0)
            }
        }
    }

    /// Recomputes `remaining` against `now`, clamped at zero.
    pub(crate) fn refresh_remaining(&mut self, now: Instant) {
        if let Some(total) = self.duration {
            self.remaining = total.saturating_sub(now.duration_since(self.created_at));
        }
    }

    /// Returns whether this toast's lifetime has strictly elapsed.
    ///
    /// A toast sitting exactly at its deadline still reads `remaining == 0`
    /// but survives until the next tick, so "expired but not yet swept" is
    /// an observable state.
    pub(crate) fn is_past_deadline(&self, now: Instant) -> bool {
        match self.duration {
            Some(total) => now.duration_since(self.created_at) > total,
            None => false,
        }
    }
}
