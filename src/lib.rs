// SPDX-License-Identifier: MPL-2.0
//! `toasts` is an in-memory store for transient toast notifications.
//!
//! It follows toast/snackbar UX patterns: messages appear temporarily to
//! inform users about actions (save success, errors, etc.) and decay on
//! their own, without blocking interaction. The store is independent of any
//! rendering technology; a UI layer observes it through a plain
//! subscribe/notify interface and adapts it to its own reactive primitives
//! at the boundary.
//!
//! # Components
//!
//! - [`toast`] - Core [`Toast`] struct with kind tags and countdown state
//! - [`store`] - [`ToastStore`] owning the live set and the shared sweep timer
//!
//! # Usage
//!
//! ```ignore
//! use toasts::ToastStore;
//!
//! // One constructible store; the host decides its lifetime.
//! let store = ToastStore::new();
//!
//! // Push notifications from anywhere that holds a (cheap) clone.
//! let id = store.success("Image saved");
//! store.remove(id); // e.g. on a dismiss click
//!
//! // Observe state changes to drive re-rendering.
//! let sub = store.subscribe(|toasts| render(toasts));
//! ```
//!
//! # Design Considerations
//!
//! - A single shared 100 ms sweep timer, not one timer per toast: toasts
//!   expiring within the same window leave in one state transition.
//! - The timer is armed lazily on the first insert and released the moment
//!   the store empties or is dropped; it never outlives its store.
//! - Non-positive requested durations mean "persistent": shown until
//!   explicitly removed.

pub mod store;
pub mod toast;

pub use store::{SubscriberId, ToastStore, DEFAULT_DURATION, TICK_INTERVAL};
pub use toast::{Kind, Toast, ToastId};

#[cfg(test)]
mod test_utils;
