//! Notification list and the unread counter badge.

use crate::error::Error;
use crate::models::Notification;
use crate::optimistic::{OptimisticList, Removal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const NO_NOTIFICATIONS: &str = "No notifications yet.";

/// Unread notification count shared between the realtime feed, which
/// increments it, and the notifications screen, which resets it on view.
#[derive(Debug, Clone, Default)]
pub struct NotificationCounter {
    count: Arc<AtomicUsize>,
}

impl NotificationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct NotificationsView {
    items: OptimisticList<Notification>,
    loaded: bool,
}

impl NotificationsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Notification] {
        self.items.items()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn replace(&mut self, items: Vec<Notification>) {
        self.items.replace(items);
        self.loaded = true;
    }

    /// Keep what is already shown.
    pub fn fetch_failed(&mut self, error: &Error) {
        log::warn!("Failed to fetch notifications: {}", error);
        self.loaded = true;
    }

    /// A realtime notification goes on top.
    pub fn prepend(&mut self, notification: Notification) {
        if !self.items.contains(&notification.id) {
            self.items.push_front(notification);
        }
    }

    /// Take a follow request off the list while the answer is in flight.
    pub fn resolve_request(&mut self, notification_id: &str) -> Option<Removal<Notification>> {
        self.items.remove(notification_id)
    }

    pub fn restore(&mut self, removal: Removal<Notification>, error: &Error) {
        log::warn!(
            "Failed to answer follow request {}: {}",
            removal.item.id,
            error
        );
        self.items.rollback(removal);
    }

    pub fn empty_label(&self) -> Option<&'static str> {
        (self.loaded && self.items.is_empty()).then_some(NO_NOTIFICATIONS)
    }
}
