//! State management for the media tagger application.

use crate::capabilities::Capabilities;
use crate::config::Settings;
use crate::media::MediaCache;
use crate::sidecar::{SidecarStore, TagStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub mod navigation;
pub mod tags;

pub use navigation::NavigationState;
pub use tags::TagSet;

/// Locks a mutex, recovering the data if a panicking thread poisoned it.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hands out increasing ids so results of superseded loads can be ignored.
#[derive(Clone, Default)]
pub struct LoadTicket {
    latest: Arc<AtomicU64>,
}

impl LoadTicket {
    /// Starts a new load, invalidating every earlier ticket.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::Acquire) == ticket
    }
}

/// Application-wide state container.
pub struct AppState {
    pub navigation: Arc<Mutex<NavigationState>>,
    /// LRU cache for opened media.
    pub media_cache: Arc<Mutex<MediaCache>>,
    pub tag_store: Arc<dyn TagStore>,
    pub capabilities: Capabilities,
    pub settings: Settings,
    pub load_ticket: LoadTicket,
}

impl AppState {
    pub fn new(settings: Settings, capabilities: Capabilities) -> Self {
        Self {
            navigation: Arc::new(Mutex::new(NavigationState::new())),
            media_cache: Arc::new(Mutex::new(MediaCache::new(settings.cache_capacity))),
            tag_store: Arc::new(SidecarStore::new()),
            capabilities,
            settings,
            load_ticket: LoadTicket::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let tickets = LoadTicket::default();
        let first = tickets.issue();
        let second = tickets.issue();
        assert!(!tickets.is_current(first));
        assert!(tickets.is_current(second));
    }

    #[test]
    fn cloned_tickets_share_the_counter() {
        let tickets = LoadTicket::default();
        let other = tickets.clone();
        let first = tickets.issue();
        other.issue();
        assert!(!tickets.is_current(first));
    }
}
