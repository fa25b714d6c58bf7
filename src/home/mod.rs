//! In-memory model of the controllable lamps.
//!
//! `HomeState` is a plain state machine with no I/O. `SharedHome` is the
//! handle tool handlers hold; it serialises every mutation behind one lock so
//! concurrently dispatched handlers never interleave two writes.

pub mod device;
#[cfg(test)]
mod proptests;

use crate::core::error::ToolError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

pub const DEFAULT_LAMP: &str = "lamp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lamp {
    pub name: String,
    pub on: bool,
}

/// Ordered set of lamps, unique by exact (case-sensitive) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeState {
    lamps: Vec<Lamp>,
}

impl HomeState {
    /// A home with the single default lamp, switched off.
    pub fn new() -> Self {
        Self {
            lamps: vec![Lamp {
                name: DEFAULT_LAMP.to_string(),
                on: false,
            }],
        }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self { lamps: Vec::new() }
    }

    /// Appends a switched-off lamp. A name that already exists is left
    /// untouched and `false` is returned.
    pub fn add_lamp(&mut self, name: &str) -> bool {
        if self.lamps.iter().any(|lamp| lamp.name == name) {
            debug!(lamp = name, "lamp already exists, ignoring add");
            return false;
        }
        self.lamps.push(Lamp {
            name: name.to_string(),
            on: false,
        });
        true
    }

    pub fn set_lamp(&mut self, name: &str, on: bool) -> Result<(), ToolError> {
        match self.lamps.iter_mut().find(|lamp| lamp.name == name) {
            Some(lamp) => {
                lamp.on = on;
                Ok(())
            }
            None => {
                warn!(lamp = name, "lamp not found");
                Err(ToolError::StateNotFound(name.to_string()))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lamps.iter().any(|lamp| lamp.name == name)
    }

    /// Owned copy of the lamps in insertion order.
    pub fn snapshot(&self) -> Vec<Lamp> {
        self.lamps.clone()
    }
}

impl Default for HomeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, thread-safe handle to a `HomeState`.
#[derive(Debug, Clone, Default)]
pub struct SharedHome {
    inner: Arc<Mutex<HomeState>>,
}

impl SharedHome {
    pub fn new(state: HomeState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HomeState> {
        // Every mutation leaves the state valid, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_lamp(&self, name: &str) -> bool {
        self.lock().add_lamp(name)
    }

    pub fn set_lamp(&self, name: &str, on: bool) -> Result<(), ToolError> {
        self.lock().set_lamp(name, on)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn snapshot(&self) -> Vec<Lamp> {
        self.lock().snapshot()
    }
}
