//! Fixed-capacity entity pool with non-blocking checkout
//!
//! A [`Pool`] owns `N` interchangeable entities created up front. [`Pool::take`]
//! never waits: when every entity is checked out it fails with
//! [`PoolError::Busy`] so the caller can apply its own backoff instead of
//! parking a worker that may be the only one able to free a slot.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{PoolError, PoolResult};
use super::id::IdGenerator;

/// Anything that can live in a [`Pool`]
pub trait Entity {
    /// Pool-scoped identity
    fn id(&self) -> u32;
}

impl<T: Entity + ?Sized> Entity for Box<T> {
    fn id(&self) -> u32 {
        (**self).id()
    }
}

struct PoolState<T> {
    /// Entities ready to be taken, oldest return first
    idle: VecDeque<T>,

    /// Every identity issued at construction, mapped to "currently idle"
    members: HashMap<u32, bool>,
}

/// Thread-safe checkout/return registry over a fixed set of entities
pub struct Pool<T> {
    total: u32,
    state: Mutex<PoolState<T>>,
}

impl<T: Entity> Pool<T> {
    /// Build a pool of `total` entities, each created from an identity issued by `ids`
    pub fn new<F>(total: u32, ids: &dyn IdGenerator, mut factory: F) -> PoolResult<Self>
    where
        F: FnMut(u32) -> T,
    {
        Self::try_new(total, ids, |id| Ok::<_, Infallible>(factory(id)))
    }

    /// Like [`Pool::new`] with a fallible factory
    pub fn try_new<F, E>(total: u32, ids: &dyn IdGenerator, mut factory: F) -> PoolResult<Self>
    where
        F: FnMut(u32) -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if total == 0 {
            return Err(PoolError::InvalidCapacity);
        }

        let mut idle = VecDeque::with_capacity(total as usize);
        let mut members = HashMap::with_capacity(total as usize);

        for _ in 0..total {
            let entity = factory(ids.next_id()).map_err(|e| PoolError::Factory(Box::new(e)))?;
            let id = entity.id();
            if members.insert(id, true).is_some() {
                return Err(PoolError::DuplicateEntity { id });
            }
            idle.push_back(entity);
        }

        tracing::debug!(total, "Entity pool created");

        Ok(Self {
            total,
            state: Mutex::new(PoolState { idle, members }),
        })
    }

    /// Check an entity out, failing fast with [`PoolError::Busy`] when none is idle
    pub fn take(&self) -> PoolResult<T> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let Some(entity) = state.idle.pop_front() else {
            tracing::debug!(total = self.total, "Pool exhausted");
            return Err(PoolError::Busy { total: self.total });
        };

        if let Some(idle) = state.members.get_mut(&entity.id()) {
            *idle = false;
        }

        Ok(entity)
    }

    /// Return a previously taken entity
    ///
    /// Entities this pool never issued fail with [`PoolError::InvalidEntity`];
    /// entities already idle fail with [`PoolError::AlreadyReturned`]. In both
    /// cases the passed value is dropped and the pool is left unchanged.
    pub fn give_back(&self, entity: T) -> PoolResult<()> {
        let id = entity.id();
        let mut guard = self.lock();
        let state = &mut *guard;

        match state.members.get_mut(&id) {
            None => {
                tracing::warn!(id, "Rejected entity from another pool");
                Err(PoolError::InvalidEntity { id })
            }
            Some(true) => {
                tracing::warn!(id, "Rejected duplicate return");
                Err(PoolError::AlreadyReturned { id })
            }
            Some(idle) => {
                *idle = true;
                state.idle.push_back(entity);
                Ok(())
            }
        }
    }
}

impl<T> Pool<T> {
    /// Capacity fixed at construction
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of entities currently checked out
    pub fn used(&self) -> u32 {
        self.total - self.available()
    }

    /// Number of entities ready to be taken
    pub fn available(&self) -> u32 {
        // idle never exceeds total, which is a u32
        self.lock().idle.len() as u32
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("total", &self.total)
            .field("used", &self.used())
            .finish()
    }
}
