//! Typed key-value store with per-key subscriptions
//!
//! Every key holds a current value from construction onwards. Publishing a
//! key stores the new value and then synchronously calls that key's
//! subscribers in the order they were registered.

use std::fmt;

use super::{EngineSnapshot, TimeSpec, TimerState};

/// Callback invoked with the freshly published value
pub type Handler<T> = Box<dyn FnMut(&T) + Send>;

/// Storage and subscriber list for a single key
pub struct Topic<T> {
    value: T,
    subscribers: Vec<Handler<T>>,
}

impl<T> Topic<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    fn publish(&mut self, value: T) {
        self.value = value;
        let value = &self.value;
        for handler in self.subscribers.iter_mut() {
            handler(value);
        }
    }

    fn subscribe(&mut self, handler: Handler<T>) {
        self.subscribers.push(handler);
    }
}

/// A key on the [`StateBus`], carrying its value type
pub trait BusKey {
    type Value: Clone;

    fn topic(bus: &StateBus) -> &Topic<Self::Value>;
    fn topic_mut(bus: &mut StateBus) -> &mut Topic<Self::Value>;
}

macro_rules! bus_keys {
    ($($(#[$meta:meta])* $key:ident => $field:ident: $ty:ty),* $(,)?) => {
        /// Marker types naming each key of the bus
        pub mod keys {
            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy)]
                pub struct $key;
            )*
        }

        /// State bus holding the engine snapshot, one topic per field
        pub struct StateBus {
            $($field: Topic<$ty>,)*
        }

        impl StateBus {
            /// Create a bus seeded from a snapshot
            pub fn new(initial: EngineSnapshot) -> Self {
                Self {
                    $($field: Topic::new(initial.$field),)*
                }
            }

            /// Current contents of every key
            pub fn snapshot(&self) -> EngineSnapshot {
                EngineSnapshot {
                    $($field: self.$field.value,)*
                }
            }
        }

        $(
            impl BusKey for keys::$key {
                type Value = $ty;

                fn topic(bus: &StateBus) -> &Topic<$ty> {
                    &bus.$field
                }

                fn topic_mut(bus: &mut StateBus) -> &mut Topic<$ty> {
                    &mut bus.$field
                }
            }
        )*
    };
}

bus_keys! {
    Status => status: TimerState,
    TimeSpecKey => time_spec: TimeSpec,
    TotalSeconds => total_seconds: u64,
    ElapsedSeconds => elapsed_seconds: u64,
    /// Engine bookkeeping; not part of the presentation protocol
    ReferenceTimestamp => reference_timestamp: i64,
    /// Engine bookkeeping; not part of the presentation protocol
    PausedAccumulatedMs => paused_accumulated_ms: i64,
}

impl StateBus {
    /// Store a value under `K` and notify its subscribers
    pub fn publish<K: BusKey>(&mut self, value: K::Value) {
        K::topic_mut(self).publish(value);
    }

    /// Register a handler for every future publish of `K`
    pub fn subscribe<K, F>(&mut self, handler: F)
    where
        K: BusKey,
        F: FnMut(&K::Value) + Send + 'static,
    {
        K::topic_mut(self).subscribe(Box::new(handler));
    }

    /// Last published (or initial) value of `K`
    pub fn current<K: BusKey>(&self) -> K::Value {
        K::topic(self).value.clone()
    }
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new(EngineSnapshot::default())
    }
}

impl fmt::Debug for StateBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateBus")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
