//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use generational_arena::{Arena, Index};
use tokio::time::Instant;

pub type TimerHandle = Index;

// What to do with a timer after it fired.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerAction {
    // Drop the timer.
    Remove,
    // Fire again after the given interval.
    Reschedule(Duration),
}

// Receiver of timer expirations.
pub trait TimerHandler<K> {
    // Called once for every due timer. The wheel is handed back so that the
    // handler can arm, disarm or cancel other timers (or this one).
    fn fire(&mut self, timers: &mut TimerWheel<K>, key: &K) -> TimerAction;
}

//
// Software timer wheel.
//
// Timers live in a flat arena and are scanned linearly on every tick. The
// number of armed timers is roughly the number of advertising interfaces
// plus the prefixes being withdrawn, so a heap isn't worth the trouble.
//
// A timer is created inert by `schedule` and only expires after `arm`.
// Re-arming replaces the previous deadline, so a timer can't fire twice for
// the same arm.
//
#[derive(Debug)]
pub struct TimerWheel<K> {
    timers: Arena<Timer<K>>,
    next: Option<Instant>,
}

#[derive(Debug)]
struct Timer<K> {
    key: K,
    expiry: Option<Instant>,
}

// ===== impl TimerWheel =====

impl<K> TimerWheel<K>
where
    K: Clone,
{
    pub fn new() -> TimerWheel<K> {
        TimerWheel {
            timers: Arena::new(),
            next: None,
        }
    }

    // Registers a new inert timer.
    pub fn schedule(&mut self, key: K) -> TimerHandle {
        self.timers.insert(Timer { key, expiry: None })
    }

    // Sets the timer to expire `duration` from now.
    //
    // Unknown handles are ignored.
    pub fn arm(&mut self, handle: TimerHandle, duration: Duration) {
        let expiry = Instant::now() + duration;
        let Some(timer) = self.timers.get_mut(handle) else {
            return;
        };
        let old = timer.expiry.replace(expiry);

        if old.is_some() && old == self.next {
            self.update_next();
        } else if self.next.is_none_or(|next| expiry < next) {
            self.next = Some(expiry);
        }
    }

    // Makes the timer inert again without releasing its handle.
    pub fn disarm(&mut self, handle: TimerHandle) {
        let Some(timer) = self.timers.get_mut(handle) else {
            return;
        };
        if timer.expiry.take().is_some_and(|old| Some(old) == self.next) {
            self.update_next();
        }
    }

    // Removes the timer and frees its handle. Safe on unarmed and unknown
    // handles.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<K> {
        let timer = self.timers.remove(handle)?;
        if timer.expiry.is_some() && timer.expiry == self.next {
            self.update_next();
        }
        Some(timer.key)
    }

    // Returns the time left before the timer expires, or `None` if the timer
    // isn't armed.
    pub fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        self.expiry(handle)
            .map(|expiry| expiry.saturating_duration_since(Instant::now()))
    }

    // Returns the absolute expiration of the timer, if armed.
    pub fn expiry(&self, handle: TimerHandle) -> Option<Instant> {
        self.timers.get(handle).and_then(|timer| timer.expiry)
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.expiry(handle).is_some()
    }

    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.timers.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    // Returns the soonest expiration across all armed timers.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.next
    }

    // Fires every timer whose expiration is due.
    //
    // Returns the time left until the next expiration (zero if it's already
    // past), or `None` if no timer is armed.
    pub fn tick<H>(&mut self, handler: &mut H) -> Option<Duration>
    where
        H: TimerHandler<K>,
    {
        let now = Instant::now();
        let due = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.is_due(now))
            .map(|(handle, _)| handle)
            .collect::<Vec<_>>();

        for handle in due {
            // An earlier handler might have cancelled or re-armed this timer.
            let Some(timer) = self.timers.get_mut(handle) else {
                continue;
            };
            if !timer.is_due(now) {
                continue;
            }
            timer.expiry = None;
            let key = timer.key.clone();

            match handler.fire(self, &key) {
                TimerAction::Remove => {
                    self.timers.remove(handle);
                }
                TimerAction::Reschedule(interval) => {
                    if let Some(timer) = self.timers.get_mut(handle) {
                        timer.expiry = Some(now + interval);
                    }
                }
            }
        }

        self.update_next();
        self.next
            .map(|next| next.saturating_duration_since(Instant::now()))
    }

    fn update_next(&mut self) {
        self.next = self
            .timers
            .iter()
            .filter_map(|(_, timer)| timer.expiry)
            .min();
    }
}

impl<K> Default for TimerWheel<K>
where
    K: Clone,
{
    fn default() -> TimerWheel<K> {
        TimerWheel::new()
    }
}

// ===== impl Timer =====

impl<K> Timer<K> {
    fn is_due(&self, now: Instant) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

// ===== unit tests =====
