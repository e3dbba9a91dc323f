//! Cancellable per-phase scheduler. Times are caller-supplied seconds.

use smallvec::SmallVec;

/// Shortest repeat period accepted by [`Timeline::every`].
pub const MIN_PERIOD_SEC: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<A> {
    id: TimerId,
    due: f64,
    every: Option<f64>,
    seq: u64,
    action: A,
}

#[derive(Debug)]
pub struct Timeline<A> {
    entries: Vec<Entry<A>>,
    next_id: u64,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<A: Clone> Timeline<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn after(&mut self, now: f64, delay: f64, action: A) -> TimerId {
        self.push(now + delay.max(0.0), None, action)
    }

    /// Repeat `action` every `period` seconds, first firing one period from
    /// `now`. Periods below [`MIN_PERIOD_SEC`] are raised to it.
    pub fn every(&mut self, now: f64, period: f64, action: A) -> TimerId {
        let period = if period.is_finite() {
            period.max(MIN_PERIOD_SEC)
        } else {
            MIN_PERIOD_SEC
        };
        self.push(now + period, Some(period), action)
    }

    /// Queue `(action, delay)` steps back to back; each delay counts from
    /// the previous step.
    pub fn sequence<I>(&mut self, now: f64, steps: I) -> SmallVec<[TimerId; 16]>
    where
        I: IntoIterator<Item = (A, f64)>,
    {
        let mut at = now;
        steps
            .into_iter()
            .map(|(action, delay)| {
                at += delay.max(0.0);
                self.push(at, None, action)
            })
            .collect()
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Remove and return every action due at `now`, earliest first (ties in
    /// scheduling order). A repeating entry fires at most once per call and
    /// skips any periods it missed.
    pub fn due(&mut self, now: f64) -> SmallVec<[A; 4]> {
        let mut ready: SmallVec<[(f64, u64, A); 4]> = SmallVec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due > now {
                i += 1;
                continue;
            }
            match self.entries[i].every {
                Some(period) => {
                    let e = &mut self.entries[i];
                    ready.push((e.due, e.seq, e.action.clone()));
                    let missed = ((now - e.due) / period).floor().max(0.0);
                    e.due += missed * period + period;
                    if e.due <= now {
                        e.due = now + period;
                    }
                    i += 1;
                }
                None => {
                    let e = self.entries.swap_remove(i);
                    ready.push((e.due, e.seq, e.action));
                }
            }
        }
        ready.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ready.into_iter().map(|(_, _, a)| a).collect()
    }

    fn push(&mut self, due: f64, every: Option<f64>, action: A) -> TimerId {
        let seq = self.next_id;
        self.next_id += 1;
        let id = TimerId(seq);
        self.entries.push(Entry {
            id,
            due,
            every,
            seq,
            action,
        });
        id
    }
}
