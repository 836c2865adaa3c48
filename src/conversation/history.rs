// Exchange history with bounded retention
//
// Every successful round trip records one Exchange. Retention is capped by
// exchange count and by total characters; the oldest exchanges go first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One completed request/response pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_text: String,
    pub assistant_text: String,
    pub recorded_at: DateTime<Utc>,
}

impl Exchange {
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            recorded_at: Utc::now(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.user_text.chars().count() + self.assistant_text.chars().count()
    }
}

/// Retention bounds; 0 disables a bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryLimits {
    pub max_exchanges: usize,
    pub max_history_chars: usize,
}

impl HistoryLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExchangeLog {
    exchanges: VecDeque<Exchange>,
    limits: HistoryLimits,
    total_chars: usize,
    evicted: usize,
}

impl ExchangeLog {
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            exchanges: VecDeque::new(),
            limits,
            total_chars: 0,
            evicted: 0,
        }
    }

    /// Append an exchange and evict past the limits.
    ///
    /// Returns how many exchanges were evicted by this push.
    pub fn push(&mut self, exchange: Exchange) -> usize {
        self.total_chars += exchange.char_count();
        self.exchanges.push_back(exchange);
        self.enforce_limits()
    }

    fn enforce_limits(&mut self) -> usize {
        let mut dropped = 0;

        if self.limits.max_exchanges > 0 {
            while self.exchanges.len() > self.limits.max_exchanges {
                self.pop_oldest();
                dropped += 1;
            }
        }

        if self.limits.max_history_chars > 0 {
            while self.total_chars > self.limits.max_history_chars && !self.exchanges.is_empty() {
                self.pop_oldest();
                dropped += 1;
            }
        }

        self.evicted += dropped;
        dropped
    }

    fn pop_oldest(&mut self) {
        if let Some(old) = self.exchanges.pop_front() {
            self.total_chars -= old.char_count();
        }
    }

    /// Exchanges in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.back()
    }

    /// Characters held across all retained exchanges
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// Exchanges dropped since creation
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    pub fn to_vec(&self) -> Vec<Exchange> {
        self.exchanges.iter().cloned().collect()
    }
}
