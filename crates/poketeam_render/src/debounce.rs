/// Quiet period before a search query is applied.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Clock-agnostic debouncer for free-text search.
///
/// Every `push` restarts the quiet period; `poll` hands out the latest text
/// once the period has elapsed, exactly once.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay_ms: u64,
    pending: Option<(String, u64)>,
}

impl SearchDebouncer {
    pub fn new() -> Self {
        Self::with_delay(SEARCH_DEBOUNCE_MS)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn push(&mut self, text: impl Into<String>, now_ms: u64) {
        let due = now_ms.saturating_add(self.delay_ms);
        self.pending = Some((text.into(), due));
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<String> {
        match &self.pending {
            Some((_, due)) if now_ms >= *due => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(text, _)| text)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
