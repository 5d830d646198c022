/// Single-slot memory of the last requested message.
///
/// An empty slot and an absent message compare equal, so with duplicate
/// prevention on, a message-less toast is suppressed when nothing has been
/// recorded since the last container teardown.
#[derive(Debug, Default)]
pub struct DuplicateFilter {
    previous: Option<String>,
}

impl DuplicateFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` and report whether it repeats the previous one.
    ///
    /// The comparison uses the value held before this call; the slot is
    /// overwritten whether or not `enabled` is set.
    pub fn should_suppress(&mut self, message: Option<&str>, enabled: bool) -> bool {
        let repeated = self.previous.as_deref() == message;
        self.previous = message.map(str::to_string);
        enabled && repeated
    }

    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn forget(&mut self) {
        self.previous = None;
    }
}
