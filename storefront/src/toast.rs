//! Transient user notifications.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            ToastLevel::Success => "ok",
            ToastLevel::Error => "error",
            ToastLevel::Info => "info",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[derive(Debug, Default)]
pub struct Toasts {
    queue: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.queue.push(Toast {
            level,
            message: message.into(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    pub fn pending(&self) -> &[Toast] {
        &self.queue
    }

    /// Take every queued toast, oldest first.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let mut toasts = Toasts::new();
        toasts.success("Signed in!");
        toasts.error("404: Not Found");

        let drained = toasts.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].to_string(), "[ok] Signed in!");
        assert_eq!(drained[1].level, ToastLevel::Error);
        assert!(toasts.is_empty());
    }
}
