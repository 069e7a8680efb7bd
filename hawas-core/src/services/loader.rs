//! Busy indicator shown around slow external calls.

/// Something that can show and hide a loading message.
pub trait Loader: Send + Sync {
    fn show(&self, message: &str);
    fn hide(&self);
}

/// A loader that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

impl Loader for NoopLoader {
    fn show(&self, _message: &str) {}
    fn hide(&self) {}
}
