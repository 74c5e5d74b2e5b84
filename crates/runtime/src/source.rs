//! Channel-backed sources

use lazyseq_core::Sequence;
use may::sync::mpsc::Receiver;

/// Sequence adapter produced by [`from_receiver`].
pub struct FromReceiver<T> {
    rx: Receiver<T>,
}

/// A one-shot sequence over the messages of a may channel.
///
/// `visit` blocks for each message and ends when every sender has been
/// dropped. Each message is delivered once: a visit that stops early leaves
/// the remaining messages for the next visit, and once the channel is closed
/// every visit yields nothing.
///
/// Inside a coroutine the wait yields to the scheduler instead of blocking a
/// worker thread, so a receiver can sit behind a [`crate::Cursor`].
pub fn from_receiver<T>(rx: Receiver<T>) -> FromReceiver<T> {
    FromReceiver { rx }
}

impl<T> Sequence for FromReceiver<T> {
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        while let Ok(item) = self.rx.recv() {
            if !visitor(item) {
                break;
            }
        }
    }
}
