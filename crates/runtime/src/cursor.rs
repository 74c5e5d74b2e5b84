//! Cursor: demand-driven access to a push sequence
//!
//! A [`Sequence`] pushes its elements into a callback. A [`Cursor`] turns that
//! around: each [`advance`](Cursor::advance) pulls exactly one element.
//!
//! ## Architecture
//!
//! The sequence's `visit` runs on its own strand (a may coroutine) and talks to
//! the cursor over two channels:
//! - resume (cursor -> producer): `Next` asks for one element, `Cancel` aborts
//! - handoff (producer -> cursor): `Value(item)` or `Done`
//!
//! Flow:
//! 1. `Cursor::new` stores the sequence. Nothing runs yet.
//! 2. The first `advance` spawns the strand and sends `Next`.
//! 3. The producer receives `Next`, lets the sequence visit one element,
//!    hands it off and parks on the resume channel again.
//! 4. Every later `advance` sends `Next` and waits for the handoff.
//! 5. When the sequence is exhausted the producer sends `Done` and exits.
//! 6. `release` sends `Cancel` and joins the strand. The producer's visitor
//!    returns `false`, so no user callback runs after release.
//!
//! At most one element is in flight, and the producer never touches the
//! sequence while the consumer holds the last handed-off element.

use crate::error::{CursorError, format_panic_payload};
use crate::scheduler::spawn_strand;
use lazyseq_core::Sequence;
use may::coroutine::JoinHandle;
use may::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, trace, warn};

/// Consumer to producer
enum Resume {
    Next,
    Cancel,
}

/// Producer to consumer
enum Handoff<T> {
    Value(T),
    Done,
}

type Source<T> = Box<dyn Sequence<Item = T> + Send>;

/// Channels and join handle of a running producer strand.
struct Link<T> {
    strand_id: u64,
    resume: Sender<Resume>,
    handoff: Receiver<Handoff<T>>,
    handle: JoinHandle<()>,
}

enum State<T> {
    /// Not started; holds the sequence until the first `advance`
    Pending(Source<T>),
    Running(Link<T>),
    /// Producer reported exhaustion and has been joined
    Finished,
    Released,
}

/// A pull handle over a push sequence.
///
/// ```
/// use lazyseq_core::from_vec;
/// use lazyseq_runtime::Cursor;
///
/// let mut cursor = Cursor::new(from_vec(vec!["aa", "aaa", "a"]));
/// assert_eq!(cursor.advance().unwrap(), Some("aa"));
/// assert_eq!(cursor.advance().unwrap(), Some("aaa"));
/// cursor.release();
/// assert!(cursor.advance().is_err());
/// ```
pub struct Cursor<T> {
    state: State<T>,
    delivered: u64,
}

impl<T: Send + 'static> Cursor<T> {
    pub fn new<S>(seq: S) -> Self
    where
        S: Sequence<Item = T> + Send + 'static,
    {
        Self {
            state: State::Pending(Box::new(seq)),
            delivered: 0,
        }
    }

    /// Pull the next element.
    ///
    /// Returns `Ok(None)` once the sequence is exhausted, and keeps doing so.
    /// Returns [`CursorError::Released`] after [`release`](Self::release).
    ///
    /// # Panics
    ///
    /// Re-raises a panic that happened inside the sequence while producing
    /// the requested element.
    pub fn advance(&mut self) -> Result<Option<T>, CursorError> {
        if let State::Pending(_) = self.state {
            self.start()?;
        }

        let link = match &self.state {
            State::Running(link) => link,
            State::Finished => return Ok(None),
            State::Released => return Err(CursorError::Released),
            State::Pending(_) => unreachable!("cursor started above"),
        };

        // A send failure means the producer already exited; the handoff
        // receive below reports how.
        let _ = link.resume.send(Resume::Next);

        match link.handoff.recv() {
            Ok(Handoff::Value(item)) => {
                self.delivered += 1;
                Ok(Some(item))
            }
            Ok(Handoff::Done) => {
                self.finish();
                Ok(None)
            }
            Err(_) => {
                // Producer dropped its sender without `Done`: it panicked
                let State::Running(link) = std::mem::replace(&mut self.state, State::Finished)
                else {
                    unreachable!("cursor was running");
                };
                match link.handle.join() {
                    Err(payload) => std::panic::resume_unwind(payload),
                    Ok(()) => Ok(None),
                }
            }
        }
    }

    fn start(&mut self) -> Result<(), CursorError> {
        let State::Pending(source) = std::mem::replace(&mut self.state, State::Released) else {
            return Ok(());
        };

        let (resume_tx, resume_rx) = mpsc::channel();
        let (handoff_tx, handoff_rx) = mpsc::channel();

        // On spawn failure the closure (and the source in it) is dropped and
        // the cursor stays released
        let (strand_id, handle) = spawn_strand(move || produce(source, resume_rx, handoff_tx))?;
        debug!(strand_id, "cursor started");

        self.state = State::Running(Link {
            strand_id,
            resume: resume_tx,
            handoff: handoff_rx,
            handle,
        });
        Ok(())
    }
}

impl<T> Cursor<T> {
    /// Stop the producer and wait for its strand to exit.
    ///
    /// Idempotent and infallible. A cursor that was never advanced releases
    /// without spawning anything.
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.state, State::Released) {
            State::Running(link) => {
                let _ = link.resume.send(Resume::Cancel);
                let Link {
                    strand_id,
                    resume,
                    handoff,
                    handle,
                } = link;
                // Disconnect both directions so a producer that ignores the
                // stop signal still cannot block
                drop(resume);
                drop(handoff);
                if let Err(payload) = handle.join() {
                    warn!(
                        strand_id,
                        panic = %format_panic_payload(payload.as_ref()),
                        "producer panicked before release"
                    );
                }
                debug!(strand_id, delivered = self.delivered, "cursor released");
            }
            State::Pending(source) => drop(source),
            State::Finished | State::Released => {}
        }
    }

    /// `true` once the producer strand has been spawned.
    pub fn is_started(&self) -> bool {
        !matches!(self.state, State::Pending(_))
    }

    /// `true` once the sequence reported exhaustion.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    pub fn is_released(&self) -> bool {
        matches!(self.state, State::Released)
    }

    fn finish(&mut self) {
        if let State::Running(link) = std::mem::replace(&mut self.state, State::Finished) {
            // The producer sent Done as its last act, so this join is short
            if let Err(payload) = link.handle.join() {
                warn!(
                    strand_id = link.strand_id,
                    panic = %format_panic_payload(payload.as_ref()),
                    "producer panicked after completing"
                );
            }
            trace!(
                strand_id = link.strand_id,
                delivered = self.delivered,
                "cursor exhausted"
            );
        }
    }
}

/// Body of the producer strand.
fn produce<T>(mut source: Source<T>, resume: Receiver<Resume>, handoff: Sender<Handoff<T>>) {
    // Nothing is visited until the first element is asked for
    if !matches!(resume.recv(), Ok(Resume::Next)) {
        return;
    }

    let mut cancelled = false;
    source.visit(&mut |item| {
        if handoff.send(Handoff::Value(item)).is_err() {
            cancelled = true;
            return false;
        }
        match resume.recv() {
            Ok(Resume::Next) => true,
            Ok(Resume::Cancel) | Err(_) => {
                cancelled = true;
                false
            }
        }
    });

    if !cancelled {
        let _ = handoff.send(Handoff::Done);
    }
}

impl<T> Drop for Cursor<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Iterating a cursor advances it; iteration ends when the sequence does.
///
/// # Panics
///
/// `next` panics if the cursor was released or its producer could not be
/// spawned.
impl<T: Send + 'static> Iterator for Cursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.advance() {
            Ok(item) => item,
            Err(e) => panic!("cursor iteration failed: {}", e),
        }
    }
}

/// `seq.pull()` for any sequence that can move to a producer strand.
pub trait PullExt: Sequence + Send + Sized + 'static
where
    Self::Item: Send + 'static,
{
    fn pull(self) -> Cursor<Self::Item> {
        Cursor::new(self)
    }
}

impl<S> PullExt for S
where
    S: Sequence + Send + 'static,
    S::Item: Send + 'static,
{
}
