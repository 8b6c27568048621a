//! Exactly-once traversal of every point of a shape, spread over worker threads.
//!
//! Workers claim contiguous batches of `ops_per_thread` flat indices from a shared cursor. The
//! cursor also carries the point matching its index, so a worker only copies that point and then
//! steps it with mixed-radix increments through its batch. The visitor always runs outside the
//! lock.
//!
//! The first error, whether reported by the visitor or by the stepping itself, is kept in a
//! sticky slot on the cursor. Once it is set no new batches are handed out, but batches that
//! were already claimed run to completion.

use std::panic;
use std::sync::{Mutex, PoisonError};
use std::thread;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::structure::concrete_index::{ConcreteIndex, ExpandedIndex, FlatIndex};
use crate::structure::{Interpreter, InterpreterError};

/// How [`Interpreter::try_map_apply`] distributes its work.
///
/// Values below 1 are treated as 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadingOptions {
    /// Number of worker threads spawned for the traversal
    pub num_threads: usize,
    /// Number of consecutive indices a worker claims at once
    pub ops_per_thread: usize,
}

impl ThreadingOptions {
    pub fn new(num_threads: usize, ops_per_thread: usize) -> Self {
        ThreadingOptions {
            num_threads,
            ops_per_thread,
        }
    }

    fn coerced(self) -> Self {
        ThreadingOptions {
            num_threads: self.num_threads.max(1),
            ops_per_thread: self.ops_per_thread.max(1),
        }
    }
}

/// Whether the traversal goes through the validating or the `_fast` stepping operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stepping {
    Checked,
    Fast,
}

impl Stepping {
    fn increment(
        self,
        interpreter: &Interpreter,
        point: &mut [ConcreteIndex],
    ) -> Result<bool, InterpreterError> {
        match self {
            Stepping::Checked => interpreter.try_increment(point),
            Stepping::Fast => Ok(interpreter.increment_fast(point)),
        }
    }

    fn decode(
        self,
        interpreter: &Interpreter,
        index: FlatIndex,
        point: &mut ExpandedIndex,
    ) -> Result<(), InterpreterError> {
        match self {
            Stepping::Checked => *point = interpreter.try_point(index)?,
            Stepping::Fast => interpreter.write_point(index, point),
        }
        Ok(())
    }
}

/// The state shared by all workers of one traversal.
struct Cursor<E> {
    /// Next index that has not been claimed
    index: ConcreteIndex,
    /// The point of `index`
    point: ExpandedIndex,
    /// First error of the traversal
    error: Option<E>,
}

impl<E> Cursor<E> {
    fn record(&mut self, err: E) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// A claimed range of indices together with the point of its first index.
struct Batch {
    start: ConcreteIndex,
    end: ConcreteIndex,
    point: ExpandedIndex,
}

impl Interpreter {
    /// Calls `visitor` exactly once for every point of the shape, with the point and its flat
    /// index.
    ///
    /// With `options` set to `None` a single worker walks the whole shape in one batch.
    /// Otherwise `options.num_threads` workers are spawned, each claiming
    /// `options.ops_per_thread` consecutive indices at a time. Within a batch indices are visited
    /// in increasing order; across batches there is no ordering.
    ///
    /// Returns once every worker has finished.
    ///
    /// # Errors
    ///
    /// - [`InterpreterError::NilVisitor`] if `visitor` is `None`, before anything is spawned
    /// - the first error returned by `visitor`, unchanged. A failing visitor still finishes its
    ///   current batch, but no further batches are claimed by any worker.
    /// - [`InterpreterError::SynchronizationFault`] if stepping a point disagrees with the
    ///   index arithmetic, which indicates a defect rather than a recoverable condition
    ///
    /// # Panics
    ///
    /// A panic of `visitor` is resumed on the calling thread once all workers have finished.
    pub fn try_map_apply<F, E>(
        &self,
        visitor: Option<F>,
        options: Option<ThreadingOptions>,
    ) -> Result<(), E>
    where
        F: Fn(&[ConcreteIndex], FlatIndex) -> Result<(), E> + Sync,
        E: From<InterpreterError> + Send,
    {
        let Some(visitor) = visitor else {
            return Err(InterpreterError::NilVisitor.into());
        };
        self.general_map_apply(&visitor, options, Stepping::Checked)
    }

    /// Calls `visitor` exactly once for every point of the shape, see [`Self::try_map_apply`].
    ///
    /// # Panics
    ///
    /// If the traversal reports an error.
    pub fn map_apply<F>(&self, visitor: F, options: Option<ThreadingOptions>)
    where
        F: Fn(&[ConcreteIndex], FlatIndex) + Sync,
    {
        let visitor = |point: &[ConcreteIndex], index: FlatIndex| {
            visitor(point, index);
            Ok::<(), InterpreterError>(())
        };
        self.try_map_apply(Some(visitor), options)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Same as [`Self::map_apply`], but steps and decodes points with the `_fast` operations.
    ///
    /// # Panics
    ///
    /// If the traversal reports an error, which cannot happen for a shape built through
    /// [`Self::try_new`].
    pub fn map_apply_fast<F>(&self, visitor: F, options: Option<ThreadingOptions>)
    where
        F: Fn(&[ConcreteIndex], FlatIndex) + Sync,
    {
        let visitor = |point: &[ConcreteIndex], index: FlatIndex| {
            visitor(point, index);
            Ok::<(), InterpreterError>(())
        };
        self.general_map_apply(&visitor, options, Stepping::Fast)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    fn general_map_apply<F, E>(
        &self,
        visitor: &F,
        options: Option<ThreadingOptions>,
        stepping: Stepping,
    ) -> Result<(), E>
    where
        F: Fn(&[ConcreteIndex], FlatIndex) -> Result<(), E> + Sync,
        E: From<InterpreterError> + Send,
    {
        // A single batch spanning everything avoids going back to the lock for every point.
        let options = options.map_or(
            ThreadingOptions::new(1, self.size().unsigned_abs()),
            ThreadingOptions::coerced,
        );
        let batch_len = isize::try_from(options.ops_per_thread).unwrap_or(isize::MAX);

        debug!(
            "map_apply over {} ({} points): {} workers, batches of {}",
            self,
            self.size(),
            options.num_threads,
            batch_len
        );

        let cursor = Mutex::new(Cursor {
            index: 0,
            point: ExpandedIndex::zeros(self.order()),
            error: None,
        });

        let panicked = thread::scope(|s| {
            let cursor = &cursor;
            let mut workers = Vec::with_capacity(options.num_threads);
            for worker in 0..options.num_threads {
                workers.push(
                    s.spawn(move || self.work(worker, cursor, visitor, batch_len, stepping)),
                );
            }
            // join all of them, keeping the first panic
            workers
                .into_iter()
                .fold(None, |first, worker| first.or(worker.join().err()))
        });

        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }

        match cursor
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .error
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The loop run by every worker: claim a batch, visit it, repeat.
    fn work<F, E>(
        &self,
        worker: usize,
        cursor: &Mutex<Cursor<E>>,
        visitor: &F,
        batch_len: ConcreteIndex,
        stepping: Stepping,
    ) where
        F: Fn(&[ConcreteIndex], FlatIndex) -> Result<(), E>,
        E: From<InterpreterError>,
    {
        while let Some(mut batch) = self.claim(cursor, batch_len, stepping) {
            trace!("worker {worker} claimed [{}, {})", batch.start, batch.end);

            let mut error: Option<E> = None;
            let mut index = batch.start;
            loop {
                if let Err(err) = visitor(&batch.point[..], index.into()) {
                    error = error.or(Some(err));
                }

                index += 1;
                if index == batch.end {
                    break;
                }

                let fault = match stepping.increment(self, &mut batch.point) {
                    Ok(true) => continue,
                    Ok(false) => InterpreterError::SynchronizationFault,
                    Err(err) => err,
                };
                error = error.or_else(|| Some(fault.into()));
                break;
            }

            if let Some(err) = error {
                warn!(
                    "worker {worker} stopping on an error in [{}, {})",
                    batch.start, batch.end
                );
                cursor
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record(err);
                return;
            }
        }
        trace!("worker {worker} done");
    }

    /// Claims the next batch and moves the cursor past it.
    ///
    /// Returns `None` once the shape is exhausted or an error has been recorded, including an
    /// error raised while moving the cursor's point.
    fn claim<E>(
        &self,
        cursor: &Mutex<Cursor<E>>,
        batch_len: ConcreteIndex,
        stepping: Stepping,
    ) -> Option<Batch>
    where
        E: From<InterpreterError>,
    {
        let size = self.size();
        let mut cursor = cursor.lock().unwrap_or_else(PoisonError::into_inner);

        if cursor.error.is_some() || cursor.index >= size {
            return None;
        }

        let start = cursor.index;
        let point = cursor.point.clone();
        cursor.index = start.saturating_add(batch_len);
        let next = cursor.index;

        if next < size {
            let refreshed = if batch_len > 1 {
                stepping.decode(self, next.into(), &mut cursor.point)
            } else {
                match stepping.increment(self, &mut cursor.point) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(InterpreterError::SynchronizationFault),
                    Err(err) => Err(err),
                }
            };

            if let Err(err) = refreshed {
                warn!("cursor point out of sync at index {next}: {err}");
                cursor.record(err.into());
                return None;
            }
        }

        Some(Batch {
            start,
            end: next.min(size),
            point,
        })
    }
}
