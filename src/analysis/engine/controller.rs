//! Pause, resume and stop control for a background precalculation.
//!
//! A [`Controller`] is the only state shared between the worker running a
//! [`DfaExecution`](super::DfaExecution) and its consumers. Everything lives behind
//! one mutex; a condition variable wakes paused workers and threads blocked in
//! [`Controller::wait`].
//!
//! # State Machine
//!
//! ```text
//!                 pause_precalc
//!   Calculating ----------------> Paused
//!        |      <----------------   |
//!        |       continue_precalc   |
//!        |                          |
//!        +--> Completed             |
//!        +--> Failed                |
//!        +--> Stopped <-------------+
//! ```

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Condvar, Mutex,
    },
    time::Duration,
};

use strum::{Display, EnumIter};

use crate::{Error, Result};

/// Lifecycle of a precalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PrecalcState {
    /// The worker is stepping.
    Calculating,
    /// The worker is suspended between two elementary steps.
    Paused,
    /// The fixpoint was reached.
    Completed,
    /// Stopped on request before reaching the fixpoint.
    Stopped,
    /// Aborted by an error.
    Failed,
}

impl PrecalcState {
    /// Returns `true` once the worker will not record further steps.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }
}

/// What kind of result has been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ResultState {
    /// Nothing published yet.
    NoResult,
    /// The history up to the step at which the run was stopped.
    Intermediate,
    /// The complete history up to the fixpoint.
    Final,
}

/// Shortest interval at which a paused worker re-checks its state.
const MIN_PAUSE_POLL: Duration = Duration::from_millis(1);

struct Inner<T> {
    state: PrecalcState,
    result_state: ResultState,
    result: Option<Arc<T>>,
    error: Option<Error>,
    poll: Duration,
}

/// Shared control block of one precalculation.
pub struct Controller<T> {
    inner: Mutex<Inner<T>>,
    changed: Condvar,
    progress: AtomicUsize,
}

impl<T> Controller<T> {
    pub(crate) fn new(poll: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: PrecalcState::Calculating,
                result_state: ResultState::NoResult,
                result: None,
                error: None,
                poll: poll.max(MIN_PAUSE_POLL),
            }),
            changed: Condvar::new(),
            progress: AtomicUsize::new(0),
        }
    }

    /// Returns the current lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the controller lock is poisoned.
    pub fn state(&self) -> Result<PrecalcState> {
        Ok(lock!(self.inner).state)
    }

    /// Returns what kind of result has been published.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the controller lock is poisoned.
    pub fn result_state(&self) -> Result<ResultState> {
        Ok(lock!(self.inner).result_state)
    }

    /// Number of elementary steps recorded so far.
    pub fn progress(&self) -> usize {
        self.progress.load(Ordering::Acquire)
    }

    /// Suspends the worker before its next elementary step.
    ///
    /// `wait_time` is the interval at which the paused worker re-checks its state,
    /// raised to at least one millisecond. Ignored once the run completed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if the run was stopped or failed.
    pub fn pause_precalc(&self, wait_time: Duration) -> Result<()> {
        let mut inner = lock!(self.inner);
        match inner.state {
            PrecalcState::Calculating | PrecalcState::Paused => {
                inner.state = PrecalcState::Paused;
                inner.poll = wait_time.max(MIN_PAUSE_POLL);
            }
            PrecalcState::Completed => {}
            state @ (PrecalcState::Stopped | PrecalcState::Failed) => {
                return Err(illegal_state!("cannot pause a precalculation that is {}", state));
            }
        }
        self.changed.notify_all();
        Ok(())
    }

    /// Resumes a paused worker. Ignored while calculating or once completed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if the run was stopped or failed.
    pub fn continue_precalc(&self) -> Result<()> {
        let mut inner = lock!(self.inner);
        match inner.state {
            PrecalcState::Paused => inner.state = PrecalcState::Calculating,
            PrecalcState::Calculating | PrecalcState::Completed => {}
            state @ (PrecalcState::Stopped | PrecalcState::Failed) => {
                return Err(illegal_state!(
                    "cannot continue a precalculation that is {}",
                    state
                ));
            }
        }
        self.changed.notify_all();
        Ok(())
    }

    /// Stops the worker before its next elementary step. It then publishes the
    /// history recorded so far as an intermediate result. Stopping twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if the run already completed or failed.
    pub fn stop_precalc(&self) -> Result<()> {
        let mut inner = lock!(self.inner);
        match inner.state {
            PrecalcState::Calculating | PrecalcState::Paused => {
                inner.state = PrecalcState::Stopped;
            }
            PrecalcState::Stopped => {}
            state @ (PrecalcState::Completed | PrecalcState::Failed) => {
                return Err(illegal_state!("cannot stop a precalculation that is {}", state));
            }
        }
        self.changed.notify_all();
        Ok(())
    }

    /// Returns the published result. Every call returns the same shared value.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted a failed run, or [`Error::IllegalState`] if
    /// nothing has been published yet.
    pub fn result(&self) -> Result<Arc<T>> {
        let inner = lock!(self.inner);
        Self::published(&inner)
    }

    /// Blocks until the worker published a result or failed, then behaves like
    /// [`Controller::result`].
    ///
    /// # Errors
    ///
    /// Returns the error that aborted a failed run.
    pub fn wait(&self) -> Result<Arc<T>> {
        let mut inner = lock!(self.inner);
        while inner.result.is_none() && inner.error.is_none() {
            inner = wait!(self.changed, inner);
        }
        Self::published(&inner)
    }

    fn published(inner: &Inner<T>) -> Result<Arc<T>> {
        if let Some(error) = &inner.error {
            return Err(error.clone());
        }
        inner
            .result
            .clone()
            .ok_or_else(|| illegal_state!("no result has been published yet"))
    }

    /// Called by the worker before every elementary step. Blocks while paused.
    ///
    /// Returns `false` if the worker must stop.
    pub(crate) fn checkpoint(&self) -> Result<bool> {
        let mut inner = lock!(self.inner);
        loop {
            match inner.state {
                PrecalcState::Calculating => return Ok(true),
                PrecalcState::Paused => {
                    let poll = inner.poll;
                    inner = wait_timeout!(self.changed, inner, poll);
                }
                PrecalcState::Completed | PrecalcState::Stopped | PrecalcState::Failed => {
                    return Ok(false)
                }
            }
        }
    }

    pub(crate) fn advance(&self) {
        self.progress.fetch_add(1, Ordering::AcqRel);
    }

    /// Publishes the worker's result: final unless the run was stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if a result was already published.
    pub(crate) fn publish(&self, value: T) -> Result<Arc<T>> {
        let mut inner = lock!(self.inner);
        if inner.result.is_some() {
            return Err(illegal_state!("a result has already been published"));
        }

        let value = Arc::new(value);
        if inner.state == PrecalcState::Stopped {
            inner.result_state = ResultState::Intermediate;
        } else {
            inner.state = PrecalcState::Completed;
            inner.result_state = ResultState::Final;
        }
        inner.result = Some(Arc::clone(&value));
        self.changed.notify_all();
        Ok(value)
    }

    pub(crate) fn fail(&self, error: Error) -> Result<()> {
        let mut inner = lock!(self.inner);
        inner.state = PrecalcState::Failed;
        inner.error = Some(error);
        self.changed.notify_all();
        Ok(())
    }
}

impl<T> std::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Controller");
        if let Ok(inner) = self.inner.lock() {
            debug
                .field("state", &inner.state)
                .field("result_state", &inner.result_state);
        }
        debug.field("progress", &self.progress()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn controller() -> Controller<u32> {
        Controller::new(Duration::from_millis(1))
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        assert_eq!(c.state().unwrap(), PrecalcState::Calculating);
        assert_eq!(c.result_state().unwrap(), ResultState::NoResult);
        assert!(matches!(c.result(), Err(Error::IllegalState { .. })));
        assert!(c.checkpoint().unwrap());
    }

    #[test]
    fn test_pause_and_continue() {
        let c = controller();
        c.pause_precalc(Duration::from_millis(1)).unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Paused);
        c.continue_precalc().unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Calculating);
        c.continue_precalc().unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Calculating);
    }

    #[test]
    fn test_stop_publishes_intermediate() {
        let c = controller();
        c.stop_precalc().unwrap();
        c.stop_precalc().unwrap();
        assert!(!c.checkpoint().unwrap());
        assert!(matches!(
            c.pause_precalc(Duration::ZERO),
            Err(Error::IllegalState { .. })
        ));
        assert!(matches!(c.continue_precalc(), Err(Error::IllegalState { .. })));

        c.publish(3).unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Stopped);
        assert_eq!(c.result_state().unwrap(), ResultState::Intermediate);
    }

    #[test]
    fn test_completed() {
        let c = controller();
        let published = c.publish(42).unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Completed);
        assert_eq!(c.result_state().unwrap(), ResultState::Final);
        assert!(Arc::ptr_eq(&published, &c.result().unwrap()));
        assert!(Arc::ptr_eq(&c.result().unwrap(), &c.result().unwrap()));

        c.pause_precalc(Duration::ZERO).unwrap();
        c.continue_precalc().unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Completed);
        assert!(matches!(c.stop_precalc(), Err(Error::IllegalState { .. })));
        assert!(matches!(c.publish(1), Err(Error::IllegalState { .. })));
    }

    #[test]
    fn test_failed() {
        let c = controller();
        c.fail(Error::EmptyInput).unwrap();
        assert_eq!(c.state().unwrap(), PrecalcState::Failed);
        assert_eq!(c.result(), Err(Error::EmptyInput));
        assert_eq!(c.wait(), Err(Error::EmptyInput));
        assert!(matches!(c.stop_precalc(), Err(Error::IllegalState { .. })));
    }

    #[test]
    fn test_paused_worker_resumes() {
        let c = Arc::new(controller());
        c.pause_precalc(Duration::from_millis(1)).unwrap();

        let worker = {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                let proceed = c.checkpoint().unwrap();
                c.advance();
                proceed
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(c.progress(), 0);
        c.continue_precalc().unwrap();

        assert!(worker.join().unwrap());
        assert_eq!(c.progress(), 1);
    }

    #[test]
    fn test_zero_pause_interval() {
        let c = Arc::new(Controller::<u32>::new(Duration::ZERO));
        assert_eq!(c.inner.lock().unwrap().poll, MIN_PAUSE_POLL);
        c.pause_precalc(Duration::ZERO).unwrap();
        assert_eq!(c.inner.lock().unwrap().poll, MIN_PAUSE_POLL);

        let worker = {
            let c = Arc::clone(&c);
            thread::spawn(move || c.checkpoint().unwrap())
        };
        thread::sleep(Duration::from_millis(10));
        c.stop_precalc().unwrap();
        assert!(!worker.join().unwrap());
    }

    #[test]
    fn test_wait_blocks_until_published() {
        let c = Arc::new(controller());
        let waiter = {
            let c = Arc::clone(&c);
            thread::spawn(move || c.wait().map(|value| *value))
        };
        c.publish(7).unwrap();
        assert_eq!(waiter.join().unwrap(), Ok(7));
    }
}
