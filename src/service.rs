//! GUI tick and service loop
//!
//! The GUI state lives behind one [`GuiLock`]. A [`GuiService`] first starts
//! the periodic tick timer, then repeatedly sleeps for the service period,
//! takes the lock and hands the state plus the milliseconds elapsed since
//! the previous iteration to a callback, normally a render pass.
//!
//! Any other context touching the GUI state (scene building at startup, a
//! button handler) goes through the same lock.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::service::{GuiLock, GuiService, ServiceState, TickTimer};
//! use dual_eye_display::tick::TickCounter;
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! # use embedded_hal::delay::DelayNs;
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//!
//! struct ManualTimer;
//!
//! impl TickTimer for ManualTimer {
//!     type Error = ();
//!     fn start_periodic(&mut self, _period_ms: u32, _ticks: &'static TickCounter) -> Result<(), ()> {
//!         Ok(())
//!     }
//! }
//!
//! static TICKS: TickCounter = TickCounter::new();
//!
//! let frames: GuiLock<NoopRawMutex, u32> = GuiLock::new(0);
//! let mut service = GuiService::new(&frames, &TICKS, 1, 10);
//! assert!(service.start_tick(&mut ManualTimer).is_ok());
//!
//! TICKS.inc(10);
//! let elapsed = service.service_once(&mut MockDelay, |frames, elapsed| {
//!     *frames += 1;
//!     elapsed
//! });
//! assert_eq!(elapsed, Ok(10));
//! assert_eq!(service.state(), ServiceState::Servicing);
//! ```

use core::cell::RefCell;
use core::convert::Infallible;
use core::fmt::Debug;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::error::ServiceError;
use crate::tick::{TickCounter, TickCursor};

/// Periodic timer driving a [`TickCounter`]
pub trait TickTimer {
    /// Timer error type
    type Error: Debug;

    /// Call `ticks.inc(period_ms)` every `period_ms` from now on
    fn start_periodic(
        &mut self,
        period_ms: u32,
        ticks: &'static TickCounter,
    ) -> Result<(), Self::Error>;
}

/// Mutual exclusion around the GUI state
///
/// The lock only serializes tasks. Flush completion never takes it, and a
/// render pass holding it waits for that completion, so `M` must not mask
/// the completion interrupt. `CriticalSectionRawMutex` fits where the
/// critical section is a scheduler mutex (ESP-IDF), `NoopRawMutex` fits a
/// single thread. Where the critical section disables interrupts, use a
/// task-level mutex instead.
pub struct GuiLock<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T> GuiLock<M, T> {
    /// Wrap the GUI state
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access to the state
    ///
    /// # Errors
    ///
    /// [`ServiceError::LockBusy`] when called from inside another `lock` on
    /// the same state.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, ServiceError> {
        self.inner.lock(|cell| {
            let mut state = cell.try_borrow_mut().map_err(|_| ServiceError::LockBusy)?;
            Ok(f(&mut state))
        })
    }

    /// Unwrap the state
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

/// Lifecycle of a [`GuiService`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    /// Created, tick timer not started
    Uninitialized,
    /// Tick timer started, no iteration yet
    TickTimerRunning,
    /// At least one iteration ran
    Servicing,
}

/// Periodic GUI servicing
pub struct GuiService<'a, M: RawMutex, T> {
    lock: &'a GuiLock<M, T>,
    ticks: &'static TickCounter,
    cursor: TickCursor,
    state: ServiceState,
    tick_period_ms: u32,
    service_period_ms: u32,
}

impl<'a, M: RawMutex, T> GuiService<'a, M, T> {
    /// Service the state behind `lock`, timed by `ticks`
    pub fn new(
        lock: &'a GuiLock<M, T>,
        ticks: &'static TickCounter,
        tick_period_ms: u32,
        service_period_ms: u32,
    ) -> Self {
        Self {
            lock,
            ticks,
            cursor: TickCursor::new(ticks),
            state: ServiceState::Uninitialized,
            tick_period_ms,
            service_period_ms,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Start the periodic tick timer
    ///
    /// # Errors
    ///
    /// - [`ServiceError::AlreadyStarted`] on a second call
    /// - [`ServiceError::TimerStart`] if the timer refuses to start
    pub fn start_tick<Tm: TickTimer>(&mut self, timer: &mut Tm) -> Result<(), ServiceError> {
        if self.state != ServiceState::Uninitialized {
            return Err(ServiceError::AlreadyStarted);
        }
        timer
            .start_periodic(self.tick_period_ms, self.ticks)
            .map_err(|e| {
                log::error!("tick timer start failed: {:?}", e);
                ServiceError::TimerStart
            })?;
        self.cursor = TickCursor::new(self.ticks);
        self.state = ServiceState::TickTimerRunning;
        log::info!("GUI tick running every {} ms", self.tick_period_ms);
        Ok(())
    }

    /// Sleep one service period, then run `f` under the lock
    ///
    /// `f` receives the state and the milliseconds elapsed since the
    /// previous iteration.
    ///
    /// # Errors
    ///
    /// [`ServiceError::TickNotRunning`] before [`start_tick`](Self::start_tick),
    /// or [`ServiceError::LockBusy`].
    pub fn service_once<D, R>(
        &mut self,
        delay: &mut D,
        f: impl FnOnce(&mut T, u32) -> R,
    ) -> Result<R, ServiceError>
    where
        D: DelayNs,
    {
        if self.state == ServiceState::Uninitialized {
            return Err(ServiceError::TickNotRunning);
        }
        delay.delay_ms(self.service_period_ms);
        self.state = ServiceState::Servicing;
        let elapsed = self.cursor.elapsed(self.ticks);
        self.lock.lock(|state| f(state, elapsed))
    }

    /// Service forever
    ///
    /// # Errors
    ///
    /// Returns only on the first [`service_once`](Self::service_once) error.
    pub fn run<D, F>(&mut self, delay: &mut D, mut f: F) -> Result<Infallible, ServiceError>
    where
        D: DelayNs,
        F: FnMut(&mut T, u32),
    {
        loop {
            self.service_once(delay, &mut f)?;
        }
    }
}

#[cfg(feature = "std")]
pub use self::thread::{ThreadTickTimer, spawn_gui_task};

#[cfg(feature = "std")]
mod thread {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use super::TickTimer;
    use crate::config::TaskConfig;
    use crate::tick::TickCounter;

    /// Tick timer backed by a sleeping thread
    #[derive(Debug, Default)]
    pub struct ThreadTickTimer {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl ThreadTickTimer {
        /// Timer not yet started
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl TickTimer for ThreadTickTimer {
        type Error = std::io::Error;

        fn start_periodic(
            &mut self,
            period_ms: u32,
            ticks: &'static TickCounter,
        ) -> Result<(), Self::Error> {
            let stop = Arc::clone(&self.stop);
            let period = Duration::from_millis(u64::from(period_ms));
            let handle = thread::Builder::new()
                .name("gui_tick".into())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        thread::sleep(period);
                        ticks.inc(period_ms);
                    }
                })?;
            self.handle = Some(handle);
            Ok(())
        }
    }

    impl Drop for ThreadTickTimer {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::Release);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    /// Spawn the GUI task with the configured name and stack size
    ///
    /// Priority and core affinity are platform settings; on ESP-IDF apply
    /// them through `ThreadSpawnConfiguration` before calling this.
    pub fn spawn_gui_task<F, R>(task: &TaskConfig, f: F) -> std::io::Result<JoinHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        log::info!(
            "spawning {} (stack {}, priority {}, core {:?})",
            task.name,
            task.stack_size,
            task.priority,
            task.core
        );
        thread::Builder::new()
            .name(task.name.into())
            .stack_size(task.stack_size)
            .spawn(f)
    }
}
