//! Draw buffer handshake between renderer and transport
//!
//! Each display owns one [`FlushSlot`] in a process-wide [`FlushRegistry`].
//! The renderer calls [`FlushSlot::submit`] when it hands a filled buffer to
//! the transport; the transport calls [`FlushSlot::on_color_trans_done`] when
//! the pixels have left the buffer. Both sides only touch atomics, so the
//! completion side is safe to call from an interrupt handler.
//!
//! Transports find their slot through a [`FlushHandle`] assigned at display
//! registration and attached to the panel afterwards. Nothing is wired
//! before the display exists.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::{BufferOwner, FlushRegistry};
//!
//! static REGISTRY: FlushRegistry<2> = FlushRegistry::new();
//!
//! let handle = match REGISTRY.allocate() {
//!     Ok(handle) => handle,
//!     Err(_) => return,
//! };
//! let slot = match REGISTRY.slot(handle) {
//!     Ok(slot) => slot,
//!     Err(_) => return,
//! };
//!
//! let _ = slot.submit();
//! assert_eq!(slot.owner(), BufferOwner::Transport);
//!
//! // From the transfer-complete interrupt
//! assert!(slot.on_color_trans_done());
//! assert_eq!(slot.owner(), BufferOwner::Renderer);
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::error::{FlushError, RegistrationError};

/// Side currently holding the most recently submitted draw buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferOwner {
    /// The renderer may write into the buffer
    Renderer,
    /// A transfer is reading from the buffer
    Transport,
}

/// Flush state of one display
#[derive(Debug)]
pub struct FlushSlot {
    in_flight: AtomicBool,
    submitted: AtomicU32,
    completed: AtomicU32,
}

impl FlushSlot {
    /// Create an idle slot
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            submitted: AtomicU32::new(0),
            completed: AtomicU32::new(0),
        }
    }

    /// Hand the current buffer to the transport
    ///
    /// # Errors
    ///
    /// Returns [`FlushError::Busy`] if the previous transfer has not completed.
    pub fn submit(&self) -> Result<(), FlushError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlushError::Busy)?;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Transfer-complete event
    ///
    /// Returns `true` if this call handed the buffer back to the renderer. A
    /// completion without a matching submit changes nothing and returns
    /// `false`.
    pub fn on_color_trans_done(&self) -> bool {
        let flipped = self
            .in_flight
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if flipped {
            self.completed.fetch_add(1, Ordering::Relaxed);
        }
        flipped
    }

    /// Take the buffer back after a transfer that never started
    pub fn abandon(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Whether a transfer is reading from the buffer
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Current owner of the submitted buffer
    pub fn owner(&self) -> BufferOwner {
        if self.is_in_flight() {
            BufferOwner::Transport
        } else {
            BufferOwner::Renderer
        }
    }

    /// Spin until the buffer is back with the renderer
    pub fn wait_reclaimable(&self) {
        while self.is_in_flight() {
            core::hint::spin_loop();
        }
    }

    /// Number of accepted submits
    pub fn submitted(&self) -> u32 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Number of completions that flipped ownership
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }
}

impl Default for FlushSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of a slot in a [`FlushRegistry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushHandle(u8);

impl FlushHandle {
    /// Slot index
    pub fn index(self) -> u8 {
        self.0
    }
}

/// Fixed set of flush slots, one per display
///
/// Meant to live in a `static` so transports can hold `&'static` slots.
#[derive(Debug)]
pub struct FlushRegistry<const N: usize> {
    slots: [FlushSlot; N],
    allocated: AtomicUsize,
}

impl<const N: usize> FlushRegistry<N> {
    /// Create a registry with all slots free
    pub const fn new() -> Self {
        Self {
            slots: [const { FlushSlot::new() }; N],
            allocated: AtomicUsize::new(0),
        }
    }

    /// Reserve the next free slot
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::RegistryFull`] once all `N` slots are taken.
    pub fn allocate(&self) -> Result<FlushHandle, RegistrationError> {
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < N).then_some(n + 1)
            })
            .map(|n| FlushHandle(n as u8))
            .map_err(|_| RegistrationError::RegistryFull { capacity: N })
    }

    /// Look up an allocated slot
    ///
    /// # Errors
    ///
    /// Returns [`FlushError::UnknownSlot`] for a handle this registry never
    /// handed out.
    pub fn slot(&self, handle: FlushHandle) -> Result<&FlushSlot, FlushError> {
        let index = handle.0 as usize;
        if index >= self.allocated.load(Ordering::Acquire) {
            return Err(FlushError::UnknownSlot { index: handle.0 });
        }
        self.slots
            .get(index)
            .ok_or(FlushError::UnknownSlot { index: handle.0 })
    }

    /// Number of allocated slots
    pub fn len(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Whether no slot is allocated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for FlushRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// One or two equal-sized draw buffers of a display
///
/// In double-buffer mode the renderer alternates between the two after each
/// submit, so it can fill one while the other is still being transferred.
pub struct DrawBuffers<B> {
    primary: B,
    secondary: Option<B>,
    render_index: usize,
}

impl<B> DrawBuffers<B>
where
    B: AsMut<[u8]> + AsRef<[u8]>,
{
    /// Single buffer
    pub fn single(primary: B) -> Self {
        Self {
            primary,
            secondary: None,
            render_index: 0,
        }
    }

    /// Two buffers used alternately
    pub fn double(primary: B, secondary: B) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
            render_index: 0,
        }
    }

    /// Whether two buffers are in use
    pub fn is_double(&self) -> bool {
        self.secondary.is_some()
    }

    /// Usable length in bytes (the shorter buffer in double mode)
    pub fn len(&self) -> usize {
        let primary = self.primary.as_ref().len();
        self.secondary
            .as_ref()
            .map_or(primary, |s| primary.min(s.as_ref().len()))
    }

    /// Whether the buffers hold no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the buffer the renderer writes next
    pub fn render_index(&self) -> usize {
        self.render_index
    }

    /// Buffer the renderer writes next
    pub fn render_buffer(&mut self) -> &mut [u8] {
        match (self.render_index, self.secondary.as_mut()) {
            (1, Some(secondary)) => secondary.as_mut(),
            _ => self.primary.as_mut(),
        }
    }

    /// Move on to the other buffer after a submit
    pub fn flip(&mut self) {
        if self.is_double() {
            self.render_index ^= 1;
        }
    }
}
