//! Mount targets: the host-side owner of a visualizer's surface.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::error::PagevisResult;
use crate::page::styles::RenderingMode;

/// Surface handed to a mount target on attach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    /// Backend that owns the surface.
    pub mode: RenderingMode,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Host capability that displays the surface and reports size changes.
///
/// The visualizer attaches once on construction and detaches once on destroy. While resize
/// observation is on, the host is expected to call
/// [`PageVisualizer::request_resize`](crate::PageVisualizer::request_resize) as its size changes.
pub trait MountTarget {
    /// Take ownership of the surface for display.
    fn attach(&mut self, surface: &SurfaceDescriptor) -> PagevisResult<()>;

    /// Release the surface.
    fn detach(&mut self);

    /// Start or stop reporting size changes.
    fn observe_resize(&mut self, enabled: bool);
}

#[derive(Debug, Default)]
struct MountState {
    attached: Option<SurfaceDescriptor>,
    observing: bool,
    attach_count: usize,
}

/// Mount target without a display. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct HeadlessMount {
    inner: Arc<Mutex<MountState>>,
}

impl HeadlessMount {
    /// Detached mount.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MountState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Surface currently attached.
    pub fn attached(&self) -> Option<SurfaceDescriptor> {
        self.lock().attached
    }

    /// `true` while size changes are observed.
    pub fn is_observing(&self) -> bool {
        self.lock().observing
    }

    /// Number of attach calls seen.
    pub fn attach_count(&self) -> usize {
        self.lock().attach_count
    }

    /// Record a new surface size, as a host would after a resize.
    pub fn set_size(&self, width: u32, height: u32) {
        if let Some(surface) = self.lock().attached.as_mut() {
            surface.width = width;
            surface.height = height;
        }
    }
}

impl MountTarget for HeadlessMount {
    fn attach(&mut self, surface: &SurfaceDescriptor) -> PagevisResult<()> {
        let mut state = self.lock();
        state.attached = Some(*surface);
        state.attach_count += 1;
        Ok(())
    }

    fn detach(&mut self) {
        self.lock().attached = None;
    }

    fn observe_resize(&mut self, enabled: bool) {
        self.lock().observing = enabled;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visualizer/mount.rs"]
mod tests;
