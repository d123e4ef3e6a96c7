//! Fire-once opacity transitions applied through a host-provided scene graph.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::page::model::Animation;

/// Opacity fade requested for one element.
#[derive(Clone, Debug, PartialEq)]
pub struct OpacityTransition {
    /// Transition duration in milliseconds.
    pub duration_ms: f64,
    /// Delay before opacity flips to 1, in milliseconds.
    pub delay_ms: f64,
}

impl OpacityTransition {
    /// Transition for a page animation. A missing delay is 0.
    pub fn from_animation(animation: &Animation) -> Self {
        Self {
            duration_ms: animation.duration,
            delay_ms: animation.delay.unwrap_or(0.0),
        }
    }

    /// CSS transition shorthand, `all <duration>ms ease`.
    pub fn css_transition(&self) -> String {
        format!("all {}ms ease", self.duration_ms)
    }
}

/// Host capability that owns the addressable elements animations act on.
pub trait SceneGraphSink {
    /// Start `transition` on `target`. Returns `false` when no element has that id.
    fn apply_animation(&mut self, target: &str, transition: &OpacityTransition) -> bool;

    /// Drop every opacity flip that has not fired yet.
    fn cancel_pending(&mut self);
}

/// Scene without addressable elements; every animation is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedScene;

impl SceneGraphSink for DetachedScene {
    fn apply_animation(&mut self, _target: &str, _transition: &OpacityTransition) -> bool {
        false
    }

    fn cancel_pending(&mut self) {}
}

/// Observable state of one element in an [`InMemorySceneGraph`].
#[derive(Clone, Debug, PartialEq)]
pub struct ElementState {
    /// Current opacity.
    pub opacity: f64,
    /// Transition shorthand, empty until an animation is applied.
    pub transition: String,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transition: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct SceneState {
    now_ms: f64,
    elements: BTreeMap<String, ElementState>,
    pending: Vec<(f64, String)>,
}

/// Scene graph kept in memory, driven by an explicit clock.
///
/// Clones share state, so a host can keep one handle while the visualizer owns another.
#[derive(Clone, Debug, Default)]
pub struct InMemorySceneGraph {
    inner: Arc<Mutex<SceneState>>,
}

impl InMemorySceneGraph {
    /// Empty scene at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SceneState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `id` addressable. Re-registering resets its state.
    pub fn register(&self, id: impl Into<String>) {
        self.lock().elements.insert(id.into(), ElementState::default());
    }

    /// State of element `id`.
    pub fn element(&self, id: &str) -> Option<ElementState> {
        self.lock().elements.get(id).cloned()
    }

    /// Number of opacity flips not yet fired.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Advance the clock by `ms`, firing every flip whose deadline has passed.
    pub fn advance(&self, ms: f64) {
        let mut state = self.lock();
        state.now_ms += ms.max(0.0);
        let now = state.now_ms;
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        state.pending = rest;
        for (_, id) in due {
            if let Some(el) = state.elements.get_mut(&id) {
                el.opacity = 1.0;
            }
        }
    }
}

impl SceneGraphSink for InMemorySceneGraph {
    fn apply_animation(&mut self, target: &str, transition: &OpacityTransition) -> bool {
        let mut state = self.lock();
        let at = state.now_ms + transition.delay_ms.max(0.0);
        let Some(el) = state.elements.get_mut(target) else {
            return false;
        };
        el.transition = transition.css_transition();
        el.opacity = 0.0;
        state.pending.push((at, target.to_string()));
        true
    }

    fn cancel_pending(&mut self) {
        self.lock().pending.clear();
    }
}

/// Hand every animation to `scene` in declaration order. Missing targets are skipped.
pub fn apply_animations(animations: &[Animation], scene: &mut dyn SceneGraphSink) {
    for animation in animations {
        let transition = OpacityTransition::from_animation(animation);
        if !scene.apply_animation(&animation.target, &transition) {
            tracing::debug!(target_id = %animation.target, "animation target not found");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/animation.rs"]
mod tests;
