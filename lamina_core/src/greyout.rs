// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus scrim positioning and fade.
//!
//! The scrim is a full-surface dimming element that sits directly behind,
//! and is visible exactly when there exists, a topmost focus-stealing
//! surface: the topmost active dialog, or failing that the occupant of the
//! topmost occupied overlay layer. The coordinator recomputes placement
//! after every lifecycle change touching a dialog or an overlay layer and
//! drives visibility through a timed fade.
//!
//! # Fade machine
//!
//! Alpha moves toward the fade goal at [`FADE_RATE`] per second, advanced
//! by [`ViewManager::tick`](crate::ViewManager::tick) with elapsed time.
//! Two thresholds shape the fade-out:
//!
//! - at [`CLICK_THROUGH_ALPHA`] the scrim stops intercepting input while
//!   still visible, so interaction resumes before the fade finishes;
//! - below [`DISABLE_EPSILON`] the scrim node is deactivated entirely, so
//!   an idle scrim costs no render or hit-test work.
//!
//! Fading in runs the other way: the node is activated (and made
//! input-blocking) first, then alpha rises. Placement is always applied
//! before a fade toward visible starts, so the scrim is never shown behind
//! a surface that is no longer current.
//!
//! [`FADE_RATE`]: GreyoutCoordinator::FADE_RATE
//! [`CLICK_THROUGH_ALPHA`]: GreyoutCoordinator::CLICK_THROUGH_ALPHA
//! [`DISABLE_EPSILON`]: GreyoutCoordinator::DISABLE_EPSILON

use crate::id::{SurfaceId, ViewId};
use crate::layer::LayerTable;
use crate::presenter::Presenter;

/// Scrim placement and fade state.
///
/// Owned and driven by the [`ViewManager`](crate::ViewManager); read
/// access is available through
/// [`ViewManager::greyout`](crate::ViewManager::greyout).
#[derive(Debug)]
pub struct GreyoutCoordinator {
    alpha: f32,
    goal: f32,
    visible_alpha: f32,
    active: bool,
    blocking: bool,
}

impl GreyoutCoordinator {
    /// Alpha change per second while fading.
    pub const FADE_RATE: f32 = 2.4;

    /// Visible-target alpha until
    /// [`ViewManager::set_greyout_alpha`](crate::ViewManager::set_greyout_alpha)
    /// overrides it.
    pub const DEFAULT_ALPHA: f32 = 0.5;

    /// While fading out, input interception stops once alpha reaches this
    /// value.
    pub const CLICK_THROUGH_ALPHA: f32 = 0.30;

    /// Below this alpha the scrim node is deactivated entirely.
    pub const DISABLE_EPSILON: f32 = 0.05;

    pub(crate) fn new() -> Self {
        Self {
            alpha: 0.0,
            goal: 0.0,
            visible_alpha: Self::DEFAULT_ALPHA,
            active: false,
            blocking: false,
        }
    }

    /// Current alpha.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// The alpha the fade is moving toward (0.0 when hidden).
    #[inline]
    #[must_use]
    pub fn goal(&self) -> f32 {
        self.goal
    }

    /// Configured alpha used when the scrim is shown.
    #[inline]
    #[must_use]
    pub fn visible_alpha(&self) -> f32 {
        self.visible_alpha
    }

    /// Whether the scrim node is currently activated.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the scrim currently intercepts input.
    #[inline]
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Repositions the scrim after a lifecycle change.
    ///
    /// `changed_is_dialog` is whether the change concerned a dialog;
    /// `dialogs` is the dialog stack in insertion order (last = topmost);
    /// `excluded` is the set of view ids currently mid-removal.
    pub(crate) fn refresh(
        &mut self,
        changed_is_dialog: bool,
        dialogs: &[(ViewId, SurfaceId)],
        excluded: &[ViewId],
        layers: &LayerTable,
        presenter: &mut dyn Presenter,
    ) {
        if changed_is_dialog {
            let topmost = dialogs
                .iter()
                .rev()
                .find(|(id, _)| !excluded.contains(id));
            if let Some(&(_, surface)) = topmost {
                self.show(surface, presenter);
                return;
            }
        }

        if layers.contains_overlay() {
            if let Some(layer) = layers.topmost_occupied_overlay(excluded) {
                if let Some(occupant) = layer.occupant() {
                    self.show(occupant.surface, presenter);
                    return;
                }
            }
        }

        self.hide();
    }

    /// Sets the visible-target alpha and repaints the scrim at it.
    pub(crate) fn set_visible_alpha(&mut self, alpha: f32, presenter: &mut dyn Presenter) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.visible_alpha = alpha;
        if self.goal > 0.0 {
            self.goal = alpha;
        }
        self.alpha = alpha;
        presenter.set_scrim_alpha(self.alpha);
    }

    /// Snaps the scrim off without animating: alpha to zero, input
    /// released, node deactivated.
    pub(crate) fn disable_now(&mut self, presenter: &mut dyn Presenter) {
        self.goal = 0.0;
        self.alpha = 0.0;
        presenter.set_scrim_alpha(0.0);
        if self.blocking {
            self.blocking = false;
            presenter.set_scrim_blocking(false);
        }
        if self.active {
            self.active = false;
            presenter.set_scrim_active(false);
        }
    }

    /// Advances the fade by `dt` seconds.
    pub(crate) fn tick(&mut self, dt: f32, presenter: &mut dyn Presenter) {
        if self.alpha == self.goal {
            return;
        }

        let step = Self::FADE_RATE * dt;
        if self.alpha < self.goal {
            self.alpha = (self.alpha + step).min(self.goal);
        } else {
            self.alpha = (self.alpha - step).max(self.goal);
            if self.goal == 0.0 {
                if self.blocking && self.alpha <= Self::CLICK_THROUGH_ALPHA {
                    self.blocking = false;
                    presenter.set_scrim_blocking(false);
                }
                if self.active && self.alpha < Self::DISABLE_EPSILON {
                    self.active = false;
                    presenter.set_scrim_active(false);
                }
            }
        }
        presenter.set_scrim_alpha(self.alpha);
    }

    /// Places the scrim behind `anchor` and starts fading toward visible.
    /// Placement happens before any state change so the fade never starts
    /// behind a stale surface.
    fn show(&mut self, anchor: SurfaceId, presenter: &mut dyn Presenter) {
        presenter.place_scrim_behind(anchor);
        if !self.active {
            self.active = true;
            presenter.set_scrim_active(true);
        }
        if !self.blocking {
            self.blocking = true;
            presenter.set_scrim_blocking(true);
        }
        self.goal = self.visible_alpha;
    }

    /// Starts fading toward hidden. Blocking and activation drop once the
    /// fade crosses the corresponding thresholds.
    fn hide(&mut self) {
        self.goal = 0.0;
    }
}
