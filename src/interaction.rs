//! Pointer handling per view.
//!
//! Every view has exactly one active [`ViewInteractionHandler`]: slice
//! scrolling by default, or measurement while measurement mode is on. The
//! two never run at the same time on one view.

use crate::enums::{Orientation, PointerButton, ScrollDirection};
use crate::measurement::{MeasurementEffect, MeasurementStateMachine};
use crate::navigation::NavigationState;
use crate::render::RenderService;

/// Pointer input in screen coordinates of the view it happened on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Press { button: PointerButton, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Scroll(ScrollDirection),
}

/// What the engine has to follow up on after a handler ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    Ignored,
    /// The view's slice index moved to the contained value.
    SliceChanged(usize),
    /// The measurement overlay of the view changed.
    OverlayChanged,
    /// The measurement state moved without touching what is drawn, e.g. a
    /// first point was picked or a pending one dropped before any preview.
    MeasurementChanged,
}

pub struct InteractionContext<'a> {
    pub navigation: &'a mut NavigationState,
    pub render: &'a mut dyn RenderService,
}

pub trait ViewInteractionHandler {
    fn handle(
        &mut self,
        view: Orientation,
        event: PointerEvent,
        context: &mut InteractionContext<'_>,
    ) -> Interaction;
}

/// Wheel steps move the view one slice, clamped at either end.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollNavigation;

impl ViewInteractionHandler for ScrollNavigation {
    fn handle(
        &mut self,
        view: Orientation,
        event: PointerEvent,
        context: &mut InteractionContext<'_>,
    ) -> Interaction {
        match event {
            PointerEvent::Scroll(direction) => context
                .navigation
                .step(view, direction)
                .map_or(Interaction::Ignored, Interaction::SliceChanged),
            _ => Interaction::Ignored,
        }
    }
}

/// Feeds picks under the pointer into a [`MeasurementStateMachine`].
#[derive(Debug, Default)]
pub struct MeasurementInteraction {
    machine: MeasurementStateMachine,
}

impl MeasurementInteraction {
    pub fn armed() -> Self {
        let mut machine = MeasurementStateMachine::new();
        machine.arm();
        Self { machine }
    }

    pub fn machine(&self) -> &MeasurementStateMachine {
        &self.machine
    }

    /// Leave measurement mode, taking down any preview line.
    pub fn disarm(mut self, view: Orientation, render: &mut dyn RenderService) {
        let effects = self.machine.disarm();
        apply_effects(view, &effects, render);
    }
}

impl ViewInteractionHandler for MeasurementInteraction {
    fn handle(
        &mut self,
        view: Orientation,
        event: PointerEvent,
        context: &mut InteractionContext<'_>,
    ) -> Interaction {
        let before = self.machine.state();
        let effects = match event {
            PointerEvent::Press {
                button: PointerButton::Primary,
                x,
                y,
            } => {
                let pick = context.render.pick(view, x, y);
                self.machine.primary_click(pick)
            }
            PointerEvent::Press {
                button: PointerButton::Secondary,
                ..
            } => self.machine.secondary_click(),
            PointerEvent::Move { x, y } => {
                if self.machine.pending_point().is_none() {
                    return Interaction::Ignored;
                }
                let pick = context.render.pick(view, x, y);
                self.machine.pointer_move(pick)
            }
            PointerEvent::Scroll(_) => return Interaction::Ignored,
        };
        if effects.is_empty() {
            return if self.machine.state() == before {
                Interaction::Ignored
            } else {
                Interaction::MeasurementChanged
            };
        }
        apply_effects(view, &effects, context.render);
        Interaction::OverlayChanged
    }
}

fn apply_effects(view: Orientation, effects: &[MeasurementEffect], render: &mut dyn RenderService) {
    for effect in effects {
        match effect {
            MeasurementEffect::Preview { from, to } => render.draw_preview_line(view, *from, *to),
            MeasurementEffect::ClearPreview => render.remove_preview_line(view),
            MeasurementEffect::Commit(measurement) => render.draw_measurement(view, measurement),
        }
    }
}

/// The handler currently attached to a view.
#[derive(Debug)]
pub enum ViewHandler {
    Scroll(ScrollNavigation),
    Measure(MeasurementInteraction),
}

impl Default for ViewHandler {
    fn default() -> Self {
        ViewHandler::Scroll(ScrollNavigation)
    }
}

impl ViewHandler {
    pub fn measurement(&self) -> Option<&MeasurementStateMachine> {
        match self {
            ViewHandler::Measure(interaction) => Some(interaction.machine()),
            ViewHandler::Scroll(_) => None,
        }
    }

    /// The view was redrawn from scratch, which took every overlay with it:
    /// committed measurements and any half-finished one are gone.
    pub fn on_redraw(&mut self) {
        if let ViewHandler::Measure(interaction) = self {
            interaction.machine.view_redrawn();
        }
    }

    /// Swap in measurement or scroll handling. Switching off measurement
    /// discards the pending point and preview of the old handler.
    pub fn set_measuring(&mut self, enabled: bool, view: Orientation, render: &mut dyn RenderService) {
        match (std::mem::take(self), enabled) {
            (ViewHandler::Measure(interaction), true) => *self = ViewHandler::Measure(interaction),
            (ViewHandler::Measure(interaction), false) => interaction.disarm(view, render),
            (ViewHandler::Scroll(_), true) => *self = ViewHandler::Measure(MeasurementInteraction::armed()),
            (ViewHandler::Scroll(_), false) => {}
        }
    }
}

impl ViewInteractionHandler for ViewHandler {
    fn handle(
        &mut self,
        view: Orientation,
        event: PointerEvent,
        context: &mut InteractionContext<'_>,
    ) -> Interaction {
        match self {
            ViewHandler::Scroll(handler) => handler.handle(view, event, context),
            ViewHandler::Measure(handler) => handler.handle(view, event, context),
        }
    }
}
