//! Recording platform double for state machine tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::color::Color;
use crate::event::WindowState;
use crate::platform::{Placement, Platform, StyleField, SurfaceHandle, WindowResult};
use crate::rect::Rect;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    PlaceBehind {
        surface: SurfaceHandle,
        owner: SurfaceHandle,
        rect: Rect,
        placement: Placement,
    },
    SetStyle {
        surface: SurfaceHandle,
        field: StyleField,
        value: u32,
    },
    Opacity {
        surface: SurfaceHandle,
        opacity: f64,
    },
    Fill {
        surface: SurfaceHandle,
        color: Color,
    },
    DragMove(SurfaceHandle),
    ApplyState(SurfaceHandle, WindowState),
    Close(SurfaceHandle),
}

pub(crate) struct RecordingPlatform {
    calls: RefCell<Vec<Call>>,
    styles: RefCell<HashMap<(SurfaceHandle, StyleField), u32>>,
    scale: Cell<f64>,
    failing: Cell<bool>,
}

impl RecordingPlatform {
    pub(crate) fn new(scale: f64) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            styles: RefCell::new(HashMap::new()),
            scale: Cell::new(scale),
            failing: Cell::new(false),
        }
    }

    pub(crate) fn set_scale(&self, scale: f64) {
        self.scale.set(scale);
    }

    /// Makes every fallible call return an error (calls are still recorded).
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub(crate) fn last_placement(&self, surface: SurfaceHandle) -> Option<Rect> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::PlaceBehind {
                surface: s, rect, ..
            } if *s == surface => Some(*rect),
            _ => None,
        })
    }

    pub(crate) fn last_opacity(&self, surface: SurfaceHandle) -> Option<f64> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::Opacity {
                surface: s,
                opacity,
            } if *s == surface => Some(*opacity),
            _ => None,
        })
    }

    pub(crate) fn style(&self, surface: SurfaceHandle, field: StyleField) -> u32 {
        self.styles
            .borrow()
            .get(&(surface, field))
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, call: Call) -> WindowResult<()> {
        self.calls.borrow_mut().push(call);
        if self.failing.get() {
            return Err("recording platform set to fail".into());
        }
        Ok(())
    }
}

impl Platform for RecordingPlatform {
    fn place_behind(
        &self,
        surface: SurfaceHandle,
        owner: SurfaceHandle,
        rect: Rect,
        placement: Placement,
    ) -> WindowResult<()> {
        self.record(Call::PlaceBehind {
            surface,
            owner,
            rect,
            placement,
        })
    }

    fn style_bits(&self, surface: SurfaceHandle, field: StyleField) -> WindowResult<u32> {
        Ok(self.style(surface, field))
    }

    fn set_style_bits(
        &self,
        surface: SurfaceHandle,
        field: StyleField,
        value: u32,
    ) -> WindowResult<()> {
        self.styles.borrow_mut().insert((surface, field), value);
        self.record(Call::SetStyle {
            surface,
            field,
            value,
        })
    }

    fn scale_factor_of(&self, _surface: SurfaceHandle) -> f64 {
        self.scale.get()
    }

    fn set_opacity(&self, surface: SurfaceHandle, opacity: f64) -> WindowResult<()> {
        self.record(Call::Opacity { surface, opacity })
    }

    fn set_fill(&self, surface: SurfaceHandle, color: Color) -> WindowResult<()> {
        self.record(Call::Fill { surface, color })
    }

    fn begin_drag_move(&self, surface: SurfaceHandle) -> WindowResult<()> {
        self.record(Call::DragMove(surface))
    }

    fn apply_state(&self, surface: SurfaceHandle, state: WindowState) -> WindowResult<()> {
        self.record(Call::ApplyState(surface, state))
    }

    fn close_surface(&self, surface: SurfaceHandle) -> WindowResult<()> {
        self.record(Call::Close(surface))
    }
}
