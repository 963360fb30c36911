//! Per-tick input snapshot

/// Character-specific extra buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtraAction {
    Primary,
    Secondary,
}

impl ExtraAction {
    fn index(self) -> usize {
        match self {
            ExtraAction::Primary => 0,
            ExtraAction::Secondary => 1,
        }
    }
}

/// Logical action state delivered by the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// -1 (left) to 1 (right)
    pub run_axis: f32,
    /// -1 (down) to 1 (up)
    pub vertical_axis: f32,
    pub jump: bool,
    pub jump_cancel: bool,
    pub double_tap_run: bool,
    pub extra_pressed: [bool; 2],
    pub extra_held: [bool; 2],
}

impl InputFrame {
    pub fn with_run(mut self, axis: f32) -> Self {
        self.run_axis = axis;
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    pub fn with_jump_cancel(mut self) -> Self {
        self.jump_cancel = true;
        self
    }

    pub fn with_double_tap(mut self) -> Self {
        self.double_tap_run = true;
        self
    }

    pub fn with_extra(mut self, action: ExtraAction, pressed: bool, held: bool) -> Self {
        self.extra_pressed[action.index()] = pressed;
        self.extra_held[action.index()] = held;
        self
    }

    pub fn extra_pressed(&self, action: ExtraAction) -> bool {
        self.extra_pressed[action.index()]
    }

    pub fn extra_held(&self, action: ExtraAction) -> bool {
        self.extra_held[action.index()]
    }
}

/// Accumulates input between ticks
///
/// Axes and held buttons take the latest value. Edge-triggered buttons are
/// OR'd together and survive until [`end_tick`](Self::end_tick).
#[derive(Debug, Clone, Copy, Default)]
pub struct InputLatch {
    frame: InputFrame,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, input: InputFrame) {
        let f = &mut self.frame;
        f.run_axis = input.run_axis.clamp(-1.0, 1.0);
        f.vertical_axis = input.vertical_axis.clamp(-1.0, 1.0);
        f.extra_held = input.extra_held;
        f.jump |= input.jump;
        f.jump_cancel |= input.jump_cancel;
        f.double_tap_run |= input.double_tap_run;
        for (latched, pressed) in f.extra_pressed.iter_mut().zip(input.extra_pressed) {
            *latched |= pressed;
        }
    }

    pub fn frame(&self) -> &InputFrame {
        &self.frame
    }

    /// Drop edge-triggered state; axes and held buttons persist
    pub fn end_tick(&mut self) {
        let f = &mut self.frame;
        f.jump = false;
        f.jump_cancel = false;
        f.double_tap_run = false;
        f.extra_pressed = [false; 2];
    }
}
