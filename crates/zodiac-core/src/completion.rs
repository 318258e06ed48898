/// Exit fade that hands control back to the page.
///
/// `trigger` starts the fade at most once; the callback runs exactly once,
/// when the fade has finished. Without a callback the fade still runs.
pub struct CompletionHook {
    fade_ms: f64,
    state: CompletionState,
    on_loaded: Option<Box<dyn FnOnce()>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompletionState {
    Idle,
    FadingOut { since_ms: f64 },
    Done,
}

impl CompletionHook {
    pub fn new(fade_ms: f64, on_loaded: Option<Box<dyn FnOnce()>>) -> Self {
        Self {
            fade_ms: fade_ms.max(0.0),
            state: CompletionState::Idle,
            on_loaded,
        }
    }

    /// Returns true only for the call that actually started the fade.
    pub fn trigger(&mut self, now_ms: f64) -> bool {
        if self.state != CompletionState::Idle {
            return false;
        }
        self.state = CompletionState::FadingOut { since_ms: now_ms };
        log::info!("[loader] complete, fading out over {} ms", self.fade_ms);
        true
    }

    /// Advance the fade and return the overlay opacity.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        match self.state {
            CompletionState::Idle => 1.0,
            CompletionState::Done => 0.0,
            CompletionState::FadingOut { since_ms } => {
                let f = if self.fade_ms <= 0.0 {
                    1.0
                } else {
                    ((now_ms - since_ms) / self.fade_ms).clamp(0.0, 1.0) as f32
                };
                if f >= 1.0 {
                    self.state = CompletionState::Done;
                    match self.on_loaded.take() {
                        Some(cb) => cb(),
                        None => log::debug!("[loader] no on_loaded callback registered"),
                    }
                    0.0
                } else {
                    1.0 - f
                }
            }
        }
    }

    #[inline]
    pub fn state(&self) -> CompletionState {
        self.state
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == CompletionState::Done
    }

    /// Drop the pending callback without firing it.
    pub fn cancel(&mut self) {
        if self.on_loaded.take().is_some() {
            log::debug!("[loader] unmounted before completion; callback dropped");
        }
    }
}
