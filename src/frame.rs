use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use moonsearch_core::{Cue, PhaseSequencer};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::audio::WebAudioBackend;
use crate::hud::Hud;
use crate::orientation::OrientationSubscription;

pub type Sequencer = PhaseSequencer<WebAudioBackend>;

/// Seconds since page start; the clock every sequencer call is fed with.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

pub struct FrameContext {
    pub sequencer: Rc<RefCell<Sequencer>>,
    pub hud: Hud,
    pub clock: Clock,
    pub orientation: Option<OrientationSubscription>,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = self.clock.now();
        let cues = {
            let mut seq = self.sequencer.borrow_mut();
            seq.tick(now);
            seq.drain_cues()
        };
        for cue in &cues {
            if let Cue::OrientationWanted(on) = cue {
                self.set_orientation(*on);
            }
            self.hud.apply(cue);
        }
    }

    fn set_orientation(&mut self, on: bool) {
        if !on {
            // dropping the handle removes the DOM listener
            self.orientation = None;
            return;
        }
        if self.orientation.is_some() {
            return;
        }
        let sequencer = Rc::downgrade(&self.sequencer);
        let clock = self.clock;
        let subscription = OrientationSubscription::subscribe(move |raw| {
            let Some(seq) = sequencer.upgrade() else {
                return;
            };
            if let Ok(mut seq) = seq.try_borrow_mut() {
                seq.on_orientation(raw, clock.now());
            }
        });
        match subscription {
            Ok(s) => self.orientation = Some(s),
            Err(e) => log::error!("[frame] orientation unavailable: {:#}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
