#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use moonsearch_core::{load_all, AudioEngine, ExperienceConfig, PhaseSequencer, UserInput};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod audio;
mod constants;
mod dom;
mod frame;
mod hud;
mod orientation;
mod style;

use constants::*;
use frame::{Clock, FrameContext, Sequencer};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("moonsearch-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let backend = audio::WebAudioBackend::new()?;
    let ctx = backend.context().clone();
    let engine = Rc::new(RefCell::new(AudioEngine::new(backend)));
    engine
        .borrow_mut()
        .backend_mut()
        .set_ended_sink(Rc::downgrade(&engine));

    let sequencer = Rc::new(RefCell::new(PhaseSequencer::new(
        ExperienceConfig::default(),
        engine.clone(),
        rand::random::<u64>(),
    )?));
    let clock = Clock::start();

    wire_buttons(&document, &sequencer, clock);

    let frame_ctx = Rc::new(RefCell::new(FrameContext {
        sequencer: sequencer.clone(),
        hud: hud::Hud::new(document),
        clock,
        orientation: None,
    }));
    frame::start_loop(frame_ctx);

    let loader = audio::WebLoader::new(ctx);
    let summary = load_all(&*engine, &loader).await;
    log::info!(
        "[audio] {} loaded, {} skipped, {} failed",
        summary.loaded,
        summary.skipped,
        summary.failed.len()
    );
    Ok(())
}

fn wire_buttons(document: &web_sys::Document, sequencer: &Rc<RefCell<Sequencer>>, clock: Clock) {
    let seq = sequencer.clone();
    dom::add_click_listener(document, START_BUTTON_ID, move || {
        seq.borrow_mut().handle(UserInput::Start, clock.now());
    });

    let seq = sequencer.clone();
    dom::add_click_listener(document, IGNITION_BUTTON_ID, move || {
        // both the audio unlock and the permission prompt need the gesture
        seq.borrow().audio().borrow_mut().unlock();
        let prompt = orientation::request_permission();
        let seq = seq.clone();
        spawn_local(async move {
            let permission = orientation::resolve_permission(prompt).await;
            log::info!("[orientation] permission {:?}", permission);
            seq.borrow_mut()
                .handle(UserInput::Ignition(permission), clock.now());
        });
    });

    let seq = sequencer.clone();
    dom::add_click_listener(document, POPUP_CLOSE_ID, move || {
        seq.borrow_mut().handle(UserInput::DismissPopup, clock.now());
    });
}
