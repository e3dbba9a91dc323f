//! WebAudio implementation of the core audio backend.

use std::cell::RefCell;
use std::rc::Weak;

use fnv::FnvHashMap;
use moonsearch_core::{
    AssetLoader, AudioBackend, AudioEngine, AudioError, LoadError, SoundKey, VoiceId,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type WebEngine = AudioEngine<WebAudioBackend>;

struct VoiceNodes {
    source: web::AudioBufferSourceNode,
    gain: web::GainNode,
    // dropped with the voice, whether or not `ended` ever fires
    onended: Option<Closure<dyn FnMut()>>,
}

pub struct WebAudioBackend {
    ctx: web::AudioContext,
    voices: FnvHashMap<VoiceId, VoiceNodes>,
    resume_requested: bool,
    ended_sink: Option<Weak<RefCell<WebEngine>>>,
}

fn js_msg(e: JsValue) -> String {
    format!("{:?}", e)
}

impl WebAudioBackend {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| AudioError::Unavailable(js_msg(e)))?;
        Ok(Self {
            ctx,
            voices: FnvHashMap::default(),
            resume_requested: false,
            ended_sink: None,
        })
    }

    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }

    /// Route source `ended` events back into the engine that owns this
    /// backend.
    pub fn set_ended_sink(&mut self, engine: Weak<RefCell<WebEngine>>) {
        self.ended_sink = Some(engine);
    }

    fn create_voice(
        &self,
        buffer: &web::AudioBuffer,
        looping: bool,
        volume: f32,
    ) -> Result<VoiceNodes, JsValue> {
        let source = self.ctx.create_buffer_source()?;
        source.set_buffer(Some(buffer));
        source.set_loop(looping);
        let gain = self.ctx.create_gain()?;
        gain.gain().set_value(volume);
        source.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&self.ctx.destination())?;
        Ok(VoiceNodes {
            source,
            gain,
            onended: None,
        })
    }
}

#[inline]
fn scheduled(source: &web::AudioBufferSourceNode) -> &web::AudioScheduledSourceNode {
    source.as_ref()
}

// Runs on the next task so the handler never releases its own closure
// while it is executing.
fn notify_ended(sink: Weak<RefCell<WebEngine>>, voice: VoiceId) {
    spawn_local(async move {
        if let Some(engine) = sink.upgrade() {
            engine.borrow_mut().handle_ended(voice);
        }
    });
}

impl AudioBackend for WebAudioBackend {
    type Buffer = web::AudioBuffer;

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn is_running(&self) -> bool {
        self.resume_requested || self.ctx.state() == web::AudioContextState::Running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.ctx.state() == web::AudioContextState::Running {
            return Ok(());
        }
        self.ctx
            .resume()
            .map_err(|e| AudioError::Rejected(js_msg(e)))?;
        self.resume_requested = true;
        Ok(())
    }

    fn start(
        &mut self,
        voice: VoiceId,
        buffer: &web::AudioBuffer,
        looping: bool,
        volume: f32,
    ) -> Result<(), AudioError> {
        let mut nodes = self
            .create_voice(buffer, looping, volume)
            .map_err(|e| AudioError::Node(js_msg(e)))?;
        if let Some(sink) = self.ended_sink.clone() {
            let onended = Closure::wrap(
                Box::new(move || notify_ended(sink.clone(), voice)) as Box<dyn FnMut()>
            );
            scheduled(&nodes.source).set_onended(Some(onended.as_ref().unchecked_ref()));
            nodes.onended = Some(onended);
        }
        scheduled(&nodes.source)
            .start()
            .map_err(|e| AudioError::Rejected(js_msg(e)))?;
        self.voices.insert(voice, nodes);
        Ok(())
    }

    fn stop(&mut self, voice: VoiceId, when: f64) {
        if let Some(nodes) = self.voices.get(&voice) {
            if let Err(e) = scheduled(&nodes.source).stop_with_when(when.max(0.0)) {
                log::debug!("[audio] stop {:?}: {:?}", voice, e);
            }
        }
    }

    fn cancel_ramps(&mut self, voice: VoiceId, from: f64) {
        if let Some(nodes) = self.voices.get(&voice) {
            let param = nodes.gain.gain();
            let current = param.value();
            _ = param.cancel_scheduled_values(from);
            param.set_value(current);
        }
    }

    fn ramp_gain(&mut self, voice: VoiceId, target: f32, from: f64, until: f64) {
        if let Some(nodes) = self.voices.get(&voice) {
            let param = nodes.gain.gain();
            _ = param.set_value_at_time(param.value(), from);
            _ = param.linear_ramp_to_value_at_time(target, until);
        }
    }

    fn release(&mut self, voice: VoiceId) {
        if let Some(nodes) = self.voices.remove(&voice) {
            scheduled(&nodes.source).set_onended(None);
            _ = nodes.gain.disconnect();
        }
    }
}

/// Fetches manifest entries over HTTP and decodes them on the context.
pub struct WebLoader {
    ctx: web::AudioContext,
}

impl WebLoader {
    pub fn new(ctx: web::AudioContext) -> Self {
        Self { ctx }
    }
}

impl AssetLoader for WebLoader {
    type Buffer = web::AudioBuffer;

    async fn load(&self, key: SoundKey, url: &str) -> anyhow::Result<web::AudioBuffer> {
        let fetch_err = |reason: String| LoadError::Fetch {
            url: url.to_string(),
            reason,
        };
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| fetch_err(js_msg(e)))?
            .dyn_into()
            .map_err(|e| fetch_err(js_msg(e)))?;
        if !resp.ok() {
            return Err(fetch_err(format!("HTTP {}", resp.status())).into());
        }
        let bytes = JsFuture::from(resp.array_buffer().map_err(|e| fetch_err(js_msg(e)))?)
            .await
            .map_err(|e| fetch_err(js_msg(e)))?;
        let array: js_sys::ArrayBuffer = bytes.dyn_into().map_err(|_| LoadError::NotAudio {
            url: url.to_string(),
        })?;

        let decode_err = |e: JsValue| LoadError::Decode {
            key,
            reason: js_msg(e),
        };
        let decoded = JsFuture::from(self.ctx.decode_audio_data(&array).map_err(decode_err)?)
            .await
            .map_err(decode_err)?;
        let buffer: web::AudioBuffer = decoded.dyn_into().map_err(decode_err)?;
        log::debug!("[audio] decoded {:?} ({:.1}s)", key, buffer.duration());
        Ok(buffer)
    }
}
