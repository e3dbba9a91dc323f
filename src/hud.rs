//! Applies sequencer cues to the page.

use moonsearch_core::{Cue, GuidanceFrame, ImageKey, Phase, TargetKind};
use web_sys as web;

use crate::constants::*;
use crate::dom;
use crate::style;

pub struct Hud {
    document: web::Document,
    shown_image: Option<ImageKey>,
}

fn screen_id(phase: Phase) -> &'static str {
    match phase {
        Phase::Intro => SCREEN_INTRO_ID,
        Phase::Launch => SCREEN_LAUNCH_ID,
        Phase::Search => SCREEN_SEARCH_ID,
        Phase::Climax => SCREEN_CLIMAX_ID,
    }
}

impl Hud {
    pub fn new(document: web::Document) -> Self {
        Self {
            document,
            shown_image: None,
        }
    }

    pub fn apply(&mut self, cue: &Cue) {
        let doc = &self.document;
        match cue {
            Cue::PhaseEntered(phase) => {
                for p in [Phase::Intro, Phase::Launch, Phase::Search, Phase::Climax] {
                    dom::show(doc, screen_id(p), p == *phase);
                }
                if *phase == Phase::Search {
                    dom::show(doc, TARGET_ID, false);
                    dom::show(doc, POPUP_ID, false);
                }
            }
            Cue::IntroLine(i) => {
                if let Some((text, sub)) = INTRO_LINES.get(*i) {
                    dom::append_line(doc, INTRO_LOG_ID, "intro-line", text);
                    dom::append_line(doc, INTRO_LOG_ID, "intro-sub", sub);
                }
                if *i == 0 {
                    dom::show(doc, START_BUTTON_ID, false);
                }
            }
            Cue::Warp => {
                dom::set_class(doc, SCREEN_LAUNCH_ID, WARP_CLASS, true);
                dom::set_text(doc, LAUNCH_STATUS_ID, WARP_TEXT);
                dom::show(doc, IGNITION_BUTTON_ID, false);
            }
            Cue::SensorDenied => dom::set_text(doc, LAUNCH_STATUS_ID, SENSOR_DENIED_TEXT),
            Cue::AwaitingSensor => {
                dom::set_text(doc, SENSOR_NOTICE_ID, AWAITING_SENSOR_TEXT);
                dom::show(doc, SENSOR_NOTICE_ID, true);
            }
            Cue::TargetsSpawned(targets) => {
                dom::show(doc, SENSOR_NOTICE_ID, false);
                log::info!("[hud] {} targets in the sky", targets.len());
            }
            Cue::Guidance(frame) => self.apply_guidance(frame),
            Cue::LockStarted(_) => dom::set_class(doc, LOCK_RING_ID, LOCKED_CLASS, true),
            Cue::LockCancelled(_) => {
                dom::set_class(doc, LOCK_RING_ID, LOCKED_CLASS, false);
                dom::set_style(doc, LOCK_BAR_ID, "width", "0%");
            }
            Cue::TargetFound { kind, .. } => {
                dom::set_class(doc, LOCK_RING_ID, LOCKED_CLASS, false);
                self.show_discovery(kind);
            }
            Cue::PopupDismissed(_) => {
                dom::show(doc, POPUP_ID, false);
                dom::set_style(doc, LOCK_BAR_ID, "width", "0%");
            }
            Cue::ShootingStar(star) => {
                dom::set_attr(
                    doc,
                    SHOOTING_STAR_ID,
                    "style",
                    &style::shooting_star_style(star.top_percent, star.left_percent, star.scale),
                );
                dom::show(doc, SHOOTING_STAR_ID, true);
            }
            Cue::ShootingStarFaded => dom::show(doc, SHOOTING_STAR_ID, false),
            Cue::OrientationWanted(_) => {}
        }
    }

    fn apply_guidance(&mut self, frame: &GuidanceFrame) {
        let doc = &self.document;
        let g = &frame.guidance;

        if self.shown_image != Some(frame.image) {
            dom::set_attr(doc, TARGET_IMAGE_ID, "src", frame.image.url());
            self.shown_image = Some(frame.image);
        }
        dom::show(doc, TARGET_ID, g.is_on_screen(dom::viewport()));
        dom::set_style(
            doc,
            TARGET_ID,
            "transform",
            &style::centered_translate(g.screen_offset.x, g.screen_offset.y),
        );
        dom::set_class(doc, TARGET_ID, LOCKED_CLASS, frame.in_lock_range);

        dom::show(doc, ARROW_ID, g.arrow_visible);
        dom::set_style(doc, ARROW_ID, "transform", &style::rotate_deg(g.arrow_angle));
        dom::set_style(doc, ARROW_ID, "opacity", &style::opacity(g.arrow_opacity));

        dom::set_text(doc, SIGNAL_ID, &style::signal_label(g.signal_percent));
        dom::set_text(
            doc,
            LOCK_RING_ID,
            &style::distance_label(g.distance, frame.lock_progress > 0.0),
        );
        dom::set_style(doc, LOCK_BAR_ID, "width", &style::width_percent(frame.lock_progress));
    }

    fn show_discovery(&self, kind: &TargetKind) {
        let doc = &self.document;
        match kind {
            TargetKind::Win => {}
            TargetKind::Decoy(info) => {
                dom::set_text(doc, POPUP_TITLE_ID, info.name);
                let body = format!(
                    "{}\nGRAVITY: {}\nTEMP: {}\nATMOSPHERE: {}\n\n{}",
                    info.classification,
                    info.gravity,
                    info.temperature,
                    info.atmosphere,
                    info.description
                );
                dom::set_text(doc, POPUP_BODY_ID, &body);
                dom::show(doc, POPUP_ID, true);
            }
            TargetKind::Lifeform(info) => {
                dom::set_text(doc, POPUP_TITLE_ID, info.name);
                let body = format!(
                    "{}\nHABITAT: {}\n\n{}",
                    info.classification, info.habitat, info.description
                );
                dom::set_text(doc, POPUP_BODY_ID, &body);
                dom::show(doc, POPUP_ID, true);
            }
        }
    }
}
