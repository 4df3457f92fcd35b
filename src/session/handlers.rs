//! Update handlers: all state mutation happens here, on the UI thread

use cosmic::Task;

use super::messages::{Msg, PredictMsg, SessionMsg, SettingsMsg};
use crate::capture::pump::{self, PumpEvent};
use crate::core::app::App;
use crate::domain::{ThumbsUpRule, classify};

pub fn update_msg(app: &mut App, msg: Msg) -> Task<cosmic::Action<Msg>> {
    match msg {
        Msg::Session(m) => update_session(app, m),
        Msg::Pump(event) => update_pump(app, event),
        Msg::Predict(m) => update_predict(app, m),
        Msg::Settings(m) => update_settings(app, m),
        Msg::DismissBanner => {
            app.banner = None;
            Task::none()
        }
    }
}

fn update_session(app: &mut App, msg: SessionMsg) -> Task<cosmic::Action<Msg>> {
    match msg {
        SessionMsg::Start => {
            if !app.session.begin_start() {
                log::warn!("Start requested while session is {:?}", app.session.phase);
                return Task::none();
            }
            app.banner = None;
            log::info!("Starting camera session");
            let (handle, events) = pump::spawn(app.config.clone(), app.session.generation());
            app.pump = Some(handle);
            app.pump_events = Some(events);
            Task::none()
        }
        SessionMsg::Stop => {
            if !app.session.can_stop() {
                log::warn!("Stop requested while session is {:?}", app.session.phase);
                return Task::none();
            }
            teardown_session(app);
            log::info!("Camera session stopped");
            Task::none()
        }
    }
}

/// Release the pump and return the session to Idle; anything still in
/// flight is invalidated by the generation bump in `Session::end`.
fn teardown_session(app: &mut App) {
    if let Some(pump) = app.pump.take() {
        pump.stop();
    }
    app.pump_events = None;
    app.session.end();
    app.preview = None;
    app.last_hands.clear();
}

fn update_pump(app: &mut App, event: PumpEvent) -> Task<cosmic::Action<Msg>> {
    match event {
        PumpEvent::Ready {
            generation,
            width,
            height,
        } => {
            if generation != app.session.generation() {
                log::debug!("Ignoring ready signal from a stopped session");
                return Task::none();
            }
            if app.session.mark_active() {
                log::info!("Camera session active ({width}x{height})");
            }
            Task::none()
        }
        PumpEvent::Frame { generation, frame } => {
            if !app.session.accepts(generation) {
                return Task::none();
            }
            let mut rgba = frame.rgba;
            if !app.last_hands.is_empty() {
                crate::render::overlay::draw_hand_landmarks(&mut rgba, &app.last_hands);
            }
            app.preview = Some(cosmic::widget::image::Handle::from_rgba(
                rgba.width(),
                rgba.height(),
                rgba.into_vec(),
            ));
            Task::none()
        }
        PumpEvent::Hands { generation, hands } => {
            // A result landing after a stop must not touch the UI
            if !app.session.accepts(generation) {
                log::debug!("Discarding stale analysis result");
                return Task::none();
            }

            let rule = if app.config.corrected_thumbs_up {
                ThumbsUpRule::Corrected
            } else {
                ThumbsUpRule::Literal
            };
            let gesture = hands.first().map(|hand| classify(hand, rule));
            app.last_hands = hands;

            if let Some(label) = app.session.sink.observe(gesture) {
                log::info!("Recognized gesture: {label}");
                if app.config.narration_enabled && app.narrator_available {
                    crate::narrate::speak(label);
                }
            }
            Task::none()
        }
        PumpEvent::Failed { generation, error } => {
            if generation != app.session.generation() {
                return Task::none();
            }
            log::error!("Capture session failed: {error}");
            app.banner = Some(error);
            teardown_session(app);
            Task::none()
        }
        PumpEvent::Closed { generation } => {
            log::debug!("Capture thread exited (generation {generation})");
            Task::none()
        }
    }
}

fn update_predict(app: &mut App, msg: PredictMsg) -> Task<cosmic::Action<Msg>> {
    match msg {
        PredictMsg::Run => {
            if app.prediction_running {
                return Task::none();
            }
            app.prediction_running = true;
            app.banner = None;
            let base_url = app.config.backend_url.clone();
            Task::perform(
                async move {
                    crate::remote::run_final_prediction(&base_url)
                        .await
                        .map_err(|err| err.to_string())
                },
                |result| cosmic::Action::App(Msg::Predict(PredictMsg::Finished(result))),
            )
        }
        PredictMsg::Finished(result) => {
            // The busy indicator is released on every outcome
            app.prediction_running = false;
            match result {
                Ok(()) => {
                    log::info!("Final prediction ready");
                    crate::remote::open_results(&app.config.backend_url);
                }
                Err(error) => {
                    log::error!("Final prediction failed: {error}");
                    app.banner = Some(format!("Error: {error}"));
                }
            }
            Task::none()
        }
        PredictMsg::CheckBackend => {
            let base_url = app.config.backend_url.clone();
            Task::perform(
                async move {
                    crate::remote::check_health(&base_url)
                        .await
                        .map_err(|err| err.to_string())
                },
                |result| cosmic::Action::App(Msg::Predict(PredictMsg::BackendChecked(result))),
            )
        }
        PredictMsg::BackendChecked(result) => {
            app.banner = Some(match result {
                Ok(()) => "Backend is reachable".to_string(),
                Err(error) => format!("Backend unreachable: {error}"),
            });
            Task::none()
        }
    }
}

fn update_settings(app: &mut App, msg: SettingsMsg) -> Task<cosmic::Action<Msg>> {
    match msg {
        SettingsMsg::ToggleNarration => {
            app.config.narration_enabled = !app.config.narration_enabled;
            app.config.save();
        }
        SettingsMsg::ToggleCorrectedRule => {
            app.config.corrected_thumbs_up = !app.config.corrected_thumbs_up;
            log::info!(
                "Thumbs-up rule: {}",
                if app.config.corrected_thumbs_up {
                    "corrected"
                } else {
                    "literal"
                }
            );
            app.config.save();
        }
        SettingsMsg::SetBackendUrl(url) => {
            app.config.backend_url = url;
            app.config.save();
        }
    }
    Task::none()
}
