use crate::capture::pump::PumpEvent;
use crate::config::HandwaveConfig;
use crate::session::messages::Msg;
use crate::session::state::{Session, SessionPhase};
use cosmic::iced_futures::Subscription;
use cosmic::widget::{button, container, icon, text};
use cosmic::{app, iced::Length};
use crossbeam_channel::Receiver as CbReceiver;
use futures::SinkExt;
use std::any::TypeId;

pub(crate) fn run() -> cosmic::iced::Result {
    let settings = cosmic::app::Settings::default().size(cosmic::iced::Size::new(760.0, 860.0));
    cosmic::app::run::<App>(settings, ())
}

pub struct App {
    pub core: app::Core,
    pub config: HandwaveConfig,
    pub session: Session,
    /// Handle to the running frame pump, if any
    pub pump: Option<crate::capture::pump::PumpHandle>,
    /// Event stream from the pump, bridged into a subscription
    pub pump_events: Option<CbReceiver<PumpEvent>>,
    /// Latest preview frame, overlay already applied
    pub preview: Option<cosmic::widget::image::Handle>,
    /// Hands from the most recent analysis, drawn onto incoming frames
    pub last_hands: Vec<crate::domain::LandmarkSet>,
    /// Busy indicator for the remote prediction trigger
    pub prediction_running: bool,
    /// Whether a speech synthesizer was found at startup
    pub narrator_available: bool,
    /// Error/status banner shown at the top of the window
    pub banner: Option<String>,
}

impl cosmic::Application for App {
    type Executor = cosmic::executor::Default;

    type Flags = ();

    type Message = Msg;

    const APP_ID: &'static str = "io.github.handwave.Handwave";

    fn core(&self) -> &app::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut app::Core {
        &mut self.core
    }

    fn init(
        core: app::Core,
        _flags: Self::Flags,
    ) -> (Self, cosmic::iced::Task<cosmic::Action<Self::Message>>) {
        let config = HandwaveConfig::load();
        let narrator_available = crate::narrate::available();
        if !narrator_available {
            log::warn!("spd-say not found, narration disabled");
        }

        (
            Self {
                core,
                config,
                session: Session::new(),
                pump: None,
                pump_events: None,
                preview: None,
                last_hands: Vec::new(),
                prediction_running: false,
                narrator_available,
                banner: None,
            },
            cosmic::iced::Task::none(),
        )
    }

    fn view(&self) -> cosmic::Element<'_, Self::Message> {
        let phase = self.session.phase;

        let mut children: Vec<cosmic::Element<'_, Msg>> = Vec::new();

        if let Some(message) = &self.banner {
            children.push(build_banner(message));
        }

        children.push(crate::widget::preview::build_preview(
            self.preview.as_ref(),
            phase,
        ));

        children.push(
            container(text::title2(self.session.sink.shown().label()))
                .width(Length::Fill)
                .align_x(cosmic::iced_core::alignment::Horizontal::Center)
                .into(),
        );

        let start = button::suggested("Start Camera")
            .on_press_maybe((phase == SessionPhase::Idle).then_some(Msg::session_start()));
        let stop = button::destructive("Stop Camera")
            .on_press_maybe((phase == SessionPhase::Active).then_some(Msg::session_stop()));
        let predict = button::standard(if self.prediction_running {
            "Running..."
        } else {
            "Run Final Prediction"
        })
        .on_press_maybe((!self.prediction_running).then_some(Msg::predict_run()));

        let mut controls = cosmic::iced_widget::row![start, stop]
            .spacing(8)
            .align_y(cosmic::iced_core::Alignment::Center);
        if phase == SessionPhase::Starting {
            controls = controls.push(text::body("Starting..."));
        }
        controls = controls.push(cosmic::widget::horizontal_space());
        controls = controls.push(predict);
        children.push(controls.into());

        children.push(build_settings(self));

        container(
            cosmic::iced_widget::Column::with_children(children)
                .spacing(16)
                .padding(16),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
    ) -> cosmic::iced::Task<cosmic::Action<Self::Message>> {
        crate::session::handlers::update_msg(self, message)
    }

    fn subscription(&self) -> Subscription<Self::Message> {
        match &self.pump_events {
            Some(rx) => pump_subscription(rx.clone(), self.session.generation()),
            None => Subscription::none(),
        }
    }
}

/// Bridge the pump's crossbeam channel into an iced subscription
///
/// Keyed by generation so a new session gets a fresh stream and a stopped
/// session's stream is torn down.
fn pump_subscription(rx: CbReceiver<PumpEvent>, generation: u64) -> Subscription<Msg> {
    struct PumpSub;

    Subscription::run_with_id(
        (TypeId::of::<PumpSub>(), generation),
        cosmic::iced::stream::channel(16, move |mut output| async move {
            use cosmic::iced_futures::futures::StreamExt;

            // Bridge the blocking crossbeam receiver into an async stream
            let (tx, mut async_rx) =
                cosmic::iced_futures::futures::channel::mpsc::channel::<PumpEvent>(16);

            std::thread::spawn(move || {
                let mut tx = tx;
                for event in rx.iter() {
                    let mut pending = Some(event);
                    while let Some(ev) = pending.take() {
                        match tx.try_send(ev) {
                            Ok(()) => {}
                            Err(err) if err.is_disconnected() => return,
                            Err(err) => {
                                // UI behind; preview frames may be dropped,
                                // everything else is retried
                                let ev = err.into_inner();
                                if matches!(ev, PumpEvent::Frame { .. }) {
                                    break;
                                }
                                pending = Some(ev);
                                std::thread::sleep(std::time::Duration::from_millis(5));
                            }
                        }
                    }
                }
            });

            while let Some(event) = async_rx.next().await {
                if output.send(Msg::Pump(event)).await.is_err() {
                    break;
                }
            }
        }),
    )
}

/// Error/status banner shown above the preview
fn build_banner<'a>(message: &'a str) -> cosmic::Element<'a, Msg> {
    use cosmic::iced_core::{Background, Border};

    let row = cosmic::iced_widget::row![
        icon::Icon::from(icon::from_name("dialog-warning-symbolic").size(16)),
        text::body(message),
        cosmic::widget::horizontal_space(),
        button::custom(icon::Icon::from(
            icon::from_name("window-close-symbolic").size(16)
        ))
        .class(cosmic::theme::Button::Icon)
        .on_press(Msg::DismissBanner),
    ]
    .spacing(8)
    .align_y(cosmic::iced_core::Alignment::Center);

    container(row)
        .padding(8)
        .width(Length::Fill)
        .class(cosmic::theme::Container::Custom(Box::new(|_theme| {
            cosmic::iced::widget::container::Style {
                background: Some(Background::Color(cosmic::iced_core::Color::from_rgba(
                    0.0, 0.0, 0.0, 0.80,
                ))),
                text_color: Some(cosmic::iced_core::Color::WHITE),
                border: Border {
                    radius: 8.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        })))
        .into()
}

/// Settings rows: narration, classification rule, backend URL
fn build_settings(app: &App) -> cosmic::Element<'_, Msg> {
    use cosmic::iced_widget::{column, row, toggler};

    let narration_label = if app.narrator_available {
        "Narrate gestures"
    } else {
        "Narrate gestures (spd-say not found)"
    };
    let narration_row = row![
        text::body(narration_label),
        cosmic::widget::horizontal_space(),
        toggler(app.config.narration_enabled)
            .on_toggle(|_| Msg::toggle_narration())
            .size(24.0),
    ]
    .spacing(8)
    .align_y(cosmic::iced_core::Alignment::Center)
    .width(Length::Fill);

    let rule_row = row![
        text::body("Corrected thumbs-up rule"),
        cosmic::widget::horizontal_space(),
        toggler(app.config.corrected_thumbs_up)
            .on_toggle(|_| Msg::toggle_corrected_rule())
            .size(24.0),
    ]
    .spacing(8)
    .align_y(cosmic::iced_core::Alignment::Center)
    .width(Length::Fill);

    let backend_row = row![
        text::body("Backend"),
        cosmic::widget::text_input("http://127.0.0.1:5000", &app.config.backend_url)
            .on_input(Msg::set_backend_url),
        button::standard("Check").on_press(Msg::check_backend()),
    ]
    .spacing(8)
    .align_y(cosmic::iced_core::Alignment::Center)
    .width(Length::Fill);

    column![narration_row, rule_row, backend_row]
        .spacing(8)
        .into()
}
