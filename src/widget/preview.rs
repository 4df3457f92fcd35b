//! Live camera preview widget

use cosmic::Element;
use cosmic::iced::Length;
use cosmic::iced_widget::column;
use cosmic::widget::{container, icon, text};

use crate::session::state::SessionPhase;

const PREVIEW_HEIGHT: f32 = 480.0;

/// Build the preview area: the latest camera frame, or a placeholder while
/// the camera is off or still starting.
pub fn build_preview<'a, Msg: Clone + 'static>(
    frame: Option<&cosmic::widget::image::Handle>,
    phase: SessionPhase,
) -> Element<'a, Msg> {
    if let Some(handle) = frame {
        return cosmic::iced_widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .content_fit(cosmic::iced_core::ContentFit::Contain)
            .into();
    }

    let caption = match phase {
        SessionPhase::Starting => "Starting camera...",
        _ => "Camera is off",
    };

    let placeholder = column![
        icon::Icon::from(icon::from_name("camera-web-symbolic").size(64)),
        text::body(caption),
    ]
    .spacing(8)
    .align_x(cosmic::iced_core::Alignment::Center);

    container(placeholder)
        .width(Length::Fill)
        .height(Length::Fixed(PREVIEW_HEIGHT))
        .align_x(cosmic::iced_core::alignment::Horizontal::Center)
        .align_y(cosmic::iced_core::alignment::Vertical::Center)
        .into()
}
