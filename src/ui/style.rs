/// Visual tokens for gallery cells
///
/// Supplied by the embedding page; the gallery passes them through untouched.
use iced::gradient::Linear;
use iced::widget::container;
use iced::{Background, Border, Color, Degrees, Gradient};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryStyle {
    pub corner_radius: f32,
    /// Cell background behind placeholder and content
    pub background: Color,
    /// Start and end of the placeholder shimmer gradient
    pub placeholder: [Color; 2],
    /// Start and end of the hover overlay gradient
    pub overlay: [Color; 2],
}

impl Default for GalleryStyle {
    fn default() -> Self {
        Self {
            corner_radius: 8.0,
            background: Color::from_rgb8(0xf5, 0xf5, 0xf5),
            placeholder: [
                Color::from_rgb8(0xe5, 0xe5, 0xe5),
                Color::from_rgb8(0xd4, 0xd4, 0xd4),
            ],
            overlay: [
                Color::from_rgba8(0x63, 0x66, 0xf1, 0.1),
                Color::from_rgba8(0xf5, 0x9e, 0x0b, 0.1),
            ],
        }
    }
}

impl GalleryStyle {
    pub(crate) fn cell(&self) -> container::Style {
        container::Style {
            background: Some(Background::Color(self.background)),
            border: self.border(),
            ..container::Style::default()
        }
    }

    pub(crate) fn gradient(&self, colors: [Color; 2], opacity: f32) -> container::Style {
        let fade = |color: Color| Color {
            a: color.a * opacity.clamp(0.0, 1.0),
            ..color
        };
        let linear = Linear::new(Degrees(135.0))
            .add_stop(0.0, fade(colors[0]))
            .add_stop(1.0, fade(colors[1]));

        container::Style {
            background: Some(Background::Gradient(Gradient::Linear(linear))),
            border: self.border(),
            ..container::Style::default()
        }
    }

    fn border(&self) -> Border {
        Border {
            radius: self.corner_radius.into(),
            ..Border::default()
        }
    }
}
