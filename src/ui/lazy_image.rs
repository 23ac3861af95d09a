/// Single deferred image cell
///
/// Renders a `DeferredLoader` as stacked layers inside a fixed box so the
/// cell never changes size between states:
/// - placeholder: pulsing gradient while Idle or Loading
/// - content: the image, cropped to fill the box
/// - overlay: gradient faded in on hover once Loaded
///
/// An Errored loader renders an empty box.
use iced::widget::{container, image, mouse_area, tooltip, text, Space, Stack};
use iced::{ContentFit, Element, Length};

use super::style::GalleryStyle;
use crate::state::load::DeferredLoader;

pub fn view<'a, Message>(
    loader: &'a DeferredLoader,
    width: f32,
    height: f32,
    style: &GalleryStyle,
    pulse: f32,
    on_hover: impl Fn(bool) -> Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let layers = loader.layers();
    let style = *style;

    if !(layers.placeholder || layers.content) {
        return Space::new(Length::Fixed(width), Length::Fixed(height)).into();
    }

    let mut stack = Stack::new().width(Length::Fill).height(Length::Fill);

    if layers.placeholder {
        stack = stack.push(fill(move |_| style.gradient(style.placeholder, pulse)));
    }

    if let (true, Some(asset)) = (layers.content, loader.asset()) {
        stack = stack.push(
            image(asset.handle.clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill),
        );
    }

    let overlay = loader.overlay_opacity();
    if layers.overlay && overlay > 0.0 {
        stack = stack.push(fill(move |_| style.gradient(style.overlay, overlay)));
    }

    let cell = container(stack)
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .clip(true)
        .style(move |_| style.cell());

    let cell: Element<'a, Message> = if layers.content {
        tooltip(
            cell,
            container(text(loader.request().alt.as_str()).size(14))
                .padding(6)
                .style(container::rounded_box),
            tooltip::Position::FollowCursor,
        )
        .into()
    } else {
        cell.into()
    };

    mouse_area(cell)
        .on_enter(on_hover(true))
        .on_exit(on_hover(false))
        .into()
}

fn fill<'a, Message: 'a>(
    style: impl Fn(&iced::Theme) -> container::Style + 'a,
) -> Element<'a, Message> {
    container(Space::new(Length::Fill, Length::Fill))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(style)
        .into()
}
