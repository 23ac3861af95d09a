/// Gallery grid view
///
/// Cells are positioned absolutely: every cell is a layer of one stack,
/// offset by padding to its placed rectangle.
use iced::widget::{container, scrollable, Space, Stack};
use iced::{Element, Length, Padding};

use super::lazy_image;
use crate::gallery::{Gallery, GalleryMessage};

pub fn view(gallery: &Gallery) -> Element<'_, GalleryMessage> {
    let style = gallery.style();
    let pulse = gallery.pulse_opacity();
    let width = gallery.content_width();
    let height = gallery.content_height();

    let grid = gallery.cells().iter().fold(
        Stack::new()
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .push(Space::new(Length::Fixed(width), Length::Fixed(height))),
        |stack, cell| {
            let instance = cell.loader.instance();
            let tile = lazy_image::view(
                &cell.loader,
                cell.rect.width,
                cell.rect.height,
                style,
                pulse,
                move |hovered| GalleryMessage::Hovered { instance, hovered },
            );

            stack.push(container(tile).padding(Padding {
                top: cell.rect.y,
                left: cell.rect.x,
                right: 0.0,
                bottom: 0.0,
            }))
        },
    );

    scrollable(container(grid).padding(gallery.config().padding).width(Length::Fill))
        .on_scroll(GalleryMessage::Scrolled)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
