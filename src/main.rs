use clap::{Parser, ValueEnum};
use iced::widget::{button, column, container, row, text};
use iced::{window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use log::{error, info};
use std::path::PathBuf;

use folio_gallery::{Error, Gallery, GalleryConfig, GalleryContent, GalleryMessage, LayoutMode};

/// Height of the toolbar above the gallery
const TOOLBAR_HEIGHT: f32 = 56.0;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Simple,
    Highlight,
}

impl From<LayoutArg> for LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Simple => LayoutMode::Simple,
            LayoutArg::Highlight => LayoutMode::Highlight,
        }
    }
}

/// Render a portfolio gallery from a JSON content file
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Content file (defaults to content.json in the config directory)
    content: Option<PathBuf>,

    /// Override the layout given in the content file
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Gallery config file (defaults to config.json in the config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Main application state
struct Showcase {
    gallery: Gallery,
    /// Status message shown in the toolbar
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    Gallery(GalleryMessage),
    /// User clicked the layout toggle
    ToggleLayout,
    WindowResized(Size),
}

impl Showcase {
    fn new(gallery: Gallery) -> (Self, Task<Message>) {
        let status = format!("{} images, {:?} layout", gallery.cells().len(), gallery.mode());

        (
            Showcase { gallery, status },
            window::get_latest()
                .and_then(window::get_size)
                .map(Message::WindowResized),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Gallery(message) => self.gallery.update(message).map(Message::Gallery),
            Message::ToggleLayout => {
                let mode = self.gallery.mode().toggled();
                let requests = self.gallery.set_layout_mode(mode);
                self.status = format!("{} images, {:?} layout", self.gallery.cells().len(), mode);
                self.gallery.spawn(requests).map(Message::Gallery)
            }
            Message::WindowResized(size) => {
                let area = Size::new(size.width, (size.height - TOOLBAR_HEIGHT).max(0.0));
                self.gallery
                    .update(GalleryMessage::Resized(area))
                    .map(Message::Gallery)
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let toolbar = row![
            text(&self.status).size(16).width(Length::Fill),
            button("Toggle layout")
                .on_press(Message::ToggleLayout)
                .padding(10),
        ]
        .spacing(20)
        .padding([0, 24])
        .align_y(Alignment::Center);

        column![
            container(toolbar)
                .height(Length::Fixed(TOOLBAR_HEIGHT))
                .center_y(Length::Fixed(TOOLBAR_HEIGHT)),
            self.gallery.view().map(Message::Gallery),
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            self.gallery.subscription().map(Message::Gallery),
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
        ])
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Read config and content, then plan the gallery
fn boot(args: Args) -> Result<Gallery, Error> {
    let config = match args.config.or_else(GalleryConfig::default_path) {
        Some(path) => GalleryConfig::load(&path)?,
        None => GalleryConfig::default(),
    };

    let content_path = args
        .content
        .or_else(|| GalleryConfig::config_dir().map(|dir| dir.join("content.json")))
        .ok_or(Error::NoContent)?;
    let content = GalleryContent::load(&content_path)?;

    let mode = args.layout.map(LayoutMode::from).unwrap_or(content.layout);
    info!(
        "🎨 Loaded {} gallery items from {} ({:?})",
        content.items.len(),
        content_path.display(),
        mode
    );

    Ok(Gallery::new(content.items, mode, config))
}

fn main() -> iced::Result {
    env_logger::init();

    let gallery = match boot(Args::parse()) {
        Ok(gallery) => gallery,
        Err(err) => {
            error!("❌ {}", err);
            eprintln!("folio-gallery: {}", err);
            std::process::exit(1);
        }
    };

    iced::application("Folio Gallery", Showcase::update, Showcase::view)
        .subscription(Showcase::subscription)
        .theme(Showcase::theme)
        .centered()
        .run_with(move || Showcase::new(gallery))
}
