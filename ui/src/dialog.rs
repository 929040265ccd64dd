use api_client::paths::format_similarity;
use iced::widget::{button, column, container, image, row, scrollable, text, Column, Row, Space};
use iced::{Alignment, Element, Length};

use crate::style::{self, Palette};
use crate::{FolderTask, GalleryUI, LightboxSource, Message};

/// Render the topmost layer: notification, busy overlay, lightbox, results,
/// search dialog, then the folder screen.
pub fn view(ui: &GalleryUI) -> Element<'_, Message> {
    if let Some(msg) = &ui.notification {
        return notification(msg);
    }
    if ui.busy {
        return busy();
    }
    if ui.lightbox.is_open() {
        return lightbox(ui);
    }
    if ui.results_open {
        return results_dialog(ui);
    }
    if ui.search_dialog_open {
        return search_dialog(ui);
    }
    main_screen(ui)
}

fn picture<'a>(ui: &'a GalleryUI, url: &str, width: Length, height: Length) -> Element<'a, Message> {
    let placeholder = if ui.is_image_failed(url) {
        "Image unavailable"
    } else {
        "Loading..."
    };
    match ui.handle(url) {
        Some(handle) => image(handle.clone()).width(width).height(height).into(),
        None => container(text(placeholder).size(14))
            .width(width)
            .height(height)
            .center_x()
            .center_y()
            .into(),
    }
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
}

fn notification(msg: &str) -> Element<'_, Message> {
    let card = container(
        column![
            text(msg).size(16),
            button(text("OK"))
                .style(style::button_primary())
                .on_press(Message::DismissNotification),
        ]
        .spacing(Palette::SPACING)
        .align_items(Alignment::End),
    )
    .style(style::card())
    .padding(20)
    .max_width(480.0);
    centered(card)
}

fn busy<'a>() -> Element<'a, Message> {
    container(text("Loading...").size(24))
        .style(style::busy_overlay())
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
}

fn main_screen(ui: &GalleryUI) -> Element<'_, Message> {
    let header = row![
        button(text("Select Folder"))
            .style(style::button_primary())
            .on_press(Message::ToggleDrawer),
        button(text("Reload folders"))
            .style(style::button_primary())
            .on_press(Message::LoadCatalog),
    ]
    .spacing(Palette::SPACING)
    .align_items(Alignment::Center);

    let body: Element<Message> = match &ui.selected_folder {
        Some(folder) => folder_panel(ui, folder),
        None if ui.catalog_loading => text("Loading folders...").size(16).into(),
        None if ui.catalog.is_empty() => text("No folders found.").size(16).into(),
        None => text("Select a folder to start.").size(16).into(),
    };

    let mut content = Row::new().spacing(Palette::SPACING);
    if ui.drawer_open {
        content = content.push(drawer(ui));
    }
    content = content.push(body);

    container(column![header, content].spacing(Palette::SPACING))
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(20)
        .into()
}

fn drawer(ui: &GalleryUI) -> Element<'_, Message> {
    let mut list = Column::new().spacing(4).push(text("Folders").size(20));
    for folder in ui.catalog.keys() {
        let style = if ui.selected_folder.as_deref() == Some(folder.as_str()) {
            style::button_secondary()
        } else {
            style::button_primary()
        };
        list = list.push(
            button(text(folder))
                .width(Length::Fill)
                .style(style)
                .on_press(Message::SelectFolder(folder.clone())),
        );
    }
    container(scrollable(list))
        .style(style::card())
        .padding(10)
        .width(Length::Fixed(200.0))
        .height(Length::Fill)
        .into()
}

fn folder_panel<'a>(ui: &'a GalleryUI, folder: &'a str) -> Element<'a, Message> {
    let actions = row![
        button(text("Detect Faces"))
            .style(style::button_success())
            .on_press(Message::RunFolderTask(FolderTask::DetectFaces)),
        button(text("Calculate Embedding"))
            .style(style::button_secondary())
            .on_press(Message::RunFolderTask(FolderTask::CalculateEmbedding)),
        button(text("Search My Face"))
            .style(style::button_warning())
            .on_press(Message::OpenSearchDialog),
    ]
    .spacing(Palette::SPACING);

    let total = ui.folder_len(folder);
    let title = text(format!("{} ({} images)", folder, total)).size(18);

    let mut rows = Column::new().spacing(10);
    for (chunk_idx, chunk) in ui.window.images().chunks(Palette::GRID_COLUMNS).enumerate() {
        let mut current = Row::new().spacing(10);
        for (i, path) in chunk.iter().enumerate() {
            let url = ui.client.resolve(path);
            current = current.push(
                button(picture(
                    ui,
                    &url,
                    Length::Fixed(Palette::THUMB_WIDTH),
                    Length::Fixed(Palette::THUMB_HEIGHT),
                ))
                .style(style::thumbnail(false))
                .on_press(Message::OpenFromGrid(chunk_idx * Palette::GRID_COLUMNS + i)),
            );
        }
        rows = rows.push(current);
    }

    let sentinel: Element<Message> = if ui.window.has_more(total) {
        button(text("Loading more..."))
            .style(style::thumbnail(false))
            .on_press(Message::SentinelReached)
            .into()
    } else {
        text("All images loaded").into()
    };
    rows = rows.push(sentinel);

    column![
        actions,
        title,
        scrollable(rows)
            .height(Length::Fill)
            .on_scroll(|viewport| Message::GridScrolled(viewport.relative_offset().y)),
    ]
    .spacing(Palette::SPACING)
    .into()
}

fn search_dialog(ui: &GalleryUI) -> Element<'_, Message> {
    let file_name = ui
        .upload
        .as_ref()
        .map(|d| d.file_name.as_str())
        .unwrap_or("");
    let dropzone = button(
        column![
            text(file_name).size(16),
            text("Drag & drop an image here, or click to select one").size(14),
            text("Only image files are allowed (e.g., .jpg, .png)").size(12),
        ]
        .spacing(8)
        .align_items(Alignment::Center),
    )
    .width(Length::Fill)
    .padding(24)
    .style(style::thumbnail(true))
    .on_press(Message::ChooseUpload);

    let card = container(
        column![
            text("Upload Image to Search").size(20),
            dropzone,
            row![
                Space::with_width(Length::Fill),
                button(text("Search"))
                    .style(style::button_primary())
                    .on_press_maybe(ui.upload.is_some().then_some(Message::SubmitUploadSearch)),
                button(text("Close"))
                    .style(style::button_primary())
                    .on_press(Message::CloseSearchDialog),
            ]
            .spacing(10),
        ]
        .spacing(Palette::SPACING),
    )
    .style(style::card())
    .padding(20)
    .max_width(520.0);
    centered(card)
}

fn results_dialog(ui: &GalleryUI) -> Element<'_, Message> {
    let groups = ui.results.as_deref().unwrap_or(&[]);
    let mut list = Column::new().spacing(Palette::SPACING);
    if groups.is_empty() {
        list = list.push(text("No results found."));
    }
    for (face_idx, group) in groups.iter().enumerate() {
        let mut card = Column::new().spacing(8).push(text(format!("Face {}", face_idx)).size(14));
        if let Some(face) = &group.face_path {
            card = card.push(picture(
                ui,
                &ui.client.resolve(face),
                Length::Fixed(128.0),
                Length::Shrink,
            ));
        }
        let mut cells = Column::new().spacing(10);
        for (chunk_idx, chunk) in group.matches.chunks(3).enumerate() {
            let mut current = Row::new().spacing(10);
            for (i, candidate) in chunk.iter().enumerate() {
                let mut pair = Row::new().spacing(8);
                if let Some(face) = &candidate.matched_face {
                    pair = pair.push(picture(
                        ui,
                        &ui.client.resolve(face),
                        Length::Fixed(120.0),
                        Length::Shrink,
                    ));
                }
                if let Some(origin) = &candidate.origin_image {
                    pair = pair.push(
                        button(picture(
                            ui,
                            &ui.client.resolve(origin),
                            Length::Fixed(120.0),
                            Length::Shrink,
                        ))
                        .style(style::thumbnail(false))
                        .on_press(Message::OpenFromResults {
                            group: face_idx,
                            candidate: chunk_idx * 3 + i,
                        }),
                    );
                }
                current = current.push(
                    container(
                        column![
                            text(format!("Similarity: {}", format_similarity(candidate.similarity))).size(14),
                            pair,
                        ]
                        .spacing(8)
                        .align_items(Alignment::Center),
                    )
                    .style(style::card())
                    .padding(8),
                );
            }
            cells = cells.push(current);
        }
        card = card.push(cells);
        list = list.push(container(card).style(style::card()).padding(8).width(Length::Fill));
    }

    let dialog = container(
        column![
            text("Search Results").size(20),
            scrollable(list).height(Length::Fill),
            row![
                Space::with_width(Length::Fill),
                button(text("Close"))
                    .style(style::button_primary())
                    .on_press(Message::CloseResults),
            ],
        ]
        .spacing(Palette::SPACING),
    )
    .style(style::card())
    .padding(20)
    .max_width(960.0);
    centered(dialog)
}

fn lightbox(ui: &GalleryUI) -> Element<'_, Message> {
    let Some(current) = ui.lightbox.current() else {
        return main_screen(ui);
    };

    let mut faces = Column::new().spacing(8);
    for face in &ui.faces {
        let selected = ui.selected_face.as_deref() == Some(face.as_str());
        faces = faces.push(
            button(picture(ui, &ui.client.resolve(face), Length::Fill, Length::Shrink))
                .style(style::thumbnail(selected))
                .on_press(Message::SelectFace(face.clone())),
        );
    }
    let sidebar = container(scrollable(faces))
        .style(style::face_sidebar())
        .padding(8)
        .width(Length::Fixed(Palette::FACE_WIDTH))
        .height(Length::Fill);

    let label = match ui.lightbox.source() {
        Some(LightboxSource::Results { group }) => format!("Matches for face {}", group),
        _ => ui.selected_folder.clone().unwrap_or_default(),
    };
    let position = ui.lightbox.index().map(|i| i + 1).unwrap_or(0);

    let top = row![
        text(format!("{}  {} / {}", label, position, ui.lightbox.len())).size(16),
        Space::with_width(Length::Fill),
        button(text("Close"))
            .style(style::button_primary())
            .on_press(Message::CloseLightbox),
    ]
    .align_items(Alignment::Center);

    let stage = row![
        button(text("<"))
            .style(style::button_primary())
            .on_press_maybe(ui.lightbox.has_previous().then_some(Message::PreviousImage)),
        sidebar,
        picture(ui, current, Length::Fill, Length::Fill),
        button(text(">"))
            .style(style::button_primary())
            .on_press_maybe(ui.lightbox.has_next().then_some(Message::NextImage)),
    ]
    .spacing(Palette::SPACING)
    .align_items(Alignment::Center)
    .height(Length::Fill);

    container(column![top, stage].spacing(Palette::SPACING))
        .style(style::scrim())
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(20)
        .into()
}
