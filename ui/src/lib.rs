//! User Interface module for FaceGallery.

mod dialog;
pub mod grid;
mod image_loader;
pub mod lightbox;
pub mod search;
mod style;

pub use grid::VisibleWindow;
pub use image_loader::{ImageLoader, ImageLoaderError};
pub use lightbox::{Lightbox, LightboxSource};
pub use search::{FolderTask, SearchKind, SearchRequest, UploadDraft};

use api_client::{ApiClient, FolderCatalog, MatchGroup, SearchOutcome};
use iced::keyboard::{self, key::Named, Key};
use iced::widget::image::Handle;
use iced::{event, executor, window, Application, Command, Element, Settings, Subscription, Theme};
use rfd::AsyncFileDialog;
use search::SearchResolution;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Startup parameters handed to the UI by the launcher.
#[derive(Debug, Clone)]
pub struct GallerySettings {
    pub backend_url: String,
    pub batch_size: usize,
    pub preload_threads: usize,
    pub request_timeout: Option<Duration>,
    pub cache_dir: PathBuf,
}

#[cfg_attr(feature = "trace-spans", tracing::instrument)]
pub fn run(settings: GallerySettings) -> iced::Result {
    GalleryUI::run(Settings::with_flags(settings))
}

#[derive(Debug, Clone)]
pub enum Message {
    LoadCatalog,
    CatalogLoaded(Result<FolderCatalog, String>),
    ToggleDrawer,
    SelectFolder(String),
    RevealFirstBatch(String),
    SentinelReached,
    GridScrolled(f32),
    OpenFromGrid(usize),
    OpenFromResults { group: usize, candidate: usize },
    PreviousImage,
    NextImage,
    CloseLightbox,
    FacesLoaded(u64, Result<Vec<String>, String>),
    SelectFace(String),
    OpenSearchDialog,
    CloseSearchDialog,
    ChooseUpload,
    UploadChosen(Option<PathBuf>),
    FileDropped(PathBuf),
    SubmitUploadSearch,
    SearchCompleted(SearchKind, Result<SearchOutcome, String>),
    CloseResults,
    RunFolderTask(FolderTask),
    FolderTaskCompleted(FolderTask, Result<String, String>),
    ImageLoaded(String, Result<Handle, String>),
    DismissNotification,
    EscapePressed,
}

pub struct GalleryUI {
    client: ApiClient,
    image_loader: ImageLoader,
    catalog: FolderCatalog,
    catalog_loading: bool,
    drawer_open: bool,
    selected_folder: Option<String>,
    window: VisibleWindow,
    faces: Vec<String>,
    faces_generation: u64,
    faces_for: Option<String>,
    selected_face: Option<String>,
    lightbox: Lightbox,
    search_dialog_open: bool,
    upload: Option<UploadDraft>,
    results: Option<Vec<MatchGroup>>,
    results_open: bool,
    busy: bool,
    searches_started: u64,
    notification: Option<String>,
    images: HashMap<String, Handle>,
    requested_images: HashSet<String>,
    failed_images: HashSet<String>,
}

impl GalleryUI {
    pub fn folder_names(&self) -> Vec<String> {
        self.catalog.keys().cloned().collect()
    }

    pub fn folder_len(&self, folder: &str) -> usize {
        self.catalog.get(folder).map(Vec::len).unwrap_or(0)
    }

    pub fn selected_folder(&self) -> Option<&str> {
        self.selected_folder.as_deref()
    }

    pub fn visible_images(&self) -> &[String] {
        self.window.images()
    }

    pub fn next_index(&self) -> usize {
        self.window.next_index()
    }

    pub fn faces(&self) -> &[String] {
        &self.faces
    }

    /// Generation and normalised image path of the latest face fetch.
    pub fn faces_request(&self) -> Option<(u64, &str)> {
        self.faces_for
            .as_deref()
            .map(|path| (self.faces_generation, path))
    }

    pub fn faces_generation(&self) -> u64 {
        self.faces_generation
    }

    pub fn selected_face(&self) -> Option<&str> {
        self.selected_face.as_deref()
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn drawer_open(&self) -> bool {
        self.drawer_open
    }

    pub fn search_dialog_open(&self) -> bool {
        self.search_dialog_open
    }

    pub fn upload(&self) -> Option<&UploadDraft> {
        self.upload.as_ref()
    }

    pub fn results_open(&self) -> bool {
        self.results_open
    }

    pub fn results(&self) -> Option<&[MatchGroup]> {
        self.results.as_deref()
    }

    /// Searches actually dispatched to the backend this session.
    pub fn searches_started(&self) -> u64 {
        self.searches_started
    }

    pub fn is_image_requested(&self, url: &str) -> bool {
        self.requested_images.contains(url)
    }

    /// True once `url` failed to load, including the extension-case retry.
    pub fn is_image_failed(&self, url: &str) -> bool {
        self.failed_images.contains(url)
    }

    fn notify(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!(notification = %msg, "Showing notification");
        self.notification = Some(msg);
    }

    fn load_catalog(&mut self) -> Command<Message> {
        self.catalog_loading = true;
        let client = self.client.clone();
        Command::perform(
            async move { client.list_folders().await.map_err(|e| e.to_string()) },
            Message::CatalogLoaded,
        )
    }

    fn load_images(&mut self, urls: impl IntoIterator<Item = String>) -> Command<Message> {
        let mut commands = Vec::new();
        for url in urls {
            if self.images.contains_key(&url) || !self.requested_images.insert(url.clone()) {
                continue;
            }
            self.failed_images.remove(&url);
            let loader = self.image_loader.clone();
            commands.push(Command::perform(
                async move {
                    let res = loader.load(&url).await.map_err(|e| e.to_string());
                    (url, res)
                },
                |(url, res)| Message::ImageLoaded(url, res),
            ));
        }
        Command::batch(commands)
    }

    fn discard_faces(&mut self) {
        self.faces.clear();
        self.faces_for = None;
        self.faces_generation += 1;
    }

    /// Every change of the displayed lightbox image goes through here.
    fn show_image(&mut self, url: String) -> Command<Message> {
        self.faces.clear();
        self.faces_generation += 1;
        let generation = self.faces_generation;
        let path = self.client.normalize(&url);
        self.faces_for = Some(path.clone());

        let client = self.client.clone();
        let fetch_faces = Command::perform(
            async move { client.list_faces(&path).await.map_err(|e| e.to_string()) },
            move |res| Message::FacesLoaded(generation, res),
        );
        Command::batch(vec![self.load_images([url]), fetch_faces])
    }

    fn select_folder(&mut self, folder: String) -> Command<Message> {
        tracing::info!(folder = %folder, "Folder selected");
        self.selected_folder = Some(folder.clone());
        self.window.reset();
        self.discard_faces();
        if !self.search_dialog_open {
            self.results = None;
            self.results_open = false;
        }
        Command::perform(async {}, move |_| Message::RevealFirstBatch(folder))
    }

    fn reveal_next_batch(&mut self) -> Command<Message> {
        let Some(folder) = &self.selected_folder else {
            return Command::none();
        };
        let all = self.catalog.get(folder).map(Vec::as_slice).unwrap_or(&[]);
        let revealed: Vec<String> = self.window.reveal_next_batch(all).to_vec();
        if revealed.is_empty() {
            return Command::none();
        }
        tracing::debug!(count = revealed.len(), next_index = self.window.next_index(), "Revealed batch");
        let urls: Vec<String> = revealed.iter().map(|p| self.client.resolve(p)).collect();
        self.load_images(urls)
    }

    fn start_search(&mut self, request: SearchRequest) -> Command<Message> {
        if self.busy {
            tracing::warn!("Search requested while busy, ignoring");
            return Command::none();
        }
        self.busy = true;
        self.searches_started += 1;
        let kind = request.kind();
        let client = self.client.clone();
        Command::perform(search::run(client, request), move |res| {
            Message::SearchCompleted(kind, res)
        })
    }

    fn result_image_urls(&self, groups: &[MatchGroup]) -> Vec<String> {
        let mut urls = Vec::new();
        for group in groups {
            if let Some(face) = &group.face_path {
                urls.push(self.client.resolve(face));
            }
            for m in &group.matches {
                urls.extend(m.matched_face.iter().map(|p| self.client.resolve(p)));
                urls.extend(m.origin_image.iter().map(|p| self.client.resolve(p)));
            }
        }
        urls
    }

    pub(crate) fn handle(&self, url: &str) -> Option<&Handle> {
        self.images.get(url)
    }
}

impl Application for GalleryUI {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = GallerySettings;

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(flags)))]
    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let mut notification = None;
        let client = match ApiClient::with_timeout(flags.backend_url.clone(), flags.request_timeout) {
            Ok(c) => c,
            Err(e) => {
                let msg = format!("Failed to initialize HTTP client: {}", e);
                tracing::error!("{}", msg);
                notification = Some(msg);
                ApiClient::new(flags.backend_url.clone())
            }
        };
        let image_loader = ImageLoader::with_client(
            flags.cache_dir.clone(),
            client.base_url(),
            client.http().clone(),
            flags.preload_threads,
        );

        let mut app = Self {
            client,
            image_loader,
            catalog: FolderCatalog::new(),
            catalog_loading: false,
            drawer_open: false,
            selected_folder: None,
            window: VisibleWindow::new(flags.batch_size),
            faces: Vec::new(),
            faces_generation: 0,
            faces_for: None,
            selected_face: None,
            lightbox: Lightbox::Closed,
            search_dialog_open: false,
            upload: None,
            results: None,
            results_open: false,
            busy: false,
            searches_started: 0,
            notification,
            images: HashMap::new(),
            requested_images: HashSet::new(),
            failed_images: HashSet::new(),
        };
        let command = app.load_catalog();
        (app, command)
    }

    fn title(&self) -> String {
        match &self.selected_folder {
            Some(folder) => format!("FaceGallery - {}", folder),
            None => String::from("FaceGallery"),
        }
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::LoadCatalog => {
                return self.load_catalog();
            }
            Message::CatalogLoaded(result) => {
                self.catalog_loading = false;
                match result {
                    Ok(catalog) => {
                        tracing::info!(folders = catalog.len(), "Catalog loaded");
                        self.catalog = catalog;
                        if let Some(folder) = self.selected_folder.clone() {
                            return self.select_folder(folder);
                        }
                    }
                    Err(err) => {
                        tracing::error!("Failed to load folders: {}", err);
                        self.notify(format!("Failed to load folders: {}", err));
                    }
                }
            }
            Message::ToggleDrawer => {
                self.drawer_open = !self.drawer_open;
            }
            Message::SelectFolder(folder) => {
                self.drawer_open = false;
                return self.select_folder(folder);
            }
            Message::RevealFirstBatch(folder) => {
                if self.selected_folder.as_deref() == Some(folder.as_str())
                    && self.window.next_index() == 0
                {
                    return self.reveal_next_batch();
                }
            }
            Message::SentinelReached => {
                return self.reveal_next_batch();
            }
            Message::GridScrolled(relative_y) => {
                if relative_y >= grid::SENTINEL_THRESHOLD {
                    return self.reveal_next_batch();
                }
            }
            Message::OpenFromGrid(index) => {
                let context: Vec<String> = self
                    .window
                    .images()
                    .iter()
                    .map(|p| self.client.resolve(p))
                    .collect();
                self.lightbox = Lightbox::opened(LightboxSource::Grid, context, index);
                if let Some(url) = self.lightbox.current().map(str::to_owned) {
                    return self.show_image(url);
                }
            }
            Message::OpenFromResults { group, candidate } => {
                let Some(g) = self.results.as_ref().and_then(|r| r.get(group)) else {
                    return Command::none();
                };
                let has_origin = g
                    .matches
                    .get(candidate)
                    .map(|m| m.origin_image.is_some())
                    .unwrap_or(false);
                if !has_origin {
                    return Command::none();
                }
                let index = g.matches[..candidate]
                    .iter()
                    .filter(|m| m.origin_image.is_some())
                    .count();
                let context: Vec<String> = g
                    .origin_images()
                    .iter()
                    .map(|p| self.client.resolve(p))
                    .collect();
                self.lightbox = Lightbox::opened(LightboxSource::Results { group }, context, index);
                if let Some(url) = self.lightbox.current().map(str::to_owned) {
                    return self.show_image(url);
                }
            }
            Message::PreviousImage => {
                if let Some(url) = self.lightbox.previous().map(str::to_owned) {
                    return self.show_image(url);
                }
            }
            Message::NextImage => {
                if let Some(url) = self.lightbox.next().map(str::to_owned) {
                    return self.show_image(url);
                }
            }
            Message::CloseLightbox => {
                self.lightbox.close();
                self.discard_faces();
            }
            Message::FacesLoaded(generation, result) => {
                if generation != self.faces_generation {
                    tracing::debug!(generation, current = self.faces_generation, "Discarding stale face list");
                    return Command::none();
                }
                match result {
                    Ok(faces) => {
                        let urls: Vec<String> = faces.iter().map(|f| self.client.resolve(f)).collect();
                        self.faces = faces;
                        return self.load_images(urls);
                    }
                    Err(err) => {
                        tracing::warn!("Failed to fetch faces: {}", err);
                        self.faces.clear();
                    }
                }
            }
            Message::SelectFace(face) => {
                self.selected_face = Some(face.clone());
                self.lightbox.close();
                self.discard_faces();
                if let Some(folder) = self.selected_folder.clone() {
                    return self.start_search(SearchRequest::Face {
                        image_path: face,
                        folder,
                    });
                }
            }
            Message::OpenSearchDialog => {
                self.search_dialog_open = true;
            }
            Message::CloseSearchDialog => {
                self.search_dialog_open = false;
            }
            Message::ChooseUpload => {
                return Command::perform(
                    async {
                        AsyncFileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"])
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::UploadChosen,
                );
            }
            Message::UploadChosen(Some(path)) => match UploadDraft::from_path(path) {
                Some(draft) => self.upload = Some(draft),
                None => self.notify("Only image files are allowed (e.g., .jpg, .png)"),
            },
            Message::UploadChosen(None) => {}
            Message::FileDropped(path) => {
                if self.search_dialog_open {
                    if let Some(draft) = UploadDraft::from_path(path) {
                        self.upload = Some(draft);
                    }
                }
            }
            Message::SubmitUploadSearch => {
                if let (Some(folder), Some(draft)) = (self.selected_folder.clone(), self.upload.clone()) {
                    return self.start_search(SearchRequest::Upload {
                        file: draft.path,
                        folder,
                    });
                }
            }
            Message::SearchCompleted(kind, result) => {
                self.busy = false;
                match search::resolve(result) {
                    SearchResolution::Show(groups) => {
                        tracing::info!(?kind, faces = groups.len(), "Search returned matches");
                        let urls = self.result_image_urls(&groups);
                        self.results = Some(groups);
                        self.results_open = true;
                        return self.load_images(urls);
                    }
                    SearchResolution::Notify(msg) => self.notify(msg),
                }
            }
            Message::CloseResults => {
                self.results_open = false;
                self.results = None;
            }
            Message::RunFolderTask(task) => {
                if self.busy {
                    return Command::none();
                }
                if let Some(folder) = self.selected_folder.clone() {
                    self.busy = true;
                    let client = self.client.clone();
                    return Command::perform(task.run(client, folder), move |res| {
                        Message::FolderTaskCompleted(task, res)
                    });
                }
            }
            Message::FolderTaskCompleted(task, result) => {
                self.busy = false;
                match result {
                    Ok(status) => self.notify(status),
                    Err(_) => self.notify(task.failure_message()),
                }
            }
            Message::ImageLoaded(url, result) => match result {
                Ok(handle) => {
                    self.images.insert(url, handle);
                }
                Err(err) => {
                    tracing::debug!(url = %url, "Image failed to load: {}", err);
                    self.requested_images.remove(&url);
                    self.failed_images.insert(url);
                }
            },
            Message::DismissNotification => {
                self.notification = None;
            }
            Message::EscapePressed => {
                if self.notification.is_some() {
                    self.notification = None;
                } else if self.lightbox.is_open() {
                    self.lightbox.close();
                    self.discard_faces();
                } else if self.results_open {
                    self.results_open = false;
                    self.results = None;
                } else if self.search_dialog_open {
                    self.search_dialog_open = false;
                } else {
                    self.drawer_open = false;
                }
            }
        }
        Command::none()
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch(vec![
            keyboard::on_key_press(|key, _modifiers| match key {
                Key::Named(Named::Escape) => Some(Message::EscapePressed),
                Key::Named(Named::ArrowLeft) => Some(Message::PreviousImage),
                Key::Named(Named::ArrowRight) => Some(Message::NextImage),
                _ => None,
            }),
            event::listen_with(|event, _status| match event {
                iced::Event::Window(_, window::Event::FileDropped(path)) => {
                    Some(Message::FileDropped(path))
                }
                _ => None,
            }),
        ])
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    fn view(&self) -> Element<'_, Message> {
        dialog::view(self)
    }
}
