use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::config::{LANGUAGE_PREFERENCE_KEY, initial_language};
use crate::error::ExpandError;
use crate::explorer::{Explorer, LanguageData, fetch_language};
use crate::taxonomy::DataSource;

mod graph;
mod render_utils;
mod ui;
mod worker;

use worker::ExpansionWorker;

type LoadResult = Result<LanguageData, String>;

pub struct TaxonomyApp {
    source: Arc<dyn DataSource>,
    language: String,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    explorer: Explorer,
    expansions: ExpansionWorker,
    search: String,
    pan: Vec2,
    zoom: f32,
    /// Last failure worth showing in the top bar.
    notice: Option<String>,
    language_choice: String,
}

impl TaxonomyApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        source: Arc<dyn DataSource>,
        language: Option<String>,
    ) -> Self {
        let stored = cc
            .storage
            .and_then(|storage| storage.get_string(LANGUAGE_PREFERENCE_KEY));
        let language = initial_language(language.as_deref(), stored.as_deref());
        info!(language = %language, source = %source.describe(), "starting viewer");

        let state = Self::start_load(&source, &language, &cc.egui_ctx);
        Self {
            source,
            language,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        source: &Arc<dyn DataSource>,
        language: &str,
        ctx: &Context,
    ) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(source);
        let language = language.to_owned();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let result =
                fetch_language(source.as_ref(), &language).map_err(|error| error.to_string());
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        rx
    }

    fn start_load(source: &Arc<dyn DataSource>, language: &str, ctx: &Context) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source, language, ctx),
        }
    }

    fn ready(&self, data: LanguageData) -> AppState {
        let mut explorer = Explorer::new(Arc::clone(&self.source), &data.language);
        explorer.install_language(data);
        explorer.fit_all();
        AppState::Ready(Box::new(ViewModel::new(explorer)))
    }
}

impl eframe::App for TaxonomyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(data)) => transition = Some(self.ready(data)),
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading taxonomy...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the taxonomy index");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.source, &self.language, ctx));
                    }
                });
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                let requested_language = model.show(ctx, is_reloading);

                if let Some(language) = requested_language
                    && self.reload_rx.is_none()
                {
                    self.reload_rx = Some(Self::spawn_load(&self.source, &language, ctx));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(data)) => {
                            self.language = data.language.clone();
                            model.switch_language(data);
                        }
                        Ok(Err(error)) => {
                            warn!(%error, "language switch failed");
                            model.language_switch_failed(error);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.language_switch_failed(
                                "Background load worker disconnected".to_owned(),
                            );
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string(LANGUAGE_PREFERENCE_KEY, self.language.clone());
    }
}

impl ViewModel {
    fn new(explorer: Explorer) -> Self {
        let language_choice = explorer.language().to_owned();
        Self {
            explorer,
            expansions: ExpansionWorker::new(),
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            notice: None,
            language_choice,
        }
    }

    /// Applies every expansion fetch that resolved since the last frame.
    fn apply_finished_expansions(&mut self) {
        for (ticket, fetched) in self.expansions.drain() {
            match self.explorer.complete_expansion(ticket, fetched) {
                Ok(_) => {}
                Err(ExpandError::Stale { .. }) => {}
                Err(error) => self.notice = Some(error.to_string()),
            }
        }
    }

    fn switch_language(&mut self, data: LanguageData) {
        self.explorer.install_language(data);
        self.explorer.fit_all();
        self.language_choice = self.explorer.language().to_owned();
        self.search.clear();
        self.notice = None;
    }

    fn language_switch_failed(&mut self, error: String) {
        self.language_choice = self.explorer.language().to_owned();
        self.notice = Some(format!("Could not switch language: {error}"));
    }

    /// Returns a language the user asked to switch to.
    fn show(&mut self, ctx: &Context, is_reloading: bool) -> Option<String> {
        self.apply_finished_expansions();

        let requested_language = self.draw_top_bar(ctx, is_reloading);

        egui::SidePanel::left("search_results")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_results(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        requested_language
    }
}
