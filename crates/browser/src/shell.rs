use std::sync::mpsc;

use egui::{
    Align, CentralPanel, Color32, Context, Frame, Key, Margin, RichText, Sense, TextEdit,
    TopBottomPanel, Visuals,
};
use gfx::EguiMeasurer;
use net::{FetchError, Response};
use platform::UiApp;

use crate::page::{Page, SCROLL_STEP};

/// Single-page shell: a url bar on top, the document below, scrolled with
/// the wheel or arrow keys. Fetches run on worker threads and come back
/// through an mpsc channel drained at the start of every frame.
pub struct Shell {
    page: Page,
    url_input: String,
    pending: bool,
    visuals_set: bool,
    tx: mpsc::Sender<(String, Result<Response, FetchError>)>,
    rx: mpsc::Receiver<(String, Result<Response, FetchError>)>,
}

impl Shell {
    pub fn new(initial: Option<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut shell = Self {
            page: Page::new(),
            url_input: String::new(),
            pending: false,
            visuals_set: false,
            tx,
            rx,
        };
        if let Some(target) = initial {
            shell.navigate(target);
        }
        shell
    }

    fn navigate(&mut self, target: String) {
        log::debug!("navigate to {target}");
        self.page.start_nav(&target);
        self.url_input = target.clone();
        self.pending = true;
        let tx = self.tx.clone();
        net::fetch_background(target, move |url, result| {
            let _ = tx.send((url, result));
        });
    }

    fn drain_fetches(&mut self) {
        while let Ok((url, result)) = self.rx.try_recv() {
            if url != self.page.url {
                // A stale response from before the latest navigation.
                continue;
            }
            self.pending = false;
            match result {
                Ok(response) => self.page.set_body(&response.body),
                Err(err) => self.page.set_error(err.to_string()),
            }
        }
    }

    fn url_bar(&mut self, ui: &mut egui::Ui) {
        let response = Frame::new()
            .fill(ui.visuals().extreme_bg_color)
            .stroke(egui::Stroke::new(
                1.0,
                ui.visuals().widgets.inactive.bg_stroke.color,
            ))
            .corner_radius(6.0)
            .inner_margin(Margin::symmetric(4, 4))
            .show(ui, |ui| {
                ui.add_sized(
                    [ui.available_width(), 28.0],
                    TextEdit::singleline(&mut self.url_input)
                        .hint_text("Enter URL or file path")
                        .vertical_align(Align::Center),
                )
            })
            .inner;

        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            let target = self.url_input.clone();
            self.navigate(target);
        }
    }

    fn content(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = self.page.error.clone() {
            ui.colored_label(Color32::DARK_RED, RichText::new(error).strong());
            return;
        }
        if self.pending {
            ui.label("Loading…");
            return;
        }

        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());

        let mut delta = -ui.input(|i| i.raw_scroll_delta.y);
        // Arrow keys scroll the page unless the url bar has focus.
        if !ui.ctx().wants_keyboard_input() {
            if ui.input(|i| i.key_pressed(Key::ArrowDown)) {
                delta += SCROLL_STEP;
            }
            if ui.input(|i| i.key_pressed(Key::ArrowUp)) {
                delta -= SCROLL_STEP;
            }
        }

        let measurer = EguiMeasurer::new(ui.ctx());
        self.page.ensure_layout(&measurer, rect.width());
        if delta != 0.0 {
            self.page.scroll_by(delta, rect.height());
        }

        let painter = ui.painter_at(rect);
        gfx::paint_display_list(
            &painter,
            rect.min,
            &self.page.display_list,
            self.page.scroll,
            rect.height(),
            Color32::BLACK,
        );
    }
}

impl UiApp for Shell {
    fn ui(&mut self, ctx: &Context) {
        if !self.visuals_set {
            ctx.set_visuals(Visuals::light());
            self.visuals_set = true;
        }
        self.drain_fetches();

        TopBottomPanel::top("shell_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.url_bar(ui);
            });
        });

        CentralPanel::default()
            .frame(Frame::new().fill(Color32::WHITE))
            .show(ctx, |ui| {
                self.content(ui);
            });
    }
}
