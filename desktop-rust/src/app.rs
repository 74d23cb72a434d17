use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};
use tracing::{debug, warn};

use classifier_common::presentation::{
    self, classify_button_label, CONFIDENCE_LABEL, ERROR_HEADLINE, IDLE_HEADLINE, IDLE_HINT,
    LOADING_TEXT, OBJECT_LABEL, RESULT_HEADLINE,
};
use classifier_common::{
    ClassificationResult, ClassifyError, ClassifyTicket, ConfidenceTier, FileCandidate,
    ResultView, Session, UploadRejection, ACCEPTED_EXTENSIONS,
};
use image_classifier::{Classifier, GeminiClassifier, read_candidate_with};

use crate::io::{PreviewPixels, candidate_from_dropped, decode_preview};

const PANEL_HEIGHT: f32 = 320.0;

/// ワーカーが結果を送らずに終了した場合の原因
const WORKER_STOPPED: &str = "classify worker exited without result";

type ClassifyOutcome = Result<ClassificationResult, ClassifyError>;

/// 実行中の分類（チケットと結果の受信側）
struct ClassifyJob {
    ticket: ClassifyTicket,
    rx: Receiver<ClassifyOutcome>,
}

impl ClassifyJob {
    /// 結果が届いていれば返す。送信側が落ちていればサービスエラー扱い
    fn poll(&self) -> Option<ClassifyOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!(ticket = self.ticket.id(), "classify worker exited without result");
                Some(Err(ClassifyError::service(WORKER_STOPPED)))
            }
        }
    }
}

struct PreviewData {
    id: u64,
    pixels: Option<PreviewPixels>,
}

/// 表示中のプレビュー（プレビュー参照のidと対応）
struct PreviewTexture {
    id: u64,
    texture: Option<egui::TextureHandle>,
}

pub struct ClassifierApp {
    session: Session,
    classifier: Result<Arc<GeminiClassifier>, String>,
    classify_job: Option<ClassifyJob>,
    preview: Option<PreviewTexture>,
    preview_rx: Receiver<PreviewData>,
    preview_tx: Sender<PreviewData>,
    preview_inflight: Option<u64>,
    is_dragging: bool,
}

impl ClassifierApp {
    pub fn new() -> Self {
        let classifier = GeminiClassifier::from_env()
            .map(Arc::new)
            .map_err(|err| {
                warn!("classifier init failed: {err}");
                err.to_string()
            });
        let (preview_tx, preview_rx) = mpsc::channel();

        Self {
            session: Session::default(),
            classifier,
            classify_job: None,
            preview: None,
            preview_rx,
            preview_tx,
            preview_inflight: None,
            is_dragging: false,
        }
    }

    fn pick_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Hình ảnh", ACCEPTED_EXTENSIONS)
            .pick_file()
        {
            let candidate = read_candidate_with(&path, self.session.upload_control().policy());
            self.submit(candidate);
        }
    }

    fn submit(&mut self, candidate: Result<FileCandidate, UploadRejection>) {
        let result = match candidate {
            Ok(candidate) => self.session.receive_upload(candidate),
            Err(rejection) => {
                self.session.record_rejection(&rejection);
                Err(rejection)
            }
        };
        if let Err(rejection) = result {
            debug!("upload rejected: {rejection}");
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (dropped, hovering) = ctx.input(|i| {
            (i.raw.dropped_files.clone(), !i.raw.hovered_files.is_empty())
        });
        self.is_dragging = hovering;

        // 1枚のみ対応（複数ドロップ時は先頭）
        if let Some(file) = dropped.first() {
            let candidate = candidate_from_dropped(file, self.session.upload_control().policy());
            self.submit(candidate);
        }
    }

    fn run_classify(&mut self, ctx: &egui::Context) {
        let Some(ticket) = self.session.trigger_classify() else {
            return;
        };

        let classifier = match &self.classifier {
            Ok(classifier) => Arc::clone(classifier),
            Err(message) => {
                self.session
                    .complete(&ticket, Err(ClassifyError::service(message.clone())));
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        self.classify_job = Some(ClassifyJob {
            ticket: ticket.clone(),
            rx,
        });
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(classifier.classify(ticket.payload())),
                Err(err) => Err(ClassifyError::service(err)),
            };
            let _ = tx.send(outcome);
            ctx.request_repaint();
        });
    }

    /// 画像が差し替わったら古いテクスチャを破棄してデコードを依頼する
    fn sync_preview(&mut self) {
        let current = self
            .session
            .image()
            .map(|image| (image.preview().id(), image.payload()));

        let Some((id, payload)) = current else {
            self.preview = None;
            return;
        };

        if self.preview.as_ref().map(|p| p.id) == Some(id) || self.preview_inflight == Some(id) {
            return;
        }

        self.preview = None;
        self.preview_inflight = Some(id);
        let sender = self.preview_tx.clone();

        std::thread::spawn(move || {
            let pixels = match decode_preview(payload.data()) {
                Ok(pixels) => Some(pixels),
                Err(err) => {
                    warn!("preview decode failed: {err:#}");
                    None
                }
            };
            let _ = sender.send(PreviewData { id, pixels });
        });
    }

    fn poll_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.preview_rx.try_recv() {
            if self.preview_inflight == Some(msg.id) {
                self.preview_inflight = None;
            }
            // 既に別の画像に差し替わっていれば捨てる
            let current = self.session.image().map(|image| image.preview().id());
            if current != Some(msg.id) {
                continue;
            }
            let texture = msg.pixels.map(|p| {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(p.size, &p.pixels);
                ctx.load_texture(
                    format!("preview-{}", msg.id),
                    color_image,
                    egui::TextureOptions::default(),
                )
            });
            self.preview = Some(PreviewTexture { id: msg.id, texture });
        }

        let outcome = self.classify_job.as_ref().and_then(ClassifyJob::poll);
        if let Some(outcome) = outcome {
            if let Some(job) = self.classify_job.take() {
                self.session.complete(&job.ticket, outcome);
            }
        }
    }

    fn render_upload_area(&mut self, ui: &mut egui::Ui) {
        let stroke_color = if self.is_dragging {
            Color32::from_rgb(99, 102, 241)
        } else {
            Color32::from_gray(90)
        };
        let frame = egui::Frame::none()
            .fill(if self.is_dragging { Color32::from_rgb(38, 40, 60) } else { Color32::from_rgb(24, 28, 40) })
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .rounding(egui::Rounding::same(10.0))
            .inner_margin(egui::Margin::same(12.0));

        let inner = frame.show(ui, |ui| {
            ui.set_min_size(egui::vec2(ui.available_width(), PANEL_HEIGHT));
            ui.centered_and_justified(|ui| {
                match (&self.preview, self.session.image()) {
                    (Some(PreviewTexture { texture: Some(texture), .. }), Some(_)) => {
                        ui.add(egui::Image::new(egui::load::SizedTexture::from_handle(texture)).shrink_to_fit());
                    }
                    (_, Some(image)) => {
                        let text = if self.preview_inflight.is_some() {
                            format!("{} ...", image.name())
                        } else {
                            image.name().to_string()
                        };
                        ui.label(text);
                    }
                    (_, None) => {
                        ui.vertical_centered(|ui| {
                            ui.add_space(PANEL_HEIGHT / 2.0 - 30.0);
                            ui.label(RichText::new("🖼").size(36.0));
                            ui.label(RichText::new(presentation::UPLOAD_PROMPT).color(Color32::from_rgb(129, 140, 248)));
                            ui.label(RichText::new(presentation::UPLOAD_FORMATS).size(11.0).color(Color32::from_gray(150)));
                        });
                    }
                }
            });
        });

        let response = inner.response.interact(egui::Sense::click());
        if response.clicked() {
            self.pick_file();
        }

        if let Some(notice) = self.session.upload_notice() {
            ui.add_space(6.0);
            ui.label(RichText::new(notice).size(12.0).color(Color32::from_rgb(248, 113, 113)));
        }
    }

    fn render_result(&self, ui: &mut egui::Ui) {
        let frame = egui::Frame::none()
            .fill(Color32::from_rgb(31, 35, 48))
            .rounding(egui::Rounding::same(10.0))
            .inner_margin(egui::Margin::same(16.0));

        frame.show(ui, |ui| {
            ui.set_min_size(egui::vec2(ui.available_width(), PANEL_HEIGHT));
            match ResultView::from_state(self.session.state()) {
                ResultView::Idle => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(PANEL_HEIGHT / 2.0 - 30.0);
                        ui.label(RichText::new(IDLE_HEADLINE).strong());
                        ui.label(RichText::new(IDLE_HINT).size(12.0).color(Color32::from_gray(150)));
                    });
                }
                ResultView::Loading => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(PANEL_HEIGHT / 2.0 - 30.0);
                        ui.add(egui::Spinner::new().size(32.0));
                        ui.label(LOADING_TEXT);
                    });
                }
                ResultView::Error { message } => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(PANEL_HEIGHT / 2.0 - 30.0);
                        ui.label(RichText::new(ERROR_HEADLINE).strong().color(Color32::from_rgb(248, 113, 113)));
                        ui.label(RichText::new(message).size(12.0).color(Color32::from_gray(170)));
                    });
                }
                ResultView::Result { object, percent, tier } => {
                    ui.label(RichText::new(RESULT_HEADLINE).heading());
                    ui.add_space(12.0);
                    ui.group(|ui| {
                        ui.set_min_width(ui.available_width());
                        ui.label(RichText::new(OBJECT_LABEL).size(12.0).color(Color32::from_gray(150)));
                        ui.label(RichText::new(object).size(24.0).strong().color(Color32::from_rgb(129, 140, 248)));
                    });
                    ui.add_space(12.0);
                    ui.label(RichText::new(CONFIDENCE_LABEL).size(12.0).color(Color32::from_gray(150)));
                    ui.add(
                        egui::ProgressBar::new(percent as f32 / 100.0)
                            .fill(tier_color(tier))
                            .text(format!("{percent}%")),
                    );
                }
            }
        });
    }
}

fn tier_color(tier: ConfidenceTier) -> Color32 {
    match tier {
        ConfidenceTier::High => Color32::from_rgb(34, 197, 94),
        ConfidenceTier::Medium => Color32::from_rgb(234, 179, 8),
        ConfidenceTier::Low => Color32::from_rgb(239, 68, 68),
    }
}

/// ベトナム語の声調記号を表示できるフォントを優先する
pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\segoeui.ttf",
        r"C:\Windows\Fonts\arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("vi_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .insert(0, "vi_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl Default for ClassifierApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.state().is_loading() || self.preview_inflight.is_some() {
            ctx.request_repaint();
        }
        self.poll_messages(ctx);
        self.handle_dropped_files(ctx);
        self.sync_preview();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.heading(RichText::new(presentation::TITLE).size(26.0).strong());
                ui.label(RichText::new(presentation::SUBTITLE).color(Color32::from_gray(170)));
                ui.add_space(8.0);
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Phát triển với Rust, egui, và Gemini API.").size(11.0).color(Color32::from_gray(130)));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(12.0);
            ui.columns(2, |columns| {
                self.render_upload_area(&mut columns[0]);
                self.render_result(&mut columns[1]);
            });

            ui.add_space(16.0);
            ui.vertical_centered(|ui| {
                let is_loading = self.session.state().is_loading();
                let button = egui::Button::new(RichText::new(classify_button_label(is_loading)).size(16.0))
                    .min_size(egui::vec2(220.0, 40.0));
                if ui.add_enabled(self.session.can_classify(), button).clicked() {
                    self.run_classify(ctx);
                }
            });
        });
    }
}
