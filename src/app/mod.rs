use std::path::PathBuf;

use anyhow::Result;
use eframe::egui::{Color32, RichText, TextEdit, Widget};
use eframe::{egui, Frame};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, Points};

use calculator::{format_money, Schedule, ScheduleEntry};
pub use config::Config;
use config::{Field, Inputs};
use export::ExportKind;

mod calculator;
mod config;
mod export;

const TABLE_HEADER: [&str; 4] = ["Mês", "Aporte", "Juros", "Saldo"];
const PLACEHOLDER_ROW: [&str; 4] = ["Erro", "Verifique", "os dados", "digitados"];

pub struct App {
    cfg: Config,
    inputs: Inputs,
    /// Set only by a successful generation, cleared by a failed one.
    schedule: Option<Schedule>,
    rows: Vec<[String; 4]>,
    points: Vec<[f64; 2]>,
    warn: Result<()>,
    status: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            cfg: Config::default(),
            inputs: Inputs::default(),
            schedule: None,
            rows: Vec::new(),
            points: Vec::new(),
            warn: Ok(()),
            status: None,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if let Some(warn) = self.warning() {
            egui::TopBottomPanel::top("warn_panel").show(ctx, |ui| {
                ui.label(RichText::new(warn).color(Color32::RED));
            });
        }

        egui::TopBottomPanel::bottom("bottom").show(ctx, |ui| {
            ui.horizontal(|ui| {
                egui::widgets::global_theme_preference_switch(ui);
                if let Some(status) = &self.status {
                    ui.label(status.as_str());
                }
            });
        });

        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(self.cfg.title.as_str());
            });
            ui.add_space(8.0);

            for field in Field::ALL {
                let response = TextEdit::singleline(self.inputs.get_mut(field))
                    .hint_text(field.hint())
                    .desired_width(f32::INFINITY)
                    .ui(ui);
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = Some(Action::Generate);
                }
            }

            ui.horizontal(|ui| {
                if ui.button("Gerar Cronograma").clicked() {
                    action = Some(Action::Generate);
                }
                if ui.button("Exportar para CSV").clicked() {
                    action = Some(Action::Export(ExportKind::Csv));
                }
                if ui.button("Salvar Gráfico como PNG").clicked() {
                    action = Some(Action::Export(ExportKind::Png));
                }
            });

            ui.separator();

            ui.columns(2, |columns| {
                self.show_table(&mut columns[0]);
                self.show_chart(&mut columns[1]);
            });
        });

        match action {
            Some(Action::Generate) => self.generate(),
            Some(Action::Export(kind)) => {
                self.export_with(kind, || export::pick_destination(kind))
            }
            None => {}
        }
    }
}

#[derive(Copy, Clone)]
enum Action {
    Generate,
    Export(ExportKind),
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>, cfg: Config) -> Self {
        Self {
            cfg,
            ..Default::default()
        }
    }

    fn generate(&mut self) {
        self.warn = Ok(());
        self.status = None;

        match calculator::generate_from_inputs(&self.inputs) {
            Ok(schedule) => {
                tracing::info!(
                    months = schedule.len(),
                    final_balance = %schedule.final_balance().unwrap_or_default(),
                    "schedule generated"
                );
                self.rows = schedule.entries().iter().map(table_row).collect();
                self.points = export::chart_points(&schedule.balances())
                    .into_iter()
                    .map(|(x, y)| [x, y])
                    .collect();
                self.schedule = Some(schedule);
            }
            Err(e) => {
                tracing::warn!(error = %e, "invalid parameters");
                self.rows = vec![PLACEHOLDER_ROW.map(String::from)];
                self.points.clear();
                self.schedule = None;
                self.warn = Err(e.into());
            }
        }
    }

    fn export_with(&mut self, kind: ExportKind, pick: impl FnOnce() -> Option<PathBuf>) {
        let result = match kind {
            ExportKind::Csv => export::export_csv(self.schedule.as_ref(), pick),
            ExportKind::Png => export::export_chart(self.schedule.as_ref(), &self.cfg.chart, pick),
        };

        match result {
            Ok(Some(path)) => {
                self.warn = Ok(());
                self.status = Some(format!("Arquivo salvo em {}", path.display()));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = ?e, "export failed");
                self.warn = Err(e);
            }
        }
    }

    fn warning(&self) -> Option<String> {
        self.warn.as_ref().err().map(|e| format!("{e:#}"))
    }

    fn summary(&self) -> Option<String> {
        let schedule = self.schedule.as_ref()?;
        let final_balance = schedule.final_balance()?;
        Some(format!(
            "Saldo final: {}   Total aportado: {}   Juros: {}",
            format_money(final_balance),
            format_money(schedule.total_contributed()),
            format_money(schedule.total_interest()),
        ))
    }

    fn show_table(&self, ui: &mut egui::Ui) {
        if let Some(summary) = self.summary() {
            ui.label(RichText::new(summary).strong());
        }

        let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;

        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(50.0))
            .columns(Column::remainder(), 3)
            .header(text_height, |mut header| {
                for title in TABLE_HEADER {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(text_height, self.rows.len(), |mut row| {
                    if let Some(cells) = self.rows.get(row.index()) {
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell.as_str());
                            });
                        }
                    }
                });
            });
    }

    fn show_chart(&self, ui: &mut egui::Ui) {
        let chart = &self.cfg.chart;
        let (r, g, b) = chart.color;
        let color = Color32::from_rgb(r, g, b);

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(chart.title.as_str()).strong());
        });

        Plot::new("balance_plot")
            .x_axis_label(chart.x_label.as_str())
            .y_axis_label(chart.y_label.as_str())
            .show(ui, |plot_ui| {
                if self.points.is_empty() {
                    return;
                }
                plot_ui.line(
                    Line::new(PlotPoints::new(self.points.clone()))
                        .color(color)
                        .width(2.0)
                        .name(chart.y_label.as_str()),
                );
                plot_ui.points(
                    Points::new(PlotPoints::new(self.points.clone()))
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(chart.marker_radius as f32),
                );
            });
    }
}

fn table_row(entry: &ScheduleEntry) -> [String; 4] {
    [
        entry.month.to_string(),
        format_money(entry.contribution),
        format_money(entry.interest),
        format_money(entry.balance),
    ]
}
