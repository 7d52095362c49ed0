//! Painéis do dashboard renderizados com egui.

use crate::theme_egui::{ActiveTheme, color};
use alert_core::refresh::{AlertView, DisplayedAlert};
use egui::{RichText, Ui};

fn panel_frame(ui: &mut Ui, title: &str, theme: &ActiveTheme, add_body: impl FnOnce(&mut Ui)) {
    let p = theme.palette();
    egui::Frame::new()
        .fill(color(p.panel))
        .stroke(egui::Stroke::new(1.0, color(p.border)))
        .corner_radius(4.0)
        .inner_margin(8.0)
        .show(ui, |ui: &mut Ui| {
            ui.label(
                RichText::new(format!("── {title} ──"))
                    .color(color(p.title))
                    .strong()
                    .monospace()
                    .size(13.0),
            );
            ui.add_space(4.0);
            add_body(ui);
        });
}

fn age_label(alert: &DisplayedAlert) -> String {
    let secs = alert.shown_at.elapsed().as_secs();
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}min", secs / 60),
        _ => format!("{}h", secs / 3600),
    }
}

// ──────────────────────────────────────────
// Alerta atual
// ──────────────────────────────────────────

/// Notificação do alerta mais recente: `🚨 [tipo] mensagem`, na cor da
/// gravidade.
pub fn render_current(ui: &mut Ui, view: &AlertView, theme: &ActiveTheme) {
    let dim = color(theme.palette().dim);
    let Some(alert) = view.current() else {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(
                RichText::new("Nenhum alerta recebido")
                    .color(dim)
                    .monospace()
                    .size(16.0),
            );
        });
        return;
    };

    let (fill, text) = theme.banner(alert.severity);
    egui::Frame::new()
        .fill(fill)
        .stroke(egui::Stroke::new(2.0, text))
        .corner_radius(6.0)
        .inner_margin(12.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(format!("🚨 {}", alert.text))
                    .color(text)
                    .strong()
                    .size(20.0),
            );
            ui.label(
                RichText::new(format!("{} · há {}", alert.severity.label(), age_label(alert)))
                    .color(dim)
                    .monospace()
                    .size(11.0),
            );
        });
}

// ──────────────────────────────────────────
// Histórico recente
// ──────────────────────────────────────────

pub fn render_history(ui: &mut Ui, view: &AlertView, theme: &ActiveTheme) {
    let p = theme.palette();
    panel_frame(ui, "ALERTAS ANTERIORES", theme, |ui: &mut Ui| {
        let mut any = false;
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                for alert in view.recent() {
                    any = true;
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(
                            RichText::new(format!("{:>6}", age_label(alert)))
                                .color(color(p.dim))
                                .monospace(),
                        );
                        ui.label(
                            RichText::new(format!("[{}]", alert.kind))
                                .color(theme.banner(alert.severity).1)
                                .monospace(),
                        );
                        ui.label(RichText::new(&alert.message).color(color(p.text)));
                    });
                }
            });
        if !any {
            ui.label(RichText::new("Sem histórico").color(color(p.dim)).monospace());
        }
    });
}

// ──────────────────────────────────────────
// Status
// ──────────────────────────────────────────

/// Dados da barra de status, montados pelo dashboard a cada frame.
pub struct StatusLine<'a> {
    pub connected: bool,
    pub text: &'a str,
    pub pending: usize,
    pub capacity: usize,
    pub dropped: u64,
    pub shown: u64,
}

pub fn render_status(ui: &mut Ui, status: &StatusLine<'_>, theme: &ActiveTheme) {
    let p = theme.palette();
    ui.vertical_centered(|ui: &mut Ui| {
        let (marker, link) = if status.connected {
            ("●", p.link_up)
        } else {
            ("○", p.link_down)
        };
        ui.label(
            RichText::new(format!("{marker} {}", status.text))
                .color(color(link))
                .monospace(),
        );
        ui.label(
            RichText::new(format!(
                "Pendentes: {}/{} | Descartados: {} | Exibidos: {}",
                status.pending, status.capacity, status.dropped, status.shown
            ))
            .color(color(p.dim))
            .monospace()
            .size(11.0),
        );
    });
}
