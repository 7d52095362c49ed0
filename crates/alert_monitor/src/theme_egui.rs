//! Paletas do core em tipos egui.

use alert_core::severity::Severity;
use alert_core::theme::{PALETTES, Palette, Rgb};
use egui::Color32;

pub fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Paleta ativa e posição dela na rotação da tecla `T`.
#[derive(Clone, Copy)]
pub struct ActiveTheme {
    index: usize,
}

impl ActiveTheme {
    pub fn named(name: &str) -> Self {
        let wanted = Palette::by_name(name).name;
        let index = PALETTES.iter().position(|p| p.name == wanted).unwrap_or(0);
        Self { index }
    }

    pub fn palette(&self) -> &'static Palette {
        &PALETTES[self.index]
    }

    pub fn next(self) -> Self {
        Self {
            index: (self.index + 1) % PALETTES.len(),
        }
    }

    /// (fundo, texto) do banner para a gravidade.
    pub fn banner(&self, severity: Severity) -> (Color32, Color32) {
        let banner = self.palette().banner(severity);
        (color(banner.fill), color(banner.text))
    }

    pub fn visuals(&self) -> egui::Visuals {
        let p = self.palette();
        let mut visuals = if p.light {
            egui::Visuals::light()
        } else {
            egui::Visuals::dark()
        };
        visuals.panel_fill = color(p.bg);
        visuals.window_fill = color(p.panel);
        visuals.override_text_color = Some(color(p.text));
        visuals
    }
}
