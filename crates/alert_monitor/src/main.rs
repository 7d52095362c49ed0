//! # Robot Alert Monitor
//!
//! Dashboard em tempo real dos alertas publicados pelos robôs (ROS2 → MQTT).
//!
//! Assina um tópico MQTT (padrão `robot/alerts`), decodifica cada payload e
//! mostra o alerta mais recente como `[tipo] mensagem`, com o histórico
//! logo abaixo.
//!
//! ## Atalhos
//! - `R`: Reconectar (relê o `config.toml`)
//! - `T`: Alternar tema
//! - `F` / `F11`: Fullscreen
//! - `Q` / `Esc`: Sair

mod broker;
mod dashboard;
mod panels;
mod theme_egui;

use alert_core::config::AppConfig;
use dashboard::AlertDashboard;
use tracing::warn;

fn main() -> eframe::Result<()> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let mut config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    config.apply_env();
    for e in config.validate() {
        warn!("Config: {e}");
    }

    // ── Janela eframe ──
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("📡 Robot Alert Monitor")
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Robot Alert Monitor",
        options,
        Box::new(move |cc| Ok(Box::new(AlertDashboard::new(cc, config, config_path)))),
    )
}
