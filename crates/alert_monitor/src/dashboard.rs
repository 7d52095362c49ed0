//! Dashboard principal – App eframe/egui.
//!
//! Dono de todas as peças: inbox, refresh loop, conexão MQTT e o sinal de
//! encerramento. A UI só lê a [`AlertView`]; quem escreve é o refresh loop.

use crate::broker::{self, BrokerHandle, LinkState, PendingConnect};
use crate::panels::{self, StatusLine};
use crate::theme_egui::{ActiveTheme, color};
use alert_core::config::AppConfig;
use alert_core::inbox::Inbox;
use alert_core::refresh::{AlertView, spawn_refresh_thread};
use alert_core::shutdown::{self, Shutdown, ShutdownTrigger};
use egui::RichText;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, info, warn};

/// Estado do dashboard.
pub struct AlertDashboard {
    config: AppConfig,
    config_path: PathBuf,
    theme: ActiveTheme,
    ctx: egui::Context,

    // Pipeline
    inbox: Arc<Inbox>,
    view: Arc<RwLock<AlertView>>,
    broker: Option<BrokerHandle>,
    pending: Option<PendingConnect>,
    connect_error: Option<String>,
    shutdown: ShutdownTrigger,
    token: Shutdown,
    refresh: Option<JoinHandle<()>>,

    // UI state
    is_fullscreen: bool,
}

impl AlertDashboard {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, config_path: PathBuf) -> Self {
        let display = &config.display;

        let inbox = Arc::new(Inbox::with_capacity(display.inbox_capacity));
        let view = Arc::new(RwLock::new(
            AlertView::new(display.history_size, display.unknown_label.clone())
                .with_severity(display.severity.clone()),
        ));
        let (shutdown, token) = shutdown::channel();

        // Inicia o refresh loop; cada alerta novo pede um repaint.
        let ctx = cc.egui_ctx.clone();
        let repaint = ctx.clone();
        let refresh = spawn_refresh_thread(
            Arc::clone(&inbox),
            Arc::clone(&view),
            display.refresh_interval(),
            token.clone(),
            move || repaint.request_repaint(),
        );

        let theme = ActiveTheme::named(&display.theme);

        let mut dashboard = Self {
            config,
            config_path,
            theme,
            ctx,
            inbox,
            view,
            broker: None,
            pending: None,
            connect_error: None,
            shutdown,
            token,
            refresh: Some(refresh),
            is_fullscreen: false,
        };
        dashboard.connect();
        dashboard
    }

    /// (Re)conecta no broker com a configuração atual, fora da thread da UI.
    fn connect(&mut self) {
        if let Some(old) = self.broker.take() {
            old.close();
        }
        self.connect_error = None;

        let ctx = self.ctx.clone();
        self.pending = Some(broker::connect_in_background(
            &self.config.broker,
            Arc::clone(&self.inbox),
            self.token.clone(),
            move || ctx.request_repaint(),
        ));
    }

    /// Recolhe o resultado da conexão em andamento, se já saiu.
    fn poll_connect(&mut self) {
        let Some(result) = self.pending.as_mut().and_then(PendingConnect::try_finish) else {
            return;
        };
        self.pending = None;
        match result {
            Ok(handle) => self.broker = Some(handle),
            Err(e) => {
                error!("Falha ao conectar em {}: {e}", self.config.broker.address());
                self.connect_error = Some(e.to_string());
            }
        }
    }

    /// Relê o config.toml (e o ambiente) e reconecta. Só a seção
    /// `[broker]` é aplicada; inbox e refresh loop continuam os mesmos.
    fn reconnect(&mut self) {
        if let Some(pending) = &self.pending {
            info!("Conexão com {} ainda em andamento", pending.address());
            return;
        }
        let mut fresh = AppConfig::load(&self.config_path);
        fresh.apply_env();
        for e in fresh.validate() {
            warn!("Config: {e}");
        }
        if fresh.display != self.config.display {
            info!("Mudanças em [display] só valem após reiniciar");
        }
        self.config.broker = fresh.broker;
        self.connect();
    }

    fn status_text(&self) -> (bool, String) {
        if let Some(pending) = &self.pending {
            return (false, format!("Conectando a {}…", pending.address()));
        }
        let broker_cfg = &self.config.broker;
        match (&self.broker, &self.connect_error) {
            (Some(handle), _) => {
                let state = handle.link_state();
                let connected = state == LinkState::Connected;
                let text = match state {
                    LinkState::Connected => format!(
                        "Conectado a {} | tópico '{}'",
                        handle.address(),
                        handle.topic()
                    ),
                    other => format!("{other} | {}", handle.address()),
                };
                (connected, text)
            }
            (None, Some(err)) => (
                false,
                format!("Falha na conexão MQTT ({}): {err}", broker_cfg.address()),
            ),
            (None, None) => (false, format!("Desconectado de {}", broker_cfg.address())),
        }
    }
}

impl eframe::App for AlertDashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Idade dos alertas muda mesmo sem mensagens novas.
        ctx.request_repaint_after(Duration::from_secs(1));

        self.poll_connect();
        ctx.set_visuals(self.theme.visuals());

        // ── Atalhos de teclado ──
        // Só lê o input aqui; comandos de viewport fora do lock do contexto.
        let (reconnect, next_theme, quit, fullscreen) = ctx.input(|i: &egui::InputState| {
            (
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::T),
                i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::F) || i.key_pressed(egui::Key::F11),
            )
        });
        if next_theme {
            self.theme = self.theme.next();
            info!("Tema: {}", self.theme.palette().name);
        }
        if fullscreen {
            self.is_fullscreen = !self.is_fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
        }
        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if reconnect {
            self.reconnect();
        }

        let (connected, status) = self.status_text();
        let palette = self.theme.palette();
        let view = self.view.read();

        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            // ── Título ──
            ui.vertical_centered(|ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("📡 MONITOR DE ALERTAS ROS2 → MQTT")
                        .color(color(palette.title))
                        .size(22.0)
                        .strong()
                        .monospace(),
                );
            });

            // ── Status de conexão ──
            panels::render_status(
                ui,
                &StatusLine {
                    connected,
                    text: &status,
                    pending: self.inbox.len(),
                    capacity: self.inbox.capacity(),
                    dropped: self.inbox.dropped(),
                    shown: view.shown(),
                },
                &self.theme,
            );

            ui.add_space(12.0);
            ui.label(
                RichText::new("Alertas em tempo real")
                    .color(color(palette.text))
                    .strong()
                    .size(15.0),
            );
            ui.add_space(4.0);

            panels::render_current(ui, &view, &self.theme);

            ui.add_space(10.0);
            panels::render_history(ui, &view, &self.theme);

            // ── Help bar (fundo) ──
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("[R] Reconectar | [T] Tema | [F] Fullscreen | [Q/Esc] Sair")
                        .color(color(palette.dim))
                        .monospace()
                        .size(10.0),
                );
            });
        });
    }
}

impl Drop for AlertDashboard {
    fn drop(&mut self) {
        info!("Encerrando monitor");
        // Dispara antes de tudo: cancela também um handshake em andamento.
        self.shutdown.trigger();
        drop(self.pending.take());
        if let Some(handle) = self.broker.take() {
            handle.close();
        }
        if let Some(refresh) = self.refresh.take() {
            if refresh.join().is_err() {
                error!("Refresh loop terminou em pânico");
            }
        }
    }
}
