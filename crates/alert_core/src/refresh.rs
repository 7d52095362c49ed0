//! Refresh loop: drena a [`Inbox`] em ritmo fixo e atualiza o alerta exibido.
//!
//! Só este loop escreve em [`AlertView`]. A UI apenas lê.

use crate::inbox::Inbox;
use crate::record::{AlertRecord, DEFAULT_UNKNOWN_LABEL, TYPE_KEY};
use crate::severity::{Severity, SeverityRules};
use crate::shutdown::Shutdown;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Tamanho padrão do histórico recente exibido.
pub const DEFAULT_HISTORY_SIZE: usize = 20;

/// Alerta já formatado para exibição.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedAlert {
    pub kind: String,
    pub message: String,
    pub text: String,
    pub severity: Severity,
    pub record: AlertRecord,
    pub shown_at: Instant,
}

impl DisplayedAlert {
    fn new(record: AlertRecord, unknown_label: &str, rules: &SeverityRules) -> Self {
        let kind = record.kind(unknown_label);
        let typed = record.get(TYPE_KEY).is_some_and(|v| !v.is_null());
        Self {
            severity: rules.classify(typed.then_some(kind.as_str())),
            message: record.message(),
            text: record.display_text(unknown_label),
            kind,
            record,
            shown_at: Instant::now(),
        }
    }
}

/// Estado visível: o alerta atual e os últimos exibidos (mais novo primeiro).
#[derive(Debug, Clone)]
pub struct AlertView {
    current: Option<DisplayedAlert>,
    recent: VecDeque<DisplayedAlert>,
    history_size: usize,
    unknown_label: String,
    rules: SeverityRules,
    shown: u64,
}

impl AlertView {
    pub fn new(history_size: usize, unknown_label: impl Into<String>) -> Self {
        Self {
            current: None,
            recent: VecDeque::with_capacity(history_size.min(DEFAULT_HISTORY_SIZE)),
            history_size,
            unknown_label: unknown_label.into(),
            rules: SeverityRules::default(),
            shown: 0,
        }
    }

    /// Troca as regras de gravidade usadas nos próximos alertas.
    pub fn with_severity(mut self, rules: SeverityRules) -> Self {
        self.rules = rules;
        self
    }

    /// Um tick do loop: retira no máximo um registro da inbox.
    /// Retorna `true` se o alerta exibido mudou.
    pub fn tick(&mut self, inbox: &Inbox) -> bool {
        match inbox.drain_one() {
            Some(record) => {
                self.show(record);
                true
            }
            None => false,
        }
    }

    fn show(&mut self, record: AlertRecord) {
        let alert = DisplayedAlert::new(record, &self.unknown_label, &self.rules);
        debug!("Exibindo alerta: {}", alert.text);

        if let Some(prev) = self.current.replace(alert) {
            if self.history_size > 0 {
                if self.recent.len() >= self.history_size {
                    self.recent.pop_back();
                }
                self.recent.push_front(prev);
            }
        }
        self.shown += 1;
    }

    pub fn current(&self) -> Option<&DisplayedAlert> {
        self.current.as_ref()
    }

    /// Texto do alerta atual, se houver.
    pub fn current_text(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.text.as_str())
    }

    /// Alertas exibidos antes do atual, do mais novo ao mais antigo.
    pub fn recent(&self) -> impl Iterator<Item = &DisplayedAlert> {
        self.recent.iter()
    }

    /// Total de alertas exibidos desde o início.
    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl Default for AlertView {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE, DEFAULT_UNKNOWN_LABEL)
    }
}

/// Inicia a thread do refresh loop.
///
/// A cada `period` retira um alerta da inbox; quando a view muda, chama
/// `notify` (a UI passa `request_repaint`). Termina quando `shutdown` dispara.
pub fn spawn_refresh_thread<F>(
    inbox: Arc<Inbox>,
    view: Arc<RwLock<AlertView>>,
    period: Duration,
    shutdown: Shutdown,
    notify: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    std::thread::Builder::new()
        .name("alert-refresh".into())
        .spawn(move || {
            info!("Refresh loop iniciado (período {}ms)", period.as_millis());
            refresh_loop(&inbox, &view, period, &shutdown, &notify);
            info!("Refresh loop encerrado");
        })
        .expect("Falha ao criar thread de refresh")
}

fn refresh_loop(
    inbox: &Inbox,
    view: &RwLock<AlertView>,
    period: Duration,
    shutdown: &Shutdown,
    notify: &dyn Fn(),
) {
    loop {
        let cycle_start = Instant::now();

        // Lock curto: a UI só espera pelo pop + formatação de um registro.
        let changed = view.write().tick(inbox);
        if changed {
            notify();
        }

        let elapsed = cycle_start.elapsed();
        let wait = period.saturating_sub(elapsed);
        if shutdown.wait_timeout(wait) {
            break;
        }
    }
}
