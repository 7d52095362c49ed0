//! Sinal de encerramento cooperativo entre threads.
//!
//! O [`ShutdownTrigger`] fica com o dono do processo; cada thread recebe um
//! [`Shutdown`] clonado. Disparar o trigger (ou simplesmente dropá-lo)
//! fecha o channel e todas as cópias passam a reportar `is_triggered()`.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use std::time::Duration;

/// Lado que dispara o encerramento.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: Option<Sender<()>>,
}

/// Lado observado pelas threads de trabalho.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: Receiver<()>,
}

/// Cria um par trigger/token.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    // Nada é enviado: o sinal é a desconexão do channel.
    let (tx, rx) = bounded::<()>(0);
    (ShutdownTrigger { tx: Some(tx) }, Shutdown { rx })
}

impl ShutdownTrigger {
    /// Dispara o encerramento. Idempotente.
    pub fn trigger(&mut self) {
        self.tx.take();
    }
}

impl Shutdown {
    /// Token que nunca dispara. Útil em testes e ferramentas.
    pub fn never() -> Self {
        Self {
            rx: crossbeam_channel::never(),
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Dorme até `timeout` ou até o encerramento, o que vier primeiro.
    /// Retorna `true` se o encerramento foi disparado.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(self.rx.recv_timeout(timeout), Err(RecvTimeoutError::Disconnected))
    }
}
