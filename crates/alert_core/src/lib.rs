//! # Alert Core
//!
//! Núcleo do monitor de alertas de robôs: decodificação dos payloads MQTT,
//! a inbox compartilhada entre a thread de rede e o refresh loop, o próprio
//! refresh loop e a configuração TOML.
//!
//! ## Módulos
//! - [`record`] – Registro de alerta e formatação `[tipo] mensagem`
//! - [`decoder`] – Payload bruto → [`AlertRecord`], nunca falha
//! - [`inbox`] – Fila FIFO limitada e thread-safe
//! - [`refresh`] – Refresh loop e estado exibido
//! - [`severity`] – Gravidade do alerta a partir do `type`
//! - [`shutdown`] – Sinal de encerramento cooperativo
//! - [`config`] – Configuração unificada via TOML
//! - [`theme`] – Paletas (Dark, Light, High Contrast) com cor por gravidade

pub mod record;
pub mod decoder;
pub mod inbox;
pub mod refresh;
pub mod severity;
pub mod shutdown;
pub mod config;
pub mod theme;

// Re-exports convenientes
pub use record::AlertRecord;
pub use decoder::decode_payload;
pub use inbox::Inbox;
pub use refresh::{AlertView, DisplayedAlert, spawn_refresh_thread};
pub use severity::{Severity, SeverityRules};
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use config::{AppConfig, BrokerConfig, DisplayConfig};
