//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável, com seções `[broker]` e
//! `[display]`. Campos ausentes assumem o valor padrão. Variáveis de
//! ambiente `ALERT_MONITOR_*` sobrescrevem o arquivo.

use crate::inbox::DEFAULT_INBOX_CAPACITY;
use crate::record::DEFAULT_UNKNOWN_LABEL;
use crate::refresh::DEFAULT_HISTORY_SIZE;
use crate::severity::SeverityRules;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const ENV_HOST: &str = "ALERT_MONITOR_HOST";
pub const ENV_PORT: &str = "ALERT_MONITOR_PORT";
pub const ENV_TOPIC: &str = "ALERT_MONITOR_TOPIC";

/// Faixa aceita para o período do refresh loop (ms).
pub const REFRESH_INTERVAL_RANGE_MS: RangeInclusive<u64> = 50..=60_000;
/// Faixa aceita para o keep-alive (s). O pacote CONNECT leva 16 bits.
pub const KEEP_ALIVE_RANGE_SECS: RangeInclusive<u64> = 5..=65_535;
/// Faixa aceita para o timeout de conexão (s).
pub const CONNECT_TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 1..=300;

/// Erros ao persistir a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de serialização TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro de E/S em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Conexão com o broker MQTT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Host ou IP do broker
    pub host: String,
    /// Porta TCP
    pub port: u16,
    /// Tópico assinado (um só, sem wildcards)
    pub topic: String,
    /// Client ID apresentado ao broker
    pub client_id: String,
    /// Keep-alive MQTT (segundos)
    pub keep_alive_secs: u64,
    /// Tempo máximo esperando CONNACK/SUBACK (segundos)
    pub connect_timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            topic: "robot/alerts".into(),
            client_id: "robot-alert-monitor".into(),
            keep_alive_secs: 60,
            connect_timeout_secs: 5,
        }
    }
}

impl BrokerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Erros que impedem a conexão.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.host.trim().is_empty() {
            errors.push("Host do broker não pode ser vazio".into());
        }
        if self.port == 0 {
            errors.push("Porta do broker não pode ser 0".into());
        }
        if self.topic.trim().is_empty() {
            errors.push("Tópico não pode ser vazio".into());
        } else if self.topic.contains(['+', '#']) {
            errors.push(format!("Tópico não pode conter wildcards: {}", self.topic));
        }
        if !KEEP_ALIVE_RANGE_SECS.contains(&self.keep_alive_secs) {
            errors.push(format!(
                "Keep-alive inválido: {}s (5–65535)",
                self.keep_alive_secs
            ));
        }
        if !CONNECT_TIMEOUT_RANGE_SECS.contains(&self.connect_timeout_secs) {
            errors.push(format!(
                "Timeout de conexão inválido: {}s (1–300)",
                self.connect_timeout_secs
            ));
        }

        errors
    }
}

/// Exibição e refresh loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Período do refresh loop (ms)
    pub refresh_interval_ms: u64,
    /// Capacidade da inbox antes de descartar os mais antigos
    pub inbox_capacity: usize,
    /// Quantos alertas anteriores ficam visíveis
    pub history_size: usize,
    /// Rótulo para alertas sem `type`
    pub unknown_label: String,
    /// Tema: "dark", "light", "high_contrast"
    pub theme: String,
    /// Quais `type` pintam o banner como crítico ou atenção
    pub severity: SeverityRules,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            history_size: DEFAULT_HISTORY_SIZE,
            unknown_label: DEFAULT_UNKNOWN_LABEL.into(),
            theme: "dark".into(),
            severity: SeverityRules::default(),
        }
    }
}

impl DisplayConfig {
    /// Período do refresh loop, preso à faixa aceita. Um valor fora dela
    /// (já reportado por `validate`) não pode virar laço quente.
    pub fn refresh_interval(&self) -> Duration {
        let ms = self.refresh_interval_ms.clamp(
            *REFRESH_INTERVAL_RANGE_MS.start(),
            *REFRESH_INTERVAL_RANGE_MS.end(),
        );
        Duration::from_millis(ms)
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Aplica overrides `ALERT_MONITOR_*` do ambiente do processo.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Aplica overrides vindos de uma função de lookup (testável sem mexer
    /// no ambiente global).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            info!("{ENV_HOST} sobrescreve host: {host}");
            self.broker.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(p) => {
                    info!("{ENV_PORT} sobrescreve porta: {p}");
                    self.broker.port = p;
                }
                Err(e) => warn!("{ENV_PORT} inválido ({port:?}): {e}"),
            }
        }
        if let Some(topic) = lookup(ENV_TOPIC).filter(|t| !t.trim().is_empty()) {
            info!("{ENV_TOPIC} sobrescreve tópico: {topic}");
            self.broker.topic = topic.trim().to_string();
        }
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.broker.validate();
        let display = &self.display;

        if !REFRESH_INTERVAL_RANGE_MS.contains(&display.refresh_interval_ms) {
            errors.push(format!(
                "Intervalo de refresh inválido: {}ms (50–60000)",
                display.refresh_interval_ms
            ));
        }
        if display.inbox_capacity == 0 {
            errors.push("Capacidade da inbox não pode ser 0".into());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn defaults_match_wire_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.broker.topic, "robot/alerts");
        assert_eq!(config.broker.keep_alive_secs, 60);
        assert_eq!(config.display.unknown_label, "unknown");
    }

    #[test]
    fn roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[broker]
host = "192.168.0.42"
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.broker.host, "192.168.0.42");
        // Outros campos devem ter valor padrão
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.display.refresh_interval_ms, 1000);
    }

    #[test]
    fn invalid_file_falls_back_to_default() {
        let path = std::env::temp_dir().join(format!(
            "alert_monitor_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[broker\nport = ").unwrap();
        let config = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "alert_monitor_save_{}.toml",
            std::process::id()
        ));
        let mut config = AppConfig::default();
        config.broker.topic = "fleet/7/alerts".into();
        config.display.history_size = 5;
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = AppConfig::default();
        config.broker.port = 0;
        config.broker.topic = "robot/+/alerts".into();
        config.display.refresh_interval_ms = 10;
        config.display.inbox_capacity = 0;
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "Erros: {errors:?}");
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let mut display = DisplayConfig {
            refresh_interval_ms: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(display.refresh_interval(), Duration::from_millis(50));
        display.refresh_interval_ms = u64::MAX;
        assert_eq!(display.refresh_interval(), Duration::from_secs(60));
        display.refresh_interval_ms = 250;
        assert_eq!(display.refresh_interval(), Duration::from_millis(250));
    }

    #[test]
    fn huge_broker_timers_are_rejected() {
        let broker = BrokerConfig {
            keep_alive_secs: 70_000,
            connect_timeout_secs: i64::MAX as u64,
            ..BrokerConfig::default()
        };
        assert_eq!(broker.validate().len(), 2, "Erros: {:?}", broker.validate());
    }

    #[test]
    fn severity_rules_from_toml() {
        let partial = r#"
[display.severity]
critical = ["fire"]
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.display.severity.critical, vec!["fire".to_string()]);
        assert_eq!(
            config.display.severity.warning,
            SeverityRules::default().warning
        );
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_HOST, "10.0.0.5"),
            (ENV_PORT, "8883"),
            (ENV_TOPIC, "amr/alerts"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.broker.host, "10.0.0.5");
        assert_eq!(config.broker.port, 8883);
        assert_eq!(config.broker.topic, "amr/alerts");
    }

    #[test]
    fn bad_env_port_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|k| (k == ENV_PORT).then(|| "porta".to_string()));
        assert_eq!(config.broker.port, 1883);
    }
}
