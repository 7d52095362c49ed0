//! Gravidade de um alerta, derivada do campo `type`.
//!
//! O robô não manda gravidade no payload; a classificação vem da seção
//! `[display.severity]` do config. Tipos não listados (e alertas sem
//! `type`) ficam como [`Severity::Info`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Critical];

    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "atenção",
            Severity::Critical => "crítico",
        }
    }
}

/// Listas de `type` por gravidade. Comparação sem diferenciar maiúsculas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityRules {
    pub critical: Vec<String>,
    pub warning: Vec<String>,
}

impl Default for SeverityRules {
    fn default() -> Self {
        Self {
            critical: ["collision", "emergency_stop", "estop", "fault"]
                .map(String::from)
                .to_vec(),
            warning: ["low_battery", "obstacle", "localization_lost", "overheat"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl SeverityRules {
    /// Classifica um `type`. `None` é alerta sem tipo.
    pub fn classify(&self, kind: Option<&str>) -> Severity {
        let Some(kind) = kind.map(str::trim) else {
            return Severity::Info;
        };
        let listed = |list: &[String]| list.iter().any(|k| k.trim().eq_ignore_ascii_case(kind));

        if listed(&self.critical) {
            Severity::Critical
        } else if listed(&self.warning) {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules() {
        let rules = SeverityRules::default();
        assert_eq!(rules.classify(Some("collision")), Severity::Critical);
        assert_eq!(rules.classify(Some("low_battery")), Severity::Warning);
        assert_eq!(rules.classify(Some("heartbeat")), Severity::Info);
        assert_eq!(rules.classify(None), Severity::Info);
    }

    #[test]
    fn match_ignores_case_and_padding() {
        let rules = SeverityRules {
            critical: vec![" E-Stop ".into()],
            warning: vec![],
        };
        assert_eq!(rules.classify(Some("e-stop")), Severity::Critical);
        assert_eq!(rules.classify(Some("E-STOP ")), Severity::Critical);
    }

    #[test]
    fn critical_wins_over_warning() {
        let rules = SeverityRules {
            critical: vec!["obstacle".into()],
            warning: vec!["obstacle".into()],
        };
        assert_eq!(rules.classify(Some("obstacle")), Severity::Critical);
    }
}
