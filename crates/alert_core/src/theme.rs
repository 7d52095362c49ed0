//! Paletas do monitor de alertas.
//!
//! Cada paleta tem as cores da moldura e do texto, mais um par
//! fundo/texto de banner para cada [`Severity`]. As cores ficam como RGB
//! cru; a conversão para o toolkit acontece no binário.

use crate::severity::Severity;

/// Cor RGB de 8 bits por canal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Cores do banner de um alerta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    pub fill: Rgb,
    pub text: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    /// Visual base claro em vez de escuro
    pub light: bool,
    pub bg: Rgb,
    pub panel: Rgb,
    pub border: Rgb,
    pub text: Rgb,
    pub dim: Rgb,
    pub title: Rgb,
    /// Link com o broker ativo / perdido
    pub link_up: Rgb,
    pub link_down: Rgb,
    /// Indexado por [`Severity`]: info, atenção, crítico
    banners: [Banner; 3],
}

impl Palette {
    pub fn banner(&self, severity: Severity) -> Banner {
        match severity {
            Severity::Info => self.banners[0],
            Severity::Warning => self.banners[1],
            Severity::Critical => self.banners[2],
        }
    }

    /// Paleta pelo nome do config; desconhecido cai no escuro.
    pub fn by_name(name: &str) -> &'static Palette {
        PALETTES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .unwrap_or(&PALETTES[0])
    }
}

const DARK: Palette = Palette {
    name: "dark",
    light: false,
    bg: Rgb(0x1a, 0x1a, 0x1a),
    panel: Rgb(0x25, 0x25, 0x25),
    border: Rgb(0x33, 0x33, 0x33),
    text: Rgb(0xff, 0xff, 0xff),
    dim: Rgb(0x66, 0x66, 0x66),
    title: Rgb(0x00, 0xd9, 0xff),
    link_up: Rgb(0x00, 0xff, 0x88),
    link_down: Rgb(0xff, 0x33, 0x33),
    banners: [
        Banner { fill: Rgb(0x0d, 0x2a, 0x40), text: Rgb(0x66, 0xcc, 0xff) },
        Banner { fill: Rgb(0x4a, 0x3b, 0x00), text: Rgb(0xff, 0xcc, 0x00) },
        Banner { fill: Rgb(0x4d, 0x0f, 0x0f), text: Rgb(0xff, 0x55, 0x55) },
    ],
};

const LIGHT: Palette = Palette {
    name: "light",
    light: true,
    bg: Rgb(0xf5, 0xf5, 0xf5),
    panel: Rgb(0xff, 0xff, 0xff),
    border: Rgb(0xcc, 0xcc, 0xcc),
    text: Rgb(0x33, 0x33, 0x33),
    dim: Rgb(0x88, 0x88, 0x88),
    title: Rgb(0x00, 0x66, 0xcc),
    link_up: Rgb(0x00, 0xaa, 0x55),
    link_down: Rgb(0xcc, 0x22, 0x22),
    banners: [
        Banner { fill: Rgb(0xdd, 0xee, 0xff), text: Rgb(0x00, 0x4d, 0x99) },
        Banner { fill: Rgb(0xff, 0xf3, 0xcd), text: Rgb(0x85, 0x64, 0x04) },
        Banner { fill: Rgb(0xf8, 0xd7, 0xda), text: Rgb(0x72, 0x1c, 0x24) },
    ],
};

// Acessibilidade: fundo preto, texto saturado, sem meio-tons.
const HIGH_CONTRAST: Palette = Palette {
    name: "high_contrast",
    light: false,
    bg: Rgb(0x00, 0x00, 0x00),
    panel: Rgb(0x1a, 0x1a, 0x1a),
    border: Rgb(0xff, 0xff, 0xff),
    text: Rgb(0xff, 0xff, 0xff),
    dim: Rgb(0xcc, 0xcc, 0xcc),
    title: Rgb(0x00, 0xff, 0xff),
    link_up: Rgb(0x00, 0xff, 0x00),
    link_down: Rgb(0xff, 0x00, 0x00),
    banners: [
        Banner { fill: Rgb(0x00, 0x00, 0x00), text: Rgb(0xff, 0xff, 0xff) },
        Banner { fill: Rgb(0x00, 0x00, 0x00), text: Rgb(0xff, 0xff, 0x00) },
        Banner { fill: Rgb(0xff, 0x00, 0x00), text: Rgb(0xff, 0xff, 0xff) },
    ],
};

/// Paletas na ordem de rotação da tecla `T`.
pub const PALETTES: [Palette; 3] = [DARK, LIGHT, HIGH_CONTRAST];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Palette::by_name("light").name, "light");
        assert_eq!(Palette::by_name(" High_Contrast ").name, "high_contrast");
        assert_eq!(Palette::by_name("nonexistent").name, "dark");
    }

    #[test]
    fn severities_are_distinguishable() {
        for palette in &PALETTES {
            let [info, warning, critical] = Severity::ALL.map(|s| palette.banner(s));
            assert_ne!(info, warning, "{}", palette.name);
            assert_ne!(warning, critical, "{}", palette.name);
            assert_ne!(info, critical, "{}", palette.name);
        }
    }

    #[test]
    fn banner_text_stands_out_from_fill() {
        // Distância mínima entre texto e fundo do banner, soma dos canais.
        for palette in &PALETTES {
            for severity in Severity::ALL {
                let Banner { fill, text } = palette.banner(severity);
                let diff = fill.0.abs_diff(text.0) as u16
                    + fill.1.abs_diff(text.1) as u16
                    + fill.2.abs_diff(text.2) as u16;
                assert!(diff >= 200, "{} / {:?}: {diff}", palette.name, severity);
            }
        }
    }
}
