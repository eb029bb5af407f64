use tracing::{trace, warn};

use crate::charts::ChartSet;
use crate::domain::{DashConfig, Result};
use crate::explorer::Overview;
use crate::indicators::Indicators;
use crate::session::Session;
use crate::table::{SalesTable, TableEcho};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Load,
    Explore,
    Indicators,
    Charts,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Load, Mode::Explore, Mode::Indicators, Mode::Charts];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Load => "Cargar archivo",
            Mode::Explore => "Análisis exploratorio",
            Mode::Indicators => "Indicadores",
            Mode::Charts => "Gráficas",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Mode::Load => "1. Carga de archivo CSV",
            Mode::Explore => "2. Exploración de Datos",
            Mode::Indicators => "3. Indicadores Clave",
            Mode::Charts => "4. Visualizaciones",
        }
    }

    pub fn from_index(idx: usize) -> Option<Mode> {
        Mode::ALL.get(idx).copied()
    }

    pub fn index(&self) -> usize {
        Mode::ALL.iter().position(|m| m == self).unwrap_or(0)
    }

    pub fn next(&self) -> Mode {
        Mode::ALL[(self.index() + 1) % Mode::ALL.len()]
    }

    pub fn previous(&self) -> Mode {
        Mode::ALL[(self.index() + Mode::ALL.len() - 1) % Mode::ALL.len()]
    }
}

/// What the active mode renders.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Load(Option<TableEcho>),
    Explore(Overview),
    Indicators(Indicators),
    Charts(ChartSet),
    Warning(String),
}

/// Computes the view for `mode` from the current session.
///
/// Every mode is always entered. Modes that need a table show a warning
/// instead of computing anything when the session is empty.
pub fn activate(mode: Mode, session: &Session, config: &DashConfig) -> View {
    trace!("Activating {mode:?}");
    match mode {
        Mode::Load => match session.table().map(TableEcho::from_table).transpose() {
            Ok(echo) => View::Load(echo),
            Err(e) => warning(mode, e.to_string()),
        },
        Mode::Explore => guarded(mode, session, |t| {
            Overview::from_table(t, config.preview_rows).map(View::Explore)
        }),
        Mode::Indicators => guarded(mode, session, |t| {
            Indicators::from_table(t).map(View::Indicators)
        }),
        Mode::Charts => guarded(mode, session, |t| {
            ChartSet::from_table(t, config.top_n).map(View::Charts)
        }),
    }
}

fn guarded<F>(mode: Mode, session: &Session, compute: F) -> View
where
    F: FnOnce(&SalesTable) -> Result<View>,
{
    match session.require_table().and_then(compute) {
        Ok(view) => view,
        Err(e) => warning(mode, e.to_string()),
    }
}

fn warning(mode: Mode, message: String) -> View {
    warn!("{mode:?} view unavailable: {message}");
    View::Warning(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MISSING_TABLE_WARNING;

    #[test]
    fn labels_follow_tab_order() {
        let labels: Vec<&str> = Mode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            labels,
            vec!["Cargar archivo", "Análisis exploratorio", "Indicadores", "Gráficas"]
        );
        assert_eq!(Mode::Indicators.index(), 2);
    }

    #[test]
    fn initial_mode_is_load() {
        assert_eq!(Mode::default(), Mode::Load);
    }

    #[test]
    fn modes_cycle() {
        assert_eq!(Mode::Charts.next(), Mode::Load);
        assert_eq!(Mode::Load.previous(), Mode::Charts);
        assert_eq!(Mode::from_index(2), Some(Mode::Indicators));
        assert_eq!(Mode::from_index(4), None);
    }

    #[test]
    fn guarded_modes_warn_without_table() {
        let session = Session::new();
        let config = DashConfig::default();
        for mode in [Mode::Explore, Mode::Indicators, Mode::Charts] {
            assert_eq!(
                activate(mode, &session, &config),
                View::Warning(MISSING_TABLE_WARNING.to_string())
            );
        }
        assert_eq!(activate(Mode::Load, &session, &config), View::Load(None));
    }
}
