use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingSource {
    CliFlag(&'static str),
    Environment(&'static str),
    ConfigKey(&'static str),
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CliFlag(flag) => write!(f, "CLI flag `{flag}`"),
            Self::Environment(var) => write!(f, "environment variable `{var}`"),
            Self::ConfigKey(key) => write!(f, "configuration key `{key}`"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigSources {
    pub(crate) session_worker_threads: Option<SettingSource>,
    pub(crate) ranking_half_life_days: Option<SettingSource>,
    pub(crate) ranking_window_days: Option<SettingSource>,
}

impl ConfigSources {
    pub(crate) fn source_for_worker_threads(&self) -> SettingSource {
        self.session_worker_threads
            .clone()
            .unwrap_or(SettingSource::ConfigKey("session.worker_threads"))
    }

    pub(crate) fn source_for_half_life(&self) -> SettingSource {
        self.ranking_half_life_days
            .clone()
            .unwrap_or(SettingSource::ConfigKey("ranking.half_life_days"))
    }

    pub(crate) fn source_for_window(&self) -> SettingSource {
        self.ranking_window_days
            .clone()
            .unwrap_or(SettingSource::ConfigKey("ranking.window_days"))
    }
}
