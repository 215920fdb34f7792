//! Engine tunables: history window, lookup caps, and title length.

use crate::error::SettingsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Prior turns fed to generation. Whole user/assistant pairs, so even.
    pub history_window: usize,
    /// Cap for SPECIFIC and GENERAL case lookups.
    pub case_limit: usize,
    pub document_limit: usize,
    pub actor_limit: usize,
    /// Cap for PERSONAL lookups of a linked actor.
    pub personal_limit: usize,
    /// Cap for the recent-records fallback of an unlinked user.
    pub fallback_limit: usize,
    /// Characters kept from the first question when titling a conversation.
    pub title_max_chars: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            history_window: 6,
            case_limit: 10,
            document_limit: 5,
            actor_limit: 5,
            personal_limit: 10,
            fallback_limit: 5,
            title_max_chars: 50,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.history_window == 0 || self.history_window % 2 != 0 {
            return Err(SettingsError::HistoryWindow(self.history_window));
        }
        let limits = [
            ("case_limit", self.case_limit),
            ("document_limit", self.document_limit),
            ("actor_limit", self.actor_limit),
            ("personal_limit", self.personal_limit),
            ("fallback_limit", self.fallback_limit),
            ("title_max_chars", self.title_max_chars),
        ];
        if let Some((field, _)) = limits.iter().find(|(_, v)| *v == 0) {
            return Err(SettingsError::ZeroLimit { field });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn odd_or_zero_window_rejected() {
        for window in [0, 5] {
            let settings = EngineSettings {
                history_window: window,
                ..Default::default()
            };
            assert_eq!(
                settings.validate(),
                Err(SettingsError::HistoryWindow(window))
            );
        }
    }

    #[test]
    fn zero_limit_named() {
        let settings = EngineSettings {
            actor_limit: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ZeroLimit {
                field: "actor_limit"
            })
        );
    }
}
