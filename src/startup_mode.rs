#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DesktopMode {
    Development,
    Packaged,
}

impl DesktopMode {
    /// Anything other than an explicit development value selects packaged mode.
    pub fn from_env_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Packaged;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Packaged,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Packaged => "packaged",
        }
    }

    pub fn is_packaged(self) -> bool {
        self == Self::Packaged
    }
}
