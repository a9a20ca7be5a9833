/// A published mod-pack release newer than (different from) the installed one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    /// Split-archive parts in published order.
    pub chunks: Vec<String>,
    pub checksum: String,
    pub changelog: Option<String>,
}

impl ReleaseInfo {
    /// Download URL of one chunk: `<base>/v<version>/<chunk>`.
    pub fn asset_url(&self, base_url: &str, chunk: &str) -> String {
        format!(
            "{}/v{}/{}",
            base_url.trim_end_matches('/'),
            self.version.trim_start_matches('v'),
            chunk
        )
    }
}

/// A single add-on mod published next to the mod pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModInfo {
    pub name: String,
    pub version: String,
}

impl ModInfo {
    /// `<base>/mods/<name>/v<version>`
    pub fn download_url(&self, base_url: &str) -> String {
        format!(
            "{}/mods/{}/v{}",
            base_url.trim_end_matches('/'),
            self.name,
            self.version.trim_start_matches('v')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(version: &str) -> ReleaseInfo {
        ReleaseInfo {
            version: version.into(),
            chunks: vec!["pack.7z.001".into()],
            checksum: String::new(),
            changelog: None,
        }
    }

    #[test]
    fn builds_asset_urls() {
        assert_eq!(
            release("2.0.0").asset_url("https://host/releases/download/", "pack.7z.001"),
            "https://host/releases/download/v2.0.0/pack.7z.001"
        );
        assert_eq!(
            release("v2.0.0").asset_url("https://host", "pack.7z.002"),
            "https://host/v2.0.0/pack.7z.002"
        );
    }

    #[test]
    fn builds_mod_urls() {
        let info = ModInfo {
            name: "ExtraZombies".into(),
            version: "v1.2.0".into(),
        };
        assert_eq!(
            info.download_url("https://host/releases/download/"),
            "https://host/releases/download/mods/ExtraZombies/v1.2.0"
        );
    }
}
