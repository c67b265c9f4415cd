use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

use crate::prefixes::PREFIX_URI_TEMPLATE;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Vocabulary cache directory; empty means discover one
    pub cache_dir: String,
    /// Prefix lookup document, `{pfx}` is replaced by the prefix
    pub prefix_lookup_template: String,
    /// Zero disables the timeout
    pub fetch_timeout_secs: u64,
    pub diagnostics: bool,
    pub keyword_completions: bool,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/rdflangserver/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.rdflangserver",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("cache_dir", "")?
            .set_default("prefix_lookup_template", PREFIX_URI_TEMPLATE)?
            .set_default("fetch_timeout_secs", 30)?
            .set_default("diagnostics", true)?
            .set_default("keyword_completions", true)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_dir: "".to_string(),
            prefix_lookup_template: PREFIX_URI_TEMPLATE.to_string(),
            fetch_timeout_secs: 30,
            diagnostics: true,
            keyword_completions: true,
        }
    }
}
