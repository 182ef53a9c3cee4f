use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Presentation settings. The verdict itself has nothing to configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Truncate raw header text in the text report; 0 disables truncation.
    #[serde(default)]
    pub max_header_width: usize,
    #[serde(default = "default_show_hop_headers")]
    pub show_hop_headers: bool,
}

fn default_show_hop_headers() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            output_format: OutputFormat::Text,
            max_header_width: 0,
            show_hop_headers: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
