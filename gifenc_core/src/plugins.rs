use crate::models::io::{ImageReader, ImageWriter};

pub trait ImageFormatSupportPlugin {

    fn format_name(&self) -> String;

    fn reader(&self) -> Box<dyn ImageReader>;
    fn writer(&self) -> Box<dyn ImageWriter>;
}

/// Format plugins known to the host, looked up by format name or file extension.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn ImageFormatSupportPlugin>>,
}

impl PluginRegistry {

    pub fn new() -> Self {
        PluginRegistry {
            plugins: Vec::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn ImageFormatSupportPlugin>) {
        info!("registered plugin: support for {}", plugin.format_name());
        self.plugins.push(plugin);
    }

    pub fn resolve(&self, format_name: &str) -> Option<&dyn ImageFormatSupportPlugin> {
        self.plugins.iter()
            .find(|v| v.format_name().eq_ignore_ascii_case(format_name))
            .map(|v| v.as_ref())
    }

    pub fn format_names(&self) -> Vec<String> {
        self.plugins.iter().map(|v| v.format_name()).collect()
    }
}

impl Default for PluginRegistry {

    fn default() -> Self {
        Self::new()
    }
}
