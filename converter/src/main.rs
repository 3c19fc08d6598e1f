#[macro_use]
extern crate log;

use std::{env, fs, path::Path};

use custom_error::custom_error;
use env_logger::Env;

use gifenc_core::{
    models::ImageWriterOptions,
    plugins::{ImageFormatSupportPlugin, PluginRegistry},
    utils::print_intro,
};
use gif_support::{GIFFormatSupportPlugin, writer::OPTION_COMMENT};
use ppm_support::PPMFormatSupportPlugin;

const DEFAULT_LOGGING_LEVEL: &str = "info";
const USAGE: &str = "converter --source=image.ppm --output=image.gif [--comment=text]";

custom_error! {pub ConverterError
    MissingArgument {name: String} = "missing argument --{name}=...",
    UnknownFormat {path: String} = "no plugin can handle {path}",
    NoImages {path: String} = "{path} does not contain any images",
    IO {source: std::io::Error} = "io error: {source}",
    Conversion {source: gifenc_core::models::ImageIOError} = "conversion failed: {source}",
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();
    print_intro();

    let args: Vec<String> = env::args().collect();
    debug!("args are: {:?}", args);

    if let Err(err) = run(&args) {
        error!("{}", err);
        if let ConverterError::MissingArgument { .. } = err {
            info!("usage: {}", USAGE);
        }
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), ConverterError> {
    let source = required_argument(args, "source")?;
    let output = required_argument(args, "output")?;

    let mut options = ImageWriterOptions::default();
    if let Some(comment) = argument_value(args, "comment") {
        options = options.with_option(OPTION_COMMENT, &comment);
    }

    let registry = default_registry();
    debug!("supported formats: {:?}", registry.format_names());

    let source_plugin = plugin_for_path(&registry, &source)?;
    let target_plugin = plugin_for_path(&registry, &output)?;

    info!("converting {} to {}", source, output);

    let data = fs::read(&source)?;
    let converted = convert(source_plugin, target_plugin, &source, &data, &options)?;

    fs::write(&output, &converted)?;
    info!("result saved to {} ({} bytes)", output, converted.len());

    Ok(())
}

fn convert(
    source_plugin: &dyn ImageFormatSupportPlugin,
    target_plugin: &dyn ImageFormatSupportPlugin,
    source: &str,
    data: &[u8],
    options: &ImageWriterOptions,
) -> Result<Vec<u8>, ConverterError> {
    let images = source_plugin.reader().read(data)?;
    info!("done reading {} image{}", images.len(), if images.len() == 1 { "" } else { "s" });

    let image = images.first().ok_or_else(|| ConverterError::NoImages {
        path: source.to_string(),
    })?;
    if images.len() > 1 {
        warn!("only the first image is converted");
    }

    Ok(target_plugin.writer().write(image, options)?)
}

fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Box::new(GIFFormatSupportPlugin::new()));
    registry.register(Box::new(PPMFormatSupportPlugin::new()));
    registry
}

fn plugin_for_path<'a>(registry: &'a PluginRegistry, path: &str) -> Result<&'a dyn ImageFormatSupportPlugin, ConverterError> {
    Path::new(path).extension()
        .and_then(|v| registry.resolve(&v.to_string_lossy()))
        .ok_or_else(|| ConverterError::UnknownFormat {
            path: path.to_string(),
        })
}

fn required_argument(args: &[String], argument_name: &str) -> Result<String, ConverterError> {
    argument_value(args, argument_name).ok_or_else(|| ConverterError::MissingArgument {
        name: argument_name.to_string(),
    })
}

fn argument_value(args: &[String], argument_name: &str) -> Option<String> {
    let prefix = format!("--{}=", argument_name);

    args.iter()
        .find(|s| s.starts_with(&prefix))
        .map(|s| s[prefix.len()..].to_string())
}
