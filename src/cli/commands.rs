use anyhow::Context;
use clap::{Parser, Subcommand};

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::conditions::{
    decode_url_params, encode_url_params, EvalContext, Evaluator, RuleSet, ShowFor, UrlParam,
    SHOWFOR,
};
use crate::config::{self, Config, ElementSettings, EnabledState};
use crate::content::{self, FsContentStore};
use crate::device::{self, CATALOG};
use crate::shortcode;

use super::completions::{self, CompletionShell};
use super::context::ContextArgs;
use super::error::CliError;
use super::exit_codes;
use super::output::{
    self, CheckData, DeviceData, ListResponse, OccurrenceData, OutputMode, ParamData,
    PayloadData, RenderData, ScanData, StripData,
};

#[derive(Parser)]
#[command(name = "showfor")]
#[command(about = "Evaluate show-for visibility rules and strip hidden shortcodes")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides SHOWFOR_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flags(self.json, self.no_json, self.quiet)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decide whether one element is hidden for a request
    Check {
        /// Attribute string, e.g. 'showfor="logged_in"'
        #[arg(long, conflicts_with = "shortcode", required_unless_present = "shortcode")]
        attrs: Option<String>,

        /// Shortcode whose attributes are checked, e.g. '[vc_row showfor="logged_in"]'
        #[arg(long)]
        shortcode: Option<String>,

        /// Exit with code 5 when the element is hidden
        #[arg(long)]
        exit_code: bool,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// List occurrences of an element in raw content with their decisions
    Scan {
        /// Element (shortcode tag) name
        tag: String,

        /// Content file ("-" reads stdin)
        #[arg(default_value = "-")]
        file: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Remove hidden occurrences of advanced elements from raw content
    ///
    /// Prints the stripped content unless --in-place is given
    Strip {
        /// Content file ("-" reads stdin)
        #[arg(default_value = "-")]
        file: String,

        /// Strip this element instead of the configured advanced elements (repeatable)
        #[arg(long = "element")]
        elements: Vec<String>,

        /// Rewrite the file instead of printing the result
        #[arg(short, long)]
        in_place: bool,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Filter the rendered output of one element
    ///
    /// Prints the output unchanged, or nothing when the rules hide it
    Render {
        /// Element (shortcode tag) name
        element: String,

        /// Attribute string of the rendered occurrence
        #[arg(long, default_value = "")]
        attrs: String,

        /// Rendered output file ("-" reads stdin)
        #[arg(default_value = "-")]
        file: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Encode name=value pairs into a url_params payload
    EncodeParams {
        /// Expected query parameters as name=value
        pairs: Vec<String>,
    },

    /// Decode a url_params payload
    DecodeParams {
        /// Payload as stored in the url_params attribute
        payload: String,
    },

    /// List the device groups selected_devices rules accept
    Devices {
        /// Case-insensitive title filter
        search: Option<String>,
    },

    /// Manage element settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Enable rule checks for the given elements (advanced mode off)
    Init {
        /// Element name (repeatable)
        #[arg(long = "element", required = true)]
        elements: Vec<String>,

        /// Replace existing element settings
        #[arg(long)]
        force: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "settings.advanced.vc_row")
        key: String,
        /// Value to set
        value: String,
    },
    /// Verify configuration file for errors
    Verify,
}

/// read a content file, "-" meaning stdin
fn read_input(file: &str) -> Result<String, CliError> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::content(format!("failed to read stdin: {}", e)))?;
        return Ok(buf);
    }

    fs::read_to_string(file).map_err(|e| CliError::content(format!("failed to read {}: {}", file, e)))
}

fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    config::load_with_override(path).map_err(CliError::config)
}

/// evaluator with config predicates and `--predicate` flags
fn build_evaluator(config: &Config, args: &ContextArgs) -> Result<Evaluator, CliError> {
    let predicates = args
        .predicates(config::predicate_registry(config))
        .map_err(|e| CliError::invalid_args(e.to_string()))?;
    Ok(Evaluator::new().with_predicates(predicates))
}

fn build_context(args: &ContextArgs) -> Result<EvalContext, CliError> {
    args.build().map_err(|e| CliError::invalid_args(e.to_string()))
}

/// closest known kind for an unknown `showfor` value
fn suggestion_for(attrs: &RuleSet) -> Option<String> {
    if attrs.kind().is_some() {
        return None;
    }
    ShowFor::suggest(attrs.get(SHOWFOR).unwrap_or_default()).map(|kind| kind.as_str().to_string())
}

fn warn_unknown_kind(attrs: &RuleSet, mode: OutputMode) {
    if attrs.kind().is_some() || mode.is_json() || mode.is_quiet() {
        return;
    }
    let value = attrs.get(SHOWFOR).unwrap_or_default();
    match suggestion_for(attrs) {
        Some(s) => eprintln!("warning: unknown showfor '{}', did you mean '{}'?", value, s),
        None => eprintln!("warning: unknown showfor '{}'", value),
    }
}

/// settings whose advanced elements are the `--element` flags, or the configured ones
fn strip_settings(config: &Config, elements: &[String]) -> Result<ElementSettings, CliError> {
    if elements.is_empty() {
        return Ok(config.settings.clone());
    }

    let mut settings = ElementSettings::default();
    for element in elements {
        config::validate_element_name(element).map_err(CliError::invalid_args)?;
        settings.set_advanced(element.clone(), true);
    }
    Ok(settings)
}

pub fn execute(cli: Cli) -> Result<i32, CliError> {
    let config_path = cli.config.as_deref();
    let output_mode = cli.output_mode();

    match cli.command {
        Commands::Check {
            attrs,
            shortcode,
            exit_code,
            context,
        } => {
            let (element, attrs) = match (attrs, shortcode) {
                (Some(raw), _) => (None, shortcode::parse_attributes(&raw)),
                (None, Some(text)) => {
                    let tag = shortcode::first_tag_name(&text)
                        .ok_or_else(|| CliError::invalid_args("no shortcode found in --shortcode"))?;
                    let occurrences = shortcode::find_all(tag, &text);
                    if occurrences.is_empty() {
                        return Err(CliError::invalid_args(format!(
                            "unterminated shortcode [{}",
                            tag
                        )));
                    }
                    let occurrence = occurrences
                        .into_iter()
                        .find(|occ| !occ.is_escaped())
                        .ok_or_else(|| {
                            CliError::invalid_args(format!(
                                "shortcode [{}] is escaped and never evaluated",
                                tag
                            ))
                        })?;
                    (Some(tag.to_string()), shortcode::attributes_of(&occurrence))
                }
                (None, None) => {
                    return Err(CliError::invalid_args("either --attrs or --shortcode is required"))
                }
            };

            let config = load_config(config_path)?;
            let evaluator = build_evaluator(&config, &context)?;
            let ctx = build_context(&context)?;

            warn_unknown_kind(&attrs, output_mode);
            let filtered = evaluator.is_filtered(&attrs, &ctx);

            match output_mode {
                OutputMode::Json => output::print_json(&CheckData {
                    element,
                    showfor: attrs.get(SHOWFOR).unwrap_or_default().to_string(),
                    known: attrs.kind().is_some(),
                    filtered,
                    suggestion: suggestion_for(&attrs),
                }),
                OutputMode::Text => println!("{}", if filtered { "hidden" } else { "visible" }),
                OutputMode::Quiet => {}
            }

            if filtered && exit_code {
                Ok(exit_codes::FILTERED)
            } else {
                Ok(exit_codes::SUCCESS)
            }
        }

        Commands::Scan { tag, file, context } => {
            config::validate_element_name(&tag).map_err(CliError::invalid_args)?;
            let text = read_input(&file)?;
            let config = load_config(config_path)?;
            let evaluator = build_evaluator(&config, &context)?;
            let ctx = build_context(&context)?;

            let occurrences: Vec<OccurrenceData> = shortcode::find_all(&tag, &text)
                .iter()
                .map(|occurrence| {
                    let attributes = shortcode::attributes_of(occurrence);
                    let escaped = occurrence.is_escaped();
                    OccurrenceData {
                        start: occurrence.span.start,
                        end: occurrence.span.end,
                        escaped,
                        self_closing: occurrence.self_closing,
                        filtered: (!escaped).then(|| evaluator.is_filtered(&attributes, &ctx)),
                        suggestion: suggestion_for(&attributes),
                        attributes,
                    }
                })
                .collect();

            match output_mode {
                OutputMode::Json => output::print_json(&ScanData { tag, occurrences }),
                OutputMode::Text => {
                    println!("[{}] {} occurrence(s)", tag, occurrences.len());
                    for occ in &occurrences {
                        let decision = match occ.filtered {
                            None => "escaped",
                            Some(true) => "hidden",
                            Some(false) => "visible",
                        };
                        println!("  {}..{}  {:<8} {}", occ.start, occ.end, decision, occ.attributes);
                        if let Some(s) = &occ.suggestion {
                            println!("    unknown showfor, did you mean '{}'?", s);
                        }
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Strip {
            file,
            elements,
            in_place,
            context,
        } => {
            if in_place && file == "-" {
                return Err(CliError::invalid_args("--in-place needs a file, not stdin"));
            }

            let config = load_config(config_path)?;
            let settings = strip_settings(&config, &elements)?;
            let evaluator = build_evaluator(&config, &context)?;
            let ctx = build_context(&context)?;

            let stripped: Vec<String> = settings.advanced_elements().map(String::from).collect();
            if stripped.is_empty() && !output_mode.is_quiet() {
                eprintln!("warning: no advanced elements configured, nothing to strip");
            }

            if !in_place {
                let text = read_input(&file)?;
                print!("{}", content::strip_advanced_elements(&text, &settings, &evaluator, &ctx));
                return Ok(exit_codes::SUCCESS);
            }

            let path = Path::new(&file);
            let post = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| CliError::invalid_args(format!("not a file: {}", file)))?;
            let root = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            let mut store = FsContentStore::new(root);
            let changed = content::strip_post(&mut store, post, &settings, &evaluator, &ctx)?;

            match output_mode {
                OutputMode::Json => output::print_json(&StripData {
                    path: file,
                    elements: stripped,
                    changed,
                }),
                OutputMode::Text if changed => println!("Stripped {}", file),
                OutputMode::Text => println!("{}: nothing hidden", file),
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Render {
            element,
            attrs,
            file,
            context,
        } => {
            let rendered = read_input(&file)?;
            let config = load_config(config_path)?;
            let evaluator = build_evaluator(&config, &context)?;
            let ctx = build_context(&context)?;

            let attrs = shortcode::parse_attributes(&attrs);
            let checked = config.settings.enabled_state(&element) == EnabledState::Enabled;
            let filtered = checked && evaluator.is_filtered(&attrs, &ctx);
            let result = if filtered { "" } else { rendered.as_str() };

            if output_mode.is_json() {
                output::print_json(&RenderData {
                    checked,
                    filtered,
                    output: result.to_string(),
                    element,
                });
            } else {
                print!("{}", result);
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::EncodeParams { pairs } => {
            let params: Vec<UrlParam> = pairs.iter().map(|p| UrlParam::parse_pair(p)).collect();
            let payload = encode_url_params(&params);

            match output_mode {
                OutputMode::Json => output::print_json(&PayloadData { payload }),
                OutputMode::Text => println!("{}", payload),
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::DecodeParams { payload } => {
            let params = decode_url_params(&payload);

            match output_mode {
                OutputMode::Json => {
                    let items: Vec<ParamData> = params
                        .into_iter()
                        .map(|p| ParamData {
                            name: p.name,
                            value: p.value,
                        })
                        .collect();
                    output::print_json(&ListResponse { items });
                }
                OutputMode::Text => {
                    for p in &params {
                        println!(
                            "{}={}",
                            p.name.as_deref().unwrap_or_default(),
                            p.value.as_deref().unwrap_or_default()
                        );
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Devices { search } => {
            let kinds = match &search {
                Some(term) => device::search(term),
                None => CATALOG.to_vec(),
            };

            match output_mode {
                OutputMode::Json => {
                    let items: Vec<DeviceData> = kinds
                        .iter()
                        .map(|k| DeviceData {
                            id: k.id(),
                            title: k.title(),
                        })
                        .collect();
                    output::print_json(&ListResponse { items });
                }
                OutputMode::Text => {
                    for k in &kinds {
                        println!("  {:<10} {}", k.id(), k.title());
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(config_path)?;
                let json =
                    serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("{}", json);
                Ok(exit_codes::SUCCESS)
            }
            ConfigCommands::Path => {
                let path = config::get_config_path_with_override(config_path)?;
                println!("{}", path.display());
                Ok(exit_codes::SUCCESS)
            }
            ConfigCommands::Init { elements, force } => {
                for element in &elements {
                    config::validate_element_name(element).map_err(CliError::invalid_args)?;
                }

                let mut config = load_config(config_path)?;
                if !config.settings.is_empty() && !force {
                    return Err(CliError::new(
                        exit_codes::CONFIG_ERROR,
                        "element settings already exist, use --force to replace them",
                    ));
                }

                let count = elements.len();
                config.settings = ElementSettings::initialize(elements);
                let path = config::save_with_override(&config, config_path)
                    .map_err(CliError::config)?;
                if !output_mode.is_quiet() {
                    println!("Initialized {} element(s) in {}", count, path.display());
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigCommands::Set { key, value } => {
                let mut config = load_config(config_path)?;
                config::set_value(&mut config, &key, &value)
                    .map_err(|e| CliError::invalid_args(e.to_string()))?;
                config::save_with_override(&config, config_path).map_err(CliError::config)?;
                if !output_mode.is_quiet() {
                    println!("Set {} = {}", key, value);
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigCommands::Verify => {
                let path = config::get_config_path_with_override(config_path)?;
                let errors = config::verify(&path).map_err(CliError::config)?;

                if errors.is_empty() {
                    println!("✓ Configuration is valid: {}", path.display());
                    Ok(exit_codes::SUCCESS)
                } else {
                    println!(
                        "✗ Configuration has {} error(s): {}",
                        errors.len(),
                        path.display()
                    );
                    println!();
                    for error in &errors {
                        println!("  - {}", error);
                    }
                    Err(CliError::new(
                        exit_codes::CONFIG_ERROR,
                        "configuration validation failed",
                    ))
                }
            }
        },

        Commands::Completions { shell } => {
            completions::write_completion(shell, &mut io::stdout().lock())
                .context("Failed to write completion script")?;
            Ok(exit_codes::SUCCESS)
        }
    }
}
