//! confval CLI - resolve and validate a single configuration value
//!
//! Usage:
//!   confval get deploy.yaml compute.replicas --type int --gt 0
//!   confval env PORT --type int --default 8080 --lte 65535
//!   confval env API_TOKEN --file /run/secrets/api_token --required
//!   confval prompt "Replicas" --type int --default-str 1

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use confval_core::{
    from_value, validate_missing, Primitive, PromptOptions, Rules, Sources, Value,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// confval - Typed configuration values with declarative rules
#[derive(Parser)]
#[command(name = "confval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a value from a YAML or JSON document
    Get {
        /// Document to read
        document: PathBuf,

        /// Path to the value (e.g., compute.replicas or ports[0])
        path: String,

        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Resolve a value from an environment variable
    Env {
        /// Environment variable name
        name: String,

        /// Read this file when the variable is unset or empty
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Resolve a value from the contents of a file
    File {
        /// File to read
        path: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Ask for a value interactively
    Prompt {
        /// Prompt text
        text: String,

        /// Shown in brackets and used when the answer is empty
        #[arg(long)]
        default_str: Option<String>,

        /// Show the default string as ********
        #[arg(long)]
        mask_default: bool,

        /// Do not echo the answer while it is typed
        #[arg(long)]
        hide_typing: bool,

        #[command(flatten)]
        rules: RuleArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ValueType {
    Int,
    Float,
    Bool,
    String,
    Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Rule flags shared by every command. Literals are parsed with the grammar
/// of the selected type.
#[derive(Args, Debug)]
struct RuleArgs {
    /// Value type
    #[arg(short, long = "type", value_enum, default_value = "string")]
    value_type: ValueType,

    /// Fail when the value is absent
    #[arg(long)]
    required: bool,

    /// Value used when absent
    #[arg(short, long)]
    default: Option<String>,

    /// Fail when the value resolves to null
    #[arg(long)]
    not_null: bool,

    /// Restrict to these values (repeatable)
    #[arg(long = "allowed", value_name = "VALUE")]
    allowed: Vec<String>,

    /// Exclusive lower bound
    #[arg(long)]
    gt: Option<String>,

    /// Inclusive lower bound
    #[arg(long)]
    gte: Option<String>,

    /// Exclusive upper bound
    #[arg(long)]
    lt: Option<String>,

    /// Inclusive upper bound
    #[arg(long)]
    lte: Option<String>,

    /// Output format: text, json
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Where the value comes from, independent of its type
enum Target {
    Document { document: Value, path: String },
    Env { name: String, file: Option<PathBuf> },
    File { path: PathBuf },
    Prompt { options: PromptOptions },
}

/// Run the CLI with the given arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let (target, rules) = match cli.command {
        Commands::Get {
            document,
            path,
            rules,
        } => match load_document(&document) {
            Ok(document) => (Target::Document { document, path }, rules),
            Err(e) => {
                eprintln!("{}", e.red());
                return ExitCode::from(2);
            }
        },

        Commands::Env { name, file, rules } => (Target::Env { name, file }, rules),

        Commands::File { path, rules } => (Target::File { path }, rules),

        Commands::Prompt {
            text,
            default_str,
            mask_default,
            hide_typing,
            rules,
        } => {
            let mut options = PromptOptions::new(text);
            options.default_str = default_str;
            options.mask_default = mask_default;
            options.hide_typing = hide_typing;
            (Target::Prompt { options }, rules)
        }
    };

    let sources = Sources::system();
    match rules.value_type {
        ValueType::Int => cmd_resolve::<i64>(&target, &sources, &rules),
        ValueType::Float => cmd_resolve::<f64>(&target, &sources, &rules),
        ValueType::Bool => cmd_resolve::<bool>(&target, &sources, &rules),
        ValueType::String => cmd_resolve::<String>(&target, &sources, &rules),
        ValueType::Duration => cmd_resolve::<Duration>(&target, &sources, &rules),
    }
}

fn load_document(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "json" {
        serde_json::from_str(&content).map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("Invalid YAML in {}: {}", path.display(), e))
    }
}

fn parse_literal<T: Primitive>(flag: &str, text: &str) -> Result<T, String> {
    T::parse_str(text)
        .ok_or_else(|| format!("Invalid {} value {:?} (expected {})", flag, text, T::TYPE_NAME))
}

fn parse_optional<T: Primitive>(flag: &str, text: &Option<String>) -> Result<Option<T>, String> {
    text.as_deref().map(|t| parse_literal(flag, t)).transpose()
}

/// Build a rule set from the flags
fn build_rules<T: Primitive>(args: &RuleArgs) -> Result<Rules<T>, String> {
    let allowed = args
        .allowed
        .iter()
        .map(|text| parse_literal("--allowed", text))
        .collect::<Result<Vec<T>, _>>()?;

    Ok(Rules {
        required: args.required,
        default: parse_optional("--default", &args.default)?,
        disallow_null: args.not_null,
        allowed_values: allowed,
        greater_than: parse_optional("--gt", &args.gt)?,
        greater_than_or_equal_to: parse_optional("--gte", &args.gte)?,
        less_than: parse_optional("--lt", &args.lt)?,
        less_than_or_equal_to: parse_optional("--lte", &args.lte)?,
        validator: None,
    })
}

fn resolve<T: Primitive>(
    target: &Target,
    sources: &Sources,
    rules: &Rules<T>,
) -> confval_core::Result<Option<T>> {
    match target {
        Target::Document { document, path } => {
            let result = match document.get_path(path) {
                Some(value) => from_value(value, rules),
                None => validate_missing(rules),
            };
            result.map_err(|e| e.with_key(path.as_str()))
        }
        Target::Env {
            name,
            file: Some(file),
        } => sources.env_or_file(name, file, rules),
        Target::Env { name, file: None } => sources.env(name, rules),
        Target::File { path } => sources.file(path, rules),
        Target::Prompt { options } => sources.prompt(options, rules),
    }
}

fn cmd_resolve<T: Primitive>(target: &Target, sources: &Sources, args: &RuleArgs) -> ExitCode {
    let rules = match build_rules::<T>(args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };
    let json = args.format == OutputFormat::Json;

    match resolve(target, sources, &rules) {
        Ok(value) => {
            let value = value.map(T::into_value).unwrap_or(Value::Null);
            if json {
                println!("{}", value.to_json());
            } else {
                // Text format - just print the value
                println!("{}", value);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if json {
                let json = serde_json::json!({
                    "valid": false,
                    "path": e.path(),
                    "error": e.to_string()
                });
                println!("{}", json);
            } else {
                eprintln!("{} {}", "✗".red(), e);
            }
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confval_core::{ErrorKind, MapEnvironment, ScriptedPrompter};
    use pretty_assertions::assert_eq;

    fn rule_args(args: &[&str]) -> RuleArgs {
        let mut argv = vec!["confval", "env", "NAME"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Env { rules, .. } => rules,
            _ => unreachable!(),
        }
    }

    fn parse_yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_build_rules_from_flags() {
        let args = rule_args(&[
            "--type", "int", "--default", "3", "--gt", "0", "--lte", "10", "--allowed", "1",
            "--allowed", "3",
        ]);
        assert_eq!(args.value_type, ValueType::Int);

        let rules = build_rules::<i64>(&args).unwrap();
        assert_eq!(rules.default, Some(3));
        assert_eq!(rules.greater_than, Some(0));
        assert_eq!(rules.less_than_or_equal_to, Some(10));
        assert_eq!(rules.allowed_values, vec![1, 3]);
        assert!(!rules.required);
    }

    #[test]
    fn test_build_rules_bad_literal() {
        let args = rule_args(&["--type", "int", "--gt", "zero"]);
        let err = build_rules::<i64>(&args).unwrap_err();
        assert_eq!(err, "Invalid --gt value \"zero\" (expected int)");
    }

    #[test]
    fn test_build_rules_duration_literals() {
        let args = rule_args(&["--type", "duration", "--default", "30s", "--lt", "1m"]);
        let rules = build_rules::<Duration>(&args).unwrap();
        assert_eq!(rules.default, Some(Duration::from_secs(30)));
        assert_eq!(rules.less_than, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_resolve_document_path() {
        let document = parse_yaml("compute:\n  replicas: 0\n  ports: [80, 443]\n");
        let sources = Sources::system();
        let rules = Rules::<i64>::new().greater_than(0);

        let target = Target::Document {
            document: document.clone(),
            path: "compute.ports[1]".into(),
        };
        assert_eq!(resolve(&target, &sources, &rules).unwrap(), Some(443));

        let target = Target::Document {
            document: document.clone(),
            path: "compute.replicas".into(),
        };
        let err = resolve(&target, &sources, &rules).unwrap_err();
        assert_eq!(err.to_string(), "compute.replicas: 0 must be greater than 0");

        let target = Target::Document {
            document,
            path: "compute.cpu".into(),
        };
        let err = resolve(&target, &sources, &Rules::<f64>::new().required()).unwrap_err();
        assert_eq!(err.to_string(), "compute.cpu: must be defined");
    }

    #[test]
    fn test_resolve_env_with_file_fallback() {
        let sources = Sources::system().with_environment(
            MapEnvironment::new()
                .with_var("REPLICAS", "")
                .with_file("/run/secrets/replicas", "4\n"),
        );
        let target = Target::Env {
            name: "REPLICAS".into(),
            file: Some(PathBuf::from("/run/secrets/replicas")),
        };
        assert_eq!(
            resolve(&target, &sources, &Rules::<i64>::new()).unwrap(),
            Some(4)
        );

        let target = Target::Env {
            name: "REPLICAS".into(),
            file: None,
        };
        let err = resolve(&target, &sources, &Rules::<i64>::new().required()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MustBeDefined);
    }

    #[test]
    fn test_resolve_prompt() {
        let sources = Sources::system().with_prompter(ScriptedPrompter::new([""]));
        let target = Target::Prompt {
            options: PromptOptions::new("Enabled").with_default_str("true"),
        };
        assert_eq!(
            resolve(&target, &sources, &Rules::<bool>::new()).unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_get_arguments() {
        let cli = Cli::try_parse_from([
            "confval", "get", "deploy.yaml", "compute.replicas", "--type", "int", "--required",
            "--format", "json",
        ])
        .unwrap();
        let Commands::Get {
            document,
            path,
            rules,
        } = cli.command
        else {
            unreachable!()
        };
        assert_eq!(document, PathBuf::from("deploy.yaml"));
        assert_eq!(path, "compute.replicas");
        assert!(rules.required);
        assert_eq!(rules.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(Cli::try_parse_from(["confval", "env", "PORT", "--type", "uint"]).is_err());
    }

    #[test]
    fn test_load_document_formats() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("deploy.json");
        std::fs::write(&json, r#"{"replicas": 2}"#).unwrap();
        let yaml = dir.path().join("deploy.yaml");
        std::fs::write(&yaml, "replicas: 3\n").unwrap();

        assert_eq!(
            load_document(&json).unwrap().get_path("replicas"),
            Some(&Value::Integer(2))
        );
        assert_eq!(
            load_document(&yaml).unwrap().get_path("replicas"),
            Some(&Value::Integer(3))
        );
        assert!(load_document(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let sources = Sources::system()
            .with_environment(MapEnvironment::new().with_var("REPLICAS", "0"));
        let target = Target::Env {
            name: "REPLICAS".into(),
            file: None,
        };

        let ok = rule_args(&["--type", "int", "--gte", "0"]);
        assert_eq!(cmd_resolve::<i64>(&target, &sources, &ok), ExitCode::SUCCESS);

        let failing = rule_args(&["--type", "int", "--gt", "0"]);
        assert_eq!(cmd_resolve::<i64>(&target, &sources, &failing), ExitCode::from(1));

        let bad_literal = rule_args(&["--type", "int", "--gt", "zero"]);
        assert_eq!(
            cmd_resolve::<i64>(&target, &sources, &bad_literal),
            ExitCode::from(2)
        );
    }

    #[test]
    fn test_prompt_arguments() {
        let cli = Cli::try_parse_from([
            "confval", "prompt", "Token", "--default-str", "abc", "--mask-default", "--hide-typing",
        ])
        .unwrap();
        let Commands::Prompt {
            text,
            default_str,
            mask_default,
            hide_typing,
            ..
        } = cli.command
        else {
            unreachable!()
        };
        assert_eq!(text, "Token");
        assert_eq!(default_str.as_deref(), Some("abc"));
        assert!(mask_default);
        assert!(hide_typing);
    }
}
