//! Command construction for rclone invocations.

use serde_json::Value;

use crate::error::{Result, RcloneError};

/// Transfer operation verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Make the target identical to the source, deleting extraneous files.
    Sync,
    /// Copy files from source to target, never deleting.
    Copy,
    /// Move files from source to target.
    Move,
}

impl Operation {
    /// The rclone subcommand name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Sync => "sync",
            Operation::Copy => "copy",
            Operation::Move => "move",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric option with fixed inclusive bounds and a render template.
#[derive(Debug)]
pub(crate) struct OptionSpec {
    pub(crate) key: &'static str,
    prefix: &'static str,
    suffix: &'static str,
    min: i64,
    max: i64,
}

impl OptionSpec {
    /// Check the value against the bounds, naming the violated bound.
    ///
    /// This is the single validation path for numeric options: the fluent
    /// setters and the builder both go through it, so they reject
    /// identically.
    pub(crate) fn validate(&self, value: &Value) -> Result<i64> {
        let parsed = value
            .as_i64()
            .ok_or_else(|| RcloneError::invalid_option(self.key, value, "integer"))?;

        if parsed < self.min {
            return Err(RcloneError::invalid_option(
                self.key,
                parsed,
                format!("integer >= {}", self.min),
            ));
        }
        if parsed > self.max {
            return Err(RcloneError::invalid_option(
                self.key,
                parsed,
                format!("integer <= {}", self.max),
            ));
        }

        Ok(parsed)
    }

    fn render(&self, value: i64) -> String {
        format!("{}{}{}", self.prefix, value, self.suffix)
    }
}

pub(crate) const TRANSFERS: OptionSpec = OptionSpec {
    key: "transfers",
    prefix: "--transfers=",
    suffix: "",
    min: 1,
    max: 100,
};

pub(crate) const CHECKERS: OptionSpec = OptionSpec {
    key: "checkers",
    prefix: "--checkers=",
    suffix: "",
    min: 1,
    max: 100,
};

pub(crate) const RETRIES: OptionSpec = OptionSpec {
    key: "retries",
    prefix: "--retries=",
    suffix: "",
    min: 0,
    max: 10,
};

pub(crate) const STAT_INTERVAL: OptionSpec = OptionSpec {
    key: "stat_interval",
    prefix: "--stats=",
    suffix: "s",
    min: 1,
    max: 3600,
};

const NUMERIC_OPTIONS: [&OptionSpec; 4] = [&TRANSFERS, &CHECKERS, &RETRIES, &STAT_INTERVAL];

fn spec_for(key: &str) -> Option<&'static OptionSpec> {
    NUMERIC_OPTIONS.into_iter().find(|spec| spec.key == key)
}

/// Builds the ordered argument vector for one rclone invocation.
///
/// Arguments accumulate in three phases: base options, dynamic options,
/// then source and target. [`build`](CommandBuilder::build) renders custom
/// pass-through options between the dynamic options and the paths, so the
/// resulting vector is reproducible for a given insertion order.
#[derive(Debug)]
pub struct CommandBuilder {
    command: Vec<String>,
    custom: Vec<(String, Value)>,
    source: Option<String>,
    target: Option<String>,
}

impl CommandBuilder {
    /// Create a builder for `<binary> <operation> ...`.
    pub fn new(binary: impl Into<String>, operation: Operation) -> Self {
        Self {
            command: vec![binary.into(), operation.as_str().to_string()],
            custom: Vec::new(),
            source: None,
            target: None,
        }
    }

    /// Append the base options in the order supplied.
    pub fn base_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(options.into_iter().map(Into::into));
        self
    }

    /// Add a dynamic option.
    ///
    /// `progress` renders `--progress` when truthy and nothing otherwise.
    /// The known numeric options are bounds-checked and rendered through
    /// their templates. Anything else is kept as a custom pass-through
    /// flag: `true` renders `--key`, `false` renders nothing, strings and
    /// numbers render `--key=value`, and other value kinds are silently
    /// dropped so callers can forward tool-specific flags without this
    /// crate modeling them.
    pub fn add_option(mut self, key: &str, value: &Value) -> Result<Self> {
        if key == "progress" {
            let enabled = value.as_bool().unwrap_or(false)
                || value.as_i64().is_some_and(|v| v != 0);
            return Ok(self.add_progress(enabled));
        }

        if let Some(spec) = spec_for(key) {
            let parsed = spec.validate(value)?;
            self.command.push(spec.render(parsed));
            return Ok(self);
        }

        match self.custom.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.clone(),
            None => self.custom.push((key.to_string(), value.clone())),
        }
        Ok(self)
    }

    /// Append `--progress` when enabled.
    pub fn add_progress(mut self, enabled: bool) -> Self {
        if enabled {
            self.command.push("--progress".to_string());
        }
        self
    }

    /// Set the resolved source and target remote paths.
    pub fn source_target(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.target = Some(target.into());
        self
    }

    /// Render the final argument vector.
    pub fn build(self) -> Vec<String> {
        let mut command = self.command;

        for (key, value) in &self.custom {
            match value {
                Value::Bool(true) => command.push(format!("--{}", key)),
                Value::Bool(false) => {}
                Value::String(s) => command.push(format!("--{}={}", key, s)),
                Value::Number(n) => command.push(format!("--{}={}", key, n)),
                _ => {}
            }
        }

        command.extend(self.source);
        command.extend(self.target);
        command
    }
}
