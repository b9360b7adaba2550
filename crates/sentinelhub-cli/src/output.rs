//! Terminal and JSON rendering of command results
//!
//! Status lines use the same message levels as the plugin's message bar. In JSON mode every
//! line is one object with a `status` field, and results carry their payload under `data`.

use console::{style, StyledObject};
use sentinelhub_core::MessageType;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

fn status(kind: MessageType) -> &'static str {
    match kind {
        MessageType::Info => "info",
        MessageType::Warning => "warning",
        MessageType::Critical => "error",
        MessageType::Success => "success",
    }
}

fn symbol(kind: MessageType) -> StyledObject<&'static str> {
    match kind {
        MessageType::Info => style("ℹ").blue().bold(),
        MessageType::Warning => style("⚠").yellow().bold(),
        MessageType::Critical => style("✗").red().bold(),
        MessageType::Success => style("✓").green().bold(),
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// One status line. Warnings and errors go to stderr.
    pub fn message(&self, kind: MessageType, message: impl Display) {
        let line = if self.json {
            render(&json!({ "status": status(kind), "message": message.to_string() }))
        } else {
            format!("{} {}", symbol(kind), message)
        };

        match kind {
            MessageType::Warning | MessageType::Critical => eprintln!("{}", line),
            MessageType::Info | MessageType::Success => println!("{}", line),
        }
    }

    pub fn success(&self, message: impl Display) {
        self.message(MessageType::Success, message);
    }

    pub fn info(&self, message: impl Display) {
        self.message(MessageType::Info, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.message(MessageType::Warning, message);
    }

    /// Serializable result; pretty JSON in both modes, wrapped under `data` in JSON mode
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let data = serde_json::to_value(data)?;
        if self.json {
            println!("{}", render(&json!({ "status": status(MessageType::Success), "data": data })));
        } else {
            println!("{}", render(&data));
        }
        Ok(())
    }

    /// Rows as a rounded table, or as the `data` array in JSON mode
    pub fn table<T: Tabled + Serialize>(&self, rows: Vec<T>) -> anyhow::Result<()> {
        if self.json {
            return self.result(rows);
        }

        if rows.is_empty() {
            println!("{}", style("(no data)").dim());
        } else {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        Ok(())
    }

    /// A bare value, e.g. a URL meant to be piped into another tool
    pub fn value(&self, key: &str, value: impl Display) {
        if self.json {
            let data = json!({ key.to_string(): value.to_string() });
            println!("{}", render(&json!({ "status": status(MessageType::Success), "data": data })));
        } else {
            println!("{}", value);
        }
    }

    /// Labelled line of human output; JSON callers use [`OutputWriter::result`]
    pub fn kv(&self, key: impl Display, value: impl Display) {
        if self.json {
            println!("{}", render(&json!({ key.to_string(): value.to_string() })));
        } else {
            println!("{}: {}", style(key).bold(), value);
        }
    }
}
