//! Command execution against the registered scopes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use datahub::{DataHubError, EventToken, FieldPath, Scope, registry};

use crate::command::{Command, HELP, Target};

/// Whether the console keeps reading after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One operator session: active watches and pending change reports.
pub struct Session {
    echo: bool,
    watches: HashMap<String, EventToken>,
    notices: Rc<RefCell<Vec<String>>>,
}

impl Session {
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            watches: HashMap::new(),
            notices: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Parses and runs one input line, writing replies and change reports
    /// to `out`. Command failures are reported to `out`, not returned.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let outcome = match Command::parse(line) {
            Ok(None) => Ok(Flow::Continue),
            Ok(Some(command)) => self.execute(command, out),
            Err(err) => Err(err.into()),
        };

        let flow = match outcome {
            Ok(flow) => flow,
            Err(err) => {
                tracing::debug!(line, error = %err, "command failed");
                writeln!(out, "error: {err:#}")?;
                Flow::Continue
            }
        };
        self.flush_notices(out)?;
        Ok(flow)
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Scopes => {
                for name in registry::names() {
                    writeln!(out, "{name}")?;
                }
            }
            Command::Get(target) => {
                let text = resolve(&target)?.with_value(field_path(&target)?, |v| v.text())?;
                writeln!(out, "{target} = {text}")?;
            }
            Command::Set(target, text) => {
                let stored = resolve(&target)?.with_value(field_path(&target)?, |v| {
                    v.assign_text(&text);
                    v.text()
                })?;
                tracing::info!(field = %target, value = %stored, "value set");
                writeln!(out, "{target} = {stored}")?;
            }
            Command::Add(target) => {
                let token = resolve(&target)?.with_collection(field_path(&target)?, |c| c.add(|_| {}))?;
                writeln!(out, "added {target}[{}]", token.get())?;
            }
            Command::Remove(target, token) => {
                resolve(&target)?.with_collection(field_path(&target)?, |c| c.remove(token))??;
                writeln!(out, "removed {target}[{}]", token.get())?;
            }
            Command::List(target) => self.list(&target, out)?,
            Command::Watch(target) => self.watch(&target, out)?,
            Command::Unwatch(target) => {
                let key = target.to_string();
                let token = self
                    .watches
                    .remove(&key)
                    .ok_or_else(|| anyhow!("{key} is not watched"))?;
                resolve(&target)?.with_value(field_path(&target)?, |v| {
                    v.on_value_changed.unsubscribe(token)
                })?;
                writeln!(out, "stopped watching {key}")?;
            }
            Command::Dump(scope) => {
                let names = match scope {
                    Some(name) => vec![name],
                    None => registry::names(),
                };
                for name in names {
                    let scope = registry::get(&name)?;
                    let json = serde_json::to_string_pretty(&scope.snapshot())
                        .with_context(|| format!("while dumping scope '{name}'"))?;
                    writeln!(out, "{name} {json}")?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn list(&self, target: &Target, out: &mut impl Write) -> Result<()> {
        let scope = resolve(target)?;
        let Some(path) = &target.path else {
            for name in scope.field_names() {
                writeln!(out, "{name}")?;
            }
            return Ok(());
        };

        match scope.with_collection(path, |c| c.tokens()) {
            Ok(tokens) => {
                for token in tokens {
                    writeln!(out, "{target}[{}]", token.get())?;
                }
            }
            Err(DataHubError::WrongFieldType { .. }) => {
                let names = scope.with_record(path, |record| {
                    record.field_names().map(str::to_owned).collect::<Vec<_>>()
                })?;
                for name in names {
                    writeln!(out, "{name}")?;
                }
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn watch(&mut self, target: &Target, out: &mut impl Write) -> Result<()> {
        let key = target.to_string();
        if self.watches.contains_key(&key) {
            writeln!(out, "already watching {key}")?;
            return Ok(());
        }

        let notices = Rc::clone(&self.notices);
        let echo = self.echo;
        let label = key.clone();
        let token = resolve(target)?.with_value(field_path(target)?, move |v| {
            v.on_value_changed.subscribe(move |content| {
                let text = content.to_text();
                tracing::info!(field = %label, value = %text, "watched field changed");
                if echo {
                    notices.borrow_mut().push(format!("{label} -> {text}"));
                }
            })
        })?;

        self.watches.insert(key.clone(), token);
        writeln!(out, "watching {key}")?;
        Ok(())
    }

    fn flush_notices(&self, out: &mut impl Write) -> Result<()> {
        let notices = std::mem::take(&mut *self.notices.borrow_mut());
        for notice in notices {
            writeln!(out, "  {notice}")?;
        }
        Ok(())
    }
}

fn resolve(target: &Target) -> Result<Rc<Scope>> {
    Ok(registry::get(&target.scope)?)
}

fn field_path(target: &Target) -> Result<&FieldPath> {
    target
        .path
        .as_ref()
        .ok_or_else(|| anyhow!("`{target}` names a scope; add a field path"))
}
