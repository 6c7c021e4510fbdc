use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::{
    CompositeContext, CopyMap, DisplayContext, FormData, InitContext, Message, NodeKey, Phase,
    ProcessContext, Stateful, TreeError, Widget,
};

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &Option<Log>, entry: String) {
    if let Some(log) = log {
        log.lock().unwrap().push(entry);
    }
}

/// A container that writes `<div>` around its children.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    pub name: String,
    pub log: Option<Log>,
    pub added: usize,
    pub skip_process: bool,
}

impl Panel {
    pub fn named(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            log: Some(log.clone()),
            ..Default::default()
        }
    }
}

impl Widget for Panel {
    fn kind(&self) -> &'static str {
        "panel"
    }

    fn descendant_added(&mut self, _key: NodeKey, _added: &dyn Widget) {
        self.added += 1;
    }

    fn init(&mut self, _ctx: &mut InitContext<'_>) -> Result<(), TreeError> {
        record(&self.log, format!("init {}", self.name));
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        record(&self.log, format!("process {}", self.name));
        Ok(())
    }

    fn descend(&self, phase: Phase) -> bool {
        !(self.skip_process && phase == Phase::Process)
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        ctx.write_str("<div>")?;
        ctx.display_children()?;
        ctx.write_str("</div>")
    }
}

/// A leaf that writes its text and accepts no children.
#[derive(Debug, Clone, Default)]
pub struct Label {
    pub text: String,
    pub log: Option<Log>,
}

impl Label {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            log: None,
        }
    }

    pub fn logged(text: &str, log: &Log) -> Self {
        Self {
            text: text.to_string(),
            log: Some(log.clone()),
        }
    }
}

impl Widget for Label {
    fn kind(&self) -> &'static str {
        "label"
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn init(&mut self, _ctx: &mut InitContext<'_>) -> Result<(), TreeError> {
        record(&self.log, format!("init {}", self.text));
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        record(&self.log, format!("process {}", self.text));
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        ctx.write_str(&self.text)
    }
}

/// A stateful text field that reads its submitted value.
#[derive(Debug, Clone, Default)]
pub struct Field {
    pub value: String,
    pub required: bool,
}

impl Field {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            required: false,
        }
    }
}

impl Widget for Field {
    fn kind(&self) -> &'static str {
        "field"
    }

    fn requires_id(&self) -> bool {
        true
    }

    fn accepts_child(&self, _child: &dyn Widget) -> bool {
        false
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), TreeError> {
        if let Some(value) = ctx.submitted_value()? {
            self.value = value.to_string();
        }
        if self.required && self.value.is_empty() {
            ctx.add_message(Message::error("required"));
        }
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        let id = ctx.id().unwrap_or_default();
        let out = format!("[{id}={}]", self.value);
        ctx.write_str(&out)
    }

    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_stateful_mut(&mut self) -> Option<&mut dyn Stateful> {
        Some(self)
    }
}

impl Stateful for Field {
    fn state(&self) -> Value {
        Value::String(self.value.clone())
    }

    fn set_state(&mut self, state: Value) -> Result<(), serde_json::Error> {
        self.value = serde_json::from_value(state)?;
        Ok(())
    }
}

/// Form-like container holding submitted values.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    pub data: FormData,
}

impl Widget for Shell {
    fn kind(&self) -> &'static str {
        "shell"
    }

    fn form_data(&self) -> Option<&FormData> {
        Some(&self.data)
    }
}

/// Owns two labels as composites and shows them around its children.
#[derive(Debug, Clone, Default)]
pub struct Pair {
    pub created: usize,
}

impl Widget for Pair {
    fn kind(&self) -> &'static str {
        "pair"
    }

    fn create_composites(&mut self, ctx: &mut CompositeContext<'_>) -> Result<(), TreeError> {
        self.created += 1;
        ctx.add("left", Label::new("L"))?;
        ctx.add("right", Label::new("R"))?;
        Ok(())
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        ctx.display_composite("left")?;
        ctx.display_children()?;
        ctx.display_composite("right")
    }
}

/// Displays a composite it never created.
#[derive(Debug, Clone, Default)]
pub struct Broken;

impl Widget for Broken {
    fn kind(&self) -> &'static str {
        "broken"
    }

    fn display(&self, ctx: &mut DisplayContext<'_>) -> Result<(), TreeError> {
        ctx.display_composite("missing")
    }
}

/// Holds a key to another node of its subtree.
#[derive(Debug, Clone, Default)]
pub struct Linker {
    pub target: Option<NodeKey>,
}

impl Widget for Linker {
    fn kind(&self) -> &'static str {
        "linker"
    }

    fn remap(&mut self, map: &CopyMap) {
        self.target = self.target.and_then(|target| map.key(target));
    }
}
