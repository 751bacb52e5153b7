//! VM command construction.
//!
//! Collects commands as one string per command, in emission order. The
//! textual forms here are exactly what the VM translator consumes.

/// Ordered VM command accumulator.
#[derive(Debug, Default)]
pub struct VmWriter {
    commands: Vec<String>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: &str, index: u16) {
        self.commands.push(format!("push {} {}", segment, index));
    }

    pub fn pop(&mut self, segment: &str, index: u16) {
        self.commands.push(format!("pop {} {}", segment, index));
    }

    /// Arithmetic/logical command (`add`, `sub`, `neg`, `eq`, ...).
    pub fn arithmetic(&mut self, op: &str) {
        self.commands.push(op.to_string());
    }

    pub fn label(&mut self, label: &str) {
        self.commands.push(format!("label {}", label));
    }

    pub fn goto(&mut self, label: &str) {
        self.commands.push(format!("goto {}", label));
    }

    pub fn if_goto(&mut self, label: &str) {
        self.commands.push(format!("if-goto {}", label));
    }

    pub fn function(&mut self, name: &str, locals: u16) {
        self.commands.push(format!("function {} {}", name, locals));
    }

    pub fn call(&mut self, name: &str, args: u16) {
        self.commands.push(format!("call {} {}", name, args));
    }

    pub fn ret(&mut self) {
        self.commands.push("return".to_string());
    }

    /// Append an already-rendered command.
    pub fn raw(&mut self, command: String) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<String> {
        self.commands
    }
}

/// Render a command list as `.vm` file text, one command per line.
pub fn render(commands: &[String]) -> String {
    let mut text = String::with_capacity(commands.iter().map(|c| c.len() + 1).sum());
    for command in commands {
        text.push_str(command);
        text.push('\n');
    }
    text
}
